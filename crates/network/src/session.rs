// crates/network/src/session.rs
//! Signed-in session and the pieces that follow it
//!
//! [`AuthSession`] keeps the auth store, the persisted session and the API
//! client's bearer token in step. [`SettingsSession`] writes the settings
//! blob after every change. [`SessionWatcher`] runs the liveness pinger only
//! while someone is signed in.

use crate::client::ApiClient;
use crate::error::NetworkResult;
use crate::liveness::LivenessPinger;
use nestegg_config::{ConfigResult, SessionStorage, SettingsFile};
use nestegg_core::{
    AuthAction, AuthState, AuthStatus, AuthStore, Settings, SettingsAction, SettingsStore, Store,
    User,
};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: String,
    user: User,
}

/// Authentication state bound to storage and the API client
pub struct AuthSession {
    store: AuthStore,
    storage: SessionStorage,
    client: ApiClient,
}

impl AuthSession {
    /// Wires the client's unauthorized hook to this session
    ///
    /// A `401` from any request clears the stored session and signs out.
    pub fn new(client: ApiClient, storage: SessionStorage) -> Self {
        let store = AuthStore::default();

        let hook_store = store.clone();
        let hook_storage = storage.clone();
        client.on_unauthorized(move || {
            if let Err(e) = hook_storage.clear() {
                log::warn!("Failed to clear stored session: {}", e);
            }
            hook_store.dispatch(AuthAction::Logout);
        });

        Self {
            store,
            storage,
            client,
        }
    }

    /// Loads the persisted session, returning true if one was found
    pub fn restore(&self) -> bool {
        let stored = self.storage.restore();
        self.client
            .set_token(stored.as_ref().map(|(_, token)| token.clone()));
        self.store.dispatch(AuthAction::Restore(stored));
        self.store.state().is_authenticated()
    }

    /// Signs in against `POST /auth/login`
    pub async fn login(&self, email: &str, password: &str) -> NetworkResult<User> {
        self.store.dispatch(AuthAction::LoginStart);

        let request = LoginRequest { email, password };
        let result = self
            .client
            .post_json::<_, LoginResponse>("auth/login", &request)
            .await;

        match result {
            Ok(LoginResponse { token, user }) => {
                self.sign_in(user.clone(), token)?;
                Ok(user)
            }
            Err(e) => {
                log::warn!("Login failed: {}", e);
                self.store.dispatch(AuthAction::LoginFailure(e.to_string()));
                Err(e)
            }
        }
    }

    /// Adopts a token issued elsewhere
    pub fn sign_in(&self, user: User, token: String) -> NetworkResult<()> {
        self.storage.save(&user, &token)?;
        self.client.set_token(Some(token.clone()));
        log::info!("Signed in as {}", user);
        self.store.dispatch(AuthAction::LoginSuccess { user, token });
        Ok(())
    }

    /// Signs out and forgets the stored session
    pub fn logout(&self) -> NetworkResult<()> {
        self.client.set_token(None);
        self.store.dispatch(AuthAction::Logout);
        self.storage.clear()?;
        log::info!("Signed out");
        Ok(())
    }

    /// Replaces the signed-in user's profile; ignored when signed out
    pub fn update_user(&self, user: User) -> NetworkResult<()> {
        if !self.state().is_authenticated() {
            return Ok(());
        }
        self.storage.save_user(&user)?;
        self.store.dispatch(AuthAction::UpdateUser(user));
        Ok(())
    }

    pub fn state(&self) -> AuthState {
        self.store.state()
    }

    pub fn store(&self) -> &AuthStore {
        &self.store
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("status", &self.store.state().status)
            .field("storage", &self.storage.path())
            .finish()
    }
}

/// User settings written back to disk after every change
#[derive(Debug)]
pub struct SettingsSession {
    store: SettingsStore,
    file: SettingsFile,
}

impl SettingsSession {
    /// Reads the settings blob once; unreadable files fall back to defaults
    pub fn load(file: SettingsFile) -> Self {
        let settings = file.load_or_default();
        Self {
            store: Store::new(settings),
            file,
        }
    }

    /// Applies a change and persists the result
    pub fn apply(&self, action: SettingsAction) -> ConfigResult<Settings> {
        self.store.dispatch(action);
        let settings = self.store.state();
        self.file.save(&settings)?;
        Ok(settings)
    }

    pub fn settings(&self) -> Settings {
        self.store.state()
    }

    pub fn store(&self) -> &SettingsStore {
        &self.store
    }
}

/// Starts the pinger on sign-in and stops it on sign-out
///
/// Dropping the watcher stops the pinger.
pub struct SessionWatcher {
    task: JoinHandle<()>,
    pinger: LivenessPinger,
}

impl SessionWatcher {
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    pub fn spawn(store: &AuthStore, pinger: LivenessPinger) -> Self {
        let mut rx = store.subscribe();
        let follower = pinger.clone();

        let task = tokio::spawn(async move {
            loop {
                let status = rx.borrow_and_update().status;
                match status {
                    AuthStatus::Authenticated => follower.start(),
                    AuthStatus::Unauthenticated => follower.stop(),
                    AuthStatus::Unknown => {}
                }
                if rx.changed().await.is_err() {
                    break;
                }
            }
        });

        Self { task, pinger }
    }

    pub fn pinger(&self) -> &LivenessPinger {
        &self.pinger
    }
}

impl Drop for SessionWatcher {
    fn drop(&mut self) {
        self.task.abort();
        self.pinger.stop();
    }
}
