//! Authentication state machine

use super::store::Reducible;
use crate::types::User;

/// Whether a session is known to be signed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthStatus {
    /// Stored session not yet inspected
    #[default]
    Unknown,
    Authenticated,
    Unauthenticated,
}

/// Authentication state
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AuthState {
    pub status: AuthStatus,
    pub user: Option<User>,
    pub token: Option<String>,
    /// A sign-in request is in flight
    pub loading: bool,
    pub error: Option<String>,
}

impl AuthState {
    /// Returns true if the session holds a user and a token
    pub fn is_authenticated(&self) -> bool {
        self.status == AuthStatus::Authenticated
    }
}

/// Transitions of [`AuthState`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthAction {
    LoginStart,
    LoginSuccess { user: User, token: String },
    LoginFailure(String),
    Logout,
    UpdateUser(User),
    ClearError,
    /// Session read back from storage at startup; `None` means nothing stored
    Restore(Option<(User, String)>),
}

impl Reducible for AuthState {
    type Action = AuthAction;

    fn reduce(&self, action: AuthAction) -> Self {
        match action {
            AuthAction::LoginStart => Self {
                loading: true,
                error: None,
                ..self.clone()
            },
            AuthAction::LoginSuccess { user, token } => Self {
                status: AuthStatus::Authenticated,
                user: Some(user),
                token: Some(token),
                loading: false,
                error: None,
            },
            AuthAction::LoginFailure(message) => Self {
                status: AuthStatus::Unauthenticated,
                user: None,
                token: None,
                loading: false,
                error: Some(message),
            },
            AuthAction::Logout => Self {
                status: AuthStatus::Unauthenticated,
                ..Self::default()
            },
            // Ignored while signed out
            AuthAction::UpdateUser(user) if self.is_authenticated() => Self {
                user: Some(user),
                ..self.clone()
            },
            AuthAction::UpdateUser(_) => self.clone(),
            AuthAction::ClearError => Self {
                error: None,
                ..self.clone()
            },
            AuthAction::Restore(Some((user, token))) => Self {
                status: AuthStatus::Authenticated,
                user: Some(user),
                token: Some(token),
                loading: false,
                error: None,
            },
            AuthAction::Restore(None) => Self {
                status: AuthStatus::Unauthenticated,
                ..Self::default()
            },
        }
    }
}
