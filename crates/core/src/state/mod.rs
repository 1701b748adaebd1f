//! Action-driven state containers
//!
//! Each state type implements [`Reducible`]: an action enum plus a pure
//! transition function. [`Store`] holds one state value and publishes every
//! transition to its subscribers.

mod auth;
mod settings;
mod store;

pub use auth::{AuthAction, AuthState, AuthStatus};
pub use settings::SettingsAction;
pub use store::{Reducible, Store};

/// Store holding the authentication state
pub type AuthStore = Store<AuthState>;

/// Store holding the user settings
pub type SettingsStore = Store<crate::types::Settings>;
