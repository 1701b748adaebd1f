//! Core domain model and state containers for the Nestegg budgeting client

pub mod error;
pub mod params;
pub mod state;
pub mod types;

// Re-export commonly used types
pub use error::{CoreError, CoreResult};
pub use params::StableParams;
pub use state::{
    AuthAction, AuthState, AuthStatus, AuthStore, Reducible, SettingsAction, SettingsStore, Store,
};
pub use types::{DashboardView, FamilyRole, Settings, Theme, User};
