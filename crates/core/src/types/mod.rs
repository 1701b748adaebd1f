//! Domain types for the Nestegg client
//!
//! - `user`: the signed-in user profile
//! - `settings`: persisted user preferences

mod settings;
mod user;

pub use settings::{DashboardView, Settings, Theme};
pub use user::{FamilyRole, User};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_types_are_exported() {
        let _settings: Settings = Settings::default();
        let _user: User = User::new("u1", "Ana", "ana@example.com");
        let _theme: Theme = Theme::System;
        let _view: DashboardView = DashboardView::Budgets;
        let _role: FamilyRole = FamilyRole::Admin;
    }
}
