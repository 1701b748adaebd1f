//! Settings state machine

use super::store::Reducible;
use crate::error::{CoreError, CoreResult};
use crate::types::{DashboardView, Settings, Theme};

/// Transitions of [`Settings`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsAction {
    SetTheme(Theme),
    SetCurrency(String),
    SetDateFormat(String),
    SetLanguage(String),
    SetDashboardDefault(DashboardView),
    /// Back to defaults
    Reset,
    /// Wholesale replacement, e.g. after loading from storage
    Replace(Settings),
}

impl SettingsAction {
    /// Builds an action from a `key = value` pair
    pub fn parse(key: &str, value: &str) -> CoreResult<Self> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(CoreError::invalid_setting(key, value, "must not be empty"));
        }

        match key {
            "theme" => Ok(Self::SetTheme(trimmed.parse()?)),
            "currency" => {
                if trimmed.len() != 3 || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
                    return Err(CoreError::invalid_setting(
                        key,
                        value,
                        "expected a three-letter currency code",
                    ));
                }
                Ok(Self::SetCurrency(trimmed.to_ascii_uppercase()))
            }
            "date_format" => Ok(Self::SetDateFormat(trimmed.to_string())),
            "language" => Ok(Self::SetLanguage(trimmed.to_string())),
            "dashboard_default" => Ok(Self::SetDashboardDefault(trimmed.parse()?)),
            other => Err(CoreError::UnknownSetting(other.to_string())),
        }
    }
}

impl Reducible for Settings {
    type Action = SettingsAction;

    fn reduce(&self, action: SettingsAction) -> Self {
        let mut next = self.clone();
        match action {
            SettingsAction::SetTheme(theme) => next.theme = theme,
            SettingsAction::SetCurrency(currency) => next.currency = currency,
            SettingsAction::SetDateFormat(format) => next.date_format = format,
            SettingsAction::SetLanguage(language) => next.language = language,
            SettingsAction::SetDashboardDefault(view) => next.dashboard_default = view,
            SettingsAction::Reset => next = Settings::default(),
            SettingsAction::Replace(settings) => next = settings,
        }
        next
    }
}
