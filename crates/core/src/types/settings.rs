//! User preferences persisted between sessions

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Color theme preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
    /// Follow the operating system
    System,
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Theme::Light => write!(f, "light"),
            Theme::Dark => write!(f, "dark"),
            Theme::System => write!(f, "system"),
        }
    }
}

impl FromStr for Theme {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            "system" => Ok(Theme::System),
            _ => Err(CoreError::invalid_setting(
                "theme",
                s,
                "expected light, dark or system",
            )),
        }
    }
}

/// View shown first after sign-in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DashboardView {
    #[default]
    Overview,
    Expenses,
    Income,
    Budgets,
}

impl std::fmt::Display for DashboardView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DashboardView::Overview => write!(f, "overview"),
            DashboardView::Expenses => write!(f, "expenses"),
            DashboardView::Income => write!(f, "income"),
            DashboardView::Budgets => write!(f, "budgets"),
        }
    }
}

impl FromStr for DashboardView {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "overview" => Ok(DashboardView::Overview),
            "expenses" => Ok(DashboardView::Expenses),
            "income" => Ok(DashboardView::Income),
            "budgets" => Ok(DashboardView::Budgets),
            _ => Err(CoreError::invalid_setting(
                "dashboard_default",
                s,
                "expected overview, expenses, income or budgets",
            )),
        }
    }
}

/// Settings blob, read once at startup and rewritten on every change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub theme: Theme,
    /// ISO 4217 code
    pub currency: String,
    pub date_format: String,
    /// BCP 47 language tag
    pub language: String,
    pub dashboard_default: DashboardView,
}

impl Settings {
    /// Keys accepted by [`crate::SettingsAction::parse`]
    pub const KEYS: [&'static str; 5] = [
        "theme",
        "currency",
        "date_format",
        "language",
        "dashboard_default",
    ];

    /// Returns the display value of a setting by key
    pub fn get(&self, key: &str) -> CoreResult<String> {
        match key {
            "theme" => Ok(self.theme.to_string()),
            "currency" => Ok(self.currency.clone()),
            "date_format" => Ok(self.date_format.clone()),
            "language" => Ok(self.language.clone()),
            "dashboard_default" => Ok(self.dashboard_default.to_string()),
            other => Err(CoreError::UnknownSetting(other.to_string())),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            currency: "USD".to_string(),
            date_format: "MM/DD/YYYY".to_string(),
            language: "en".to_string(),
            dashboard_default: DashboardView::Overview,
        }
    }
}
