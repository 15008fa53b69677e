//! User settings for reminders and views.
//!
//! Settings are persisted to localStorage so they survive page reloads.

use crate::journal::reminder::DEFAULT_REMINDER_DAYS;
use crate::storage::FlagStore;
use serde::{Deserialize, Serialize};

/// Time span shown by a chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ChartPeriod {
    /// One point per day of the current month.
    #[default]
    Month,
    /// One point per month of the current year.
    Year,
}

impl ChartPeriod {
    pub fn all() -> &'static [ChartPeriod] {
        &[ChartPeriod::Month, ChartPeriod::Year]
    }

    pub fn label(&self) -> &'static str {
        match self {
            ChartPeriod::Month => "Month",
            ChartPeriod::Year => "Year",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JournalSettings {
    /// Days after the last export before a reminder is shown.
    pub backup_reminder_days: u32,
    /// Period charts open with.
    pub default_chart_period: ChartPeriod,
    /// Rows shown per history list.
    pub history_limit: usize,
}

impl Default for JournalSettings {
    fn default() -> Self {
        Self {
            backup_reminder_days: DEFAULT_REMINDER_DAYS,
            default_chart_period: ChartPeriod::Month,
            history_limit: 60,
        }
    }
}

impl JournalSettings {
    /// localStorage key for persisting settings.
    const STORAGE_KEY: &'static str = "weather_journal_settings";

    pub fn min_reminder_days() -> u32 {
        1
    }

    pub fn max_reminder_days() -> u32 {
        365
    }

    /// Sets the reminder threshold, clamped to the allowed range.
    pub fn set_backup_reminder_days(&mut self, days: u32) {
        self.backup_reminder_days =
            days.clamp(Self::min_reminder_days(), Self::max_reminder_days());
    }

    /// Load settings, falling back to defaults when missing or unreadable.
    pub fn load(flags: &impl FlagStore) -> Self {
        let json = match flags.get_item(Self::STORAGE_KEY) {
            Ok(Some(s)) => s,
            Ok(None) => return Self::default(),
            Err(e) => {
                log::warn!("Failed to read settings: {}", e);
                return Self::default();
            }
        };

        match serde_json::from_str::<Self>(&json) {
            Ok(mut settings) => {
                log::info!("Loaded settings from localStorage");
                settings.set_backup_reminder_days(settings.backup_reminder_days);
                settings
            }
            Err(e) => {
                log::warn!("Failed to parse settings: {}", e);
                Self::default()
            }
        }
    }

    pub fn save(&self, flags: &impl FlagStore) {
        let json = match serde_json::to_string(self) {
            Ok(s) => s,
            Err(e) => {
                log::warn!("Failed to serialize settings: {}", e);
                return;
            }
        };

        if let Err(e) = flags.set_item(Self::STORAGE_KEY, &json) {
            log::warn!("Failed to save settings: {}", e);
        } else {
            log::info!("Saved settings to localStorage");
        }
    }
}
