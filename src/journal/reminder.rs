//! Backup reminders derived from the last export date.

use chrono::{DateTime, Duration, Utc};

/// Default number of days after which an export is considered stale.
pub const DEFAULT_REMINDER_DAYS: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupReminder {
    /// The journal holds data but was never exported.
    NeverExported,
    /// The last export is older than the threshold.
    Overdue { days: i64 },
}

impl BackupReminder {
    pub fn message(&self) -> String {
        match self {
            BackupReminder::NeverExported => "Don't forget to export your data!".to_string(),
            BackupReminder::Overdue { days } => {
                format!("Last export was {} days ago", days)
            }
        }
    }
}

/// Decides whether the user should be reminded to export.
pub fn backup_reminder(
    last_export: Option<DateTime<Utc>>,
    has_data: bool,
    now: DateTime<Utc>,
    threshold_days: u32,
) -> Option<BackupReminder> {
    match last_export {
        None if has_data => Some(BackupReminder::NeverExported),
        None => None,
        Some(last) => {
            let elapsed = now - last;
            (elapsed > Duration::days(threshold_days as i64)).then(|| BackupReminder::Overdue {
                days: elapsed.num_days(),
            })
        }
    }
}

/// Whether closing the page should ask for confirmation: rain was recorded
/// today and the journal was never exported.
pub fn needs_unload_warning(today_rainfall: f64, last_export: Option<DateTime<Utc>>) -> bool {
    today_rainfall > 0.0 && last_export.is_none()
}
