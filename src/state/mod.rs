//! Application state management.
//!
//! UI panels only read and edit this state; anything that touches the
//! journal is queued as a [`JournalAction`] and applied by the app after the
//! frame is drawn.

mod entry;
mod notifications;
mod settings;
mod stats;

pub use entry::{EntryForm, FieldError};
pub use notifications::{Notifications, ToastLevel};
pub use settings::{ChartPeriod, JournalSettings};
pub use stats::{format_watts, JournalStats};

use chrono::{Local, NaiveDate};

/// A request from the UI that needs the journal.
#[derive(Debug, Clone, PartialEq)]
pub enum JournalAction {
    SelectDate(NaiveDate),
    SaveRainfall,
    SaveTemperature,
    SaveComment,
    SaveWatts,
    Import,
    Export,
    SaveSettings,
}

/// Root application state containing all sub-states.
#[derive(Default)]
pub struct AppState {
    /// Day shown in the entry form
    pub selected_date: NaiveDate,

    /// Text buffers of the entry form
    pub form: EntryForm,

    pub rainfall_period: ChartPeriod,
    pub temperature_period: ChartPeriod,
    pub watts_period: ChartPeriod,

    pub settings: JournalSettings,

    /// Figures shown in the top bar, recomputed after every change
    pub stats: JournalStats,

    /// Application status message displayed in top bar
    pub status_message: String,

    pub notifications: Notifications,

    /// Actions queued by the UI this frame
    pub actions: Vec<JournalAction>,

    /// Whether a file pick or export is in progress
    pub file_busy: bool,
}

impl AppState {
    pub fn new(settings: JournalSettings) -> Self {
        Self {
            selected_date: today(),
            rainfall_period: settings.default_chart_period,
            temperature_period: settings.default_chart_period,
            watts_period: settings.default_chart_period,
            settings,
            status_message: "Opening journal...".to_string(),
            ..Default::default()
        }
    }

    pub fn request(&mut self, action: JournalAction) {
        self.actions.push(action);
    }

    pub fn take_actions(&mut self) -> Vec<JournalAction> {
        std::mem::take(&mut self.actions)
    }
}

/// Today's date in the user's time zone.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
