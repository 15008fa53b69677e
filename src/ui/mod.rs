//! UI modules for the weather journal.
//!
//! The UI is split into distinct panels:
//! - Top bar: Title, day navigation, status and rainfall figures
//! - Left panel: Entry form for the selected day, import and export
//! - Central panel: Rainfall, temperature and power charts
//! - Right panel: History lists, totals and settings
//! - Toasts: Short confirmations and warnings

pub mod charts;
mod colors;
mod left_panel;
mod right_panel;
mod toasts;
mod top_bar;

pub use charts::render_charts;
pub use left_panel::render_left_panel;
pub use right_panel::render_right_panel;
pub use toasts::render_toasts;
pub use top_bar::{render_top_bar, BackupTimes};
