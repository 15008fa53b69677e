//! Centralized color constants for the UI.

use eframe::egui::Color32;

/// General UI colors for labels and values.
pub mod ui {
    use super::Color32;

    /// Muted gray for stat labels.
    pub const LABEL: Color32 = Color32::from_rgb(100, 100, 100);
    /// Slightly brighter for stat values.
    pub const VALUE: Color32 = Color32::from_rgb(160, 160, 160);
    /// Dim text color.
    pub const DIM: Color32 = Color32::from_rgb(120, 120, 130);
}

/// Toast backgrounds and text.
pub mod toast {
    use super::Color32;

    pub const SUCCESS_FILL: Color32 = Color32::from_rgb(40, 110, 60);
    pub const WARNING_FILL: Color32 = Color32::from_rgb(150, 100, 30);
    pub const TEXT: Color32 = Color32::WHITE;
}
