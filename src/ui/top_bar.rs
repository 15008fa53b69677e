//! Top bar UI: app title, day navigation, status and last backup.

use crate::state::{AppState, JournalAction};
use chrono::{DateTime, Duration, Local, Utc};
use eframe::egui::{self, Color32, RichText};

/// Export and save timestamps shown on the right of the bar.
#[derive(Debug, Default, Clone, Copy)]
pub struct BackupTimes {
    pub last_export: Option<DateTime<Utc>>,
    pub last_save: Option<DateTime<Utc>>,
}

pub fn render_top_bar(ctx: &egui::Context, state: &mut AppState, times: BackupTimes) {
    egui::TopBottomPanel::top("top_bar")
        .exact_height(36.0)
        .show(ctx, |ui| {
            ui.horizontal_centered(|ui| {
                ui.label(
                    RichText::new("Weather Journal")
                        .strong()
                        .size(16.0)
                        .color(Color32::WHITE),
                );

                ui.separator();

                // Day navigation
                let selected = state.selected_date;
                if ui.small_button("\u{25C0}").on_hover_text("Previous day").clicked() {
                    if let Some(day) = selected.checked_sub_signed(Duration::days(1)) {
                        state.request(JournalAction::SelectDate(day));
                    }
                }
                let response = ui.add(
                    egui::TextEdit::singleline(&mut state.form.date_input)
                        .desired_width(80.0)
                        .font(egui::FontId::monospace(12.0)),
                );
                if response.lost_focus() {
                    match state.form.parsed_date() {
                        Some(day) if day != selected => {
                            state.request(JournalAction::SelectDate(day));
                        }
                        Some(_) => {}
                        None => state.form.date_input = selected.format("%Y-%m-%d").to_string(),
                    }
                }
                if ui.small_button("\u{25B6}").on_hover_text("Next day").clicked() {
                    if let Some(day) = selected.checked_add_signed(Duration::days(1)) {
                        state.request(JournalAction::SelectDate(day));
                    }
                }
                if ui.small_button("Today").clicked() {
                    state.request(JournalAction::SelectDate(crate::state::today()));
                }

                ui.separator();

                ui.label(
                    RichText::new(&state.status_message)
                        .size(13.0)
                        .color(Color32::GRAY),
                );

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let text = match times.last_export {
                        Some(at) => format!(
                            "Last export: {}",
                            at.with_timezone(&Local).format("%d/%m/%Y")
                        ),
                        None => "Never exported".to_string(),
                    };
                    let saved = match times.last_save {
                        Some(at) => format!(
                            "Last saved {}",
                            at.with_timezone(&Local).format("%d/%m/%Y %H:%M")
                        ),
                        None => "Not saved yet".to_string(),
                    };
                    ui.label(RichText::new(text).size(12.0).color(Color32::GRAY))
                        .on_hover_text(saved);
                    ui.separator();
                    ui.label(
                        RichText::new(state.stats.format_rainfall())
                            .size(12.0)
                            .color(Color32::LIGHT_BLUE),
                    );
                });
            });
        });
}
