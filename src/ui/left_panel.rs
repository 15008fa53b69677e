//! Left panel UI: entry form for the selected day, import and export.

use crate::state::{AppState, JournalAction};
use eframe::egui::{self, RichText};

pub fn render_left_panel(ctx: &egui::Context, state: &mut AppState, pending_saves: u32) {
    egui::SidePanel::left("left_panel")
        .resizable(true)
        .default_width(250.0)
        .min_width(200.0)
        .max_width(400.0)
        .show(ctx, |ui| {
            ui.heading(state.selected_date.format("%A %d %B %Y").to_string());
            ui.separator();

            section(ui, "Rainfall (mm)", |ui| {
                let edit = ui.add(
                    egui::TextEdit::singleline(&mut state.form.rainfall).desired_width(80.0),
                );
                if save_button(ui, &edit) {
                    state.request(JournalAction::SaveRainfall);
                }
            });

            section(ui, "Temperature (°C)", |ui| {
                ui.label("Morning");
                ui.add(egui::TextEdit::singleline(&mut state.form.morning).desired_width(50.0));
                ui.label("Afternoon");
                let edit = ui.add(
                    egui::TextEdit::singleline(&mut state.form.afternoon).desired_width(50.0),
                );
                if save_button(ui, &edit) {
                    state.request(JournalAction::SaveTemperature);
                }
            });

            section(ui, "Power (W)", |ui| {
                let edit = ui.add(
                    egui::TextEdit::singleline(&mut state.form.watts).desired_width(80.0),
                );
                if save_button(ui, &edit) {
                    state.request(JournalAction::SaveWatts);
                }
            });

            ui.label(RichText::new("Comment").strong());
            ui.add(
                egui::TextEdit::multiline(&mut state.form.comment)
                    .desired_rows(3)
                    .desired_width(f32::INFINITY),
            );
            if ui.button("Save comment").clicked() {
                state.request(JournalAction::SaveComment);
            }

            if pending_saves > 0 {
                ui.add_space(5.0);
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Saving...");
                });
            }

            ui.add_space(15.0);
            ui.heading("Backup");
            ui.separator();

            ui.add_enabled_ui(!state.file_busy, |ui| {
                ui.horizontal(|ui| {
                    if ui.button("Export...").clicked() {
                        state.file_busy = true;
                        state.request(JournalAction::Export);
                    }
                    if ui.button("Import...").clicked() {
                        state.file_busy = true;
                        state.request(JournalAction::Import);
                    }
                });
            });

            if state.file_busy {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Waiting for file...");
                });
            }
        });
}

fn section(ui: &mut egui::Ui, title: &str, add_contents: impl FnOnce(&mut egui::Ui)) {
    ui.label(RichText::new(title).strong());
    ui.horizontal(add_contents);
    ui.add_space(8.0);
}

/// A save button that also fires when Enter is pressed in the field.
fn save_button(ui: &mut egui::Ui, field: &egui::Response) -> bool {
    let submitted = field.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
    ui.button("Save").clicked() || submitted
}
