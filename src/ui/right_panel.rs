//! Right panel UI: per-series history, yearly figures and settings.

use super::colors;
use crate::journal::{Series, SortOrder};
use crate::state::{AppState, ChartPeriod, JournalAction, JournalSettings};
use crate::tasks::AppJournal;
use chrono::NaiveDate;
use eframe::egui::{self, RichText, ScrollArea};

pub fn render_right_panel(ctx: &egui::Context, state: &mut AppState, journal: &AppJournal) {
    egui::SidePanel::right("right_panel")
        .resizable(true)
        .default_width(240.0)
        .min_width(180.0)
        .max_width(380.0)
        .show(ctx, |ui| {
            ScrollArea::vertical().show(ui, |ui| {
                ui.heading("History");
                ui.separator();

                for series in Series::all() {
                    render_history_section(ui, state, journal, *series);
                    ui.add_space(5.0);
                }

                render_totals_section(ui, state);
                ui.add_space(5.0);

                render_settings_section(ui, state);
            });
        });
}

fn render_history_section(
    ui: &mut egui::Ui,
    state: &mut AppState,
    journal: &AppJournal,
    series: Series,
) {
    let dates = journal.dates_with_data(series, SortOrder::Descending);
    let title = format!("{} ({})", history_title(series), dates.len());

    egui::CollapsingHeader::new(RichText::new(title).strong())
        .id_salt(series.label())
        .default_open(series == Series::Rainfall)
        .show(ui, |ui| {
            if dates.is_empty() {
                ui.label(RichText::new("No entries").italics().color(colors::ui::DIM));
                return;
            }

            for date in dates.iter().take(state.settings.history_limit) {
                let selected = *date == state.selected_date;
                let value = history_value(journal, series, *date);
                let text = format!("{}  {}", date.format("%d/%m/%Y"), value);
                if ui.selectable_label(selected, text).clicked() {
                    state.request(JournalAction::SelectDate(*date));
                }
            }

            let older = dates.len().saturating_sub(state.settings.history_limit);
            if older > 0 {
                ui.label(
                    RichText::new(format!("{} older entries", older))
                        .size(11.0)
                        .color(colors::ui::LABEL),
                );
            }
        });
}

fn history_title(series: Series) -> &'static str {
    match series {
        Series::Rainfall => "Rainfall",
        Series::Temperature => "Temperature",
        Series::Comments => "Comments",
        Series::Watts => "Power",
    }
}

fn history_value(journal: &AppJournal, series: Series, date: NaiveDate) -> String {
    match series {
        Series::Rainfall => format!("{:.1} mm", journal.rainfall(date)),
        Series::Watts => crate::state::format_watts(journal.watts(date)),
        Series::Temperature => {
            let reading = journal.temperature(date);
            let show = |v: Option<f64>| {
                v.map(|t| format!("{:.1}°", t))
                    .unwrap_or_else(|| "-".to_string())
            };
            format!("{} / {}", show(reading.morning), show(reading.afternoon))
        }
        Series::Comments => {
            let comment = journal.comment(date);
            match comment.char_indices().nth(30) {
                Some((cut, _)) => format!("{}...", &comment[..cut]),
                None => comment.to_string(),
            }
        }
    }
}

fn render_totals_section(ui: &mut egui::Ui, state: &AppState) {
    egui::CollapsingHeader::new(RichText::new("Totals").strong())
        .default_open(true)
        .show(ui, |ui| {
            let stats = &state.stats;
            stat_row(ui, "Rain this month", format!("{:.1} mm", stats.rainfall_month));
            stat_row(ui, "Rain this year", format!("{:.1} mm", stats.rainfall_year));
            stat_row(ui, "Rainy days", stats.rainy_days_year.to_string());
            stat_row(ui, "Power", stats.format_watts());
            stat_row(ui, "Days recorded", stats.recorded_days.to_string());
        });
}

fn stat_row(ui: &mut egui::Ui, label: &str, value: String) {
    ui.horizontal(|ui| {
        ui.label(RichText::new(label).size(11.0).color(colors::ui::LABEL));
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.label(RichText::new(value).size(11.0).color(colors::ui::VALUE));
        });
    });
}

fn render_settings_section(ui: &mut egui::Ui, state: &mut AppState) {
    egui::CollapsingHeader::new(RichText::new("Settings").strong())
        .default_open(false)
        .show(ui, |ui| {
            let settings = &mut state.settings;
            let mut changed = false;

            ui.label("Backup reminder (days)");
            let mut days = settings.backup_reminder_days;
            if ui
                .add(egui::Slider::new(
                    &mut days,
                    JournalSettings::min_reminder_days()..=JournalSettings::max_reminder_days(),
                ))
                .changed()
            {
                settings.set_backup_reminder_days(days);
                changed = true;
            }

            ui.add_space(4.0);
            ui.label("Default chart period");
            egui::ComboBox::from_id_salt("chart_period_selector")
                .selected_text(settings.default_chart_period.label())
                .width(120.0)
                .show_ui(ui, |ui| {
                    for period in ChartPeriod::all() {
                        let current = &mut settings.default_chart_period;
                        changed |= ui
                            .selectable_value(current, *period, period.label())
                            .changed();
                    }
                });

            ui.add_space(4.0);
            ui.label("History rows");
            changed |= ui
                .add(egui::Slider::new(&mut settings.history_limit, 10..=365))
                .changed();

            if changed {
                state.request(JournalAction::SaveSettings);
            }
        });
}
