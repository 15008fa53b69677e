#![warn(clippy::all)]

//! Weather Journal - A web-based personal weather journal.
//!
//! Records daily rainfall, morning and afternoon temperatures, free-text
//! comments and power readings, keeps them in the browser's IndexedDB, and
//! charts them by month or year. Data can be exported to and imported from
//! JSON files.

mod file_ops;
mod journal;
mod state;
mod storage;
mod tasks;
mod ui;
mod unload_guard;

use chrono::Utc;
use eframe::egui;
use file_ops::{FileChannel, FileEvent};
use journal::{backup_reminder, needs_unload_warning, JournalError, SaveFuture};
use state::{AppState, FieldError, JournalAction, JournalSettings, Notifications};
use storage::StorageConfig;
use tasks::{AppFlags, AppJournal, AppStore, TaskChannel, TaskResult};
use unload_guard::UnloadGuard;
use web_time::Duration;

/// Delay before the backup reminder shows up after the journal opens.
const REMINDER_DELAY: Duration = Duration::from_secs(2);

// Native entry point
#[cfg(not(target_arch = "wasm32"))]
fn main() -> eframe::Result<()> {
    env_logger::init();

    let native_options = eframe::NativeOptions::default();

    eframe::run_native(
        "Weather Journal",
        native_options,
        Box::new(|cc| Ok(Box::new(JournalApp::new(cc)))),
    )
}

// WASM entry point - main is not called on wasm32
#[cfg(target_arch = "wasm32")]
fn main() {}

/// Entry point for the WASM application.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub async fn start() {
    use eframe::wasm_bindgen::JsCast as _;

    // Redirect `log` messages to `console.log`:
    eframe::WebLogger::init(log::LevelFilter::Debug).ok();

    let web_options = eframe::WebOptions::default();

    wasm_bindgen_futures::spawn_local(async {
        let document = web_sys::window()
            .expect("No window")
            .document()
            .expect("No document");

        let canvas = document
            .get_element_by_id("app_canvas")
            .expect("Failed to find app_canvas")
            .dyn_into::<web_sys::HtmlCanvasElement>()
            .expect("app_canvas was not a HtmlCanvasElement");

        let start_result = eframe::WebRunner::new()
            .start(
                canvas,
                web_options,
                Box::new(|cc| Ok(Box::new(JournalApp::new(cc)))),
            )
            .await;

        // Remove the loading text once the app has loaded:
        if let Some(loading_text) = document.get_element_by_id("loading_text") {
            match start_result {
                Ok(_) => {
                    loading_text.remove();
                }
                Err(e) => {
                    loading_text.set_inner_html(
                        "<p>The app has crashed. See the developer console for details.</p>",
                    );
                    panic!("Failed to start eframe: {e:?}");
                }
            }
        }
    });
}

/// Main application state and logic.
pub struct JournalApp {
    /// Application state containing all sub-states
    state: AppState,

    /// The journal, once migration and loading have finished
    journal: Option<AppJournal>,

    /// Channel for async journal operations
    tasks: TaskChannel,

    /// Channel for async import and export dialogs
    files: FileChannel,

    /// Confirms closing the page while today's rain is unexported
    unload_guard: UnloadGuard,

    /// localStorage flags, used for settings
    flags: AppFlags,
}

impl JournalApp {
    /// Creates the app and starts opening the journal in the background.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let flags = AppFlags::new();
        let settings = JournalSettings::load(&flags);

        let tasks: TaskChannel = TaskChannel::new();
        tasks.open_journal(
            &cc.egui_ctx,
            AppStore::new(StorageConfig::default()),
            flags.clone(),
        );

        let unload_guard = UnloadGuard::new();
        unload_guard.install();

        Self {
            state: AppState::new(settings),
            journal: None,
            tasks,
            files: FileChannel::new(),
            unload_guard,
            flags,
        }
    }

    /// Recomputes the figures and refills the form from the journal.
    fn refresh(&mut self) {
        self.refresh_stats();
        if let Some(journal) = &self.journal {
            self.state.form.fill(journal.record(), self.state.selected_date);
        }
    }

    fn refresh_stats(&mut self) {
        if let Some(journal) = &self.journal {
            self.state.stats = state::JournalStats::compute(journal.record(), state::today());
        }
    }

    fn handle_task_result(&mut self, result: TaskResult<AppJournal>, ctx: &egui::Context) {
        match result {
            TaskResult::Opened(journal) => {
                let entries = journal.record().entry_count();
                self.state.status_message = format!("{} entries", entries);

                if let Some(reminder) = backup_reminder(
                    journal.last_export(),
                    journal.has_data(),
                    Utc::now(),
                    self.state.settings.backup_reminder_days,
                ) {
                    log::info!("Backup reminder: {:?}", reminder);
                    self.state
                        .notifications
                        .warning_after(reminder.message(), REMINDER_DELAY);
                }

                self.journal = Some(journal);
                self.refresh();
            }
            TaskResult::Saved {
                confirmation,
                result: Ok(()),
            } => {
                log::debug!("Journal saved");
                self.state.notifications.success(confirmation);
            }
            TaskResult::Saved { result: Err(e), .. } => {
                log::error!("Failed to save journal: {}", e);
                self.state
                    .notifications
                    .warning(format!("Could not save: {}", e));
            }
            TaskResult::Exported(Ok(file)) => {
                self.files.deliver_export(ctx.clone(), file);
            }
            TaskResult::Exported(Err(e)) => {
                log::error!("Export failed: {}", e);
                self.state.file_busy = false;
                self.state
                    .notifications
                    .warning(format!("Export failed: {}", e));
            }
        }
    }

    fn handle_file_event(&mut self, event: FileEvent, ctx: &egui::Context) {
        self.state.file_busy = false;

        match event {
            FileEvent::Picked(None) => {
                self.state.status_message = "Import cancelled".to_string();
            }
            FileEvent::Picked(Some(Err(e))) => {
                log::warn!("Import failed: {}", e);
                self.state
                    .notifications
                    .warning(format!("Import failed: {}", e));
            }
            FileEvent::Picked(Some(Ok(file))) => {
                let Some(journal) = self.journal.as_mut() else {
                    return;
                };

                match journal.import_text(&file.text) {
                    Ok((entries, save)) => {
                        let confirmation = format!("Imported {} entries", entries);
                        self.tasks.save(ctx, confirmation, save);
                        self.state.status_message = format!("Imported {}", file.file_name);
                        self.refresh();
                    }
                    Err(e) => {
                        log::warn!("Rejected import {}: {}", file.file_name, e);
                        self.state
                            .notifications
                            .warning(format!("Import failed: {}", e));
                    }
                }
            }
            FileEvent::Exported(None) => {
                self.state.status_message = "Export cancelled".to_string();
            }
            FileEvent::Exported(Some(Ok(target))) => {
                self.state.status_message = format!("Exported to {}", target);
                self.state.notifications.success("Data exported");
            }
            FileEvent::Exported(Some(Err(e))) => {
                log::error!("Export failed: {}", e);
                self.state
                    .notifications
                    .warning(format!("Export failed: {}", e));
            }
        }
    }

    /// Applies the actions the UI queued during the last frame.
    fn apply_actions(&mut self, ctx: &egui::Context) {
        let actions = self.state.take_actions();
        if actions.is_empty() {
            return;
        }
        let mut date_changed = false;

        for action in actions {
            if let JournalAction::SaveSettings = action {
                self.state.settings.save(&self.flags);
                continue;
            }

            let Some(journal) = self.journal.as_mut() else {
                log::warn!("Ignoring {:?} while the journal is opening", action);
                continue;
            };
            let date = self.state.selected_date;
            let form = &self.state.form;
            let notifications = &mut self.state.notifications;

            match action {
                JournalAction::SelectDate(day) => {
                    self.state.selected_date = day;
                    date_changed = true;
                }
                JournalAction::SaveRainfall => {
                    let save = form
                        .rainfall_value()
                        .map_err(SaveError::from)
                        .and_then(|mm| Ok(journal.set_rainfall(date, mm)?));
                    queue_save(&self.tasks, ctx, notifications, "Rainfall", save);
                }
                JournalAction::SaveTemperature => {
                    let save = form
                        .temperature_value()
                        .map_err(SaveError::from)
                        .and_then(|reading| {
                            Ok(journal.set_temperature(date, reading.morning, reading.afternoon)?)
                        });
                    queue_save(&self.tasks, ctx, notifications, "Temperature", save);
                }
                JournalAction::SaveComment => {
                    let save = journal.set_comment(date, &form.comment);
                    queue_save(&self.tasks, ctx, notifications, "Comment", Ok(save));
                }
                JournalAction::SaveWatts => {
                    let save = form
                        .watts_value()
                        .map_err(SaveError::from)
                        .and_then(|watts| Ok(journal.set_watts(date, watts)?));
                    queue_save(&self.tasks, ctx, notifications, "Power", save);
                }
                JournalAction::Import => {
                    self.files.pick_import(ctx.clone());
                }
                JournalAction::Export => {
                    self.tasks.export(ctx, journal.export(state::today()));
                }
                JournalAction::SaveSettings => {}
            }
        }

        // Only a new date refills the form; other fields keep unsaved edits
        if date_changed {
            self.refresh();
        } else {
            self.refresh_stats();
        }
    }
}

/// Why a form value could not be saved.
#[derive(Debug, thiserror::Error)]
enum SaveError {
    #[error(transparent)]
    Field(#[from] FieldError),
    #[error(transparent)]
    Journal(#[from] JournalError),
}

fn queue_save(
    tasks: &TaskChannel,
    ctx: &egui::Context,
    notifications: &mut Notifications,
    what: &str,
    save: Result<SaveFuture, SaveError>,
) {
    match save {
        Ok(save) => {
            tasks.save(ctx, format!("{} saved", what), save);
        }
        Err(e) => {
            log::warn!("{} not saved: {}", what, e);
            notifications.warning(e.to_string());
        }
    }
}

impl eframe::App for JournalApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Check for completed journal operations
        for result in self.tasks.try_recv() {
            self.handle_task_result(result, ctx);
        }

        // Check for completed file dialogs
        while let Some(event) = self.files.try_recv() {
            self.handle_file_event(event, ctx);
        }

        self.apply_actions(ctx);

        let mut times = ui::BackupTimes::default();
        if let Some(journal) = &self.journal {
            times.last_export = journal.last_export();
            times.last_save = journal.last_backup();
            self.unload_guard.set_armed(needs_unload_warning(
                journal.rainfall(state::today()),
                times.last_export,
            ));
        }

        ui::render_top_bar(ctx, &mut self.state, times);

        match &self.journal {
            Some(journal) => {
                ui::render_left_panel(ctx, &mut self.state, self.tasks.pending_saves());
                ui::render_right_panel(ctx, &mut self.state, journal);
                ui::render_charts(ctx, &mut self.state, journal.record());
            }
            None => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.centered_and_justified(|ui| {
                        ui.spinner();
                    });
                });
            }
        }

        ui::render_toasts(ctx, &mut self.state);
    }
}
