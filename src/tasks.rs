//! Async journal operations without blocking the UI.
//!
//! Opening, saving and exporting are async, but egui's update() is
//! synchronous. Each operation is spawned on the browser's event loop and
//! its result is parked here until the next frame picks it up.

use crate::journal::{ExportFile, Journal, JournalError, SaveFuture};
use crate::storage::{FlagStore, KeyValueStore};
use eframe::egui::Context;
use futures_util::future::LocalBoxFuture;
use std::cell::{Cell, RefCell};
use std::future::Future;
use std::rc::Rc;

#[cfg(target_arch = "wasm32")]
pub type AppStore = crate::storage::IndexedDbStore;
#[cfg(target_arch = "wasm32")]
pub type AppFlags = crate::storage::LocalStorageFlags;

#[cfg(not(target_arch = "wasm32"))]
pub type AppStore = crate::storage::MemoryStore;
#[cfg(not(target_arch = "wasm32"))]
pub type AppFlags = crate::storage::MemoryFlags;

pub type AppJournal = Journal<AppStore, AppFlags>;

/// Result of a completed journal operation.
pub enum TaskResult<J> {
    /// The journal finished migrating and loading.
    Opened(J),
    /// A save finished.
    Saved {
        /// Message to confirm with once the write succeeded
        confirmation: String,
        result: Result<(), JournalError>,
    },
    /// An export was serialized and is ready to hand to the browser.
    Exported(Result<ExportFile, JournalError>),
}

/// Channel for async journal operations.
pub struct TaskChannel<J = AppJournal> {
    results: Rc<RefCell<Vec<TaskResult<J>>>>,
    pending_saves: Rc<Cell<u32>>,
}

impl<J: 'static> Default for TaskChannel<J> {
    fn default() -> Self {
        Self::new()
    }
}

impl<J: 'static> TaskChannel<J> {
    pub fn new() -> Self {
        Self {
            results: Rc::new(RefCell::new(Vec::new())),
            pending_saves: Rc::new(Cell::new(0)),
        }
    }

    /// Number of saves that have not completed yet.
    pub fn pending_saves(&self) -> u32 {
        self.pending_saves.get()
    }

    /// Runs a save in the background; `confirmation` comes back with the
    /// result.
    pub fn save(&self, ctx: &Context, confirmation: impl Into<String>, save: SaveFuture) {
        let confirmation = confirmation.into();
        let results = self.results.clone();
        let pending = self.pending_saves.clone();
        let ctx = ctx.clone();

        pending.set(pending.get() + 1);
        spawn(async move {
            let result = save.await;
            pending.set(pending.get().saturating_sub(1));
            results
                .borrow_mut()
                .push(TaskResult::Saved { confirmation, result });
            ctx.request_repaint();
        });
    }

    /// Runs an export in the background.
    pub fn export(
        &self,
        ctx: &Context,
        export: LocalBoxFuture<'static, Result<ExportFile, JournalError>>,
    ) {
        let results = self.results.clone();
        let ctx = ctx.clone();

        spawn(async move {
            let result = export.await;
            results.borrow_mut().push(TaskResult::Exported(result));
            ctx.request_repaint();
        });
    }

    /// Non-blocking receive of every completed operation.
    pub fn try_recv(&self) -> Vec<TaskResult<J>> {
        std::mem::take(&mut *self.results.borrow_mut())
    }
}

impl<S, F> TaskChannel<Journal<S, F>>
where
    S: KeyValueStore + Clone + 'static,
    F: FlagStore + Clone + 'static,
{
    /// Opens the journal (migration, then load) in the background.
    pub fn open_journal(&self, ctx: &Context, store: S, flags: F) {
        let results = self.results.clone();
        let ctx = ctx.clone();

        spawn(async move {
            log::info!("Opening journal");
            let journal = Journal::open(store, flags).await;
            results.borrow_mut().push(TaskResult::Opened(journal));
            ctx.request_repaint();
        });
    }
}

/// On WASM: spawns on the browser event loop.
/// On native: the in-memory store never suspends, so the future is driven to
/// completion right away.
fn spawn(future: impl Future<Output = ()> + 'static) {
    #[cfg(target_arch = "wasm32")]
    wasm_bindgen_futures::spawn_local(future);

    #[cfg(not(target_arch = "wasm32"))]
    pollster::block_on(future);
}
