//! Asks for confirmation before the page is closed with unexported data.

use std::cell::Cell;
use std::rc::Rc;

/// Shared flag read by the browser's `beforeunload` handler.
#[derive(Clone, Default)]
pub struct UnloadGuard {
    armed: Rc<Cell<bool>>,
}

impl UnloadGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_armed(&self, armed: bool) {
        self.armed.set(armed);
    }

    /// Registers the `beforeunload` handler on the window.
    #[cfg(target_arch = "wasm32")]
    pub fn install(&self) {
        use wasm_bindgen::prelude::*;
        use wasm_bindgen::JsCast;

        let Some(window) = web_sys::window() else {
            log::warn!("No window, unload guard not installed");
            return;
        };

        let armed = self.armed.clone();
        let handler = Closure::wrap(Box::new(move |event: web_sys::BeforeUnloadEvent| {
            if armed.get() {
                event.prevent_default();
                event.set_return_value("");
            }
        }) as Box<dyn FnMut(_)>);

        window.set_onbeforeunload(Some(handler.as_ref().unchecked_ref()));
        // Lives as long as the page
        handler.forget();
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn install(&self) {}
}
