//! Async file picking and export delivery with cross-platform support.
//!
//! Uses channel-based communication to bridge async file dialogs
//! with egui's synchronous update loop.

use crate::journal::ExportFile;
use eframe::egui;
use std::sync::mpsc::{channel, Receiver, Sender};

#[derive(Debug, thiserror::Error)]
pub enum FileError {
    #[error("{0} is not a UTF-8 text file")]
    NotText(String),
    #[error("could not write {path}: {message}")]
    Write { path: String, message: String },
    #[error("download failed: {0}")]
    Download(String),
}

/// A picked import file, read as text.
#[derive(Debug, Clone)]
pub struct PickedFile {
    pub file_name: String,
    pub text: String,
}

/// Completed file operation.
#[derive(Debug)]
pub enum FileEvent {
    /// The import dialog closed; `None` if it was cancelled.
    Picked(Option<Result<PickedFile, FileError>>),
    /// An export was written or offered for download; `None` if cancelled.
    Exported(Option<Result<String, FileError>>),
}

/// Channel-based file operations for async dialog integration.
pub struct FileChannel {
    sender: Sender<FileEvent>,
    receiver: Receiver<FileEvent>,
}

impl Default for FileChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl FileChannel {
    pub fn new() -> Self {
        let (sender, receiver) = channel();
        Self { sender, receiver }
    }

    /// Opens a dialog to pick a JSON file to import.
    ///
    /// On native: spawns a new thread using pollster to block on the async dialog.
    /// On WASM: uses wasm_bindgen_futures::spawn_local.
    pub fn pick_import(&self, ctx: egui::Context) {
        let sender = self.sender.clone();

        #[cfg(not(target_arch = "wasm32"))]
        {
            std::thread::spawn(move || {
                let result = pollster::block_on(async_pick_file());
                let _ = sender.send(FileEvent::Picked(result));
                ctx.request_repaint();
            });
        }

        #[cfg(target_arch = "wasm32")]
        {
            wasm_bindgen_futures::spawn_local(async move {
                let result = async_pick_file().await;
                let _ = sender.send(FileEvent::Picked(result));
                ctx.request_repaint();
            });
        }
    }

    /// Hands an export to the user: a browser download on WASM, a save
    /// dialog on native.
    pub fn deliver_export(&self, ctx: egui::Context, file: ExportFile) {
        let sender = self.sender.clone();

        #[cfg(not(target_arch = "wasm32"))]
        {
            std::thread::spawn(move || {
                let result = pollster::block_on(save_with_dialog(file));
                let _ = sender.send(FileEvent::Exported(result));
                ctx.request_repaint();
            });
        }

        #[cfg(target_arch = "wasm32")]
        {
            let result = download(&file).map(|()| file.file_name);
            let _ = sender.send(FileEvent::Exported(Some(result)));
            ctx.request_repaint();
        }
    }

    /// Non-blocking check for a completed file operation.
    pub fn try_recv(&self) -> Option<FileEvent> {
        self.receiver.try_recv().ok()
    }
}

/// Async file picker implementation using rfd.
async fn async_pick_file() -> Option<Result<PickedFile, FileError>> {
    let file = rfd::AsyncFileDialog::new()
        .set_title("Import journal")
        .add_filter("JSON", &["json"])
        .pick_file()
        .await?;

    let file_name = file.file_name();
    let bytes = file.read().await;
    log::info!("Picked import file {} ({} bytes)", file_name, bytes.len());

    Some(
        String::from_utf8(bytes)
            .map(|text| PickedFile {
                file_name: file_name.clone(),
                text,
            })
            .map_err(|_| FileError::NotText(file_name)),
    )
}

#[cfg(not(target_arch = "wasm32"))]
async fn save_with_dialog(file: ExportFile) -> Option<Result<String, FileError>> {
    let handle = rfd::AsyncFileDialog::new()
        .set_title("Export journal")
        .set_file_name(&file.file_name)
        .add_filter("JSON", &["json"])
        .save_file()
        .await?;

    let path = handle.path().to_path_buf();
    Some(
        std::fs::write(&path, file.contents.as_bytes())
            .map(|()| path.display().to_string())
            .map_err(|e| FileError::Write {
                path: path.display().to_string(),
                message: e.to_string(),
            }),
    )
}

/// Triggers a browser download of the export through a temporary object URL.
#[cfg(target_arch = "wasm32")]
fn download(file: &ExportFile) -> Result<(), FileError> {
    use wasm_bindgen::{JsCast, JsValue};

    let js_err = |e: JsValue| FileError::Download(format!("{:?}", e));

    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| FileError::Download("No document".to_string()))?;

    let parts = js_sys::Array::of1(&JsValue::from_str(&file.contents));
    let options = web_sys::BlobPropertyBag::new();
    options.set_type("application/json");
    let blob = web_sys::Blob::new_with_str_sequence_and_options(&parts, &options).map_err(js_err)?;
    let url = web_sys::Url::create_object_url_with_blob(&blob).map_err(js_err)?;

    let anchor: web_sys::HtmlAnchorElement = document
        .create_element("a")
        .map_err(js_err)?
        .dyn_into()
        .map_err(|_| FileError::Download("Failed to create link".to_string()))?;
    anchor.set_href(&url);
    anchor.set_download(&file.file_name);
    anchor.click();

    web_sys::Url::revoke_object_url(&url).map_err(js_err)?;
    log::info!("Offered {} for download", file.file_name);
    Ok(())
}
