pub mod binding;
pub mod narration;
pub mod settings;

use tauri::{AppHandle, Emitter, Manager};

use crate::state::AppState;

pub const STATUS_EVENT: &str = "narration-status";

/// Push the current narration state to the UI indicator.
pub fn emit_status(app_handle: &AppHandle) {
    let state = app_handle.state::<AppState>();
    let snapshot = state.narrator.snapshot();
    if let Err(e) = app_handle.emit(STATUS_EVENT, snapshot) {
        tracing::warn!("Failed to emit narration status: {}", e);
    }
}
