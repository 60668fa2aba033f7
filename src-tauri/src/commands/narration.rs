use tauri::{AppHandle, Manager};

use crate::commands::emit_status;
use crate::engine::{UtteranceEvent, UtteranceEventKind, Voice};
use crate::narration::{Category, Generation, ItemId, NarrationSnapshot};
use crate::state::AppState;

/// Tauri command: narrate arbitrary text, e.g. a walkthrough step
#[tauri::command]
pub fn narration_enqueue(
    app_handle: AppHandle,
    text: String,
    category: Option<Category>,
) -> Result<Option<ItemId>, String> {
    let state = app_handle.state::<AppState>();
    let outcome = state
        .narrator
        .enqueue(text, category.unwrap_or_default());
    emit_status(&app_handle);
    Ok(outcome.id())
}

/// Tauri command: stop the current narration
#[tauri::command]
pub fn narration_clear(app_handle: AppHandle) -> Result<(), String> {
    let state = app_handle.state::<AppState>();
    if state.narrator.clear_active() {
        emit_status(&app_handle);
    }
    Ok(())
}

/// Tauri command: flip the mute switch, returns the new state
#[tauri::command]
pub fn narration_toggle(app_handle: AppHandle) -> Result<bool, String> {
    let state = app_handle.state::<AppState>();
    let enabled = state.narrator.toggle_enabled();
    crate::persistence::save_enabled(&app_handle, enabled);
    emit_status(&app_handle);
    Ok(enabled)
}

#[tauri::command]
pub fn narration_set_enabled(app_handle: AppHandle, enabled: bool) -> Result<(), String> {
    let state = app_handle.state::<AppState>();
    state.narrator.set_enabled(enabled);
    crate::persistence::save_enabled(&app_handle, enabled);
    emit_status(&app_handle);
    Ok(())
}

#[tauri::command]
pub fn narration_status(app_handle: AppHandle) -> Result<NarrationSnapshot, String> {
    let state = app_handle.state::<AppState>();
    Ok(state.narrator.snapshot())
}

/// Tauri command: webview speech callback (start / end / error)
#[tauri::command]
pub fn report_utterance_event(
    app_handle: AppHandle,
    generation: Generation,
    kind: UtteranceEventKind,
) -> Result<(), String> {
    let state = app_handle.state::<AppState>();
    if state
        .narrator
        .handle_engine_event(UtteranceEvent { generation, kind })
    {
        emit_status(&app_handle);
    }
    Ok(())
}

/// Tauri command: webview reports whether it can speak and with which voices
#[tauri::command]
pub fn report_voices(app_handle: AppHandle, supported: bool, voices: Vec<Voice>) -> Result<(), String> {
    let state = app_handle.state::<AppState>();
    let engine = state.webview_engine.lock().unwrap().clone();
    match engine {
        Some(engine) => {
            engine.update_capability(supported, voices);
            state.narrator.engine_capability_changed();
            emit_status(&app_handle);
            Ok(())
        }
        None => Err("Speech bridge not ready".into()),
    }
}
