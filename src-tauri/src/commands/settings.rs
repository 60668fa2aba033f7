use tauri::{AppHandle, Manager};
use crate::state::{AppState, Settings};

#[tauri::command]
pub fn get_settings(app_handle: AppHandle) -> Result<Settings, String> {
    let state = app_handle.state::<AppState>();
    let settings = state.settings.lock().unwrap().clone();
    Ok(settings)
}

#[tauri::command]
pub fn update_settings(app_handle: AppHandle, settings: Settings) -> Result<(), String> {
    let state = app_handle.state::<AppState>();
    let previous_shortcut = state.settings.lock().unwrap().shortcuts.toggle_mute.clone();
    let requested_shortcut = settings.shortcuts.toggle_mute.clone();

    state.apply_settings(settings);

    if requested_shortcut != previous_shortcut {
        crate::hotkey::register_mute_shortcut(&app_handle, &requested_shortcut).map_err(|e| {
            // Keep the old binding and the old value on failure
            let _ = crate::hotkey::register_mute_shortcut(&app_handle, &previous_shortcut);
            state.settings.lock().unwrap().shortcuts.toggle_mute = previous_shortcut.clone();
            e.to_string()
        })?;
    }

    crate::persistence::save_settings(&app_handle);
    crate::commands::emit_status(&app_handle);
    Ok(())
}

#[tauri::command]
pub fn get_shortcut_label(app_handle: AppHandle) -> Result<String, String> {
    let state = app_handle.state::<AppState>();
    let shortcut = state.settings.lock().unwrap().shortcuts.toggle_mute.clone();
    Ok(crate::hotkey::shortcut_display_label(&shortcut))
}

#[tauri::command]
pub fn get_app_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
