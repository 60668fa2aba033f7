use tauri::{AppHandle, Manager};

use crate::binding::{BindingEvent, BindingId, BindingProps};
use crate::commands::emit_status;
use crate::state::AppState;

/// Tauri command: a wrapped element mounted in the webview
#[tauri::command]
pub fn mount_binding(app_handle: AppHandle, props: BindingProps) -> Result<BindingId, String> {
    let state = app_handle.state::<AppState>();
    let id = state.bindings.lock().unwrap().mount(props);
    Ok(id)
}

#[tauri::command]
pub fn update_binding(app_handle: AppHandle, id: BindingId, props: BindingProps) -> Result<(), String> {
    let state = app_handle.state::<AppState>();
    let retriggered = state
        .bindings
        .lock()
        .unwrap()
        .update(id, props)
        .map_err(|e| e.to_string())?;
    if retriggered {
        emit_status(&app_handle);
    }
    Ok(())
}

/// Tauri command: pointer / focus / click event on a wrapped element
#[tauri::command]
pub fn binding_event(app_handle: AppHandle, id: BindingId, event: BindingEvent) -> Result<(), String> {
    let state = app_handle.state::<AppState>();
    let forwarded = state
        .bindings
        .lock()
        .unwrap()
        .dispatch(id, event)
        .map_err(|e| e.to_string())?;
    if forwarded {
        emit_status(&app_handle);
    }
    Ok(())
}

#[tauri::command]
pub fn unmount_binding(app_handle: AppHandle, id: BindingId) -> Result<(), String> {
    let state = app_handle.state::<AppState>();
    if state.bindings.lock().unwrap().unmount(id) {
        emit_status(&app_handle);
    }
    Ok(())
}

/// Tauri command: the page is reloading, drop every binding it registered
#[tauri::command]
pub fn reset_bindings(app_handle: AppHandle) -> Result<(), String> {
    let state = app_handle.state::<AppState>();
    state.bindings.lock().unwrap().clear();
    emit_status(&app_handle);
    Ok(())
}
