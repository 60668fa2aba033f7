pub mod binding;
mod commands;
pub mod engine;
mod hotkey;
pub mod narration;
mod persistence;
pub mod state;

use std::sync::Arc;

use engine::webview::WebviewSpeechEngine;
use state::AppState;
use tauri::Manager;

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    tracing_subscriber::fmt::init();

    tracing::info!("Starting ATS Narrator v{}", env!("CARGO_PKG_VERSION"));

    tauri::Builder::default()
        .plugin(tauri_plugin_global_shortcut::Builder::new().build())
        .plugin(tauri_plugin_store::Builder::new().build())
        .manage(AppState::new())
        .invoke_handler(tauri::generate_handler![
            commands::narration::narration_enqueue,
            commands::narration::narration_clear,
            commands::narration::narration_toggle,
            commands::narration::narration_set_enabled,
            commands::narration::narration_status,
            commands::narration::report_utterance_event,
            commands::narration::report_voices,
            commands::binding::mount_binding,
            commands::binding::update_binding,
            commands::binding::binding_event,
            commands::binding::unmount_binding,
            commands::binding::reset_bindings,
            commands::settings::get_settings,
            commands::settings::update_settings,
            commands::settings::get_shortcut_label,
            commands::settings::get_app_version,
        ])
        .setup(|app| {
            let loaded = persistence::load_settings(app.handle());
            let saved_shortcut = loaded.shortcuts.toggle_mute.clone();
            {
                let state = app.state::<AppState>();
                state.apply_settings(loaded);
                tracing::info!("Settings loaded from store");
            }

            // Speech lives in the webview; it stays silent until the page
            // reports that speechSynthesis exists.
            {
                let state = app.state::<AppState>();
                let engine = Arc::new(WebviewSpeechEngine::new(app.handle().clone()));
                state.attach_webview_engine(engine);

                let handle = app.handle().clone();
                state
                    .bindings
                    .lock()
                    .unwrap()
                    .set_on_load(Arc::new(move || commands::emit_status(&handle)));
            }

            match hotkey::register_with_fallback(app.handle(), &saved_shortcut) {
                Some(bound) if bound != saved_shortcut => {
                    let state = app.state::<AppState>();
                    state.settings.lock().unwrap().shortcuts.toggle_mute = bound;
                    persistence::save_settings(app.handle());
                }
                Some(_) => {}
                None => tracing::warn!("Narration mute has no keyboard shortcut"),
            }

            if let Some(window) = app.get_webview_window("main") {
                let handle = app.handle().clone();
                window.on_window_event(move |event| {
                    if let tauri::WindowEvent::Destroyed = event {
                        let state = handle.state::<AppState>();
                        state.bindings.lock().unwrap().clear();
                        state.narrator.clear_active();
                    }
                });
            }

            tracing::info!("App setup complete");

            Ok(())
        })
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
