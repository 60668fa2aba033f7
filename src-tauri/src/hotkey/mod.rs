use tauri::{AppHandle, Manager};
use tauri_plugin_global_shortcut::{GlobalShortcutExt, ShortcutState};
use anyhow::Result;

pub const FALLBACK_MUTE_SHORTCUT: &str = "Alt+Shift+N";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HotkeyAction {
    ToggleMute,
}

pub fn handle_hotkey(app_handle: &AppHandle, action: HotkeyAction, shortcut_state: ShortcutState) -> Result<()> {
    // Only act on key press, ignore release
    if shortcut_state == ShortcutState::Released {
        return Ok(());
    }

    match action {
        HotkeyAction::ToggleMute => {
            let state = app_handle.state::<crate::state::AppState>();
            let enabled = state.narrator.toggle_enabled();
            crate::persistence::save_enabled(app_handle, enabled);
            crate::commands::emit_status(app_handle);
        }
    }
    Ok(())
}

/// Bind the mute toggle, replacing whatever shortcut held it before.
pub fn register_mute_shortcut(app_handle: &AppHandle, shortcut: &str) -> Result<()> {
    let global_shortcut = app_handle.global_shortcut();
    global_shortcut.unregister_all()?;
    global_shortcut.on_shortcut(shortcut, |app, _shortcut, event| {
        if let Err(e) = handle_hotkey(app, HotkeyAction::ToggleMute, event.state) {
            tracing::error!("Mute shortcut failed: {}", e);
        }
    })?;
    tracing::info!("Mute shortcut registered: {}", shortcut);
    Ok(())
}

/// Register the saved shortcut, falling back to the default on failure.
/// Returns the shortcut that ended up bound, if any.
pub fn register_with_fallback(app_handle: &AppHandle, shortcut: &str) -> Option<String> {
    match register_mute_shortcut(app_handle, shortcut) {
        Ok(()) => Some(shortcut.to_string()),
        Err(e) => {
            tracing::warn!(
                "Failed to register mute shortcut '{}': {}. Falling back to {}.",
                shortcut,
                e,
                FALLBACK_MUTE_SHORTCUT
            );
            if shortcut == FALLBACK_MUTE_SHORTCUT {
                return None;
            }
            match register_mute_shortcut(app_handle, FALLBACK_MUTE_SHORTCUT) {
                Ok(()) => Some(FALLBACK_MUTE_SHORTCUT.to_string()),
                Err(e2) => {
                    tracing::error!("Failed to register fallback mute shortcut: {}", e2);
                    None
                }
            }
        }
    }
}

/// Human readable form of an accelerator string for the settings page.
pub fn shortcut_display_label(shortcut: &str) -> String {
    shortcut
        .split('+')
        .map(|part| match part.trim().to_ascii_lowercase().as_str() {
            "alt" | "option" => modifier_label("⌥", "Alt"),
            "shift" => modifier_label("⇧", "Shift"),
            "ctrl" | "control" => modifier_label("⌃", "Ctrl"),
            "cmd" | "command" | "super" | "meta" => modifier_label("⌘", "Super"),
            "cmdorctrl" | "commandorcontrol" => modifier_label("⌘", "Ctrl"),
            "space" => "Space".to_string(),
            _ => part.trim().to_uppercase(),
        })
        .collect::<Vec<_>>()
        .join(if cfg!(target_os = "macos") { "" } else { "+" })
}

fn modifier_label(mac: &str, other: &str) -> String {
    if cfg!(target_os = "macos") {
        mac.to_string()
    } else {
        other.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(target_os = "macos"))]
    fn label_spells_out_modifiers() {
        assert_eq!(shortcut_display_label("Alt+Shift+N"), "Alt+Shift+N");
        assert_eq!(shortcut_display_label("ctrl+space"), "Ctrl+Space");
        assert_eq!(shortcut_display_label("CmdOrCtrl+m"), "Ctrl+M");
    }

    #[test]
    #[cfg(target_os = "macos")]
    fn label_uses_modifier_symbols() {
        assert_eq!(shortcut_display_label("Alt+Shift+N"), "⌥⇧N");
        assert_eq!(shortcut_display_label("CmdOrCtrl+m"), "⌘M");
    }
}
