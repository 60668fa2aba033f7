use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use anyhow::Result;
use tauri::{AppHandle, Emitter};

use super::{SpeechEngine, Utterance, Voice};

pub const SPEAK_EVENT: &str = "narration-speak";
pub const CANCEL_EVENT: &str = "narration-cancel";

/// Speech synthesis owned by the webview (`window.speechSynthesis`).
///
/// Utterances go out as Tauri events; the page reports its voices and
/// per-utterance start/end/error callbacks back through commands. Until
/// the page has reported that synthesis exists, the engine counts as
/// unavailable and narration stays silent.
pub struct WebviewSpeechEngine {
    app_handle: AppHandle,
    available: AtomicBool,
    voices: Mutex<Vec<Voice>>,
}

impl WebviewSpeechEngine {
    pub fn new(app_handle: AppHandle) -> Self {
        Self {
            app_handle,
            available: AtomicBool::new(false),
            voices: Mutex::new(Vec::new()),
        }
    }

    /// Called whenever the page's voice list changes (it loads lazily).
    pub fn update_capability(&self, supported: bool, voices: Vec<Voice>) {
        tracing::info!(
            "Webview speech synthesis {} with {} voices",
            if supported { "available" } else { "unavailable" },
            voices.len()
        );
        self.available.store(supported, Ordering::SeqCst);
        *self.voices.lock().unwrap() = voices;
    }
}

impl SpeechEngine for WebviewSpeechEngine {
    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    fn voices(&self) -> Vec<Voice> {
        self.voices.lock().unwrap().clone()
    }

    fn speak(&self, utterance: &Utterance) -> Result<()> {
        tracing::debug!(
            "Speaking generation {} ({:?})",
            utterance.generation.0,
            utterance.category
        );
        self.app_handle.emit(SPEAK_EVENT, utterance)?;
        Ok(())
    }

    fn cancel_all(&self) {
        if let Err(e) = self.app_handle.emit(CANCEL_EVENT, ()) {
            tracing::warn!("Failed to cancel webview speech: {}", e);
        }
    }
}
