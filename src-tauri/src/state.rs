use std::sync::{Arc, Mutex};
use std::time::Duration;
use serde::{Serialize, Deserialize};

use crate::binding::BindingRegistry;
use crate::engine::webview::WebviewSpeechEngine;
use crate::engine::NullSpeechEngine;
use crate::narration::store::DEFAULT_MAX_QUEUE_LEN;
use crate::narration::Narrator;

pub struct AppState {
    pub narrator: Arc<Narrator>,
    pub bindings: Mutex<BindingRegistry>,
    pub settings: Mutex<Settings>,
    /// Set once the main webview exists; it reports voices back through here.
    pub webview_engine: Mutex<Option<Arc<WebviewSpeechEngine>>>,
}

impl AppState {
    pub fn new() -> Self {
        let settings = Settings::default();
        let narrator = Arc::new(Narrator::new(Arc::new(NullSpeechEngine), &settings));
        let bindings = BindingRegistry::new(narrator.clone(), settings.narration.load_trigger_delay());
        Self {
            narrator,
            bindings: Mutex::new(bindings),
            settings: Mutex::new(settings),
            webview_engine: Mutex::new(None),
        }
    }

    /// Push settings into the live narration components and keep a copy.
    pub fn apply_settings(&self, settings: Settings) {
        self.narrator.configure(&settings);
        self.bindings
            .lock()
            .unwrap()
            .set_load_delay(settings.narration.load_trigger_delay());
        *self.settings.lock().unwrap() = settings;
    }

    pub fn attach_webview_engine(&self, engine: Arc<WebviewSpeechEngine>) {
        *self.webview_engine.lock().unwrap() = Some(engine.clone());
        self.narrator.set_engine(engine);
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub shortcuts: ShortcutSettings,
    #[serde(default)]
    pub narration: NarrationSettings,
    #[serde(default)]
    pub voices: VoiceSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            shortcuts: ShortcutSettings::default(),
            narration: NarrationSettings::default(),
            voices: VoiceSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortcutSettings {
    pub toggle_mute: String,
}

impl Default for ShortcutSettings {
    fn default() -> Self {
        Self {
            toggle_mute: "Alt+Shift+N".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarrationSettings {
    pub enabled: bool,
    #[serde(default = "default_max_queue_len")]
    pub max_queue_len: usize,
    /// Delay before a "trigger on load" binding speaks after mounting.
    #[serde(default = "default_load_trigger_delay_ms")]
    pub load_trigger_delay_ms: u64,
}

fn default_max_queue_len() -> usize {
    DEFAULT_MAX_QUEUE_LEN
}

fn default_load_trigger_delay_ms() -> u64 {
    500
}

impl NarrationSettings {
    pub fn load_trigger_delay(&self) -> Duration {
        Duration::from_millis(self.load_trigger_delay_ms)
    }
}

impl Default for NarrationSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            max_queue_len: default_max_queue_len(),
            load_trigger_delay_ms: default_load_trigger_delay_ms(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceSettings {
    pub informational: VoiceProfile,
    pub decision: VoiceProfile,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            informational: VoiceProfile {
                rate: 1.2,
                pitch: 1.1,
                preferred_voice: None,
            },
            decision: VoiceProfile {
                rate: 1.0,
                pitch: 0.9,
                preferred_voice: None,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceProfile {
    pub rate: f32,
    pub pitch: f32,
    /// Voice id or name fragment tried before the built-in hints.
    #[serde(default)]
    pub preferred_voice: Option<String>,
}
