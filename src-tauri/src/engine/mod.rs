pub mod webview;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::narration::{Category, Generation};

/// A voice offered by the platform speech synthesizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voice {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub language: Option<String>,
}

/// A single utterance handed to the engine
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Utterance {
    pub generation: Generation,
    pub text: String,
    pub category: Category,
    /// `None` selects the engine default voice.
    pub voice_id: Option<String>,
    pub rate: f32,
    pub pitch: f32,
}

/// Lifecycle callback kinds an engine reports per utterance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UtteranceEventKind {
    Started,
    Ended,
    Errored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtteranceEvent {
    pub generation: Generation,
    pub kind: UtteranceEventKind,
}

/// Platform speech synthesis capability.
///
/// `speak` and `cancel_all` are fire-and-forget: playback progress comes
/// back asynchronously as [`UtteranceEvent`]s.
pub trait SpeechEngine: Send + Sync {
    fn is_available(&self) -> bool;
    fn voices(&self) -> Vec<Voice>;
    fn speak(&self, utterance: &Utterance) -> Result<()>;
    fn cancel_all(&self);
}

/// Used when no synthesizer exists (headless runs, tests). Narration
/// degrades to pure bookkeeping.
#[derive(Debug, Default)]
pub struct NullSpeechEngine;

impl SpeechEngine for NullSpeechEngine {
    fn is_available(&self) -> bool {
        false
    }

    fn voices(&self) -> Vec<Voice> {
        Vec::new()
    }

    fn speak(&self, _utterance: &Utterance) -> Result<()> {
        Ok(())
    }

    fn cancel_all(&self) {}
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    pub enum EngineCall {
        Speak(Utterance),
        Cancel,
    }

    /// Records every call; callbacks are simulated by the test.
    #[derive(Debug, Default)]
    pub struct RecordingEngine {
        pub calls: Mutex<Vec<EngineCall>>,
        pub voices: Mutex<Vec<Voice>>,
        pub fail_speak: Mutex<bool>,
        pub unavailable: Mutex<bool>,
    }

    impl RecordingEngine {
        pub fn shared() -> Arc<Self> {
            Arc::new(Self::default())
        }

        pub fn with_voices(voices: Vec<Voice>) -> Arc<Self> {
            let engine = Self::default();
            *engine.voices.lock().unwrap() = voices;
            Arc::new(engine)
        }

        pub fn calls(&self) -> Vec<EngineCall> {
            self.calls.lock().unwrap().clone()
        }

        pub fn spoken(&self) -> Vec<Utterance> {
            self.calls()
                .into_iter()
                .filter_map(|c| match c {
                    EngineCall::Speak(u) => Some(u),
                    EngineCall::Cancel => None,
                })
                .collect()
        }

        pub fn last_spoken(&self) -> Option<Utterance> {
            self.spoken().pop()
        }

        pub fn cancel_count(&self) -> usize {
            self.calls()
                .iter()
                .filter(|c| matches!(c, EngineCall::Cancel))
                .count()
        }
    }

    impl SpeechEngine for RecordingEngine {
        fn is_available(&self) -> bool {
            !*self.unavailable.lock().unwrap()
        }

        fn voices(&self) -> Vec<Voice> {
            self.voices.lock().unwrap().clone()
        }

        fn speak(&self, utterance: &Utterance) -> Result<()> {
            self.calls
                .lock()
                .unwrap()
                .push(EngineCall::Speak(utterance.clone()));
            if *self.fail_speak.lock().unwrap() {
                anyhow::bail!("synthesizer rejected utterance");
            }
            Ok(())
        }

        fn cancel_all(&self) {
            self.calls.lock().unwrap().push(EngineCall::Cancel);
        }
    }

    pub fn voice(name: &str) -> Voice {
        Voice {
            id: name.to_lowercase().replace(' ', "-"),
            name: name.to_string(),
            language: Some("en-US".to_string()),
        }
    }
}
