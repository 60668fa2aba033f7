use std::sync::Arc;

use crate::engine::{SpeechEngine, Utterance, Voice};
use crate::state::{VoiceProfile, VoiceSettings};

use super::store::NarrationStore;
use super::{Category, Generation, NarrationItem};

/// Name fragments suggesting a lighter voice, used for informational tips.
const INFORMATIONAL_VOICE_HINTS: &[&str] =
    &["female", "samantha", "victoria", "zira", "karen", "susan"];

/// Name fragments suggesting a deeper voice, used for decision points.
const DECISION_VOICE_HINTS: &[&str] = &["male", "daniel", "alex", "david", "fred", "george"];

/// What a reconcile pass did to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciled {
    Unchanged,
    Cancelled,
    Submitted(Generation),
    /// No synthesizer; the item stays active as bookkeeping only.
    Silent(Generation),
    /// The engine refused the utterance. Callers treat this as completion.
    Failed(Generation),
}

/// The only component that talks to the speech engine.
pub struct SpeechDriver {
    engine: Arc<dyn SpeechEngine>,
    voices: VoiceSettings,
    submitted: Option<Generation>,
    /// The submitted generation went out while the engine was unavailable.
    silent: bool,
}

impl SpeechDriver {
    pub fn new(engine: Arc<dyn SpeechEngine>, voices: VoiceSettings) -> Self {
        Self {
            engine,
            voices,
            submitted: None,
            silent: false,
        }
    }

    pub fn submitted(&self) -> Option<Generation> {
        self.submitted
    }

    pub fn set_voices(&mut self, voices: VoiceSettings) {
        self.voices = voices;
    }

    /// Swap the engine, silencing whatever the old one was saying.
    pub fn set_engine(&mut self, engine: Arc<dyn SpeechEngine>) {
        if self.submitted.take().is_some() {
            self.engine.cancel_all();
        }
        self.engine = engine;
    }

    /// Bring the engine in line with the store's active item.
    pub fn reconcile(&mut self, store: &NarrationStore) -> Reconciled {
        let target = store.active().filter(|_| store.is_enabled());

        let Some(active) = target else {
            return if self.submitted.take().is_some() {
                self.engine.cancel_all();
                Reconciled::Cancelled
            } else {
                Reconciled::Unchanged
            };
        };

        if self.submitted == Some(active.generation) {
            return Reconciled::Unchanged;
        }

        if self.submitted.take().is_some() {
            self.engine.cancel_all();
        }
        self.submitted = Some(active.generation);
        self.silent = !self.engine.is_available();

        if self.silent {
            tracing::debug!("Speech engine unavailable, narration is silent");
            return Reconciled::Silent(active.generation);
        }

        let utterance = self.utterance_for(&active.item, active.generation);
        match self.engine.speak(&utterance) {
            Ok(()) => Reconciled::Submitted(active.generation),
            Err(e) => {
                tracing::warn!("Speech engine rejected narration: {}", e);
                self.submitted = None;
                Reconciled::Failed(active.generation)
            }
        }
    }

    /// Let an item that went out silently be spoken on the next reconcile,
    /// once the engine has become available.
    pub fn retry_silent(&mut self) {
        if self.silent && self.submitted.is_some() {
            self.submitted = None;
            self.silent = false;
        }
    }

    /// Forget an utterance that finished on its own so the next reconcile
    /// does not cancel it again.
    pub fn release(&mut self, generation: Generation) {
        if self.submitted == Some(generation) {
            self.submitted = None;
        }
    }

    fn utterance_for(&self, item: &NarrationItem, generation: Generation) -> Utterance {
        let profile = self.profile(item.category);
        let voices = self.engine.voices();
        let voice = select_voice(&voices, item.category, profile.preferred_voice.as_deref());

        Utterance {
            generation,
            text: item.text.clone(),
            category: item.category,
            voice_id: voice.map(|v| v.id.clone()),
            rate: profile.rate,
            pitch: profile.pitch,
        }
    }

    fn profile(&self, category: Category) -> &VoiceProfile {
        match category {
            Category::Informational => &self.voices.informational,
            Category::Decision => &self.voices.decision,
        }
    }
}

/// Best-effort voice pick by name. An explicit preference wins, then the
/// category hints in priority order. `None` means the engine default.
pub fn select_voice<'a>(
    voices: &'a [Voice],
    category: Category,
    preferred: Option<&str>,
) -> Option<&'a Voice> {
    if let Some(preferred) = preferred.filter(|p| !p.is_empty()) {
        let preferred = preferred.to_lowercase();
        if let Some(voice) = voices
            .iter()
            .find(|v| v.id.to_lowercase() == preferred || v.name.to_lowercase().contains(&preferred))
        {
            return Some(voice);
        }
    }

    let hints = match category {
        Category::Informational => INFORMATIONAL_VOICE_HINTS,
        Category::Decision => DECISION_VOICE_HINTS,
    };

    hints.iter().find_map(|hint| {
        voices
            .iter()
            .find(|v| name_suggests(&v.name.to_lowercase(), hint))
    })
}

fn name_suggests(name: &str, hint: &str) -> bool {
    // "female" contains "male"
    if hint == "male" {
        return name.contains("male") && !name.contains("female");
    }
    name.contains(hint)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::{voice, EngineCall, RecordingEngine};
    use crate::engine::NullSpeechEngine;

    fn driver(engine: Arc<RecordingEngine>) -> SpeechDriver {
        SpeechDriver::new(engine, VoiceSettings::default())
    }

    #[test]
    fn picks_category_voices_by_name() {
        let voices = vec![
            voice("Google UK English Male"),
            voice("Google UK English Female"),
            voice("Daniel"),
        ];

        let info = select_voice(&voices, Category::Informational, None).unwrap();
        assert_eq!(info.name, "Google UK English Female");

        let decision = select_voice(&voices, Category::Decision, None).unwrap();
        assert_eq!(decision.name, "Google UK English Male");
    }

    #[test]
    fn female_voice_never_satisfies_male_hint() {
        let voices = vec![voice("Microsoft Zira Female")];
        assert!(select_voice(&voices, Category::Decision, None).is_none());
    }

    #[test]
    fn explicit_preference_beats_hints() {
        let voices = vec![voice("Samantha"), voice("Moira")];
        let picked = select_voice(&voices, Category::Informational, Some("moira")).unwrap();
        assert_eq!(picked.name, "Moira");
    }

    #[test]
    fn no_voices_falls_back_to_engine_default() {
        assert!(select_voice(&[], Category::Informational, None).is_none());
        assert!(select_voice(&[voice("Xander")], Category::Decision, Some("nobody")).is_none());
    }

    #[test]
    fn renders_rate_and_pitch_per_category() {
        let engine = RecordingEngine::with_voices(vec![voice("Samantha"), voice("Alex")]);
        let mut driver = driver(engine.clone());
        let mut store = NarrationStore::default();

        store.enqueue("Tip: table", Category::Informational);
        driver.reconcile(&store);
        let info = engine.last_spoken().unwrap();
        assert_eq!(info.rate, 1.2);
        assert!(info.pitch > 1.0);
        assert_eq!(info.voice_id.as_deref(), Some("samantha"));

        store.clear_active();
        store.enqueue("Important decision: reject", Category::Decision);
        driver.reconcile(&store);
        let decision = engine.last_spoken().unwrap();
        assert_eq!(decision.rate, 1.0);
        assert!(decision.pitch < 1.0);
        assert_eq!(decision.voice_id.as_deref(), Some("alex"));
    }

    #[test]
    fn reconcile_submits_once_per_generation() {
        let engine = RecordingEngine::shared();
        let mut driver = driver(engine.clone());
        let mut store = NarrationStore::default();
        store.enqueue("hello", Category::Informational);

        let generation = store.active().unwrap().generation;
        assert_eq!(driver.reconcile(&store), Reconciled::Submitted(generation));
        assert_eq!(driver.reconcile(&store), Reconciled::Unchanged);
        assert_eq!(engine.spoken().len(), 1);
    }

    #[test]
    fn cancelling_is_idempotent() {
        let engine = RecordingEngine::shared();
        let mut driver = driver(engine.clone());
        let mut store = NarrationStore::default();
        store.enqueue("hello", Category::Informational);
        driver.reconcile(&store);

        store.clear_active();
        assert_eq!(driver.reconcile(&store), Reconciled::Cancelled);
        assert_eq!(driver.reconcile(&store), Reconciled::Unchanged);
        assert_eq!(engine.cancel_count(), 1);
    }

    #[test]
    fn interruption_cancels_before_speaking_next() {
        let engine = RecordingEngine::shared();
        let mut driver = driver(engine.clone());
        let mut store = NarrationStore::default();
        store.enqueue("A", Category::Informational);
        store.enqueue("B", Category::Informational);
        driver.reconcile(&store);

        store.clear_active();
        driver.reconcile(&store);

        let calls = engine.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[1], EngineCall::Cancel);
        assert!(matches!(&calls[2], EngineCall::Speak(u) if u.text == "B"));
    }

    #[test]
    fn released_generation_is_not_cancelled_again() {
        let engine = RecordingEngine::shared();
        let mut driver = driver(engine.clone());
        let mut store = NarrationStore::default();
        store.enqueue("A", Category::Informational);
        store.enqueue("B", Category::Informational);
        driver.reconcile(&store);

        let generation = store.active().unwrap().generation;
        store.complete(generation);
        driver.release(generation);
        driver.reconcile(&store);

        assert_eq!(engine.cancel_count(), 0);
        assert_eq!(engine.spoken().len(), 2);
    }

    #[test]
    fn engine_failure_is_reported_for_completion() {
        let engine = RecordingEngine::shared();
        *engine.fail_speak.lock().unwrap() = true;
        let mut driver = driver(engine.clone());
        let mut store = NarrationStore::default();
        store.enqueue("A", Category::Informational);

        let generation = store.active().unwrap().generation;
        assert_eq!(driver.reconcile(&store), Reconciled::Failed(generation));
        assert_eq!(driver.submitted(), None);
    }

    #[test]
    fn unavailable_engine_keeps_bookkeeping_only() {
        let mut driver = SpeechDriver::new(Arc::new(NullSpeechEngine), VoiceSettings::default());
        let mut store = NarrationStore::default();
        store.enqueue("A", Category::Informational);

        let generation = store.active().unwrap().generation;
        assert_eq!(driver.reconcile(&store), Reconciled::Silent(generation));
        assert_eq!(driver.reconcile(&store), Reconciled::Unchanged);
    }

    #[test]
    fn silent_item_is_spoken_once_engine_warms_up() {
        let engine = RecordingEngine::shared();
        *engine.unavailable.lock().unwrap() = true;
        let mut driver = driver(engine.clone());
        let mut store = NarrationStore::default();
        store.enqueue("A", Category::Informational);

        let generation = store.active().unwrap().generation;
        assert_eq!(driver.reconcile(&store), Reconciled::Silent(generation));

        driver.retry_silent();
        assert_eq!(driver.reconcile(&store), Reconciled::Silent(generation));
        assert!(engine.spoken().is_empty());

        *engine.unavailable.lock().unwrap() = false;
        driver.retry_silent();
        assert_eq!(driver.reconcile(&store), Reconciled::Submitted(generation));
        assert_eq!(engine.cancel_count(), 0);
    }

    #[test]
    fn retry_does_not_resubmit_audible_items() {
        let engine = RecordingEngine::shared();
        let mut driver = driver(engine.clone());
        let mut store = NarrationStore::default();
        store.enqueue("A", Category::Informational);
        driver.reconcile(&store);

        driver.retry_silent();
        assert_eq!(driver.reconcile(&store), Reconciled::Unchanged);
        assert_eq!(engine.spoken().len(), 1);
    }
}
