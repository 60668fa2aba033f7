use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::engine::{SpeechEngine, UtteranceEvent, UtteranceEventKind};
use crate::state::Settings;

use super::driver::{Reconciled, SpeechDriver};
use super::store::NarrationStore;
use super::{Category, Enqueued, ItemId, NarrationSnapshot, Withdrawn};

struct Inner {
    store: NarrationStore,
    driver: SpeechDriver,
}

impl Inner {
    /// Reconcile until the engine has accepted the active item or the store
    /// is idle. Refused utterances complete immediately and let the next
    /// queued item through.
    fn sync(&mut self) {
        loop {
            match self.driver.reconcile(&self.store) {
                Reconciled::Failed(generation) => {
                    self.store.complete(generation);
                }
                _ => break,
            }
        }
    }
}

/// Narration coordinator: one per application, shared by every bound
/// element. All narration intent is serialized through its lock.
pub struct Narrator {
    inner: Mutex<Inner>,
}

impl Narrator {
    pub fn new(engine: Arc<dyn SpeechEngine>, settings: &Settings) -> Self {
        let store = NarrationStore::new(settings.narration.enabled, settings.narration.max_queue_len);
        let driver = SpeechDriver::new(engine, settings.voices.clone());
        Self {
            inner: Mutex::new(Inner { store, driver }),
        }
    }

    /// Narration must never take the app down, so a poisoned lock is reused.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_engine(&self, engine: Arc<dyn SpeechEngine>) {
        let mut inner = self.lock();
        inner.driver.set_engine(engine);
        inner.sync();
    }

    /// The engine's availability or voice list changed; speak an item that
    /// went out silently while it was warming up.
    pub fn engine_capability_changed(&self) {
        let mut inner = self.lock();
        inner.driver.retry_silent();
        inner.sync();
    }

    pub fn configure(&self, settings: &Settings) {
        let mut inner = self.lock();
        inner.driver.set_voices(settings.voices.clone());
        inner.store.set_max_queue_len(settings.narration.max_queue_len);
        if inner.store.is_enabled() != settings.narration.enabled {
            inner.store.set_enabled(settings.narration.enabled);
        }
        inner.sync();
    }

    pub fn enqueue(&self, text: impl Into<String>, category: Category) -> Enqueued {
        let mut inner = self.lock();
        let outcome = inner.store.enqueue(text, category);
        match outcome {
            Enqueued::Ignored => tracing::debug!("Narration muted, ignoring enqueue"),
            Enqueued::Dropped => {}
            Enqueued::Activated { id, .. } => tracing::debug!("Narration {:?} speaking next", id),
            Enqueued::Queued { id, position } => {
                tracing::debug!("Narration {:?} queued at position {}", id, position)
            }
        }
        inner.sync();
        outcome
    }

    /// Interrupt the active item. Returns whether anything was active.
    pub fn clear_active(&self) -> bool {
        let mut inner = self.lock();
        let cleared = inner.store.clear_active().is_some();
        inner.sync();
        cleared
    }

    pub fn toggle_enabled(&self) -> bool {
        let mut inner = self.lock();
        let enabled = inner.store.toggle_enabled();
        inner.sync();
        tracing::info!("Narration {}", if enabled { "enabled" } else { "muted" });
        enabled
    }

    pub fn set_enabled(&self, enabled: bool) {
        let mut inner = self.lock();
        inner.store.set_enabled(enabled);
        inner.sync();
    }

    pub fn withdraw(&self, id: ItemId) -> Withdrawn {
        let mut inner = self.lock();
        let outcome = inner.store.withdraw(id);
        inner.sync();
        outcome
    }

    pub fn holds(&self, id: ItemId) -> bool {
        self.lock().store.holds(id)
    }

    /// Feed an engine lifecycle callback back in. Returns whether it
    /// changed anything; callbacks for superseded generations are dropped.
    pub fn handle_engine_event(&self, event: UtteranceEvent) -> bool {
        let mut inner = self.lock();
        let applied = match event.kind {
            UtteranceEventKind::Started => inner.store.mark_started(event.generation),
            UtteranceEventKind::Ended | UtteranceEventKind::Errored => {
                if event.kind == UtteranceEventKind::Errored {
                    tracing::debug!("Utterance {} errored, treating as finished", event.generation.0);
                }
                let completed = inner.store.complete(event.generation);
                if completed {
                    inner.driver.release(event.generation);
                }
                completed
            }
        };

        if !applied {
            tracing::debug!(
                "Ignoring stale {:?} for generation {}",
                event.kind,
                event.generation.0
            );
            return false;
        }

        inner.sync();
        true
    }

    pub fn is_playing(&self) -> bool {
        self.lock().store.is_playing()
    }

    pub fn is_enabled(&self) -> bool {
        self.lock().store.is_enabled()
    }

    pub fn snapshot(&self) -> NarrationSnapshot {
        self.lock().store.snapshot()
    }
}
