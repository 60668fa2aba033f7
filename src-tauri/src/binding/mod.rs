pub mod registry;

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tauri::async_runtime::{JoinHandle, RuntimeHandle};

use crate::narration::{Category, ItemId, Narrator, Withdrawn};

pub use registry::{BindingId, BindingRegistry};

/// What a wrapped UI element declares about itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BindingProps {
    /// Diagnostic id, not required to be unique.
    pub selector: String,
    pub text: String,
    #[serde(default)]
    pub action_step: Option<String>,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub help_text: Option<String>,
    #[serde(default)]
    pub trigger_on_load: bool,
}

impl BindingProps {
    /// Help text always marks a decision point; otherwise the declared
    /// category applies.
    pub fn effective_category(&self) -> Category {
        match self.help_text.as_deref() {
            Some(help) if !help.trim().is_empty() => Category::Decision,
            _ => self.category,
        }
    }

    pub fn utterance(&self) -> String {
        let category = self.effective_category();
        let mut text = format!("{}{}", category.prefix(), self.text);
        if let Some(step) = self.action_step.as_deref().filter(|s| !s.is_empty()) {
            text.push(' ');
            text.push_str(step);
        }
        text
    }

    /// What was said, per element. Help text is covered through the prefix
    /// it forces.
    fn dedup_key(&self) -> String {
        format!("{}\u{1f}{}", self.selector, self.utterance())
    }
}

/// DOM events the webview forwards for a wrapped element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingEvent {
    PointerEnter,
    PointerLeave,
    Focus,
    Blur,
    Click,
}

impl BindingEvent {
    /// Click counts as activation so keyboard and touch users, who never
    /// hover, still hear narration. It has no matching "leave".
    pub fn is_activation(self) -> bool {
        matches!(self, BindingEvent::PointerEnter | BindingEvent::Focus | BindingEvent::Click)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingPhase {
    Idle,
    Triggered,
}

/// Called after a load-triggered narration was accepted, so the UI
/// indicator can refresh.
pub type LoadNotifier = Arc<dyn Fn() + Send + Sync>;

struct Shared {
    props: BindingProps,
    phase: BindingPhase,
    last_key: Option<String>,
    /// Items this element enqueued that may still be waiting or speaking.
    tickets: Vec<ItemId>,
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Enqueue unless the same narration already fired while still triggered.
/// Returns whether the narrator accepted a new item.
fn trigger(shared: &Mutex<Shared>, narrator: &Narrator) -> bool {
    let mut state = lock(shared);
    let key = state.props.dedup_key();
    if state.phase == BindingPhase::Triggered && state.last_key.as_deref() == Some(key.as_str()) {
        tracing::debug!("Skipping repeated narration for '{}'", state.props.selector);
        return false;
    }

    let outcome = narrator.enqueue(state.props.utterance(), state.props.effective_category());
    let Some(id) = outcome.id() else {
        // Muted or backlog full: nothing was said, so the next activation
        // must not be mistaken for a repeat.
        return false;
    };

    state.phase = BindingPhase::Triggered;
    state.last_key = Some(key);
    state.tickets.retain(|ticket| narrator.holds(*ticket));
    state.tickets.push(id);
    true
}

/// Spawn on the runtime we are already inside (async commands, tests),
/// otherwise on Tauri's shared runtime.
fn spawn_timer<F>(task: F) -> JoinHandle<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => RuntimeHandle::Tokio(handle).spawn(task),
        Err(_) => tauri::async_runtime::spawn(task),
    }
}

/// Backend half of one wrapped element, alive from mount to unmount.
///
/// `Idle -> (enter | focus | click) -> Triggered -> (leave | blur) -> Idle`.
/// Dropping the binding tears it down.
pub struct ElementBinding {
    shared: Arc<Mutex<Shared>>,
    narrator: Arc<Narrator>,
    pending: Option<JoinHandle<()>>,
    load_fired: bool,
}

impl ElementBinding {
    pub fn new(props: BindingProps, narrator: Arc<Narrator>) -> Self {
        Self {
            shared: Arc::new(Mutex::new(Shared {
                props,
                phase: BindingPhase::Idle,
                last_key: None,
                tickets: Vec::new(),
            })),
            narrator,
            pending: None,
            load_fired: false,
        }
    }

    #[cfg(test)]
    pub(crate) fn phase(&self) -> BindingPhase {
        lock(&self.shared).phase
    }

    #[cfg(test)]
    pub(crate) fn has_pending_timer(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|handle| !handle.inner().is_finished())
    }

    /// Arm the one-shot "trigger on load" timer if the element asks for it.
    pub fn mount(&mut self, load_delay: Duration, on_load: Option<LoadNotifier>) {
        if self.load_fired || !lock(&self.shared).props.trigger_on_load {
            return;
        }
        self.load_fired = true;

        let shared = self.shared.clone();
        let narrator = self.narrator.clone();
        self.pending = Some(spawn_timer(async move {
            tokio::time::sleep(load_delay).await;
            if trigger(&shared, &narrator) {
                if let Some(notify) = on_load {
                    notify();
                }
            }
        }));
    }

    /// Returns whether the event changed narration state.
    pub fn handle(&mut self, event: BindingEvent) -> bool {
        if event.is_activation() {
            trigger(&self.shared, &self.narrator)
        } else {
            self.deactivate();
            true
        }
    }

    /// New props from a re-render. A changed key while still triggered
    /// narrates again.
    pub fn update(&mut self, props: BindingProps) -> bool {
        let retrigger = {
            let mut state = lock(&self.shared);
            let changed = state.props.dedup_key() != props.dedup_key();
            state.props = props;
            changed && state.phase == BindingPhase::Triggered
        };
        retrigger && trigger(&self.shared, &self.narrator)
    }

    pub fn unmount(&mut self) {
        self.cancel_timer();
        let cancelled = self.withdraw_all();
        if cancelled > 0 {
            tracing::debug!("Unmounted element owned the active narration");
        }
    }

    /// Leave and blur interrupt whatever is speaking. Our own narrations are
    /// pulled from the backlog first so none of them starts after we left.
    fn deactivate(&mut self) {
        self.cancel_timer();
        if self.withdraw_all() == 0 {
            self.narrator.clear_active();
        }
    }

    /// Reset to idle and withdraw every outstanding ticket. Returns how many
    /// of them were speaking when withdrawn.
    fn withdraw_all(&mut self) -> usize {
        let tickets = {
            let mut state = lock(&self.shared);
            state.phase = BindingPhase::Idle;
            state.last_key = None;
            std::mem::take(&mut state.tickets)
        };

        tickets
            .into_iter()
            .filter(|ticket| matches!(self.narrator.withdraw(*ticket), Withdrawn::Cancelled(_)))
            .count()
    }

    fn cancel_timer(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

impl Drop for ElementBinding {
    fn drop(&mut self) {
        self.unmount();
    }
}
