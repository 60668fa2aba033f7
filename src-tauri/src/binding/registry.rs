use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::narration::Narrator;

use super::{BindingEvent, BindingProps, ElementBinding, LoadNotifier};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BindingId(pub u64);

/// Every wrapped element currently mounted in the webview.
pub struct BindingRegistry {
    narrator: Arc<Narrator>,
    bindings: HashMap<BindingId, ElementBinding>,
    next_id: u64,
    load_delay: Duration,
    on_load: Option<LoadNotifier>,
}

impl BindingRegistry {
    pub fn new(narrator: Arc<Narrator>, load_delay: Duration) -> Self {
        Self {
            narrator,
            bindings: HashMap::new(),
            next_id: 0,
            load_delay,
            on_load: None,
        }
    }

    pub fn set_load_delay(&mut self, load_delay: Duration) {
        self.load_delay = load_delay;
    }

    /// Hook run whenever a load timer narrates, e.g. to push status.
    pub fn set_on_load(&mut self, on_load: LoadNotifier) {
        self.on_load = Some(on_load);
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn mount(&mut self, props: BindingProps) -> BindingId {
        self.next_id += 1;
        let id = BindingId(self.next_id);
        tracing::debug!("Mounting narration binding {} ({})", id.0, props.selector);

        let mut binding = ElementBinding::new(props, self.narrator.clone());
        binding.mount(self.load_delay, self.on_load.clone());
        self.bindings.insert(id, binding);
        id
    }

    pub fn update(&mut self, id: BindingId, props: BindingProps) -> Result<bool> {
        Ok(self.get_mut(id)?.update(props))
    }

    pub fn dispatch(&mut self, id: BindingId, event: BindingEvent) -> Result<bool> {
        Ok(self.get_mut(id)?.handle(event))
    }

    #[cfg(test)]
    pub(crate) fn phase(&self, id: BindingId) -> Option<super::BindingPhase> {
        self.bindings.get(&id).map(|b| b.phase())
    }

    /// Unknown ids are fine: the webview may unmount twice on teardown.
    pub fn unmount(&mut self, id: BindingId) -> bool {
        match self.bindings.remove(&id) {
            Some(mut binding) => {
                binding.unmount();
                tracing::debug!("Unmounted narration binding {}", id.0);
                true
            }
            None => false,
        }
    }

    /// Tear down every binding, e.g. when the webview reloads.
    pub fn clear(&mut self) {
        let count = self.bindings.len();
        self.bindings.clear();
        if count > 0 {
            tracing::info!("Released {} narration bindings", count);
        }
    }

    fn get_mut(&mut self, id: BindingId) -> Result<&mut ElementBinding> {
        self.bindings
            .get_mut(&id)
            .ok_or_else(|| anyhow::anyhow!("Unknown narration binding: {}", id.0))
    }
}
