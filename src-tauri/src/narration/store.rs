use std::collections::VecDeque;

use super::{Category, Enqueued, Generation, ItemId, NarrationItem, NarrationSnapshot, Withdrawn};

pub const DEFAULT_MAX_QUEUE_LEN: usize = 32;

/// The item currently being spoken, or about to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveNarration {
    pub item: NarrationItem,
    pub generation: Generation,
}

/// Single source of truth for what is active, queued and speaking.
///
/// Pure bookkeeping: nothing here talks to a speech engine. The
/// [`Narrator`](super::Narrator) pairs it with a driver and reconciles the
/// two after every mutation.
///
/// Invariants held after every public call:
/// - `speaking` implies `active.is_some()`
/// - `!enabled` implies no active item and an empty queue
/// - queued items are delivered in arrival order, none skipped
#[derive(Debug)]
pub struct NarrationStore {
    active: Option<ActiveNarration>,
    queue: VecDeque<NarrationItem>,
    enabled: bool,
    speaking: bool,
    max_queue_len: usize,
    next_id: u64,
    next_generation: u64,
}

impl Default for NarrationStore {
    fn default() -> Self {
        Self::new(true, DEFAULT_MAX_QUEUE_LEN)
    }
}

impl NarrationStore {
    pub fn new(enabled: bool, max_queue_len: usize) -> Self {
        Self {
            active: None,
            queue: VecDeque::new(),
            enabled,
            speaking: false,
            max_queue_len,
            next_id: 0,
            next_generation: 0,
        }
    }

    pub fn active(&self) -> Option<&ActiveNarration> {
        self.active.as_ref()
    }

    pub fn queue(&self) -> impl Iterator<Item = &NarrationItem> {
        self.queue.iter()
    }

    pub fn queued_len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_playing(&self) -> bool {
        self.speaking
    }

    pub fn max_queue_len(&self) -> usize {
        self.max_queue_len
    }

    /// Shrinking the bound never evicts items that were already accepted.
    pub fn set_max_queue_len(&mut self, max_queue_len: usize) {
        self.max_queue_len = max_queue_len;
    }

    /// Accept a new narration. Never interrupts the active item.
    pub fn enqueue(&mut self, text: impl Into<String>, category: Category) -> Enqueued {
        if !self.enabled {
            return Enqueued::Ignored;
        }

        if self.active.is_some() && self.queue.len() >= self.max_queue_len {
            tracing::warn!(
                "Narration backlog full ({} items), dropping new item",
                self.queue.len()
            );
            return Enqueued::Dropped;
        }

        self.next_id += 1;
        let item = NarrationItem {
            id: ItemId(self.next_id),
            text: text.into(),
            category,
        };
        let id = item.id;

        if self.active.is_none() {
            let generation = self.activate(item);
            Enqueued::Activated { id, generation }
        } else {
            self.queue.push_back(item);
            Enqueued::Queued {
                id,
                position: self.queue.len() - 1,
            }
        }
    }

    /// Interrupt the active item and move on to the next queued one.
    ///
    /// Returns the generation whose utterance must be cancelled, or `None`
    /// when nothing was active.
    pub fn clear_active(&mut self) -> Option<Generation> {
        let cancelled = self.active.take()?.generation;
        self.speaking = false;
        self.advance();
        Some(cancelled)
    }

    /// Engine reported the end (or failure) of an utterance.
    pub fn complete(&mut self, generation: Generation) -> bool {
        if !self.is_active_generation(generation) {
            return false;
        }
        self.active = None;
        self.speaking = false;
        self.advance();
        true
    }

    /// Engine reported that audio for `generation` started.
    pub fn mark_started(&mut self, generation: Generation) -> bool {
        if !self.is_active_generation(generation) {
            return false;
        }
        self.speaking = true;
        true
    }

    pub fn toggle_enabled(&mut self) -> bool {
        let enabled = !self.enabled;
        self.set_enabled(enabled);
        enabled
    }

    /// Disabling flushes everything; enabling leaves the store idle.
    ///
    /// Returns the generation to cancel if an item was active.
    pub fn set_enabled(&mut self, enabled: bool) -> Option<Generation> {
        self.enabled = enabled;
        if enabled {
            return None;
        }
        self.queue.clear();
        self.speaking = false;
        self.active.take().map(|active| active.generation)
    }

    /// Whether the ticket is still active or waiting in the backlog.
    pub fn holds(&self, id: ItemId) -> bool {
        self.active.as_ref().is_some_and(|a| a.item.id == id)
            || self.queue.iter().any(|item| item.id == id)
    }

    /// Remove an item by ticket, wherever it currently is.
    pub fn withdraw(&mut self, id: ItemId) -> Withdrawn {
        if self.active.as_ref().is_some_and(|a| a.item.id == id) {
            return match self.clear_active() {
                Some(generation) => Withdrawn::Cancelled(generation),
                None => Withdrawn::NotFound,
            };
        }

        match self.queue.iter().position(|item| item.id == id) {
            Some(index) => {
                self.queue.remove(index);
                Withdrawn::Dequeued
            }
            None => Withdrawn::NotFound,
        }
    }

    pub fn snapshot(&self) -> NarrationSnapshot {
        NarrationSnapshot {
            enabled: self.enabled,
            playing: self.speaking,
            active_text: self.active.as_ref().map(|a| a.item.text.clone()),
            active_category: self.active.as_ref().map(|a| a.item.category),
            generation: self.active.as_ref().map(|a| a.generation),
            queued: self.queue.len(),
        }
    }

    /// The one place the queue is drained, shared by the interruption and
    /// completion paths. Caller must have cleared `active` first.
    fn advance(&mut self) {
        debug_assert!(self.active.is_none());
        if let Some(next) = self.queue.pop_front() {
            self.activate(next);
        }
    }

    fn activate(&mut self, item: NarrationItem) -> Generation {
        self.next_generation += 1;
        let generation = Generation(self.next_generation);
        tracing::debug!("Narration {:?} active (generation {})", item.id, generation.0);
        self.active = Some(ActiveNarration { item, generation });
        generation
    }

    fn is_active_generation(&self, generation: Generation) -> bool {
        self.active
            .as_ref()
            .is_some_and(|a| a.generation == generation)
    }
}
