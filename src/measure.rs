use alloc::vec::Vec;
use core::mem;

use crate::host::{FrameId, MeasuredElement, Scheduler};
use crate::key::{IdMap, IdSet};
use crate::ItemId;

/// The outcome of one measurement flush.
#[derive(Clone, Debug)]
pub struct Measurement<K> {
    deltas: IdMap<K, i64>,
    compound_height_delta: i64,
}

impl<K: ItemId> Measurement<K> {
    pub fn new() -> Self {
        Self {
            deltas: IdMap::new(),
            compound_height_delta: 0,
        }
    }

    /// Builds a measurement from explicit per-item deltas (the aggregate is their sum).
    pub fn from_deltas(deltas: impl IntoIterator<Item = (K, i64)>) -> Self {
        let mut m = Self::new();
        for (id, delta) in deltas {
            m.record(id, delta);
        }
        m
    }

    fn record(&mut self, id: K, delta: i64) {
        self.compound_height_delta = self.compound_height_delta.saturating_add(delta);
        let slot = self.deltas.entry(id).or_insert(0);
        *slot = slot.saturating_add(delta);
    }

    /// Actual minus assumed size of `id`, if it was part of the batch.
    pub fn delta(&self, id: &K) -> Option<i64> {
        self.deltas.get(id).copied()
    }

    /// Sum of all per-item deltas.
    pub fn compound_height_delta(&self) -> i64 {
        self.compound_height_delta
    }

    pub fn len(&self) -> usize {
        self.deltas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, i64)> + '_ {
        self.deltas.iter().map(|(k, d)| (k, *d))
    }
}

impl<K: ItemId> Default for Measurement<K> {
    fn default() -> Self {
        Self::new()
    }
}

/// Reads real item sizes in batches and keeps the size table.
///
/// Requests raised during one task are coalesced: the first one queues a microtask, the
/// microtask requests a single animation frame, and the frame flushes the whole batch. At most
/// one flush is in flight at a time.
#[derive(Debug)]
pub struct Measurer<K, E> {
    expected_item_height: u32,
    heights: IdMap<K, u32>,
    invalid: IdSet<K>,

    pending: Vec<(K, E)>,
    // Leading margin shared by all items, once a host reported a nonzero one.
    margin_start: Option<u32>,
    microtask_queued: bool,
    frame: Option<FrameId>,
}

impl<K: ItemId, E: MeasuredElement> Measurer<K, E> {
    pub fn new(expected_item_height: u32) -> Self {
        Self {
            expected_item_height,
            heights: IdMap::new(),
            invalid: IdSet::new(),
            pending: Vec::new(),
            margin_start: None,
            microtask_queued: false,
            frame: None,
        }
    }

    pub fn expected_item_height(&self) -> u32 {
        self.expected_item_height
    }

    pub fn set_expected_item_height(&mut self, height: u32) {
        self.expected_item_height = height;
    }

    /// Whether a size is known for `id`, even an invalidated one.
    pub fn has(&self, id: &K) -> bool {
        self.heights.contains_key(id)
    }

    /// The last known size of `id`, even an invalidated one.
    pub fn get(&self, id: &K) -> Option<u32> {
        self.heights.get(id).copied()
    }

    /// The size the layout should assume for `id`.
    pub fn assumed(&self, id: &K) -> u32 {
        self.get(id).unwrap_or(self.expected_item_height)
    }

    /// Forgets `id` entirely (the item left the sequence).
    pub fn delete(&mut self, id: &K) -> bool {
        self.invalid.remove(id);
        self.pending.retain(|(cur, _)| cur != id);
        self.heights.remove(id).is_some()
    }

    /// Marks the size of `id` stale; it is kept until the item is measured again.
    pub fn invalidate(&mut self, id: &K) {
        self.invalid.insert(id.clone());
    }

    pub fn is_invalid(&self, id: &K) -> bool {
        self.invalid.contains(id)
    }

    /// Whether `id` has no size yet or its size is stale.
    pub fn is_required_measure(&self, id: &K) -> bool {
        self.invalid.contains(id) || !self.heights.contains_key(id)
    }

    /// Number of cached sizes.
    pub fn len(&self) -> usize {
        self.heights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_flush_scheduled(&self) -> bool {
        self.frame.is_some()
    }

    /// Returns `true` when `id` is the frame this measurer is waiting for.
    pub fn owns_frame(&self, id: FrameId) -> bool {
        self.frame == Some(id)
    }

    /// Enqueues `id` for measurement.
    ///
    /// Without an element handle there is nothing to read and the request is dropped.
    /// Returns whether the request was queued.
    pub fn schedule_measure(
        &mut self,
        id: K,
        element: Option<E>,
        scheduler: &mut impl Scheduler,
    ) -> bool {
        let Some(element) = element else {
            vtrace!(?id, "schedule_measure: no element bound");
            return false;
        };
        match self.pending.iter_mut().find(|(cur, _)| *cur == id) {
            Some(slot) => slot.1 = element,
            None => self.pending.push((id, element)),
        }
        if !self.microtask_queued {
            self.microtask_queued = true;
            scheduler.queue_microtask();
        }
        true
    }

    /// Microtask step: requests the flush frame unless one is already in flight.
    pub fn on_microtask(&mut self, scheduler: &mut impl Scheduler) {
        self.microtask_queued = false;
        if self.pending.is_empty() || self.frame.is_some() {
            return;
        }
        self.frame = Some(scheduler.request_animation_frame());
    }

    /// Frame step: flushes the batch if `id` is the frame requested by this measurer.
    pub fn on_animation_frame(&mut self, id: FrameId) -> Option<Measurement<K>> {
        if !self.owns_frame(id) {
            return None;
        }
        self.frame = None;
        Some(self.flush())
    }

    /// Reads every pending element and updates the size table.
    ///
    /// Until a nonzero leading margin has been seen, margins are read per element. Hosts may
    /// report 0 for the first elements of a batch even though they carry the same margin as
    /// the rest, so once a nonzero margin shows up, the earlier readings of the batch are
    /// patched with it.
    pub fn flush(&mut self) -> Measurement<K> {
        let batch = mem::take(&mut self.pending);
        let mut measurement = Measurement::new();
        let discovering = self.margin_start.is_none();
        let mut margin = self.margin_start.unwrap_or(0);
        let mut first_with_margin: Option<usize> = None;

        for (i, (id, element)) in batch.iter().enumerate() {
            if discovering && first_with_margin.is_none() {
                let m = element.margin_start();
                if m > 0 {
                    margin = m;
                    first_with_margin = Some(i);
                }
            }
            let expected = self.assumed(id);
            let actual = element.size().saturating_add(margin);
            measurement.record(id.clone(), actual as i64 - expected as i64);
            self.heights.insert(id.clone(), actual);
            self.invalid.remove(id);
        }

        if let Some(first) = first_with_margin {
            vdebug!(margin, patched = first, "measure: leading margin discovered");
            for (id, _) in &batch[..first] {
                if let Some(h) = self.heights.get_mut(id) {
                    *h = h.saturating_add(margin);
                }
                measurement.record(id.clone(), margin as i64);
            }
            self.margin_start = Some(margin);
        }

        vtrace!(
            items = batch.len(),
            compound_height_delta = measurement.compound_height_delta(),
            "measure: flush"
        );
        measurement
    }

    /// Exports the cached sizes (useful for persistence).
    pub fn export_cache(&self) -> Vec<(K, u32)> {
        self.heights
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect()
    }

    /// Replaces the cached sizes. Invalidation marks are cleared.
    pub fn import_cache(&mut self, entries: impl IntoIterator<Item = (K, u32)>) {
        self.heights.clear();
        self.invalid.clear();
        self.heights.extend(entries);
        vdebug!(entries = self.heights.len(), "measure: import_cache");
    }

    /// Cancels the pending flush and drops the batch.
    pub fn teardown(&mut self, scheduler: &mut impl Scheduler) {
        if let Some(id) = self.frame.take() {
            scheduler.cancel_animation_frame(id);
        }
        self.pending.clear();
        self.microtask_queued = false;
    }
}
