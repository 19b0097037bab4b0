use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::key::{IdMap, IdSet};
use crate::Model;

/// A repositioned item: `to` is its index in the new sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Move<T> {
    pub item: T,
    pub to: usize,
}

/// A minimal-move edit script between two keyed sequences.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Patch<T> {
    /// Old items whose id is absent from the new sequence, in old order.
    pub removes: Vec<T>,
    /// New items whose id is absent from the old sequence, in new order.
    pub inserts: Vec<T>,
    /// Surviving old items that are not on the longest run kept in relative order.
    pub moves: Vec<Move<T>>,
}

impl<T> Patch<T> {
    pub fn is_empty(&self) -> bool {
        self.removes.is_empty() && self.inserts.is_empty() && self.moves.is_empty()
    }
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Self {
            removes: Vec::new(),
            inserts: Vec::new(),
            moves: Vec::new(),
        }
    }
}

/// Computes the edit script that turns `old` into `new`.
///
/// Items present in both sequences keep their place when they lie on the longest increasing
/// subsequence of their new positions; every other survivor is reported as a move. Ids must be
/// unique within each sequence; duplicates produce an unspecified (but memory-safe) patch.
pub fn reconcile<T: Model + Clone>(old: &[T], new: &[T]) -> Patch<T> {
    let mut new_index = IdMap::<T::Id, usize>::new();
    for (i, item) in new.iter().enumerate() {
        new_index.insert(item.id(), i);
    }

    let mut patch = Patch::default();
    let mut positions = Vec::with_capacity(old.len().min(new.len()));
    let mut survivors = Vec::with_capacity(old.len().min(new.len()));
    let mut old_ids = IdSet::<T::Id>::new();

    for item in old {
        let id = item.id();
        match new_index.get(&id) {
            Some(&to) => {
                positions.push(to);
                survivors.push(item);
            }
            None => patch.removes.push(item.clone()),
        }
        old_ids.insert(id);
    }

    let mut on_lis = alloc::vec![false; positions.len()];
    for i in longest_increasing_subsequence(&positions) {
        on_lis[i] = true;
    }
    for (i, item) in survivors.into_iter().enumerate() {
        if !on_lis[i] {
            patch.moves.push(Move {
                item: item.clone(),
                to: positions[i],
            });
        }
    }

    for item in new {
        if !old_ids.contains(&item.id()) {
            patch.inserts.push(item.clone());
        }
    }

    vtrace!(
        removes = patch.removes.len(),
        inserts = patch.inserts.len(),
        moves = patch.moves.len(),
        "reconcile"
    );
    patch
}

/// Returns the indexes (into `seq`) of one longest strictly increasing subsequence.
///
/// Patience sorting: `tails[k]` holds the index of the smallest tail of any increasing run of
/// length `k + 1`, and `predecessor` links each element to the previous one on its run.
pub(crate) fn longest_increasing_subsequence(seq: &[usize]) -> Vec<usize> {
    let mut tails: Vec<usize> = Vec::new();
    if seq.is_empty() {
        return tails;
    }

    let mut predecessor = alloc::vec![0usize; seq.len()];
    tails.push(0);
    for i in 1..seq.len() {
        let last = tails[tails.len() - 1];
        if seq[i] > seq[last] {
            predecessor[i] = last;
            tails.push(i);
            continue;
        }

        // seq[i] <= seq[last], so the insertion point is always in bounds.
        let at = tails.partition_point(|&t| seq[t] < seq[i]);
        if seq[i] < seq[tails[at]] {
            if at > 0 {
                predecessor[i] = tails[at - 1];
            }
            tails[at] = i;
        }
    }

    let mut len = tails.len();
    let mut cur = tails[len - 1];
    while len > 0 {
        len -= 1;
        tails[len] = cur;
        cur = predecessor[cur];
    }
    tails
}

/// Id-level changes between two model snapshots.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelChanges<K> {
    pub added: Vec<K>,
    pub removed: Vec<K>,
    /// Ids present in both sequences whose model snapshot was replaced.
    pub changed: Vec<K>,
}

impl<K> ModelChanges<K> {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }
}

/// Compares two model sequences by id and by snapshot identity (`Arc::ptr_eq`).
pub fn diff_models<M: Model + ?Sized>(old: &[Arc<M>], new: &[Arc<M>]) -> ModelChanges<M::Id> {
    let mut previous = IdMap::<M::Id, &Arc<M>>::new();
    for model in old {
        previous.insert(model.id(), model);
    }
    let mut present = IdSet::<M::Id>::new();

    let mut changes = ModelChanges {
        added: Vec::new(),
        removed: Vec::new(),
        changed: Vec::new(),
    };
    for model in new {
        let id = model.id();
        match previous.get(&id) {
            Some(prev) if !Arc::ptr_eq(prev, model) => changes.changed.push(id.clone()),
            Some(_) => {}
            None => changes.added.push(id.clone()),
        }
        present.insert(id);
    }
    for model in old {
        let id = model.id();
        if !present.contains(&id) {
            changes.removed.push(id);
        }
    }
    changes
}
