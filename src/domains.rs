use std::fmt::{Debug, Formatter};

use bit_set::BitSet;

use crate::{SlotId, WordId};

/// Per-slot candidate word sets. Every removal is logged on a trail so that a branch of the
/// search can put back exactly what it took away.
pub struct DomainStore {
    domains: Vec<BitSet>,

    /// Cached `domains[slot_id].len()`, since `BitSet::len` has to scan.
    sizes: Vec<usize>,

    trail: Vec<(SlotId, WordId)>,
}

impl Debug for DomainStore {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DomainStore")
            .field("sizes", &self.sizes)
            .field("trail_len", &self.trail.len())
            .finish()
    }
}

/// Iterator over one slot's remaining word ids. `bit_set::Iter` under-reports its upper size
/// bound, which trips length checks in adapters like `Filter::count`, so the exact size comes
/// from the cached domain size instead.
pub struct DomainIter<'a> {
    words: bit_set::Iter<'a, u32>,
    remaining: usize,
}

impl<'a> Iterator for DomainIter<'a> {
    type Item = WordId;

    fn next(&mut self) -> Option<WordId> {
        let word_id = self.words.next()?;
        self.remaining = self.remaining.saturating_sub(1);
        Some(word_id)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a> ExactSizeIterator for DomainIter<'a> {}

/// A position on the trail to roll back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint(usize);

impl DomainStore {
    /// Every slot starts out with every word.
    pub fn full(slot_count: usize, word_count: usize) -> DomainStore {
        let full_domain: BitSet = (0..word_count).collect();

        DomainStore {
            domains: vec![full_domain; slot_count],
            sizes: vec![word_count; slot_count],
            trail: vec![],
        }
    }

    pub fn len(&self, slot_id: SlotId) -> usize {
        self.sizes[slot_id]
    }

    pub fn is_empty(&self, slot_id: SlotId) -> bool {
        self.sizes[slot_id] == 0
    }

    pub fn contains(&self, slot_id: SlotId, word_id: WordId) -> bool {
        self.domains[slot_id].contains(word_id)
    }

    /// Word ids remaining for the slot, ascending.
    pub fn iter(&self, slot_id: SlotId) -> DomainIter<'_> {
        DomainIter { words: self.domains[slot_id].iter(), remaining: self.sizes[slot_id] }
    }

    /// Remove a word from a slot's domain. Returns whether it was there.
    pub fn remove(&mut self, slot_id: SlotId, word_id: WordId) -> bool {
        if !self.domains[slot_id].remove(word_id) {
            return false;
        }
        self.sizes[slot_id] -= 1;
        self.trail.push((slot_id, word_id));
        true
    }

    /// Remove every word for which `predicate` returns false. Returns how many were removed.
    pub fn retain<F>(&mut self, slot_id: SlotId, mut predicate: F) -> usize
        where
            F: FnMut(WordId) -> bool
    {
        let doomed: Vec<WordId> = self.iter(slot_id).filter(|&word_id| !predicate(word_id)).collect();
        for &word_id in &doomed {
            self.remove(slot_id, word_id);
        }
        doomed.len()
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.trail.len())
    }

    /// Undo every removal made since `checkpoint`, most recent first.
    pub fn rollback(&mut self, checkpoint: Checkpoint) {
        while self.trail.len() > checkpoint.0 {
            if let Some((slot_id, word_id)) = self.trail.pop() {
                self.domains[slot_id].insert(word_id);
                self.sizes[slot_id] += 1;
            }
        }
    }

    /// Forget the trail, making every removal so far permanent.
    pub fn commit(&mut self) {
        self.trail.clear();
    }
}
