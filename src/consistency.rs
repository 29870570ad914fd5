use std::collections::{HashSet, VecDeque};

use log::{debug, trace};

use crate::domains::DomainStore;
use crate::grid::GridConfig;
use crate::vocabulary::Vocabulary;
use crate::SlotId;

/// An ordered pair of crossing slots `(x, y)`: "make `x` consistent with `y`".
pub type Arc = (SlotId, SlotId);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArcConsistencySuccess {
    /// How many `revise` calls actually removed something.
    pub revisions: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArcConsistencyFailure {
    /// The slot whose domain was emptied.
    pub slot_id: SlotId,
}

pub type ArcConsistencyResult = Result<ArcConsistencySuccess, ArcConsistencyFailure>;

/// Remove every word whose length doesn't match its slot. This can leave a domain empty; that
/// isn't treated as a failure here.
pub fn enforce_node_consistency(grid: &GridConfig, vocabulary: &Vocabulary, domains: &mut DomainStore) {
    for (slot_id, slot) in grid.slots.iter().enumerate() {
        let removed = domains.retain(slot_id, |word_id| vocabulary.word(word_id).len() == slot.length);

        trace!("node consistency removed {} words from slot {}", removed, slot_id);
    }
}

/// Make `x` arc consistent with `y`: drop every word from `x`'s domain whose letter at the
/// crossing doesn't appear at the crossing in any of `y`'s words. Returns whether anything was
/// removed.
pub fn revise(
    grid: &GridConfig,
    vocabulary: &Vocabulary,
    domains: &mut DomainStore,
    x: SlotId,
    y: SlotId,
) -> bool {
    let (i, j) = match grid.overlap(x, y) {
        Some(overlap) if x != y => overlap,
        _ => return false,
    };

    // Which letters can `y` put in the shared cell?
    let supported: HashSet<char> = domains
        .iter(y)
        .filter_map(|word_id| vocabulary.word(word_id).letters.get(j).copied())
        .collect();

    let removed = domains.retain(x, |word_id| {
        vocabulary.word(word_id).letters.get(i).map_or(false, |letter| supported.contains(letter))
    });

    if removed > 0 {
        trace!("revise({}, {}) removed {} words", x, y, removed);
    }
    removed > 0
}

/// Worklist of arcs still to check. An arc that's already waiting isn't queued twice.
struct ArcQueue {
    queue: VecDeque<Arc>,
    queued: HashSet<Arc>,
}

impl ArcQueue {
    fn with_initial_queue<Items>(items: Items) -> ArcQueue
        where
            Items: IntoIterator<Item=Arc>
    {
        let mut queue = ArcQueue { queue: VecDeque::new(), queued: HashSet::new() };
        for arc in items {
            queue.enqueue(arc);
        }
        queue
    }

    fn pop_front(&mut self) -> Option<Arc> {
        let arc = self.queue.pop_front()?;
        self.queued.remove(&arc);
        Some(arc)
    }

    fn enqueue(&mut self, arc: Arc) {
        if self.queued.insert(arc) {
            self.queue.push_back(arc);
        }
    }
}

/// AC-3. Starting from `arcs` (or every arc in the grid if `None`), revise arcs until nothing
/// changes. Whenever `x` shrinks, every other neighbor `z` of `x` has to be rechecked against
/// it. Fails as soon as any domain is emptied.
pub fn ac3(
    grid: &GridConfig,
    vocabulary: &Vocabulary,
    domains: &mut DomainStore,
    arcs: Option<Vec<Arc>>,
) -> ArcConsistencyResult {
    let mut queue = ArcQueue::with_initial_queue(arcs.unwrap_or_else(|| grid.arcs()));
    let mut revisions = 0;

    while let Some((x, y)) = queue.pop_front() {
        if !revise(grid, vocabulary, domains, x, y) {
            continue;
        }
        revisions += 1;

        if domains.is_empty(x) {
            debug!("arc consistency emptied slot {} while revising against slot {}", x, y);
            return Err(ArcConsistencyFailure { slot_id: x });
        }

        for &z in grid.neighbors(x) {
            if z != y {
                queue.enqueue((z, x));
            }
        }
    }

    Ok(ArcConsistencySuccess { revisions })
}
