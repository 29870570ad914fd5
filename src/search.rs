use std::cmp::Reverse;
use std::error::Error;
use std::fmt::{Display, Formatter};

use bit_set::BitSet;
use instant::{Duration, Instant};
use log::{debug, info, trace};

use crate::consistency::{self, Arc, ArcConsistencyResult};
use crate::domains::{Checkpoint, DomainStore};
use crate::grid::GridConfig;
use crate::vocabulary::Vocabulary;
use crate::{SlotId, WordId};

/// How candidate words for a slot are ordered during search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueOrder {
    /// Vocabulary order.
    #[default]
    Domain,

    /// Words that rule out the fewest options in unassigned crossing slots come first, with
    /// vocabulary order breaking ties.
    LeastConstraining,
}

/// Knobs for a solve. The defaults reproduce the plain algorithm: no inference during search,
/// vocabulary-ordered values, no deadline.
#[derive(Debug, Clone, Default)]
pub struct SolveOptions {
    pub value_order: ValueOrder,

    /// Re-run arc consistency from each slot as it's assigned (maintaining arc consistency).
    pub inference: bool,

    /// Give up once this much time has passed since search began.
    pub deadline: Option<Duration>,
}

/// A struct tracking statistics about the solving process.
#[derive(Debug, Clone, Default)]
pub struct Statistics {
    /// Tentative assignments tried.
    pub states: u64,
    pub backtracks: u64,
    /// Arc revisions that removed at least one word, across every AC-3 pass.
    pub revisions: u64,
    pub duration: Duration,
}

/// A mapping from each slot to its chosen word, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment(Vec<Option<WordId>>);

impl Assignment {
    /// An assignment with every slot unassigned.
    pub fn unassigned(slot_count: usize) -> Assignment {
        Assignment(vec![None; slot_count])
    }

    pub fn get(&self, slot_id: SlotId) -> Option<WordId> {
        self.0[slot_id]
    }

    pub fn assign(&mut self, slot_id: SlotId, word_id: WordId) {
        self.0[slot_id] = Some(word_id);
    }

    pub fn unassign(&mut self, slot_id: SlotId) {
        self.0[slot_id] = None;
    }

    pub fn is_complete(&self) -> bool {
        self.0.iter().all(Option::is_some)
    }

    /// The assigned slots and their words, by slot id.
    pub fn assigned(&self) -> impl Iterator<Item=(SlotId, WordId)> + '_ {
        self.0.iter().enumerate().filter_map(|(slot_id, word_id)| word_id.map(|word_id| (slot_id, word_id)))
    }

    pub fn as_slice(&self) -> &[Option<WordId>] {
        &self.0
    }

    pub fn word<'v>(&self, slot_id: SlotId, vocabulary: &'v Vocabulary) -> Option<&'v str> {
        self.get(slot_id).map(|word_id| vocabulary.word(word_id).string.as_str())
    }

    /// The chosen word for every slot, by slot id.
    pub fn words<'v>(&self, vocabulary: &'v Vocabulary) -> Vec<Option<&'v str>> {
        (0..self.0.len()).map(|slot_id| self.word(slot_id, vocabulary)).collect()
    }
}

/// A struct representing the results of a successful solve.
#[derive(Debug)]
pub struct FillSuccess {
    pub statistics: Statistics,
    pub assignment: Assignment,
}

/// Why a solve produced no assignment. `Unsatisfiable` covers both propagation wiping out a
/// domain and search running out of options; callers can't and needn't tell them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillFailure {
    Unsatisfiable,
    DeadlineExceeded,
}

impl Display for FillFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FillFailure::Unsatisfiable => write!(f, "no solution"),
            FillFailure::DeadlineExceeded => write!(f, "deadline exceeded before a solution was found"),
        }
    }
}

impl Error for FillFailure {}

/// One level of the search: a slot, the words we plan to try in it, and where the domain trail
/// stood before we tried any of them.
#[derive(Debug)]
struct Frame {
    slot_id: SlotId,
    options: Vec<WordId>,
    next_option: usize,
    checkpoint: Checkpoint,
}

/// A single solve over one grid and vocabulary. The solver owns the domain store; everything
/// else is borrowed.
pub struct Solver<'a> {
    grid: &'a GridConfig,
    vocabulary: &'a Vocabulary,
    options: SolveOptions,
    domains: DomainStore,
    statistics: Statistics,
}

impl<'a> Solver<'a> {
    pub fn new(grid: &'a GridConfig, vocabulary: &'a Vocabulary, options: SolveOptions) -> Solver<'a> {
        Solver {
            grid,
            vocabulary,
            options,
            domains: DomainStore::full(grid.slot_count(), vocabulary.len()),
            statistics: Statistics::default(),
        }
    }

    pub fn domains(&self) -> &DomainStore {
        &self.domains
    }

    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    pub fn enforce_node_consistency(&mut self) {
        consistency::enforce_node_consistency(self.grid, self.vocabulary, &mut self.domains);
    }

    pub fn revise(&mut self, x: SlotId, y: SlotId) -> bool {
        let revised = consistency::revise(self.grid, self.vocabulary, &mut self.domains, x, y);
        if revised {
            self.statistics.revisions += 1;
        }
        revised
    }

    pub fn ac3(&mut self, arcs: Option<Vec<Arc>>) -> ArcConsistencyResult {
        let result = consistency::ac3(self.grid, self.vocabulary, &mut self.domains, arcs);
        match &result {
            Ok(success) => self.statistics.revisions += success.revisions,
            // The failing revision isn't counted in the error, but it did happen.
            Err(_) => self.statistics.revisions += 1,
        }
        result
    }

    /// Pick the unassigned slot with the fewest remaining words, preferring the slot with the
    /// most crossings on a tie, then the lowest slot id.
    pub fn select_unassigned_variable(&self, assignment: &Assignment) -> Option<SlotId> {
        (0..self.grid.slot_count())
            .filter(|&slot_id| assignment.get(slot_id).is_none())
            .min_by_key(|&slot_id| (self.domains.len(slot_id), Reverse(self.grid.degree(slot_id))))
    }

    /// Every word still in the slot's domain, in the configured order.
    pub fn order_domain_values(&self, slot_id: SlotId, assignment: &Assignment) -> Vec<WordId> {
        let mut options: Vec<WordId> = self.domains.iter(slot_id).collect();

        if self.options.value_order == ValueOrder::LeastConstraining {
            options.sort_by_cached_key(|&word_id| {
                (self.count_ruled_out(slot_id, word_id, assignment), word_id)
            });
        }

        options
    }

    /// How many words would choosing `word_id` for `slot_id` remove from the domains of its
    /// unassigned crossing slots?
    fn count_ruled_out(&self, slot_id: SlotId, word_id: WordId, assignment: &Assignment) -> usize {
        let word = self.vocabulary.word(word_id);

        self.grid.neighbors(slot_id).iter()
            .filter(|&&other_id| assignment.get(other_id).is_none())
            .map(|&other_id| {
                let (i, j) = self.grid.overlap(slot_id, other_id).unwrap_or_default();
                self.domains.iter(other_id).filter(|&other_word_id| {
                    other_word_id == word_id ||
                        self.vocabulary.word(other_word_id).letters.get(j) != word.letters.get(i)
                }).count()
            })
            .sum()
    }

    /// Check the whole assignment: every word fits its slot, no word appears twice, and every
    /// pair of assigned crossing slots agrees on the shared letter.
    pub fn consistent(&self, assignment: &Assignment) -> bool {
        let mut used_word_ids = BitSet::with_capacity(self.vocabulary.len());

        for (slot_id, word_id) in assignment.assigned() {
            if self.vocabulary.word(word_id).len() != self.grid.slots[slot_id].length {
                return false;
            }
            if !used_word_ids.insert(word_id) {
                return false;
            }
        }

        assignment.assigned().all(|(slot_id, word_id)| {
            let word = self.vocabulary.word(word_id);

            self.grid.neighbors(slot_id).iter()
                .filter(|&&other_id| other_id > slot_id)
                .all(|&other_id| {
                    match (assignment.get(other_id), self.grid.overlap(slot_id, other_id)) {
                        (Some(other_word_id), Some((i, j))) => {
                            word.letters[i] == self.vocabulary.word(other_word_id).letters[j]
                        }
                        _ => true,
                    }
                })
        })
    }

    /// Shrink the slot's domain to the chosen word and propagate that to its crossings. Any
    /// changes land on the domain trail, so the caller undoes them with a rollback.
    fn infer(&mut self, slot_id: SlotId, word_id: WordId) -> bool {
        self.domains.retain(slot_id, |other_word_id| other_word_id == word_id);

        let arcs: Vec<Arc> = self.grid.neighbors(slot_id).iter().map(|&other_id| (other_id, slot_id)).collect();
        match self.ac3(Some(arcs)) {
            Ok(_) => true,
            Err(failure) => {
                debug!("inference after slot {} emptied slot {}", slot_id, failure.slot_id);
                false
            }
        }
    }

    /// Extend `assignment` to a complete, consistent one, or report that none exists. This
    /// walks the search tree depth-first with an explicit stack of frames rather than
    /// recursion, restoring domains from the trail each time it backs out of a choice.
    pub fn backtrack(&mut self, mut assignment: Assignment) -> Result<Assignment, FillFailure> {
        let start = Instant::now();
        let mut stack: Vec<Frame> = vec![];

        'slot_selection: loop {
            let slot_id = match self.select_unassigned_variable(&assignment) {
                Some(slot_id) => slot_id,
                None => return Ok(assignment),
            };

            stack.push(Frame {
                slot_id,
                options: self.order_domain_values(slot_id, &assignment),
                next_option: 0,
                checkpoint: self.domains.checkpoint(),
            });

            // Try the next option for the innermost slot, popping exhausted slots as we go.
            while let Some(frame) = stack.last_mut() {
                assignment.unassign(frame.slot_id);
                self.domains.rollback(frame.checkpoint);

                while let Some(&word_id) = frame.options.get(frame.next_option) {
                    frame.next_option += 1;

                    if let Some(deadline) = self.options.deadline {
                        if start.elapsed() >= deadline {
                            debug!("deadline hit after {} states", self.statistics.states);
                            return Err(FillFailure::DeadlineExceeded);
                        }
                    }

                    self.statistics.states += 1;
                    trace!("trying {} in slot {}", self.vocabulary.word(word_id).string, frame.slot_id);

                    assignment.assign(frame.slot_id, word_id);
                    if self.consistent(&assignment) &&
                        (!self.options.inference || self.infer(frame.slot_id, word_id)) {
                        continue 'slot_selection;
                    }

                    assignment.unassign(frame.slot_id);
                    self.domains.rollback(frame.checkpoint);
                }

                let exhausted_slot_id = frame.slot_id;
                stack.pop();
                self.statistics.backtracks += 1;
                debug!("backtracking from slot {} at depth {}", exhausted_slot_id, stack.len());
            }

            return Err(FillFailure::Unsatisfiable);
        }
    }

    /// Enforce node and arc consistency, then search. Fails without searching if propagation
    /// already proves there's no solution.
    pub fn solve(&mut self) -> Result<FillSuccess, FillFailure> {
        let start = Instant::now();
        let result = self.solve_inner();
        self.statistics.duration = start.elapsed();

        info!("{:?}", self.statistics);
        result.map(|assignment| FillSuccess { statistics: self.statistics.clone(), assignment })
    }

    fn solve_inner(&mut self) -> Result<Assignment, FillFailure> {
        self.enforce_node_consistency();
        if let Some(slot_id) = (0..self.grid.slot_count()).find(|&slot_id| self.domains.is_empty(slot_id)) {
            info!("no word fits slot {} ({:?})", slot_id, self.grid.slots[slot_id]);
            return Err(FillFailure::Unsatisfiable);
        }

        if let Err(failure) = self.ac3(None) {
            info!("arc consistency left slot {} with no options", failure.slot_id);
            return Err(FillFailure::Unsatisfiable);
        }
        info!(
            "propagation left {} candidate words across {} slots",
            (0..self.grid.slot_count()).map(|slot_id| self.domains.len(slot_id)).sum::<usize>(),
            self.grid.slot_count(),
        );

        // Propagation results are permanent; only search choices get rolled back.
        self.domains.commit();
        self.backtrack(Assignment::unassigned(self.grid.slot_count()))
    }
}

/// Fill the grid with words from the vocabulary using the default options.
pub fn solve(grid: &GridConfig, vocabulary: &Vocabulary) -> Result<FillSuccess, FillFailure> {
    solve_with_options(grid, vocabulary, SolveOptions::default())
}

pub fn solve_with_options(
    grid: &GridConfig,
    vocabulary: &Vocabulary,
    options: SolveOptions,
) -> Result<FillSuccess, FillFailure> {
    Solver::new(grid, vocabulary, options).solve()
}
