use crate::grid::GridConfig;
use crate::vocabulary::Vocabulary;
use crate::WordId;

/// ___
/// _#_
/// ___
///
/// Slots: 0 = top across, 1 = left down, 2 = right down, 3 = bottom across.
pub fn ring_grid() -> GridConfig {
    GridConfig::from_template("___\n_#_\n___").unwrap()
}

/// Every complete, consistent assignment, found by trying everything. Only usable on tiny
/// puzzles.
pub fn brute_force_solutions(grid: &GridConfig, vocabulary: &Vocabulary) -> Vec<Vec<WordId>> {
    fn extend(
        grid: &GridConfig,
        vocabulary: &Vocabulary,
        partial: &mut Vec<WordId>,
        solutions: &mut Vec<Vec<WordId>>,
    ) {
        let slot_id = partial.len();
        if slot_id == grid.slot_count() {
            solutions.push(partial.clone());
            return;
        }

        for (word_id, word) in vocabulary.iter() {
            if word.len() != grid.slots[slot_id].length || partial.contains(&word_id) {
                continue;
            }
            let crossings_agree = partial.iter().enumerate().all(|(other_id, &other_word_id)| {
                match grid.overlap(slot_id, other_id) {
                    Some((i, j)) => word.letters[i] == vocabulary.word(other_word_id).letters[j],
                    None => true,
                }
            });
            if crossings_agree {
                partial.push(word_id);
                extend(grid, vocabulary, partial, solutions);
                partial.pop();
            }
        }
    }

    let mut solutions = vec![];
    extend(grid, vocabulary, &mut vec![], &mut solutions);
    solutions
}

/// Panic unless `words` (indexed by slot) fills the grid completely and consistently.
pub fn assert_valid_fill(grid: &GridConfig, vocabulary: &Vocabulary, words: &[Option<WordId>]) {
    assert_eq!(words.len(), grid.slot_count());

    for (slot_id, word_id) in words.iter().enumerate() {
        let word_id = word_id.unwrap_or_else(|| panic!("slot {} left unassigned", slot_id));
        let word = vocabulary.word(word_id);
        assert_eq!(word.len(), grid.slots[slot_id].length, "{} has the wrong length", word.string);

        for other_word_id in words.iter().skip(slot_id + 1) {
            assert_ne!(Some(word_id), *other_word_id, "{} used twice", word.string);
        }

        for &other_id in grid.neighbors(slot_id) {
            let (i, j) = grid.overlap(slot_id, other_id).unwrap();
            let other = vocabulary.word(words[other_id].unwrap());
            assert_eq!(word.letters[i], other.letters[j], "{} and {} disagree", word.string, other.string);
        }
    }
}
