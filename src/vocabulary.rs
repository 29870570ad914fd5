use std::collections::HashMap;
use std::fmt::{Debug, Formatter};

use smallvec::SmallVec;

use crate::{WordId, MAX_SLOT_LENGTH};

/// A word that can be chosen for a slot, with its letters split out for indexed comparison.
#[derive(Debug, Clone)]
pub struct Word {
    pub string: String,
    pub letters: SmallVec<[char; MAX_SLOT_LENGTH]>,
}

impl Word {
    fn new(string: String) -> Word {
        let letters = string.chars().collect();
        Word { string, letters }
    }

    /// Length in letters, which is what slot lengths are measured in.
    pub fn len(&self) -> usize {
        self.letters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.letters.is_empty()
    }
}

/// The set of candidate words. Each distinct word gets a `WordId` in the order it was first
/// seen, and that order is what the solver falls back on when it has no other preference.
#[derive(Default)]
pub struct Vocabulary {
    words: Vec<Word>,
    ids_by_string: HashMap<String, WordId>,
}

impl Debug for Vocabulary {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Vocabulary")
            .field("words", &(["(", &self.words.len().to_string(), " entries)"].join("")))
            .finish()
    }
}

impl Vocabulary {
    /// Build a vocabulary from the given words, dropping repeats.
    pub fn new<I, S>(words: I) -> Vocabulary
        where
            I: IntoIterator<Item=S>,
            S: Into<String>,
    {
        let mut vocabulary = Vocabulary::default();
        for word in words {
            vocabulary.insert(word.into());
        }
        vocabulary
    }

    /// Parse a word list with one word per line. Words are trimmed and upper-cased, and blank
    /// lines are skipped.
    pub fn from_word_list(contents: &str) -> Vocabulary {
        Vocabulary::new(
            contents
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_uppercase),
        )
    }

    fn insert(&mut self, string: String) {
        if self.ids_by_string.contains_key(&string) {
            return;
        }
        self.ids_by_string.insert(string.clone(), self.words.len());
        self.words.push(Word::new(string));
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Look up a word by id. Panics if the id didn't come from this vocabulary.
    pub fn word(&self, word_id: WordId) -> &Word {
        &self.words[word_id]
    }

    pub fn id_of(&self, string: &str) -> Option<WordId> {
        self.ids_by_string.get(string).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item=(WordId, &Word)> {
        self.words.iter().enumerate()
    }
}
