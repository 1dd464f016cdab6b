//Copyright 2024 Felix Engl
//
//Licensed under the Apache License, Version 2.0 (the "License");
//you may not use this file except in compliance with the License.
//You may obtain a copy of the License at
//
//    http://www.apache.org/licenses/LICENSE-2.0
//
//Unless required by applicable law or agreed to in writing, software
//distributed under the License is distributed on an "AS IS" BASIS,
//WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//See the License for the specific language governing permissions and
//limitations under the License.

use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};
use crate::features::corpus::Label;

/// A row of the vocabulary table.
///
/// The class counts are not part of the table, they are only known after an extraction.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct VocabularyEntry {
    pub ngram: String,
    pub frequency: u64,
    #[serde(skip)]
    pub hawkish: u64,
    #[serde(skip)]
    pub dovish: u64,
}

/// The occurrences of an n-gram per sentence label.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct ClassCounts {
    pub hawkish: u64,
    pub dovish: u64,
}

impl ClassCounts {
    pub fn add(&mut self, label: Label) {
        match label {
            Label::Hawkish => self.hawkish += 1,
            Label::Dovish => self.dovish += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.hawkish + self.dovish
    }
}

/// The n-grams that reached the minimum global frequency.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Vocabulary {
    frequencies: BTreeMap<String, u64>,
    class_counts: BTreeMap<String, ClassCounts>,
}

impl Vocabulary {
    pub fn new(frequencies: BTreeMap<String, u64>) -> Self {
        Self { frequencies, class_counts: BTreeMap::new() }
    }

    /// Counts one occurrence of [ngram] in a sentence labeled [label].
    /// Returns false and counts nothing if [ngram] is not in the vocabulary.
    pub fn count_occurrence(&mut self, ngram: &str, label: Label) -> bool {
        if !self.contains(ngram) {
            return false
        }
        match self.class_counts.get_mut(ngram) {
            Some(counts) => counts.add(label),
            None => {
                let mut counts = ClassCounts::default();
                counts.add(label);
                self.class_counts.insert(ngram.to_string(), counts);
            }
        }
        true
    }

    pub fn class_counts(&self, ngram: &str) -> ClassCounts {
        self.class_counts.get(ngram).copied().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    pub fn contains(&self, ngram: &str) -> bool {
        self.frequencies.contains_key(ngram)
    }

    pub fn as_map(&self) -> &BTreeMap<String, u64> {
        &self.frequencies
    }

    pub fn frequency(&self, ngram: &str) -> Option<u64> {
        self.frequencies.get(ngram).copied()
    }

    /// The entries in lexicographic order.
    pub fn entries(&self) -> impl Iterator<Item=VocabularyEntry> + '_ {
        self.frequencies.iter().map(|(ngram, frequency)| {
            let ClassCounts { hawkish, dovish } = self.class_counts(ngram);
            VocabularyEntry { ngram: ngram.clone(), frequency: *frequency, hawkish, dovish }
        })
    }
}

impl FromIterator<VocabularyEntry> for Vocabulary {
    fn from_iter<T: IntoIterator<Item=VocabularyEntry>>(iter: T) -> Self {
        let mut frequencies = BTreeMap::new();
        let mut class_counts = BTreeMap::new();
        for VocabularyEntry { ngram, frequency, hawkish, dovish } in iter {
            if hawkish + dovish > 0 {
                class_counts.insert(ngram.clone(), ClassCounts { hawkish, dovish });
            }
            frequencies.insert(ngram, frequency);
        }
        Self { frequencies, class_counts }
    }
}

/// Keeps the n-grams with a frequency of at least [min_frequency].
/// Applying it to its own output changes nothing.
pub fn filter_vocabulary(frequencies: &BTreeMap<String, u64>, min_frequency: u64) -> Vocabulary {
    Vocabulary::new(
        frequencies
            .iter()
            .filter(|(_, frequency)| **frequency >= min_frequency)
            .map(|(ngram, frequency)| (ngram.clone(), *frequency))
            .collect()
    )
}

#[cfg(test)]
mod test {
    use std::collections::BTreeMap;
    use super::*;

    #[test]
    fn filtering_is_idempotent() {
        let mut counts = BTreeMap::new();
        counts.insert("금리 인상".to_string(), 30u64);
        counts.insert("인상".to_string(), 15);
        counts.insert("동결".to_string(), 14);
        let once = filter_vocabulary(&counts, 15);
        let twice = filter_vocabulary(once.as_map(), 15);
        assert_eq!(once, twice);
        assert_eq!(2, twice.len());
        assert!(twice.entries().all(|entry| entry.frequency >= 15));
        assert!(!twice.contains("동결"));
    }

    #[test]
    fn class_counts_only_cover_the_vocabulary() {
        let mut counts = BTreeMap::new();
        counts.insert("인상".to_string(), 2u64);
        let mut vocabulary = Vocabulary::new(counts);
        assert!(vocabulary.count_occurrence("인상", Label::Hawkish));
        assert!(vocabulary.count_occurrence("인상", Label::Dovish));
        assert!(!vocabulary.count_occurrence("인하", Label::Dovish));
        assert_eq!(ClassCounts { hawkish: 1, dovish: 1 }, vocabulary.class_counts("인상"));
        assert_eq!(ClassCounts::default(), vocabulary.class_counts("인하"));

        let entries: Vec<_> = vocabulary.entries().collect();
        assert_eq!(1, entries[0].hawkish);
        assert_eq!(1, entries[0].dovish);
        assert_eq!(vocabulary, entries.into_iter().collect());
    }
}
