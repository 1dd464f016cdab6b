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
use crate::features::nbc::metrics::mean_and_std;

/// The number of n-grams written to the hawkish and dovish lists.
pub const TOP_NGRAM_LIST_SIZE: usize = 100;

/// Collects the polarity scores of every n-gram over the iterations.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct PolarityAccumulator {
    scores: BTreeMap<String, Vec<f64>>,
}

impl PolarityAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, ngram: impl Into<String>, score: f64) {
        self.scores.entry(ngram.into()).or_default().push(score);
    }

    /// Adds the scores of one iteration.
    pub fn add_iteration<I: IntoIterator<Item=(String, f64)>>(&mut self, scores: I) {
        for (ngram, score) in scores {
            self.add(ngram, score)
        }
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn scores(&self, ngram: &str) -> Option<&[f64]> {
        self.scores.get(ngram).map(Vec::as_slice)
    }

    /// The raw scores per n-gram.
    pub fn as_map(&self) -> &BTreeMap<String, Vec<f64>> {
        &self.scores
    }

    /// The aggregated entries, sorted by n-gram.
    pub fn aggregate(&self) -> PolarityTable {
        PolarityTable {
            entries: self.scores
                .iter()
                .map(|(ngram, scores)| {
                    let (mean_score, std_score) = mean_and_std(scores);
                    PolarityEntry {
                        ngram: ngram.clone(),
                        mean_score,
                        std_score,
                        num_iterations: scores.len(),
                    }
                })
                .collect()
        }
    }
}

/// A row of `ngram_polarity.csv`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PolarityEntry {
    pub ngram: String,
    pub mean_score: f64,
    pub std_score: f64,
    pub num_iterations: usize,
}

impl PolarityEntry {
    /// A positive mean leans hawkish, everything else dovish.
    pub fn leaning(&self) -> Label {
        if self.mean_score > 0.0 {
            Label::Hawkish
        } else {
            Label::Dovish
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolarityTable {
    entries: Vec<PolarityEntry>,
}

impl PolarityTable {
    pub fn entries(&self) -> &[PolarityEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, ngram: &str) -> Option<&PolarityEntry> {
        self.entries
            .binary_search_by(|entry| entry.ngram.as_str().cmp(ngram))
            .ok()
            .map(|idx| &self.entries[idx])
    }

    /// The n-grams leaning to [label], sorted alphabetically.
    pub fn leaning_to(&self, label: Label) -> impl Iterator<Item=&PolarityEntry> {
        self.entries.iter().filter(move |entry| entry.leaning() == label)
    }

    pub fn count(&self, label: Label) -> usize {
        self.leaning_to(label).count()
    }

    /// The first [TOP_NGRAM_LIST_SIZE] n-grams leaning to [label] in alphabetical order.
    pub fn top_list(&self, label: Label) -> Vec<&str> {
        self.leaning_to(label)
            .take(TOP_NGRAM_LIST_SIZE)
            .map(|entry| entry.ngram.as_str())
            .collect()
    }
}
