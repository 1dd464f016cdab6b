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

use std::num::NonZeroUsize;
use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use crate::features::tokenizing::pos::PosTag;

/// The default threshold in percentage points for a rate movement to count.
pub const DEFAULT_RATE_THRESHOLD: f64 = 0.03;
/// The default minimum support of an n-gram.
pub const DEFAULT_MIN_FREQUENCY: u64 = 15;
/// The default pos tags kept by the extractor.
pub const DEFAULT_POS_FILTER: [PosTag; 5] = [PosTag::NNG, PosTag::VV, PosTag::VA, PosTag::MAG, PosTag::VCN];

/// How documents are labeled by the call rate movement.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct LabelingConfig {
    /// The movement in percentage points that has to be exceeded.
    pub threshold: f64,
    /// The look ahead in calendar months.
    pub horizon_months: u32,
}

impl Default for LabelingConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_RATE_THRESHOLD,
            horizon_months: 1,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct SplittingConfig {
    /// Sentences with less chars are dropped.
    pub min_sentence_chars: usize,
}

impl Default for SplittingConfig {
    fn default() -> Self {
        Self { min_sentence_chars: 10 }
    }
}

/// The morphological analyzer used by the extraction.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaggerKind {
    /// The mecab-ko-dic analyzer of lindera.
    #[default]
    KoDic,
    /// A rule based tagger without a dictionary, for environments without ko-dic.
    Heuristic,
}

/// The config of the sentence n-gram extraction.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ExtractionConfig {
    pub min_n: usize,
    pub max_n: usize,
    /// The minimum global frequency of an n-gram.
    pub min_frequency: u64,
    /// Sentences with a higher share of ascii chars are treated as foreign.
    pub max_ascii_ratio: f64,
    /// The pos tags kept after tagging.
    pub pos_filter: Vec<PosTag>,
    pub tagger: TaggerKind,
    /// Normalize the text (NFC) before tagging.
    pub normalize: bool,
    /// Number of distinct n-grams held in memory before spilling to disk.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_in_memory_ngrams: Option<NonZeroUsize>,
    /// A jsonl file with pre-tagged sentences from an external morphological analyzer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pos_cache: Option<Utf8PathBuf>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_n: 1,
            max_n: 5,
            min_frequency: DEFAULT_MIN_FREQUENCY,
            max_ascii_ratio: 0.7,
            pos_filter: DEFAULT_POS_FILTER.to_vec(),
            tagger: TaggerKind::KoDic,
            normalize: true,
            max_in_memory_ngrams: None,
            pos_cache: None,
        }
    }
}

impl ExtractionConfig {
    pub fn ngram_range(&self) -> String {
        format!("{}-{}", self.min_n, self.max_n)
    }
}

/// The config of the bagged naive bayes.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct BaggingConfig {
    /// Number of bagging iterations
    pub n_estimators: usize,
    /// The share of the test split
    pub test_fraction: f64,
    /// The seed of the first iteration, iteration i uses seed + i.
    pub seed: u64,
    /// The offset of the ensemble evaluation seed. Has to be at least [n_estimators].
    pub ensemble_seed_offset: u64,
    /// The additive smoothing.
    pub alpha: f64,
    /// Run the iterations in parallel.
    pub parallel: bool,
}

impl Default for BaggingConfig {
    fn default() -> Self {
        Self {
            n_estimators: 30,
            test_fraction: 0.1,
            seed: 33,
            ensemble_seed_offset: 100,
            alpha: 1.0,
            parallel: true,
        }
    }
}
