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

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::Date;
use crate::core::config::ExtractionConfig;
use crate::features::corpus::dates::iso_format;
use crate::features::corpus::{DocumentKey, Label};
use crate::features::ngrams::counter::{CounterError, FrequencyCounter};
use crate::features::ngrams::ngram::generate_ngrams;
use crate::features::ngrams::vocabulary::Vocabulary;
use crate::features::sentences::Sentence;
use crate::features::tokenizing::language::is_foreign;
use crate::features::tokenizing::{PosTag, PosTagger};

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("No sentences were supplied to the extraction.")]
    NoSentences,
    #[error("None of the {total_unique} n-grams reached the minimum frequency of {min_frequency}.")]
    EmptyVocabulary {
        total_unique: usize,
        min_frequency: u64,
    },
    #[error("The n-gram range {min_n}-{max_n} is invalid.")]
    InvalidRange {
        min_n: usize,
        max_n: usize,
    },
    #[error(transparent)]
    Counter(#[from] CounterError),
}

/// A sentence with its frequent n-grams.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SentenceNgrams {
    pub sentence_id: usize,
    pub source_key: DocumentKey,
    #[serde(with = "iso_format")]
    pub date: Date,
    pub label: Label,
    /// The n-grams in generation order, duplicates included.
    pub ngrams: Vec<String>,
    pub sentence: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtractionStats {
    pub total_sentences: usize,
    pub foreign_sentences: usize,
    pub empty_token_sentences: usize,
    pub sentences_with_ngrams: usize,
    pub total_unique_ngrams: usize,
    pub filtered_ngrams: usize,
    pub min_frequency: u64,
    pub ngram_range: String,
    pub pos_filter: Vec<PosTag>,
    pub spilled_runs: usize,
}

#[derive(Debug, Clone)]
pub struct Extraction {
    pub sentences: Vec<SentenceNgrams>,
    pub vocabulary: Vocabulary,
    pub stats: ExtractionStats,
}

/// The filtered tokens of a sentence that produced n-grams in the first pass.
struct Pending<'a> {
    sentence: &'a Sentence,
    tokens: Vec<String>,
}

/// Extracts pos filtered n-grams in two passes.
///
/// The first pass tags every sentence and counts the n-grams, only the filtered
/// tokens are kept. The second pass regenerates the n-grams of each sentence and
/// keeps the ones in the vocabulary.
pub struct NgramExtractor<T> {
    tagger: T,
    config: ExtractionConfig,
}

impl<T: PosTagger> NgramExtractor<T> {
    pub fn new(tagger: T, config: ExtractionConfig) -> Self {
        Self { tagger, config }
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// The filtered tokens of [text], empty for foreign sentences.
    pub fn tokens(&self, text: &str) -> Vec<String> {
        if is_foreign(text, self.config.max_ascii_ratio) {
            return Vec::new()
        }
        self.tagger.filtered_forms(text, &self.config.pos_filter)
    }

    pub fn extract(&self, sentences: &[Sentence]) -> Result<Extraction, ExtractionError> {
        if sentences.is_empty() {
            return Err(ExtractionError::NoSentences)
        }
        let ExtractionConfig { min_n, max_n, min_frequency, .. } = self.config;
        if min_n == 0 || min_n > max_n {
            return Err(ExtractionError::InvalidRange { min_n, max_n })
        }

        let mut counter = FrequencyCounter::new(self.config.max_in_memory_ngrams);
        let mut pending = Vec::new();
        let mut foreign_sentences = 0usize;
        let mut empty_token_sentences = 0usize;

        for sentence in sentences {
            if is_foreign(&sentence.text, self.config.max_ascii_ratio) {
                foreign_sentences += 1;
                continue
            }
            let tokens = self.tagger.filtered_forms(&sentence.text, &self.config.pos_filter);
            if tokens.is_empty() {
                empty_token_sentences += 1;
                continue
            }
            let ngrams = generate_ngrams(&tokens, min_n..=max_n);
            if ngrams.is_empty() {
                continue
            }
            counter.add_all(&ngrams)?;
            pending.push(Pending { sentence, tokens });
        }

        log::info!(
            "First pass: {} sentences with n-grams, {} foreign, {} without tokens.",
            pending.len(), foreign_sentences, empty_token_sentences
        );

        let spilled_runs = counter.spilled_runs();
        let summary = counter.finish(min_frequency)?;
        let mut vocabulary = Vocabulary::new(summary.retained);
        if vocabulary.is_empty() {
            return Err(
                ExtractionError::EmptyVocabulary {
                    total_unique: summary.total_unique,
                    min_frequency,
                }
            )
        }

        let mut result = Vec::new();
        for (sentence_id, Pending { sentence, tokens }) in pending.into_iter().enumerate() {
            let ngrams: Vec<String> = generate_ngrams(&tokens, min_n..=max_n)
                .into_iter()
                .filter(|ngram| vocabulary.count_occurrence(ngram, sentence.label))
                .collect();
            if ngrams.is_empty() {
                continue
            }
            result.push(
                SentenceNgrams {
                    sentence_id,
                    source_key: sentence.document_key,
                    date: sentence.date,
                    label: sentence.label,
                    ngrams,
                    sentence: sentence.text.clone(),
                }
            );
        }

        let stats = ExtractionStats {
            total_sentences: sentences.len(),
            foreign_sentences,
            empty_token_sentences,
            sentences_with_ngrams: result.len(),
            total_unique_ngrams: summary.total_unique,
            filtered_ngrams: vocabulary.len(),
            min_frequency,
            ngram_range: self.config.ngram_range(),
            pos_filter: self.config.pos_filter.clone(),
            spilled_runs,
        };

        log::info!(
            "Kept {} of {} n-grams (min frequency {}), {} sentences remain.",
            stats.filtered_ngrams, stats.total_unique_ngrams, min_frequency, stats.sentences_with_ngrams
        );

        Ok(Extraction { sentences: result, vocabulary, stats })
    }
}

#[cfg(test)]
mod test {
    use std::num::NonZeroUsize;
    use itertools::Itertools;
    use time::macros::date;
    use crate::features::corpus::Source;
    use crate::features::tokenizing::HeuristicKoreanTagger;
    use super::*;

    fn sentence(id: usize, label: Label, text: &str) -> Sentence {
        let date = date!(2024 - 01 - 01);
        Sentence {
            sentence_id: id,
            document_key: DocumentKey::new(Source::Yonhap, date, 1),
            date,
            label,
            text: text.to_string(),
        }
    }

    fn config(min_frequency: u64) -> ExtractionConfig {
        ExtractionConfig { min_frequency, ..ExtractionConfig::default() }
    }

    #[test]
    fn surviving_sentences_only_use_the_vocabulary() {
        let mut sentences = Vec::new();
        for idx in 0..20 {
            sentences.push(sentence(idx, Label::Hawkish, "한국은행은 기준금리를 인상하였다."));
        }
        sentences.push(sentence(20, Label::Dovish, "물가 상승세가 둔화되었다."));
        sentences.push(sentence(21, Label::Dovish, "The Bank of Korea cut its policy rate."));

        let extractor = NgramExtractor::new(HeuristicKoreanTagger::default(), config(15));
        let extraction = extractor.extract(&sentences).unwrap();

        assert_eq!(20, extraction.sentences.len());
        assert_eq!(1, extraction.stats.foreign_sentences);
        assert_eq!(22, extraction.stats.total_sentences);
        assert_eq!(6, extraction.vocabulary.len());
        assert!(extraction.vocabulary.contains("한국은행 기준금리 인상"));
        for sentence in &extraction.sentences {
            assert!(!sentence.ngrams.is_empty());
            assert!(sentence.ngrams.iter().all(|ngram| extraction.vocabulary.contains(ngram)));
        }
        assert_eq!((0..20).collect_vec(), extraction.sentences.iter().map(|s| s.sentence_id).collect_vec());
    }

    #[test]
    fn class_counts_add_up_to_the_frequency() {
        let mut sentences = Vec::new();
        for idx in 0..20 {
            sentences.push(sentence(idx, Label::Hawkish, "한국은행은 기준금리를 인상하였다."));
        }
        for idx in 20..36 {
            sentences.push(sentence(idx, Label::Dovish, "한국은행은 기준금리를 인하하였다."));
        }
        let extraction = NgramExtractor::new(HeuristicKoreanTagger::default(), config(15))
            .extract(&sentences)
            .unwrap();

        let entries = extraction.vocabulary.entries().collect_vec();
        assert!(!entries.is_empty());
        for entry in &entries {
            assert_eq!(entry.frequency, entry.hawkish + entry.dovish, "{}", entry.ngram);
        }
        let shared = entries.iter().find(|entry| entry.ngram == "한국은행 기준금리").unwrap();
        assert_eq!((20, 16), (shared.hawkish, shared.dovish));
        let hawkish_only = entries.iter().find(|entry| entry.ngram == "한국은행 기준금리 인상").unwrap();
        assert_eq!((20, 0), (hawkish_only.hawkish, hawkish_only.dovish));
    }

    #[test]
    fn repeated_keyword_survives_the_frequency_filter() {
        let text = vec!["인상"; 50].join(" ");
        let sentences = vec![sentence(0, Label::Hawkish, &text)];
        let extractor = NgramExtractor::new(HeuristicKoreanTagger::default(), config(15));
        let extraction = extractor.extract(&sentences).unwrap();
        assert_eq!(vec!["인상".to_string()], extraction.vocabulary.entries().map(|entry| entry.ngram).collect_vec());
        assert_eq!(Some(50), extraction.vocabulary.frequency("인상"));
        assert!(extraction.sentences[0].ngrams.iter().any(|ngram| ngram.contains("인상")));
    }

    #[test]
    fn spilling_gives_the_same_result() {
        let sentences = (0..40)
            .map(|idx| sentence(idx, Label::Dovish, if idx % 2 == 0 { "기준금리를 인하하였다." } else { "경기 둔화 우려가 커졌다." }))
            .collect_vec();
        let in_memory = NgramExtractor::new(HeuristicKoreanTagger::default(), config(15)).extract(&sentences).unwrap();
        let spilling = NgramExtractor::new(
            HeuristicKoreanTagger::default(),
            ExtractionConfig { max_in_memory_ngrams: NonZeroUsize::new(3), ..config(15) }
        ).extract(&sentences).unwrap();
        assert!(spilling.stats.spilled_runs > 0);
        assert_eq!(in_memory.vocabulary, spilling.vocabulary);
        assert_eq!(in_memory.sentences, spilling.sentences);
    }

    #[test]
    fn configuration_errors_fail() {
        let extractor = NgramExtractor::new(HeuristicKoreanTagger::default(), config(15));
        assert!(matches!(extractor.extract(&[]), Err(ExtractionError::NoSentences)));
        let sentences = vec![sentence(0, Label::Hawkish, "한국은행은 기준금리를 인상하였다.")];
        assert!(matches!(
            extractor.extract(&sentences),
            Err(ExtractionError::EmptyVocabulary { total_unique: 6, min_frequency: 15 })
        ));
    }
}
