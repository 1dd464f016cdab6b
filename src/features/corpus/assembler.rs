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

use std::collections::HashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::Date;
use crate::core::config::LabelingConfig;
use crate::features::corpus::document::{Document, DocumentKey, LabeledDocument, RawDocument};
use crate::features::corpus::labeler::{Label, RateLabeler};
use crate::features::corpus::rates::RateSeries;
use crate::features::corpus::source::Source;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AssemblyError {
    #[error("No rate observations are available, every document would be unlabeled.")]
    NoRateSeries,
    #[error("No document survived the labeling ({dropped_unlabeled} unlabeled, {dropped_empty} empty).")]
    EmptyCorpus {
        dropped_empty: usize,
        dropped_unlabeled: usize,
    },
}

/// Counts of an assembly run.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, Eq, PartialEq)]
pub struct AssemblyStats {
    pub processed: usize,
    pub dropped_empty: usize,
    pub dropped_unlabeled: usize,
    pub hawkish: usize,
    pub dovish: usize,
}

/// The labeled corpus with unique keys.
#[derive(Debug, Clone)]
pub struct AssembledCorpus {
    pub documents: Vec<LabeledDocument>,
    pub stats: AssemblyStats,
}

/// Assigns the per source and date sequence numbers in input order.
#[derive(Debug, Default)]
struct KeyGenerator {
    sequences: HashMap<(Source, Date), u32>
}

impl KeyGenerator {
    fn next_key(&mut self, source: Source, date: Date) -> DocumentKey {
        let sequence = self.sequences.entry((source, date)).or_insert(0);
        *sequence += 1;
        DocumentKey::new(source, date, *sequence)
    }
}

/// Assembles the labeled corpus from the raw documents of all sources.
/// Keys are assigned after dropping empty documents.
pub fn assemble(
    documents: impl IntoIterator<Item=RawDocument>,
    rates: &RateSeries,
    config: &LabelingConfig,
) -> Result<AssembledCorpus, AssemblyError> {
    if rates.is_empty() {
        return Err(AssemblyError::NoRateSeries)
    }
    let labeler = RateLabeler::new(rates, config);
    let mut keys = KeyGenerator::default();
    let mut stats = AssemblyStats::default();
    let mut result = Vec::new();

    for raw in documents {
        stats.processed += 1;
        if !raw.has_content() {
            stats.dropped_empty += 1;
            continue
        }
        let key = keys.next_key(raw.source, raw.date);
        let mut document = Document::from_raw(key, raw);
        document.label = labeler.label_for(document.date).label();
        match document.into_labeled() {
            Some(document) => {
                match document.label {
                    Label::Hawkish => stats.hawkish += 1,
                    Label::Dovish => stats.dovish += 1,
                }
                result.push(document)
            }
            None => stats.dropped_unlabeled += 1
        }
    }

    log::info!(
        "Assembled {} documents ({} hawkish, {} dovish) from {} records, dropped {} empty and {} unlabeled.",
        result.len(), stats.hawkish, stats.dovish, stats.processed, stats.dropped_empty, stats.dropped_unlabeled
    );

    if result.is_empty() {
        return Err(
            AssemblyError::EmptyCorpus {
                dropped_empty: stats.dropped_empty,
                dropped_unlabeled: stats.dropped_unlabeled,
            }
        )
    }

    Ok(AssembledCorpus { documents: result, stats })
}

#[cfg(test)]
mod test {
    use std::collections::HashSet;
    use time::macros::date;
    use crate::features::corpus::rates::RateObservation;
    use super::*;

    fn rates() -> RateSeries {
        RateSeries::new(vec![
            RateObservation::new(date!(2024 - 01 - 01), 3.50),
            RateObservation::new(date!(2024 - 02 - 01), 3.60),
            RateObservation::new(date!(2024 - 03 - 01), 3.60),
        ])
    }

    #[test]
    fn keys_are_unique_per_source_and_date() {
        let docs = vec![
            RawDocument::new(date!(2024 - 01 - 01), "a", "금리 인상", Source::Yonhap),
            RawDocument::new(date!(2024 - 01 - 01), "b", "금리 인상", Source::Yonhap),
            RawDocument::new(date!(2024 - 01 - 01), "c", "금리 인상", Source::Mpb),
            RawDocument::new(date!(2024 - 01 - 01), "d", "  ", Source::Yonhap),
            RawDocument::new(date!(2024 - 01 - 01), "e", "금리 인상", Source::Yonhap),
        ];
        let corpus = assemble(docs, &rates(), &LabelingConfig::default()).unwrap();
        let keys: Vec<String> = corpus.documents.iter().map(|doc| doc.key.to_string()).collect();
        assert_eq!(vec!["120240101001", "120240101002", "520240101001", "120240101003"], keys);
        assert_eq!(keys.len(), keys.iter().collect::<HashSet<_>>().len());
        assert_eq!(1, corpus.stats.dropped_empty);
        assert!(corpus.documents.iter().all(|doc| doc.label == Label::Hawkish));
    }

    #[test]
    fn unlabeled_documents_are_dropped() {
        let docs = vec![
            RawDocument::new(date!(2024 - 01 - 01), "a", "금리 인상", Source::Bond),
            RawDocument::new(date!(2024 - 02 - 01), "b", "금리 동결", Source::Bond),
            RawDocument::new(date!(2023 - 12 - 01), "c", "금리 동결", Source::Bond),
        ];
        let corpus = assemble(docs, &rates(), &LabelingConfig::default()).unwrap();
        assert_eq!(1, corpus.documents.len());
        assert_eq!(2, corpus.stats.dropped_unlabeled);
        assert_eq!(1, corpus.stats.hawkish);
    }

    #[test]
    fn empty_results_are_errors() {
        let docs = vec![RawDocument::new(date!(2024 - 02 - 01), "b", "금리 동결", Source::Bond)];
        assert_eq!(
            Err(AssemblyError::EmptyCorpus { dropped_empty: 0, dropped_unlabeled: 1 }),
            assemble(docs.clone(), &rates(), &LabelingConfig::default()).map(|_| ())
        );
        assert_eq!(
            Err(AssemblyError::NoRateSeries),
            assemble(docs, &RateSeries::default(), &LabelingConfig::default()).map(|_| ())
        );
    }
}
