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

use std::collections::HashSet;
use serde::{Deserialize, Serialize};
use time::Date;
use crate::features::corpus::dates::iso_format;
use crate::features::corpus::{DocumentKey, Label, LabeledDocument};
use crate::features::sentences::splitter::SentenceSplitter;

/// A sentence of a labeled document, it inherits the label of the document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Sentence {
    pub sentence_id: usize,
    pub document_key: DocumentKey,
    #[serde(with = "iso_format")]
    pub date: Date,
    pub label: Label,
    pub text: String,
}

/// Statistics of the sentence split.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SentenceStats {
    pub total_documents: usize,
    pub total_sentences: usize,
    pub avg_sentences_per_doc: f64,
    pub dovish_sentences: usize,
    pub hawkish_sentences: usize,
    pub unique_dates: usize,
}

impl SentenceStats {
    pub fn of(total_documents: usize, sentences: &[Sentence]) -> Self {
        let hawkish_sentences = sentences.iter().filter(|value| value.label.is_hawkish()).count();
        Self {
            total_documents,
            total_sentences: sentences.len(),
            avg_sentences_per_doc: if total_documents == 0 {
                0.0
            } else {
                sentences.len() as f64 / total_documents as f64
            },
            dovish_sentences: sentences.len() - hawkish_sentences,
            hawkish_sentences,
            unique_dates: sentences.iter().map(|value| value.date).collect::<HashSet<_>>().len(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SentenceCorpus {
    pub sentences: Vec<Sentence>,
    pub stats: SentenceStats,
}

/// Splits every document, sentence ids are assigned in document order starting at 0.
pub fn split_corpus(documents: &[LabeledDocument], splitter: &SentenceSplitter) -> SentenceCorpus {
    let mut sentences = Vec::new();
    let mut skipped = 0usize;
    for document in documents {
        let parts = splitter.split(&document.content);
        if parts.is_empty() {
            skipped += 1;
            continue
        }
        for text in parts {
            sentences.push(
                Sentence {
                    sentence_id: sentences.len(),
                    document_key: document.key,
                    date: document.date,
                    label: document.label,
                    text,
                }
            );
        }
    }
    if skipped > 0 {
        log::warn!("{skipped} documents without content produced no sentences.");
    }
    let stats = SentenceStats::of(documents.len(), &sentences);
    log::info!(
        "Split {} documents into {} sentences ({:.1} per document).",
        stats.total_documents, stats.total_sentences, stats.avg_sentences_per_doc
    );
    SentenceCorpus { sentences, stats }
}

#[cfg(test)]
mod test {
    use float_cmp::approx_eq;
    use time::macros::date;
    use crate::features::corpus::Source;
    use super::*;

    fn document(sequence: u32, label: Label, content: &str) -> LabeledDocument {
        let date = date!(2024 - 01 - 01);
        LabeledDocument {
            key: DocumentKey::new(Source::Yonhap, date, sequence),
            date,
            title: String::new(),
            content: content.to_string(),
            source: Source::Yonhap,
            label,
        }
    }

    #[test]
    fn sentences_inherit_key_and_label() {
        let documents = vec![
            document(1, Label::Hawkish, "한국은행은 기준금리를 인상하였다. 시장은 추가 인상을 예상한다."),
            document(2, Label::Dovish, "금융통화위원회는 기준금리를 인하하였다."),
        ];
        let corpus = split_corpus(&documents, &SentenceSplitter::default());
        assert_eq!(3, corpus.sentences.len());
        assert_eq!(vec![0, 1, 2], corpus.sentences.iter().map(|s| s.sentence_id).collect::<Vec<_>>());
        assert_eq!(documents[1].key, corpus.sentences[2].document_key);
        assert_eq!(Label::Dovish, corpus.sentences[2].label);
        assert_eq!(2, corpus.stats.hawkish_sentences);
        assert_eq!(1, corpus.stats.unique_dates);
        assert!(approx_eq!(f64, 1.5, corpus.stats.avg_sentences_per_doc, ulps = 2));
    }

    #[test]
    fn every_non_empty_document_has_a_sentence() {
        let documents = vec![document(1, Label::Hawkish, "인상"), document(2, Label::Hawkish, " ")];
        let corpus = split_corpus(&documents, &SentenceSplitter::default());
        assert_eq!(1, corpus.sentences.len());
        assert_eq!("인상", corpus.sentences[0].text);
    }
}
