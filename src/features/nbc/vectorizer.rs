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

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::ops::Deref;
use serde::{Deserialize, Deserializer, Serialize};

/// A sparse count vector, sorted by feature index.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[repr(transparent)]
pub struct SparseCounts(Vec<(u32, f64)>);

impl SparseCounts {
    pub fn total(&self) -> f64 {
        self.0.iter().map(|(_, count)| *count).sum()
    }
}

impl Deref for SparseCounts {
    type Target = [(u32, f64)];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Maps n-grams to feature indices, the vocabulary is sorted.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CountVectorizer {
    features: Vec<String>,
    #[serde(skip)]
    index: HashMap<String, u32>,
}

impl<'de> Deserialize<'de> for CountVectorizer {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Stored {
            features: Vec<String>,
        }
        let stored = Stored::deserialize(deserializer)?;
        Ok(Self::from_sorted(stored.features))
    }
}

impl CountVectorizer {
    fn from_sorted(features: Vec<String>) -> Self {
        let index = features.iter().enumerate().map(|(idx, value)| (value.clone(), idx as u32)).collect();
        Self { features, index }
    }

    /// Learns the vocabulary of the [documents].
    pub fn fit<'a, D, I>(documents: D) -> Self
    where
        D: IntoIterator<Item=I>,
        I: IntoIterator<Item=&'a String>,
    {
        let mut vocabulary = BTreeSet::new();
        for document in documents {
            for ngram in document {
                if !vocabulary.contains(ngram) {
                    vocabulary.insert(ngram.clone());
                }
            }
        }
        Self::from_sorted(vocabulary.into_iter().collect())
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// The n-grams in feature order.
    pub fn features(&self) -> &[String] {
        &self.features
    }

    pub fn feature_index(&self, ngram: &str) -> Option<u32> {
        self.index.get(ngram).copied()
    }

    /// Counts the known n-grams of [document], unknown ones are ignored.
    pub fn transform<S: AsRef<str>>(&self, document: &[S]) -> SparseCounts {
        let mut counts: BTreeMap<u32, f64> = BTreeMap::new();
        for ngram in document {
            if let Some(idx) = self.feature_index(AsRef::<str>::as_ref(ngram)) {
                *counts.entry(idx).or_insert(0.0) += 1.0;
            }
        }
        SparseCounts(counts.into_iter().collect())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn doc(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn vocabulary_is_sorted_and_counts_are_sparse() {
        let train = vec![doc(&["인상", "금리 인상", "인상"]), doc(&["동결"])];
        let vectorizer = CountVectorizer::fit(train.iter());
        assert_eq!(&["금리 인상", "동결", "인상"], vectorizer.features());
        let counts = vectorizer.transform(&["인상", "인상", "인하", "금리 인상"]);
        assert_eq!(&[(0, 1.0), (2, 2.0)], &*counts);
        assert_eq!(3.0, counts.total());
    }

    #[test]
    fn deserialization_rebuilds_the_index() {
        let vectorizer = CountVectorizer::fit(vec![doc(&["b", "a"])].iter());
        let bytes = bincode::serialize(&vectorizer).unwrap();
        let loaded: CountVectorizer = bincode::deserialize(&bytes).unwrap();
        assert_eq!(Some(1), loaded.feature_index("b"));
        assert_eq!(vectorizer, loaded);
    }
}
