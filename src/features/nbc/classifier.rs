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
use crate::features::corpus::Label;
use crate::features::nbc::error::TrainingError;
use crate::features::nbc::vectorizer::{CountVectorizer, SparseCounts};
use crate::features::ngrams::SentenceNgrams;

/// A struct implementing this is used as train data.
pub trait TrainDataEntry {
    /// The label of the entry
    fn get_label(&self) -> Label;

    /// The n-grams of the entry
    fn get_ngrams(&self) -> &[String];
}

impl TrainDataEntry for SentenceNgrams {
    fn get_label(&self) -> Label {
        self.label
    }

    fn get_ngrams(&self) -> &[String] {
        &self.ngrams
    }
}

impl TrainDataEntry for (Label, Vec<String>) {
    fn get_label(&self) -> Label {
        self.0
    }

    fn get_ngrams(&self) -> &[String] {
        &self.1
    }
}

/// A multinomial naive bayes over the classes `[Dovish, Hawkish]` with additive smoothing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MultinomialNb {
    alpha: f64,
    class_count: [u64; 2],
    class_log_prior: [f64; 2],
    /// log P(feature | class), indexed by class and feature
    feature_log_prob: [Vec<f64>; 2],
}

fn log_sum_exp(values: [f64; 2]) -> f64 {
    let max = values[0].max(values[1]);
    if max == f64::NEG_INFINITY {
        return max
    }
    max + ((values[0] - max).exp() + (values[1] - max).exp()).ln()
}

impl MultinomialNb {
    /// Fits the model on [samples] with [n_features] columns.
    pub fn fit(samples: &[SparseCounts], labels: &[Label], n_features: usize, alpha: f64) -> Result<Self, TrainingError> {
        if !(alpha > 0.0) {
            return Err(TrainingError::InvalidAlpha(alpha))
        }
        if samples.is_empty() {
            return Err(TrainingError::EmptyCorpus)
        }
        let mut class_count = [0u64; 2];
        let mut feature_count = [vec![0.0f64; n_features], vec![0.0f64; n_features]];
        for (sample, label) in samples.iter().zip(labels) {
            let class = label.index();
            class_count[class] += 1;
            for (idx, count) in sample.iter() {
                feature_count[class][*idx as usize] += *count;
            }
        }
        for label in [Label::Dovish, Label::Hawkish] {
            if class_count[label.index()] as usize == samples.len() {
                return Err(TrainingError::SingleClass(label))
            }
        }

        let total = class_count[0] + class_count[1];
        let class_log_prior = class_count.map(|count| (count as f64).ln() - (total as f64).ln());
        let feature_log_prob = feature_count.map(|counts| {
            let denominator = (counts.iter().sum::<f64>() + alpha * n_features as f64).ln();
            counts.into_iter().map(|count| (count + alpha).ln() - denominator).collect()
        });

        Ok(Self { alpha, class_count, class_log_prior, feature_log_prob })
    }

    pub fn n_features(&self) -> usize {
        self.feature_log_prob[0].len()
    }

    pub fn class_count(&self) -> [u64; 2] {
        self.class_count
    }

    pub fn feature_log_prob(&self, label: Label) -> &[f64] {
        &self.feature_log_prob[label.index()]
    }

    pub fn joint_log_likelihood(&self, sample: &SparseCounts) -> [f64; 2] {
        let mut result = self.class_log_prior;
        for (class, value) in result.iter_mut().enumerate() {
            for (idx, count) in sample.iter() {
                *value += count * self.feature_log_prob[class][*idx as usize];
            }
        }
        result
    }

    /// The probabilities of `[Dovish, Hawkish]`.
    pub fn predict_proba(&self, sample: &SparseCounts) -> [f64; 2] {
        let joint = self.joint_log_likelihood(sample);
        let norm = log_sum_exp(joint);
        joint.map(|value| (value - norm).exp())
    }

    /// The most likely class, ties resolve to [Label::Dovish].
    pub fn predict(&self, sample: &SparseCounts) -> Label {
        let joint = self.joint_log_likelihood(sample);
        if joint[1] > joint[0] {
            Label::Hawkish
        } else {
            Label::Dovish
        }
    }

    /// `log P(f | Hawkish) - log P(f | Dovish)` for every feature.
    pub fn polarity(&self) -> Vec<f64> {
        self.feature_log_prob[1]
            .iter()
            .zip(&self.feature_log_prob[0])
            .map(|(hawkish, dovish)| hawkish - dovish)
            .collect()
    }
}

/// A fitted vectorizer with its model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SentenceClassifier {
    vectorizer: CountVectorizer,
    model: MultinomialNb,
}

impl SentenceClassifier {
    /// Learns the vocabulary and the model from [entries].
    pub fn train<T: TrainDataEntry>(entries: &[&T], alpha: f64) -> Result<Self, TrainingError> {
        let vectorizer = CountVectorizer::fit(entries.iter().map(|entry| entry.get_ngrams()));
        let samples: Vec<SparseCounts> = entries.iter().map(|entry| vectorizer.transform(entry.get_ngrams())).collect();
        let labels: Vec<Label> = entries.iter().map(|entry| entry.get_label()).collect();
        let model = MultinomialNb::fit(&samples, &labels, vectorizer.len(), alpha)?;
        Ok(Self { vectorizer, model })
    }

    pub fn vectorizer(&self) -> &CountVectorizer {
        &self.vectorizer
    }

    pub fn model(&self) -> &MultinomialNb {
        &self.model
    }

    pub fn predict<S: AsRef<str>>(&self, ngrams: &[S]) -> Label {
        self.model.predict(&self.vectorizer.transform(ngrams))
    }

    /// The probability of [Label::Hawkish].
    pub fn predict_hawkish<S: AsRef<str>>(&self, ngrams: &[S]) -> f64 {
        self.model.predict_proba(&self.vectorizer.transform(ngrams))[Label::Hawkish.index()]
    }

    /// The polarity of every n-gram of the vocabulary.
    pub fn polarity(&self) -> Vec<(String, f64)> {
        self.vectorizer.features().iter().cloned().zip(self.model.polarity()).collect()
    }
}

#[cfg(test)]
mod test {
    use float_cmp::approx_eq;
    use super::*;

    fn entry(label: Label, ngrams: &[&str]) -> (Label, Vec<String>) {
        (label, ngrams.iter().map(|value| value.to_string()).collect())
    }

    fn data() -> Vec<(Label, Vec<String>)> {
        vec![
            entry(Label::Hawkish, &["인상", "금리 인상", "물가"]),
            entry(Label::Hawkish, &["인상", "물가"]),
            entry(Label::Dovish, &["인하", "경기 둔화"]),
            entry(Label::Dovish, &["인하", "물가"]),
        ]
    }

    #[test]
    fn smoothing_follows_the_multinomial_estimate() {
        let data = data();
        let refs = data.iter().collect::<Vec<_>>();
        let classifier = SentenceClassifier::train(&refs, 1.0).unwrap();
        // features: 경기 둔화, 금리 인상, 물가, 인상, 인하
        assert_eq!(5, classifier.vectorizer().len());
        let idx = classifier.vectorizer().feature_index("인상").unwrap() as usize;
        // hawkish has 5 tokens, 2 of them 인상
        let expected = ((2.0 + 1.0) / (5.0 + 5.0f64)).ln();
        assert!(approx_eq!(f64, expected, classifier.model().feature_log_prob(Label::Hawkish)[idx], epsilon = 1e-12));
        let expected = ((0.0 + 1.0) / (4.0 + 5.0f64)).ln();
        assert!(approx_eq!(f64, expected, classifier.model().feature_log_prob(Label::Dovish)[idx], epsilon = 1e-12));
    }

    #[test]
    fn predicts_and_scores_polarity() {
        let data = data();
        let refs = data.iter().collect::<Vec<_>>();
        let classifier = SentenceClassifier::train(&refs, 1.0).unwrap();
        assert_eq!(Label::Hawkish, classifier.predict(&["인상"]));
        assert_eq!(Label::Dovish, classifier.predict(&["인하"]));
        let p = classifier.predict_hawkish(&["인상", "금리 인상"]);
        assert!(p > 0.5 && p < 1.0);
        let proba = classifier.model().predict_proba(&classifier.vectorizer().transform(&["물가"]));
        assert!(approx_eq!(f64, 1.0, proba[0] + proba[1], epsilon = 1e-12));

        let polarity = classifier.polarity();
        let score = |ngram: &str| polarity.iter().find(|(value, _)| value == ngram).unwrap().1;
        assert!(score("인상") > 0.0);
        assert!(score("인하") < 0.0);
    }

    #[test]
    fn unknown_ngrams_fall_back_to_the_prior() {
        let data = vec![
            entry(Label::Hawkish, &["인상"]),
            entry(Label::Dovish, &["인하"]),
        ];
        let refs = data.iter().collect::<Vec<_>>();
        let classifier = SentenceClassifier::train(&refs, 1.0).unwrap();
        // equal priors tie
        assert_eq!(Label::Dovish, classifier.predict(&["동결"]));
        assert!(approx_eq!(f64, 0.5, classifier.predict_hawkish(&["동결"]), epsilon = 1e-12));
    }

    #[test]
    fn single_class_fails() {
        let data = vec![entry(Label::Hawkish, &["인상"]), entry(Label::Hawkish, &["인상"])];
        let refs = data.iter().collect::<Vec<_>>();
        assert_eq!(Err(TrainingError::SingleClass(Label::Hawkish)), SentenceClassifier::train(&refs, 1.0).map(|_| ()));
    }
}
