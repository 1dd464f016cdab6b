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
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use crate::core::config::BaggingConfig;
use crate::features::corpus::Label;
use crate::features::nbc::classifier::{SentenceClassifier, TrainDataEntry};
use crate::features::nbc::error::TrainingError;
use crate::features::nbc::metrics::{mean_and_std, BinaryMetrics, ConfusionMatrix};
use crate::features::nbc::polarity::{PolarityAccumulator, PolarityTable};
use crate::features::nbc::split::stratified_split;

/// The evaluation of a single bagging iteration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IterationSummary {
    pub index: usize,
    pub seed: u64,
    pub train_size: usize,
    pub test_size: usize,
    pub metrics: BinaryMetrics,
}

#[derive(Debug, Clone)]
struct IterationResult {
    summary: IterationSummary,
    classifier: SentenceClassifier,
}

/// The models of all iterations, they vote by averaging their hawkish probability.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Ensemble {
    members: Vec<SentenceClassifier>,
}

impl Ensemble {
    pub fn new(members: Vec<SentenceClassifier>) -> Self {
        Self { members }
    }

    pub fn members(&self) -> &[SentenceClassifier] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// The mean probability of [Label::Hawkish] over all members, 0 without members.
    pub fn predict_proba<S: AsRef<str>>(&self, ngrams: &[S]) -> f64 {
        if self.members.is_empty() {
            return 0.0
        }
        let sum: f64 = self.members.iter().map(|member| member.predict_hawkish(ngrams)).sum();
        sum / self.members.len() as f64
    }

    /// Hawkish iff the mean probability is at least 0.5.
    pub fn predict<S: AsRef<str>>(&self, ngrams: &[S]) -> Label {
        if self.predict_proba(ngrams) >= 0.5 {
            Label::Hawkish
        } else {
            Label::Dovish
        }
    }
}

/// The persisted ensemble with the raw polarity scores of every iteration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EnsembleArtifact {
    pub ensemble: Ensemble,
    pub ngram_scores: PolarityAccumulator,
}

/// The content of `model_stats.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelStats {
    pub total_sentences: usize,
    pub n_estimators: usize,
    pub test_size: f64,
    pub mean_f1: f64,
    pub std_f1: f64,
    pub ensemble_accuracy: f64,
    pub ensemble_precision: f64,
    pub ensemble_recall: f64,
    pub ensemble_f1: f64,
    pub hawkish_ngram_count: usize,
    pub dovish_ngram_count: usize,
    pub confusion_matrix: [[usize; 2]; 2],
}

/// The data for a precision recall curve of the ensemble.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PrCurveData {
    pub true_labels: Vec<Label>,
    pub predicted_proba: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub iterations: Vec<IterationSummary>,
    pub artifact: EnsembleArtifact,
    pub polarity: PolarityTable,
    pub stats: ModelStats,
    pub pr_curve: PrCurveData,
}

/// Trains [BaggingConfig::n_estimators] naive bayes models on stratified splits
/// and evaluates them as an ensemble.
#[derive(Debug, Clone)]
pub struct BaggedTrainer {
    config: BaggingConfig,
    threads: Option<NonZeroUsize>,
}

impl BaggedTrainer {
    pub fn new(config: BaggingConfig, threads: Option<NonZeroUsize>) -> Result<Self, TrainingError> {
        if config.n_estimators == 0 {
            return Err(TrainingError::NoEstimators)
        }
        if !(config.alpha > 0.0) {
            return Err(TrainingError::InvalidAlpha(config.alpha))
        }
        if !(config.test_fraction > 0.0 && config.test_fraction < 1.0) {
            return Err(TrainingError::InvalidTestFraction(config.test_fraction))
        }
        if config.ensemble_seed_offset < config.n_estimators as u64 {
            return Err(
                TrainingError::SeedCollision {
                    offset: config.ensemble_seed_offset,
                    n_estimators: config.n_estimators,
                }
            )
        }
        Ok(Self { config, threads })
    }

    pub fn config(&self) -> &BaggingConfig {
        &self.config
    }

    fn run_iteration<T: TrainDataEntry>(&self, data: &[T], labels: &[Label], index: usize) -> Result<IterationResult, TrainingError> {
        let seed = self.config.seed.wrapping_add(index as u64);
        let split = stratified_split(labels, self.config.test_fraction, seed)?;
        let train: Vec<&T> = split.train.iter().map(|idx| &data[*idx]).collect();
        let classifier = SentenceClassifier::train(&train, self.config.alpha)?;

        let mut matrix = ConfusionMatrix::default();
        for idx in &split.test {
            let entry = &data[*idx];
            matrix.add(entry.get_label(), classifier.predict(entry.get_ngrams()));
        }
        let metrics = matrix.metrics();
        log::info!(
            "Iteration {}/{} (seed {}): F1 {:.4}, precision {:.4}, recall {:.4}",
            index + 1, self.config.n_estimators, seed, metrics.f1, metrics.precision, metrics.recall
        );
        Ok(
            IterationResult {
                summary: IterationSummary {
                    index,
                    seed,
                    train_size: split.train.len(),
                    test_size: split.test.len(),
                    metrics,
                },
                classifier,
            }
        )
    }

    fn run_iterations<T: TrainDataEntry + Sync>(&self, data: &[T], labels: &[Label]) -> Result<Vec<IterationResult>, TrainingError> {
        if !self.config.parallel {
            return (0..self.config.n_estimators)
                .map(|index| self.run_iteration(data, labels, index))
                .collect()
        }
        let run = || {
            (0..self.config.n_estimators)
                .into_par_iter()
                .map(|index| self.run_iteration(data, labels, index))
                .collect::<Result<Vec<_>, _>>()
        };
        match self.threads {
            None => run(),
            Some(threads) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(threads.get())
                    .build()
                    .map_err(|err| TrainingError::ThreadPool(err.to_string()))?;
                pool.install(run)
            }
        }
    }

    /// Trains the ensemble on [data] and aggregates the n-gram polarity.
    pub fn train_and_evaluate<T: TrainDataEntry + Sync>(&self, data: &[T]) -> Result<TrainingOutcome, TrainingError> {
        if data.is_empty() {
            return Err(TrainingError::EmptyCorpus)
        }
        let labels: Vec<Label> = data.iter().map(TrainDataEntry::get_label).collect();
        if let Some(label) = labels.first().copied() {
            if labels.iter().all(|value| *value == label) {
                return Err(TrainingError::SingleClass(label))
            }
        }

        log::info!(
            "Training {} models on {} sentences with a test fraction of {}.",
            self.config.n_estimators, data.len(), self.config.test_fraction
        );
        let results = self.run_iterations(data, &labels)?;

        let mut accumulator = PolarityAccumulator::new();
        let mut f1_scores = Vec::with_capacity(results.len());
        let mut iterations = Vec::with_capacity(results.len());
        let mut members = Vec::with_capacity(results.len());
        for IterationResult { summary, classifier } in results {
            accumulator.add_iteration(classifier.polarity());
            f1_scores.push(summary.metrics.f1);
            iterations.push(summary);
            members.push(classifier);
        }
        let ensemble = Ensemble::new(members);

        let ensemble_seed = self.config.seed.wrapping_add(self.config.ensemble_seed_offset);
        let split = stratified_split(&labels, self.config.test_fraction, ensemble_seed)?;
        let mut matrix = ConfusionMatrix::default();
        let mut pr_curve = PrCurveData::default();
        for idx in &split.test {
            let entry = &data[*idx];
            let proba = ensemble.predict_proba(entry.get_ngrams());
            let predicted = if proba >= 0.5 { Label::Hawkish } else { Label::Dovish };
            matrix.add(entry.get_label(), predicted);
            pr_curve.true_labels.push(entry.get_label());
            pr_curve.predicted_proba.push(proba);
        }
        let ensemble_metrics = matrix.metrics();

        let polarity = accumulator.aggregate();
        let (mean_f1, std_f1) = mean_and_std(&f1_scores);
        let stats = ModelStats {
            total_sentences: data.len(),
            n_estimators: self.config.n_estimators,
            test_size: self.config.test_fraction,
            mean_f1,
            std_f1,
            ensemble_accuracy: ensemble_metrics.accuracy,
            ensemble_precision: ensemble_metrics.precision,
            ensemble_recall: ensemble_metrics.recall,
            ensemble_f1: ensemble_metrics.f1,
            hawkish_ngram_count: polarity.count(Label::Hawkish),
            dovish_ngram_count: polarity.count(Label::Dovish),
            confusion_matrix: matrix.as_rows(),
        };

        log::info!(
            "Mean F1 {:.4} (std {:.4}), ensemble F1 {:.4} on {} test sentences.",
            stats.mean_f1, stats.std_f1, stats.ensemble_f1, split.test.len()
        );
        log::info!(
            "{} hawkish and {} dovish n-grams.",
            stats.hawkish_ngram_count, stats.dovish_ngram_count
        );

        Ok(
            TrainingOutcome {
                iterations,
                artifact: EnsembleArtifact {
                    ensemble,
                    ngram_scores: accumulator,
                },
                polarity,
                stats,
                pr_curve,
            }
        )
    }
}
