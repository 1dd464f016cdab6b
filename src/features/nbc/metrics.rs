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

/// A binary confusion matrix with [Label::Hawkish] as positive class.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub true_negative: usize,
    pub false_positive: usize,
    pub false_negative: usize,
    pub true_positive: usize,
}

impl ConfusionMatrix {
    pub fn from_predictions(truth: &[Label], predicted: &[Label]) -> Self {
        let mut matrix = Self::default();
        for (truth, predicted) in truth.iter().zip(predicted) {
            matrix.add(*truth, *predicted);
        }
        matrix
    }

    pub fn add(&mut self, truth: Label, predicted: Label) {
        match (truth, predicted) {
            (Label::Dovish, Label::Dovish) => self.true_negative += 1,
            (Label::Dovish, Label::Hawkish) => self.false_positive += 1,
            (Label::Hawkish, Label::Dovish) => self.false_negative += 1,
            (Label::Hawkish, Label::Hawkish) => self.true_positive += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.true_negative + self.false_positive + self.false_negative + self.true_positive
    }

    /// Rows are the truth, columns the prediction: `[[TN, FP], [FN, TP]]`
    pub fn as_rows(&self) -> [[usize; 2]; 2] {
        [
            [self.true_negative, self.false_positive],
            [self.false_negative, self.true_positive],
        ]
    }

    pub fn metrics(&self) -> BinaryMetrics {
        BinaryMetrics::from(*self)
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Scores of the hawkish class. A zero denominator scores 0.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BinaryMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

impl From<ConfusionMatrix> for BinaryMetrics {
    fn from(value: ConfusionMatrix) -> Self {
        let accuracy = ratio(value.true_positive + value.true_negative, value.total());
        let precision = ratio(value.true_positive, value.true_positive + value.false_positive);
        let recall = ratio(value.true_positive, value.true_positive + value.false_negative);
        let f1 = if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        };
        Self { accuracy, precision, recall, f1 }
    }
}

/// Mean and population standard deviation, `(0, 0)` for no values.
pub fn mean_and_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0)
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|value| (value - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}
