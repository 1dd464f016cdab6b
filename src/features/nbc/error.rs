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

use thiserror::Error;
use crate::features::corpus::Label;

/// Configuration errors of the bagged training, they stop the run.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TrainingError {
    #[error("The training corpus is empty.")]
    EmptyCorpus,
    #[error("The training corpus only contains {0} sentences.")]
    SingleClass(Label),
    #[error("The test fraction {0} has to be in (0, 1).")]
    InvalidTestFraction(f64),
    #[error("The class {label} has {available} examples, a test fraction of {test_fraction} leaves {test} for testing and {train} for training.")]
    InfeasibleSplit {
        label: Label,
        available: usize,
        test_fraction: f64,
        test: usize,
        train: usize,
    },
    #[error("At least one estimator is needed.")]
    NoEstimators,
    #[error("The ensemble seed offset {offset} collides with the seeds of {n_estimators} iterations.")]
    SeedCollision {
        offset: u64,
        n_estimators: usize,
    },
    #[error("The smoothing {0} has to be positive.")]
    InvalidAlpha(f64),
    #[error("Failed to build the thread pool: {0}")]
    ThreadPool(String),
}
