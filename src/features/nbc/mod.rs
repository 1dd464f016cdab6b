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

//! Bagged multinomial naive bayes over sentence n-grams.

pub mod error;
pub mod split;
pub mod vectorizer;
pub mod classifier;
pub mod metrics;
pub mod polarity;
pub mod bagging;

pub use bagging::{BaggedTrainer, Ensemble, EnsembleArtifact, IterationSummary, ModelStats, PrCurveData, TrainingOutcome};
pub use classifier::{MultinomialNb, SentenceClassifier, TrainDataEntry};
pub use error::TrainingError;
pub use metrics::{BinaryMetrics, ConfusionMatrix};
pub use polarity::{PolarityAccumulator, PolarityEntry, PolarityTable};
pub use split::{stratified_split, TrainTestSplit};
pub use vectorizer::{CountVectorizer, SparseCounts};
