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

//! Mines hawkish and dovish n-grams from Korean monetary-policy texts.
//!
//! The pipeline labels documents by the following call rate movement, splits them into
//! sentences, extracts pos filtered n-grams and trains a bagged naive bayes ensemble
//! whose per n-gram log-likelihood ratios form a polarity lexicon.

pub mod core;
pub mod features;
pub mod application;
