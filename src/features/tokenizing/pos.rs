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

use std::str::FromStr;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// The part of speech tags of the Sejong tagset as emitted by mecab-ko.
#[derive(
    Debug,
    Copy,
    Clone,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    Hash,
    Ord,
    PartialOrd,
    Eq,
    PartialEq
)]
#[allow(clippy::upper_case_acronyms)]
pub enum PosTag {
    /// General noun
    NNG,
    /// Proper noun
    NNP,
    /// Dependent noun
    NNB,
    /// Numeral
    NR,
    /// Pronoun
    NP,
    /// Verb
    VV,
    /// Adjective
    VA,
    /// Auxiliary predicate
    VX,
    /// Positive copula
    VCP,
    /// Negative copula
    VCN,
    /// Determiner
    MM,
    /// General adverb
    MAG,
    /// Conjunctive adverb
    MAJ,
    /// Interjection
    IC,
    JKS,
    JKC,
    JKG,
    JKO,
    JKB,
    JKV,
    JKQ,
    JX,
    JC,
    EP,
    EF,
    EC,
    ETN,
    ETM,
    XPN,
    XSN,
    XSV,
    XSA,
    XR,
    SF,
    SE,
    SS,
    SP,
    SO,
    SW,
    /// Foreign word
    SL,
    /// Chinese character
    SH,
    /// Number
    SN,
    /// Anything the analyzer could not tag
    Unknown,
}

impl PosTag {
    /// Parses a tag, compound tags like `VV+EP` resolve to their first part.
    pub fn parse_lenient(value: &str) -> Self {
        let first = value.split('+').next().unwrap_or_default().trim();
        PosTag::from_str(first).unwrap_or(PosTag::Unknown)
    }
}

/// A token with its part of speech.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Hash)]
pub struct TaggedToken {
    pub form: String,
    pub tag: PosTag,
}

impl TaggedToken {
    pub fn new(form: impl Into<String>, tag: PosTag) -> Self {
        Self { form: form.into(), tag }
    }
}
