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
use strum::{Display, EnumIter, EnumString};

/// The origin of a document.
#[derive(
    Debug,
    Copy,
    Clone,
    Serialize,
    Deserialize,
    EnumString,
    EnumIter,
    Display,
    Hash,
    Ord,
    PartialOrd,
    Eq,
    PartialEq
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Source {
    /// News outlet A
    #[serde(alias = "yh", alias = "Yonhap")]
    #[strum(serialize = "yonhap", serialize = "yh")]
    Yonhap,
    /// News outlet B
    #[serde(alias = "Edaily")]
    Edaily,
    /// News outlet C
    #[serde(alias = "Infomax")]
    Infomax,
    /// Bond analyst reports
    #[serde(alias = "Bond")]
    Bond,
    /// Minutes of the monetary policy board
    #[serde(alias = "MPB")]
    Mpb,
}

impl Source {
    /// The numeric code used as prefix of a document key.
    pub const fn code(self) -> u8 {
        match self {
            Source::Yonhap => 1,
            Source::Edaily => 2,
            Source::Infomax => 3,
            Source::Bond => 4,
            Source::Mpb => 5,
        }
    }

    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Source::Yonhap),
            2 => Some(Source::Edaily),
            3 => Some(Source::Infomax),
            4 => Some(Source::Bond),
            5 => Some(Source::Mpb),
            _ => None
        }
    }

    /// Guesses the news outlet from the link of an article.
    pub fn infer_from_url(url: &str) -> Self {
        let url = url.to_ascii_lowercase();
        if url.contains("infomax") {
            Source::Infomax
        } else if url.contains("edaily") {
            Source::Edaily
        } else {
            Source::Yonhap
        }
    }
}
