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

use std::fmt::{Display, Formatter};
use std::str::FromStr;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use time::Date;
use crate::features::corpus::dates::{compact_date, iso_format, parse_date};
use crate::features::corpus::labeler::Label;
use crate::features::corpus::source::Source;

/// A cleaned document before key assignment and labeling.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawDocument {
    #[serde(with = "iso_format")]
    pub date: Date,
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    pub source: Source,
}

impl RawDocument {
    pub fn new(date: Date, title: impl Into<String>, content: impl Into<String>, source: Source) -> Self {
        Self {
            date,
            title: title.into(),
            content: content.into(),
            link: None,
            source,
        }
    }

    pub fn has_content(&self) -> bool {
        !self.content.trim().is_empty()
    }
}

/// The primary key of a document `{source code}{YYYYMMDD}{sequence:03}`.
#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct DocumentKey {
    pub source: Source,
    pub date: Date,
    /// 1-based position within the documents of the same source and date.
    pub sequence: u32,
}

impl DocumentKey {
    pub fn new(source: Source, date: Date, sequence: u32) -> Self {
        Self { source, date, sequence }
    }
}

impl Display for DocumentKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}{:03}", self.source.code(), compact_date(self.date), self.sequence)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("The value {0:?} is not a document key.")]
pub struct DocumentKeyParseError(String);

impl FromStr for DocumentKey {
    type Err = DocumentKeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let error = || DocumentKeyParseError(s.to_string());
        if s.len() < 12 || !s.is_ascii() {
            return Err(error())
        }
        let source = s[0..1].parse::<u8>().ok().and_then(Source::from_code).ok_or_else(error)?;
        let date = parse_date(&s[1..9]).map_err(|_| error())?;
        let sequence = s[9..].parse::<u32>().map_err(|_| error())?;
        Ok(Self::new(source, date, sequence))
    }
}

impl Serialize for DocumentKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DocumentKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}

/// A keyed document, the label is only known after the labeling.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    pub key: DocumentKey,
    #[serde(with = "iso_format")]
    pub date: Date,
    pub title: String,
    pub content: String,
    pub source: Source,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<Label>,
}

impl Document {
    pub fn from_raw(key: DocumentKey, raw: RawDocument) -> Self {
        Self {
            key,
            date: raw.date,
            title: raw.title,
            content: raw.content,
            source: raw.source,
            label: None
        }
    }

    /// Converts to a labeled document if a label is set.
    pub fn into_labeled(self) -> Option<LabeledDocument> {
        let label = self.label?;
        Some(
            LabeledDocument {
                key: self.key,
                date: self.date,
                title: self.title,
                content: self.content,
                source: self.source,
                label,
            }
        )
    }
}

/// A document of the assembled corpus.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LabeledDocument {
    pub key: DocumentKey,
    #[serde(with = "iso_format")]
    pub date: Date,
    pub title: String,
    pub content: String,
    pub source: Source,
    pub label: Label,
}

#[cfg(test)]
mod test {
    use time::macros::date;
    use super::*;

    #[test]
    fn key_format_roundtrips() {
        let key = DocumentKey::new(Source::Edaily, date!(2024 - 03 - 07), 12);
        assert_eq!("220240307012", key.to_string());
        assert_eq!(key, "220240307012".parse().unwrap());
        assert!("920240307012".parse::<DocumentKey>().is_err());
        assert!("2202403".parse::<DocumentKey>().is_err());
    }

    #[test]
    fn only_labeled_documents_convert() {
        let raw = RawDocument::new(date!(2024 - 01 - 01), "title", "content", Source::Mpb);
        let key = DocumentKey::new(Source::Mpb, raw.date, 1);
        let mut document = Document::from_raw(key, raw);
        assert!(document.clone().into_labeled().is_none());
        document.label = Some(Label::Dovish);
        assert_eq!(Label::Dovish, document.into_labeled().unwrap().label);
    }
}
