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

use std::fs::File;
use std::io::{BufReader, Read};
use std::str::FromStr;
use camino::Utf8Path;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use crate::core::config::DocumentInput;
use crate::core::io::CsvRecordProvider;
use crate::features::corpus::dates::{parse_date, DateParseError};
use crate::features::corpus::document::RawDocument;
use crate::features::corpus::rates::{RateObservation, RateSeries};
use crate::features::corpus::source::Source;

/// Errors that prevent reading an input file at all.
#[derive(Debug, Error)]
pub enum InputError {
    #[error(transparent)]
    IO(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    CSV(#[from] csv::Error),
}

/// Why a single record was rejected.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("The record has no date.")]
    MissingDate,
    #[error(transparent)]
    Date(#[from] DateParseError),
    #[error("The source {0:?} is unknown.")]
    UnknownSource(String),
    #[error("The record is not an object: {0}")]
    Shape(serde_json::Error),
}

/// The outcome of loading an input file.
#[derive(Debug, Clone)]
pub struct Loaded<T> {
    pub values: Vec<T>,
    /// The number of records that were rejected.
    pub rejected: usize,
}

impl<T> Default for Loaded<T> {
    fn default() -> Self {
        Self { values: Vec::new(), rejected: 0 }
    }
}

/// A record as emitted by the cleansing scripts, every field is optional.
#[derive(Debug, Deserialize, Default)]
struct DocumentRecord {
    #[serde(default, alias = "Date")]
    date: Option<String>,
    #[serde(default, alias = "Title")]
    title: Option<String>,
    #[serde(default, alias = "Content")]
    content: Option<String>,
    #[serde(default, alias = "url", alias = "pdf_url", alias = "Link")]
    link: Option<String>,
    #[serde(default, alias = "Source")]
    source: Option<String>,
    #[serde(default)]
    discussion: Option<String>,
    #[serde(default)]
    decision: Option<String>,
}

impl DocumentRecord {
    fn into_raw_document(self, default_source: Option<Source>) -> Result<RawDocument, RecordError> {
        let date = self.date.as_deref().map(str::trim).filter(|value| !value.is_empty()).ok_or(RecordError::MissingDate)?;
        let date = parse_date(date)?;

        let source = match (default_source, self.source.as_deref().map(str::trim)) {
            (Some(source), _) => source,
            (None, Some(name)) if !name.is_empty() => {
                Source::from_str(name).map_err(|_| RecordError::UnknownSource(name.to_string()))?
            }
            _ => Source::infer_from_url(self.link.as_deref().unwrap_or_default())
        };

        let mut content = self.content.unwrap_or_default();
        if content.trim().is_empty() {
            let discussion = self.discussion.unwrap_or_default();
            let decision = self.decision.unwrap_or_default();
            if !discussion.is_empty() || !decision.is_empty() {
                content = format!("{discussion}\n{decision}");
            }
        }

        Ok(
            RawDocument {
                date,
                title: self.title.unwrap_or_default(),
                content,
                link: self.link.filter(|value| !value.is_empty()),
                source,
            }
        )
    }
}

/// Collects the records of a json document.
/// Supports an array of records, a map of arrays (keyed by source name) and a single record.
fn collect_records(value: Value, into: &mut Vec<(Option<Source>, Value)>) {
    match value {
        Value::Array(values) => {
            into.extend(values.into_iter().map(|value| (None, value)))
        }
        Value::Object(map) if map.values().all(|value| value.is_array()) && !map.is_empty() => {
            for (key, values) in map {
                let source = Source::from_str(key.trim()).ok();
                if let Value::Array(values) = values {
                    into.extend(values.into_iter().map(|value| (source, value)))
                }
            }
        }
        other => into.push((None, other))
    }
}

/// Parses a json or newline delimited json text into raw documents.
pub fn parse_documents(text: &str, default_source: Option<Source>) -> Result<Loaded<RawDocument>, InputError> {
    let mut records = Vec::new();
    match serde_json::from_str::<Value>(text) {
        Ok(value) => collect_records(value, &mut records),
        Err(err) => {
            let mut lines = text.lines().map(str::trim).filter(|line| !line.is_empty()).peekable();
            if lines.peek().is_none() {
                return Ok(Loaded::default())
            }
            let mut any = false;
            for line in lines {
                match serde_json::from_str::<Value>(line) {
                    Ok(value) => {
                        any = true;
                        records.push((None, value))
                    },
                    Err(line_err) => {
                        log::debug!("Failed to parse the line {line:?}: {line_err}");
                        records.push((None, Value::Null))
                    }
                }
            }
            if !any {
                return Err(err.into())
            }
        }
    }

    let mut loaded = Loaded { values: Vec::with_capacity(records.len()), rejected: 0 };
    for (map_source, value) in records {
        let parsed = serde_json::from_value::<DocumentRecord>(value)
            .map_err(RecordError::Shape)
            .and_then(|record| record.into_raw_document(default_source.or(map_source)));
        match parsed {
            Ok(document) => loaded.values.push(document),
            Err(err) => {
                log::debug!("Rejected a document record: {err}");
                loaded.rejected += 1;
            }
        }
    }
    Ok(loaded)
}

/// Loads the documents of a single input file.
pub fn load_documents(input: &DocumentInput) -> Result<Loaded<RawDocument>, InputError> {
    let mut text = String::new();
    BufReader::new(File::open(&input.path)?).read_to_string(&mut text)?;
    let loaded = parse_documents(&text, input.source)?;
    log::info!("Loaded {} documents from {} ({} rejected).", loaded.values.len(), input.path, loaded.rejected);
    Ok(loaded)
}

/// Maps the known column names of rate tables to `date` and `rate`.
fn rate_column(name: &str) -> &str {
    match name {
        "date" | "Date" | "DATE" | "날짜" | "일자" => "date",
        "rate" | "Rate" | "call_rate" | "Call_Rate" | "CallRate" | "콜금리" => "rate",
        other => other
    }
}

#[derive(Debug, Deserialize)]
struct RateRecord {
    date: String,
    rate: f64,
}

impl RateRecord {
    fn into_observation(self) -> Result<RateObservation, DateParseError> {
        Ok(RateObservation::new(parse_date(&self.date)?, self.rate))
    }
}

fn collect_rates(records: impl Iterator<Item=RateRecord>, mut rejected: usize) -> Loaded<RateObservation> {
    let mut values = Vec::new();
    for record in records {
        if !record.rate.is_finite() {
            rejected += 1;
            continue
        }
        match record.into_observation() {
            Ok(value) => values.push(value),
            Err(err) => {
                log::debug!("Rejected a rate record: {err}");
                rejected += 1;
            }
        }
    }
    Loaded { values, rejected }
}

/// Parses a csv rate table with a header.
pub fn parse_rates_csv<R: Read>(reader: R) -> Result<Loaded<RateObservation>, InputError> {
    let reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let mut provider = CsvRecordProvider::<RateRecord, _>::new(reader)?.map_header(rate_column);
    let rates: Vec<RateRecord> = provider.by_ref().collect();
    Ok(collect_rates(rates.into_iter(), provider.rejected()))
}

/// Parses a json array of `{date, rate}` objects.
pub fn parse_rates_json(text: &str) -> Result<Loaded<RateObservation>, InputError> {
    let values: Vec<Value> = serde_json::from_str(text)?;
    let mut rejected = 0;
    let records = values
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<RateRecord>(value) {
            Ok(record) => Some(record),
            Err(_) => {
                rejected += 1;
                None
            }
        })
        .collect::<Vec<_>>();
    Ok(collect_rates(records.into_iter(), rejected))
}

/// Loads a rate series, json if the extension says so, otherwise csv.
/// Returns the series and the number of rejected rows.
pub fn load_rate_series(path: &Utf8Path) -> Result<(RateSeries, usize), InputError> {
    let loaded = match path.extension().map(str::to_ascii_lowercase).as_deref() {
        Some("json") => {
            let mut text = String::new();
            BufReader::new(File::open(path)?).read_to_string(&mut text)?;
            parse_rates_json(&text)?
        }
        _ => parse_rates_csv(BufReader::new(File::open(path)?))?
    };
    log::info!("Loaded {} rate observations from {path} ({} rejected).", loaded.values.len(), loaded.rejected);
    Ok((RateSeries::new(loaded.values), loaded.rejected))
}

#[cfg(test)]
mod test {
    use time::macros::date;
    use super::*;

    #[test]
    fn parses_news_maps_and_infers_sources() {
        let text = r#"{
            "edaily": [{"date": "2024-01-02", "title": "a", "content": "금리 인상 전망", "url": "https://edaily.co.kr/1"}],
            "misc": [
                {"date": "2024-01-03", "title": "b", "content": "금리 동결", "url": "https://news.einfomax.co.kr/2"},
                {"title": "no date", "content": "x"}
            ]
        }"#;
        let loaded = parse_documents(text, None).unwrap();
        assert_eq!(2, loaded.values.len());
        assert_eq!(1, loaded.rejected);
        assert_eq!(Source::Edaily, loaded.values[0].source);
        assert_eq!(Source::Infomax, loaded.values[1].source);
    }

    #[test]
    fn minutes_fall_back_to_discussion_and_decision() {
        let text = r#"[{"date": "2024.01.11", "title": "의사록", "content": "", "discussion": "논의", "decision": "결정", "pdf_url": "x.pdf"}]"#;
        let loaded = parse_documents(text, Some(Source::Mpb)).unwrap();
        assert_eq!("논의\n결정", loaded.values[0].content);
        assert_eq!(Some("x.pdf".to_string()), loaded.values[0].link);
        assert_eq!(date!(2024 - 01 - 11), loaded.values[0].date);
    }

    #[test]
    fn parses_ndjson_and_rejects_bad_lines() {
        let text = "{\"date\": \"2024-01-01\", \"title\": \"t\", \"content\": \"c\", \"source\": \"bond\"}\nnot json\n{\"date\": \"2024-01-01\", \"content\": \"c\", \"source\": \"reuters\"}\n";
        let loaded = parse_documents(text, None).unwrap();
        assert_eq!(1, loaded.values.len());
        assert_eq!(Source::Bond, loaded.values[0].source);
        assert_eq!(2, loaded.rejected);
    }

    #[test]
    fn parses_rate_tables() {
        let data = "날짜,콜금리\n2024-01-02,3.5\nbad,3.4\n2024-01-01,3.55\n2024-01-03,\n";
        let loaded = parse_rates_csv(data.as_bytes()).unwrap();
        assert_eq!(2, loaded.values.len());
        assert_eq!(2, loaded.rejected);

        let loaded = parse_rates_json(r#"[{"date": "2024-01-01", "rate": 3.5}, {"date": "2024-01-02", "rate": "x"}]"#).unwrap();
        assert_eq!(1, loaded.values.len());
        assert_eq!(1, loaded.rejected);
    }
}
