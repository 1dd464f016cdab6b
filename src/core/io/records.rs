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

use std::io;
use std::marker::PhantomData;
use csv::{Reader, StringRecord, StringRecordsIntoIter};
use serde::de::DeserializeOwned;

/// Iterates the rows of a csv as [T].
/// Rows that can not be read or deserialized are skipped and counted.
pub struct CsvRecordProvider<T, R> {
    header: StringRecord,
    string_records_iter: StringRecordsIntoIter<R>,
    rejected: usize,
    _produces: PhantomData<T>
}

impl<T, R> CsvRecordProvider<T, R> where R: io::Read {
    pub fn new(mut reader: Reader<R>) -> csv::Result<Self> {
        let header = reader.headers()?.clone();
        Ok(
            Self {
                header,
                string_records_iter: reader.into_records(),
                rejected: 0,
                _produces: PhantomData
            }
        )
    }

    /// Replaces the header before deserializing, used to map aliases to field names.
    pub fn map_header<F: Fn(&str) -> &str>(mut self, mapper: F) -> Self {
        self.header = self.header.iter().map(|value| mapper(value.trim())).collect();
        self
    }

    pub fn header(&self) -> &StringRecord {
        &self.header
    }

    /// The number of rows skipped so far.
    pub fn rejected(&self) -> usize {
        self.rejected
    }
}

impl<T, R> Iterator for CsvRecordProvider<T, R> where T: DeserializeOwned, R: io::Read {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let next = match self.string_records_iter.next()? {
                Ok(value) => value,
                Err(err) => {
                    log::debug!("Failed to read csv row: {err}");
                    self.rejected += 1;
                    continue
                }
            };
            match next.deserialize(Some(&self.header)) {
                Ok(value) => return Some(value),
                Err(err) => {
                    log::debug!("Failed to deserialize csv row {:?}: {err}", next.position());
                    self.rejected += 1;
                }
            }
        }
    }
}
