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

use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap, HashMap};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::num::NonZeroUsize;
use camino::Utf8PathBuf;
use camino_tempfile::Utf8TempDir;
use itertools::Itertools;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CounterError {
    #[error(transparent)]
    IO(#[from] std::io::Error),
    #[error(transparent)]
    Serialisation(#[from] bincode::Error),
}

/// The result of a counting run.
#[derive(Debug, Clone, Default)]
pub struct CountSummary {
    /// The number of distinct keys that were counted.
    pub total_unique: usize,
    /// The keys with a count of at least the requested minimum.
    pub retained: BTreeMap<String, u64>,
}

/// Reads the entries of a spilled run in key order.
struct RunReader {
    reader: BufReader<File>,
    remaining: u64,
}

impl RunReader {
    fn open(path: &Utf8PathBuf) -> Result<Self, CounterError> {
        let mut reader = BufReader::new(File::open(path)?);
        let remaining: u64 = bincode::deserialize_from(&mut reader)?;
        Ok(Self { reader, remaining })
    }

    fn next_entry(&mut self) -> Result<Option<(String, u64)>, CounterError> {
        if self.remaining == 0 {
            return Ok(None)
        }
        self.remaining -= 1;
        Ok(Some(bincode::deserialize_from(&mut self.reader)?))
    }
}

/// Counts string keys, when more than `max_in_memory` distinct keys are held
/// the counts are written as a sorted run to a temporary folder.
/// The runs are merged when the counter is finished.
pub struct FrequencyCounter {
    counts: HashMap<String, u64>,
    max_in_memory: Option<NonZeroUsize>,
    spill_dir: Option<Utf8TempDir>,
    runs: Vec<Utf8PathBuf>,
}

impl FrequencyCounter {
    pub fn new(max_in_memory: Option<NonZeroUsize>) -> Self {
        Self {
            counts: HashMap::new(),
            max_in_memory,
            spill_dir: None,
            runs: Vec::new(),
        }
    }

    /// The number of runs written to disk.
    pub fn spilled_runs(&self) -> usize {
        self.runs.len()
    }

    pub fn add(&mut self, key: &str) -> Result<(), CounterError> {
        match self.counts.get_mut(key) {
            Some(count) => *count += 1,
            None => {
                self.counts.insert(key.to_string(), 1);
            }
        }
        if let Some(max) = self.max_in_memory {
            if self.counts.len() >= max.get() {
                self.spill()?;
            }
        }
        Ok(())
    }

    pub fn add_all<S: AsRef<str>>(&mut self, keys: impl IntoIterator<Item=S>) -> Result<(), CounterError> {
        for key in keys {
            self.add(key.as_ref())?;
        }
        Ok(())
    }

    fn spill(&mut self) -> Result<(), CounterError> {
        if self.counts.is_empty() {
            return Ok(())
        }
        let dir = match &self.spill_dir {
            Some(dir) => dir.path().to_path_buf(),
            None => {
                let dir = camino_tempfile::Builder::new().prefix("mpb_stance_counts").tempdir()?;
                let path = dir.path().to_path_buf();
                self.spill_dir = Some(dir);
                path
            }
        };
        let path = dir.join(format!("run_{}.bin", self.runs.len()));
        let mut writer = BufWriter::new(File::create(&path)?);
        let entries = std::mem::take(&mut self.counts)
            .into_iter()
            .sorted_unstable_by(|a, b| a.0.cmp(&b.0))
            .collect_vec();
        bincode::serialize_into(&mut writer, &(entries.len() as u64))?;
        for entry in &entries {
            bincode::serialize_into(&mut writer, entry)?;
        }
        writer.flush()?;
        log::debug!("Spilled {} counts to {path}.", entries.len());
        self.runs.push(path);
        Ok(())
    }

    /// Merges the runs in key order and calls [emit] once per distinct key.
    fn merge_runs(&self, mut emit: impl FnMut(String, u64)) -> Result<(), CounterError> {
        let mut readers = self.runs.iter().map(RunReader::open).collect::<Result<Vec<_>, _>>()?;
        let mut heap = BinaryHeap::new();
        for (idx, reader) in readers.iter_mut().enumerate() {
            if let Some((key, count)) = reader.next_entry()? {
                heap.push(Reverse((key, idx, count)));
            }
        }

        let mut current: Option<(String, u64)> = None;
        while let Some(Reverse((key, idx, count))) = heap.pop() {
            if let Some((next_key, next_count)) = readers[idx].next_entry()? {
                heap.push(Reverse((next_key, idx, next_count)));
            }
            let same = matches!(&current, Some((current_key, _)) if *current_key == key);
            if same {
                if let Some((_, total)) = current.as_mut() {
                    *total += count;
                }
            } else if let Some((key, total)) = current.replace((key, count)) {
                emit(key, total);
            }
        }
        if let Some((key, total)) = current {
            emit(key, total);
        }
        Ok(())
    }

    /// Finishes the counting and keeps all keys with at least [min_count] occurrences.
    pub fn finish(mut self, min_count: u64) -> Result<CountSummary, CounterError> {
        let mut summary = CountSummary::default();
        if self.runs.is_empty() {
            summary.total_unique = self.counts.len();
            summary.retained = self.counts.into_iter().filter(|(_, count)| *count >= min_count).collect();
            return Ok(summary)
        }
        self.spill()?;
        self.merge_runs(|key, count| {
            summary.total_unique += 1;
            if count >= min_count {
                summary.retained.insert(key, count);
            }
        })?;
        Ok(summary)
    }
}

#[cfg(test)]
mod test {
    use std::num::NonZeroUsize;
    use super::FrequencyCounter;

    fn words() -> Vec<String> {
        (0..500).map(|idx| format!("ngram{}", (idx * 7) % 23)).collect()
    }

    #[test]
    fn spilling_does_not_change_counts() {
        let mut in_memory = FrequencyCounter::new(None);
        in_memory.add_all(words()).unwrap();
        let in_memory = in_memory.finish(20).unwrap();

        let mut spilling = FrequencyCounter::new(NonZeroUsize::new(5));
        spilling.add_all(words()).unwrap();
        assert!(spilling.spilled_runs() > 1);
        let spilling = spilling.finish(20).unwrap();

        assert_eq!(23, in_memory.total_unique);
        assert_eq!(in_memory.total_unique, spilling.total_unique);
        assert_eq!(in_memory.retained, spilling.retained);
        assert_eq!(500u64, spilling.retained.values().sum::<u64>());
    }

    #[test]
    fn minimum_is_inclusive() {
        let mut counter = FrequencyCounter::new(None);
        counter.add_all(["a", "a", "b"]).unwrap();
        let summary = counter.finish(2).unwrap();
        assert_eq!(2, summary.total_unique);
        assert_eq!(Some(&2), summary.retained.get("a"));
        assert!(!summary.retained.contains_key("b"));
    }
}
