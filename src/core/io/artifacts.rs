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
use std::io::{BufReader, BufWriter, Write};
use camino::Utf8Path;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Errors when reading or writing stage artifacts
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error(transparent)]
    IO(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    CSV(#[from] csv::Error),
    #[error(transparent)]
    Serialisation(#[from] bincode::Error),
}

fn create(path: &Utf8Path) -> Result<BufWriter<File>, ArtifactError> {
    if let Some(parent) = path.parent() {
        if !parent.as_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(
        BufWriter::new(
            File::options()
                .write(true)
                .create(true)
                .truncate(true)
                .open(path)?
        )
    )
}

fn open(path: &Utf8Path) -> Result<BufReader<File>, ArtifactError> {
    Ok(BufReader::new(File::options().read(true).open(path)?))
}

/// Writes [value] as pretty json.
pub fn write_json_pretty<T: Serialize + ?Sized>(path: impl AsRef<Utf8Path>, value: &T) -> Result<(), ArtifactError> {
    let mut writer = create(path.as_ref())?;
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}

/// Writes [value] as compact json.
pub fn write_json<T: Serialize + ?Sized>(path: impl AsRef<Utf8Path>, value: &T) -> Result<(), ArtifactError> {
    let mut writer = create(path.as_ref())?;
    serde_json::to_writer(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}

pub fn read_json<T: DeserializeOwned>(path: impl AsRef<Utf8Path>) -> Result<T, ArtifactError> {
    Ok(serde_json::from_reader(open(path.as_ref())?)?)
}

/// Writes all [records] as csv with a header.
pub fn write_csv<T: Serialize>(path: impl AsRef<Utf8Path>, records: impl IntoIterator<Item=T>) -> Result<(), ArtifactError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(create(path.as_ref())?);
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes one line per entry.
pub fn write_lines<S: AsRef<str>>(path: impl AsRef<Utf8Path>, lines: impl IntoIterator<Item=S>) -> Result<(), ArtifactError> {
    let mut writer = create(path.as_ref())?;
    for line in lines {
        writeln!(&mut writer, "{}", line.as_ref())?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_bincode<T: Serialize>(path: impl AsRef<Utf8Path>, value: &T) -> Result<(), ArtifactError> {
    let mut writer = create(path.as_ref())?;
    bincode::serialize_into(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}

pub fn read_bincode<T: DeserializeOwned>(path: impl AsRef<Utf8Path>) -> Result<T, ArtifactError> {
    let mut reader = open(path.as_ref())?;
    Ok(bincode::deserialize_from(&mut reader)?)
}

#[cfg(test)]
mod test {
    use std::collections::BTreeMap;
    use camino_tempfile::tempdir;
    use super::*;

    #[test]
    fn json_and_bincode_can_be_read_back() {
        let dir = tempdir().unwrap();
        let mut value = BTreeMap::new();
        value.insert("금리 인상".to_string(), vec![0.5f64, -0.25]);

        let json = dir.path().join("nested/value.json");
        write_json_pretty(&json, &value).unwrap();
        let loaded: BTreeMap<String, Vec<f64>> = read_json(&json).unwrap();
        assert_eq!(value, loaded);

        let bin = dir.path().join("value.bin");
        write_bincode(&bin, &value).unwrap();
        let loaded: BTreeMap<String, Vec<f64>> = read_bincode(&bin).unwrap();
        assert_eq!(value, loaded);
    }

    #[test]
    fn lines_are_terminated() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("lines.txt");
        write_lines(&path, ["a", "b"]).unwrap();
        assert_eq!("a\nb\n", std::fs::read_to_string(path).unwrap());
    }
}
