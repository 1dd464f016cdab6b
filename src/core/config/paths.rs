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

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use crate::features::corpus::source::Source;

/// Config of the inputs and the output folder.
#[derive(Debug, Serialize, Deserialize, Clone, Eq, PartialEq)]
#[serde(rename(serialize = "Paths"))]
pub struct PathsConfig {
    /// The root path where all stage outputs are written
    #[serde(default = "_default_root_folder")]
    pub root: Utf8PathBuf,
    /// The cleaned document files
    #[serde(default)]
    pub documents: Vec<DocumentInput>,
    /// The daily call rate series (csv or json)
    #[serde(default)]
    pub rates: Option<Utf8PathBuf>,
    #[serde(default)]
    files: Files
}

fn _default_root_folder() -> Utf8PathBuf { Utf8PathBuf::from("./mpb_stance_data") }

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            root: _default_root_folder(),
            documents: Vec::new(),
            rates: None,
            files: Files::default()
        }
    }
}

/// A single document input file.
/// If [source] is not set the source is read from the records or inferred from the url.
#[derive(Debug, Serialize, Deserialize, Clone, Eq, PartialEq)]
pub struct DocumentInput {
    pub path: Utf8PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,
}

impl DocumentInput {
    pub fn new(path: impl AsRef<Utf8Path>, source: Option<Source>) -> Self {
        Self { path: path.as_ref().to_path_buf(), source }
    }
}

macro_rules! path_constructors {
    ($self: ident.($($root: ident => $name: ident = $path1: ident.$path2: ident;)+)) => {
        $(
            pub fn $name(&$self) -> Utf8PathBuf {
                $self.$root.join(&$self.$path1.$path2)
            }

            paste::paste! {
                #[allow(dead_code)]
                pub fn [<$name _name>](&$self) -> Option<&str> {
                    $self.$path1.$path2.file_name()
                }
            }
        )+
    };
}

impl PathsConfig {
    pub fn new(root: impl AsRef<Utf8Path>, documents: Vec<DocumentInput>, rates: Option<Utf8PathBuf>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            documents,
            rates,
            files: Files::default()
        }
    }

    pub fn root_path(&self) -> &Utf8Path  {
        self.root.as_path()
    }

    path_constructors! {
        self.(
            root => file_corpus = files.corpus;
            root => file_sentence_corpus = files.sentence_corpus;
            root => file_sentence_stats = files.sentence_stats;
            root => file_sentence_ngrams = files.sentence_ngrams;
            root => file_vocabulary = files.vocabulary;
            root => file_extraction_stats = files.extraction_stats;
            root => file_ensemble = files.ensemble;
            root => file_polarity = files.polarity;
            root => file_hawkish_ngrams = files.hawkish_ngrams;
            root => file_dovish_ngrams = files.dovish_ngrams;
            root => file_model_stats = files.model_stats;
            root => file_pr_curve = files.pr_curve;
            root => file_log = files.log;
        )
    }
}

/// The names of the stage outputs, relative to the root.
#[derive(Debug, Serialize, Deserialize, Clone, Eq, PartialEq)]
#[serde(default)]
pub struct Files {
    pub corpus: Utf8PathBuf,
    pub sentence_corpus: Utf8PathBuf,
    pub sentence_stats: Utf8PathBuf,
    pub sentence_ngrams: Utf8PathBuf,
    pub vocabulary: Utf8PathBuf,
    pub extraction_stats: Utf8PathBuf,
    pub ensemble: Utf8PathBuf,
    pub polarity: Utf8PathBuf,
    pub hawkish_ngrams: Utf8PathBuf,
    pub dovish_ngrams: Utf8PathBuf,
    pub model_stats: Utf8PathBuf,
    pub pr_curve: Utf8PathBuf,
    pub log: Utf8PathBuf,
}

impl Default for Files {
    fn default() -> Self {
        Self {
            corpus: Utf8PathBuf::from("corpus.json"),
            sentence_corpus: Utf8PathBuf::from("sentence_corpus.json"),
            sentence_stats: Utf8PathBuf::from("sentence_stats.json"),
            sentence_ngrams: Utf8PathBuf::from("sentence_ngrams.json"),
            vocabulary: Utf8PathBuf::from("ngram_vocabulary.csv"),
            extraction_stats: Utf8PathBuf::from("extraction_stats.json"),
            ensemble: Utf8PathBuf::from("sentence_nbc_ensemble.bin"),
            polarity: Utf8PathBuf::from("ngram_polarity.csv"),
            hawkish_ngrams: Utf8PathBuf::from("hawkish_ngrams.txt"),
            dovish_ngrams: Utf8PathBuf::from("dovish_ngrams.txt"),
            model_stats: Utf8PathBuf::from("model_stats.json"),
            pr_curve: Utf8PathBuf::from("pr_curve_data.json"),
            log: Utf8PathBuf::from("out.log"),
        }
    }
}

#[cfg(test)]
mod test {
    use crate::core::config::paths::PathsConfig;

    #[test]
    fn outputs_are_below_root(){
        let config = PathsConfig::new("out", Vec::new(), None);
        assert_eq!("out/corpus.json", config.file_corpus().as_str());
        assert_eq!(Some("model_stats.json"), config.file_model_stats_name());
    }
}
