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

use thiserror::Error;
use crate::core::config::{ExtractionConfig, TaggerKind};

pub mod pos;
pub mod tagger;
pub mod ko_dic;
pub mod language;

pub use pos::{PosTag, TaggedToken};
pub use tagger::{HeuristicKoreanTagger, PosTagger, PretaggedTagger};
pub use ko_dic::KoDicTagger;

#[derive(Debug, Error)]
pub enum TaggerError {
    #[error("Failed to load the ko-dic dictionary: {0}")]
    Dictionary(String),
    #[error(transparent)]
    IO(#[from] std::io::Error),
}

fn create_base_tagger(config: &ExtractionConfig) -> Result<Box<dyn PosTagger>, TaggerError> {
    Ok(match config.tagger {
        TaggerKind::KoDic => Box::new(KoDicTagger::new(config.normalize)?),
        TaggerKind::Heuristic => Box::new(HeuristicKoreanTagger::new(config.normalize)),
    })
}

/// Creates the tagger described by [config].
/// With a pos cache the cached analyses are preferred over the configured tagger.
pub fn create_tagger(config: &ExtractionConfig) -> Result<Box<dyn PosTagger>, TaggerError> {
    let base = create_base_tagger(config)?;
    match &config.pos_cache {
        None => Ok(base),
        Some(path) => {
            let mut tagger = PretaggedTagger::new(base);
            let rejected = tagger.load_jsonl(path)?;
            if rejected > 0 {
                log::warn!("{rejected} lines of the pos cache {path} could not be read.");
            }
            Ok(Box::new(tagger))
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn the_heuristic_tagger_can_be_selected() {
        let config = ExtractionConfig { tagger: TaggerKind::Heuristic, ..ExtractionConfig::default() };
        let tagger = create_tagger(&config).unwrap();
        assert_eq!(vec!["기준금리".to_string(), "인상".to_string()], tagger.filtered_forms("기준금리를 인상하였다.", &[PosTag::NNG]));
    }

    #[test]
    fn ko_dic_is_the_default() {
        assert_eq!(TaggerKind::KoDic, ExtractionConfig::default().tagger);
        let tagger = create_tagger(&ExtractionConfig::default()).unwrap();
        assert!(tagger.filtered_forms("기준금리를 인상하였다.", &[PosTag::NNG]).contains(&"인상".to_string()));
    }
}
