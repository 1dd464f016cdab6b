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

use std::borrow::Cow;
use lindera::{DictionaryConfig, DictionaryKind, Mode, Tokenizer, TokenizerConfig};
use unicode_normalization::UnicodeNormalization;
use crate::features::tokenizing::pos::{PosTag, TaggedToken};
use crate::features::tokenizing::tagger::PosTagger;
use crate::features::tokenizing::TaggerError;

/// A mecab style morphological analyzer backed by the embedded mecab-ko-dic.
///
/// The first detail field of a morpheme is its Sejong tag, compound tags like
/// `VV+EP` are resolved by [PosTag::parse_lenient].
pub struct KoDicTagger {
    tokenizer: Tokenizer,
    normalize: bool,
}

impl KoDicTagger {
    pub fn new(normalize: bool) -> Result<Self, TaggerError> {
        let config = TokenizerConfig {
            dictionary: DictionaryConfig {
                kind: Some(DictionaryKind::KoDic),
                path: None,
            },
            user_dictionary: None,
            mode: Mode::Normal,
        };
        let tokenizer = Tokenizer::from_config(config)
            .map_err(|err| TaggerError::Dictionary(err.to_string()))?;
        Ok(Self { tokenizer, normalize })
    }
}

impl PosTagger for KoDicTagger {
    fn tag(&self, text: &str) -> Vec<TaggedToken> {
        let text = if self.normalize {
            Cow::Owned(text.nfc().to_string())
        } else {
            Cow::Borrowed(text)
        };
        let mut tokens = match self.tokenizer.tokenize(&text) {
            Ok(tokens) => tokens,
            Err(err) => {
                log::warn!("Failed to analyze \"{text}\": {err}");
                return Vec::new()
            }
        };
        tokens
            .iter_mut()
            .filter(|token| !token.text.trim().is_empty())
            .map(|token| {
                let form = token.text.to_string();
                let tag = token
                    .get_details()
                    .and_then(|details| details.first().map(|tag| PosTag::parse_lenient(tag)))
                    .unwrap_or(PosTag::Unknown);
                TaggedToken::new(form, tag)
            })
            .collect()
    }
}
