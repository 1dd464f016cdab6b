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
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use camino::Utf8Path;
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;
use crate::features::sentences::splitter::normalize_whitespace;
use crate::features::tokenizing::pos::{PosTag, TaggedToken};

/// A morphological analyzer that assigns a part of speech to each morpheme.
pub trait PosTagger {
    fn tag(&self, text: &str) -> Vec<TaggedToken>;

    /// The forms of all tokens whose tag is in [filter], in sentence order.
    fn filtered_forms(&self, text: &str, filter: &[PosTag]) -> Vec<String> {
        self.tag(text)
            .into_iter()
            .filter(|token| filter.contains(&token.tag))
            .map(|token| token.form)
            .collect()
    }
}

impl<T: PosTagger + ?Sized> PosTagger for Box<T> {
    fn tag(&self, text: &str) -> Vec<TaggedToken> {
        self.as_ref().tag(text)
    }
}

/// Particles, longest first.
const JOSA: &[(&str, PosTag)] = &[
    ("에서는", PosTag::JX),
    ("으로는", PosTag::JX),
    ("에서의", PosTag::JKG),
    ("에서", PosTag::JKB),
    ("으로", PosTag::JKB),
    ("에게", PosTag::JKB),
    ("까지", PosTag::JX),
    ("부터", PosTag::JX),
    ("보다", PosTag::JKB),
    ("처럼", PosTag::JKB),
    ("만큼", PosTag::JKB),
    ("에는", PosTag::JX),
    ("과의", PosTag::JKG),
    ("와의", PosTag::JKG),
    ("이나", PosTag::JC),
    ("이며", PosTag::VCP),
    ("이다", PosTag::VCP),
    ("의", PosTag::JKG),
    ("은", PosTag::JX),
    ("는", PosTag::JX),
    ("이", PosTag::JKS),
    ("가", PosTag::JKS),
    ("을", PosTag::JKO),
    ("를", PosTag::JKO),
    ("에", PosTag::JKB),
    ("와", PosTag::JC),
    ("과", PosTag::JC),
    ("도", PosTag::JX),
    ("만", PosTag::JX),
    ("로", PosTag::JKB),
];

/// Endings of nouns derived to predicates with 하다 or 되다, longest first.
const DERIVATION_SUFFIXES: &[&str] = &[
    "하였으며", "하였으나", "되었으며", "되었으나", "하겠다고", "하면서", "되면서",
    "하였다", "하였고", "되었다", "되었고", "하겠다", "되겠다", "하지만", "되지만",
    "했으며", "됐으며", "했다", "했고", "됐다", "됐고", "한다", "된다", "하며", "되며",
    "하고", "되고", "하여", "되어", "하는", "되는", "하기", "되기", "하면", "되면",
    "해", "한", "된", "할", "될", "함", "됨",
];

/// Inflected surfaces of common predicates.
const PREDICATES: &[(&str, PosTag, &[&str])] = &[
    ("오르", PosTag::VV, &["오르", "올라", "올랐"]),
    ("내리", PosTag::VV, &["내리", "내려", "내렸"]),
    ("올리", PosTag::VV, &["올리", "올려", "올렸"]),
    ("떨어지", PosTag::VV, &["떨어지", "떨어져", "떨어졌"]),
    ("늘", PosTag::VV, &["늘", "늘어", "늘었", "늘어나", "늘어났"]),
    ("줄", PosTag::VV, &["줄", "줄어", "줄었", "줄어들", "줄어든", "줄어들었"]),
    ("보이", PosTag::VV, &["보이", "보여", "보였"]),
    ("있", PosTag::VV, &["있"]),
    ("높", PosTag::VA, &["높"]),
    ("낮", PosTag::VA, &["낮"]),
    ("크", PosTag::VA, &["크", "커", "컸", "큰"]),
    ("작", PosTag::VA, &["작"]),
    ("많", PosTag::VA, &["많"]),
    ("적", PosTag::VA, &["적"]),
    ("없", PosTag::VA, &["없"]),
    ("좋", PosTag::VA, &["좋"]),
    ("어렵", PosTag::VA, &["어렵", "어려운", "어려울", "어려워"]),
    ("강하", PosTag::VA, &["강하", "강한", "강해", "강했"]),
    ("약하", PosTag::VA, &["약하", "약한", "약해", "약했"]),
    ("빠르", PosTag::VA, &["빠르", "빠른", "빨라", "빨랐"]),
    ("않", PosTag::VX, &["않"]),
];

/// Endings that may follow a predicate surface.
const ENDINGS: &[&str] = &[
    "", "다", "고", "며", "게", "지", "은", "는", "을", "던", "아", "어", "아서", "어서",
    "으며", "으나", "으면", "면", "지만", "았다", "었다", "았고", "었고", "겠다", "다고", "기",
    "음",
];

const ADVERBS: &[&str] = &[
    "더", "덜", "다시", "매우", "아직", "이미", "다소", "점차", "점점", "여전히", "상당히",
    "계속", "가장", "특히", "크게", "높게", "낮게", "빠르게", "완만하게", "소폭", "대폭",
    "크게는", "잘", "못", "안", "또다시", "지속적으로", "추가로", "다만",
];

const CONJUNCTIONS: &[&str] = &["또한", "그러나", "하지만", "따라서", "그리고", "또", "한편"];

const NEGATIVE_COPULA: &[&str] = &[
    "아니다", "아니라", "아니며", "아니고", "아닌", "아니어서", "아니지만", "아님", "아니나",
];

fn is_hangul(word: &str) -> bool {
    word.chars().all(|c| ('\u{AC00}'..='\u{D7A3}').contains(&c))
}

fn char_len(value: &str) -> usize {
    value.chars().count()
}

/// A rule based tagger for Korean economic news.
///
/// It knows a small lexicon of adverbs and predicates, splits derived predicates
/// (`인상하였다` becomes `인상` and `하였다`) and strips particles from nouns.
/// Everything else in Hangul is treated as general noun.
#[derive(Debug, Clone, Copy)]
pub struct HeuristicKoreanTagger {
    normalize: bool,
}

impl Default for HeuristicKoreanTagger {
    fn default() -> Self {
        Self { normalize: true }
    }
}

impl HeuristicKoreanTagger {
    pub fn new(normalize: bool) -> Self {
        Self { normalize }
    }

    fn tag_predicate(word: &str, into: &mut Vec<TaggedToken>) -> bool {
        let mut best: Option<(&str, PosTag, &str)> = None;
        for (stem, tag, surfaces) in PREDICATES {
            for surface in surfaces.iter() {
                if let Some(rest) = word.strip_prefix(surface) {
                    if ENDINGS.contains(&rest) && best.map_or(true, |(s, _, _)| surface.len() > s.len()) {
                        best = Some((*surface, *tag, *stem));
                    }
                }
            }
        }
        let Some((surface, tag, stem)) = best else {
            return false
        };
        into.push(TaggedToken::new(stem, tag));
        let rest = &word[surface.len()..];
        if !rest.is_empty() {
            into.push(TaggedToken::new(rest, PosTag::EC));
        }
        true
    }

    fn tag_derived(word: &str, into: &mut Vec<TaggedToken>) -> bool {
        for suffix in DERIVATION_SUFFIXES {
            if let Some(stem) = word.strip_suffix(suffix) {
                if char_len(stem) >= 2 {
                    into.push(TaggedToken::new(stem, PosTag::NNG));
                    into.push(TaggedToken::new(*suffix, PosTag::XSV));
                    return true
                }
            }
        }
        false
    }

    fn tag_noun(word: &str, into: &mut Vec<TaggedToken>) {
        for (josa, tag) in JOSA {
            if let Some(stem) = word.strip_suffix(josa) {
                if char_len(stem) >= 2 {
                    into.push(TaggedToken::new(stem, PosTag::NNG));
                    into.push(TaggedToken::new(*josa, *tag));
                    return
                }
            }
        }
        into.push(TaggedToken::new(word, PosTag::NNG));
    }

    fn tag_word(word: &str, into: &mut Vec<TaggedToken>) {
        if word.chars().all(|c| c.is_ascii_digit() || c == '.' || c == ',') {
            into.push(TaggedToken::new(word, PosTag::SN));
            return
        }
        if word.chars().all(|c| c.is_ascii_alphabetic()) {
            into.push(TaggedToken::new(word, PosTag::SL));
            return
        }
        if !is_hangul(word) {
            into.push(TaggedToken::new(word, PosTag::SW));
            return
        }
        if ADVERBS.contains(&word) {
            into.push(TaggedToken::new(word, PosTag::MAG));
            return
        }
        if CONJUNCTIONS.contains(&word) {
            into.push(TaggedToken::new(word, PosTag::MAJ));
            return
        }
        if NEGATIVE_COPULA.contains(&word) {
            into.push(TaggedToken::new("아니", PosTag::VCN));
            if let Some(rest) = word.strip_prefix("아니").filter(|rest| !rest.is_empty()) {
                into.push(TaggedToken::new(rest, PosTag::EC));
            }
            return
        }
        if Self::tag_predicate(word, into) {
            return
        }
        if Self::tag_derived(word, into) {
            return
        }
        Self::tag_noun(word, into)
    }
}

impl PosTagger for HeuristicKoreanTagger {
    fn tag(&self, text: &str) -> Vec<TaggedToken> {
        let text = if self.normalize {
            Cow::Owned(text.nfc().to_string())
        } else {
            Cow::Borrowed(text)
        };
        let mut tokens = Vec::new();
        for word in text.unicode_words() {
            Self::tag_word(word, &mut tokens);
        }
        tokens
    }
}

/// A line of a pos cache file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PretaggedSentence {
    pub sentence: String,
    /// Whitespace separated `form/TAG` pairs.
    pub tokens: String,
}

/// Parses the `form/TAG form/TAG` output of mecab-ko.
pub fn parse_tagged(value: &str) -> Vec<TaggedToken> {
    value
        .split_whitespace()
        .filter_map(|pair| {
            let (form, tag) = pair.rsplit_once('/')?;
            if form.is_empty() {
                return None
            }
            Some(TaggedToken::new(form, PosTag::parse_lenient(tag)))
        })
        .collect()
}

/// Serves the analyses of an external morphological analyzer,
/// unknown sentences are tagged by the fallback.
#[derive(Debug, Clone)]
pub struct PretaggedTagger<T> {
    cache: HashMap<String, Vec<TaggedToken>>,
    fallback: T,
}

impl<T: PosTagger> PretaggedTagger<T> {
    pub fn new(fallback: T) -> Self {
        Self { cache: HashMap::new(), fallback }
    }

    pub fn insert(&mut self, sentence: &str, tokens: Vec<TaggedToken>) {
        self.cache.insert(normalize_whitespace(sentence), tokens);
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Loads a jsonl file of [PretaggedSentence]. Returns the number of rejected lines.
    pub fn load_jsonl(&mut self, path: &Utf8Path) -> std::io::Result<usize> {
        let reader = BufReader::new(File::open(path)?);
        let mut rejected = 0usize;
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue
            }
            match serde_json::from_str::<PretaggedSentence>(&line) {
                Ok(entry) => {
                    let tokens = parse_tagged(&entry.tokens);
                    self.insert(&entry.sentence, tokens);
                }
                Err(err) => {
                    log::debug!("Failed to read a pos cache line: {err}");
                    rejected += 1;
                }
            }
        }
        log::info!("Loaded {} pre-tagged sentences from {path} ({rejected} rejected).", self.cache.len());
        Ok(rejected)
    }
}

impl<T: PosTagger> PosTagger for PretaggedTagger<T> {
    fn tag(&self, text: &str) -> Vec<TaggedToken> {
        match self.cache.get(&normalize_whitespace(text)) {
            Some(tokens) => tokens.clone(),
            None => self.fallback.tag(text)
        }
    }
}

#[cfg(test)]
mod test {
    use camino_tempfile::tempdir;
    use crate::core::config::pipeline::DEFAULT_POS_FILTER;
    use super::*;

    fn forms(text: &str) -> Vec<String> {
        HeuristicKoreanTagger::default().filtered_forms(text, &DEFAULT_POS_FILTER)
    }

    #[test]
    fn strips_particles_and_derivations() {
        assert_eq!(
            vec!["한국은행", "기준금리", "인상"],
            forms("한국은행은 기준금리를 인상하였다.")
        );
        assert_eq!(vec!["물가", "상승세", "둔화"], forms("물가 상승세가 둔화되었다."));
    }

    #[test]
    fn tags_predicates_adverbs_and_copula() {
        let tokens = HeuristicKoreanTagger::default().tag("금리가 크게 올랐다 물가가 높은 것은 아니다");
        let tags: Vec<(String, PosTag)> = tokens.into_iter().map(|t| (t.form, t.tag)).collect();
        assert!(tags.contains(&("크게".to_string(), PosTag::MAG)));
        assert!(tags.contains(&("오르".to_string(), PosTag::VV)));
        assert!(tags.contains(&("높".to_string(), PosTag::VA)));
        assert!(tags.contains(&("아니".to_string(), PosTag::VCN)));
        assert!(tags.contains(&("금리".to_string(), PosTag::NNG)));
    }

    #[test]
    fn numbers_and_latin_are_not_kept() {
        assert_eq!(vec!["금리"], forms("금리 3.5 BOK"));
    }

    #[test]
    fn parses_mecab_output() {
        let tokens = parse_tagged("금리/NNG 가/JKS 올랐/VV+EP 다/EF ./SF");
        assert_eq!(5, tokens.len());
        assert_eq!(TaggedToken::new("올랐", PosTag::VV), tokens[2]);
        assert_eq!(PosTag::SF, tokens[4].tag);
    }

    #[test]
    fn cache_takes_precedence_over_the_fallback() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pos.jsonl");
        std::fs::write(
            &path,
            "{\"sentence\": \"금리가  올랐다.\", \"tokens\": \"금리/NNG 가/JKS 오르/VV 았/EP 다/EF ./SF\"}\nbroken\n",
        ).unwrap();
        let mut tagger = PretaggedTagger::new(HeuristicKoreanTagger::default());
        assert_eq!(1, tagger.load_jsonl(&path).unwrap());
        assert_eq!(1, tagger.len());
        assert_eq!(vec!["금리", "오르"], tagger.filtered_forms("금리가 올랐다.", &DEFAULT_POS_FILTER));
        assert_eq!(vec!["물가"], tagger.filtered_forms("물가는", &DEFAULT_POS_FILTER));
    }
}
