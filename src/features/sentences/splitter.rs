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

use itertools::Itertools;
use crate::core::config::SplittingConfig;

/// Splits Korean texts into sentences.
///
/// The splitter scans for `.`, `!` and `?` followed by optional whitespace and the
/// apparent start of a new sentence (a Hangul syllable or an ASCII capital) or a line break.
/// Periods in decimal numbers, list markers at the start of a line and initials
/// like `U.S.` are kept inside the sentence. The terminal punctuation stays with
/// the sentence it ends.
#[derive(Debug, Copy, Clone)]
pub struct SentenceSplitter {
    min_chars: usize,
}

impl Default for SentenceSplitter {
    fn default() -> Self {
        Self::new(&SplittingConfig::default())
    }
}

fn is_hangul_syllable(c: char) -> bool {
    ('\u{AC00}'..='\u{D7A3}').contains(&c)
}

fn is_sentence_start(c: char) -> bool {
    is_hangul_syllable(c) || c.is_ascii_uppercase()
}

/// Collapses all whitespace runs to a single space.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().join(" ")
}

/// Collapses the whitespace of each line and drops empty lines.
fn normalize_lines(text: &str) -> String {
    text.lines()
        .map(normalize_whitespace)
        .filter(|line| !line.is_empty())
        .join("\n")
}

impl SentenceSplitter {
    pub fn new(config: &SplittingConfig) -> Self {
        Self { min_chars: config.min_sentence_chars }
    }

    /// The next char after [idx] that is not whitespace.
    fn next_non_space(chars: &[char], idx: usize) -> Option<(usize, char)> {
        chars.iter().copied().enumerate().skip(idx + 1).find(|(_, c)| !c.is_whitespace())
    }

    fn starts_line(chars: &[char], idx: usize) -> bool {
        idx == 0 || chars[idx - 1] == '\n'
    }

    /// True if a list marker like `2.` or `2. ` ends right before [idx].
    fn follows_list_marker(chars: &[char], idx: usize) -> bool {
        let mut end = idx;
        if end > 0 && chars[end - 1].is_whitespace() {
            end -= 1;
        }
        if end == 0 || chars[end - 1] != '.' {
            return false
        }
        let digits = chars[..end - 1].iter().rev().take_while(|c| c.is_ascii_digit()).count();
        (1..=2).contains(&digits)
    }

    /// True if the period at [idx] does not end a sentence.
    fn is_protected_period(chars: &[char], idx: usize) -> bool {
        let Some(prev) = idx.checked_sub(1).map(|i| chars[i]) else {
            return false
        };
        let next = Self::next_non_space(chars, idx).map(|(_, c)| c);

        if prev.is_ascii_digit() {
            // 3.5 or 1. 2
            if next.is_some_and(|c| c.is_ascii_digit()) {
                return true
            }
            // list markers with one or two digits, at a line start or continuing a list
            let digits = chars[..idx].iter().rev().take_while(|c| c.is_ascii_digit()).count();
            let marker = idx - digits;
            return digits <= 2 && (Self::starts_line(chars, marker) || Self::follows_list_marker(chars, marker))
        }

        if prev.is_ascii_uppercase() {
            let before = idx.checked_sub(2).map(|i| chars[i]);
            // the U of U.S.
            if before.map_or(true, |c| !c.is_alphabetic()) && chars.get(idx + 1).is_some_and(|c| c.is_ascii_uppercase()) {
                return true
            }
            // the S of U.S.
            return before == Some('.') && idx.checked_sub(3).is_some_and(|i| chars[i].is_ascii_uppercase())
        }

        false
    }

    /// Finds the sentences of [text] without dropping short fragments.
    pub fn fragments(&self, text: &str) -> Vec<String> {
        let normalized = normalize_lines(text);
        let chars: Vec<char> = normalized.chars().collect();
        let mut fragments = Vec::new();
        let mut start = 0usize;

        for (idx, c) in chars.iter().copied().enumerate() {
            if idx < start || !matches!(c, '.' | '!' | '?') {
                continue
            }
            if c == '.' && Self::is_protected_period(&chars, idx) {
                continue
            }
            let Some((next_idx, next)) = Self::next_non_space(&chars, idx) else {
                continue
            };
            if is_sentence_start(next) || chars[idx + 1..next_idx].contains(&'\n') {
                let fragment: String = chars[start..=idx].iter().collect();
                fragments.push(normalize_whitespace(&fragment));
                start = next_idx;
            }
        }

        if start < chars.len() {
            let fragment: String = chars[start..].iter().collect();
            fragments.push(normalize_whitespace(&fragment));
        }

        fragments.retain(|value| !value.is_empty());
        fragments
    }

    /// Splits [text] into sentences with at least `min_chars` chars.
    /// Falls back to the whole normalized text if no sentence is long enough.
    pub fn split(&self, text: &str) -> Vec<String> {
        let sentences = self
            .fragments(text)
            .into_iter()
            .filter(|value| value.chars().count() >= self.min_chars)
            .collect_vec();
        if !sentences.is_empty() {
            return sentences
        }
        let normalized = normalize_whitespace(text);
        if normalized.is_empty() {
            Vec::new()
        } else {
            vec![normalized]
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn splitter() -> SentenceSplitter {
        SentenceSplitter::default()
    }

    #[test]
    fn splits_on_terminals_before_new_sentences() {
        let text = "한국은행은 기준금리를 인상하였다. 시장은 추가 인상을 예상한다! Bond yields rose sharply?";
        assert_eq!(
            vec![
                "한국은행은 기준금리를 인상하였다.",
                "시장은 추가 인상을 예상한다!",
                "Bond yields rose sharply?",
            ],
            splitter().split(text)
        );
    }

    #[test]
    fn protects_decimals_initials_and_enumerations() {
        let text = "기준금리는 3.5%로 결정되었다. U.S. 연준은 금리를 동결하였다. 주요 안건은 1. 2. 3. 순서로 논의되었다.";
        let sentences = splitter().split(text);
        assert_eq!(3, sentences.len(), "{sentences:?}");
        assert!(sentences[0].contains("3.5%"));
        assert!(sentences[1].starts_with("U.S. 연준"));
        assert!(sentences[2].contains("1. 2. 3."));
    }

    #[test]
    fn numbers_and_capitals_inside_a_line_end_sentences() {
        assert_eq!(
            vec!["올해 금리 인상 횟수는 2.", "한국은행은 다음 회의에서 동결을 결정했다."],
            splitter().split("올해 금리 인상 횟수는 2. 한국은행은 다음 회의에서 동결을 결정했다.")
        );
        assert_eq!(
            vec!["정부는 Plan A.", "한국은행은 기준금리를 동결하였다."],
            splitter().split("정부는 Plan A. 한국은행은 기준금리를 동결하였다.")
        );
    }

    #[test]
    fn protects_list_markers_at_line_starts() {
        let text = "1. 한국은행은 기준금리를 동결하였다.\n2. 물가 상승률은 둔화될 전망이다.";
        assert_eq!(
            vec!["1. 한국은행은 기준금리를 동결하였다.", "2. 물가 상승률은 둔화될 전망이다."],
            splitter().split(text)
        );
    }

    #[test]
    fn normalizes_whitespace() {
        let text = "금융통화위원회는\n\n기준금리를\t유지하기로 하였다.   물가 상승세가 둔화되었다.";
        assert_eq!(
            vec!["금융통화위원회는 기준금리를 유지하기로 하였다.", "물가 상승세가 둔화되었다."],
            splitter().split(text)
        );
    }

    #[test]
    fn short_fragments_fall_back_to_the_text() {
        assert_eq!(vec!["짧다. 짧다."], splitter().split("짧다.  짧다."));
        assert!(splitter().split("  \n ").is_empty());
    }

    #[test]
    fn sentences_cover_the_content() {
        let texts = [
            "금리를 인상하였다.물가가 오를 것으로 보인다. 3.25%에서 3.5%로 인상되었다. 추가 조정은 없었다",
            "Kim said the U.S. economy grew 2.1 percent. 국내 경기는 회복세를 보였다.",
            "정부는 Plan A. 한국은행은 다음 회의에서\n동결을 결정했다.",
            "없음",
        ];
        for text in texts {
            let sentences = splitter().split(text);
            assert!(!sentences.is_empty());
            let joined: String = sentences.concat().chars().filter(|c| !c.is_whitespace()).collect();
            let expected: String = text.chars().filter(|c| !c.is_whitespace()).collect();
            assert_eq!(expected, joined);
        }
    }

    #[test]
    fn is_deterministic() {
        let text = "한국은행은 기준금리를 인상하였다. 시장은 추가 인상을 예상한다.";
        assert_eq!(splitter().split(text), splitter().split(text));
    }
}
