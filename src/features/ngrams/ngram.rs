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

use std::collections::HashMap;
use std::ops::RangeInclusive;
use itertools::Itertools;

/// True if the tokens do not repeat themselves.
///
/// Rejected are n-grams where two adjacent tokens are equal and n-grams
/// with more than two tokens where one token makes up more than half.
pub fn is_valid_ngram<S: AsRef<str>>(tokens: &[S]) -> bool {
    if tokens.len() < 2 {
        return true
    }
    if tokens.iter().tuple_windows().any(|(a, b)| AsRef::<str>::as_ref(a) == AsRef::<str>::as_ref(b)) {
        return false
    }
    if tokens.len() > 2 {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for token in tokens {
            *counts.entry(AsRef::<str>::as_ref(token)).or_insert(0) += 1;
        }
        let max = counts.values().copied().max().unwrap_or(0);
        if max * 2 > tokens.len() {
            return false
        }
    }
    true
}

/// Same as [is_valid_ngram] for a space joined n-gram.
pub fn is_valid_joined(ngram: &str) -> bool {
    is_valid_ngram(&ngram.split(' ').collect_vec())
}

/// All valid n-grams of [tokens] for every n in [range], space joined.
/// Ordered by n first and position second.
pub fn generate_ngrams<S: AsRef<str>>(tokens: &[S], range: RangeInclusive<usize>) -> Vec<String> {
    let mut result = Vec::new();
    for n in range {
        if n == 0 || tokens.len() < n {
            continue
        }
        for window in tokens.windows(n) {
            if is_valid_ngram(window) {
                result.push(window.iter().map(|token| AsRef::<str>::as_ref(token)).join(" "));
            }
        }
    }
    result
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn rejects_degenerate_ngrams() {
        assert!(!is_valid_joined("금리 금리 금리"));
        assert!(!is_valid_joined("금리 금리"));
        assert!(is_valid_joined("금리 인상"));
        assert!(!is_valid_joined("금리 인상 금리 동결 금리"));
        assert!(!is_valid_joined("금리 인상 금리"));
        assert!(is_valid_joined("금리 인상 금리 동결"));
        assert!(is_valid_joined("금리"));
    }

    #[test]
    fn generates_windows_per_order() {
        let tokens = ["기준금리", "인상", "인상", "전망"];
        assert_eq!(
            vec!["기준금리", "인상", "인상", "전망", "기준금리 인상", "인상 전망"],
            generate_ngrams(&tokens, 1..=3)
        );
        assert!(generate_ngrams(&tokens, 5..=5).is_empty());
    }
}
