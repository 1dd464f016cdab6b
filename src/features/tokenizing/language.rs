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

/// The share of ascii chars in [text], whitespace included. 0 for an empty text.
pub fn ascii_ratio(text: &str) -> f64 {
    let (ascii, total) = text
        .chars()
        .fold((0usize, 0usize), |(ascii, total), c| (ascii + c.is_ascii() as usize, total + 1));
    if total == 0 {
        0.0
    } else {
        ascii as f64 / total as f64
    }
}

/// True if more than [max_ascii_ratio] of the chars are ascii.
pub fn is_foreign(text: &str, max_ascii_ratio: f64) -> bool {
    ascii_ratio(text) > max_ascii_ratio
}
