// Copyright 2026 Daniel Pelikan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Answer key parsing.
//!
//! Extracts `(question, letter)` pairs from free-form text such as
//! `01-A, 02-B` or `1) c  2) d`. Anything that doesn't fit the pattern is
//! skipped.

use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use super::{AnswerItem, AnswerLetter};

// ASCII digits, then anything that is neither a digit nor an answer letter, then the letter.
static ANSWER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]+)[^0-9A-Ea-e]*([A-Ea-e])").unwrap());

/// Parse an answer key into items, in order of appearance.
///
/// Never fails: text without any digit/letter pair gives an empty list,
/// which callers must check for themselves.
pub fn parse(text: &str) -> Vec<AnswerItem> {
    let items: Vec<AnswerItem> = ANSWER_REGEX
        .captures_iter(text)
        .filter_map(|cap| {
            let question = cap.get(1)?.as_str();
            let letter = cap.get(2)?.as_str().chars().next()?;
            Some(AnswerItem::new(question, AnswerLetter::parse(letter)?))
        })
        .collect();

    debug!("Parsed {} answers from {} chars", items.len(), text.chars().count());
    items
}
