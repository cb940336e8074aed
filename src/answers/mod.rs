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

//! Answer key model.
//!
//! An answer key is an ordered list of question numbers paired with one of
//! the letters A-E. Each letter maps to a fixed number of pulses.

mod parser;

pub use parser::parse;

use std::fmt;

/// Answer letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnswerLetter {
    A,
    B,
    C,
    D,
    E,
}

impl AnswerLetter {
    /// Parse a single letter, case-insensitive.
    pub fn parse(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'A' => Some(Self::A),
            'B' => Some(Self::B),
            'C' => Some(Self::C),
            'D' => Some(Self::D),
            'E' => Some(Self::E),
            _ => None,
        }
    }

    /// Number of pulses that encode this letter.
    pub fn pulse_count(&self) -> u32 {
        match self {
            Self::A => 1,
            Self::B => 2,
            Self::C => 3,
            Self::D => 4,
            Self::E => 5,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            Self::A => 'A',
            Self::B => 'B',
            Self::C => 'C',
            Self::D => 'D',
            Self::E => 'E',
        }
    }
}

impl fmt::Display for AnswerLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// A single answer extracted from the key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerItem {
    /// Question number exactly as written (leading zeros kept).
    pub question_id: String,
    pub letter: AnswerLetter,
}

impl AnswerItem {
    pub fn new(question_id: impl Into<String>, letter: AnswerLetter) -> Self {
        Self {
            question_id: question_id.into(),
            letter,
        }
    }

    /// Text shown while this answer is transmitted, e.g. `01-A`.
    pub fn label(&self) -> String {
        format!("{}-{}", self.question_id, self.letter)
    }
}
