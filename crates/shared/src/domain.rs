use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(SessionId);

/// Lifecycle status of a puzzle as reported by the game service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    #[serde(rename = "playing")]
    InProgress,
    #[serde(rename = "won")]
    Won,
    #[serde(rename = "lost")]
    Lost,
}

impl Outcome {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Outcome::InProgress)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{0}' is not a letter between A and Z")]
pub struct InvalidLetter(pub char);

/// A single upper-case ASCII letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Letter(char);

impl Letter {
    pub const ALPHABET: [Letter; 26] = {
        let mut letters = [Letter('A'); 26];
        let mut i = 0;
        while i < 26 {
            letters[i] = Letter((b'A' + i as u8) as char);
            i += 1;
        }
        letters
    };

    /// Accepts `a`-`z` and `A`-`Z`, normalizing to upper case.
    pub fn parse(raw: char) -> Result<Self, InvalidLetter> {
        if raw.is_ascii_alphabetic() {
            Ok(Self(raw.to_ascii_uppercase()))
        } else {
            Err(InvalidLetter(raw))
        }
    }

    pub fn as_char(self) -> char {
        self.0
    }
}

impl fmt::Display for Letter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Letter {
    type Error = InvalidLetter;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let mut chars = value.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Letter::parse(c),
            (Some(c), Some(_)) => Err(InvalidLetter(c)),
            (None, _) => Err(InvalidLetter(' ')),
        }
    }
}

impl From<Letter> for String {
    fn from(value: Letter) -> Self {
        value.0.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternCell {
    Revealed(char),
    Masked,
}

/// The secret word with unguessed positions masked.
///
/// The service sends `"______"` for a fresh puzzle and `"C _ M M _ T"` once
/// guesses have been made; both parse to the same cell layout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayPattern {
    cells: Vec<PatternCell>,
}

impl DisplayPattern {
    pub const MASK: char = '_';

    pub fn parse(raw: &str) -> Self {
        let cells = raw
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| {
                if c == Self::MASK {
                    PatternCell::Masked
                } else {
                    PatternCell::Revealed(c)
                }
            })
            .collect();
        Self { cells }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn masked_count(&self) -> usize {
        self.cells
            .iter()
            .filter(|cell| matches!(cell, PatternCell::Masked))
            .count()
    }

    pub fn is_solved(&self) -> bool {
        !self.cells.is_empty() && self.masked_count() == 0
    }
}

impl fmt::Display for DisplayPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, cell) in self.cells.iter().enumerate() {
            if idx > 0 {
                f.write_str(" ")?;
            }
            match cell {
                PatternCell::Revealed(c) => write!(f, "{c}")?,
                PatternCell::Masked => write!(f, "{}", Self::MASK)?,
            }
        }
        Ok(())
    }
}
