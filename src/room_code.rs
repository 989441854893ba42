//! Room code generation and parsing
//!
//! Rooms are addressed by a short code players type on their phones. Codes
//! are four characters of uppercase base 36 and are parsed case-insensitively
//! so "ab12" finds the room shown on screen as "AB12".

use std::{fmt::Display, str::FromStr};

use serde_with::{DeserializeFromStr, SerializeDisplay};
use thiserror::Error;

use crate::constants::room::{CODE_ALPHABET, CODE_LENGTH};

/// A short, shareable room identifier
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, SerializeDisplay, DeserializeFromStr,
)]
pub struct RoomCode([u8; CODE_LENGTH]);

/// Errors produced while parsing a room code
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum Error {
    /// The code does not have exactly four characters
    #[error("room code must be four characters")]
    Length,
    /// The code contains something other than letters and digits
    #[error("room code may only contain letters and digits")]
    Character,
}

impl RoomCode {
    /// Draws a random code from `rng`
    pub fn random(rng: &mut fastrand::Rng) -> Self {
        let mut code = [0; CODE_LENGTH];
        for c in &mut code {
            *c = CODE_ALPHABET[rng.usize(..CODE_ALPHABET.len())];
        }
        Self(code)
    }

    /// Returns the code as a string slice
    pub fn as_str(&self) -> &str {
        // only ASCII alphanumerics are ever stored
        std::str::from_utf8(&self.0).unwrap_or_default()
    }
}

impl Display for RoomCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoomCode {
    type Err = Error;

    /// Parses a code, ignoring surrounding whitespace and letter case
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() != CODE_LENGTH {
            return Err(Error::Length);
        }
        let mut code = [0; CODE_LENGTH];
        for (slot, byte) in code.iter_mut().zip(s.bytes()) {
            if !byte.is_ascii_alphanumeric() {
                return Err(Error::Character);
            }
            *slot = byte.to_ascii_uppercase();
        }
        Ok(Self(code))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_random_code_shape() {
        let mut rng = fastrand::Rng::with_seed(7);
        for _ in 0..100 {
            let code = RoomCode::random(&mut rng);
            let s = code.to_string();
            assert_eq!(s.len(), CODE_LENGTH);
            assert!(
                s.bytes()
                    .all(|b| b.is_ascii_digit() || b.is_ascii_uppercase())
            );
        }
    }

    #[test]
    fn test_random_code_is_seedable() {
        let a = RoomCode::random(&mut fastrand::Rng::with_seed(42));
        let b = RoomCode::random(&mut fastrand::Rng::with_seed(42));
        assert_eq!(a, b);
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        let lower = RoomCode::from_str("ab12").unwrap();
        let upper = RoomCode::from_str("AB12").unwrap();
        assert_eq!(lower, upper);
        assert_eq!(lower.to_string(), "AB12");
    }

    #[test]
    fn test_parse_trims_whitespace() {
        assert_eq!(RoomCode::from_str("  xyz9 ").unwrap().to_string(), "XYZ9");
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(RoomCode::from_str(""), Err(Error::Length));
        assert_eq!(RoomCode::from_str("ABC"), Err(Error::Length));
        assert_eq!(RoomCode::from_str("ABCDE"), Err(Error::Length));
        assert_eq!(RoomCode::from_str("AB-1"), Err(Error::Character));
        assert_eq!(RoomCode::from_str("AB 1"), Err(Error::Character));
    }

    #[test]
    fn test_serialization() {
        let code = RoomCode::from_str("QW3R").unwrap();
        let json = serde_json::to_string(&code).unwrap();
        assert_eq!(json, "\"QW3R\"");
        let restored: RoomCode = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, code);

        let invalid: Result<RoomCode, _> = serde_json::from_str("\"Q\"");
        assert!(invalid.is_err());
    }
}
