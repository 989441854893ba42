//! Nickname validation and suggestions
//!
//! Nicknames are checked when a room is created or joined: they must be
//! non-empty after trimming, short enough to fit on the leaderboard, free of
//! profanity, and unique within the room. Players who leave the nickname
//! blank get a suggested one.

use heck::ToTitleCase;
use rustrict::CensorStr;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::names::{MAX_LENGTH, SUGGESTION_ATTEMPTS};

/// Defines the style of suggested nicknames
#[derive(Debug, Clone, Copy, Deserialize, Serialize, garde::Validate)]
pub enum NameStyle {
    /// Roman-style names (praenomen + nomen, optionally + cognomen)
    Roman(#[garde(range(min = 2, max = 3))] usize),
    /// Pet-style names (adjective + animal combinations)
    Petname(#[garde(range(min = 2, max = 3))] usize),
}

impl Default for NameStyle {
    fn default() -> Self {
        Self::Petname(2)
    }
}

impl NameStyle {
    /// Generates a random nickname in this style
    pub fn suggest(&self) -> String {
        match self {
            Self::Roman(count) => romanname::romanname(romanname::NameConfig {
                praenomen: *count > 2,
            }),
            Self::Petname(count) => petname::petname(*count as u8, " ").unwrap_or_default(),
        }
        .to_title_case()
    }
}

/// Errors that can occur during nickname validation
#[derive(Error, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The requested name is already in use by another player
    #[error("name already in-use")]
    Used,
    /// The name is empty or contains only whitespace
    #[error("name cannot be empty")]
    Empty,
    /// The name contains inappropriate content
    #[error("name is inappropriate")]
    Sinful,
    /// The name exceeds the maximum allowed length
    #[error("name is too long")]
    TooLong,
}

/// Picks a suggested nickname in `style` that is valid and not yet taken
pub fn suggest_unused<'a, I>(style: NameStyle, existing: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let taken = existing.into_iter().collect::<Vec<_>>();
    let mut last = String::new();
    for _ in 0..SUGGESTION_ATTEMPTS {
        let name = style.suggest();
        if let Ok(name) = validate(&name, taken.iter().copied()) {
            return name;
        }
        last = name;
    }
    // numbered fallback, guaranteed to be unique
    (2..)
        .map(|n| format!("{last} {n}"))
        .find(|name| validate(name, taken.iter().copied()).is_ok())
        .unwrap_or_default()
}

/// Validates a requested nickname, suggesting one if it is blank
///
/// # Errors
///
/// Same as [`validate`] except for `Error::Empty`.
pub fn validate_or_suggest<'a, I>(name: &str, style: NameStyle, existing: I) -> Result<String, Error>
where
    I: IntoIterator<Item = &'a str>,
{
    if rustrict::trim_whitespace(name).is_empty() && name.len() <= MAX_LENGTH {
        Ok(suggest_unused(style, existing))
    } else {
        validate(name, existing)
    }
}

/// Validates a requested nickname against the names already in the room
///
/// Returns the trimmed nickname on success.
///
/// # Errors
///
/// * `Error::TooLong` - Name exceeds the maximum length
/// * `Error::Empty` - Name is empty after trimming whitespace
/// * `Error::Sinful` - Name contains inappropriate content
/// * `Error::Used` - Name is already taken in the room
pub fn validate<'a, I>(name: &str, existing: I) -> Result<String, Error>
where
    I: IntoIterator<Item = &'a str>,
{
    if name.len() > MAX_LENGTH {
        return Err(Error::TooLong);
    }
    let name = rustrict::trim_whitespace(name);
    if name.is_empty() {
        return Err(Error::Empty);
    }
    if name.is_inappropriate() {
        return Err(Error::Sinful);
    }
    if existing.into_iter().any(|taken| taken == name) {
        return Err(Error::Used);
    }
    Ok(name.to_owned())
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_plain_name() {
        assert_eq!(validate("Captain", []), Ok("Captain".to_string()));
    }

    #[test]
    fn test_validate_too_long() {
        let long_name = "a".repeat(MAX_LENGTH + 1);
        assert_eq!(validate(&long_name, []), Err(Error::TooLong));

        let max_name = "a".repeat(MAX_LENGTH);
        assert_eq!(validate(&max_name, []), Ok(max_name.clone()));
    }

    #[test]
    fn test_validate_empty_name() {
        assert_eq!(validate("", []), Err(Error::Empty));
        assert_eq!(validate("   ", []), Err(Error::Empty));
        assert_eq!(validate("\t\n", []), Err(Error::Empty));
    }

    #[test]
    fn test_validate_trims_whitespace() {
        assert_eq!(validate("  Player  ", []), Ok("Player".to_string()));
    }

    #[test]
    fn test_validate_duplicate() {
        let taken = ["Player", "Other"];
        assert_eq!(validate("Player", taken), Err(Error::Used));
        assert_eq!(validate("  Player ", taken), Err(Error::Used));
        // different case is a different name
        assert_eq!(validate("player", taken), Ok("player".to_string()));
    }

    #[test]
    fn test_validate_inappropriate_content() {
        for name in ["damn", "fuck", "shit"] {
            assert_eq!(
                validate(name, []),
                Err(Error::Sinful),
                "Expected '{name}' to be flagged as inappropriate"
            );
        }
    }

    #[test]
    fn test_error_display() {
        assert_eq!(Error::Used.to_string(), "name already in-use");
        assert_eq!(Error::Empty.to_string(), "name cannot be empty");
        assert_eq!(Error::Sinful.to_string(), "name is inappropriate");
        assert_eq!(Error::TooLong.to_string(), "name is too long");
    }

    #[test]
    fn test_suggestions() {
        let pet = NameStyle::Petname(3).suggest();
        assert_eq!(pet.matches(' ').count(), 2);

        let roman = NameStyle::Roman(2).suggest();
        assert!(!roman.is_empty());
        assert!(roman.chars().next().unwrap().is_uppercase());
    }

    #[test]
    fn test_suggest_unused_avoids_taken_names() {
        let first = suggest_unused(NameStyle::default(), []);
        let second = suggest_unused(NameStyle::default(), [first.as_str()]);
        assert_ne!(first, second);
        assert!(validate(&second, [first.as_str()]).is_ok());
    }

    #[test]
    fn test_blank_name_gets_suggestion() {
        let name = validate_or_suggest("  ", NameStyle::Petname(2), ["Taken"]).unwrap();
        assert_eq!(name.matches(' ').count(), 1);
        assert_eq!(
            validate_or_suggest(" Taken ", NameStyle::default(), ["Taken"]),
            Err(Error::Used)
        );
    }

    #[test]
    fn test_suggestions_pass_validation() {
        let name = NameStyle::default().suggest();
        assert!(validate(&name, []).is_ok());
    }
}
