//! Explicit comparison policy for name-bearing keys.
//!
//! # Responsibility
//! - Describe how two server-side names compare (case, trailing blanks).
//! - Derive that policy from a collation name supplied by a parent entity.
//!
//! # Invariants
//! - There is no ambient/global policy; every collection receives its
//!   `StringComparer` at construction time.
//! - `compare` is a total order and `equals` agrees with `compare == Equal`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::error::Error;
use std::fmt::{Display, Formatter};

static CASE_MARKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)_(CI|CS)(?:_|$)").expect("valid case marker regex"));
static BINARY_MARKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)_BIN2?$").expect("valid binary marker regex"));

/// Errors from configuration parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    EmptyCollation,
    UnknownCollation(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyCollation => write!(f, "collation name cannot be empty"),
            Self::UnknownCollation(name) => write!(
                f,
                "collation `{name}` declares neither case sensitivity nor binary ordering"
            ),
        }
    }
}

impl Error for ConfigError {}

/// Case handling for name comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseSensitivity {
    Sensitive,
    Insensitive,
}

/// String comparison policy used by name-bearing key comparers.
///
/// Two collections with different policies can live side by side; the policy
/// is owned by each collection's context, never looked up globally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringComparer {
    case: CaseSensitivity,
    ignore_trailing_spaces: bool,
}

impl Default for StringComparer {
    /// Server default collations are case-insensitive.
    fn default() -> Self {
        Self::case_insensitive()
    }
}

impl StringComparer {
    pub const fn case_sensitive() -> Self {
        Self {
            case: CaseSensitivity::Sensitive,
            ignore_trailing_spaces: false,
        }
    }

    pub const fn case_insensitive() -> Self {
        Self {
            case: CaseSensitivity::Insensitive,
            ignore_trailing_spaces: false,
        }
    }

    /// Returns a copy that pads names with trailing blanks before comparing.
    pub const fn ignoring_trailing_spaces(self, ignore: bool) -> Self {
        Self {
            case: self.case,
            ignore_trailing_spaces: ignore,
        }
    }

    /// Derives a policy from a server collation name.
    ///
    /// - `..._CI_...` -> case-insensitive
    /// - `..._CS_...` and `..._BIN`/`..._BIN2` -> case-sensitive
    ///
    /// Collation-derived comparers always ignore trailing spaces, matching
    /// padded server-side name comparison.
    pub fn from_collation(collation: &str) -> Result<Self, ConfigError> {
        let trimmed = collation.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::EmptyCollation);
        }

        let case = if let Some(captures) = CASE_MARKER_RE.captures(trimmed) {
            if captures[1].eq_ignore_ascii_case("CI") {
                CaseSensitivity::Insensitive
            } else {
                CaseSensitivity::Sensitive
            }
        } else if BINARY_MARKER_RE.is_match(trimmed) {
            CaseSensitivity::Sensitive
        } else {
            return Err(ConfigError::UnknownCollation(trimmed.to_string()));
        };

        Ok(Self {
            case,
            ignore_trailing_spaces: true,
        })
    }

    pub fn case(&self) -> CaseSensitivity {
        self.case
    }

    pub fn ignores_trailing_spaces(&self) -> bool {
        self.ignore_trailing_spaces
    }

    /// Total order over names under this policy.
    pub fn compare(&self, left: &str, right: &str) -> Ordering {
        let (left, right) = if self.ignore_trailing_spaces {
            (left.trim_end_matches(' '), right.trim_end_matches(' '))
        } else {
            (left, right)
        };

        match self.case {
            CaseSensitivity::Sensitive => left.cmp(right),
            CaseSensitivity::Insensitive => left
                .chars()
                .flat_map(char::to_lowercase)
                .cmp(right.chars().flat_map(char::to_lowercase)),
        }
    }

    pub fn equals(&self, left: &str, right: &str) -> bool {
        self.compare(left, right) == Ordering::Equal
    }
}
