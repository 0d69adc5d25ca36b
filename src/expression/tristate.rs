//! Three-valued entry results for evaluation paths

use serde::{Deserialize, Serialize};
use std::fmt;

/// Result of one entry of an evaluation path
///
/// `DontCare` marks an entry whose truth value does not affect the outcome
/// the path describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriState {
    True,
    False,
    DontCare,
}

impl TriState {
    #[inline]
    pub fn is_true(self) -> bool {
        matches!(self, TriState::True)
    }

    #[inline]
    pub fn is_false(self) -> bool {
        matches!(self, TriState::False)
    }

    #[inline]
    pub fn is_dont_care(self) -> bool {
        matches!(self, TriState::DontCare)
    }

    /// `Some(bool)` for a constrained entry, `None` for don't-care
    #[inline]
    pub fn as_option(self) -> Option<bool> {
        match self {
            TriState::True => Some(true),
            TriState::False => Some(false),
            TriState::DontCare => None,
        }
    }
}

impl From<bool> for TriState {
    fn from(value: bool) -> Self {
        if value {
            TriState::True
        } else {
            TriState::False
        }
    }
}

impl From<Option<bool>> for TriState {
    fn from(value: Option<bool>) -> Self {
        value.map(TriState::from).unwrap_or(TriState::DontCare)
    }
}

impl fmt::Display for TriState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriState::True => f.write_str("true"),
            TriState::False => f.write_str("false"),
            TriState::DontCare => Ok(()),
        }
    }
}
