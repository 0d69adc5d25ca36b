//! Boolean operators joining the entries of an expression

use serde::{Deserialize, Serialize};
use std::fmt;

/// Operator between two adjacent entries of an [`crate::expression::Expression`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    /// `&&` or `AND`
    And,
    /// `||` or `OR`
    Or,
    /// `^` or `XOR`
    Xor,
}

impl Operator {
    /// Canonical display text
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::And => "AND",
            Operator::Or => "OR",
            Operator::Xor => "XOR",
        }
    }

    pub fn is_and(self) -> bool {
        self == Operator::And
    }

    pub fn is_or(self) -> bool {
        self == Operator::Or
    }

    pub fn is_xor(self) -> bool {
        self == Operator::Xor
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
