//! Export cells and missing codes

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a cell has no real value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Missing {
    /// The question was offered but no usable answer exists
    Unobtainable,
    /// A gating condition was not met, so the question was never asked
    NotApplicable,
    /// A multi-select value was not ticked, or no answer exists
    NoOrUnobtainable,
    /// The instance has not been released yet
    NotReleased,
}

impl Missing {
    /// Code written into the export cell
    pub fn code(&self) -> &'static str {
        match self {
            Missing::Unobtainable => ".U",
            Missing::NotApplicable => ".A",
            Missing::NoOrUnobtainable => ".N",
            Missing::NotReleased => ".R",
        }
    }
}

impl fmt::Display for Missing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One export cell: either a real value or a missing code
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cell {
    Value(String),
    Missing(Missing),
}

impl Cell {
    pub fn value(value: impl Into<String>) -> Self {
        Cell::Value(value.into())
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing(_))
    }

    pub fn as_missing(&self) -> Option<Missing> {
        match self {
            Cell::Missing(missing) => Some(*missing),
            Cell::Value(_) => None,
        }
    }

    /// Text written into the CSV field
    pub fn as_field(&self) -> &str {
        match self {
            Cell::Value(value) => value,
            Cell::Missing(missing) => missing.code(),
        }
    }
}

impl From<Missing> for Cell {
    fn from(missing: Missing) -> Self {
        Cell::Missing(missing)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_field())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_missing_codes_are_distinct() {
        let codes: HashSet<_> = [
            Missing::Unobtainable,
            Missing::NotApplicable,
            Missing::NoOrUnobtainable,
            Missing::NotReleased,
        ]
        .iter()
        .map(Missing::code)
        .collect();
        assert_eq!(codes.len(), 4);
    }

    #[test]
    fn test_cell_field_text() {
        assert_eq!(Cell::value("1").as_field(), "1");
        assert_eq!(Cell::from(Missing::NotReleased).as_field(), ".R");
        assert!(Cell::from(Missing::NotApplicable).is_missing());
    }
}
