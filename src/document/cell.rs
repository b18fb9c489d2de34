//! Cell Types
//!
//! A cell is one named, independently configured block of code.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Name given to cells the user never named
pub const DEFAULT_CELL_NAME: &str = "__";

const ID_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
const ID_LEN: u32 = 4;
// 52^4; the scramble multiplier must stay coprime with it
const ID_SPACE: u64 = 7_311_616;
const ID_SCRAMBLE: u64 = 7_919;
const ID_OFFSET: u64 = 1_301;

/// Short identifier of a cell, unique within its document
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CellId(String);

impl CellId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Deterministically derive the `index`-th id of a document
    ///
    /// Distinct indices below 52^4 always map to distinct ids.
    pub fn from_index(index: u64) -> Self {
        let mut n = (index % ID_SPACE * ID_SCRAMBLE + ID_OFFSET) % ID_SPACE;
        let mut id = String::with_capacity(ID_LEN as usize);
        for _ in 0..ID_LEN {
            id.push(ID_ALPHABET[(n % 52) as usize] as char);
            n /= 52;
        }
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Per-cell configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CellConfig {
    /// Cell is excluded from execution
    pub disabled: bool,
    /// Code is hidden in app view
    pub hide_code: bool,
    /// Column index for multi-column layouts
    pub column: Option<u32>,
}

impl CellConfig {
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// A single notebook cell
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub id: CellId,
    pub code: String,
    pub name: String,
    pub config: CellConfig,
}

impl Cell {
    /// An empty, unnamed cell with default configuration
    pub fn empty(id: CellId) -> Self {
        Self {
            id,
            code: String::new(),
            name: DEFAULT_CELL_NAME.to_string(),
            config: CellConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_ids_are_distinct_and_alphabetic() {
        let ids: HashSet<CellId> = (0..2000).map(CellId::from_index).collect();
        assert_eq!(ids.len(), 2000);
        assert!(
            ids.iter()
                .all(|id| id.as_str().len() == 4 && id.as_str().chars().all(|c| c.is_ascii_alphabetic()))
        );
    }

    #[test]
    fn test_ids_are_deterministic() {
        assert_eq!(CellId::from_index(7), CellId::from_index(7));
        assert_ne!(CellId::from_index(0), CellId::from_index(1));
    }

    #[test]
    fn test_empty_cell() {
        let cell = Cell::empty(CellId::new("abcd"));
        assert!(cell.code.is_empty());
        assert_eq!(cell.name, "__");
        assert!(cell.config.is_default());
    }
}
