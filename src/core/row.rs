//! Cell values and row access
//!
//! The table engine never sees concrete row structs. Rows expose their
//! cells through [`TableRow`], and every cell is a dynamically typed
//! [`CellValue`] with a total order so that filtering and sorting work
//! over any dataset shape.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// A single table cell.
///
/// Serializes untagged, so `CellValue::Int(3)` is just `3` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl CellValue {
    /// Cross-type rank: Null < Bool < numbers < Text.
    fn rank(&self) -> u8 {
        match self {
            CellValue::Null => 0,
            CellValue::Bool(_) => 1,
            CellValue::Int(_) | CellValue::Float(_) => 2,
            CellValue::Text(_) => 3,
        }
    }

    fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Int(n) => Some(*n as f64),
            CellValue::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Total order over cells.
    ///
    /// Numbers compare numerically (never lexicographically); text compares
    /// case-insensitively first, with a case-sensitive tiebreak so equal-
    /// ignoring-case values still order deterministically. Mixed types fall
    /// back to the rank above.
    pub fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (CellValue::Int(a), CellValue::Int(b)) => a.cmp(b),
            (CellValue::Bool(a), CellValue::Bool(b)) => a.cmp(b),
            (CellValue::Text(a), CellValue::Text(b)) => compare_text(a, b),
            _ => match (self.as_number(), other.as_number()) {
                (Some(a), Some(b)) => a.total_cmp(&b),
                _ => self.rank().cmp(&other.rank()),
            },
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Plain-text rendition, used by the substring filter and as the
    /// fallback when a column has no render function. `Null` is empty.
    pub fn display(&self) -> String {
        match self {
            CellValue::Null => String::new(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Int(n) => n.to_string(),
            CellValue::Float(n) => n.to_string(),
            CellValue::Text(s) => s.clone(),
        }
    }
}

fn compare_text(a: &str, b: &str) -> Ordering {
    let a_key = a.to_lowercase();
    let b_key = b.to_lowercase();
    a_key.cmp(&b_key).then_with(|| a.cmp(b))
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Int(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Float(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(CellValue::Null)
    }
}

impl From<&serde_json::Value> for CellValue {
    fn from(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => CellValue::Null,
            serde_json::Value::Bool(b) => CellValue::Bool(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => CellValue::Int(i),
                None => CellValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => CellValue::Text(s.clone()),
            // Arrays and objects render as their JSON text.
            other => CellValue::Text(other.to_string()),
        }
    }
}

/// Read access to a row's cells, keyed by column key.
///
/// Unknown keys yield [`CellValue::Null`] rather than failing, so a stale
/// column definition degrades to empty cells.
pub trait TableRow {
    fn cell(&self, key: &str) -> CellValue;
}

/// JSON objects are rows out of the box; any other JSON shape has no cells.
impl TableRow for serde_json::Value {
    fn cell(&self, key: &str) -> CellValue {
        match self.get(key) {
            Some(value) => CellValue::from(value),
            None => CellValue::Null,
        }
    }
}
