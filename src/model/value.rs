//! Universal metadata value type.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A value stored in a document's structured metadata block.
///
/// Covers everything frontmatter can hold:
/// - Scalars: Bool, Int, Float, String, Date
/// - Containers: List
///
/// Link references are plain `String` values in bracket syntax; they are
/// interpreted lazily by the link resolver, never eagerly here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Date(NaiveDate),
    String(String),
    List(Vec<MetaValue>),
}

// ============================================================================
// Type checking
// ============================================================================

impl MetaValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            MetaValue::Null => "NULL",
            MetaValue::Bool(_) => "BOOLEAN",
            MetaValue::Int(_) => "INTEGER",
            MetaValue::Float(_) => "FLOAT",
            MetaValue::Date(_) => "DATE",
            MetaValue::String(_) => "STRING",
            MetaValue::List(_) => "LIST",
        }
    }

    pub fn is_null(&self) -> bool { matches!(self, MetaValue::Null) }
    pub fn is_list(&self) -> bool { matches!(self, MetaValue::List(_)) }

    /// Attempt to extract as &str.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetaValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Attempt to extract as i64.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            MetaValue::Int(i) => Some(*i),
            MetaValue::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            _ => None,
        }
    }

    /// Attempt to extract as a date. String values are parsed as ISO dates,
    /// which is how most frontmatter stores them.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            MetaValue::Date(d) => Some(*d),
            MetaValue::String(s) => s.get(..10).unwrap_or(s).parse().ok(),
            _ => None,
        }
    }

    /// Normalize scalar-or-list into a slice of values.
    ///
    /// A list yields its elements; any scalar yields itself as a
    /// one-element slice. This is the single-value/list-value unification
    /// every relationship property goes through.
    pub fn as_slice(&self) -> &[MetaValue] {
        match self {
            MetaValue::List(items) => items,
            other => std::slice::from_ref(other),
        }
    }
}

// ============================================================================
// Conversions (From impls)
// ============================================================================

impl From<bool> for MetaValue { fn from(v: bool) -> Self { MetaValue::Bool(v) } }
impl From<i32> for MetaValue { fn from(v: i32) -> Self { MetaValue::Int(v as i64) } }
impl From<i64> for MetaValue { fn from(v: i64) -> Self { MetaValue::Int(v) } }
impl From<f64> for MetaValue { fn from(v: f64) -> Self { MetaValue::Float(v) } }
impl From<String> for MetaValue { fn from(v: String) -> Self { MetaValue::String(v) } }
impl From<&str> for MetaValue { fn from(v: &str) -> Self { MetaValue::String(v.to_owned()) } }
impl From<NaiveDate> for MetaValue { fn from(v: NaiveDate) -> Self { MetaValue::Date(v) } }
impl<T: Into<MetaValue>> From<Vec<T>> for MetaValue {
    fn from(v: Vec<T>) -> Self { MetaValue::List(v.into_iter().map(Into::into).collect()) }
}
impl<T: Into<MetaValue>> From<Option<T>> for MetaValue {
    fn from(v: Option<T>) -> Self { v.map(Into::into).unwrap_or(MetaValue::Null) }
}

// ============================================================================
// Display
// ============================================================================

impl fmt::Display for MetaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetaValue::Null => write!(f, "null"),
            MetaValue::Bool(b) => write!(f, "{b}"),
            MetaValue::Int(i) => write!(f, "{i}"),
            MetaValue::Float(v) => write!(f, "{v}"),
            MetaValue::Date(d) => write!(f, "{d}"),
            MetaValue::String(s) => write!(f, "\"{}\"", s.replace('"', "\\\"")),
            MetaValue::List(l) => {
                write!(f, "[")?;
                for (i, v) in l.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{v}")?;
                }
                write!(f, "]")
            }
        }
    }
}

// ============================================================================
// Comparison (sort ordering rules)
// ============================================================================

impl MetaValue {
    /// Comparison for fallback sorts. Returns None for incompatible types
    /// and for nulls, which callers sort last.
    pub fn sort_cmp(&self, other: &MetaValue) -> Option<std::cmp::Ordering> {
        match (self, other) {
            (MetaValue::Null, _) | (_, MetaValue::Null) => None,
            (MetaValue::Bool(a), MetaValue::Bool(b)) => a.partial_cmp(b),
            (MetaValue::Int(a), MetaValue::Int(b)) => a.partial_cmp(b),
            (MetaValue::Float(a), MetaValue::Float(b)) => a.partial_cmp(b),
            (MetaValue::Int(a), MetaValue::Float(b)) => (*a as f64).partial_cmp(b),
            (MetaValue::Float(a), MetaValue::Int(b)) => a.partial_cmp(&(*b as f64)),
            (MetaValue::Date(a), MetaValue::Date(b)) => a.partial_cmp(b),
            (MetaValue::String(a), MetaValue::String(b)) => {
                // Dates stored as strings compare correctly lexically (ISO),
                // so plain string comparison covers both.
                Some(a.to_lowercase().cmp(&b.to_lowercase()))
            }
            (a, b) => match (a.as_date(), b.as_date()) {
                (Some(da), Some(db)) => da.partial_cmp(&db),
                _ => None,
            },
        }
    }
}
