use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Dynamic value of a filterable or sortable record field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Timestamp(DateTime<Utc>),
    Flag(bool),
}

impl FieldValue {
    /// Total ordering used by query sorting. Values of different kinds
    /// compare by kind rank so a mixed column still sorts deterministically.
    pub fn compare(&self, other: &FieldValue) -> Ordering {
        match (self, other) {
            (FieldValue::Text(a), FieldValue::Text(b)) => a.cmp(b),
            (FieldValue::Number(a), FieldValue::Number(b)) => {
                a.partial_cmp(b).unwrap_or(Ordering::Equal)
            }
            (FieldValue::Timestamp(a), FieldValue::Timestamp(b)) => a.cmp(b),
            (FieldValue::Flag(a), FieldValue::Flag(b)) => a.cmp(b),
            _ => self.kind_rank().cmp(&other.kind_rank()),
        }
    }

    fn kind_rank(&self) -> u8 {
        match self {
            FieldValue::Text(_) => 0,
            FieldValue::Number(_) => 1,
            FieldValue::Timestamp(_) => 2,
            FieldValue::Flag(_) => 3,
        }
    }
}

/// A collection record: stable identity plus dynamic field access.
///
/// Identity is immutable for the lifetime of the record; every other field
/// may change through mutations. `field` exposes the values that filters
/// and sort keys refer to by name, and `field_names` is the inventory used
/// to validate incoming queries before they run.
pub trait Record: Clone + Send + Sync + 'static {
    type Id: Clone + Eq + std::hash::Hash + std::fmt::Debug + Send + Sync + 'static;

    /// Stable unique identifier.
    fn id(&self) -> Self::Id;

    /// Human-facing name, the target of free-text search.
    fn display_name(&self) -> &str;

    /// Look up a field by name. `None` for names outside `field_names`.
    fn field(&self, name: &str) -> Option<FieldValue>;

    /// Names that `field` answers to. A query naming anything else is
    /// rejected with a validation error rather than silently matching
    /// nothing.
    fn field_names() -> &'static [&'static str];
}
