use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Upper bound for "at most N" filters.
///
/// `Any` is the no-constraint sentinel a single-choice UI control emits for
/// its "all" option.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Threshold {
    Any,
    Limit(f64),
}

/// One named filter constraint.
///
/// Every kind has an explicit "imposes nothing" state so a fully-default
/// filter panel produces a filter state that matches the whole collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FilterValue {
    /// Matches records whose field is one of the given strings.
    /// An empty set imposes no constraint.
    StringSet(Vec<String>),
    /// Matches records whose timestamp field falls inside the inclusive
    /// range. Either bound may be absent and applies independently.
    DateRange {
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    },
    /// Matches records whose numeric field is at most the limit.
    AtMost(Threshold),
}

impl FilterValue {
    /// Whether this filter passes every record.
    pub fn is_unconstrained(&self) -> bool {
        match self {
            FilterValue::StringSet(values) => values.is_empty(),
            FilterValue::DateRange { from, to } => from.is_none() && to.is_none(),
            FilterValue::AtMost(threshold) => matches!(threshold, Threshold::Any),
        }
    }
}

/// Active filters, keyed by the record field they constrain.
///
/// Plain serializable data so the query boundary can move to a real
/// HTTP/RPC backend without touching the core contracts.
pub type FilterState = BTreeMap<String, FilterValue>;
