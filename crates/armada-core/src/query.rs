use serde::{Deserialize, Serialize};

use crate::cursor::Cursor;
use crate::error::ValidationError;
use crate::filter::FilterState;
use crate::record::Record;

/// Ordering direction for a sort key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// One element of a query's ordering, highest priority first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortKey {
    pub field: String,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn ascending(field: impl Into<String>) -> Self {
        SortKey {
            field: field.into(),
            direction: SortDirection::Ascending,
        }
    }

    pub fn descending(field: impl Into<String>) -> Self {
        SortKey {
            field: field.into(),
            direction: SortDirection::Descending,
        }
    }
}

/// The filter half of a query: free-text search plus named filters.
///
/// Bulk "select all" mutations are bounded by a scope, and backends
/// recompute scope membership at submit time rather than reusing a
/// snapshot taken when the operation was queued.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scope {
    pub search: Option<String>,
    pub filters: FilterState,
}

impl Scope {
    /// Whether this scope matches the whole collection.
    pub fn is_unfiltered(&self) -> bool {
        self.search.as_deref().map_or(true, |s| s.trim().is_empty())
            && self.filters.values().all(|f| f.is_unconstrained())
    }
}

/// A read query over a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub search: Option<String>,
    pub filters: FilterState,
    /// Ordered sort keys. Empty means insertion order.
    pub sort: Vec<SortKey>,
    /// `None` starts at the beginning of the collection.
    pub cursor: Option<Cursor>,
    pub limit: usize,
}

impl Default for Query {
    fn default() -> Self {
        Query {
            search: None,
            filters: FilterState::new(),
            sort: Vec::new(),
            cursor: None,
            limit: 50,
        }
    }
}

impl Query {
    /// The scope this query's bulk mutations operate on.
    pub fn scope(&self) -> Scope {
        Scope {
            search: self.search.clone(),
            filters: self.filters.clone(),
        }
    }

    /// Check the query against the record type's field inventory.
    pub fn validate<R: Record>(&self) -> Result<(), ValidationError> {
        if self.limit == 0 {
            return Err(ValidationError::ZeroLimit);
        }
        for name in self.filters.keys() {
            if !R::field_names().contains(&name.as_str()) {
                return Err(ValidationError::UnknownFilterField(name.clone()));
            }
        }
        for key in &self.sort {
            if !R::field_names().contains(&key.field.as_str()) {
                return Err(ValidationError::UnknownSortField(key.field.clone()));
            }
        }
        Ok(())
    }

    /// Same query with the cursor replaced, for following a page chain.
    pub fn after(&self, cursor: Option<Cursor>) -> Self {
        Query {
            cursor,
            ..self.clone()
        }
    }
}
