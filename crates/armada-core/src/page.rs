use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::cursor::Cursor;
use crate::error::ValidationError;
use crate::predicate::Predicate;
use crate::query::{Query, SortDirection, SortKey};
use crate::record::Record;

/// One page of query results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<R> {
    /// Records in sort order, at most `limit` of them.
    pub items: Vec<R>,
    /// Count of all matching records, ignoring pagination.
    pub total: usize,
    /// Token for the next page, `None` once the collection is exhausted.
    pub cursor: Option<Cursor>,
}

/// Compare two records under an ordered list of sort keys.
///
/// A missing field sorts after a present one; records equal under every
/// key compare equal, and callers rely on a stable sort to preserve their
/// insertion order.
pub fn compare_records<R: Record>(a: &R, b: &R, sort: &[SortKey]) -> Ordering {
    for key in sort {
        let ord = match (a.field(&key.field), b.field(&key.field)) {
            (Some(left), Some(right)) => left.compare(&right),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        let ord = match key.direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

/// Run a query against a full ordered record set: filter, stable-sort,
/// count, slice.
///
/// The slice is `[offset, offset + limit)` where the offset comes from the
/// cursor (zero when absent). The returned cursor encodes the next offset,
/// or is `None` at the end. An empty `sort` leaves the records in
/// insertion order.
pub fn collate<R: Record>(records: &[R], query: &Query) -> Result<Page<R>, ValidationError> {
    query.validate::<R>()?;
    let predicate = Predicate::compile::<R>(&query.scope())?;

    let mut matched: Vec<&R> = records.iter().filter(|r| predicate.matches(*r)).collect();
    if !query.sort.is_empty() {
        // sort_by is stable: ties keep insertion order.
        matched.sort_by(|a, b| compare_records(*a, *b, &query.sort));
    }

    let total = matched.len();
    let offset = match &query.cursor {
        Some(cursor) => cursor.offset()?,
        None => 0,
    };
    let end = offset.saturating_add(query.limit).min(total);

    let items = matched
        .get(offset..end)
        .unwrap_or(&[])
        .iter()
        .map(|r| (*r).clone())
        .collect();
    let cursor = (end < total).then(|| Cursor::from_offset(end));

    Ok(Page {
        items,
        total,
        cursor,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{FilterValue, Threshold};
    use crate::testutil::{probe, Probe};
    use proptest::prelude::*;

    fn fleet() -> Vec<Probe> {
        vec![
            probe("Atropos", "active", 5.0),
            probe("Bellerophon", "inactive", 10.0),
            probe("Cygnus", "active", 20.0),
            probe("Daedalus", "inactive", 7.5),
            probe("Erebus", "active", 12.0),
        ]
    }

    fn names(page: &Page<Probe>) -> Vec<&str> {
        page.items.iter().map(|p| p.name.as_str()).collect()
    }

    /// Follow cursors until exhaustion, collecting every page's items.
    fn drain(records: &[Probe], query: &Query) -> Vec<Probe> {
        let mut all = Vec::new();
        let mut current = query.clone();
        loop {
            let page = collate(records, &current).unwrap();
            all.extend(page.items);
            match page.cursor {
                Some(cursor) => current = query.after(Some(cursor)),
                None => return all,
            }
        }
    }

    #[test]
    fn first_page_and_total() {
        let records = fleet();
        let query = Query {
            limit: 2,
            ..Query::default()
        };
        let page = collate(&records, &query).unwrap();
        assert_eq!(names(&page), ["Atropos", "Bellerophon"]);
        assert_eq!(page.total, 5);
        assert!(page.cursor.is_some());
    }

    #[test]
    fn cursor_chain_covers_the_collection_once() {
        let records = fleet();
        let query = Query {
            limit: 2,
            ..Query::default()
        };
        let all = drain(&records, &query);
        assert_eq!(all, records);
    }

    #[test]
    fn last_page_has_no_cursor() {
        let records = fleet();
        let query = Query {
            limit: 5,
            ..Query::default()
        };
        let page = collate(&records, &query).unwrap();
        assert_eq!(page.items.len(), 5);
        assert!(page.cursor.is_none());
    }

    #[test]
    fn exact_multiple_ends_without_empty_page() {
        let records = fleet();
        let mut query = Query {
            limit: 5,
            ..Query::default()
        };
        query
            .filters
            .insert("status".into(), FilterValue::StringSet(vec!["inactive".into()]));
        let page = collate(&records, &query).unwrap();
        assert_eq!(page.total, 2);
        assert!(page.cursor.is_none());
    }

    #[test]
    fn replay_is_idempotent() {
        let records = fleet();
        let query = Query {
            limit: 2,
            ..Query::default()
        };
        let first = collate(&records, &query).unwrap();
        let next = query.after(first.cursor.clone());

        let once = collate(&records, &next).unwrap();
        let twice = collate(&records, &next).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn total_ignores_pagination() {
        let records = fleet();
        let mut query = Query {
            limit: 1,
            ..Query::default()
        };
        query
            .filters
            .insert("max_distance".into(), FilterValue::AtMost(Threshold::Limit(10.0)));
        let page = collate(&records, &query).unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.total, 3); // Atropos, Bellerophon, Daedalus
    }

    #[test]
    fn sort_ascending_and_descending() {
        let records = fleet();
        let query = Query {
            sort: vec![SortKey::ascending("max_distance")],
            ..Query::default()
        };
        let page = collate(&records, &query).unwrap();
        assert_eq!(
            names(&page),
            ["Atropos", "Daedalus", "Bellerophon", "Erebus", "Cygnus"]
        );

        let query = Query {
            sort: vec![SortKey::descending("max_distance")],
            ..Query::default()
        };
        let page = collate(&records, &query).unwrap();
        assert_eq!(
            names(&page),
            ["Cygnus", "Erebus", "Bellerophon", "Daedalus", "Atropos"]
        );
    }

    #[test]
    fn sort_ties_keep_insertion_order() {
        let records = vec![
            probe("Third", "active", 5.0),
            probe("First", "active", 1.0),
            probe("Second", "active", 5.0),
        ];
        let query = Query {
            sort: vec![SortKey::ascending("max_distance")],
            ..Query::default()
        };
        let page = collate(&records, &query).unwrap();
        assert_eq!(names(&page), ["First", "Third", "Second"]);
    }

    #[test]
    fn empty_sort_keeps_insertion_order() {
        let records = fleet();
        let page = collate(&records, &Query::default()).unwrap();
        assert_eq!(page.items, records);
    }

    #[test]
    fn secondary_sort_key_breaks_primary_ties() {
        let records = vec![
            probe("Zeta", "active", 5.0),
            probe("Alpha", "active", 5.0),
            probe("Mid", "active", 3.0),
        ];
        let query = Query {
            sort: vec![
                SortKey::ascending("max_distance"),
                SortKey::ascending("name"),
            ],
            ..Query::default()
        };
        let page = collate(&records, &query).unwrap();
        assert_eq!(names(&page), ["Mid", "Alpha", "Zeta"]);
    }

    #[test]
    fn offset_past_end_yields_empty_page() {
        let records = fleet();
        let query = Query {
            limit: 10,
            ..Query::default()
        };
        let first = collate(&records, &query).unwrap();
        assert!(first.cursor.is_none());

        // A stale cursor can point past the end after deletions.
        let shrunk: Vec<Probe> = records.into_iter().take(1).collect();
        let stale = Query {
            limit: 2,
            ..Query::default()
        };
        let page = collate(&shrunk, &stale.after(Some(crate::cursor::Cursor::from_offset(7)))).unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total, 1);
        assert!(page.cursor.is_none());
    }

    proptest! {
        /// With every filter unconstrained and no search term, the
        /// predicate keeps every record: paging the open query drains the
        /// whole set.
        #[test]
        fn open_query_matches_every_record(
            distances in proptest::collection::vec(0.0f64..20.0, 0..40),
            limit in 1usize..10,
        ) {
            let records: Vec<Probe> = distances
                .iter()
                .enumerate()
                .map(|(i, d)| probe(&format!("Ship {i}"), "active", *d))
                .collect();
            let query = Query { limit, ..Query::default() };
            let all = drain(&records, &query);
            prop_assert_eq!(all, records);
        }

        /// Concatenated pages equal the filtered set, each record exactly
        /// once, in sort order.
        #[test]
        fn pagination_is_complete_and_duplicate_free(
            distances in proptest::collection::vec(0.0f64..20.0, 0..40),
            limit in 1usize..10,
            cutoff in 0.0f64..20.0,
        ) {
            let records: Vec<Probe> = distances
                .iter()
                .enumerate()
                .map(|(i, d)| probe(&format!("Ship {i}"), "active", *d))
                .collect();

            let mut query = Query {
                limit,
                sort: vec![SortKey::ascending("max_distance")],
                ..Query::default()
            };
            query
                .filters
                .insert("max_distance".into(), FilterValue::AtMost(Threshold::Limit(cutoff)));

            let all = drain(&records, &query);

            let mut expected: Vec<Probe> = records
                .iter()
                .filter(|p| p.max_distance <= cutoff)
                .cloned()
                .collect();
            expected.sort_by(|a, b| {
                a.max_distance
                    .partial_cmp(&b.max_distance)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            prop_assert_eq!(all, expected);
        }
    }
}
