use regex::{Regex, RegexBuilder};

use crate::error::ValidationError;
use crate::filter::{FilterState, FilterValue, Threshold};
use crate::query::Scope;
use crate::record::{FieldValue, Record};

/// A compiled filter predicate.
///
/// Compile once per query, then test any number of records. All active
/// filters AND together with the search term; a record must satisfy every
/// one.
#[derive(Debug)]
pub struct Predicate {
    search: Option<Regex>,
    /// Only constrained filters survive compilation.
    filters: FilterState,
}

impl Predicate {
    /// Compile a scope against the record type's field inventory.
    ///
    /// The search term is matched case-insensitively at a word boundary:
    /// the start of the display name or right after whitespace. The term
    /// is escaped, so arbitrary user input cannot break compilation. A
    /// missing or blank term imposes nothing.
    pub fn compile<R: Record>(scope: &Scope) -> Result<Self, ValidationError> {
        for name in scope.filters.keys() {
            if !R::field_names().contains(&name.as_str()) {
                return Err(ValidationError::UnknownFilterField(name.clone()));
            }
        }

        let search = match scope.search.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(term) => {
                let pattern = format!(r"(^|\s){}", regex::escape(term));
                let rgx = RegexBuilder::new(&pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| ValidationError::Search(e.to_string()))?;
                Some(rgx)
            }
        };

        let filters = scope
            .filters
            .iter()
            .filter(|(_, value)| !value.is_unconstrained())
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();

        Ok(Predicate { search, filters })
    }

    /// Whether the record satisfies the search term and every active
    /// filter.
    pub fn matches<R: Record>(&self, record: &R) -> bool {
        if let Some(rgx) = &self.search {
            if !rgx.is_match(record.display_name()) {
                return false;
            }
        }

        self.filters
            .iter()
            .all(|(name, filter)| field_passes(record.field(name), filter))
    }
}

/// A constrained filter against a field the record does not carry never
/// matches; absence is not a wildcard.
fn field_passes(value: Option<FieldValue>, filter: &FilterValue) -> bool {
    match filter {
        FilterValue::StringSet(allowed) => {
            matches!(value, Some(FieldValue::Text(text)) if allowed.iter().any(|s| *s == text))
        }
        FilterValue::DateRange { from, to } => match value {
            Some(FieldValue::Timestamp(at)) => {
                from.map_or(true, |lo| at >= lo) && to.map_or(true, |hi| at <= hi)
            }
            _ => false,
        },
        FilterValue::AtMost(Threshold::Limit(limit)) => {
            matches!(value, Some(FieldValue::Number(n)) if n <= *limit)
        }
        FilterValue::AtMost(Threshold::Any) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{probe, Probe};
    use chrono::{TimeZone, Utc};

    fn scope_with(name: &str, value: FilterValue) -> Scope {
        let mut scope = Scope::default();
        scope.filters.insert(name.into(), value);
        scope
    }

    fn search_scope(term: &str) -> Scope {
        Scope {
            search: Some(term.into()),
            ..Scope::default()
        }
    }

    #[test]
    fn empty_scope_matches_everything() {
        let predicate = Predicate::compile::<Probe>(&Scope::default()).unwrap();
        assert!(predicate.matches(&probe("USS Enterprise", "active", 5.0)));
        assert!(predicate.matches(&probe("Nostromo", "inactive", 20.0)));
    }

    #[test]
    fn search_matches_at_word_boundaries() {
        let predicate = Predicate::compile::<Probe>(&search_scope("enter")).unwrap();
        assert!(predicate.matches(&probe("Enterprise", "active", 5.0)));
        assert!(predicate.matches(&probe("USS Enterprise", "active", 5.0)));
        assert!(!predicate.matches(&probe("Carpenter", "active", 5.0)));
    }

    #[test]
    fn search_is_case_insensitive() {
        let predicate = Predicate::compile::<Probe>(&search_scope("ENTERPRISE")).unwrap();
        assert!(predicate.matches(&probe("uss enterprise", "active", 5.0)));
    }

    #[test]
    fn blank_search_matches_everything() {
        for term in ["", "   "] {
            let predicate = Predicate::compile::<Probe>(&search_scope(term)).unwrap();
            assert!(predicate.matches(&probe("Rocinante", "active", 5.0)));
        }
    }

    #[test]
    fn search_metacharacters_are_literal() {
        let predicate = Predicate::compile::<Probe>(&search_scope("X(1)")).unwrap();
        assert!(predicate.matches(&probe("X(1) Prototype", "active", 5.0)));
        assert!(!predicate.matches(&probe("X1", "active", 5.0)));
    }

    #[test]
    fn string_set_constrains_membership() {
        let scope = scope_with("status", FilterValue::StringSet(vec!["active".into()]));
        let predicate = Predicate::compile::<Probe>(&scope).unwrap();
        assert!(predicate.matches(&probe("A", "active", 5.0)));
        assert!(!predicate.matches(&probe("B", "inactive", 5.0)));
    }

    #[test]
    fn at_most_threshold_is_inclusive() {
        // A(5), B(10), C(20) with limit 10 keeps exactly {A, B}.
        let scope = scope_with("max_distance", FilterValue::AtMost(Threshold::Limit(10.0)));
        let predicate = Predicate::compile::<Probe>(&scope).unwrap();
        assert!(predicate.matches(&probe("A", "active", 5.0)));
        assert!(predicate.matches(&probe("B", "active", 10.0)));
        assert!(!predicate.matches(&probe("C", "active", 20.0)));
    }

    #[test]
    fn any_threshold_passes_through() {
        let scope = scope_with("max_distance", FilterValue::AtMost(Threshold::Any));
        let predicate = Predicate::compile::<Probe>(&scope).unwrap();
        assert!(predicate.matches(&probe("C", "active", 20.0)));
    }

    #[test]
    fn date_range_bounds_are_inclusive_and_independent() {
        let day = |d: u32| Utc.with_ymd_and_hms(2010, 6, d, 0, 0, 0).unwrap();
        let mut ship = probe("A", "active", 5.0);
        ship.launch_date = day(15);

        let both = scope_with(
            "launch_date",
            FilterValue::DateRange {
                from: Some(day(15)),
                to: Some(day(15)),
            },
        );
        assert!(Predicate::compile::<Probe>(&both).unwrap().matches(&ship));

        let from_only = scope_with(
            "launch_date",
            FilterValue::DateRange {
                from: Some(day(16)),
                to: None,
            },
        );
        assert!(!Predicate::compile::<Probe>(&from_only).unwrap().matches(&ship));

        let to_only = scope_with(
            "launch_date",
            FilterValue::DateRange {
                from: None,
                to: Some(day(14)),
            },
        );
        assert!(!Predicate::compile::<Probe>(&to_only).unwrap().matches(&ship));
    }

    #[test]
    fn filters_and_search_combine_with_and() {
        let mut scope = search_scope("enter");
        scope
            .filters
            .insert("status".into(), FilterValue::StringSet(vec!["active".into()]));
        let predicate = Predicate::compile::<Probe>(&scope).unwrap();
        assert!(predicate.matches(&probe("Enterprise", "active", 5.0)));
        assert!(!predicate.matches(&probe("Enterprise", "inactive", 5.0)));
        assert!(!predicate.matches(&probe("Voyager", "active", 5.0)));
    }

    #[test]
    fn unknown_field_fails_compilation() {
        let scope = scope_with("warp_factor", FilterValue::AtMost(Threshold::Limit(9.0)));
        assert_eq!(
            Predicate::compile::<Probe>(&scope).unwrap_err(),
            ValidationError::UnknownFilterField("warp_factor".into())
        );
    }
}
