use serde::{Deserialize, Serialize};

/// Malformed filter, sort, cursor, or limit input.
///
/// Reported to the caller as a value; never silently ignored and never a
/// panic.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum ValidationError {
    #[error("limit must be positive")]
    ZeroLimit,

    #[error("filter references unknown field '{0}'")]
    UnknownFilterField(String),

    #[error("sort references unknown field '{0}'")]
    UnknownSortField(String),

    #[error("malformed pagination cursor")]
    MalformedCursor,

    #[error("invalid search term: {0}")]
    Search(String),
}

/// Read-path failure. The caller aborts the fetch and keeps whatever page
/// state it already had.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("fetch failed: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Mutation-path failure.
///
/// `Submit` is the transport-level rejection that drives rollback in the
/// optimistic layer. Per-item outcomes of an accepted batch travel in
/// [`crate::store::BatchReport`] instead, so partial failures are never
/// collapsed into one error.
#[derive(Debug, thiserror::Error)]
pub enum MutationError {
    #[error("mutation submit failed: {0}")]
    Submit(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_display() {
        let err = ValidationError::UnknownFilterField("warp_factor".into());
        assert!(err.to_string().contains("warp_factor"));

        assert_eq!(ValidationError::ZeroLimit.to_string(), "limit must be positive");
    }

    #[test]
    fn validation_error_converts_into_fetch_error() {
        let err: FetchError = ValidationError::MalformedCursor.into();
        assert!(matches!(
            err,
            FetchError::Validation(ValidationError::MalformedCursor)
        ));
    }

    #[test]
    fn validation_error_converts_into_mutation_error() {
        let err: MutationError = ValidationError::ZeroLimit.into();
        assert!(matches!(
            err,
            MutationError::Validation(ValidationError::ZeroLimit)
        ));
    }
}
