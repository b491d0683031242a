use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Version tag inside the encoded payload, so a future keyset format can
/// reject stale tokens instead of misreading them.
const CURSOR_VERSION: &str = "v1";

/// Opaque pagination token.
///
/// Returned by a page fetch and consumed by the next one. Encodes an offset
/// into the filtered and sorted sequence; clients must treat the value as
/// opaque. Replaying a cursor against an unchanged collection yields the
/// next contiguous slice. Mutations between pages may shift results — the
/// token carries no consistency guarantee beyond that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    pub(crate) fn from_offset(offset: usize) -> Self {
        Cursor(URL_SAFE_NO_PAD.encode(format!("{CURSOR_VERSION}:{offset}")))
    }

    /// Decode the offset. Garbage tokens are a validation error, not a
    /// panic.
    pub(crate) fn offset(&self) -> Result<usize, ValidationError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(&self.0)
            .map_err(|_| ValidationError::MalformedCursor)?;
        let text = String::from_utf8(bytes).map_err(|_| ValidationError::MalformedCursor)?;
        let offset = text
            .strip_prefix(CURSOR_VERSION)
            .and_then(|rest| rest.strip_prefix(':'))
            .ok_or(ValidationError::MalformedCursor)?;
        offset.parse().map_err(|_| ValidationError::MalformedCursor)
    }
}
