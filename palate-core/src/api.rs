//! Wire shapes shared with the rest of the backend.
//!
//! Every response is wrapped in `{ data, statusCode, timestamp }`; paged
//! collections use `{ items, nextCursor, hasMore }`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Generic response envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEnvelope<T> {
    /// Response payload.
    pub data: T,
    /// HTTP-style status code.
    pub status_code: u16,
    /// When the response was produced.
    pub timestamp: DateTime<Utc>,
}

impl<T> ApiEnvelope<T> {
    /// Wrap a successful payload stamped with the current time.
    pub fn ok(data: T) -> Self {
        Self::at(data, Utc::now())
    }

    /// Wrap a successful payload with an explicit timestamp.
    pub const fn at(data: T, timestamp: DateTime<Utc>) -> Self {
        Self {
            data,
            status_code: 200,
            timestamp,
        }
    }
}

/// One page of a cursor-paginated collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// Cursor to pass for the next page.
    pub next_cursor: Option<String>,
    /// Whether more items follow.
    pub has_more: bool,
}

impl<T> Page<T> {
    /// A page with no items and nothing after it.
    pub const fn empty() -> Self {
        Self {
            items: Vec::new(),
            next_cursor: None,
            has_more: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn envelope_uses_camel_case() {
        let stamp = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        let envelope = ApiEnvelope::at(Page::<u8>::empty(), stamp);
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["statusCode"], 200);
        assert_eq!(json["data"]["hasMore"], false);
        assert!(json["data"]["nextCursor"].is_null());
        assert_eq!(json["timestamp"], "2025-01-02T03:04:05Z");
    }
}
