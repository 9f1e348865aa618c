//! Shared types and result types for the database layer

pub mod errors;

use chrono::{DateTime, Utc};

pub use errors::DatabaseError;

pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Parse an RFC 3339 column value, treating malformed timestamps as absent.
pub fn parse_timestamp(value: Option<String>) -> Option<DateTime<Utc>> {
    value
        .as_deref()
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|parsed| parsed.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_timestamp_accepts_rfc3339_and_skips_garbage() {
        let parsed = parse_timestamp(Some("2026-03-01T10:00:00+02:00".into()))
            .expect("timestamp should parse");
        assert_eq!(parsed.to_rfc3339(), "2026-03-01T08:00:00+00:00");

        assert!(parse_timestamp(Some("yesterday".into())).is_none());
        assert!(parse_timestamp(None).is_none());
    }
}
