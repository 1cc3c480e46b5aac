//! Decoding configuration literals into typed values
//!
//! Literals are tried as JSON first, then as a JSON string, so `8080`, `true`,
//! `[1,2]` and bare words all decode naturally. Durations and timestamps go
//! through dedicated hooks before the generic path.

use std::any::{Any, TypeId, type_name};
use std::time::Duration;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};

/// Decode `literal` into `V` for the field named `field`
pub fn decode<V: DeserializeOwned + 'static>(field: &str, literal: &str) -> Result<V> {
    if let Some(value) = decode_with_hook::<V>(field, literal)? {
        return Ok(value);
    }
    let trimmed = literal.trim();
    match serde_json::from_str::<V>(trimmed) {
        Ok(value) => Ok(value),
        Err(json_err) => serde_json::from_value::<V>(serde_json::Value::String(literal.to_string()))
            .map_err(|_| {
                Error::decode(
                    field,
                    format!("cannot decode `{literal}` as {}: {json_err}", type_name::<V>()),
                )
            }),
    }
}

fn decode_with_hook<V: 'static>(field: &str, literal: &str) -> Result<Option<V>> {
    let literal = literal.trim();
    let target = TypeId::of::<V>();
    let decoded: Box<dyn Any> = if target == TypeId::of::<Duration>() {
        Box::new(
            humantime::parse_duration(literal)
                .map_err(|e| Error::decode(field, format!("invalid duration `{literal}`: {e}")))?,
        )
    } else if target == TypeId::of::<DateTime<Utc>>() {
        Box::new(parse_rfc3339(field, literal)?.with_timezone(&Utc))
    } else if target == TypeId::of::<DateTime<FixedOffset>>() {
        Box::new(parse_rfc3339(field, literal)?)
    } else if target == TypeId::of::<NaiveDate>() {
        Box::new(
            NaiveDate::parse_from_str(literal, "%Y-%m-%d")
                .map_err(|e| Error::decode(field, format!("invalid date `{literal}`: {e}")))?,
        )
    } else {
        return Ok(None);
    };
    Ok(decoded.downcast::<V>().ok().map(|value| *value))
}

fn parse_rfc3339(field: &str, literal: &str) -> Result<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(literal)
        .map_err(|e| Error::decode(field, format!("invalid RFC 3339 timestamp `{literal}`: {e}")))
}
