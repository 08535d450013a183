// Telemetry decoder - Validates raw feed frames into typed records
use crate::domain::telemetry::TelemetryRecord;
use serde_json::Value;
use thiserror::Error;

pub const VALUE_FIELD: &str = "battery_temperature";
pub const TIMESTAMP_FIELD: &str = "timestamp";

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("frame is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("frame is not a JSON object")]
    NotAnObject,
    #[error("frame is missing field `{0}`")]
    MissingField(&'static str),
    #[error("field `{0}` is not a number")]
    NotNumeric(&'static str),
    #[error("timestamp {0} is outside the representable range")]
    TimestampOutOfRange(f64),
}

/// Parse and validate one raw frame
pub fn decode_frame(frame: &[u8]) -> Result<TelemetryRecord, DecodeError> {
    let payload: Value = serde_json::from_slice(frame)?;
    decode(&payload)
}

/// Validate an already-parsed payload.
///
/// Both fields must be JSON numbers; strings holding numbers are rejected.
/// Unknown fields are ignored.
pub fn decode(payload: &Value) -> Result<TelemetryRecord, DecodeError> {
    let object = payload.as_object().ok_or(DecodeError::NotAnObject)?;

    let value = numeric_field(object, VALUE_FIELD)?
        .as_f64()
        .ok_or(DecodeError::NotNumeric(VALUE_FIELD))?;

    let timestamp = numeric_field(object, TIMESTAMP_FIELD)?;
    let timestamp = match timestamp.as_i64() {
        Some(ms) => ms,
        None => whole_millis(timestamp)?,
    };

    Ok(TelemetryRecord::new(value, timestamp))
}

fn numeric_field<'a>(
    object: &'a serde_json::Map<String, Value>,
    field: &'static str,
) -> Result<&'a serde_json::Number, DecodeError> {
    match object.get(field) {
        None | Some(Value::Null) => Err(DecodeError::MissingField(field)),
        Some(Value::Number(n)) => Ok(n),
        Some(_) => Err(DecodeError::NotNumeric(field)),
    }
}

// Fractional or very large timestamps: truncate to whole milliseconds.
fn whole_millis(n: &serde_json::Number) -> Result<i64, DecodeError> {
    let raw = n.as_f64().ok_or(DecodeError::NotNumeric(TIMESTAMP_FIELD))?;
    let truncated = raw.trunc();
    if truncated < i64::MIN as f64 || truncated >= i64::MAX as f64 {
        return Err(DecodeError::TimestampOutOfRange(raw));
    }
    Ok(truncated as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_valid_frame() {
        let record = decode_frame(br#"{"battery_temperature": 22.5, "timestamp": 1000}"#).unwrap();
        assert_eq!(record, TelemetryRecord::new(22.5, 1000));
    }

    #[test]
    fn test_integer_value_and_extra_fields() {
        let record = decode(&json!({
            "battery_temperature": 40,
            "timestamp": 1_700_000_000_123_i64,
            "source": "car-1"
        }))
        .unwrap();
        assert_eq!(record, TelemetryRecord::new(40.0, 1_700_000_000_123));
    }

    #[test]
    fn test_fractional_timestamp_is_truncated() {
        let record = decode(&json!({ "battery_temperature": 1.0, "timestamp": 1500.9 })).unwrap();
        assert_eq!(record.timestamp, 1500);
    }

    #[test]
    fn test_missing_fields() {
        assert!(matches!(
            decode(&json!({ "timestamp": 1 })),
            Err(DecodeError::MissingField(VALUE_FIELD))
        ));
        assert!(matches!(
            decode(&json!({ "battery_temperature": 1.0 })),
            Err(DecodeError::MissingField(TIMESTAMP_FIELD))
        ));
        assert!(matches!(
            decode(&json!({ "battery_temperature": null, "timestamp": 1 })),
            Err(DecodeError::MissingField(VALUE_FIELD))
        ));
    }

    #[test]
    fn test_wrong_types() {
        assert!(matches!(
            decode(&json!({ "battery_temperature": "22.5", "timestamp": 1 })),
            Err(DecodeError::NotNumeric(VALUE_FIELD))
        ));
        assert!(matches!(
            decode(&json!({ "battery_temperature": 1.0, "timestamp": [1] })),
            Err(DecodeError::NotNumeric(TIMESTAMP_FIELD))
        ));
        assert!(matches!(decode(&json!([22.5, 1000])), Err(DecodeError::NotAnObject)));
        assert!(matches!(decode(&json!(22.5)), Err(DecodeError::NotAnObject)));
    }

    #[test]
    fn test_timestamp_out_of_range() {
        assert!(matches!(
            decode(&json!({ "battery_temperature": 1.0, "timestamp": 1e300 })),
            Err(DecodeError::TimestampOutOfRange(_))
        ));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(decode_frame(b"{not json"), Err(DecodeError::Malformed(_))));
        assert!(matches!(decode_frame(b""), Err(DecodeError::Malformed(_))));
    }
}
