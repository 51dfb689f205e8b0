use crate::error::DecodeError;
use pilot_link_shared::{STATUS_TAG, StatusNotice, TelemetrySnapshot};
use serde_json::{Map, Value};

/// What one inbound frame turned out to be.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundFrame {
    StatusNotice(StatusNotice),
    TelemetryUpdate(TelemetrySnapshot),
}

/// Classify, then validate.
///
/// The wire format has no telemetry tag: anything that is not tagged
/// `"type": "status"` is assumed to be telemetry and must carry every
/// snapshot field with the right type.
pub fn decode(raw: &str) -> Result<InboundFrame, DecodeError> {
    let record: Value =
        serde_json::from_str(raw).map_err(|e| DecodeError::Malformed(e.to_string()))?;

    let Value::Object(fields) = record else {
        return Err(DecodeError::Malformed(format!(
            "expected a record, got {}",
            kind_of(&record)
        )));
    };

    if is_status(&fields) {
        let message = fields
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        return Ok(InboundFrame::StatusNotice(StatusNotice { message }));
    }

    decode_telemetry(fields).map(InboundFrame::TelemetryUpdate)
}

fn is_status(fields: &Map<String, Value>) -> bool {
    fields.get("type").and_then(Value::as_str) == Some(STATUS_TAG)
}

fn decode_telemetry(fields: Map<String, Value>) -> Result<TelemetrySnapshot, DecodeError> {
    let snapshot: TelemetrySnapshot = serde_json::from_value(Value::Object(fields))
        .map_err(|e| DecodeError::InvalidTelemetry(e.to_string()))?;

    for (name, v) in [
        ("latitude", snapshot.latitude),
        ("longitude", snapshot.longitude),
        ("altitude", snapshot.altitude),
    ] {
        if !v.is_finite() {
            return Err(DecodeError::InvalidTelemetry(format!("{name} is not finite")));
        }
    }

    Ok(snapshot)
}

fn kind_of(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_record_is_a_notice() {
        let frame = decode(r#"{"type":"status","message":"ok"}"#).unwrap();
        assert_eq!(
            frame,
            InboundFrame::StatusNotice(StatusNotice {
                message: "ok".into()
            })
        );
    }

    #[test]
    fn status_without_message_is_empty_not_an_error() {
        let frame = decode(r#"{"type":"status"}"#).unwrap();
        assert_eq!(frame, InboundFrame::StatusNotice(StatusNotice::default()));
    }

    #[test]
    fn untagged_record_is_telemetry() {
        let frame = decode(
            r#"{"armed":true,"mode":"GUIDED","latitude":35.0,"longitude":139.0,"altitude":10.5}"#,
        )
        .unwrap();

        let InboundFrame::TelemetryUpdate(snap) = frame else {
            panic!("expected telemetry, got {frame:?}");
        };
        assert!(snap.armed);
        assert_eq!(snap.mode, "GUIDED");
        assert_eq!(snap.latitude, 35.0);
        assert_eq!(snap.longitude, 139.0);
        assert_eq!(snap.altitude, 10.5);
    }

    #[test]
    fn integer_coordinates_are_accepted() {
        let frame =
            decode(r#"{"armed":false,"mode":"STABILIZE","latitude":35,"longitude":139,"altitude":0}"#)
                .unwrap();
        assert!(matches!(frame, InboundFrame::TelemetryUpdate(s) if s.latitude == 35.0));
    }

    #[test]
    fn mistyped_telemetry_field_is_rejected() {
        let err = decode(r#"{"armed":true,"mode":"GUIDED","latitude":"bad"}"#).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidTelemetry(_)));
    }

    #[test]
    fn missing_telemetry_field_is_rejected() {
        let err = decode(r#"{"armed":true,"mode":"GUIDED","latitude":1.0,"longitude":2.0}"#)
            .unwrap_err();
        assert!(matches!(err, DecodeError::InvalidTelemetry(_)));
    }

    #[test]
    fn other_type_tags_fall_through_to_telemetry_validation() {
        let err = decode(r#"{"type":"heartbeat"}"#).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidTelemetry(_)));
    }

    #[test]
    fn garbage_is_malformed() {
        assert!(matches!(decode("{not json"), Err(DecodeError::Malformed(_))));
        assert!(matches!(decode("[1,2,3]"), Err(DecodeError::Malformed(_))));
        assert!(matches!(decode(""), Err(DecodeError::Malformed(_))));
    }
}
