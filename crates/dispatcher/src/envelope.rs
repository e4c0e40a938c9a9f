//! EnvelopeParser - validates untyped input into an [`Envelope`]
//!
//! Wire shape: `{"to": ["+15148887777", "+15148887779"], "body": "SMS Message."}`
//!
//! `to` must be a native JSON array. A string, including a JSON-encoded array
//! inside a string, is rejected rather than coerced or parsed twice.

use contracts::{ContractError, Envelope, RecipientId};
use serde_json::Value;
use tracing::{debug, instrument};

/// Envelope parser
pub struct EnvelopeParser;

impl EnvelopeParser {
    /// Parse raw JSON text
    ///
    /// # Errors
    /// Returns [`ContractError::MalformedEnvelope`] for invalid JSON or an
    /// invalid envelope shape. No partial envelope is ever returned.
    #[instrument(name = "envelope_parse_str", skip(raw), fields(len = raw.len()))]
    pub fn parse_str(raw: &str) -> Result<Envelope, ContractError> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|e| ContractError::malformed(format!("invalid JSON: {e}")))?;
        Self::parse(&value)
    }

    /// Parse raw JSON bytes
    pub fn parse_slice(raw: &[u8]) -> Result<Envelope, ContractError> {
        let value: Value = serde_json::from_slice(raw)
            .map_err(|e| ContractError::malformed(format!("invalid JSON: {e}")))?;
        Self::parse(&value)
    }

    /// Validate and normalize a structured value
    ///
    /// Recipients are trimmed; the body is kept verbatim.
    pub fn parse(value: &Value) -> Result<Envelope, ContractError> {
        let object = value
            .as_object()
            .ok_or_else(|| ContractError::malformed("envelope must be a JSON object"))?;

        let recipients = match object.get("to") {
            None | Some(Value::Null) => return Err(ContractError::malformed("missing field 'to'")),
            Some(Value::Array(items)) => Self::parse_recipients(items)?,
            Some(Value::String(_)) => {
                return Err(ContractError::malformed(
                    "'to' must be an array of strings, got a string",
                ))
            }
            Some(other) => {
                return Err(ContractError::malformed(format!(
                    "'to' must be an array of strings, got {}",
                    json_type(other)
                )))
            }
        };

        let body = match object.get("body") {
            None | Some(Value::Null) => return Err(ContractError::malformed("missing field 'body'")),
            Some(Value::String(body)) => body.clone(),
            Some(other) => {
                return Err(ContractError::malformed(format!(
                    "'body' must be a string, got {}",
                    json_type(other)
                )))
            }
        };

        let envelope = Envelope::new(recipients, body)?;
        debug!(recipients = envelope.len(), "Envelope parsed");
        Ok(envelope)
    }

    fn parse_recipients(items: &[Value]) -> Result<Vec<RecipientId>, ContractError> {
        items
            .iter()
            .enumerate()
            .map(|(idx, item)| match item {
                Value::String(s) => Ok(RecipientId::from(s.trim())),
                other => Err(ContractError::malformed(format!(
                    "'to[{idx}]' must be a string, got {}",
                    json_type(other)
                ))),
            })
            .collect()
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn reason(err: ContractError) -> String {
        match err {
            ContractError::MalformedEnvelope { reason } => reason,
            other => panic!("expected MalformedEnvelope, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_canonical_envelope() {
        let env = EnvelopeParser::parse_str(
            r#"{"to": ["+15148887777", "+15148887779"], "body": "SMS Message."}"#,
        )
        .unwrap();
        let expected: Vec<RecipientId> = vec!["+15148887777".into(), "+15148887779".into()];
        assert_eq!(env.recipients(), expected.as_slice());
        assert_eq!(env.body(), "SMS Message.");
    }

    #[test]
    fn test_recipients_are_trimmed() {
        let env = EnvelopeParser::parse(&json!({"to": [" +1A "], "body": "hi"})).unwrap();
        assert_eq!(env.recipients()[0], "+1A");
    }

    #[test]
    fn test_missing_to() {
        let err = EnvelopeParser::parse(&json!({"body": "x"})).unwrap_err();
        assert_eq!(reason(err), "missing field 'to'");
    }

    #[test]
    fn test_empty_to() {
        let err = EnvelopeParser::parse(&json!({"to": [], "body": "x"})).unwrap_err();
        assert!(reason(err).contains("at least one recipient"));
    }

    #[test]
    fn test_blank_recipient() {
        let err = EnvelopeParser::parse(&json!({"to": ["+1A", "  "], "body": "x"})).unwrap_err();
        assert!(reason(err).contains("to[1]"));
    }

    #[test]
    fn test_bare_string_is_not_coerced() {
        let err = EnvelopeParser::parse(&json!({"to": "+1A", "body": "x"})).unwrap_err();
        assert!(reason(err).contains("got a string"));
    }

    #[test]
    fn test_string_encoded_array_is_rejected() {
        let err = EnvelopeParser::parse(&json!({"to": "[\"+1A\",\"+1B\"]", "body": "x"}))
            .unwrap_err();
        assert!(reason(err).contains("got a string"));
    }

    #[test]
    fn test_non_string_recipient() {
        let err = EnvelopeParser::parse(&json!({"to": ["+1A", 15148887777u64], "body": "x"}))
            .unwrap_err();
        assert_eq!(reason(err), "'to[1]' must be a string, got a number");
    }

    #[test]
    fn test_missing_body() {
        let err = EnvelopeParser::parse(&json!({"to": ["+1A"]})).unwrap_err();
        assert_eq!(reason(err), "missing field 'body'");
    }

    #[test]
    fn test_null_to() {
        let err = EnvelopeParser::parse(&json!({"to": null, "body": "x"})).unwrap_err();
        assert_eq!(reason(err), "missing field 'to'");
    }

    #[test]
    fn test_non_string_body() {
        let err = EnvelopeParser::parse(&json!({"to": ["+1A"], "body": 5})).unwrap_err();
        assert_eq!(reason(err), "'body' must be a string, got a number");
    }

    #[test]
    fn test_counter_key_recipient_is_rejected() {
        let err = EnvelopeParser::parse(&json!({"to": ["+1A", " count.success "], "body": "x"}))
            .unwrap_err();
        assert!(reason(err).contains("outcome counter key"));
    }

    #[test]
    fn test_blank_body() {
        let err = EnvelopeParser::parse(&json!({"to": ["+1A"], "body": " \n"})).unwrap_err();
        assert!(reason(err).contains("'body' is blank"));
    }

    #[test]
    fn test_non_object() {
        let err = EnvelopeParser::parse(&json!(["+1A"])).unwrap_err();
        assert!(reason(err).contains("JSON object"));
    }

    #[test]
    fn test_invalid_json() {
        let err = EnvelopeParser::parse_slice(b"{\"to\": [").unwrap_err();
        assert!(reason(err).starts_with("invalid JSON"));
    }
}
