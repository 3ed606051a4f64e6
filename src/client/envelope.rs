use crate::constants;
use crate::error::DroveError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The `{status, data, message}` wrapper every JSON response of the cluster
/// API uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope {
    pub status: String,
    #[serde(default)]
    pub data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ApiEnvelope {
    /// Parses the body of a response that answered with `status_code`.
    ///
    /// # Errors
    /// Returns a `MalformedBody` error when the text is not an envelope.
    pub fn parse(status_code: u16, text: &str) -> Result<Self, DroveError> {
        serde_json::from_str(text).map_err(|e| {
            DroveError::malformed(
                status_code,
                format!("Invalid response from Drove: {e}"),
                text.to_string(),
            )
        })
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == constants::STATUS_SUCCESS
    }

    /// Unwraps the payload, turning a non-`SUCCESS` status into a
    /// `LogicalFailure` regardless of the HTTP status.
    ///
    /// # Errors
    /// Returns a `LogicalFailure` error carrying the embedded message and the raw body.
    pub fn into_data(self, status_code: u16, raw: String) -> Result<Value, DroveError> {
        if self.is_success() {
            return Ok(self.data);
        }
        let message = self
            .message
            .unwrap_or_else(|| format!("Drove call failed with API status: {}", self.status));
        Err(DroveError::logical(status_code, message, raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DroveErrorKind;
    use serde_json::json;

    #[test]
    fn test_success_envelope_yields_data() {
        let text = r#"{"status":"SUCCESS","data":{"a":[1,2]},"message":"ok"}"#;
        let envelope = ApiEnvelope::parse(200, text).unwrap();
        assert!(envelope.is_success());
        assert_eq!(
            envelope.into_data(200, text.to_string()).unwrap(),
            json!({"a": [1, 2]})
        );
    }

    #[test]
    fn test_failure_envelope_keeps_message_and_raw() {
        let text = r#"{"status":"FAILED","message":"No such application"}"#;
        let err = ApiEnvelope::parse(200, text)
            .unwrap()
            .into_data(200, text.to_string())
            .unwrap_err();
        assert_eq!(err.kind, DroveErrorKind::LogicalFailure);
        assert_eq!(err.status_code, 200);
        assert_eq!(err.message, "No such application");
        assert_eq!(err.raw.as_deref(), Some(text));
    }

    #[test]
    fn test_failure_envelope_without_message() {
        let text = r#"{"status":"FAILED"}"#;
        let err = ApiEnvelope::parse(200, text)
            .unwrap()
            .into_data(200, text.to_string())
            .unwrap_err();
        assert!(err.message.contains("FAILED"));
    }

    #[test]
    fn test_missing_data_defaults_to_null() {
        let envelope = ApiEnvelope::parse(200, r#"{"status":"SUCCESS"}"#).unwrap();
        assert_eq!(envelope.data, Value::Null);
    }

    #[test]
    fn test_not_an_envelope_is_malformed() {
        let err = ApiEnvelope::parse(200, r#"{"files":[]}"#).unwrap_err();
        assert_eq!(err.kind, DroveErrorKind::MalformedBody);

        let err = ApiEnvelope::parse(200, "<html>").unwrap_err();
        assert_eq!(err.kind, DroveErrorKind::MalformedBody);
        assert_eq!(err.raw.as_deref(), Some("<html>"));
    }
}
