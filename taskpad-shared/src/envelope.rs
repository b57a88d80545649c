/// Uniform response envelope
///
/// Every API operation, server and webhook alike, responds with the same
/// wrapper: `{success, data?, error?}`. The client decodes the same shape.
///
/// # Example
///
/// ```
/// use taskpad_shared::envelope::Envelope;
///
/// let ok = Envelope::ok(vec![1, 2, 3]);
/// assert!(ok.success);
///
/// let err = Envelope::<()>::err("user_id is required");
/// assert_eq!(err.error.as_deref(), Some("user_id is required"));
/// ```

use serde::{Deserialize, Serialize};

/// The `{success, data?, error?}` wrapper used by all API operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// Whether the operation succeeded
    pub success: bool,

    /// Payload, present on success (absent for bare-acknowledgement responses)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    /// Human-readable error message, present on failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> Envelope<T> {
    /// Successful envelope carrying a payload
    pub fn ok(data: T) -> Self {
        Envelope {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Successful envelope with no payload (e.g. delete acknowledgements)
    pub fn ok_empty() -> Self {
        Envelope {
            success: true,
            data: None,
            error: None,
        }
    }

    /// Failed envelope carrying an error message
    pub fn err(message: impl Into<String>) -> Self {
        Envelope {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }

    /// Extracts the payload, treating `success=false` or missing data
    /// as an error message
    pub fn into_data(self) -> Result<T, String> {
        if self.success {
            self.data.ok_or_else(|| "response carried no data".to_string())
        } else {
            Err(self
                .error
                .unwrap_or_else(|| "request failed without an error message".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_envelope_skips_error_field() {
        let json = serde_json::to_string(&Envelope::ok(42)).unwrap();
        assert_eq!(json, r#"{"success":true,"data":42}"#);
    }

    #[test]
    fn test_err_envelope_skips_data_field() {
        let json = serde_json::to_string(&Envelope::<i32>::err("boom")).unwrap();
        assert_eq!(json, r#"{"success":false,"error":"boom"}"#);
    }

    #[test]
    fn test_into_data_success() {
        let env = Envelope::ok("hello".to_string());
        assert_eq!(env.into_data().unwrap(), "hello");
    }

    #[test]
    fn test_into_data_failure_surfaces_message() {
        let env = Envelope::<String>::err("nope");
        assert_eq!(env.into_data().unwrap_err(), "nope");
    }

    #[test]
    fn test_decode_envelope_without_data() {
        let env: Envelope<Vec<i32>> = serde_json::from_str(r#"{"success":true}"#).unwrap();
        assert!(env.success);
        assert!(env.data.is_none());
    }
}
