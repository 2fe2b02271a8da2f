//! The backend's response envelope.

use serde::{Deserialize, Serialize};

/// Message used when the backend reports failure without saying why.
pub const DEFAULT_FAILURE_MESSAGE: &str = "request failed";

/// Every backend response is wrapped as `{ success, data?, error? }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiEnvelope<T> {
    /// Successful envelope carrying `data`.
    pub const fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Failed envelope carrying an error message.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }

    /// Unwrap the envelope.
    ///
    /// A successful response may legitimately omit `data` (e.g. deletes), so
    /// the payload stays optional. The caller decides whether it was required.
    ///
    /// # Errors
    ///
    /// Returns the backend's error message when `success` is false.
    pub fn into_result(self) -> Result<Option<T>, String> {
        if self.success {
            Ok(self.data)
        } else {
            Err(self
                .error
                .filter(|message| !message.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string()))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_success_with_data() {
        let env: ApiEnvelope<Vec<i32>> =
            serde_json::from_str(r#"{"success":true,"data":[1,2]}"#).unwrap();
        assert_eq!(env.into_result().unwrap(), Some(vec![1, 2]));
    }

    #[test]
    fn test_success_without_data() {
        let env: ApiEnvelope<Vec<i32>> = serde_json::from_str(r#"{"success":true}"#).unwrap();
        assert_eq!(env.into_result().unwrap(), None);
    }

    #[test]
    fn test_failure_uses_error_message() {
        let env: ApiEnvelope<()> =
            serde_json::from_str(r#"{"success":false,"error":"Coupon expired"}"#).unwrap();
        assert_eq!(env.into_result().unwrap_err(), "Coupon expired");
    }

    #[test]
    fn test_failure_without_message() {
        let env: ApiEnvelope<()> = serde_json::from_str(r#"{"success":false,"error":""}"#).unwrap();
        assert_eq!(env.into_result().unwrap_err(), DEFAULT_FAILURE_MESSAGE);
    }
}
