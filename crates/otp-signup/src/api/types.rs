//! API request and response types.

use serde::{Deserialize, Serialize};

/// Raw request body for the signup endpoint.
///
/// Every field is optional so that missing fields produce validation errors
/// in a fixed order instead of a generic parse failure. The snake_case
/// spellings sent by the browser form are accepted as aliases.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRequest {
    /// `sendOTP` or `verifyOTP`
    pub action: Option<String>,

    /// Phone number in E.164 format
    #[serde(alias = "phone_number")]
    pub phone_number: Option<String>,

    /// Device identifier to register (verify only)
    #[serde(alias = "device_id")]
    pub device_id: Option<String>,

    /// Candidate code (verify only)
    #[serde(alias = "otp_code")]
    pub otp: Option<String>,
}

/// Supported request actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    SendOtp,
    VerifyOtp,
}

impl Action {
    /// Parse an action name.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "sendOTP" | "send_otp" => Some(Action::SendOtp),
            "verifyOTP" | "verify_otp" => Some(Action::VerifyOtp),
            _ => None,
        }
    }
}

/// Success response.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub pending_count: usize,
    pub device_count: usize,
    pub channel: String,
    pub channel_healthy: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_camel_case_request() {
        let json = r#"{"action":"verifyOTP","phoneNumber":"+14155551234","deviceId":"web-1","otp":"1234"}"#;
        let request: ActionRequest = serde_json::from_str(json).unwrap();

        assert_eq!(request.action.as_deref(), Some("verifyOTP"));
        assert_eq!(request.phone_number.as_deref(), Some("+14155551234"));
        assert_eq!(request.device_id.as_deref(), Some("web-1"));
        assert_eq!(request.otp.as_deref(), Some("1234"));
    }

    #[test]
    fn test_parse_snake_case_aliases() {
        let json = r#"{"action":"verify_otp","phone_number":"+14155551234","device_id":"web-1","otp_code":"1234"}"#;
        let request: ActionRequest = serde_json::from_str(json).unwrap();

        assert_eq!(request.phone_number.as_deref(), Some("+14155551234"));
        assert_eq!(request.device_id.as_deref(), Some("web-1"));
        assert_eq!(request.otp.as_deref(), Some("1234"));
        assert_eq!(
            Action::parse(request.action.as_deref().unwrap()),
            Some(Action::VerifyOtp)
        );
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let json = r#"{"action":"sendOTP","phoneNumber":"+14155551234","extra":true}"#;
        let request: ActionRequest = serde_json::from_str(json).unwrap();
        assert!(request.device_id.is_none());
    }

    #[test]
    fn test_action_parse() {
        assert_eq!(Action::parse("sendOTP"), Some(Action::SendOtp));
        assert_eq!(Action::parse("send_otp"), Some(Action::SendOtp));
        assert_eq!(Action::parse("SENDOTP"), None);
        assert_eq!(Action::parse(""), None);
    }
}
