//! HTTP request handlers.

use super::types::{Action, ActionRequest, HealthResponse, MessageResponse};
use super::AppState;
use crate::devices::DeviceStore;
use crate::error::SignupError;
use crate::notify::NotificationChannel;
use crate::otp::{normalize_phone_number, PendingStore};
use axum::{body::Bytes, extract::State, http::StatusCode, Json};
use serde_json::error::Category;
use tracing::info;

/// Health check endpoint.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let service = &state.service;
    let channel_healthy = service.channel().health_check().await;

    Json(HealthResponse {
        status: "ok".to_string(),
        pending_count: service.pending_store().len().await,
        device_count: service.device_store().count().await,
        channel: service.channel().name().to_string(),
        channel_healthy,
    })
}

/// CORS preflight. Headers are added by the CORS layer.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

/// Dispatch a `sendOTP` or `verifyOTP` action.
pub async fn handle_action(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<MessageResponse>, SignupError> {
    let request: ActionRequest = serde_json::from_slice(&body).map_err(parse_error)?;

    let phone_number = present(request.phone_number)
        .ok_or_else(|| SignupError::Validation("Phone number is required".to_string()))?;

    let action = request
        .action
        .as_deref()
        .and_then(Action::parse)
        .ok_or_else(|| SignupError::Validation("Invalid action".to_string()))?;

    match action {
        Action::SendOtp => {
            let phone_number =
                normalize_phone_number(&phone_number).map_err(SignupError::Validation)?;
            info!(phone_number = %phone_number, "OTP requested");

            state.service.issue(&phone_number).await?;

            Ok(Json(MessageResponse::new("OTP sent successfully")))
        }
        Action::VerifyOtp => {
            let (Some(device_id), Some(otp)) = (present(request.device_id), present(request.otp))
            else {
                return Err(SignupError::Validation(
                    "Device ID and OTP are required".to_string(),
                ));
            };

            let phone_number =
                normalize_phone_number(&phone_number).map_err(SignupError::Validation)?;
            info!(phone_number = %phone_number, "OTP verification requested");

            state.service.verify(&phone_number, &device_id, &otp).await?;

            Ok(Json(MessageResponse::new(
                "Phone number verified and device registered successfully",
            )))
        }
    }
}

/// Unreadable JSON is an internal error; well-formed JSON with fields of the
/// wrong type (or a field sent under two spellings) is a validation error.
fn parse_error(e: serde_json::Error) -> SignupError {
    match e.classify() {
        Category::Data => SignupError::Validation(format!("Invalid request: {}", e)),
        Category::Syntax | Category::Eof | Category::Io => {
            SignupError::Internal(format!("Failed to parse request body: {}", e))
        }
    }
}

/// Treat empty strings the same as a missing field.
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
