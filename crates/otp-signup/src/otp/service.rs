//! Issue and verify codes against the pending store.

use super::{generate_code, render_message, KeyedLocks, PendingStore, PendingVerification};
use crate::devices::{DeviceRegistration, DeviceStore};
use crate::error::SignupError;
use crate::notify::NotificationChannel;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// OTP issuer and verifier.
///
/// Operations on the same phone number are serialized; different numbers
/// proceed independently.
pub struct OtpService {
    pending: Arc<dyn PendingStore>,
    devices: Arc<dyn DeviceStore>,
    channel: Arc<dyn NotificationChannel>,
    locks: KeyedLocks,
    ttl: chrono::Duration,
    message_template: String,
}

impl OtpService {
    /// Create a new service.
    pub fn new(
        pending: Arc<dyn PendingStore>,
        devices: Arc<dyn DeviceStore>,
        channel: Arc<dyn NotificationChannel>,
        ttl: Duration,
        message_template: impl Into<String>,
    ) -> Self {
        // Config::validate rejects out-of-range TTLs before startup.
        let ttl = chrono::Duration::from_std(ttl).unwrap_or_else(|_| {
            warn!(?ttl, "OTP TTL out of range, falling back to 5 minutes");
            chrono::Duration::minutes(5)
        });

        Self {
            pending,
            devices,
            channel,
            locks: KeyedLocks::new(),
            ttl,
            message_template: message_template.into(),
        }
    }

    pub fn pending_store(&self) -> &Arc<dyn PendingStore> {
        &self.pending
    }

    pub fn device_store(&self) -> &Arc<dyn DeviceStore> {
        &self.devices
    }

    pub fn channel(&self) -> &Arc<dyn NotificationChannel> {
        &self.channel
    }

    /// Issue a code for `phone_number` and deliver it.
    ///
    /// The code is only recorded once the channel accepted it; a failed
    /// delivery leaves any earlier pending code in place.
    #[instrument(skip(self))]
    pub async fn issue(&self, phone_number: &str) -> Result<(), SignupError> {
        let _guard = self.locks.lock(phone_number).await;

        let code = generate_code();
        let message = render_message(&self.message_template, &code);

        if let Err(e) = self.channel.send(phone_number, &message).await {
            warn!(phone_number = %phone_number, channel = self.channel.name(), error = %e, "Code dispatch failed");
            return Err(e);
        }

        let pending = PendingVerification::new(phone_number.to_string(), code, self.ttl);
        let expires_at = pending.expires_at;
        self.pending.put(pending).await?;

        info!(phone_number = %phone_number, %expires_at, "Verification code issued");
        Ok(())
    }

    /// Check `code` for `phone_number` and register `device_id` on success.
    ///
    /// The pending entry is consumed only after the registration is stored,
    /// so a storage failure can be retried with the same code.
    #[instrument(skip(self, code))]
    pub async fn verify(
        &self,
        phone_number: &str,
        device_id: &str,
        code: &str,
    ) -> Result<DeviceRegistration, SignupError> {
        let _guard = self.locks.lock(phone_number).await;

        let Some(pending) = self.pending.get(phone_number).await? else {
            warn!(phone_number = %phone_number, "No pending verification");
            return Err(SignupError::ExpiredOrMissing);
        };

        if pending.is_expired_at(Utc::now()) {
            warn!(phone_number = %phone_number, expires_at = %pending.expires_at, "Verification code expired");
            self.pending.remove(phone_number).await?;
            return Err(SignupError::ExpiredOrMissing);
        }

        if !pending.matches(code) {
            warn!(phone_number = %phone_number, "Verification code mismatch");
            return Err(SignupError::CodeMismatch);
        }

        let registration =
            DeviceRegistration::new(phone_number.to_string(), device_id.to_string());
        self.devices.put(&registration).await?;

        self.pending.remove(phone_number).await?;

        info!(phone_number = %phone_number, device_id = %device_id, "Phone verified, device registered");
        Ok(registration)
    }
}
