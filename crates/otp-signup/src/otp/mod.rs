//! One-time passcode issuance and verification.

mod locks;
mod service;
mod store;
mod sweeper;

pub use locks::{KeyGuard, KeyedLocks};
pub use service::OtpService;
pub use store::{MemoryPendingStore, PendingStore};
pub use sweeper::{spawn_sweeper, sweep_once};

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Number of digits in an issued code.
pub const CODE_LENGTH: usize = 4;

/// An issued, unconsumed code for a phone number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingVerification {
    /// The phone number in E.164 format (e.g., "+14155551234")
    pub phone_number: String,

    /// The numeric code sent to the phone
    pub code: String,

    /// When the code was issued
    pub issued_at: DateTime<Utc>,

    /// When the code stops being accepted
    pub expires_at: DateTime<Utc>,
}

impl PendingVerification {
    /// Create a pending verification valid for `ttl` from now.
    pub fn new(phone_number: String, code: String, ttl: Duration) -> Self {
        let issued_at = Utc::now();
        Self {
            phone_number,
            code,
            issued_at,
            expires_at: issued_at + ttl,
        }
    }

    /// Whether the code is no longer accepted at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Exact string comparison against a submitted code.
    pub fn matches(&self, candidate: &str) -> bool {
        self.code == candidate
    }
}

/// Generate a 4-digit code. Not cryptographically secure.
pub fn generate_code() -> String {
    rand::thread_rng().gen_range(1000..10000u32).to_string()
}

/// Render the notification message for a code.
pub fn render_message(template: &str, code: &str) -> String {
    template.replace("{code}", code)
}

/// Normalize a phone number to E.164 format.
///
/// Formatting characters (spaces, dashes, dots, parentheses) are stripped.
/// The number must carry a leading `+` and country code; bare digits are
/// rejected rather than guessed at.
pub fn normalize_phone_number(number: &str) -> Result<String, String> {
    let stripped: String = number
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '.' | '(' | ')'))
        .collect();

    if stripped.is_empty() {
        return Err("Phone number is required".into());
    }

    let Some(digits) = stripped.strip_prefix('+') else {
        return Err("Phone number must be in E.164 format with a leading + and country code".into());
    };

    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err("Phone number must contain only digits after the +".into());
    }

    if digits.starts_with('0') {
        return Err("Country code cannot start with 0".into());
    }

    if digits.len() < 8 {
        return Err("Phone number too short".into());
    }

    if digits.len() > 15 {
        return Err("Phone number too long".into());
    }

    Ok(format!("+{}", digits))
}
