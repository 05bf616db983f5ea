//! Phone OTP signup service.
//!
//! Issues one-time passcodes to phone numbers and, once a code is verified,
//! registers the caller's device for push notifications:
//! - `sendOTP` generates a code, delivers it and records it with an expiry
//! - `verifyOTP` checks the code once and persists the device registration
//! - Pending codes live in a bounded store swept in the background

pub mod api;
pub mod config;
pub mod devices;
pub mod error;
pub mod notify;
pub mod otp;

pub use config::Config;
pub use devices::{DeviceRegistration, DeviceStore, FileDeviceStore, MemoryDeviceStore};
pub use error::SignupError;
pub use notify::{LogChannel, NotificationChannel, SignalChannel};
pub use otp::{MemoryPendingStore, OtpService, PendingStore, PendingVerification};
