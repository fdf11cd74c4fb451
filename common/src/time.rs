//! Time utilities for the Cambio service.

use chrono::{DateTime, Duration, Utc};

/// A timestamp with timezone (always UTC for Cambio).
pub type Timestamp = DateTime<Utc>;

/// Get the current timestamp.
pub fn now() -> Timestamp {
    Utc::now()
}

/// Check if a timestamp has expired (is in the past).
pub fn is_expired(expiry: Timestamp) -> bool {
    now() > expiry
}

/// Calculate expiry time from now.
pub fn expires_in(duration: Duration) -> Timestamp {
    now() + duration
}
