//! The session token stored, encrypted, in the admin's auth cookie.

use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::auth::UserID;

// e.g. "2025-12-21 00:00:00.0 +00:00:00". Hours are zero padded so that a
// midnight expiry parses back.
time::serde::format_description!(
    expiry_format,
    OffsetDateTime,
    "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond] [offset_hour sign:mandatory]:[offset_minute]:[offset_second]"
);

/// The logged in admin and when their session ends.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct Token {
    pub user_id: UserID,
    #[serde(with = "expiry_format")]
    pub expires_at: OffsetDateTime,
}

impl Token {
    /// A session for `user_id` lasting `lifetime` from `now`.
    pub fn new(user_id: UserID, lifetime: Duration, now: OffsetDateTime) -> Self {
        Self {
            user_id,
            expires_at: now + lifetime,
        }
    }

    /// Whether the session is still open at `now`.
    pub fn is_live_at(&self, now: OffsetDateTime) -> bool {
        self.expires_at > now
    }

    /// Keep the session open for at least `lifetime` from `now`.
    ///
    /// An expiry already further out is left alone. Returns `None` if the new
    /// expiry does not fit in an [OffsetDateTime].
    pub fn renewed(self, lifetime: Duration, now: OffsetDateTime) -> Option<Self> {
        let expires_at = now.checked_add(lifetime)?.max(self.expires_at);

        Some(Self { expires_at, ..self })
    }
}
