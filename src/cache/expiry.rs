//! Expiry Policy
//!
//! Pure time checks shared by lazy lookup expiry and the maintenance sweep.

use chrono::{DateTime, Duration, Utc};

use crate::cache::entry::StoredEntry;

/// Instant after which the entry is logically absent.
pub(crate) fn expires_at<T>(entry: &StoredEntry<T>) -> DateTime<Utc> {
    // TTLs past the representable range never expire
    i64::try_from(entry.ttl_seconds)
        .ok()
        .and_then(Duration::try_seconds)
        .and_then(|ttl| entry.created_at.checked_add_signed(ttl))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// An entry is expired strictly after `created_at + ttl`.
pub(crate) fn is_expired<T>(entry: &StoredEntry<T>, now: DateTime<Utc>) -> bool {
    now > expires_at(entry)
}

/// Milliseconds left before expiry; negative once expired.
pub(crate) fn remaining_ms<T>(entry: &StoredEntry<T>, now: DateTime<Utc>) -> i64 {
    (expires_at(entry) - now).num_milliseconds()
}
