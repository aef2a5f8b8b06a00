//! Key expiry classification.
//!
//! A key is classified once, when its first key-bearing event is seen, against
//! the "now" captured at the start of the run. Timestamps are Unix milliseconds,
//! the unit snapshot dumps store expiry times in.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryClass {
    /// No expiry set
    Normal,
    /// Expiry strictly after now
    Expiring,
    /// Expiry at or before now
    Expired,
}

/// Equal-to-now counts as expired: the key is no longer readable at that instant.
pub fn classify_expiry(expiry_ms: Option<i64>, now_ms: i64) -> ExpiryClass {
    match expiry_ms {
        None => ExpiryClass::Normal,
        Some(at) if at > now_ms => ExpiryClass::Expiring,
        Some(_) => ExpiryClass::Expired,
    }
}
