//! Font timestamp conversion
//!
//! sfnt timestamps count seconds from 1904-01-01T00:00:00Z.

use chrono::{DateTime, Utc};

/// Seconds to add to a font timestamp to get a Unix timestamp.
pub const FONT_EPOCH_OFFSET: i64 = -2_082_844_800;

/// Convert a font timestamp to UTC. Anything before 1970 clamps to the Unix epoch.
pub fn font_datetime(font_secs: i64) -> DateTime<Utc> {
    let unix_secs = font_secs.saturating_add(FONT_EPOCH_OFFSET).max(0);
    DateTime::from_timestamp(unix_secs, 0).unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}
