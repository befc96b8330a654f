use chrono::{Duration, Utc};
use chrono_tz::Tz;

use crate::api::Time;

/// The point in time relative labels are computed against, and the timezone
/// absolute dates are shown in
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Clock {
    pub now: Time,
    pub tz: Tz,
}

impl Clock {
    pub fn new(now: Time, tz: Tz) -> Clock {
        Clock { now, tz }
    }

    pub fn now(tz: Tz) -> Clock {
        Clock::new(Utc::now(), tz)
    }
}

/// Coarse "how long ago" label for a reply
///
/// Anything older than a week is shown as month and day only, even when it
/// is from a previous year.
pub fn relative_label(created_at: &Time, clock: &Clock) -> String {
    let elapsed = clock.now.signed_duration_since(*created_at);
    if elapsed < Duration::minutes(1) {
        // also covers timestamps from the future, eg. clock skew
        String::from("just now")
    } else if elapsed < Duration::hours(1) {
        format!("{}m ago", elapsed.num_minutes())
    } else if elapsed < Duration::days(1) {
        format!("{}h ago", elapsed.num_hours())
    } else if elapsed < Duration::days(7) {
        format!("{}d ago", elapsed.num_days())
    } else {
        created_at
            .with_timezone(&clock.tz)
            .format("%b %-d")
            .to_string()
    }
}
