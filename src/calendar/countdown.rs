use chrono::{DateTime, Duration, Utc};

/// Pure wall-clock countdown state for an event. Recomputed on every tick;
/// nothing here is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Countdown {
    Live,
    Ended,
    Until(TimeRemaining),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRemaining {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

pub fn countdown(
    start: DateTime<Utc>,
    end_time: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Countdown {
    let end = end_time.unwrap_or(start + Duration::hours(2));

    if now >= start && now <= end {
        return Countdown::Live;
    }
    if now > end {
        return Countdown::Ended;
    }

    let total = (start - now).num_seconds();
    Countdown::Until(TimeRemaining {
        days: total / 86_400,
        hours: (total % 86_400) / 3_600,
        minutes: (total % 3_600) / 60,
        seconds: total % 60,
    })
}

impl TimeRemaining {
    /// Coarsens the display with distance: days only beyond a week,
    /// days+hours within it, hours+minutes same-day, minutes+seconds in the
    /// final hour.
    pub fn display(&self) -> String {
        if self.days > 7 {
            let unit = if self.days == 1 { "day" } else { "days" };
            return format!("{} {}", self.days, unit);
        }
        if self.days > 0 {
            return format!("{}d {}h", self.days, self.hours);
        }
        if self.hours > 0 {
            return format!("{}h {}m", self.hours, self.minutes);
        }
        format!("{}m {}s", self.minutes, self.seconds)
    }
}

impl Countdown {
    pub fn display(&self) -> String {
        match self {
            Countdown::Live => "LIVE NOW".to_string(),
            Countdown::Ended => "Event ended".to_string(),
            Countdown::Until(remaining) => remaining.display(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::event::test_support::utc;

    fn now() -> DateTime<Utc> {
        utc(2024, 6, 10, 12, 0)
    }

    #[test]
    fn event_in_span_is_live() {
        let c = countdown(now() - Duration::hours(1), Some(now() + Duration::hours(1)), now());
        assert_eq!(c, Countdown::Live);
    }

    #[test]
    fn not_live_until_start_is_reached() {
        let start = now() + Duration::minutes(30);
        match countdown(start, None, now()) {
            Countdown::Until(t) => {
                assert_eq!(t.days, 0);
                assert_eq!(t.hours, 0);
                assert_eq!(t.minutes, 30);
            }
            other => panic!("expected a pending countdown, got {:?}", other),
        }

        assert_eq!(countdown(start, None, start), Countdown::Live);
    }

    #[test]
    fn ended_event_uses_two_hour_default_end() {
        let start = now() - Duration::hours(3);
        assert_eq!(countdown(start, None, now()), Countdown::Ended);
    }

    #[test]
    fn breakdown_splits_units() {
        let start = now() + Duration::days(2) + Duration::hours(3) + Duration::minutes(4) + Duration::seconds(5);
        match countdown(start, None, now()) {
            Countdown::Until(t) => {
                assert_eq!((t.days, t.hours, t.minutes, t.seconds), (2, 3, 4, 5));
            }
            other => panic!("expected a pending countdown, got {:?}", other),
        }
    }

    #[test]
    fn display_shows_only_days_beyond_a_week() {
        let t = TimeRemaining { days: 12, hours: 5, minutes: 1, seconds: 2 };
        assert_eq!(t.display(), "12 days");
    }

    #[test]
    fn display_shows_days_and_hours_within_a_week() {
        let t = TimeRemaining { days: 3, hours: 4, minutes: 1, seconds: 2 };
        assert_eq!(t.display(), "3d 4h");
    }

    #[test]
    fn display_shows_hours_and_minutes_same_day() {
        let t = TimeRemaining { days: 0, hours: 5, minutes: 12, seconds: 2 };
        assert_eq!(t.display(), "5h 12m");
    }

    #[test]
    fn display_shows_minutes_and_seconds_in_final_hour() {
        let t = TimeRemaining { days: 0, hours: 0, minutes: 42, seconds: 7 };
        assert_eq!(t.display(), "42m 7s");
    }
}
