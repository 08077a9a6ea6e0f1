use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use crate::calendar::event::EnrichedEvent;

/// Ranked urgency classification for a single event, driven by its time
/// span and title keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusKind {
    None,
    Live,
    MultiDay,
    EndingSoon,
    InProgress,
    StartingSoon,
    DeadlineToday,
    RegistrationOpen,
    OnSale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusBadge {
    pub kind: StatusKind,
    pub priority: u8,
    pub pulse: bool,
}

impl StatusBadge {
    const fn none() -> Self {
        StatusBadge {
            kind: StatusKind::None,
            priority: 0,
            pulse: false,
        }
    }

    pub fn is_none(&self) -> bool {
        self.kind == StatusKind::None
    }

    pub fn label(&self) -> &'static str {
        match self.kind {
            StatusKind::None => "",
            StatusKind::Live => "LIVE NOW",
            StatusKind::MultiDay => "MULTI-DAY",
            StatusKind::EndingSoon => "ENDING SOON",
            StatusKind::InProgress => "IN PROGRESS",
            StatusKind::StartingSoon => "STARTS TODAY",
            StatusKind::DeadlineToday => "DEADLINE TODAY",
            StatusKind::RegistrationOpen => "REGISTRATION OPEN",
            StatusKind::OnSale => "TICKETS ON SALE",
        }
    }
}

const LIVE_KEYWORDS: &[&str] = &["keynote", "livestream", "announcement", "launch"];
const DEADLINE_KEYWORDS: &[&str] = &[
    "registration",
    "signup",
    "submit",
    "ticket",
    "sale",
    "early bird",
    "deadline",
];

fn title_has(title_lower: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| title_lower.contains(kw))
}

/// Classifies one event into its single highest-precedence status.
///
/// Multi-day events in progress report `MultiDay` on their first day only
/// and suppress any status on subsequent days, so a week-long conference is
/// not marked live for its whole run.
pub fn classify(
    start: DateTime<Utc>,
    end_time: Option<DateTime<Utc>>,
    title: &str,
    now: DateTime<Utc>,
) -> StatusBadge {
    let end = end_time.unwrap_or(start + Duration::hours(2));
    let title_lower = title.to_lowercase();

    let in_span = now >= start && now <= end;
    let duration = end - start;
    let until_start = start - now;
    let until_end = end - now;

    let short_live = in_span
        && duration <= Duration::hours(4)
        && title_has(&title_lower, LIVE_KEYWORDS);
    if short_live {
        return StatusBadge {
            kind: StatusKind::Live,
            priority: 10,
            pulse: true,
        };
    }

    if title_has(&title_lower, DEADLINE_KEYWORDS)
        && until_end > Duration::zero()
        && until_end <= Duration::hours(24)
    {
        return StatusBadge {
            kind: StatusKind::DeadlineToday,
            priority: 9,
            pulse: true,
        };
    }

    if in_span && duration > Duration::hours(24) {
        let days_in = (now - start).num_days();
        if days_in == 0 {
            return StatusBadge {
                kind: StatusKind::MultiDay,
                priority: 8,
                pulse: false,
            };
        }
        return StatusBadge::none();
    }

    if in_span
        && duration <= Duration::hours(24)
        && until_end > Duration::zero()
        && until_end <= Duration::hours(2)
    {
        return StatusBadge {
            kind: StatusKind::EndingSoon,
            priority: 9,
            pulse: false,
        };
    }

    if in_span {
        // Keyword windows win over the generic badge so the open-window
        // statuses stay reachable for in-progress events.
        if title_lower.contains("registration") {
            return StatusBadge {
                kind: StatusKind::RegistrationOpen,
                priority: 5,
                pulse: false,
            };
        }
        if title_lower.contains("ticket") {
            return StatusBadge {
                kind: StatusKind::OnSale,
                priority: 4,
                pulse: false,
            };
        }
        return StatusBadge {
            kind: StatusKind::InProgress,
            priority: 7,
            pulse: false,
        };
    }

    if until_start > Duration::zero() && until_start <= Duration::hours(24) {
        return StatusBadge {
            kind: StatusKind::StartingSoon,
            priority: 6,
            pulse: false,
        };
    }

    StatusBadge::none()
}

pub fn classify_event(event: &EnrichedEvent, now: DateTime<Utc>) -> StatusBadge {
    classify(
        event.event.start_time,
        event.event.end_time,
        &event.event.title,
        now,
    )
}

/// Whether the event warrants a happening-now indicator at all; derived from
/// the same rules as [`classify`]. Countdown timers are only shown for
/// events where this is false.
pub fn has_happening_now(
    start: DateTime<Utc>,
    end_time: Option<DateTime<Utc>>,
    title: &str,
    now: DateTime<Utc>,
) -> bool {
    !classify(start, end_time, title, now).is_none()
}

/// Aggregates a day cell's events into at most three distinct status dots,
/// highest priority first.
pub fn day_status_dots(events: &[&EnrichedEvent], now: DateTime<Utc>) -> Vec<StatusBadge> {
    let mut by_kind: HashMap<StatusKind, StatusBadge> = HashMap::new();
    for event in events {
        let badge = classify_event(event, now);
        if !badge.is_none() {
            by_kind.entry(badge.kind).or_insert(badge);
        }
    }

    let mut dots: Vec<StatusBadge> = by_kind.into_values().collect();
    dots.sort_by(|a, b| b.priority.cmp(&a.priority));
    dots.truncate(3);
    dots
}
