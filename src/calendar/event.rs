use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Color applied to events whose category is missing or unknown.
pub const FALLBACK_COLOR: &str = "#737373";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub description: String,
    pub organizer: String,
    pub location: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub status: EventStatus,
    pub event_type_id: Option<String>,
    pub source_url: String,
    pub livestream_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Confirmed,
    Pending,
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl EventStatus {
    pub fn parse(raw: &str) -> Self {
        match raw.to_lowercase().as_str() {
            "confirmed" => EventStatus::Confirmed,
            "pending" => EventStatus::Pending,
            "cancelled" => EventStatus::Cancelled,
            _ => EventStatus::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EventStatus::Confirmed => "Confirmed",
            EventStatus::Pending => "Pending",
            EventStatus::Cancelled => "Cancelled",
            EventStatus::Unknown => "Unknown",
        }
    }
}

impl Event {
    /// End of the calendar span. A missing end collapses the span to the
    /// start day.
    pub fn span_end(&self) -> DateTime<Utc> {
        self.end_time.unwrap_or(self.start_time)
    }

    /// End used by the time-span heuristics (status, countdown, export).
    /// A missing end defaults to two hours after the start.
    pub fn heuristic_end(&self) -> DateTime<Utc> {
        self.end_time
            .unwrap_or_else(|| self.start_time + Duration::hours(2))
    }

    pub fn duration(&self) -> Duration {
        self.heuristic_end() - self.start_time
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub color: String,
}

/// An event decorated with its category color. Derived on every pass over
/// the current event and category collections, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedEvent {
    pub event: Event,
    pub color: String,
}

pub fn enrich(events: &[Event], categories: &[Category]) -> Vec<EnrichedEvent> {
    let color_by_id: HashMap<&str, &str> = categories
        .iter()
        .map(|c| (c.id.as_str(), c.color.as_str()))
        .collect();

    events
        .iter()
        .map(|event| {
            let color = event
                .event_type_id
                .as_deref()
                .and_then(|id| color_by_id.get(id))
                .copied()
                .unwrap_or(FALLBACK_COLOR);
            EnrichedEvent {
                event: event.clone(),
                color: color.to_string(),
            }
        })
        .collect()
}

/// Filter composition: category membership AND (empty search OR
/// case-insensitive title/organizer substring match).
pub fn filter_visible(
    events: &[EnrichedEvent],
    selected_categories: &HashSet<String>,
    search_term: &str,
) -> Vec<EnrichedEvent> {
    let needle = search_term.to_lowercase();
    events
        .iter()
        .filter(|e| {
            let category_match = e
                .event
                .event_type_id
                .as_ref()
                .map(|id| selected_categories.contains(id))
                .unwrap_or(false);
            if !category_match {
                return false;
            }
            if needle.is_empty() {
                return true;
            }
            e.event.title.to_lowercase().contains(&needle)
                || e.event.organizer.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use chrono::TimeZone;

    pub fn event_at(
        id: &str,
        title: &str,
        start: DateTime<Utc>,
        end: Option<DateTime<Utc>>,
    ) -> Event {
        Event {
            id: id.to_string(),
            title: title.to_string(),
            description: String::new(),
            organizer: "Organizer".to_string(),
            location: "Online".to_string(),
            start_time: start,
            end_time: end,
            status: EventStatus::Confirmed,
            event_type_id: Some("cat1".to_string()),
            source_url: "https://example.com".to_string(),
            livestream_url: None,
        }
    }

    pub fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    pub fn category(id: &str, name: &str, color: &str) -> Category {
        Category {
            id: id.to_string(),
            name: name.to_string(),
            color: color.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn span_end_defaults_to_start() {
        let event = event_at("e1", "Meetup", utc(2024, 6, 10, 9, 0), None);
        assert_eq!(event.span_end(), event.start_time);
    }

    #[test]
    fn heuristic_end_defaults_to_two_hours() {
        let event = event_at("e1", "Meetup", utc(2024, 6, 10, 9, 0), None);
        assert_eq!(event.heuristic_end(), utc(2024, 6, 10, 11, 0));
    }

    #[test]
    fn explicit_end_overrides_both_defaults() {
        let end = utc(2024, 6, 14, 17, 0);
        let event = event_at("e1", "Conf", utc(2024, 6, 10, 9, 0), Some(end));
        assert_eq!(event.span_end(), end);
        assert_eq!(event.heuristic_end(), end);
    }

    #[test]
    fn enrich_joins_category_color() {
        let events = vec![event_at("e1", "WWDC", utc(2024, 6, 10, 17, 0), None)];
        let categories = vec![category("cat1", "conf", "#007AFF")];

        let enriched = enrich(&events, &categories);

        assert_eq!(enriched[0].color, "#007AFF");
    }

    #[test]
    fn enrich_falls_back_to_neutral_color_for_unknown_category() {
        let mut event = event_at("e1", "WWDC", utc(2024, 6, 10, 17, 0), None);
        event.event_type_id = Some("missing".to_string());

        let enriched = enrich(&[event], &[category("cat1", "conf", "#007AFF")]);

        assert_eq!(enriched[0].color, FALLBACK_COLOR);
    }

    #[test]
    fn enrich_falls_back_when_category_id_is_absent() {
        let mut event = event_at("e1", "WWDC", utc(2024, 6, 10, 17, 0), None);
        event.event_type_id = None;

        let enriched = enrich(&[event], &[]);

        assert_eq!(enriched[0].color, FALLBACK_COLOR);
    }

    #[test]
    fn filter_excludes_deselected_categories() {
        let events = enrich(
            &[event_at("e1", "WWDC", utc(2024, 6, 10, 17, 0), None)],
            &[category("cat1", "conf", "#007AFF")],
        );
        let selected = HashSet::new();

        assert!(filter_visible(&events, &selected, "").is_empty());
    }

    #[test]
    fn filter_matches_search_against_title_and_organizer() {
        let mut e1 = event_at("e1", "WWDC 2024", utc(2024, 6, 10, 17, 0), None);
        e1.organizer = "Apple Inc.".to_string();
        let e2 = event_at("e2", "Google I/O", utc(2024, 5, 14, 17, 0), None);
        let events = enrich(&[e1, e2], &[category("cat1", "conf", "#007AFF")]);
        let selected: HashSet<String> = ["cat1".to_string()].into();

        let by_organizer = filter_visible(&events, &selected, "apple");
        assert_eq!(by_organizer.len(), 1);
        assert_eq!(by_organizer[0].event.id, "e1");

        let by_title = filter_visible(&events, &selected, "google");
        assert_eq!(by_title.len(), 1);
        assert_eq!(by_title[0].event.id, "e2");
    }

    #[test]
    fn empty_search_keeps_all_selected_events() {
        let events = enrich(
            &[event_at("e1", "WWDC", utc(2024, 6, 10, 17, 0), None)],
            &[category("cat1", "conf", "#007AFF")],
        );
        let selected: HashSet<String> = ["cat1".to_string()].into();

        assert_eq!(filter_visible(&events, &selected, "").len(), 1);
    }

    #[test]
    fn status_parses_free_text() {
        assert_eq!(EventStatus::parse("Confirmed"), EventStatus::Confirmed);
        assert_eq!(EventStatus::parse("pending"), EventStatus::Pending);
        assert_eq!(EventStatus::parse("what"), EventStatus::Unknown);
    }
}
