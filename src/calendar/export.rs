use chrono::{DateTime, Datelike, Timelike, Utc};

use crate::calendar::event::Event;

/// Formats a timestamp in the iCalendar/Google Calendar UTC form, e.g.
/// `2024-09-09T17:46:00Z` -> `20240909T174600Z`.
pub fn format_to_utc(dt: &DateTime<Utc>) -> String {
    format!(
        "{:04}{:02}{:02}T{:02}{:02}{:02}Z",
        dt.year(),
        dt.month(),
        dt.day(),
        dt.hour(),
        dt.minute(),
        dt.second()
    )
}

/// Builds the Google Calendar event-template URL for an event.
pub fn google_calendar_url(event: &Event) -> String {
    format!(
        "https://www.google.com/calendar/render?action=TEMPLATE&text={}&dates={}/{}&details={}&location={}",
        urlencoding::encode(&event.title),
        format_to_utc(&event.start_time),
        format_to_utc(&event.heuristic_end()),
        urlencoding::encode(&event.description),
        urlencoding::encode(&event.location),
    )
}

/// Builds a minimal iCalendar payload for the event, CRLF-separated as the
/// format requires.
pub fn ics_payload(event: &Event, now: DateTime<Utc>) -> String {
    [
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        "PRODID:-//techcal//EN".to_string(),
        "BEGIN:VEVENT".to_string(),
        format!("UID:{}@techcalendar.app", event.id),
        format!("DTSTAMP:{}", format_to_utc(&now)),
        format!("DTSTART:{}", format_to_utc(&event.start_time)),
        format!("DTEND:{}", format_to_utc(&event.heuristic_end())),
        format!("SUMMARY:{}", event.title),
        format!("DESCRIPTION:{}", event.description),
        format!("LOCATION:{}", event.location),
        "END:VEVENT".to_string(),
        "END:VCALENDAR".to_string(),
    ]
    .join("\r\n")
}

/// Shareable web link for an event, used by the copy-link action.
pub fn event_link(event_id: &str) -> String {
    format!("https://techcalendar.app/event/{}", event_id)
}
