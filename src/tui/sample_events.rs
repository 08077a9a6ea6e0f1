use chrono::{Duration, Utc};
use techcal::{
    app::AppState,
    calendar::{Category, Event, EventStatus},
};

/// Seeds the state with a local catalog for trying the client without a
/// backend. Events are placed relative to now so every badge kind shows up.
pub fn add_sample_events(app: &mut AppState) {
    let now = Utc::now();

    let categories = vec![
        Category {
            id: "sample_conf".to_string(),
            name: "Conferences".to_string(),
            color: "#007AFF".to_string(),
        },
        Category {
            id: "sample_launch".to_string(),
            name: "Product Launches".to_string(),
            color: "#FF3B30".to_string(),
        },
        Category {
            id: "sample_meetup".to_string(),
            name: "Meetups".to_string(),
            color: "#34C759".to_string(),
        },
    ];

    let events = vec![
        sample_event(
            "sample_keynote",
            "Apple September Keynote",
            "Apple",
            "Cupertino, CA",
            now - Duration::hours(1),
            Some(now + Duration::hours(1)),
            "sample_launch",
            Some("https://www.apple.com/apple-events/"),
        ),
        sample_event(
            "sample_deadline",
            "RustConf early bird registration closes",
            "RustConf",
            "Online",
            now - Duration::hours(2),
            Some(now + Duration::hours(10)),
            "sample_conf",
            None,
        ),
        sample_event(
            "sample_multiday",
            "KubeCon + CloudNativeCon",
            "CNCF",
            "Salt Lake City, UT",
            now - Duration::days(1),
            Some(now + Duration::days(2)),
            "sample_conf",
            None,
        ),
        sample_event(
            "sample_meetup_1",
            "Rust Meetup: async in practice",
            "Rust Community",
            "Berlin",
            now + Duration::hours(20),
            Some(now + Duration::hours(22)),
            "sample_meetup",
            None,
        ),
        sample_event(
            "sample_next_month",
            "Google I/O",
            "Google",
            "Mountain View, CA",
            now + Duration::days(35),
            Some(now + Duration::days(37)),
            "sample_conf",
            Some("https://io.google/"),
        ),
        sample_event(
            "sample_past",
            "WWDC",
            "Apple",
            "Cupertino, CA",
            now - Duration::days(40),
            Some(now - Duration::days(36)),
            "sample_conf",
            None,
        ),
    ];

    app.set_catalog(events, categories);
}

#[allow(clippy::too_many_arguments)]
fn sample_event(
    id: &str,
    title: &str,
    organizer: &str,
    location: &str,
    start: chrono::DateTime<Utc>,
    end: Option<chrono::DateTime<Utc>>,
    category_id: &str,
    livestream: Option<&str>,
) -> Event {
    Event {
        id: id.to_string(),
        title: title.to_string(),
        description: "<p>Sample event for trying the client offline.</p>".to_string(),
        organizer: organizer.to_string(),
        location: location.to_string(),
        start_time: start,
        end_time: end,
        status: EventStatus::Confirmed,
        event_type_id: Some(category_id.to_string()),
        source_url: "https://techcalendar.app".to_string(),
        livestream_url: livestream.map(String::from),
    }
}
