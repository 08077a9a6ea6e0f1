use crate::calendar::event::EnrichedEvent;

pub const MAX_SUGGESTIONS: usize = 5;

/// Ranks search suggestions for the query: title matches first, then
/// organizer-only matches, first-seen order preserved, deduplicated by id,
/// capped at [`MAX_SUGGESTIONS`]. An empty query never suggests.
pub fn suggest<'a>(query: &str, events: &'a [EnrichedEvent]) -> Vec<&'a EnrichedEvent> {
    if query.is_empty() {
        return Vec::new();
    }
    let needle = query.to_lowercase();

    let mut seen: Vec<&str> = Vec::new();
    let mut suggestions: Vec<&EnrichedEvent> = Vec::new();

    let title_pool = events
        .iter()
        .filter(|e| e.event.title.to_lowercase().contains(&needle));
    let organizer_pool = events
        .iter()
        .filter(|e| e.event.organizer.to_lowercase().contains(&needle));

    for candidate in title_pool.chain(organizer_pool) {
        if seen.contains(&candidate.event.id.as_str()) {
            continue;
        }
        seen.push(&candidate.event.id);
        suggestions.push(candidate);
        if suggestions.len() == MAX_SUGGESTIONS {
            break;
        }
    }

    suggestions
}
