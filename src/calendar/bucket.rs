use chrono::NaiveDate;

use crate::calendar::event::EnrichedEvent;
use crate::calendar::month_grid::DayCell;

/// Selects the events whose inclusive `[start, end]` date span covers the
/// given cell's calendar day. Dates are truncated to UTC day granularity so
/// time-of-day never skews the bucket. Cells outside the displayed month
/// always yield the empty set.
pub fn events_for_day<'a>(
    events: &'a [EnrichedEvent],
    year: i32,
    month: u32,
    cell: DayCell,
) -> Vec<&'a EnrichedEvent> {
    if !cell.in_month {
        return Vec::new();
    }
    let Some(date) = NaiveDate::from_ymd_opt(year, month, cell.day) else {
        return Vec::new();
    };
    events_on_date(events, date)
}

pub fn events_on_date<'a>(events: &'a [EnrichedEvent], date: NaiveDate) -> Vec<&'a EnrichedEvent> {
    events
        .iter()
        .filter(|e| {
            let start = e.event.start_time.date_naive();
            // A malformed end before the start degenerates to the start day.
            let end = e.event.span_end().date_naive().max(start);
            date >= start && date <= end
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::event::test_support::*;
    use crate::calendar::event::enrich;
    use crate::calendar::month_grid::build_month_grid;

    fn in_cell(day: u32) -> DayCell {
        DayCell { day, in_month: true }
    }

    #[test]
    fn event_without_end_appears_on_exactly_one_day() {
        let events = enrich(
            &[event_at("e1", "Keynote", utc(2024, 6, 10, 17, 0), None)],
            &[category("cat1", "conf", "#007AFF")],
        );

        for day in 1..=30 {
            let bucket = events_for_day(&events, 2024, 6, in_cell(day));
            if day == 10 {
                assert_eq!(bucket.len(), 1);
            } else {
                assert!(bucket.is_empty(), "unexpected event on June {day}");
            }
        }
    }

    #[test]
    fn multi_day_event_appears_on_every_spanned_day() {
        let events = enrich(
            &[event_at(
                "e1",
                "WWDC",
                utc(2024, 6, 10, 9, 0),
                Some(utc(2024, 6, 14, 17, 0)),
            )],
            &[category("cat1", "conf", "#007AFF")],
        );

        for day in 10..=14 {
            assert_eq!(events_for_day(&events, 2024, 6, in_cell(day)).len(), 1);
        }
        assert!(events_for_day(&events, 2024, 6, in_cell(9)).is_empty());
        assert!(events_for_day(&events, 2024, 6, in_cell(15)).is_empty());
    }

    #[test]
    fn out_of_month_cells_are_always_empty() {
        let events = enrich(
            &[event_at("e1", "Launch", utc(2024, 5, 31, 10, 0), None)],
            &[category("cat1", "conf", "#007AFF")],
        );

        let cell = DayCell { day: 31, in_month: false };
        assert!(events_for_day(&events, 2024, 6, cell).is_empty());
    }

    #[test]
    fn late_evening_event_stays_on_its_utc_day() {
        let events = enrich(
            &[event_at("e1", "Launch", utc(2024, 6, 10, 23, 30), None)],
            &[category("cat1", "conf", "#007AFF")],
        );

        assert_eq!(events_for_day(&events, 2024, 6, in_cell(10)).len(), 1);
        assert!(events_for_day(&events, 2024, 6, in_cell(11)).is_empty());
    }

    #[test]
    fn negative_span_degenerates_to_start_day() {
        let events = enrich(
            &[event_at(
                "e1",
                "Broken",
                utc(2024, 6, 10, 9, 0),
                Some(utc(2024, 6, 8, 9, 0)),
            )],
            &[category("cat1", "conf", "#007AFF")],
        );

        assert_eq!(events_for_day(&events, 2024, 6, in_cell(10)).len(), 1);
        assert!(events_for_day(&events, 2024, 6, in_cell(8)).is_empty());
        assert!(events_for_day(&events, 2024, 6, in_cell(9)).is_empty());
    }

    #[test]
    fn grid_and_buckets_place_spanning_event_end_to_end() {
        // The end-to-end scenario: WWDC June 10-14 lands on exactly those
        // five cells of the June 2024 grid.
        let events = enrich(
            &[event_at(
                "e1",
                "WWDC",
                utc(2024, 6, 10, 0, 0),
                Some(utc(2024, 6, 14, 0, 0)),
            )],
            &[category("cat1", "conf", "#007AFF")],
        );

        let hits: Vec<u32> = build_month_grid(2024, 6)
            .into_iter()
            .filter(|cell| !events_for_day(&events, 2024, 6, *cell).is_empty())
            .map(|cell| cell.day)
            .collect();

        assert_eq!(hits, vec![10, 11, 12, 13, 14]);
    }
}
