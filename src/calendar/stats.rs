use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Datelike, NaiveDate, Utc};

/// One attended tracked-event row with its category resolved through the
/// store. Input to every dashboard aggregation.
#[derive(Debug, Clone, PartialEq)]
pub struct AttendedEvent {
    pub attended_at: DateTime<Utc>,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct YearlyStats {
    pub total: usize,
    pub top_category: Option<String>,
}

/// Counts this calendar year's attended events and picks the top category.
/// Equal counts break lexically by category name.
pub fn yearly_stats(events: &[AttendedEvent], now: DateTime<Utc>) -> YearlyStats {
    let year = now.year();
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    let mut total = 0;

    for event in events.iter().filter(|e| e.attended_at.year() == year) {
        total += 1;
        *counts.entry(event.category.as_str()).or_insert(0) += 1;
    }

    // BTreeMap iteration is name-ascending, so keeping strictly-greater
    // counts makes the lexically smallest name win ties.
    let mut top: Option<(&str, usize)> = None;
    for (name, count) in counts {
        if top.map(|(_, best)| count > best).unwrap_or(true) {
            top = Some((name, count));
        }
    }

    YearlyStats {
        total,
        top_category: top.map(|(name, _)| name.to_string()),
    }
}

/// One month's stacked category counts for the growth chart.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyBucket {
    pub year: i32,
    pub month: u32,
    pub label: String,
    pub counts: BTreeMap<String, usize>,
}

/// Groups attended events into per-month, per-category counts, labelled
/// `"<ShortMonth> <Year>"` and sorted chronologically.
pub fn monthly_series(events: &[AttendedEvent]) -> Vec<MonthlyBucket> {
    let mut by_month: BTreeMap<(i32, u32), BTreeMap<String, usize>> = BTreeMap::new();

    for event in events {
        let key = (event.attended_at.year(), event.attended_at.month());
        *by_month
            .entry(key)
            .or_default()
            .entry(event.category.clone())
            .or_insert(0) += 1;
    }

    by_month
        .into_iter()
        .map(|((year, month), counts)| {
            let label = NaiveDate::from_ymd_opt(year, month, 1)
                .map(|d| d.format("%b %Y").to_string())
                .unwrap_or_else(|| format!("{}-{:02}", year, month));
            MonthlyBucket {
                year,
                month,
                label,
                counts,
            }
        })
        .collect()
}

/// Counts consecutive calendar months with at least one attended event,
/// walking backward from the current month and stopping at the first gap.
pub fn attendance_streak(events: &[AttendedEvent], today: NaiveDate) -> u32 {
    let attended_months: HashSet<(i32, u32)> = events
        .iter()
        .map(|e| (e.attended_at.year(), e.attended_at.month()))
        .collect();

    let mut streak = 0;
    let mut year = today.year();
    let mut month = today.month();

    while attended_months.contains(&(year, month)) {
        streak += 1;
        if month == 1 {
            year -= 1;
            month = 12;
        } else {
            month -= 1;
        }
    }

    streak
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::event::test_support::utc;
    use pretty_assertions::assert_eq;

    fn attended(y: i32, m: u32, d: u32, category: &str) -> AttendedEvent {
        AttendedEvent {
            attended_at: utc(y, m, d, 12, 0),
            category: category.to_string(),
        }
    }

    #[test]
    fn yearly_stats_count_current_year_only() {
        let events = vec![
            attended(2024, 3, 1, "AI & ML"),
            attended(2024, 5, 2, "Web Dev"),
            attended(2023, 11, 9, "AI & ML"),
        ];

        let stats = yearly_stats(&events, utc(2024, 6, 15, 0, 0));

        assert_eq!(stats.total, 2);
    }

    #[test]
    fn top_category_is_most_frequent() {
        let events = vec![
            attended(2024, 1, 5, "AI & ML"),
            attended(2024, 2, 5, "AI & ML"),
            attended(2024, 3, 5, "Cloud"),
        ];

        let stats = yearly_stats(&events, utc(2024, 6, 15, 0, 0));

        assert_eq!(stats.top_category.as_deref(), Some("AI & ML"));
    }

    #[test]
    fn top_category_ties_break_alphabetically() {
        let events = vec![
            attended(2024, 1, 5, "Web Dev"),
            attended(2024, 2, 5, "Cloud"),
        ];

        let stats = yearly_stats(&events, utc(2024, 6, 15, 0, 0));

        assert_eq!(stats.top_category.as_deref(), Some("Cloud"));
    }

    #[test]
    fn no_attended_events_means_no_top_category() {
        let stats = yearly_stats(&[], utc(2024, 6, 15, 0, 0));

        assert_eq!(stats.total, 0);
        assert_eq!(stats.top_category, None);
    }

    #[test]
    fn monthly_series_is_chronological_with_short_labels() {
        let events = vec![
            attended(2024, 2, 10, "Cloud"),
            attended(2023, 12, 1, "AI & ML"),
            attended(2024, 2, 20, "AI & ML"),
        ];

        let series = monthly_series(&events);

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].label, "Dec 2023");
        assert_eq!(series[1].label, "Feb 2024");
        assert_eq!(series[1].counts.get("AI & ML"), Some(&1));
        assert_eq!(series[1].counts.get("Cloud"), Some(&1));
    }

    #[test]
    fn streak_counts_consecutive_months_back_from_today() {
        // Current month plus the two before it, then a gap.
        let events = vec![
            attended(2024, 6, 3, "Cloud"),
            attended(2024, 5, 20, "AI & ML"),
            attended(2024, 4, 2, "Cloud"),
            attended(2024, 2, 14, "Cloud"),
        ];

        let streak = attendance_streak(&events, NaiveDate::from_ymd_opt(2024, 6, 15).unwrap());

        assert_eq!(streak, 3);
    }

    #[test]
    fn streak_is_zero_when_current_month_is_empty() {
        let events = vec![attended(2024, 5, 20, "AI & ML")];

        let streak = attendance_streak(&events, NaiveDate::from_ymd_opt(2024, 7, 1).unwrap());

        assert_eq!(streak, 0);
    }

    #[test]
    fn streak_crosses_year_boundaries() {
        let events = vec![
            attended(2024, 1, 10, "Cloud"),
            attended(2023, 12, 10, "Cloud"),
            attended(2023, 11, 10, "Cloud"),
        ];

        let streak = attendance_streak(&events, NaiveDate::from_ymd_opt(2024, 1, 20).unwrap());

        assert_eq!(streak, 3);
    }
}
