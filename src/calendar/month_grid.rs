use chrono::{Datelike, NaiveDate};

/// One position in the month view, tagged with whether it belongs to the
/// displayed month. Identity is positional only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayCell {
    pub day: u32,
    pub in_month: bool,
}

/// Builds the flat Sunday-first cell sequence for a month view: trailing
/// days of the previous month, all days of the target month, then leading
/// days of the next month padding to 35 cells, or 42 when the month spills
/// into a sixth week.
pub fn build_month_grid(year: i32, month: u32) -> Vec<DayCell> {
    let Some(first_day) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return Vec::new();
    };

    let leading = first_day.weekday().num_days_from_sunday() as usize;
    let current = days_in_month(year, month);
    let (prev_year, prev_month) = if month == 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    };
    let prev_days = days_in_month(prev_year, prev_month);

    let mut cells = Vec::with_capacity(42);

    for i in 0..leading {
        cells.push(DayCell {
            day: prev_days - (leading - 1 - i) as u32,
            in_month: false,
        });
    }

    for day in 1..=current {
        cells.push(DayCell {
            day,
            in_month: true,
        });
    }

    // The row count depends on the actual leading+current total; a 31-day
    // month starting on Saturday needs the sixth row.
    let total = if cells.len() <= 35 { 35 } else { 42 };
    let mut next_day = 1;
    while cells.len() < total {
        cells.push(DayCell {
            day: next_day,
            in_month: false,
        });
        next_day += 1;
    }

    cells
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let first = NaiveDate::from_ymd_opt(year, month, 1);
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    match (first, next) {
        (Some(a), Some(b)) => (b - a).num_days() as u32,
        _ => 0,
    }
}
