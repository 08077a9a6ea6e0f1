use chrono::{Datelike, NaiveDate, Utc};
use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use techcal::{
    app::AppState,
    calendar::bucket::events_for_day,
    calendar::month_grid::build_month_grid,
    calendar::status::day_status_dots,
    ui::theme::category_color,
};

const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

pub fn render(f: &mut Frame, app: &AppState, area: ratatui::layout::Rect) {
    let year = app.view_state.year();
    let month = app.view_state.month();
    let now = Utc::now();
    let today = chrono::Local::now().date_naive();

    let month_name = NaiveDate::from_ymd_opt(year, month, 1)
        .map(|d| d.format("%B %Y").to_string())
        .unwrap_or_else(|| format!("{}-{:02}", year, month));

    let visible = app.visible_events();
    let grid = build_month_grid(year, month);

    let mut lines = vec![
        Line::from(Span::styled(
            month_name,
            Style::default()
                .fg(app.theme.title)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(
            WEEKDAYS
                .iter()
                .map(|d| {
                    Span::styled(
                        format!(" {:<5}", d),
                        Style::default().fg(app.theme.weekday_header),
                    )
                })
                .collect::<Vec<_>>(),
        ),
    ];

    for week in grid.chunks(7) {
        let mut day_spans = Vec::new();
        let mut dot_spans = Vec::new();

        for cell in week {
            let day_events = events_for_day(&visible, year, month, *cell);
            let is_selected =
                cell.in_month && cell.day == app.view_state.selected_date.day();
            let is_today = cell.in_month
                && today.year() == year
                && today.month() == month
                && today.day() == cell.day;

            let mut style = Style::default();
            if !cell.in_month {
                style = style.fg(app.theme.inactive_day);
            } else if is_selected {
                style = style
                    .bg(app.theme.selected_bg)
                    .fg(app.theme.selected_fg)
                    .add_modifier(Modifier::BOLD);
            } else if is_today {
                style = style
                    .fg(app.theme.today)
                    .add_modifier(Modifier::BOLD);
            }

            day_spans.push(Span::styled(format!(" {:>2}   ", cell.day), style));
            dot_spans.extend(dot_row(app, &day_events, now));
        }

        lines.push(Line::from(day_spans));
        lines.push(Line::from(dot_spans));
    }

    let content = Paragraph::new(lines).block(Block::default().borders(Borders::ALL));
    f.render_widget(content, area);
}

/// One 6-wide cell of status dots, colored by the category of the event
/// that produced each badge. Pulsing badges use the live color.
fn dot_row<'a>(
    app: &AppState,
    day_events: &[&techcal::calendar::EnrichedEvent],
    now: chrono::DateTime<Utc>,
) -> Vec<Span<'a>> {
    use techcal::calendar::status::classify_event;

    let badges = day_status_dots(day_events, now);
    let mut spans = Vec::new();
    spans.push(Span::raw(" "));

    for badge in &badges {
        let color = if badge.pulse {
            app.theme.live
        } else {
            day_events
                .iter()
                .find(|e| classify_event(e, now).kind == badge.kind)
                .map(|e| category_color(&e.color))
                .unwrap_or(app.theme.inactive_day)
        };
        spans.push(Span::styled("\u{25cf}", Style::default().fg(color)));
    }

    for _ in badges.len()..5 {
        spans.push(Span::raw(" "));
    }
    spans
}
