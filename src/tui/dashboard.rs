use chrono::{Datelike, Local, Utc};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use techcal::{
    app::AppState,
    calendar::stats::{attendance_streak, monthly_series, yearly_stats},
};

pub fn render(f: &mut Frame, app: &AppState, area: ratatui::layout::Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(7), Constraint::Min(0)])
        .split(area);

    render_summary(f, app, chunks[0]);
    render_growth_chart(f, app, chunks[1]);
}

fn render_summary(f: &mut Frame, app: &AppState, area: ratatui::layout::Rect) {
    let now = Utc::now();
    let stats = yearly_stats(&app.attended, now);
    let streak = attendance_streak(&app.attended, Local::now().date_naive());

    let lines = vec![
        Line::from(Span::styled(
            format!("Your {} in tech events", now.year()),
            Style::default()
                .fg(app.theme.title)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![
            Span::raw("Events attended this year: "),
            Span::styled(
                stats.total.to_string(),
                Style::default().fg(app.theme.success).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            Span::raw("Top category: "),
            Span::styled(
                stats.top_category.unwrap_or_else(|| "None yet".to_string()),
                Style::default().fg(app.theme.weekday_header),
            ),
        ]),
        Line::from(vec![
            Span::raw("Attendance streak: "),
            Span::styled(
                format!("{} month{}", streak, if streak == 1 { "" } else { "s" }),
                Style::default().fg(app.theme.today),
            ),
        ]),
    ];

    let summary = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Dashboard "));
    f.render_widget(summary, area);
}

/// Month-by-month attendance as horizontal bars, oldest first.
fn render_growth_chart(f: &mut Frame, app: &AppState, area: ratatui::layout::Rect) {
    let series = monthly_series(&app.attended);

    let mut lines = Vec::new();
    if series.is_empty() {
        lines.push(Line::from(Span::styled(
            "Track events to see your growth over time.",
            Style::default().fg(app.theme.inactive_day),
        )));
    }

    for bucket in &series {
        let total: usize = bucket.counts.values().sum();
        let bar_width = total.min(40);
        lines.push(Line::from(vec![
            Span::styled(
                format!("{:<9}", bucket.label),
                Style::default().fg(app.theme.status_bar),
            ),
            Span::styled(
                "\u{2588}".repeat(bar_width),
                Style::default().fg(app.theme.title),
            ),
            Span::raw(format!(" {}", total)),
        ]));

        let breakdown = bucket
            .counts
            .iter()
            .map(|(name, count)| format!("{} {}", name, count))
            .collect::<Vec<_>>()
            .join(", ");
        lines.push(Line::from(Span::styled(
            format!("          {}", breakdown),
            Style::default().fg(app.theme.inactive_day),
        )));
    }

    let chart = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Monthly attendance (Esc to close) "),
    );
    f.render_widget(chart, area);
}
