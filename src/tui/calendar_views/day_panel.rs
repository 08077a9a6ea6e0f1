use chrono::Utc;
use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use techcal::{
    app::AppState,
    calendar::countdown::countdown,
    calendar::status::classify_event,
    ui::theme::category_color,
};

/// The panel next to the grid: every visible event on the selected day with
/// its badge and countdown.
pub fn render(f: &mut Frame, app: &AppState, area: ratatui::layout::Rect) {
    let now = Utc::now();
    let events = app.events_for_selected_day();
    let date_label = app
        .view_state
        .selected_date
        .format("%A, %B %d, %Y")
        .to_string();

    let mut lines = vec![
        Line::from(Span::styled(
            date_label,
            Style::default()
                .fg(app.theme.title)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];

    if events.is_empty() {
        lines.push(Line::from(Span::styled(
            "No events on this day.",
            Style::default().fg(app.theme.inactive_day),
        )));
    }

    for (index, enriched) in events.iter().enumerate() {
        let event = &enriched.event;
        let badge = classify_event(enriched, now);

        let mut title_style = Style::default().fg(category_color(&enriched.color));
        if index == app.selected_event_index {
            title_style = title_style
                .bg(app.theme.selected_bg)
                .add_modifier(Modifier::BOLD);
        }

        let mut spans = vec![
            Span::raw(format!("{} ", event.start_time.format("%H:%M"))),
            Span::styled(event.title.clone(), title_style),
        ];

        if !badge.is_none() {
            let badge_color = if badge.pulse {
                app.theme.live
            } else {
                app.theme.weekday_header
            };
            spans.push(Span::raw(" "));
            spans.push(Span::styled(
                format!("[{}]", badge.label()),
                Style::default().fg(badge_color).add_modifier(Modifier::BOLD),
            ));
        }

        if app.is_tracked(&event.id) {
            spans.push(Span::styled(
                " \u{2713}",
                Style::default().fg(app.theme.success),
            ));
        }

        lines.push(Line::from(spans));

        // Countdown and badge are mutually exclusive per event.
        let mut detail_line = format!("      {}", event.organizer);
        if badge.is_none() {
            detail_line.push_str(&format!(
                " \u{00b7} {}",
                countdown(event.start_time, event.end_time, now).display()
            ));
        }
        lines.push(Line::from(Span::styled(
            detail_line,
            Style::default().fg(app.theme.inactive_day),
        )));
    }

    let content = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Events (Enter = details, j/k = select) "),
    );
    f.render_widget(content, area);
}
