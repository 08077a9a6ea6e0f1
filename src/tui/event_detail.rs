use std::sync::OnceLock;

use chrono::Utc;
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use regex::Regex;

use techcal::{
    app::AppState,
    calendar::countdown::countdown,
    calendar::status::classify_event,
    ui::theme::category_color,
};

pub fn render(f: &mut Frame, app: &AppState) {
    let Some(enriched) = app.detail_event() else {
        return;
    };
    let event = &enriched.event;
    let now = Utc::now();

    let area = f.size();
    let width = area.width.saturating_sub(10).min(80);
    let height = area.height.saturating_sub(4).min(30);
    let detail_area = ratatui::layout::Rect {
        x: (area.width.saturating_sub(width)) / 2,
        y: (area.height.saturating_sub(height)) / 2,
        width,
        height,
    };
    f.render_widget(Clear, detail_area);

    let badge = classify_event(&enriched, now);
    let category_name = event
        .event_type_id
        .as_deref()
        .and_then(|id| app.categories.iter().find(|c| c.id == id))
        .map(|c| c.name.clone());

    let mut lines = vec![Line::from(Span::styled(
        event.title.clone(),
        Style::default()
            .fg(category_color(&enriched.color))
            .add_modifier(Modifier::BOLD),
    ))];

    let mut meta = vec![Span::raw(
        event.start_time
            .format("%A, %B %d, %Y at %H:%M UTC")
            .to_string(),
    )];
    // Countdown and badge are mutually exclusive per event.
    if badge.is_none() {
        meta.push(Span::raw(format!(
            " \u{00b7} {}",
            countdown(event.start_time, event.end_time, now).display()
        )));
    } else {
        let badge_color = if badge.pulse {
            app.theme.live
        } else {
            app.theme.weekday_header
        };
        meta.push(Span::raw("  "));
        meta.push(Span::styled(
            format!("[{}]", badge.label()),
            Style::default().fg(badge_color).add_modifier(Modifier::BOLD),
        ));
    }
    lines.push(Line::from(meta));
    lines.push(Line::from(""));

    lines.push(detail_field("Organizer", &event.organizer, app));
    if !event.location.is_empty() {
        lines.push(detail_field("Location", &event.location, app));
    }
    if let Some(name) = category_name {
        lines.push(detail_field("Category", &name, app));
    }
    lines.push(detail_field("Status", event.status.label(), app));
    if app.is_tracked(&event.id) {
        lines.push(Line::from(Span::styled(
            "\u{2713} You're attending this event",
            Style::default().fg(app.theme.success),
        )));
    }

    if !event.description.is_empty() {
        lines.push(Line::from(""));
        for text_line in strip_html(&event.description).lines() {
            lines.push(Line::from(text_line.to_string()));
        }
    }

    if !event.source_url.is_empty() {
        lines.push(Line::from(""));
        lines.push(detail_field("More info", &event.source_url, app));
    }
    if let Some(stream) = &event.livestream_url {
        lines.push(detail_field("Livestream", stream, app));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "t = track/untrack | g = copy Google Calendar link | i = save .ics | y = copy link | Esc = close",
        Style::default().fg(app.theme.inactive_day),
    )));

    let detail = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Event details ")
                .style(Style::default().bg(Color::Black)),
        );
    f.render_widget(detail, detail_area);
}

fn detail_field(label: &str, value: &str, app: &AppState) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("{}: ", label),
            Style::default().fg(app.theme.help_section),
        ),
        Span::raw(value.to_string()),
    ])
}

/// Event descriptions arrive as HTML. Anchors are expanded so their URLs
/// survive the conversion to plain text.
pub fn strip_html(html: &str) -> String {
    let normalized = expand_anchor_tags(html);
    html2text::from_read(normalized.as_bytes(), 1000)
}

fn expand_anchor_tags(html: &str) -> String {
    static LINK_RE: OnceLock<Regex> = OnceLock::new();
    let regex = LINK_RE.get_or_init(|| {
        Regex::new(r#"(?is)<a\s+[^>]*?href=["']([^"']+)["'][^>]*>(.*?)</a>"#)
            .expect("invalid anchor regex")
    });

    regex
        .replace_all(html, |caps: &regex::Captures| {
            let url = caps.get(1).map(|m| m.as_str()).unwrap_or_default().trim();
            let text = caps.get(2).map(|m| m.as_str()).unwrap_or_default().trim();

            if text.is_empty() || url.eq_ignore_ascii_case(text) {
                url.to_string()
            } else {
                format!("{text} ({url})")
            }
        })
        .into_owned()
}
