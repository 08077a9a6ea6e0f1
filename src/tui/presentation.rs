use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Modifier, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use techcal::app::{AppState, Mode, SyncStatus, ViewType};

use crate::tui::{calendar_views, dashboard, dialogs, event_detail};

pub fn ui(f: &mut Frame, app: &AppState) {
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.size());

    render_header(f, app, main_chunks[0]);

    match app.view_state.view {
        ViewType::Month => {
            let content_chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
                .split(main_chunks[1]);

            calendar_views::month::render(f, app, content_chunks[0]);
            calendar_views::day_panel::render(f, app, content_chunks[1]);
        }
        ViewType::Dashboard => dashboard::render(f, app, main_chunks[1]),
    }

    render_status_bar(f, app, main_chunks[2]);

    if app.show_help {
        dialogs::help::render(f, app);
    }

    if app.detail_event_id.is_some() {
        event_detail::render(f, app);
    }
}

fn render_header(f: &mut Frame, app: &AppState, area: ratatui::layout::Rect) {
    let (total, upcoming) = app.header_stats();
    let user = app
        .signed_in_as
        .as_deref()
        .map(|name| format!(" \u{00b7} {}", name))
        .unwrap_or_default();

    let title = Paragraph::new(format!(
        "techcal \u{00b7} {} events, {} upcoming{}",
        total, upcoming, user
    ))
    .style(
        Style::default()
            .fg(app.theme.title)
            .add_modifier(Modifier::BOLD),
    )
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, area);
}

fn render_status_bar(f: &mut Frame, app: &AppState, area: ratatui::layout::Rect) {
    let (text, color, alignment) = if app.mode == Mode::Search {
        (
            search_line(app),
            app.theme.status_bar,
            Alignment::Left,
        )
    } else if let Some(message) = &app.status_message {
        (message.clone(), app.theme.success, Alignment::Center)
    } else {
        let sync_label = match &app.sync_status {
            SyncStatus::Synced => "online".to_string(),
            SyncStatus::Syncing => "loading...".to_string(),
            SyncStatus::Offline => "offline (cached)".to_string(),
            SyncStatus::Error(e) => format!("error: {}", e),
        };
        (
            format!("{} | 'q' to quit, '?' for help", sync_label),
            if matches!(app.sync_status, SyncStatus::Error(_)) {
                app.theme.error
            } else {
                app.theme.status_bar
            },
            Alignment::Center,
        )
    };

    let status = Paragraph::new(text)
        .style(Style::default().fg(color))
        .alignment(alignment)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(status, area);
}

/// The search prompt plus its suggestion strip, highlighted suggestion in
/// reverse video.
fn search_line(app: &AppState) -> String {
    let mut line = format!("/{}", app.view_state.search_term);
    let suggestions = app.suggestions();
    if !suggestions.is_empty() {
        let rendered: Vec<String> = suggestions
            .iter()
            .enumerate()
            .map(|(i, s)| {
                if Some(i) == app.suggestion_index {
                    format!("[{}]", s.event.title)
                } else {
                    s.event.title.clone()
                }
            })
            .collect();
        line.push_str("  \u{2192} ");
        line.push_str(&rendered.join(" | "));
    }
    line
}
