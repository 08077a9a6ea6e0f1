use ratatui::{
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use techcal::app::AppState;

pub fn render(f: &mut Frame, app: &AppState) {
    let area = f.size();
    let help_width = 58;
    let help_height = 26;
    let x = (area.width.saturating_sub(help_width)) / 2;
    let y = (area.height.saturating_sub(help_height)) / 2;

    let help_area = ratatui::layout::Rect {
        x,
        y,
        width: help_width,
        height: help_height,
    };

    f.render_widget(Clear, help_area);

    let help_text = vec![
        Line::from(vec![Span::styled(
            "techcal Help",
            Style::default()
                .fg(app.theme.help_title)
                .add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Navigation:",
            Style::default().fg(app.theme.help_section),
        )]),
        Line::from("  h/l      - Previous/next day"),
        Line::from("  j/k      - Select events (or week if none)"),
        Line::from("  t        - Jump to today"),
        Line::from("  g/G      - First/last day of month"),
        Line::from("  { / }    - Previous/next month"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Filtering:",
            Style::default().fg(app.theme.help_section),
        )]),
        Line::from("  1-9      - Toggle category"),
        Line::from("  a / x    - Select all / clear categories"),
        Line::from("  /        - Search title or organizer"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Events:",
            Style::default().fg(app.theme.help_section),
        )]),
        Line::from("  Enter/i  - Open event details"),
        Line::from("  t        - Track/untrack (in details)"),
        Line::from("  g        - Copy Google Calendar link (in details)"),
        Line::from("  i        - Save .ics file (in details)"),
        Line::from("  y        - Copy event link (in details)"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Other:",
            Style::default().fg(app.theme.help_section),
        )]),
        Line::from("  d        - Dashboard (your attendance stats)"),
        Line::from("  r        - Reload from the server"),
        Line::from("  q        - Quit"),
    ];

    let help_paragraph = Paragraph::new(help_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Help (q to close) ")
                .style(Style::default().bg(Color::Black)),
        )
        .alignment(Alignment::Left);

    f.render_widget(help_paragraph, help_area);
}
