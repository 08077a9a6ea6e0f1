use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event as TermEvent, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use techcal::{
    app::{AppState, Mode, SyncStatus, ViewType},
    backend::service::BackendService,
    calendar::export::{event_link, google_calendar_url, ics_payload},
    input::{normal_mode, search_mode, Action},
    storage::cache::Cache,
    storage::config::{BackendConfig, Config},
    ui::theme::Theme,
};

use crate::tui::{presentation::ui, sample_events::add_sample_events};

/// Redraw cadence while idle. Countdowns tick every second, so the idle
/// poll has to wake often enough to keep them fresh.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

pub async fn run_tui(sample: bool) -> Result<(), io::Error> {
    let config = Config::load_or_create().map_err(|e| io::Error::other(e.to_string()))?;
    // Sample mode runs fully offline, so no backend configuration needed.
    let backend = if sample {
        BackendConfig {
            base_url: String::new(),
            anon_key: String::new(),
        }
    } else {
        BackendConfig::from_env().map_err(|e| io::Error::other(e.to_string()))?
    };

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend_term = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend_term)?;

    let theme = Theme::get_by_name(&config.ui.theme);
    let mut app = AppState::new().with_theme(theme);

    let mut service = BackendService::new(backend, config.storage.session_cache.clone());
    let mut cache = Cache::open(&config.storage.offline_cache).ok();

    app.sync_status = SyncStatus::Syncing;
    terminal.draw(|f| ui(f, &app)).ok();

    if sample {
        add_sample_events(&mut app);
        app.sync_status = SyncStatus::Synced;
    } else {
        if let Ok(session) = service.auth().get_valid_session().await {
            app.signed_in_as = Some(session.display_name());
            service.ensure_profile().await.ok();
        }
        load_catalog(&mut app, &mut service, cache.as_mut()).await;
    }

    if app.signed_in_as.is_some()
        && let Ok(tracked) = service.load_tracked().await
    {
        app.tracked = tracked;
    }

    let res = run_app(&mut terminal, &mut app, service, cache).await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {:?}", err);
    }

    Ok(())
}

/// Fetches the catalog, falling back to the offline snapshot when the
/// server is unreachable.
async fn load_catalog(app: &mut AppState, service: &mut BackendService, cache: Option<&mut Cache>) {
    match service.load_catalog().await {
        Ok((events, categories)) => {
            if let Some(cache) = cache {
                if let Err(e) = cache.store_snapshot(&events, &categories) {
                    tracing::warn!("Failed to write offline cache: {}", e);
                }
            }
            app.set_catalog(events, categories);
            app.sync_status = SyncStatus::Synced;
        }
        Err(e) => {
            tracing::warn!("Catalog fetch failed, trying offline cache: {}", e);
            let cached = cache.and_then(|cache| {
                let events = cache.load_events().ok()?;
                let categories = cache.load_categories().ok()?;
                Some((events, categories))
            });
            match cached {
                Some((events, categories)) if !events.is_empty() => {
                    app.set_catalog(events, categories);
                    app.sync_status = SyncStatus::Offline;
                }
                _ => {
                    app.sync_status = SyncStatus::Error(format!("Load failed: {}", e));
                }
            }
        }
    }
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut AppState,
    mut service: BackendService,
    mut cache: Option<Cache>,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        // Timeouts fall through to the next draw, which advances the
        // countdowns and pulse states.
        if !event::poll(POLL_INTERVAL)? {
            continue;
        }

        if let TermEvent::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            app.status_message = None;

            let action = match app.mode {
                Mode::Normal => {
                    if key.code == KeyCode::Char('q') && can_quit(app) {
                        return Ok(());
                    }
                    normal_mode::handle_key(key.code, app)
                }
                Mode::Search => {
                    search_mode::handle_key(key.code, app);
                    None
                }
            };

            if let Some(action) = action {
                perform_action(action, app, &mut service, cache.as_mut(), terminal).await?;
            }
        }
    }
}

fn can_quit(app: &AppState) -> bool {
    !app.show_help
        && app.detail_event_id.is_none()
        && app.view_state.view == ViewType::Month
}

async fn perform_action<B: ratatui::backend::Backend>(
    action: Action,
    app: &mut AppState,
    service: &mut BackendService,
    cache: Option<&mut Cache>,
    terminal: &mut Terminal<B>,
) -> io::Result<()> {
    match action {
        Action::Reload => {
            app.sync_status = SyncStatus::Syncing;
            terminal.draw(|f| ui(f, app))?;
            load_catalog(app, service, cache).await;
        }
        Action::LoadDashboard => {
            if app.signed_in_as.is_none() {
                app.status_message =
                    Some("Sign in to see your dashboard.".to_string());
                app.view_state.view = ViewType::Month;
                return Ok(());
            }
            match service.load_dashboard().await {
                Ok(attended) => app.attended = attended,
                Err(e) => {
                    tracing::error!("Dashboard load failed: {}", e);
                    app.status_message = Some(format!("Dashboard load failed: {}", e));
                    app.view_state.view = ViewType::Month;
                }
            }
        }
        Action::ToggleTrack(event_id) => toggle_track(app, service, &event_id).await,
        Action::CopyGoogleUrl(event_id) => {
            if let Some(event) = app.events.iter().find(|e| e.id == event_id) {
                let url = google_calendar_url(event);
                copy_to_clipboard(app, &url, "Google Calendar link copied.");
            }
        }
        Action::SaveIcs(event_id) => {
            if let Some(event) = app.events.iter().find(|e| e.id == event_id) {
                let payload = ics_payload(event, chrono::Utc::now());
                let filename = ics_filename(&event.title);
                match std::fs::write(&filename, payload) {
                    Ok(()) => {
                        app.status_message = Some(format!("Saved {}", filename));
                    }
                    Err(e) => {
                        tracing::error!("Failed to write {}: {}", filename, e);
                        app.status_message = Some(format!("Save failed: {}", e));
                    }
                }
            }
        }
        Action::CopyLink(event_id) => {
            let url = event_link(&event_id);
            copy_to_clipboard(app, &url, "Event link copied.");
        }
    }
    Ok(())
}

async fn toggle_track(app: &mut AppState, service: &mut BackendService, event_id: &str) {
    if app.signed_in_as.is_none() {
        app.status_message = Some("Sign in to track events.".to_string());
        return;
    }

    let result = if app.is_tracked(event_id) {
        service.untrack_event(event_id).await.map(|()| {
            app.tracked.remove(event_id);
            "Removed from your events."
        })
    } else {
        // Tracking a past event means the user attended it.
        let attended = app
            .events
            .iter()
            .find(|e| e.id == event_id)
            .map(|e| e.start_time <= chrono::Utc::now())
            .unwrap_or(false);
        service.track_event(event_id, attended).await.map(|()| {
            app.tracked.insert(event_id.to_string());
            "Added to your events."
        })
    };

    match result {
        Ok(message) => app.status_message = Some(message.to_string()),
        Err(e) => {
            tracing::error!("Tracking update failed: {}", e);
            app.status_message = Some(format!("Tracking update failed: {}", e));
        }
    }
}

fn copy_to_clipboard(app: &mut AppState, text: &str, success_message: &str) {
    match arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(text)) {
        Ok(()) => app.status_message = Some(success_message.to_string()),
        Err(e) => {
            tracing::error!("Clipboard write failed: {}", e);
            app.status_message = Some(format!("Clipboard failed: {}", e));
        }
    }
}

fn ics_filename(title: &str) -> String {
    let slug: String = title
        .chars()
        .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect();
    format!("{}.ics", slug.trim_matches('-'))
}
