use chrono::{Datelike, Days, NaiveDate};
use crossterm::event::KeyCode;

use crate::app::{AppState, Mode, ViewType};
use crate::input::Action;

pub fn handle_key(key: KeyCode, state: &mut AppState) -> Option<Action> {
    if state.show_help {
        if matches!(key, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            state.show_help = false;
        }
        return None;
    }

    if state.detail_event_id.is_some() {
        return handle_detail_key(key, state);
    }

    if state.view_state.view == ViewType::Dashboard {
        if matches!(key, KeyCode::Esc | KeyCode::Char('d') | KeyCode::Char('q')) {
            state.view_state.view = ViewType::Month;
        }
        return None;
    }

    match key {
        KeyCode::Char('h') | KeyCode::Left => state.move_day(-1),
        KeyCode::Char('l') | KeyCode::Right => state.move_day(1),
        KeyCode::Char('j') | KeyCode::Down => {
            if state.events_for_selected_day().is_empty() {
                state.move_day(7);
            } else {
                state.move_event_selection_down();
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            if state.events_for_selected_day().is_empty() {
                state.move_day(-7);
            } else {
                state.move_event_selection_up();
            }
        }
        KeyCode::Char('t') => state.go_to_today(),
        KeyCode::Char('{') | KeyCode::Char('[') => state.prev_month(),
        KeyCode::Char('}') | KeyCode::Char(']') => state.next_month(),
        KeyCode::Char('g') => move_to_start_of_month(state),
        KeyCode::Char('G') => move_to_end_of_month(state),
        KeyCode::Char('/') => enter_search_mode(state),
        KeyCode::Char('a') => state.select_all_categories(),
        KeyCode::Char('x') => state.clear_categories(),
        KeyCode::Char(c @ '1'..='9') => toggle_category_by_index(state, c),
        KeyCode::Enter | KeyCode::Char('i') => open_event_detail(state),
        KeyCode::Char('d') => {
            state.view_state.view = ViewType::Dashboard;
            return Some(Action::LoadDashboard);
        }
        KeyCode::Char('r') => return Some(Action::Reload),
        KeyCode::Char('?') => state.show_help = true,
        _ => {}
    }
    None
}

/// Keys while an event's detail panel is open. Export and tracking live
/// here because they act on the opened event.
fn handle_detail_key(key: KeyCode, state: &mut AppState) -> Option<Action> {
    let event_id = state.detail_event_id.clone()?;

    match key {
        KeyCode::Esc | KeyCode::Char('q') => {
            state.detail_event_id = None;
            None
        }
        KeyCode::Char('t') => Some(Action::ToggleTrack(event_id)),
        KeyCode::Char('g') => Some(Action::CopyGoogleUrl(event_id)),
        KeyCode::Char('i') => Some(Action::SaveIcs(event_id)),
        KeyCode::Char('y') => Some(Action::CopyLink(event_id)),
        _ => None,
    }
}

fn enter_search_mode(state: &mut AppState) {
    state.mode = Mode::Search;
    state.view_state.search_term.clear();
    state.suggestion_index = None;
}

fn toggle_category_by_index(state: &mut AppState, digit: char) {
    let index = digit as usize - '1' as usize;
    if let Some(category) = state.categories.get(index) {
        let id = category.id.clone();
        state.toggle_category(&id);
    }
}

fn open_event_detail(state: &mut AppState) {
    if let Some(selected) = state.selected_event() {
        state.detail_event_id = Some(selected.event.id.clone());
    }
}

fn move_to_start_of_month(state: &mut AppState) {
    let date = state.view_state.selected_date;
    if let Some(first) = NaiveDate::from_ymd_opt(date.year(), date.month(), 1) {
        state.view_state.selected_date = first;
        state.reset_event_selection();
    }
}

fn move_to_end_of_month(state: &mut AppState) {
    let date = state.view_state.selected_date;
    let next_month_first = if date.month() == 12 {
        NaiveDate::from_ymd_opt(date.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(date.year(), date.month() + 1, 1)
    };

    if let Some(first) = next_month_first
        && let Some(last_day) = first.checked_sub_days(Days::new(1))
    {
        state.view_state.selected_date = last_day;
        state.reset_event_selection();
    }
}
