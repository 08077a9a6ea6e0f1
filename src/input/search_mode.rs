use crossterm::event::KeyCode;

use crate::app::{AppState, Mode};

pub fn handle_key(key: KeyCode, state: &mut AppState) {
    match key {
        KeyCode::Esc => leave_search(state),
        KeyCode::Enter => {
            if state.suggestion_index.is_some() {
                state.accept_suggestion();
            } else {
                // Keep the term as a live filter and go back to browsing.
                state.mode = Mode::Normal;
                state.suggestion_index = None;
            }
        }
        KeyCode::Down | KeyCode::Tab => state.move_suggestion(true),
        KeyCode::Up | KeyCode::BackTab => state.move_suggestion(false),
        KeyCode::Backspace => {
            state.view_state.search_term.pop();
            state.suggestion_index = None;
        }
        KeyCode::Char(c) => {
            state.view_state.search_term.push(c);
            state.suggestion_index = None;
        }
        _ => {}
    }
}

fn leave_search(state: &mut AppState) {
    state.view_state.search_term.clear();
    state.suggestion_index = None;
    state.mode = Mode::Normal;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::event::test_support::*;

    fn searching_state() -> AppState {
        let mut state = AppState::new();
        let mut wwdc = event_at("wwdc", "WWDC 2024", utc(2024, 6, 10, 17, 0), None);
        wwdc.event_type_id = Some("conf".to_string());
        state.set_catalog(vec![wwdc], vec![category("conf", "Conferences", "#007AFF")]);
        state.mode = Mode::Search;
        state
    }

    #[test]
    fn typed_characters_build_the_search_term() {
        let mut state = searching_state();

        handle_key(KeyCode::Char('w'), &mut state);
        handle_key(KeyCode::Char('w'), &mut state);

        assert_eq!(state.view_state.search_term, "ww");
    }

    #[test]
    fn backspace_shortens_the_search_term() {
        let mut state = searching_state();
        state.view_state.search_term = "wwd".to_string();

        handle_key(KeyCode::Backspace, &mut state);

        assert_eq!(state.view_state.search_term, "ww");
    }

    #[test]
    fn typing_resets_the_highlighted_suggestion() {
        let mut state = searching_state();
        state.view_state.search_term = "ww".to_string();
        state.move_suggestion(true);
        assert!(state.suggestion_index.is_some());

        handle_key(KeyCode::Char('d'), &mut state);

        assert!(state.suggestion_index.is_none());
    }

    #[test]
    fn esc_clears_the_term_and_leaves_search() {
        let mut state = searching_state();
        state.view_state.search_term = "wwdc".to_string();

        handle_key(KeyCode::Esc, &mut state);

        assert_eq!(state.mode, Mode::Normal);
        assert!(state.view_state.search_term.is_empty());
    }

    #[test]
    fn enter_without_highlight_keeps_the_filter() {
        let mut state = searching_state();
        state.view_state.search_term = "wwdc".to_string();

        handle_key(KeyCode::Enter, &mut state);

        assert_eq!(state.mode, Mode::Normal);
        assert_eq!(state.view_state.search_term, "wwdc");
    }

    #[test]
    fn enter_on_a_highlighted_suggestion_jumps_to_it() {
        let mut state = searching_state();
        state.view_state.search_term = "wwdc".to_string();
        handle_key(KeyCode::Down, &mut state);

        handle_key(KeyCode::Enter, &mut state);

        assert_eq!(state.detail_event_id.as_deref(), Some("wwdc"));
        assert_eq!(state.mode, Mode::Normal);
    }

    #[test]
    fn tab_cycles_through_suggestions() {
        let mut state = searching_state();
        state.view_state.search_term = "wwdc".to_string();

        handle_key(KeyCode::Tab, &mut state);
        assert_eq!(state.suggestion_index, Some(0));

        // Only one suggestion, so the cycle wraps back to it.
        handle_key(KeyCode::Tab, &mut state);
        assert_eq!(state.suggestion_index, Some(0));
    }
}
