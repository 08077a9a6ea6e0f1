use chrono::{Datelike, Days, Local, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::calendar::event::{enrich, filter_visible};
use crate::calendar::month_grid::days_in_month;
use crate::calendar::search::suggest;
use crate::calendar::stats::AttendedEvent;
use crate::calendar::{Category, EnrichedEvent, Event};
use crate::ui::theme::Theme;

#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    Normal,
    Search,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ViewType {
    Month,
    Dashboard,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SyncStatus {
    Synced,
    Syncing,
    Offline,
    Error(String),
}

/// Everything that determines what the calendar shows, kept separate from
/// transient UI state so it can be serialized and restored as one value.
/// Rendering is a pure function of this plus the loaded catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub selected_date: NaiveDate,
    pub selected_categories: HashSet<String>,
    pub search_term: String,
    pub view: ViewType,
}

impl ViewState {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            selected_date: today,
            selected_categories: HashSet::new(),
            search_term: String::new(),
            view: ViewType::Month,
        }
    }

    pub fn year(&self) -> i32 {
        self.selected_date.year()
    }

    pub fn month(&self) -> u32 {
        self.selected_date.month()
    }
}

pub struct AppState {
    pub mode: Mode,
    pub view_state: ViewState,
    pub events: Vec<Event>,
    pub categories: Vec<Category>,
    pub tracked: HashSet<String>,
    pub attended: Vec<AttendedEvent>,
    pub sync_status: SyncStatus,
    pub show_help: bool,
    pub theme: Theme,
    pub selected_event_index: usize,
    pub detail_event_id: Option<String>,
    pub suggestion_index: Option<usize>,
    pub status_message: Option<String>,
    pub signed_in_as: Option<String>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            mode: Mode::Normal,
            view_state: ViewState::new(Local::now().date_naive()),
            events: Vec::new(),
            categories: Vec::new(),
            tracked: HashSet::new(),
            attended: Vec::new(),
            sync_status: SyncStatus::Synced,
            show_help: false,
            theme: Theme::default(),
            selected_event_index: 0,
            detail_event_id: None,
            suggestion_index: None,
            status_message: None,
            signed_in_as: None,
        }
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Replaces the loaded catalog. Every category starts selected so a
    /// fresh view shows everything.
    pub fn set_catalog(&mut self, events: Vec<Event>, categories: Vec<Category>) {
        self.view_state.selected_categories =
            categories.iter().map(|c| c.id.clone()).collect();
        self.events = events;
        self.categories = categories;
    }

    fn enriched(&self) -> Vec<EnrichedEvent> {
        enrich(&self.events, &self.categories)
    }

    /// The derivation pipeline's first two stages: category join, then
    /// filtering by selection and search term.
    pub fn visible_events(&self) -> Vec<EnrichedEvent> {
        filter_visible(
            &self.enriched(),
            &self.view_state.selected_categories,
            &self.view_state.search_term,
        )
    }

    pub fn toggle_category(&mut self, category_id: &str) {
        if !self.view_state.selected_categories.remove(category_id) {
            self.view_state
                .selected_categories
                .insert(category_id.to_string());
        }
        self.reset_event_selection();
    }

    pub fn select_all_categories(&mut self) {
        self.view_state.selected_categories =
            self.categories.iter().map(|c| c.id.clone()).collect();
        self.reset_event_selection();
    }

    pub fn clear_categories(&mut self) {
        self.view_state.selected_categories.clear();
        self.reset_event_selection();
    }

    pub fn next_month(&mut self) {
        self.shift_months(Months::new(1), true);
    }

    pub fn prev_month(&mut self) {
        self.shift_months(Months::new(1), false);
    }

    fn shift_months(&mut self, months: Months, forward: bool) {
        let date = self.view_state.selected_date;
        let shifted = if forward {
            date.checked_add_months(months)
        } else {
            date.checked_sub_months(months)
        };
        if let Some(new_date) = shifted {
            self.view_state.selected_date = new_date;
            self.reset_event_selection();
        }
    }

    pub fn go_to_today(&mut self) {
        self.view_state.selected_date = Local::now().date_naive();
        self.reset_event_selection();
    }

    pub fn move_day(&mut self, days: i64) {
        let date = self.view_state.selected_date;
        let shifted = if days >= 0 {
            date.checked_add_days(Days::new(days as u64))
        } else {
            date.checked_sub_days(Days::new((-days) as u64))
        };
        if let Some(new_date) = shifted {
            self.view_state.selected_date = new_date;
            self.reset_event_selection();
        }
    }

    pub fn select_day(&mut self, day: u32) {
        let date = self.view_state.selected_date;
        let clamped = day.min(days_in_month(date.year(), date.month()));
        if let Some(new_date) = NaiveDate::from_ymd_opt(date.year(), date.month(), clamped) {
            self.view_state.selected_date = new_date;
            self.reset_event_selection();
        }
    }

    /// Visible events starting on the selected day, soonest first.
    pub fn events_for_selected_day(&self) -> Vec<EnrichedEvent> {
        let date = self.view_state.selected_date;
        let mut events: Vec<EnrichedEvent> = self
            .visible_events()
            .into_iter()
            .filter(|e| e.event.start_time.date_naive() == date)
            .collect();
        events.sort_by_key(|e| e.event.start_time);
        events
    }

    pub fn selected_event(&self) -> Option<EnrichedEvent> {
        self.events_for_selected_day()
            .into_iter()
            .nth(self.selected_event_index)
    }

    pub fn move_event_selection_down(&mut self) {
        let event_count = self.events_for_selected_day().len();
        if event_count > 0 && self.selected_event_index < event_count - 1 {
            self.selected_event_index += 1;
        }
    }

    pub fn move_event_selection_up(&mut self) {
        if self.selected_event_index > 0 {
            self.selected_event_index -= 1;
        }
    }

    pub fn reset_event_selection(&mut self) {
        self.selected_event_index = 0;
    }

    pub fn detail_event(&self) -> Option<EnrichedEvent> {
        let id = self.detail_event_id.as_deref()?;
        self.enriched().into_iter().find(|e| e.event.id == id)
    }

    pub fn suggestions(&self) -> Vec<EnrichedEvent> {
        let enriched = self.enriched();
        suggest(&self.view_state.search_term, &enriched)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn move_suggestion(&mut self, down: bool) {
        let count = self.suggestions().len();
        if count == 0 {
            self.suggestion_index = None;
            return;
        }
        self.suggestion_index = Some(match (self.suggestion_index, down) {
            (None, true) => 0,
            (None, false) => count - 1,
            (Some(i), true) => (i + 1) % count,
            (Some(i), false) => (i + count - 1) % count,
        });
    }

    /// Jumps the calendar to the highlighted suggestion's event and opens
    /// its detail view.
    pub fn accept_suggestion(&mut self) {
        let suggestions = self.suggestions();
        let Some(index) = self.suggestion_index else {
            return;
        };
        if let Some(chosen) = suggestions.get(index) {
            self.view_state.selected_date = chosen.event.start_time.date_naive();
            self.detail_event_id = Some(chosen.event.id.clone());
            self.view_state.search_term.clear();
            self.suggestion_index = None;
            self.mode = Mode::Normal;
            self.reset_event_selection();
        }
    }

    pub fn is_tracked(&self, event_id: &str) -> bool {
        self.tracked.contains(event_id)
    }

    /// Header counters: how many events pass the filters, and how many of
    /// those are still in the future.
    pub fn header_stats(&self) -> (usize, usize) {
        let now = Utc::now();
        let visible = self.visible_events();
        let upcoming = visible
            .iter()
            .filter(|e| e.event.start_time > now)
            .count();
        (visible.len(), upcoming)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
