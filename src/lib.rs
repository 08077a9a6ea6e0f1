pub mod app;
pub mod backend;
pub mod calendar;
pub mod input;
pub mod storage;
pub mod ui;

pub use app::{AppState, Mode, SyncStatus, ViewState, ViewType};
pub use calendar::{Category, EnrichedEvent, Event, EventStatus};
