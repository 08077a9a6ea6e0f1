mod authentication;
mod calendar_views;
mod dashboard;
mod dialogs;
mod event_detail;
mod presentation;
mod sample_events;
mod session;

pub use authentication::check_or_setup_auth;
pub use session::run_tui;
