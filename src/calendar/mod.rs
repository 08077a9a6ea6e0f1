pub mod bucket;
pub mod countdown;
pub mod event;
pub mod export;
pub mod month_grid;
pub mod search;
pub mod stats;
pub mod status;

pub use event::{Category, EnrichedEvent, Event, EventStatus};
pub use month_grid::DayCell;
pub use status::{StatusBadge, StatusKind};
