//! Types that represent the core data model, such as `WorkEntry` and `Theme`.
mod entry;
mod month;
mod theme;

pub use entry::{parse_year, EntryForm, EntryId, NewEntry, PersonChoice, WorkEntry};
pub use month::{month_index, MONTHS_ORDER};
pub use theme::Theme;
