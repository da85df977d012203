//! Domain types for RegLab

pub mod category;
pub mod observation;
pub mod period;
pub mod state;

pub use category::Category;
pub use observation::{Observation, ObservationTable, ProcessedRow, ProcessedTable, SeriesKey};
pub use period::{month_name, weekday_name, MonthKey, PeriodParseError, QuarterKey, WeekKey};
pub use state::{State, DEFAULT_STATES};
