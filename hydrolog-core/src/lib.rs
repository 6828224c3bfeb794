//! Hydrolog Core Library
//!
//! Packed word records for fluids, entries and daily logs, the calendar
//! arithmetic that addresses them, and the [`Tracker`] front ends call into.

pub mod calendar;
pub mod codec;
pub mod error;
pub mod models;
pub mod registry;
pub mod store;
pub mod tracker;
pub mod units;

pub use calendar::{days_in_month, storage_key, storage_key_for_day, CalendarGrid, GridCell, Month};
pub use codec::{DecodeError, WordReader};
pub use error::{Error, Result};
pub use models::{
    Color, DailyLog, DayView, Entry, EntryView, Fluid, FluidId, Preferences, MAX_NAME_LEN,
};
pub use registry::FluidRegistry;
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError, FLUIDS_KEY, PREFERENCES_KEY};
pub use tracker::Tracker;
pub use units::{convert, format_amount, format_time, Amount, Unit, ML_PER_OZ};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
