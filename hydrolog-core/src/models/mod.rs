mod daily_log;
mod entry;
mod fluid;
mod preferences;

pub use daily_log::{DailyLog, DayView};
pub use entry::{Entry, EntryView, ENTRY_WORDS};
pub use fluid::{Color, Fluid, FluidId, MAX_NAME_LEN, RECORD_SEPARATOR};
pub use preferences::Preferences;
