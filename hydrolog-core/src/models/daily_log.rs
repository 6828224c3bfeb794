use chrono::{Local, Timelike};
use serde::Serialize;
use std::fmt;

use super::entry::{Entry, EntryView, ENTRY_WORDS};
use super::fluid::Fluid;
use crate::codec::{flag, DecodeError, WordReader};
use crate::error::Result;
use crate::registry::FluidRegistry;
use crate::store::KeyValueStore;
use crate::units::{self, Amount, Unit};

const HEADER_WORDS: usize = 2;

/// Everything drunk on one calendar day, with the goal for that day.
///
/// `total` is the hydration-weighted sum of the entries in the log's unit.
/// It is kept up to date as entries are registered and recomputed only when
/// a log is decoded; records never store it.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyLog {
    goal: Amount,
    unit: Unit,
    total: f64,
    entries: Vec<Entry>,
}

/// Display projection of a daily log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayView {
    pub goal: String,
    pub total: String,
    pub remaining: String,
    pub progress: f64,
    pub entries: Vec<EntryView>,
}

impl DailyLog {
    /// Creates an empty log. The goal is clamped like any amount.
    pub fn new(goal: f64, unit: Unit) -> Self {
        Self {
            goal: Amount::new(goal),
            unit,
            total: 0.0,
            entries: Vec::new(),
        }
    }

    pub fn goal(&self) -> Amount {
        self.goal
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    /// Entries in the order they were registered.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Share of the goal reached so far; zero when there is no goal.
    pub fn progress(&self) -> f64 {
        let goal = self.goal.value();
        if goal == 0.0 {
            0.0
        } else {
            self.total / goal
        }
    }

    pub fn remaining(&self) -> f64 {
        (self.goal.value() - self.total).max(0.0)
    }

    /// Appends an entry stamped with the current local time.
    pub fn register(&mut self, fluid: Fluid, unit: Unit, amount: f64) -> &Entry {
        let now = Local::now();
        self.register_at(fluid, unit, amount, now.hour(), now.minute())
    }

    /// Appends an entry stamped with the given wall-clock time.
    pub fn register_at(
        &mut self,
        fluid: Fluid,
        unit: Unit,
        amount: f64,
        hour: u32,
        minute: u32,
    ) -> &Entry {
        self.push(Entry::new(fluid, unit, amount, hour, minute))
    }

    fn push(&mut self, entry: Entry) -> &Entry {
        self.total += entry.hydrated_amount(self.unit);
        self.entries.push(entry);
        &self.entries[self.entries.len() - 1]
    }

    /// Packs the log as `[oz:1][reserved:15]`, `[goal x10]`, then one
    /// entry record per entry. Fluids not stored yet are saved on the way.
    pub fn encode<S: KeyValueStore + ?Sized>(
        &self,
        registry: &mut FluidRegistry,
        store: &mut S,
    ) -> Result<Vec<u16>> {
        let mut words = Vec::with_capacity(HEADER_WORDS + ENTRY_WORDS * self.entries.len());
        words.push(u16::from(self.unit.is_oz()) << 15);
        words.push(self.goal.tenths());
        for entry in &self.entries {
            words.extend(entry.encode(registry, store)?);
        }
        Ok(words)
    }

    /// Decodes a whole log record and recomputes the total.
    ///
    /// A buffer that is not a header plus whole entry records is rejected.
    pub fn decode(
        words: &[u16],
        registry: &FluidRegistry,
    ) -> std::result::Result<DailyLog, DecodeError> {
        if words.len() < HEADER_WORDS || (words.len() - HEADER_WORDS) % ENTRY_WORDS != 0 {
            return Err(DecodeError::MalformedLength {
                record: "daily log",
                len: words.len(),
            });
        }

        let mut reader = WordReader::new(words);
        let header = reader.read_word()?;
        let goal = reader.read_word()?;

        let mut log = Self {
            goal: Amount::from_tenths(goal),
            unit: Unit::from_oz_flag(flag(header, 15)),
            total: 0.0,
            entries: Vec::with_capacity(reader.remaining() / ENTRY_WORDS),
        };
        while !reader.is_empty() {
            log.push(Entry::read(&mut reader, registry)?);
        }
        Ok(log)
    }

    pub fn view(&self, to: Unit, use_meridiem: bool) -> DayView {
        DayView {
            goal: units::format_amount(self.goal.value(), self.unit, to),
            total: units::format_amount(self.total, self.unit, to),
            remaining: units::format_amount(self.remaining(), self.unit, to),
            progress: self.progress(),
            entries: self
                .entries
                .iter()
                .map(|e| e.view(to, use_meridiem))
                .collect(),
        }
    }
}

impl fmt::Display for DailyLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.1} / {} {} ({} entries)",
            self.total,
            self.goal,
            self.unit.symbol(),
            self.entries.len()
        )
    }
}
