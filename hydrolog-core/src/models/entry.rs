use chrono::{Local, Timelike};
use serde::Serialize;

use super::fluid::{Fluid, FluidId};
use crate::codec::{bits, flag, DecodeError, WordReader};
use crate::error::Result;
use crate::registry::FluidRegistry;
use crate::store::KeyValueStore;
use crate::units::{self, Amount, Unit};

/// Words in every entry record.
pub const ENTRY_WORDS: usize = 3;

/// One consumption event.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    fluid: Fluid,
    unit: Unit,
    amount: Amount,
    hour: u8,
    minute: u8,
}

/// Display projection of an entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryView {
    pub time: String,
    pub amount: String,
    pub fluid: String,
    pub color: String,
}

impl Entry {
    /// Builds an entry, clamping the amount to 0.0-6553.5, the hour to 23
    /// and the minute to 59.
    pub fn new(fluid: Fluid, unit: Unit, amount: f64, hour: u32, minute: u32) -> Self {
        Self {
            fluid,
            unit,
            amount: Amount::new(amount),
            hour: hour.min(23) as u8,
            minute: minute.min(59) as u8,
        }
    }

    /// Builds an entry stamped with the current local time.
    pub fn now(fluid: Fluid, unit: Unit, amount: f64) -> Self {
        let now = Local::now();
        Self::new(fluid, unit, amount, now.hour(), now.minute())
    }

    pub fn fluid(&self) -> &Fluid {
        &self.fluid
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    /// The amount that counts as water, converted to `to`.
    pub fn hydrated_amount(&self, to: Unit) -> f64 {
        units::convert(self.amount.value(), self.unit, to) * self.fluid.hydration()
    }

    /// Packs the entry as `[oz:1][hour:5][minute:6]`, `[amount x10]`, `[fluid id]`.
    ///
    /// The fluid is saved to the registry first when it is not stored yet.
    pub fn encode<S: KeyValueStore + ?Sized>(
        &self,
        registry: &mut FluidRegistry,
        store: &mut S,
    ) -> Result<[u16; ENTRY_WORDS]> {
        let id = match registry.id_of(&self.fluid) {
            Some(id) => id,
            None => registry.save_one(store, &self.fluid)?,
        };
        Ok([
            (u16::from(self.unit.is_oz()) << 15)
                | (u16::from(self.hour) << 6)
                | u16::from(self.minute),
            self.amount.tenths(),
            id.get(),
        ])
    }

    /// Decodes a single record of exactly [`ENTRY_WORDS`] words.
    pub fn decode(
        words: &[u16],
        registry: &FluidRegistry,
    ) -> std::result::Result<Entry, DecodeError> {
        if words.len() != ENTRY_WORDS {
            return Err(DecodeError::MalformedLength {
                record: "entry",
                len: words.len(),
            });
        }
        Self::read(&mut WordReader::new(words), registry)
    }

    /// Reads one record from the cursor. Unknown fluid ids resolve to the
    /// registry's fallback fluid.
    pub fn read(
        reader: &mut WordReader<'_>,
        registry: &FluidRegistry,
    ) -> std::result::Result<Entry, DecodeError> {
        let time = reader.read_word()?;
        let amount = reader.read_word()?;
        let fluid = reader.read_word()?;

        Ok(Self {
            fluid: registry.resolve(FluidId::new(fluid)),
            unit: Unit::from_oz_flag(flag(time, 15)),
            amount: Amount::from_tenths(amount),
            hour: bits(time, 6, 5).min(23) as u8,
            minute: bits(time, 0, 6).min(59) as u8,
        })
    }

    pub fn view(&self, to: Unit, use_meridiem: bool) -> EntryView {
        EntryView {
            time: units::format_time(self.hour, self.minute, use_meridiem),
            amount: units::format_amount(self.amount.value(), self.unit, to),
            fluid: self.fluid.name().to_string(),
            color: self.fluid.color().to_hex(),
        }
    }
}
