//! The operations a front end calls.
//!
//! A [`Tracker`] owns the store, the fluid registry and the preferences.
//! Front ends hand it validated primitives and render what it returns.

use chrono::{Local, NaiveDate, Timelike};
use std::collections::HashSet;

use crate::calendar::{storage_key, CalendarGrid, Month};
use crate::error::{Error, Result};
use crate::models::{DailyLog, Entry, Fluid, FluidId, Preferences};
use crate::registry::FluidRegistry;
use crate::store::{KeyValueStore, PREFERENCES_KEY};
use crate::units::Unit;

pub struct Tracker<S: KeyValueStore> {
    store: S,
    registry: FluidRegistry,
    preferences: Preferences,
    default_goal: f64,
}

impl<S: KeyValueStore> Tracker<S> {
    /// Loads registry and preferences from `store` and offers the built-in
    /// water fluid, persisting it if it is not stored yet.
    ///
    /// `default_goal` is the goal given to days without a stored log, in the
    /// preferred unit.
    pub fn open(mut store: S, default_goal: f64) -> Result<Self> {
        let mut registry = FluidRegistry::load(&store)?.with_fallback(Fluid::water());
        registry.show(&mut store, &[Fluid::water()])?;

        let preferences = match store.get(PREFERENCES_KEY)? {
            Some(words) => {
                Preferences::decode(&words).map_err(|e| Error::decode(PREFERENCES_KEY, e))?
            }
            None => Preferences::default(),
        };

        Ok(Self {
            store,
            registry,
            preferences,
            default_goal,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn registry(&self) -> &FluidRegistry {
        &self.registry
    }

    pub fn default_goal(&self) -> f64 {
        self.default_goal
    }

    pub fn list_selectable_fluids(&self) -> &[Fluid] {
        self.registry.selectable()
    }

    pub fn saved_fluids(&self) -> &[(FluidId, Fluid)] {
        self.registry.saved()
    }

    /// Looks a selectable fluid up by name, ignoring case.
    pub fn find_fluid(&self, name: &str) -> Option<&Fluid> {
        self.registry
            .selectable()
            .iter()
            .find(|f| f.name().eq_ignore_ascii_case(name))
    }

    pub fn show_fluids(&mut self, fluids: &[Fluid]) -> Result<()> {
        self.registry.show(&mut self.store, fluids)
    }

    /// Registers an entry for today at the current local time.
    pub fn register_entry(&mut self, fluid: Fluid, unit: Unit, amount: f64) -> Result<Entry> {
        let now = Local::now();
        self.register_entry_at(
            now.date_naive(),
            now.hour(),
            now.minute(),
            fluid,
            unit,
            amount,
        )
    }

    /// Appends an entry to the log of `date` and persists the log.
    pub fn register_entry_at(
        &mut self,
        date: NaiveDate,
        hour: u32,
        minute: u32,
        fluid: Fluid,
        unit: Unit,
        amount: f64,
    ) -> Result<Entry> {
        let mut log = self.day_view(date)?;
        let entry = log.register_at(fluid, unit, amount, hour, minute).clone();

        let words = log.encode(&mut self.registry, &mut self.store)?;
        self.store.set(&storage_key(date), &words)?;
        self.registry
            .show(&mut self.store, std::slice::from_ref(entry.fluid()))?;
        tracing::debug!("Registered {} on {}: {}", entry.amount(), date, log);

        Ok(entry)
    }

    /// The stored log for `date`, or a fresh unsaved one with the default goal.
    pub fn day_view(&self, date: NaiveDate) -> Result<DailyLog> {
        let key = storage_key(date);
        match self.store.get(&key)? {
            Some(words) => {
                DailyLog::decode(&words, &self.registry).map_err(|e| Error::decode(key, e))
            }
            None => Ok(DailyLog::new(self.default_goal, self.preferences.unit)),
        }
    }

    pub fn month_grid(&self, month: Month, today: NaiveDate) -> Result<CalendarGrid> {
        let mut with_data = HashSet::new();
        for day in 1..=month.days() {
            if let Some(key) = month.storage_key_for_day(day) {
                if self.store.contains(&key)? {
                    with_data.insert(key);
                }
            }
        }
        Ok(CalendarGrid::build(month, today, |key| with_data.contains(key)))
    }

    pub fn preferences(&self) -> Preferences {
        self.preferences
    }

    pub fn set_preferences(&mut self, preferences: Preferences) -> Result<()> {
        self.store.set(PREFERENCES_KEY, &preferences.encode())?;
        self.preferences = preferences;
        Ok(())
    }
}
