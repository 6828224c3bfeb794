//! The persisted, append-only collection of fluids.
//!
//! Fluids are deduplicated by value: saving a fluid whose encoded record is
//! already stored returns the existing id. Ids are handed out in append order
//! and records are never reordered or removed, so an id stays valid for the
//! lifetime of the data.
//!
//! Saving rewrites the whole buffer (read, append, write). Nothing that saves
//! may be called while a save is in progress; [`FluidRegistry::save`] takes
//! `&mut self`, which rules out reentrant saves.

use crate::codec::DecodeError;
use crate::error::{Error, Result};
use crate::models::{Fluid, FluidId};
use crate::store::{KeyValueStore, FLUIDS_KEY};

#[derive(Debug, Clone, Default)]
pub struct FluidRegistry {
    saved: Vec<(FluidId, Fluid)>,
    shown: Vec<Fluid>,
    fallback: Option<Fluid>,
}

impl FluidRegistry {
    /// An empty registry that is not yet backed by stored data.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the registry buffer from the store.
    ///
    /// Every stored fluid becomes selectable: a fluid is only persisted when
    /// it is always-shown or a saved entry references it.
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Result<Self> {
        let words = store.get(FLUIDS_KEY)?.unwrap_or_default();
        let saved = Fluid::decode_all(&words).map_err(|e| Error::decode(FLUIDS_KEY, e))?;
        let shown = saved.iter().map(|(_, f)| f.clone()).collect();
        tracing::debug!("Loaded {} fluid(s)", saved.len());

        Ok(Self {
            saved,
            shown,
            fallback: None,
        })
    }

    /// Sets the fluid entries resolve to when their id is unknown.
    pub fn with_fallback(mut self, fluid: Fluid) -> Self {
        self.fallback = Some(fluid);
        self
    }

    pub fn fallback(&self) -> Fluid {
        self.fallback.clone().unwrap_or_else(Fluid::water)
    }

    /// Id of a persisted fluid equal to `fluid`, if any.
    pub fn id_of(&self, fluid: &Fluid) -> Option<FluidId> {
        self.saved.iter().find(|(_, f)| f == fluid).map(|(id, _)| *id)
    }

    pub fn get(&self, id: FluidId) -> Option<&Fluid> {
        self.saved.iter().find(|(i, _)| *i == id).map(|(_, f)| f)
    }

    /// Resolves an id from an entry record, falling back when it is unknown.
    pub fn resolve(&self, id: FluidId) -> Fluid {
        match self.get(id) {
            Some(fluid) => fluid.clone(),
            None => {
                tracing::warn!("Unknown fluid id {}, using fallback", id);
                self.fallback()
            }
        }
    }

    /// Persisted fluids in append order.
    pub fn saved(&self) -> &[(FluidId, Fluid)] {
        &self.saved
    }

    /// Fluids currently offered as choices.
    pub fn selectable(&self) -> &[Fluid] {
        &self.shown
    }

    pub fn len(&self) -> usize {
        self.saved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.saved.is_empty()
    }

    /// Persists `fluids`, returning one id per input in the same order.
    ///
    /// Fluids already stored reuse their id; new ones are appended. The store
    /// is written once, and only when something was appended.
    pub fn save<S: KeyValueStore + ?Sized>(
        &mut self,
        store: &mut S,
        fluids: &[Fluid],
    ) -> Result<Vec<FluidId>> {
        let mut ids = Vec::with_capacity(fluids.len());
        let mut saved = self.saved.clone();

        for fluid in fluids {
            if let Some((id, _)) = saved.iter().find(|(_, f)| f == fluid) {
                tracing::debug!("Fluid '{}' already saved as {}", fluid.name(), id);
                ids.push(*id);
                continue;
            }
            let next =
                u16::try_from(saved.len()).map_err(|_| Error::RegistryFull(saved.len()))?;
            let id = FluidId::new(next);
            tracing::info!("Saving fluid '{}' as {}", fluid.name(), id);
            saved.push((id, fluid.clone()));
            ids.push(id);
        }

        // Ids only become visible once the buffer holding them is stored.
        if saved.len() > self.saved.len() {
            let words: Vec<u16> = saved.iter().flat_map(|(_, f)| f.encode()).collect();
            store.set(FLUIDS_KEY, &words)?;
            self.saved = saved;
        }
        Ok(ids)
    }

    /// Saves a single fluid. See [`FluidRegistry::save`].
    pub fn save_one<S: KeyValueStore + ?Sized>(
        &mut self,
        store: &mut S,
        fluid: &Fluid,
    ) -> Result<FluidId> {
        let ids = self.save(store, std::slice::from_ref(fluid))?;
        Ok(ids[0])
    }

    /// Offers `fluids` as choices and persists those marked always-shown.
    pub fn show<S: KeyValueStore + ?Sized>(
        &mut self,
        store: &mut S,
        fluids: &[Fluid],
    ) -> Result<()> {
        for fluid in fluids {
            if !self.shown.contains(fluid) {
                self.shown.push(fluid.clone());
            }
        }
        let pinned: Vec<Fluid> = fluids.iter().filter(|f| f.always_shown()).cloned().collect();
        if !pinned.is_empty() {
            self.save(store, &pinned)?;
        }
        Ok(())
    }

    /// The concatenated records of every persisted fluid.
    pub fn encode(&self) -> Vec<u16> {
        self.saved.iter().flat_map(|(_, f)| f.encode()).collect()
    }

    /// Rebuilds a registry from a raw buffer without touching a store.
    pub fn decode(words: &[u16]) -> std::result::Result<Self, DecodeError> {
        Ok(Self {
            saved: Fluid::decode_all(words)?,
            ..Self::default()
        })
    }
}
