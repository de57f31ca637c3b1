//! Skyline Game Engine
//!
//! Platform-agnostic core game logic for the Skyline airline-management
//! simulation. This crate provides the full quarterly turn loop and player
//! command surface without UI or platform-specific dependencies.

pub mod airport;
pub mod clock;
pub mod competitor;
pub mod constants;
pub mod data;
pub mod events;
pub mod executive;
pub mod finance;
pub mod fleet;
pub mod hub;
pub mod negotiation;
pub mod numbers;
pub mod route;
pub mod save;
pub mod seed;
pub mod state;
pub mod turn;

use std::collections::HashMap;
use std::convert::Infallible;

use anyhow::{anyhow, ensure, Context};

// Re-export commonly used types
pub use airport::{Airport, DifficultyTier};
pub use clock::SimulationClock;
pub use competitor::{Competitor, CompetitorStrategy};
pub use data::{
    reference_data, AircraftCatalog, AircraftCategory, AircraftType, AirportCatalog, AirportSeed,
    EventCatalog, EventTemplate, ExecutivePools, ReferenceData, Region,
};
pub use events::ActiveEvent;
pub use executive::{
    success_chance, ActionType, Executive, ExecutiveAction, ExecutiveLevel, ExecutiveRole, Skills,
};
pub use finance::{annuity_payment, Loan};
pub use fleet::{resale_value, Condition, FleetAircraft, Ownership};
pub use hub::{hub_efficiency, HubMetrics};
pub use negotiation::{
    negotiation_deposit, negotiation_quarters, NegotiationTerms, SlotNegotiation,
};
pub use route::{haversine_km, ConnectionInfo, PatternList, Route, RouteEstimate};
pub use save::{SaveBlob, SaveMetadata, AUTO_SAVE_SLOT, SAVE_SLOT_COUNT, SAVE_VERSION};
pub use seed::{decode_to_seed, encode_friendly, generate_code_from_entropy};
pub use state::{CommandResult, EngineError, GameState, PendingBonus};
pub use turn::TurnResult;

/// Trait for abstracting reference-data loading.
/// Platform-specific implementations should provide this.
pub trait DataLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the reference catalogs from the platform-specific source.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalogs cannot be loaded.
    fn load_reference_data(&self) -> Result<ReferenceData, Self::Error>;
}

/// Trait for abstracting save-slot storage.
/// Platform-specific implementations should provide this.
pub trait GameStorage {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Write a serialized blob to a slot.
    ///
    /// # Errors
    ///
    /// Returns an error if the blob cannot be written.
    fn write_slot(&mut self, slot: u8, blob: &str) -> Result<(), Self::Error>;

    /// Read the blob in a slot, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot cannot be read.
    fn read_slot(&self, slot: u8) -> Result<Option<String>, Self::Error>;

    /// Remove the blob in a slot.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot cannot be cleared.
    fn delete_slot(&mut self, slot: u8) -> Result<(), Self::Error>;
}

/// Loader backed by the catalogs embedded in the crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticDataLoader;

impl DataLoader for StaticDataLoader {
    type Error = Infallible;

    fn load_reference_data(&self) -> Result<ReferenceData, Self::Error> {
        Ok(ReferenceData::load_from_static())
    }
}

/// In-memory storage, for tests and headless runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slots: HashMap<u8, String>,
}

impl GameStorage for MemoryStorage {
    type Error = Infallible;

    fn write_slot(&mut self, slot: u8, blob: &str) -> Result<(), Self::Error> {
        self.slots.insert(slot, blob.to_string());
        Ok(())
    }

    fn read_slot(&self, slot: u8) -> Result<Option<String>, Self::Error> {
        Ok(self.slots.get(&slot).cloned())
    }

    fn delete_slot(&mut self, slot: u8) -> Result<(), Self::Error> {
        self.slots.remove(&slot);
        Ok(())
    }
}

/// Main engine facade for the presentation layer: game creation plus
/// slot-based save and load over pluggable data and storage backends.
pub struct GameEngine<L, S>
where
    L: DataLoader,
    S: GameStorage,
{
    data_loader: L,
    storage: S,
}

impl<L, S> GameEngine<L, S>
where
    L: DataLoader,
    S: GameStorage,
{
    /// Create a new game engine with the provided data loader and storage.
    pub const fn new(data_loader: L, storage: S) -> Self {
        Self {
            data_loader,
            storage,
        }
    }

    /// Start a fresh game from a numeric seed.
    ///
    /// # Errors
    ///
    /// Returns an error if the reference catalogs cannot be loaded.
    pub fn new_game(&self, airline_name: &str, seed: u64) -> Result<GameState, L::Error> {
        let data = self.data_loader.load_reference_data()?;
        Ok(GameState::new(airline_name, seed, data))
    }

    /// Start a fresh game from a friendly share code.
    ///
    /// # Errors
    ///
    /// Returns an error for unrecognized codes or when catalogs cannot load.
    pub fn new_game_from_code(&self, airline_name: &str, code: &str) -> anyhow::Result<GameState> {
        let seed =
            seed::decode_to_seed(code).ok_or_else(|| anyhow!("unrecognized share code {code}"))?;
        self.new_game(airline_name, seed)
            .context("loading reference data")
    }

    /// Save a game into a numbered slot.
    ///
    /// # Errors
    ///
    /// Returns an error for out-of-range slots or storage failures.
    pub fn save_game(
        &mut self,
        slot: u8,
        state: &GameState,
        timestamp: u64,
    ) -> anyhow::Result<()> {
        ensure!(slot < SAVE_SLOT_COUNT, "slot {slot} out of range");
        let blob = SaveBlob::new(slot, timestamp, state).to_json()?;
        self.storage.write_slot(slot, &blob)?;
        Ok(())
    }

    /// Save into the reserved auto-save slot.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure.
    pub fn auto_save(&mut self, state: &GameState, timestamp: u64) -> anyhow::Result<()> {
        self.save_game(AUTO_SAVE_SLOT, state, timestamp)
    }

    /// Load and rehydrate the game in a slot, if one exists.
    ///
    /// # Errors
    ///
    /// Returns an error for out-of-range slots, unreadable blobs, or when the
    /// reference catalogs cannot be loaded.
    pub fn load_game(&self, slot: u8) -> anyhow::Result<Option<GameState>> {
        ensure!(slot < SAVE_SLOT_COUNT, "slot {slot} out of range");
        let Some(json) = self.storage.read_slot(slot)? else {
            return Ok(None);
        };
        let blob = SaveBlob::from_json(&json).context("parsing save blob")?;
        let data = self
            .data_loader
            .load_reference_data()
            .context("loading reference data")?;
        Ok(Some(blob.into_state(data)))
    }

    /// Read only the slot header, without rehydrating a playable state.
    ///
    /// # Errors
    ///
    /// Returns an error for out-of-range slots or unreadable blobs.
    pub fn slot_metadata(&self, slot: u8) -> anyhow::Result<Option<SaveMetadata>> {
        ensure!(slot < SAVE_SLOT_COUNT, "slot {slot} out of range");
        let Some(json) = self.storage.read_slot(slot)? else {
            return Ok(None);
        };
        Ok(Some(SaveBlob::from_json(&json)?.metadata))
    }

    /// Remove the save in a slot.
    ///
    /// # Errors
    ///
    /// Returns an error for out-of-range slots or storage failures.
    pub fn delete_save(&mut self, slot: u8) -> anyhow::Result<()> {
        ensure!(slot < SAVE_SLOT_COUNT, "slot {slot} out of range");
        self.storage.delete_slot(slot)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> GameEngine<StaticDataLoader, MemoryStorage> {
        GameEngine::new(StaticDataLoader, MemoryStorage::default())
    }

    #[test]
    fn new_game_loads_catalogs_and_seeds_state() {
        let state = engine().new_game("Skyline Air", 2024).unwrap();
        assert_eq!(state.seed, 2024);
        assert!(state.data.is_some());
        assert!(!state.airports.is_empty());
    }

    #[test]
    fn save_then_load_roundtrips_through_a_slot() {
        let mut engine = engine();
        let mut state = engine.new_game("Slot Air", 9).unwrap();
        state.advance_turn();
        engine.save_game(3, &state, 1_700_000_000).unwrap();

        let restored = engine.load_game(3).unwrap().expect("slot occupied");
        assert_eq!(restored.clock, state.clock);
        assert_eq!(restored.cash, state.cash);
        assert_eq!(restored.news, state.news);
        assert!(restored.rng.is_some());

        let metadata = engine.slot_metadata(3).unwrap().unwrap();
        assert_eq!(metadata.airline_name, "Slot Air");
        assert_eq!(metadata.timestamp, 1_700_000_000);
    }

    #[test]
    fn empty_and_deleted_slots_read_as_none() {
        let mut engine = engine();
        assert!(engine.load_game(1).unwrap().is_none());
        let state = engine.new_game("Gone Air", 1).unwrap();
        engine.save_game(1, &state, 0).unwrap();
        engine.delete_save(1).unwrap();
        assert!(engine.load_game(1).unwrap().is_none());
    }

    #[test]
    fn out_of_range_slots_are_rejected() {
        let mut engine = engine();
        let state = engine.new_game("Range Air", 1).unwrap();
        assert!(engine.save_game(SAVE_SLOT_COUNT, &state, 0).is_err());
        assert!(engine.load_game(SAVE_SLOT_COUNT).is_err());
        assert!(engine.delete_save(SAVE_SLOT_COUNT).is_err());
    }

    #[test]
    fn share_codes_start_identical_games() {
        let engine = engine();
        let code = generate_code_from_entropy(314_159);
        let a = engine.new_game_from_code("Twin Air", &code).unwrap();
        let b = engine.new_game_from_code("Twin Air", &code).unwrap();
        assert_eq!(a.seed, b.seed);
        assert_eq!(a.competitors, b.competitors);
        assert!(engine.new_game_from_code("Twin Air", "garbage").is_err());
    }
}
