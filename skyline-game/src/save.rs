//! Persistence blob: a versioned JSON envelope around the full game state
//! with a small metadata header for save-slot listings.
//!
//! Loading is tolerant: a version mismatch logs a warning and proceeds, so
//! old saves keep working as fields gain `#[serde(default)]` fallbacks.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::data::ReferenceData;
use crate::state::GameState;

/// Bumped when the blob layout changes incompatibly.
pub const SAVE_VERSION: u32 = 1;
/// Numbered slots 0..SAVE_SLOT_COUNT; slot 0 doubles as the auto-save.
pub const SAVE_SLOT_COUNT: u8 = 5;
pub const AUTO_SAVE_SLOT: u8 = 0;

/// Header shown in slot listings without deserializing the whole state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveMetadata {
    pub slot_id: u8,
    pub airline_name: String,
    pub quarter: u8,
    pub year: i32,
    pub cash: i64,
    /// Caller-supplied wall-clock timestamp, seconds since the epoch.
    pub timestamp: u64,
    pub version: u32,
}

/// The opaque save envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveBlob {
    pub metadata: SaveMetadata,
    pub state: GameState,
}

impl SaveBlob {
    /// Snapshot a running game into a savable blob.
    #[must_use]
    pub fn new(slot_id: u8, timestamp: u64, state: &GameState) -> Self {
        Self {
            metadata: SaveMetadata {
                slot_id,
                airline_name: state.airline_name.clone(),
                quarter: state.clock.quarter,
                year: state.clock.year,
                cash: state.cash,
                timestamp,
                version: SAVE_VERSION,
            },
            state: state.clone(),
        }
    }

    /// Serialize to the persisted JSON form.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse a persisted blob. A version mismatch is logged, not fatal.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is structurally unreadable.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let blob: Self = serde_json::from_str(json)?;
        if blob.metadata.version != SAVE_VERSION {
            warn!(
                "save version mismatch: blob={} engine={}, loading anyway",
                blob.metadata.version, SAVE_VERSION
            );
        }
        Ok(blob)
    }

    /// Unwrap into a playable state, reattaching reference data and rearming
    /// the RNG from the stored seed.
    #[must_use]
    pub fn into_state(self, data: ReferenceData) -> GameState {
        self.state.rehydrate(data)
    }
}
