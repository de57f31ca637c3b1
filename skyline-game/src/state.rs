//! Aggregate simulation state and the command error taxonomy.
//!
//! `GameState` is the single mutable resource of the engine. Player commands
//! and the turn orchestrator are implemented as `impl GameState` blocks in
//! the modules that own each concern; every mutation happens synchronously
//! inside one call stack.

use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::airport::Airport;
use crate::clock::SimulationClock;
use crate::competitor::{seed_starting_competitors, Competitor};
use crate::constants::{
    DEFAULT_NEGOTIATION_CAPACITY, NEWS_LOG_CAP, RESEARCH_LEVEL_CAP, STARTING_CASH,
    STARTING_REPUTATION,
};
use crate::data::{AircraftType, ReferenceData};
use crate::events::ActiveEvent;
use crate::executive::{Executive, ExecutiveAction};
use crate::finance::Loan;
use crate::fleet::FleetAircraft;
use crate::hub::HubMetrics;
use crate::negotiation::SlotNegotiation;
use crate::route::Route;

/// Recoverable command rejection. Every variant is raised before any state
/// mutation, so a failed command leaves the game unchanged.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("invalid command: {0}")]
    Validation(String),
    #[error("insufficient funds: need ${needed}, have ${available}")]
    InsufficientFunds { needed: i64, available: i64 },
    #[error("resource busy: {0}")]
    ResourceBusy(String),
    #[error("capacity exceeded: {0}")]
    CapacityExceeded(String),
    #[error("not found: {0}")]
    NotFound(String),
}

pub type CommandResult<T> = Result<T, EngineError>;

/// Discount payloads produced by successful executive actions. They are
/// recorded for the caller to apply, never consumed automatically.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PendingBonus {
    SlotDiscount { percent: f32 },
    AircraftDiscount { percent: f32 },
}

fn default_economic_condition() -> f64 {
    1.0
}

fn default_fuel_price() -> f64 {
    1.0
}

fn default_negotiation_capacity() -> usize {
    DEFAULT_NEGOTIATION_CAPACITY
}

/// Aggregate root for one running game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub airline_name: String,
    pub seed: u64,
    pub clock: SimulationClock,
    pub cash: i64,
    /// 0..=100.
    pub reputation: f32,
    #[serde(default)]
    pub consecutive_losses: u32,
    #[serde(default)]
    pub last_quarter_profit: i64,
    /// Global fuel price multiplier, 1.0 neutral.
    #[serde(default = "default_fuel_price")]
    pub fuel_price: f64,
    /// Global demand multiplier, 1.0 neutral.
    #[serde(default = "default_economic_condition")]
    pub economic_condition: f64,
    #[serde(default)]
    pub advertising_budget: i64,
    #[serde(default)]
    pub research_level: u32,
    #[serde(default = "default_negotiation_capacity")]
    pub negotiation_capacity: usize,
    #[serde(default)]
    pub fleet: Vec<FleetAircraft>,
    #[serde(default)]
    pub routes: Vec<Route>,
    #[serde(default)]
    pub airports: Vec<Airport>,
    #[serde(default)]
    pub negotiations: Vec<SlotNegotiation>,
    #[serde(default)]
    pub loans: Vec<Loan>,
    #[serde(default)]
    pub executives: Vec<Executive>,
    #[serde(default)]
    pub actions: Vec<ExecutiveAction>,
    #[serde(default)]
    pub active_events: Vec<ActiveEvent>,
    #[serde(default)]
    pub competitors: Vec<Competitor>,
    #[serde(default)]
    pub hub_metrics: Vec<HubMetrics>,
    #[serde(default)]
    pub pending_bonuses: Vec<PendingBonus>,
    /// Most-recent-last, truncated to the 50 newest entries.
    pub news: Vec<String>,
    #[serde(default)]
    pub next_aircraft_id: u32,
    #[serde(default)]
    pub next_route_id: u32,
    #[serde(default)]
    pub next_executive_id: u32,
    #[serde(default)]
    pub next_action_id: u32,
    #[serde(skip)]
    pub rng: Option<ChaCha20Rng>,
    #[serde(skip)]
    pub data: Option<ReferenceData>,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            airline_name: String::from("Skyline Air"),
            seed: 0,
            clock: SimulationClock::default(),
            cash: STARTING_CASH,
            reputation: STARTING_REPUTATION,
            consecutive_losses: 0,
            last_quarter_profit: 0,
            fuel_price: 1.0,
            economic_condition: 1.0,
            advertising_budget: 0,
            research_level: 0,
            negotiation_capacity: DEFAULT_NEGOTIATION_CAPACITY,
            fleet: Vec::new(),
            routes: Vec::new(),
            airports: Vec::new(),
            negotiations: Vec::new(),
            loans: Vec::new(),
            executives: Vec::new(),
            actions: Vec::new(),
            active_events: Vec::new(),
            competitors: Vec::new(),
            hub_metrics: Vec::new(),
            pending_bonuses: Vec::new(),
            news: Vec::new(),
            next_aircraft_id: 0,
            next_route_id: 0,
            next_executive_id: 0,
            next_action_id: 0,
            rng: None,
            data: None,
        }
    }
}

impl GameState {
    /// Start a fresh game: seeds the airport map from the catalog, hands each
    /// competitor one or two unclaimed airports, and arms the RNG.
    #[must_use]
    pub fn new(airline_name: &str, seed: u64, data: ReferenceData) -> Self {
        let mut state = Self {
            airline_name: airline_name.to_string(),
            seed,
            airports: data.airports.airports.iter().map(Airport::from_seed).collect(),
            rng: Some(ChaCha20Rng::seed_from_u64(seed)),
            data: Some(data),
            ..Self::default()
        };
        seed_starting_competitors(&mut state);
        state.push_news(format!("{airline_name} takes to the skies."));
        state
    }

    /// Reattach reference data after deserialization and rearm the RNG from
    /// the stored seed.
    #[must_use]
    pub fn rehydrate(mut self, data: ReferenceData) -> Self {
        self.data = Some(data);
        if self.rng.is_none() {
            self.rng = Some(ChaCha20Rng::seed_from_u64(self.seed));
        }
        self
    }

    /// Append a news entry, truncating to the newest `NEWS_LOG_CAP`.
    pub fn push_news(&mut self, entry: String) {
        self.news.push(entry);
        if self.news.len() > NEWS_LOG_CAP {
            let excess = self.news.len() - NEWS_LOG_CAP;
            self.news.drain(..excess);
        }
    }

    /// Newest `count` entries, oldest first.
    #[must_use]
    pub fn recent_news(&self, count: usize) -> &[String] {
        let start = self.news.len().saturating_sub(count);
        &self.news[start..]
    }

    /// Deduct `amount` from cash, rejecting the command when unaffordable.
    /// Callers must run every other validation first so the deduction is the
    /// final fallible step.
    pub(crate) fn debit(&mut self, amount: i64) -> CommandResult<()> {
        if self.cash < amount {
            return Err(EngineError::InsufficientFunds {
                needed: amount,
                available: self.cash,
            });
        }
        self.cash -= amount;
        Ok(())
    }

    pub(crate) fn adjust_reputation(&mut self, delta: f32) {
        self.reputation = (self.reputation + delta).clamp(0.0, 100.0);
    }

    #[must_use]
    pub fn airport(&self, id: &str) -> Option<&Airport> {
        self.airports.iter().find(|a| a.id == id)
    }

    pub(crate) fn airport_mut(&mut self, id: &str) -> Option<&mut Airport> {
        self.airports.iter_mut().find(|a| a.id == id)
    }

    #[must_use]
    pub fn aircraft(&self, id: u32) -> Option<&FleetAircraft> {
        self.fleet.iter().find(|a| a.id == id)
    }

    pub(crate) fn aircraft_mut(&mut self, id: u32) -> Option<&mut FleetAircraft> {
        self.fleet.iter_mut().find(|a| a.id == id)
    }

    #[must_use]
    pub fn route(&self, id: u32) -> Option<&Route> {
        self.routes.iter().find(|r| r.id == id)
    }

    #[must_use]
    pub fn executive(&self, id: u32) -> Option<&Executive> {
        self.executives.iter().find(|e| e.id == id)
    }

    /// Catalog record backing a fleet aircraft.
    #[must_use]
    pub fn aircraft_type(&self, type_id: &str) -> Option<&AircraftType> {
        self.data.as_ref().and_then(|d| d.aircraft.get(type_id))
    }

    #[must_use]
    pub fn owned_airport_count(&self) -> usize {
        self.airports.iter().filter(|a| a.owned).count()
    }

    /// Set the per-quarter advertising budget.
    ///
    /// # Errors
    ///
    /// Rejects negative amounts.
    pub fn set_advertising_budget(&mut self, amount: i64) -> CommandResult<()> {
        if amount < 0 {
            return Err(EngineError::Validation(String::from(
                "advertising budget cannot be negative",
            )));
        }
        self.advertising_budget = amount;
        Ok(())
    }

    /// Set the research investment level (0..=10). The level feeds quarterly
    /// expenses; event research bonuses raise it up to the same cap.
    ///
    /// # Errors
    ///
    /// Rejects levels above the cap.
    pub fn set_research_level(&mut self, level: u32) -> CommandResult<()> {
        if level > RESEARCH_LEVEL_CAP {
            return Err(EngineError::Validation(format!(
                "research level capped at {RESEARCH_LEVEL_CAP}"
            )));
        }
        self.research_level = level;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::CONSECUTIVE_LOSS_LIMIT;

    #[test]
    fn news_log_truncates_to_cap() {
        let mut state = GameState::default();
        for i in 0..(NEWS_LOG_CAP + 10) {
            state.push_news(format!("entry {i}"));
        }
        assert_eq!(state.news.len(), NEWS_LOG_CAP);
        assert_eq!(state.news.first().unwrap(), "entry 10");
        assert_eq!(state.recent_news(2), &["entry 58", "entry 59"]);
    }

    #[test]
    fn debit_rejects_before_mutation() {
        let mut state = GameState {
            cash: 1_000,
            ..GameState::default()
        };
        let err = state.debit(2_000).unwrap_err();
        assert_eq!(
            err,
            EngineError::InsufficientFunds {
                needed: 2_000,
                available: 1_000
            }
        );
        assert_eq!(state.cash, 1_000);
        state.debit(1_000).unwrap();
        assert_eq!(state.cash, 0);
    }

    #[test]
    fn reputation_stays_clamped() {
        let mut state = GameState::default();
        state.adjust_reputation(1_000.0);
        assert!((state.reputation - 100.0).abs() < f32::EPSILON);
        state.adjust_reputation(-1_000.0);
        assert!(state.reputation.abs() < f32::EPSILON);
    }

    #[test]
    fn new_game_seeds_airports_and_competitors() {
        let state = GameState::new("Testair", 42, ReferenceData::load_from_static());
        assert!(!state.airports.is_empty());
        assert!(!state.competitors.is_empty());
        for competitor in &state.competitors {
            let owned = competitor.airports.len();
            assert!((1..=2).contains(&owned), "competitor owns {owned} airports");
        }
        // Claims recorded on both sides.
        for airport in &state.airports {
            if let Some(owner) = &airport.competitor_owner {
                let competitor = state
                    .competitors
                    .iter()
                    .find(|c| &c.name == owner)
                    .expect("owner exists");
                assert!(competitor.airports.contains(&airport.id));
            }
        }
        assert!(state.rng.is_some());
        assert_eq!(state.consecutive_losses, 0);
        assert!(CONSECUTIVE_LOSS_LIMIT > 0);
    }

    #[test]
    fn research_level_rejects_above_cap() {
        let mut state = GameState::default();
        assert!(state.set_research_level(RESEARCH_LEVEL_CAP).is_ok());
        assert!(state.set_research_level(RESEARCH_LEVEL_CAP + 1).is_err());
        assert_eq!(state.research_level, RESEARCH_LEVEL_CAP);
    }

    #[test]
    fn advertising_budget_rejects_negative() {
        let mut state = GameState::default();
        assert!(state.set_advertising_budget(-1).is_err());
        state.set_advertising_budget(750_000).unwrap();
        assert_eq!(state.advertising_budget, 750_000);
    }
}
