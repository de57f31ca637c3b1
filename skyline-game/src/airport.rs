//! Runtime airport entities: ownership tri-state, quarterly score drift,
//! derived difficulty tiers, and hub establishment.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::{
    AIRPORT_FLAVOR_NEWS_CHANCE, HUB_ESTABLISH_COST, HUB_MIN_TOUCHING_ROUTES,
    REGIONAL_SHOCK_CHANCE, REGIONAL_SHOCK_MAGNITUDE, SCORE_DRIFT_MAX_STEP,
};
use crate::data::{AirportSeed, Region};
use crate::state::{CommandResult, EngineError, GameState};

/// How hard slots at this airport are to obtain, derived from the average of
/// tourism and business scores. Recomputed after every drift pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DifficultyTier {
    Easy,
    #[default]
    Moderate,
    Hard,
    Extreme,
}

impl DifficultyTier {
    #[must_use]
    pub fn from_average_score(avg: f32) -> Self {
        if avg < 40.0 {
            Self::Easy
        } else if avg < 60.0 {
            Self::Moderate
        } else if avg < 80.0 {
            Self::Hard
        } else {
            Self::Extreme
        }
    }
}

/// One airport on the map. Ownership is a tri-state: player-owned,
/// competitor-owned, or unclaimed; never more than one at once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Airport {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub region: Region,
    #[serde(default)]
    pub owned: bool,
    #[serde(default)]
    pub competitor_owner: Option<String>,
    pub market_size: u32,
    pub slot_capacity: u32,
    /// 0..=100, drifts quarterly.
    pub tourism: f32,
    /// 0..=100, drifts quarterly.
    pub business: f32,
    #[serde(default)]
    pub difficulty: DifficultyTier,
    /// Subset of owned airports.
    #[serde(default)]
    pub hub: bool,
    /// Accumulated HUB_DEVELOPMENT efficiency bonus.
    #[serde(default)]
    pub hub_efficiency_bonus: f32,
}

impl Airport {
    #[must_use]
    pub fn from_seed(seed: &AirportSeed) -> Self {
        let mut airport = Self {
            id: seed.id.clone(),
            name: seed.name.clone(),
            latitude: seed.latitude,
            longitude: seed.longitude,
            region: seed.region,
            owned: false,
            competitor_owner: None,
            market_size: seed.market_size,
            slot_capacity: seed.slot_capacity,
            tourism: seed.tourism,
            business: seed.business,
            difficulty: DifficultyTier::default(),
            hub: false,
            hub_efficiency_bonus: 0.0,
        };
        airport.refresh_difficulty();
        airport
    }

    #[must_use]
    pub fn is_unclaimed(&self) -> bool {
        !self.owned && self.competitor_owner.is_none()
    }

    #[must_use]
    pub fn average_score(&self) -> f32 {
        (self.tourism + self.business) / 2.0
    }

    pub fn refresh_difficulty(&mut self) {
        self.difficulty = DifficultyTier::from_average_score(self.average_score());
    }

    fn clamp_scores(&mut self) {
        self.tourism = self.tourism.clamp(0.0, 100.0);
        self.business = self.business.clamp(0.0, 100.0);
    }
}

/// Quarterly airport economics pass: small random walks on tourism/business,
/// an occasional one-region shock, an occasional flavor headline, then a
/// difficulty refresh for every airport. Without an RNG the scores hold
/// steady and only the refresh runs.
pub(crate) fn process_airport_economics(state: &mut GameState) {
    if let Some(mut rng) = state.rng.take() {
        for airport in &mut state.airports {
            airport.tourism += rng.random_range(-SCORE_DRIFT_MAX_STEP..=SCORE_DRIFT_MAX_STEP);
            airport.business += rng.random_range(-SCORE_DRIFT_MAX_STEP..=SCORE_DRIFT_MAX_STEP);
            airport.clamp_scores();
        }

        if rng.random::<f32>() < REGIONAL_SHOCK_CHANCE && !state.airports.is_empty() {
            let region = Region::ALL[rng.random_range(0..Region::ALL.len())];
            let magnitude = if rng.random::<f32>() < 0.5 {
                REGIONAL_SHOCK_MAGNITUDE
            } else {
                -REGIONAL_SHOCK_MAGNITUDE
            };
            let mut touched = 0usize;
            for airport in &mut state.airports {
                if airport.region == region {
                    airport.tourism += magnitude;
                    airport.business += magnitude;
                    airport.clamp_scores();
                    touched += 1;
                }
            }
            if touched > 0 {
                let direction = if magnitude > 0.0 { "surges" } else { "slumps" };
                state.push_news(format!("Travel demand {direction} across {region}."));
            }
        }

        if rng.random::<f32>() < AIRPORT_FLAVOR_NEWS_CHANCE && !state.airports.is_empty() {
            let idx = rng.random_range(0..state.airports.len());
            let name = state.airports[idx].name.clone();
            state.push_news(format!("{name} opens a renovated terminal."));
        }

        state.rng = Some(rng);
    }

    for airport in &mut state.airports {
        airport.refresh_difficulty();
    }
}

impl GameState {
    /// Count routes with either endpoint at the given airport.
    #[must_use]
    pub fn routes_touching(&self, airport_id: &str) -> usize {
        self.routes
            .iter()
            .filter(|r| r.origin == airport_id || r.destination == airport_id)
            .count()
    }

    /// Whether [`GameState::establish_hub`] would currently succeed.
    #[must_use]
    pub fn can_establish_hub(&self, airport_id: &str) -> bool {
        let Some(airport) = self.airport(airport_id) else {
            return false;
        };
        airport.owned
            && !airport.hub
            && self.routes_touching(airport_id) >= HUB_MIN_TOUCHING_ROUTES
            && self.cash >= HUB_ESTABLISH_COST
    }

    /// Promote an owned airport to hub status for a flat fee. Hubs feed the
    /// connection analyzer, which grants route revenue bonuses.
    ///
    /// # Errors
    ///
    /// `NotFound` for unknown airports; `Validation` when the airport is not
    /// player-owned, is already a hub, or has too few touching routes;
    /// `InsufficientFunds` when the fee is unaffordable.
    pub fn establish_hub(&mut self, airport_id: &str) -> CommandResult<()> {
        {
            let airport = self
                .airport(airport_id)
                .ok_or_else(|| EngineError::NotFound(format!("airport {airport_id}")))?;
            if !airport.owned {
                return Err(EngineError::Validation(format!(
                    "{airport_id} is not player-owned"
                )));
            }
            if airport.hub {
                return Err(EngineError::Validation(format!(
                    "{airport_id} is already a hub"
                )));
            }
        }
        if self.routes_touching(airport_id) < HUB_MIN_TOUCHING_ROUTES {
            return Err(EngineError::Validation(format!(
                "a hub needs at least {HUB_MIN_TOUCHING_ROUTES} routes at {airport_id}"
            )));
        }
        self.debit(HUB_ESTABLISH_COST)?;
        if let Some(airport) = self.airport_mut(airport_id) {
            airport.hub = true;
            let name = airport.name.clone();
            self.push_news(format!("{name} designated as a hub."));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn seed(id: &str, region: Region) -> AirportSeed {
        AirportSeed {
            id: id.to_string(),
            name: format!("{id} International"),
            latitude: 40.0,
            longitude: -73.0,
            region,
            market_size: 500,
            slot_capacity: 40,
            tourism: 55.0,
            business: 65.0,
        }
    }

    fn owned_airport(id: &str) -> Airport {
        let mut airport = Airport::from_seed(&seed(id, Region::Europe));
        airport.owned = true;
        airport
    }

    #[test]
    fn ownership_tristate_starts_unclaimed() {
        let airport = Airport::from_seed(&seed("LHR", Region::Europe));
        assert!(airport.is_unclaimed());
        assert!(!airport.owned);
        assert!(airport.competitor_owner.is_none());
    }

    #[test]
    fn difficulty_follows_average_score() {
        assert_eq!(DifficultyTier::from_average_score(10.0), DifficultyTier::Easy);
        assert_eq!(DifficultyTier::from_average_score(45.0), DifficultyTier::Moderate);
        assert_eq!(DifficultyTier::from_average_score(70.0), DifficultyTier::Hard);
        assert_eq!(DifficultyTier::from_average_score(95.0), DifficultyTier::Extreme);
    }

    #[test]
    fn drift_keeps_scores_in_bounds() {
        let mut state = GameState::default();
        for i in 0..6 {
            let mut airport = Airport::from_seed(&seed(&format!("A{i}"), Region::Asia));
            airport.tourism = if i % 2 == 0 { 0.5 } else { 99.5 };
            airport.business = 50.0;
            state.airports.push(airport);
        }
        state.rng = Some(ChaCha20Rng::seed_from_u64(77));
        for _ in 0..80 {
            process_airport_economics(&mut state);
        }
        for airport in &state.airports {
            assert!((0.0..=100.0).contains(&airport.tourism));
            assert!((0.0..=100.0).contains(&airport.business));
        }
    }

    #[test]
    fn drift_without_rng_only_refreshes_difficulty() {
        let mut state = GameState::default();
        let mut airport = Airport::from_seed(&seed("CDG", Region::Europe));
        airport.tourism = 90.0;
        airport.business = 90.0;
        state.airports.push(airport);
        process_airport_economics(&mut state);
        assert!((state.airports[0].tourism - 90.0).abs() < f32::EPSILON);
        assert_eq!(state.airports[0].difficulty, DifficultyTier::Extreme);
    }

    #[test]
    fn establish_hub_requires_ownership_and_routes() {
        let mut state = GameState::default();
        state.airports.push(Airport::from_seed(&seed("FRA", Region::Europe)));
        assert!(matches!(
            state.establish_hub("FRA"),
            Err(EngineError::Validation(_))
        ));
        assert!(!state.can_establish_hub("FRA"));
        assert!(matches!(
            state.establish_hub("XXX"),
            Err(EngineError::NotFound(_))
        ));
    }

    #[test]
    fn establish_hub_charges_fee_once_routes_exist() {
        let mut state = GameState::default();
        state.airports.push(owned_airport("AMS"));
        state.airports.push(owned_airport("FCO"));
        state.airports.push(owned_airport("MAD"));
        for (i, dest) in ["FCO", "MAD"].iter().enumerate() {
            state.routes.push(crate::route::Route {
                id: i as u32,
                origin: String::from("AMS"),
                destination: (*dest).to_string(),
                aircraft_id: i as u32,
                flights_per_week: 7,
                distance_km: 1_200,
                suspended: false,
                connection: None,
            });
        }
        state.cash = HUB_ESTABLISH_COST;
        assert!(state.can_establish_hub("AMS"));
        state.establish_hub("AMS").unwrap();
        assert_eq!(state.cash, 0);
        assert!(state.airport("AMS").unwrap().hub);
        // Second establishment attempt fails.
        state.cash = HUB_ESTABLISH_COST;
        assert!(matches!(
            state.establish_hub("AMS"),
            Err(EngineError::Validation(_))
        ));
    }
}
