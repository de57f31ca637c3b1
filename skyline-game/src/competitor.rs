//! Rival carriers: a small fixed roster simulated with coarse per-turn
//! economics. Competitors never fly explicit routes; their presence at an
//! airport is what pressures player load factors.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::{
    COMPETITOR_AIRPORT_COST_PER_POINT, COMPETITOR_BASE_REPUTATION, COMPETITOR_EXPANSION_CHANCE,
    COMPETITOR_EXPANSION_THRESHOLD, COMPETITOR_NOISE_MAX, COMPETITOR_NOISE_MIN,
    COMPETITOR_PROFIT_PER_AIRPORT, COMPETITOR_REP_CEILING, COMPETITOR_REP_FLOOR,
    COMPETITOR_REP_GAIN, COMPETITOR_REP_LOSS, COMPETITOR_STARTING_CASH,
};
use crate::numbers::{i64_to_f64, round_f64_to_i64};
use crate::state::GameState;

/// Broad behavioral flavor, used for display and future tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompetitorStrategy {
    Expansion,
    Profit,
    Balanced,
}

/// One rival carrier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Competitor {
    pub name: String,
    pub cash: i64,
    /// Clamped to [20, 100]; rivals never collapse entirely.
    pub reputation: f32,
    pub strategy: CompetitorStrategy,
    pub aggressive: bool,
    /// Ids of airports this carrier holds.
    #[serde(default)]
    pub airports: Vec<String>,
}

const STARTING_ROSTER: [(&str, CompetitorStrategy, bool); 3] = [
    ("Aquila Air", CompetitorStrategy::Expansion, true),
    ("TransGlobe Airways", CompetitorStrategy::Profit, false),
    ("Borealis Air", CompetitorStrategy::Balanced, true),
];

fn unclaimed_indices(state: &GameState) -> Vec<usize> {
    state
        .airports
        .iter()
        .enumerate()
        .filter(|(_, a)| a.is_unclaimed())
        .map(|(idx, _)| idx)
        .collect()
}

/// Populate the fixed rival roster at game start, handing each carrier one or
/// two unclaimed airports. Without an RNG every carrier claims the first
/// unclaimed airport in map order.
pub(crate) fn seed_starting_competitors(state: &mut GameState) {
    let mut rng = state.rng.take();
    for (name, strategy, aggressive) in STARTING_ROSTER {
        let mut competitor = Competitor {
            name: name.to_string(),
            cash: COMPETITOR_STARTING_CASH,
            reputation: COMPETITOR_BASE_REPUTATION,
            strategy,
            aggressive,
            airports: Vec::new(),
        };
        let claims = rng.as_mut().map_or(1, |r| r.random_range(1..=2));
        for _ in 0..claims {
            let unclaimed = unclaimed_indices(state);
            if unclaimed.is_empty() {
                break;
            }
            let idx = match rng.as_mut() {
                Some(r) => unclaimed[r.random_range(0..unclaimed.len())],
                None => unclaimed[0],
            };
            state.airports[idx].competitor_owner = Some(competitor.name.clone());
            competitor.airports.push(state.airports[idx].id.clone());
        }
        state.competitors.push(competitor);
    }
    state.rng = rng;
}

/// Per-turn competitor pass: coarse profit from held airports scaled by
/// reputation, noise, and the economy; reputation drifts with the profit
/// sign; aggressive carriers with a war chest occasionally grab an unclaimed
/// airport.
pub(crate) fn process_competitors(state: &mut GameState) {
    let mut rng = state.rng.take();
    let economy = state.economic_condition;
    for i in 0..state.competitors.len() {
        let noise = rng
            .as_mut()
            .map_or(0.0, |r| r.random_range(COMPETITOR_NOISE_MIN..=COMPETITOR_NOISE_MAX));
        let profit = {
            let competitor = &state.competitors[i];
            let base =
                i64_to_f64(competitor.airports.len() as i64 * COMPETITOR_PROFIT_PER_AIRPORT);
            let standing = f64::from(competitor.reputation / COMPETITOR_BASE_REPUTATION);
            round_f64_to_i64(base * standing * (1.0 + noise) * economy)
        };
        {
            let competitor = &mut state.competitors[i];
            competitor.cash += profit;
            let delta = if profit > 0 {
                COMPETITOR_REP_GAIN
            } else {
                -COMPETITOR_REP_LOSS
            };
            competitor.reputation = (competitor.reputation + delta)
                .clamp(COMPETITOR_REP_FLOOR, COMPETITOR_REP_CEILING);
        }

        let wants_expansion = state.competitors[i].aggressive
            && state.competitors[i].cash > COMPETITOR_EXPANSION_THRESHOLD;
        if !wants_expansion {
            continue;
        }
        let Some(r) = rng.as_mut() else {
            continue;
        };
        if r.random::<f32>() >= COMPETITOR_EXPANSION_CHANCE {
            continue;
        }
        // Airports under active player negotiation are off the table.
        let unclaimed: Vec<usize> = unclaimed_indices(state)
            .into_iter()
            .filter(|&idx| {
                let id = &state.airports[idx].id;
                !state.negotiations.iter().any(|n| &n.airport_id == id)
            })
            .collect();
        if unclaimed.is_empty() {
            continue;
        }
        let idx = unclaimed[r.random_range(0..unclaimed.len())];
        let cost =
            i64::from(state.airports[idx].market_size) * COMPETITOR_AIRPORT_COST_PER_POINT;
        if state.competitors[i].cash < cost {
            continue;
        }
        state.competitors[i].cash -= cost;
        let carrier = state.competitors[i].name.clone();
        let airport_id = state.airports[idx].id.clone();
        let airport_name = state.airports[idx].name.clone();
        state.airports[idx].competitor_owner = Some(carrier.clone());
        state.competitors[i].airports.push(airport_id);
        state.push_news(format!("{carrier} acquires slots at {airport_name}."));
    }
    state.rng = rng;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::airport::Airport;
    use crate::data::{AirportSeed, Region};
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn airport(id: &str, market_size: u32) -> Airport {
        Airport::from_seed(&AirportSeed {
            id: id.to_string(),
            name: format!("{id} Intl"),
            latitude: 0.0,
            longitude: 0.0,
            region: Region::Africa,
            market_size,
            slot_capacity: 30,
            tourism: 50.0,
            business: 50.0,
        })
    }

    fn map(count: usize) -> Vec<Airport> {
        (0..count).map(|i| airport(&format!("AP{i}"), 400)).collect()
    }

    #[test]
    fn seeding_claims_only_unclaimed_airports() {
        let mut state = GameState {
            airports: map(10),
            rng: Some(ChaCha20Rng::seed_from_u64(3)),
            ..GameState::default()
        };
        seed_starting_competitors(&mut state);
        assert_eq!(state.competitors.len(), 3);
        for competitor in &state.competitors {
            assert!((1..=2).contains(&competitor.airports.len()));
            assert_eq!(competitor.cash, COMPETITOR_STARTING_CASH);
            for id in &competitor.airports {
                assert_eq!(
                    state.airport(id).unwrap().competitor_owner.as_ref(),
                    Some(&competitor.name)
                );
            }
        }
    }

    #[test]
    fn seeding_without_rng_is_deterministic() {
        let mut state = GameState {
            airports: map(5),
            ..GameState::default()
        };
        seed_starting_competitors(&mut state);
        assert_eq!(state.competitors.len(), 3);
        for competitor in &state.competitors {
            assert_eq!(competitor.airports.len(), 1);
        }
    }

    #[test]
    fn profit_scales_with_airports_and_reputation() {
        let mut state = GameState {
            airports: map(3),
            ..GameState::default()
        };
        state.competitors.push(Competitor {
            name: String::from("Rival"),
            cash: 0,
            reputation: COMPETITOR_BASE_REPUTATION,
            strategy: CompetitorStrategy::Profit,
            aggressive: false,
            airports: vec![String::from("AP0"), String::from("AP1")],
        });
        // No RNG: noise is zero, profit is exactly the base formula.
        process_competitors(&mut state);
        assert_eq!(state.competitors[0].cash, 2 * COMPETITOR_PROFIT_PER_AIRPORT);
        assert!(
            (state.competitors[0].reputation - (COMPETITOR_BASE_REPUTATION + COMPETITOR_REP_GAIN))
                .abs()
                < f32::EPSILON
        );
    }

    #[test]
    fn airportless_rival_bleeds_reputation_to_the_floor() {
        let mut state = GameState::default();
        state.competitors.push(Competitor {
            name: String::from("Husk Air"),
            cash: 0,
            reputation: 22.0,
            strategy: CompetitorStrategy::Balanced,
            aggressive: false,
            airports: Vec::new(),
        });
        for _ in 0..10 {
            process_competitors(&mut state);
        }
        assert!((state.competitors[0].reputation - COMPETITOR_REP_FLOOR).abs() < f32::EPSILON);
        assert_eq!(state.competitors[0].cash, 0);
    }

    #[test]
    fn aggressive_rich_rival_eventually_expands() {
        let mut state = GameState {
            airports: map(8),
            rng: Some(ChaCha20Rng::seed_from_u64(21)),
            ..GameState::default()
        };
        state.competitors.push(Competitor {
            name: String::from("Aquila Air"),
            cash: COMPETITOR_EXPANSION_THRESHOLD * 4,
            reputation: 80.0,
            strategy: CompetitorStrategy::Expansion,
            aggressive: true,
            airports: vec![String::from("AP0")],
        });
        state.airports[0].competitor_owner = Some(String::from("Aquila Air"));
        for _ in 0..40 {
            process_competitors(&mut state);
        }
        assert!(state.competitors[0].airports.len() > 1);
        let claimed = state
            .airports
            .iter()
            .filter(|a| a.competitor_owner.is_some())
            .count();
        assert_eq!(claimed, state.competitors[0].airports.len());
    }

    #[test]
    fn passive_rival_never_expands() {
        let mut state = GameState {
            airports: map(8),
            rng: Some(ChaCha20Rng::seed_from_u64(9)),
            ..GameState::default()
        };
        state.competitors.push(Competitor {
            name: String::from("TransGlobe Airways"),
            cash: COMPETITOR_EXPANSION_THRESHOLD * 10,
            reputation: 80.0,
            strategy: CompetitorStrategy::Profit,
            aggressive: false,
            airports: vec![String::from("AP0")],
        });
        for _ in 0..40 {
            process_competitors(&mut state);
        }
        assert_eq!(state.competitors[0].airports.len(), 1);
    }
}
