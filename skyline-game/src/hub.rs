//! Hub/connection analyzer.
//!
//! Fully recomputed every turn from scratch: per-hub metrics (connection
//! opportunities, efficiency, connecting passengers) and per-route connection
//! annotations that feed the route revenue bonus. Nothing here persists
//! between turns except the accumulated hub-development bonus on the airport.

use serde::{Deserialize, Serialize};

use crate::constants::{
    HUB_CONNECTING_SHARE, HUB_DENSITY_BONUS_CAP, HUB_DISTANCE_BONUS_CAP, HUB_EFFICIENCY_BONUS_CAP,
    HUB_EFFICIENCY_MAX, HUB_EFFICIENCY_MIN, HUB_PATTERN_SAMPLES, WEEKS_PER_QUARTER,
};
use crate::numbers::{clamp_f64_to_f32, floor_f64_to_u32};
use crate::route::{ConnectionInfo, PatternList};
use crate::state::GameState;

/// Derived statistics for one hub airport, recomputed each turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HubMetrics {
    pub airport_id: String,
    /// Inbound-origin x outbound-destination pairs, self-loops excluded.
    pub connection_count: u32,
    /// 30..=100.
    pub efficiency: f32,
    /// Estimated passengers connecting over this hub per quarter.
    pub connecting_passengers: u32,
}

/// Hub efficiency: connection volume saturates at 20 pairs for the full +45,
/// the airport's own scores pull it up or down, and accumulated hub
/// development adds on top. Clamped to [30, 100].
#[must_use]
pub fn hub_efficiency(connection_count: u32, average_score: f32, development_bonus: f32) -> f32 {
    let volume = clamp_f64_to_f32((f64::from(connection_count) / 20.0).min(1.5) * 30.0);
    let score_pull = (average_score - 50.0) * 0.2;
    (50.0 + volume + score_pull + development_bonus)
        .clamp(HUB_EFFICIENCY_MIN, HUB_EFFICIENCY_MAX)
}

struct RouteSnapshot {
    id: u32,
    origin: String,
    destination: String,
    distance_km: u32,
    passengers_per_quarter: f64,
}

impl GameState {
    /// Metrics for one hub, if it was a hub at the last recompute.
    #[must_use]
    pub fn get_hub_metrics(&self, airport_id: &str) -> Option<&HubMetrics> {
        self.hub_metrics.iter().find(|m| m.airport_id == airport_id)
    }
}

/// Per-route revenue bonus granted by a hub: an efficiency share worth up to
/// 15%, a connection-density share up to 10%, and a long-haul share up to 5%.
fn connection_bonus(efficiency: f32, connection_count: u32, distance_km: u32) -> f64 {
    let efficiency_term = f64::from(efficiency) / 100.0 * HUB_EFFICIENCY_BONUS_CAP;
    let density_term = (f64::from(connection_count) / 50.0).min(1.0) * HUB_DENSITY_BONUS_CAP;
    let distance_term = (f64::from(distance_km) / 10_000.0).min(1.0) * HUB_DISTANCE_BONUS_CAP;
    efficiency_term + density_term + distance_term
}

/// Quarterly analyzer pass. Clears every stale annotation first so deleted
/// hubs and suspended routes cannot leak last turn's bonuses.
pub(crate) fn recompute_hub_metrics(state: &mut GameState) {
    for route in &mut state.routes {
        route.connection = None;
    }
    state.hub_metrics.clear();

    let snapshots: Vec<RouteSnapshot> = state
        .routes
        .iter()
        .filter(|r| !r.suspended)
        .map(|route| {
            let capacity = state
                .aircraft(route.aircraft_id)
                .and_then(|a| state.aircraft_type(&a.type_id))
                .map_or(0, |ty| ty.passenger_capacity);
            let passengers = f64::from(capacity)
                * state.route_load_factor(route)
                * f64::from(route.flights_per_week)
                * WEEKS_PER_QUARTER;
            RouteSnapshot {
                id: route.id,
                origin: route.origin.clone(),
                destination: route.destination.clone(),
                distance_km: route.distance_km,
                passengers_per_quarter: passengers,
            }
        })
        .collect();

    let hubs: Vec<(String, f32, f32)> = state
        .airports
        .iter()
        .filter(|a| a.owned && a.hub)
        .map(|a| (a.id.clone(), a.average_score(), a.hub_efficiency_bonus))
        .collect();

    for (hub_id, average_score, development_bonus) in hubs {
        let inbound: Vec<&RouteSnapshot> = snapshots
            .iter()
            .filter(|s| s.destination == hub_id)
            .collect();
        let outbound: Vec<&RouteSnapshot> =
            snapshots.iter().filter(|s| s.origin == hub_id).collect();

        let connection_count = inbound
            .iter()
            .flat_map(|i| outbound.iter().map(move |o| (i, o)))
            .filter(|(i, o)| i.origin != o.destination)
            .count() as u32;
        let efficiency = hub_efficiency(connection_count, average_score, development_bonus);

        let touching: Vec<&RouteSnapshot> = snapshots
            .iter()
            .filter(|s| s.origin == hub_id || s.destination == hub_id)
            .collect();
        let throughput: f64 = touching.iter().map(|s| s.passengers_per_quarter).sum();
        let connecting_passengers = floor_f64_to_u32(throughput * HUB_CONNECTING_SHARE);

        for snapshot in &touching {
            let patterns: PatternList = if snapshot.destination == hub_id {
                outbound
                    .iter()
                    .filter(|o| o.destination != snapshot.origin)
                    .take(HUB_PATTERN_SAMPLES)
                    .map(|o| format!("{} -> {hub_id} -> {}", snapshot.origin, o.destination))
                    .collect()
            } else {
                inbound
                    .iter()
                    .filter(|i| i.origin != snapshot.destination)
                    .take(HUB_PATTERN_SAMPLES)
                    .map(|i| format!("{} -> {hub_id} -> {}", i.origin, snapshot.destination))
                    .collect()
            };
            let info = ConnectionInfo {
                connecting_passengers: floor_f64_to_u32(
                    snapshot.passengers_per_quarter * HUB_CONNECTING_SHARE,
                ),
                bonus: connection_bonus(efficiency, connection_count, snapshot.distance_km),
                quality: efficiency,
                patterns,
            };
            if let Some(route) = state.routes.iter_mut().find(|r| r.id == snapshot.id) {
                route.connection = Some(info);
            }
        }

        state.hub_metrics.push(HubMetrics {
            airport_id: hub_id,
            connection_count,
            efficiency,
            connecting_passengers,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::airport::Airport;
    use crate::data::{
        AircraftCatalog, AircraftCategory, AircraftType, AirportSeed, ReferenceData, Region,
    };
    use crate::fleet::{FleetAircraft, Ownership};
    use crate::route::Route;
    use smallvec::SmallVec;

    fn airport(id: &str) -> Airport {
        let mut airport = Airport::from_seed(&AirportSeed {
            id: id.to_string(),
            name: format!("{id} Intl"),
            latitude: 0.0,
            longitude: 0.0,
            region: Region::Europe,
            market_size: 500,
            slot_capacity: 40,
            tourism: 50.0,
            business: 50.0,
        });
        airport.owned = true;
        airport
    }

    fn route(id: u32, origin: &str, destination: &str) -> Route {
        Route {
            id,
            origin: origin.to_string(),
            destination: destination.to_string(),
            aircraft_id: id,
            flights_per_week: 7,
            distance_km: 2_000,
            suspended: false,
            connection: None,
        }
    }

    fn aircraft(id: u32) -> FleetAircraft {
        FleetAircraft {
            id,
            type_id: String::from("test_jet"),
            display_name: format!("SK-{id}"),
            ownership: Ownership::Owned,
            age_quarters: 0,
            route_id: Some(id),
        }
    }

    fn hub_state() -> GameState {
        let data = ReferenceData {
            aircraft: AircraftCatalog::from_types(vec![AircraftType {
                id: String::from("test_jet"),
                name: String::from("Test Jet"),
                category: AircraftCategory::NarrowBody,
                passenger_capacity: 150,
                cargo_capacity: 0,
                range_km: 6_000,
                price: 40_000_000,
                operating_cost_per_flight: 15_000,
                lease_per_quarter: 700_000,
                year_available: 2010,
                year_discontinued: None,
            }]),
            ..ReferenceData::empty()
        };
        let mut state = GameState {
            data: Some(data),
            ..GameState::default()
        };
        for id in ["HUB", "AAA", "BBB", "CCC"] {
            state.airports.push(airport(id));
        }
        state.airport_mut("HUB").unwrap().hub = true;
        // Two inbound spokes and one outbound spoke through the hub.
        state.routes.push(route(0, "AAA", "HUB"));
        state.routes.push(route(1, "BBB", "HUB"));
        state.routes.push(route(2, "HUB", "CCC"));
        for id in 0..3 {
            state.fleet.push(aircraft(id));
        }
        state
    }

    #[test]
    fn efficiency_saturates_and_clamps() {
        assert!((hub_efficiency(0, 50.0, 0.0) - 50.0).abs() < f32::EPSILON);
        // 20 connections earn the full volume term.
        assert!((hub_efficiency(20, 50.0, 0.0) - 80.0).abs() < f32::EPSILON);
        // Saturation: 1.5x cap on the volume ratio, then the [30,100] clamp.
        assert!((hub_efficiency(1_000, 50.0, 0.0) - 95.0).abs() < f32::EPSILON);
        assert!((hub_efficiency(1_000, 100.0, 15.0) - HUB_EFFICIENCY_MAX).abs() < f32::EPSILON);
        assert!((hub_efficiency(0, 0.0, 0.0) - 40.0).abs() < f32::EPSILON);
    }

    #[test]
    fn cross_product_excludes_self_loops() {
        let mut state = hub_state();
        // Add an outbound back to AAA: AAA->HUB->AAA must not count.
        state.routes.push(route(3, "HUB", "AAA"));
        state.fleet.push(aircraft(3));
        recompute_hub_metrics(&mut state);
        let metrics = state.get_hub_metrics("HUB").unwrap();
        // Inbound {AAA, BBB} x outbound {CCC, AAA} minus AAA->AAA = 3.
        assert_eq!(metrics.connection_count, 3);
    }

    #[test]
    fn routes_touching_the_hub_gain_bonuses_and_patterns() {
        let mut state = hub_state();
        recompute_hub_metrics(&mut state);
        let metrics = state.get_hub_metrics("HUB").unwrap().clone();
        assert_eq!(metrics.connection_count, 2);
        assert!(metrics.connecting_passengers > 0);

        for route in &state.routes {
            let info = route.connection.as_ref().expect("touching route annotated");
            assert!(info.bonus > 0.0);
            assert!(info.bonus <= 0.30);
            assert!((info.quality - metrics.efficiency).abs() < f32::EPSILON);
            assert!(!info.patterns.is_empty());
            assert!(info.patterns.len() <= HUB_PATTERN_SAMPLES);
        }
        let inbound = state.route(0).unwrap().connection.as_ref().unwrap();
        assert_eq!(inbound.patterns[0], "AAA -> HUB -> CCC");
    }

    #[test]
    fn pattern_lists_stay_inline() {
        let patterns: SmallVec<[String; 5]> =
            (0..HUB_PATTERN_SAMPLES).map(|i| format!("p{i}")).collect();
        assert!(!patterns.spilled());
    }

    #[test]
    fn recompute_clears_stale_annotations() {
        let mut state = hub_state();
        recompute_hub_metrics(&mut state);
        assert!(state.routes.iter().all(|r| r.connection.is_some()));

        // Demote the hub: annotations and metrics must disappear.
        state.airport_mut("HUB").unwrap().hub = false;
        recompute_hub_metrics(&mut state);
        assert!(state.hub_metrics.is_empty());
        assert!(state.routes.iter().all(|r| r.connection.is_none()));
    }

    #[test]
    fn suspended_routes_are_invisible_to_the_analyzer() {
        let mut state = hub_state();
        state.suspend_route(0).unwrap();
        state.suspend_route(1).unwrap();
        recompute_hub_metrics(&mut state);
        let metrics = state.get_hub_metrics("HUB").unwrap();
        assert_eq!(metrics.connection_count, 0);
        assert!(state.route(0).unwrap().connection.is_none());
        assert!(state.route(2).unwrap().connection.is_some());
    }

    #[test]
    fn development_bonus_feeds_efficiency() {
        let mut state = hub_state();
        recompute_hub_metrics(&mut state);
        let before = state.get_hub_metrics("HUB").unwrap().efficiency;
        state.airport_mut("HUB").unwrap().hub_efficiency_bonus = 15.0;
        recompute_hub_metrics(&mut state);
        let after = state.get_hub_metrics("HUB").unwrap().efficiency;
        assert!((after - before - 15.0).abs() < 1e-4);
    }
}
