//! Route ledger: lifecycle commands and the authoritative per-route
//! revenue/expense math. Every aggregate figure in the financial ledger sums
//! the per-route formulas implemented here; there is no second formula.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::constants::{
    AIRCRAFT_MAINTENANCE_BASE, COMPETITION_LOAD_PENALTY, EARTH_RADIUS_KM, LOAD_FACTOR_BASE,
    LOAD_FACTOR_MAX, LOAD_FACTOR_MIN, LOAD_FACTOR_REPUTATION_PIVOT,
    LOAD_FACTOR_REPUTATION_SCALE, MAX_FLIGHTS_PER_WEEK, MIN_FLIGHTS_PER_WEEK, PRICE_PER_PAX_KM,
    WEEKS_PER_QUARTER,
};
use crate::numbers::{floor_f64_to_u32, i64_to_f64, round_f64_to_i64};
use crate::state::{CommandResult, EngineError, GameState};

/// Inline storage for sample connection itineraries.
pub type PatternList = SmallVec<[String; 5]>;

/// Hub-connection annotations attached to a route by the analyzer. Fully
/// recomputed each turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ConnectionInfo {
    /// Estimated connecting passengers routed over the hub per quarter.
    pub connecting_passengers: u32,
    /// Revenue bonus fraction applied on top of base route revenue.
    pub bonus: f64,
    /// 0..=100 quality score for display.
    pub quality: f32,
    /// Up to five sample "AAA -> HUB -> BBB" itineraries.
    #[serde(default)]
    pub patterns: PatternList,
}

/// One scheduled service between two airports, flown by exactly one aircraft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub id: u32,
    pub origin: String,
    pub destination: String,
    pub aircraft_id: u32,
    /// 1..=14.
    pub flights_per_week: u8,
    /// Great-circle distance, floored to whole kilometres at creation time.
    pub distance_km: u32,
    #[serde(default)]
    pub suspended: bool,
    #[serde(default)]
    pub connection: Option<ConnectionInfo>,
}

/// Profitability snapshot returned by the estimate command.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteEstimate {
    pub revenue: i64,
    pub expenses: i64,
    pub profit: i64,
    pub load_factor: f64,
}

/// Great-circle distance between two coordinates in kilometres.
#[must_use]
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();
    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

impl GameState {
    /// Open a route. The destination must be player-owned, the endpoints
    /// distinct, and the great-circle distance within the aircraft's range at
    /// creation time. Range is not re-validated afterwards.
    ///
    /// # Errors
    ///
    /// `Validation` for bad frequency, identical endpoints, unowned
    /// destination, or range excess; `NotFound` for unknown airports or
    /// aircraft; `ResourceBusy` when the aircraft already serves a route.
    pub fn create_route(
        &mut self,
        origin_id: &str,
        destination_id: &str,
        aircraft_id: u32,
        flights_per_week: u8,
    ) -> CommandResult<u32> {
        if !(MIN_FLIGHTS_PER_WEEK..=MAX_FLIGHTS_PER_WEEK).contains(&flights_per_week) {
            return Err(EngineError::Validation(format!(
                "flights per week must be {MIN_FLIGHTS_PER_WEEK}..={MAX_FLIGHTS_PER_WEEK}"
            )));
        }
        if origin_id == destination_id {
            return Err(EngineError::Validation(String::from(
                "origin and destination must differ",
            )));
        }
        let range_km = {
            let aircraft = self
                .aircraft(aircraft_id)
                .ok_or_else(|| EngineError::NotFound(format!("aircraft {aircraft_id}")))?;
            if aircraft.is_assigned() {
                return Err(EngineError::ResourceBusy(format!(
                    "aircraft {aircraft_id} already serves a route"
                )));
            }
            self.aircraft_type(&aircraft.type_id)
                .map_or(0, |ty| ty.range_km)
        };
        let (origin_lat, origin_lon) = {
            let origin = self
                .airport(origin_id)
                .ok_or_else(|| EngineError::NotFound(format!("airport {origin_id}")))?;
            (origin.latitude, origin.longitude)
        };
        let (dest_lat, dest_lon) = {
            let destination = self
                .airport(destination_id)
                .ok_or_else(|| EngineError::NotFound(format!("airport {destination_id}")))?;
            if !destination.owned {
                return Err(EngineError::Validation(format!(
                    "destination {destination_id} is not player-owned"
                )));
            }
            (destination.latitude, destination.longitude)
        };
        let distance_km =
            floor_f64_to_u32(haversine_km(origin_lat, origin_lon, dest_lat, dest_lon));
        if distance_km > range_km {
            return Err(EngineError::Validation(format!(
                "distance {distance_km}km exceeds aircraft range {range_km}km"
            )));
        }

        let id = self.next_route_id;
        self.next_route_id += 1;
        if let Some(aircraft) = self.aircraft_mut(aircraft_id) {
            aircraft.route_id = Some(id);
        }
        self.routes.push(Route {
            id,
            origin: origin_id.to_string(),
            destination: destination_id.to_string(),
            aircraft_id,
            flights_per_week,
            distance_km,
            suspended: false,
            connection: None,
        });
        self.push_news(format!(
            "New route {origin_id} -> {destination_id} ({distance_km}km)."
        ));
        Ok(id)
    }

    /// Close a route, freeing its aircraft for reassignment. The destination
    /// slot stays owned.
    ///
    /// # Errors
    ///
    /// `NotFound` for unknown route ids.
    pub fn delete_route(&mut self, route_id: u32) -> CommandResult<()> {
        let aircraft_id = self
            .route(route_id)
            .map(|r| r.aircraft_id)
            .ok_or_else(|| EngineError::NotFound(format!("route {route_id}")))?;
        if let Some(aircraft) = self.aircraft_mut(aircraft_id) {
            aircraft.route_id = None;
        }
        self.routes.retain(|r| r.id != route_id);
        Ok(())
    }

    /// Take a route out of service without releasing the aircraft or slot.
    ///
    /// # Errors
    ///
    /// `NotFound` for unknown ids, `Validation` when already suspended.
    pub fn suspend_route(&mut self, route_id: u32) -> CommandResult<()> {
        let route = self
            .routes
            .iter_mut()
            .find(|r| r.id == route_id)
            .ok_or_else(|| EngineError::NotFound(format!("route {route_id}")))?;
        if route.suspended {
            return Err(EngineError::Validation(format!(
                "route {route_id} is already suspended"
            )));
        }
        route.suspended = true;
        Ok(())
    }

    /// Put a suspended route back into service.
    ///
    /// # Errors
    ///
    /// `NotFound` for unknown ids, `Validation` when not suspended.
    pub fn resume_route(&mut self, route_id: u32) -> CommandResult<()> {
        let route = self
            .routes
            .iter_mut()
            .find(|r| r.id == route_id)
            .ok_or_else(|| EngineError::NotFound(format!("route {route_id}")))?;
        if !route.suspended {
            return Err(EngineError::Validation(format!(
                "route {route_id} is not suspended"
            )));
        }
        route.suspended = false;
        Ok(())
    }

    /// Change the weekly frequency of a route.
    ///
    /// # Errors
    ///
    /// `NotFound` for unknown ids, `Validation` for out-of-range frequency.
    pub fn set_route_frequency(&mut self, route_id: u32, flights_per_week: u8) -> CommandResult<()> {
        if !(MIN_FLIGHTS_PER_WEEK..=MAX_FLIGHTS_PER_WEEK).contains(&flights_per_week) {
            return Err(EngineError::Validation(format!(
                "flights per week must be {MIN_FLIGHTS_PER_WEEK}..={MAX_FLIGHTS_PER_WEEK}"
            )));
        }
        let route = self
            .routes
            .iter_mut()
            .find(|r| r.id == route_id)
            .ok_or_else(|| EngineError::NotFound(format!("route {route_id}")))?;
        route.flights_per_week = flights_per_week;
        Ok(())
    }

    /// Competitors owning either endpoint of the route.
    #[must_use]
    pub fn competitor_count_on_route(&self, route: &Route) -> usize {
        self.competitors
            .iter()
            .filter(|c| {
                c.airports.iter().any(|a| a == &route.origin)
                    || c.airports.iter().any(|a| a == &route.destination)
            })
            .count()
    }

    /// Effective load factor: reputation-driven base, scaled by the economy
    /// and the competition penalty, clamped to [0, 0.95] at the end.
    #[must_use]
    pub fn route_load_factor(&self, route: &Route) -> f64 {
        let base = (LOAD_FACTOR_BASE
            + (f64::from(self.reputation) - LOAD_FACTOR_REPUTATION_PIVOT)
                / LOAD_FACTOR_REPUTATION_SCALE)
            .clamp(LOAD_FACTOR_MIN, LOAD_FACTOR_MAX);
        let competitors = self.competitor_count_on_route(route) as f64;
        let adjusted =
            base * self.economic_condition * (1.0 - competitors * COMPETITION_LOAD_PENALTY);
        adjusted.clamp(0.0, LOAD_FACTOR_MAX)
    }

    /// Quarterly route revenue in dollars (fractional). Suspended routes and
    /// routes with a missing endpoint or aircraft earn nothing.
    #[must_use]
    pub fn route_revenue(&self, route: &Route) -> f64 {
        if route.suspended {
            return 0.0;
        }
        if self.airport(&route.origin).is_none() || self.airport(&route.destination).is_none() {
            return 0.0;
        }
        let Some(aircraft) = self.aircraft(route.aircraft_id) else {
            return 0.0;
        };
        let Some(ty) = self.aircraft_type(&aircraft.type_id) else {
            return 0.0;
        };
        let load_factor = self.route_load_factor(route);
        let passengers = f64::from(ty.passenger_capacity) * load_factor;
        let per_flight = passengers * f64::from(route.distance_km) * PRICE_PER_PAX_KM;
        let mut quarterly = per_flight * f64::from(route.flights_per_week) * WEEKS_PER_QUARTER;
        if let Some(connection) = &route.connection {
            quarterly *= 1.0 + connection.bonus;
        }
        quarterly
    }

    /// Quarterly flight operating cost for a route: per-flight cost scaled by
    /// the fuel price and the airframe's condition-derived burn multiplier.
    #[must_use]
    pub(crate) fn route_operating_cost(&self, route: &Route) -> f64 {
        if route.suspended {
            return 0.0;
        }
        let Some(aircraft) = self.aircraft(route.aircraft_id) else {
            return 0.0;
        };
        let Some(ty) = self.aircraft_type(&aircraft.type_id) else {
            return 0.0;
        };
        i64_to_f64(ty.operating_cost_per_flight)
            * f64::from(route.flights_per_week)
            * WEEKS_PER_QUARTER
            * self.fuel_price
            * aircraft.condition().fuel_efficiency_multiplier()
    }

    /// Mirror of the quarterly ledger restricted to one route: revenue,
    /// flight costs, lease share, and the aircraft's maintenance share.
    ///
    /// # Errors
    ///
    /// `NotFound` for unknown route ids.
    pub fn estimate_route_profitability(&self, route_id: u32) -> CommandResult<RouteEstimate> {
        let route = self
            .route(route_id)
            .ok_or_else(|| EngineError::NotFound(format!("route {route_id}")))?;
        let revenue = self.route_revenue(route);
        let operating = self.route_operating_cost(route);
        let (lease, maintenance_share) = match self.aircraft(route.aircraft_id) {
            Some(aircraft) => {
                let lease = if aircraft.is_leased() {
                    self.aircraft_type(&aircraft.type_id)
                        .map_or(0.0, |ty| i64_to_f64(ty.lease_per_quarter))
                } else {
                    0.0
                };
                let maintenance = i64_to_f64(AIRCRAFT_MAINTENANCE_BASE)
                    * aircraft.condition().maintenance_multiplier();
                let active_users = self
                    .routes
                    .iter()
                    .filter(|r| r.aircraft_id == route.aircraft_id && !r.suspended)
                    .count()
                    .max(1);
                (lease, maintenance / active_users as f64)
            }
            None => (0.0, 0.0),
        };
        let expenses = round_f64_to_i64(operating + lease + maintenance_share);
        let revenue = round_f64_to_i64(revenue);
        Ok(RouteEstimate {
            revenue,
            expenses,
            profit: revenue - expenses,
            load_factor: self.route_load_factor(route),
        })
    }
}
