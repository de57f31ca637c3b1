//! Fleet ledger: aircraft instances, ageing, condition-derived multipliers,
//! and the buy/sell/return commands.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{RESALE_DECAY_PER_QUARTER, RESALE_MARKET_FRACTION};
use crate::numbers::{floor_f64_to_i64, i64_to_f64};
use crate::state::{CommandResult, EngineError, GameState};

/// Airframe condition derived from age in whole years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    Excellent,
    Good,
    Fair,
    Poor,
    Critical,
}

impl Condition {
    /// Fixed age thresholds, measured in years.
    #[must_use]
    pub const fn from_age_years(age_years: u32) -> Self {
        if age_years <= 5 {
            Self::Excellent
        } else if age_years <= 10 {
            Self::Good
        } else if age_years <= 15 {
            Self::Fair
        } else if age_years <= 20 {
            Self::Poor
        } else {
            Self::Critical
        }
    }

    /// Maintenance cost scaling, monotonically increasing with wear.
    #[must_use]
    pub const fn maintenance_multiplier(self) -> f64 {
        match self {
            Self::Excellent => 1.0,
            Self::Good => 1.3,
            Self::Fair => 1.7,
            Self::Poor => 2.3,
            Self::Critical => 3.5,
        }
    }

    /// Fuel burn scaling, monotonically increasing with wear.
    #[must_use]
    pub const fn fuel_efficiency_multiplier(self) -> f64 {
        match self {
            Self::Excellent => 1.0,
            Self::Good => 1.05,
            Self::Fair => 1.15,
            Self::Poor => 1.30,
            Self::Critical => 1.60,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Fair => "fair",
            Self::Poor => "poor",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Ownership mode of a fleet aircraft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ownership {
    Owned,
    Leased,
}

/// One aircraft instance in the player fleet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetAircraft {
    pub id: u32,
    /// Catalog id of the airframe model.
    pub type_id: String,
    pub display_name: String,
    pub ownership: Ownership,
    /// Age in quarters, incremented once per turn. Converted to years only at
    /// the condition-lookup boundary.
    pub age_quarters: u32,
    /// Exclusive route assignment, at most one.
    #[serde(default)]
    pub route_id: Option<u32>,
}

impl FleetAircraft {
    #[must_use]
    pub const fn age_years(&self) -> u32 {
        self.age_quarters / 4
    }

    #[must_use]
    pub const fn condition(&self) -> Condition {
        Condition::from_age_years(self.age_years())
    }

    #[must_use]
    pub const fn is_assigned(&self) -> bool {
        self.route_id.is_some()
    }

    #[must_use]
    pub const fn is_leased(&self) -> bool {
        matches!(self.ownership, Ownership::Leased)
    }
}

/// Resale value: price decayed 10% per quarter of age, then the used-market
/// haircut, floored to whole dollars.
#[must_use]
pub fn resale_value(price: i64, age_quarters: u32) -> i64 {
    let decay = RESALE_DECAY_PER_QUARTER.powi(age_quarters.min(i32::MAX as u32) as i32);
    floor_f64_to_i64(i64_to_f64(price) * decay * RESALE_MARKET_FRACTION)
}

impl GameState {
    /// Buy or lease an aircraft from the catalog. Owned purchases deduct the
    /// full price up front; leases carry no upfront cost.
    ///
    /// # Errors
    ///
    /// `NotFound` for unknown types, `Validation` for models not currently in
    /// production, `InsufficientFunds` when an owned purchase exceeds cash.
    pub fn buy_aircraft(
        &mut self,
        type_id: &str,
        ownership: Ownership,
        display_name: &str,
    ) -> CommandResult<u32> {
        let (price, in_production) = {
            let ty = self
                .aircraft_type(type_id)
                .ok_or_else(|| EngineError::NotFound(format!("aircraft type {type_id}")))?;
            (ty.price, ty.in_production(self.clock.year))
        };
        if !in_production {
            return Err(EngineError::Validation(format!(
                "{type_id} is not in production in {}",
                self.clock.year
            )));
        }
        if matches!(ownership, Ownership::Owned) {
            self.debit(price)?;
        }
        let id = self.next_aircraft_id;
        self.next_aircraft_id += 1;
        self.fleet.push(FleetAircraft {
            id,
            type_id: type_id.to_string(),
            display_name: display_name.to_string(),
            ownership,
            age_quarters: 0,
            route_id: None,
        });
        let verb = match ownership {
            Ownership::Owned => "purchased",
            Ownership::Leased => "leased",
        };
        self.push_news(format!("Fleet: {display_name} {verb}."));
        Ok(id)
    }

    /// Sell an owned, unassigned aircraft at its decayed resale value.
    ///
    /// # Errors
    ///
    /// `NotFound` for unknown ids, `Validation` for leased aircraft (use
    /// [`GameState::return_leased_aircraft`]), `ResourceBusy` while assigned
    /// to a route.
    pub fn sell_aircraft(&mut self, aircraft_id: u32) -> CommandResult<i64> {
        let (price, age_quarters, name) = {
            let aircraft = self
                .aircraft(aircraft_id)
                .ok_or_else(|| EngineError::NotFound(format!("aircraft {aircraft_id}")))?;
            if aircraft.is_leased() {
                return Err(EngineError::Validation(String::from(
                    "leased aircraft must be returned, not sold",
                )));
            }
            if aircraft.is_assigned() {
                return Err(EngineError::ResourceBusy(String::from(
                    "aircraft is assigned to a route",
                )));
            }
            let price = self
                .aircraft_type(&aircraft.type_id)
                .map_or(0, |ty| ty.price);
            (price, aircraft.age_quarters, aircraft.display_name.clone())
        };
        let amount = resale_value(price, age_quarters);
        self.cash += amount;
        self.fleet.retain(|a| a.id != aircraft_id);
        self.push_news(format!("Fleet: {name} sold for ${amount}."));
        Ok(amount)
    }

    /// Return a leased, unassigned aircraft to the lessor. No cash effect.
    ///
    /// # Errors
    ///
    /// `NotFound` for unknown ids, `Validation` for owned aircraft,
    /// `ResourceBusy` while assigned to a route.
    pub fn return_leased_aircraft(&mut self, aircraft_id: u32) -> CommandResult<()> {
        let name = {
            let aircraft = self
                .aircraft(aircraft_id)
                .ok_or_else(|| EngineError::NotFound(format!("aircraft {aircraft_id}")))?;
            if !aircraft.is_leased() {
                return Err(EngineError::Validation(String::from(
                    "owned aircraft must be sold, not returned",
                )));
            }
            if aircraft.is_assigned() {
                return Err(EngineError::ResourceBusy(String::from(
                    "aircraft is assigned to a route",
                )));
            }
            aircraft.display_name.clone()
        };
        self.fleet.retain(|a| a.id != aircraft_id);
        self.push_news(format!("Fleet: {name} returned to lessor."));
        Ok(())
    }

    /// Age every fleet aircraft by one quarter. Runs once per turn.
    pub(crate) fn age_fleet(&mut self) {
        for aircraft in &mut self.fleet {
            aircraft.age_quarters += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{AircraftCatalog, AircraftCategory, AircraftType, ReferenceData};

    fn test_type() -> AircraftType {
        AircraftType {
            id: String::from("test_jet"),
            name: String::from("Test Jet"),
            category: AircraftCategory::NarrowBody,
            passenger_capacity: 150,
            cargo_capacity: 0,
            range_km: 5_000,
            price: 40_000_000,
            operating_cost_per_flight: 15_000,
            lease_per_quarter: 700_000,
            year_available: 2010,
            year_discontinued: None,
        }
    }

    fn state_with_catalog() -> GameState {
        let data = ReferenceData {
            aircraft: AircraftCatalog::from_types(vec![test_type()]),
            ..ReferenceData::empty()
        };
        GameState {
            data: Some(data),
            ..GameState::default()
        }
    }

    #[test]
    fn condition_severity_is_monotonic_in_age() {
        let mut last = Condition::from_age_years(0);
        for years in 1..40 {
            let current = Condition::from_age_years(years);
            assert!(current >= last, "severity regressed at {years} years");
            last = current;
        }
        assert_eq!(Condition::from_age_years(5), Condition::Excellent);
        assert_eq!(Condition::from_age_years(6), Condition::Good);
        assert_eq!(Condition::from_age_years(21), Condition::Critical);
    }

    #[test]
    fn multipliers_grow_with_severity() {
        let order = [
            Condition::Excellent,
            Condition::Good,
            Condition::Fair,
            Condition::Poor,
            Condition::Critical,
        ];
        for pair in order.windows(2) {
            assert!(pair[1].maintenance_multiplier() > pair[0].maintenance_multiplier());
            assert!(pair[1].fuel_efficiency_multiplier() > pair[0].fuel_efficiency_multiplier());
        }
    }

    #[test]
    fn owned_purchase_deducts_price() {
        let mut state = state_with_catalog();
        state.cash = 50_000_000;
        let id = state
            .buy_aircraft("test_jet", Ownership::Owned, "SK-001")
            .unwrap();
        assert_eq!(state.cash, 10_000_000);
        assert_eq!(state.fleet.len(), 1);
        assert_eq!(state.aircraft(id).unwrap().age_quarters, 0);
    }

    #[test]
    fn lease_charges_nothing_upfront() {
        let mut state = state_with_catalog();
        state.cash = 0;
        state
            .buy_aircraft("test_jet", Ownership::Leased, "SK-002")
            .unwrap();
        assert_eq!(state.cash, 0);
        assert!(state.fleet[0].is_leased());
    }

    #[test]
    fn unaffordable_purchase_leaves_state_unchanged() {
        let mut state = state_with_catalog();
        state.cash = 1_000;
        let err = state
            .buy_aircraft("test_jet", Ownership::Owned, "SK-003")
            .unwrap_err();
        assert!(matches!(err, EngineError::InsufficientFunds { .. }));
        assert!(state.fleet.is_empty());
        assert_eq!(state.cash, 1_000);
    }

    #[test]
    fn sell_pays_decayed_resale_and_removes_entry() {
        let mut state = state_with_catalog();
        state.cash = 50_000_000;
        let id = state
            .buy_aircraft("test_jet", Ownership::Owned, "SK-004")
            .unwrap();
        state.aircraft_mut(id).unwrap().age_quarters = 4;
        let expected = resale_value(40_000_000, 4);
        let amount = state.sell_aircraft(id).unwrap();
        assert_eq!(amount, expected);
        assert!(amount > 0);
        assert_eq!(state.cash, 10_000_000 + expected);
        assert!(state.fleet.is_empty());
    }

    #[test]
    fn sell_rejects_leased_and_assigned() {
        let mut state = state_with_catalog();
        let leased = state
            .buy_aircraft("test_jet", Ownership::Leased, "SK-005")
            .unwrap();
        assert!(matches!(
            state.sell_aircraft(leased),
            Err(EngineError::Validation(_))
        ));

        let owned = state
            .buy_aircraft("test_jet", Ownership::Owned, "SK-006")
            .unwrap();
        state.aircraft_mut(owned).unwrap().route_id = Some(9);
        assert!(matches!(
            state.sell_aircraft(owned),
            Err(EngineError::ResourceBusy(_))
        ));
        assert_eq!(state.fleet.len(), 2);
    }

    #[test]
    fn return_rejects_owned_aircraft() {
        let mut state = state_with_catalog();
        let owned = state
            .buy_aircraft("test_jet", Ownership::Owned, "SK-007")
            .unwrap();
        assert!(matches!(
            state.return_leased_aircraft(owned),
            Err(EngineError::Validation(_))
        ));
        let leased = state
            .buy_aircraft("test_jet", Ownership::Leased, "SK-008")
            .unwrap();
        let cash_before = state.cash;
        state.return_leased_aircraft(leased).unwrap();
        assert_eq!(state.cash, cash_before);
        assert_eq!(state.fleet.len(), 1);
    }

    #[test]
    fn age_fleet_increments_every_airframe() {
        let mut state = state_with_catalog();
        state
            .buy_aircraft("test_jet", Ownership::Leased, "SK-009")
            .unwrap();
        state
            .buy_aircraft("test_jet", Ownership::Leased, "SK-010")
            .unwrap();
        state.age_fleet();
        assert!(state.fleet.iter().all(|a| a.age_quarters == 1));
    }

    #[test]
    fn resale_value_is_floored_and_positive() {
        assert_eq!(resale_value(1_000_000, 0), 600_000);
        let decayed = resale_value(1_000_000, 8);
        assert!(decayed < 600_000);
        assert!(decayed > 0);
    }
}
