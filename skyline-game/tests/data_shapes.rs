//! Shape checks for the shipped JSON catalogs. These guard the data files
//! themselves: a malformed asset fails here before any gameplay test runs.

use std::collections::HashSet;

use skyline_game::data::{reference_data, AircraftCategory, ReferenceData, Region};

#[test]
fn static_bundle_loads_every_catalog() {
    let data = ReferenceData::load_from_static();
    assert!(!data.aircraft.types.is_empty());
    assert!(!data.airports.airports.is_empty());
    assert!(!data.events.events.is_empty());
    assert!(!data.executives.first_names.is_empty());
    assert!(!data.executives.last_names.is_empty());
    // The shared bundle is the same parse.
    assert_eq!(reference_data(), &data);
}

#[test]
fn aircraft_catalog_passes_validation() {
    let catalog = ReferenceData::load_from_static().aircraft;
    catalog.validate().unwrap();

    let ids: HashSet<&str> = catalog.types.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids.len(), catalog.types.len(), "duplicate aircraft id");

    for ty in &catalog.types {
        assert!(ty.range_km > 0, "{}: zero range", ty.id);
        assert!(ty.price > 0, "{}: free airframe", ty.id);
        assert!(ty.operating_cost_per_flight > 0, "{}: free flights", ty.id);
        assert!(ty.lease_per_quarter > 0, "{}: free lease", ty.id);
    }
    assert!(
        catalog.types.iter().any(|t| t.category == AircraftCategory::Cargo),
        "catalog should carry cargo airframes"
    );
}

#[test]
fn workhorse_narrow_body_keeps_its_figures() {
    // Several gameplay tests recompute revenue and expenses from these exact
    // numbers; changing them means re-deriving those expectations.
    let catalog = ReferenceData::load_from_static().aircraft;
    let c140 = catalog.get("c140").expect("c140 in catalog");
    assert_eq!(c140.passenger_capacity, 140);
    assert_eq!(c140.range_km, 3_440);
    assert_eq!(c140.price, 35_000_000);
    assert_eq!(c140.operating_cost_per_flight, 14_000);
    assert!(c140.in_production(2026));
}

#[test]
fn airport_catalog_stays_within_bounds() {
    let catalog = ReferenceData::load_from_static().airports;
    let ids: HashSet<&str> = catalog.airports.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids.len(), catalog.airports.len(), "duplicate airport id");

    for seed in &catalog.airports {
        assert!(
            (100..=1_000).contains(&seed.market_size),
            "{}: market size {}",
            seed.id,
            seed.market_size
        );
        assert!((0.0..=100.0).contains(&seed.tourism), "{}", seed.id);
        assert!((0.0..=100.0).contains(&seed.business), "{}", seed.id);
        assert!((-90.0..=90.0).contains(&seed.latitude), "{}", seed.id);
        assert!((-180.0..=180.0).contains(&seed.longitude), "{}", seed.id);
        assert!(seed.slot_capacity > 0, "{}: no slots", seed.id);
    }

    let regions: HashSet<Region> = catalog.airports.iter().map(|a| a.region).collect();
    for region in Region::ALL {
        assert!(regions.contains(&region), "no airport in {region}");
    }
}

#[test]
fn event_catalog_carries_a_usable_deck() {
    let catalog = ReferenceData::load_from_static().events;
    assert!(catalog.events.len() >= 10, "deck too thin to feel random");

    let ids: HashSet<&str> = catalog.events.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids.len(), catalog.events.len(), "duplicate event id");

    for event in &catalog.events {
        assert!(event.duration_quarters >= 1, "{}: zero duration", event.id);
        assert!(!event.name.is_empty(), "{}: unnamed", event.id);
        assert!(!event.desc.is_empty(), "{}: no description", event.id);
        if let Some(fuel) = event.fuel_multiplier {
            assert!(fuel > 0.0, "{}: non-positive fuel multiplier", event.id);
        }
        if let Some(demand) = event.demand_multiplier {
            assert!(demand > 0.0, "{}: non-positive demand multiplier", event.id);
        }
    }
    // Both directions of each lever are represented.
    assert!(catalog.events.iter().any(|e| e.fuel_multiplier.is_some_and(|m| m > 1.0)));
    assert!(catalog.events.iter().any(|e| e.fuel_multiplier.is_some_and(|m| m < 1.0)));
    assert!(catalog.events.iter().any(|e| e.demand_multiplier.is_some_and(|m| m > 1.0)));
    assert!(catalog.events.iter().any(|e| e.demand_multiplier.is_some_and(|m| m < 1.0)));
}
