//! Immutable reference catalogs: aircraft types, airport seeds, event
//! templates, and executive candidate pools. All catalogs ship as JSON under
//! `assets/data/` and are parsed once at startup.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

use crate::executive::{Executive, ExecutiveLevel, ExecutiveRole, Skills};

const DEFAULT_AIRCRAFT_DATA: &str = include_str!("../assets/data/aircraft.json");
const DEFAULT_AIRPORT_DATA: &str = include_str!("../assets/data/airports.json");
const DEFAULT_EVENT_DATA: &str = include_str!("../assets/data/events.json");
const DEFAULT_EXECUTIVE_DATA: &str = include_str!("../assets/data/executives.json");

/// Broad airframe classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AircraftCategory {
    Regional,
    NarrowBody,
    WideBody,
    Jumbo,
    Supersonic,
    Cargo,
}

impl AircraftCategory {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Regional => "regional",
            Self::NarrowBody => "narrow-body",
            Self::WideBody => "wide-body",
            Self::Jumbo => "jumbo",
            Self::Supersonic => "supersonic",
            Self::Cargo => "cargo",
        }
    }
}

/// One purchasable airframe model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AircraftType {
    pub id: String,
    pub name: String,
    pub category: AircraftCategory,
    /// Zero for cargo airframes.
    #[serde(default)]
    pub passenger_capacity: u32,
    /// Tonnes, cargo airframes only.
    #[serde(default)]
    pub cargo_capacity: u32,
    pub range_km: u32,
    pub price: i64,
    pub operating_cost_per_flight: i64,
    pub lease_per_quarter: i64,
    pub year_available: i32,
    #[serde(default)]
    pub year_discontinued: Option<i32>,
}

impl AircraftType {
    /// Whether the model is still sold new in the given year.
    #[must_use]
    pub fn in_production(&self, year: i32) -> bool {
        self.year_available <= year
            && self.year_discontinued.is_none_or(|ended| ended > year)
    }
}

/// Container for the aircraft type catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AircraftCatalog {
    pub types: Vec<AircraftType>,
}

impl AircraftCatalog {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load catalog from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into a valid catalog.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn from_types(types: Vec<AircraftType>) -> Self {
        Self { types }
    }

    #[must_use]
    pub fn load_from_static() -> Self {
        serde_json::from_str(DEFAULT_AIRCRAFT_DATA).unwrap_or_default()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&AircraftType> {
        self.types.iter().find(|t| t.id == id)
    }

    /// Structural invariants: lease below price, discontinuation after
    /// availability, sane capacity per category.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant as a message.
    pub fn validate(&self) -> Result<(), String> {
        for ty in &self.types {
            if ty.lease_per_quarter >= ty.price {
                return Err(format!("{}: lease must be below purchase price", ty.id));
            }
            if let Some(ended) = ty.year_discontinued {
                if ended <= ty.year_available {
                    return Err(format!("{}: discontinued before availability", ty.id));
                }
            }
            match ty.category {
                AircraftCategory::Cargo => {
                    if ty.passenger_capacity != 0 || ty.cargo_capacity == 0 {
                        return Err(format!("{}: cargo airframe capacity mismatch", ty.id));
                    }
                }
                _ => {
                    if ty.passenger_capacity == 0 {
                        return Err(format!("{}: passenger airframe without seats", ty.id));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Continental grouping used for regional economics shocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    NorthAmerica,
    SouthAmerica,
    Europe,
    Africa,
    MiddleEast,
    Asia,
    Oceania,
}

impl Region {
    pub const ALL: [Self; 7] = [
        Self::NorthAmerica,
        Self::SouthAmerica,
        Self::Europe,
        Self::Africa,
        Self::MiddleEast,
        Self::Asia,
        Self::Oceania,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::NorthAmerica => "North America",
            Self::SouthAmerica => "South America",
            Self::Europe => "Europe",
            Self::Africa => "Africa",
            Self::MiddleEast => "Middle East",
            Self::Asia => "Asia",
            Self::Oceania => "Oceania",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Immutable seed record for one airport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirportSeed {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub region: Region,
    /// Abstract demand index in 100..=1000.
    pub market_size: u32,
    pub slot_capacity: u32,
    pub tourism: f32,
    pub business: f32,
}

/// Container for the airport catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AirportCatalog {
    pub airports: Vec<AirportSeed>,
}

impl AirportCatalog {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load catalog from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into a valid catalog.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn from_seeds(airports: Vec<AirportSeed>) -> Self {
        Self { airports }
    }

    #[must_use]
    pub fn load_from_static() -> Self {
        serde_json::from_str(DEFAULT_AIRPORT_DATA).unwrap_or_default()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&AirportSeed> {
        self.airports.iter().find(|a| a.id == id)
    }
}

fn default_event_duration() -> u32 {
    1
}

/// Template for one stochastic quarterly event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventTemplate {
    pub id: String,
    pub name: String,
    pub desc: String,
    #[serde(default = "default_event_duration")]
    pub duration_quarters: u32,
    /// Replaces the global fuel price multiplier while active.
    #[serde(default)]
    pub fuel_multiplier: Option<f64>,
    /// Replaces the global economic-condition multiplier while active.
    #[serde(default)]
    pub demand_multiplier: Option<f64>,
    #[serde(default)]
    pub reputation_delta: f32,
    #[serde(default)]
    pub cash_delta: i64,
    #[serde(default)]
    pub research_bonus: u32,
}

/// Container for the event template catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EventCatalog {
    pub events: Vec<EventTemplate>,
}

impl EventCatalog {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load catalog from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into a valid catalog.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn from_templates(events: Vec<EventTemplate>) -> Self {
        Self { events }
    }

    #[must_use]
    pub fn load_from_static() -> Self {
        serde_json::from_str(DEFAULT_EVENT_DATA).unwrap_or_default()
    }
}

/// Name pools feeding the executive candidate generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ExecutivePools {
    pub first_names: Vec<String>,
    pub last_names: Vec<String>,
}

impl ExecutivePools {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load pools from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into valid pools.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn load_from_static() -> Self {
        serde_json::from_str(DEFAULT_EXECUTIVE_DATA).unwrap_or_default()
    }

    /// Generate one hireable candidate for the given role. The roster id is
    /// assigned at hire time.
    pub fn generate_candidate<R>(&self, role: ExecutiveRole, rng: &mut R) -> Executive
    where
        R: Rng + ?Sized,
    {
        let first = pick(&self.first_names, rng).unwrap_or("Alex");
        let last = pick(&self.last_names, rng).unwrap_or("Hayes");
        let level_roll = rng.random::<f32>();
        let level = if level_roll < 0.6 {
            ExecutiveLevel::Junior
        } else if level_roll < 0.9 {
            ExecutiveLevel::Senior
        } else {
            ExecutiveLevel::Expert
        };
        let mut skills = Skills {
            negotiation: rng.random_range(30.0..=70.0),
            marketing: rng.random_range(30.0..=70.0),
            analysis: rng.random_range(30.0..=70.0),
            operations: rng.random_range(30.0..=70.0),
        };
        match role {
            ExecutiveRole::Marketing => skills.marketing = (skills.marketing + 20.0).min(95.0),
            ExecutiveRole::Operations => skills.operations = (skills.operations + 20.0).min(95.0),
            ExecutiveRole::Finance => skills.analysis = (skills.analysis + 20.0).min(95.0),
            ExecutiveRole::Strategy => skills.negotiation = (skills.negotiation + 20.0).min(95.0),
        }
        Executive {
            id: 0,
            name: format!("{first} {last}"),
            role,
            level,
            skills,
            salary: level.base_salary(),
            experience: 0,
            morale: 70.0,
            current_action: None,
        }
    }

    /// One fresh candidate per role, in role order.
    pub fn generate_candidates<R>(&self, rng: &mut R) -> Vec<Executive>
    where
        R: Rng + ?Sized,
    {
        ExecutiveRole::ALL
            .iter()
            .map(|role| self.generate_candidate(*role, rng))
            .collect()
    }
}

fn pick<'a, R>(pool: &'a [String], rng: &mut R) -> Option<&'a str>
where
    R: Rng + ?Sized,
{
    if pool.is_empty() {
        return None;
    }
    let idx = rng.random_range(0..pool.len());
    pool.get(idx).map(String::as_str)
}

/// Bundle of every reference catalog the engine consumes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReferenceData {
    pub aircraft: AircraftCatalog,
    pub airports: AirportCatalog,
    pub events: EventCatalog,
    pub executives: ExecutivePools,
}

impl ReferenceData {
    /// Empty bundle, useful for tests that build their own fixtures.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn load_from_static() -> Self {
        Self {
            aircraft: AircraftCatalog::load_from_static(),
            airports: AirportCatalog::load_from_static(),
            events: EventCatalog::load_from_static(),
            executives: ExecutivePools::load_from_static(),
        }
    }
}

/// Shared static bundle for callers that do not inject their own data.
#[must_use]
pub fn reference_data() -> &'static ReferenceData {
    static DATA: OnceLock<ReferenceData> = OnceLock::new();
    DATA.get_or_init(ReferenceData::load_from_static)
}
