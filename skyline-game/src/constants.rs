//! Centralized balance and tuning constants for Skyline game logic.
//!
//! These values define the deterministic math for the quarterly simulation.
//! Keeping them together ensures that gameplay can only be adjusted via
//! code changes reviewed in version control, rather than through external
//! JSON assets.

// Calendar -----------------------------------------------------------------
pub const START_YEAR: i32 = 2026;
pub const VICTORY_YEAR: i32 = 2041;
pub const QUARTERS_PER_YEAR: u8 = 4;
pub const WEEKS_PER_QUARTER: f64 = 13.0;

// Starting position --------------------------------------------------------
pub const STARTING_CASH: i64 = 50_000_000;
pub const STARTING_REPUTATION: f32 = 75.0;
pub const DEFAULT_NEGOTIATION_CAPACITY: usize = 3;

// Route economics ----------------------------------------------------------
pub const PRICE_PER_PAX_KM: f64 = 0.15;
pub const MIN_FLIGHTS_PER_WEEK: u8 = 1;
pub const MAX_FLIGHTS_PER_WEEK: u8 = 14;
pub const LOAD_FACTOR_BASE: f64 = 0.75;
pub const LOAD_FACTOR_REPUTATION_PIVOT: f64 = 75.0;
pub const LOAD_FACTOR_REPUTATION_SCALE: f64 = 200.0;
pub const LOAD_FACTOR_MIN: f64 = 0.40;
pub const LOAD_FACTOR_MAX: f64 = 0.95;
pub const COMPETITION_LOAD_PENALTY: f64 = 0.10;
pub const EARTH_RADIUS_KM: f64 = 6_371.0;

// Fleet --------------------------------------------------------------------
pub const RESALE_DECAY_PER_QUARTER: f64 = 0.9;
pub const RESALE_MARKET_FRACTION: f64 = 0.6;
pub const AIRCRAFT_MAINTENANCE_BASE: i64 = 50_000;
pub const MAINTENANCE_WARNING_YEARS: u32 = 15;
pub const MAINTENANCE_CRITICAL_YEARS: u32 = 20;
pub const MAINTENANCE_MILESTONE_STEP: u32 = 5;

// Airports and slots -------------------------------------------------------
pub const AIRPORT_MAINTENANCE_FLAT: i64 = 100_000;
pub const NEGOTIATION_DEPOSIT_PER_POINT: i64 = 5_000;
pub const NEGOTIATION_MIN_QUARTERS: u32 = 2;
pub const NEGOTIATION_MAX_QUARTERS: u32 = 5;
pub const NEGOTIATION_CANCEL_REFUND: f64 = 0.5;
pub const MARKET_SIZE_MIN: u32 = 100;
pub const MARKET_SIZE_MAX: u32 = 1_000;
pub const SCORE_DRIFT_MAX_STEP: f32 = 2.0;
pub const REGIONAL_SHOCK_CHANCE: f32 = 0.05;
pub const REGIONAL_SHOCK_MAGNITUDE: f32 = 10.0;
pub const AIRPORT_FLAVOR_NEWS_CHANCE: f32 = 0.03;

// Hubs ---------------------------------------------------------------------
pub const HUB_ESTABLISH_COST: i64 = 5_000_000;
pub const HUB_MIN_TOUCHING_ROUTES: usize = 2;
pub const HUB_EFFICIENCY_MIN: f32 = 30.0;
pub const HUB_EFFICIENCY_MAX: f32 = 100.0;
pub const HUB_DEVELOPMENT_BONUS: f32 = 15.0;
pub const HUB_CONNECTING_SHARE: f64 = 0.25;
pub const HUB_EFFICIENCY_BONUS_CAP: f64 = 0.15;
pub const HUB_DENSITY_BONUS_CAP: f64 = 0.10;
pub const HUB_DISTANCE_BONUS_CAP: f64 = 0.05;
pub const HUB_PATTERN_SAMPLES: usize = 5;

// Finance ------------------------------------------------------------------
pub const LOAN_INTEREST_RATE: f64 = 0.02;
pub const EMERGENCY_LOAN_RATE: f64 = 0.05;
pub const EMERGENCY_LOAN_QUARTERS: u32 = 12;
pub const RESEARCH_COST_PER_LEVEL: i64 = 250_000;
pub const RESEARCH_LEVEL_CAP: u32 = 10;
pub const ADVERTISING_REP_PER_DOLLAR: f64 = 1.0 / 500_000.0;
pub const ADVERTISING_REP_CAP: f32 = 5.0;
pub const REPUTATION_GAIN_ON_PROFIT: f32 = 1.0;
pub const REPUTATION_LOSS_ON_DEFICIT: f32 = 2.0;

// Terminal conditions ------------------------------------------------------
pub const BANKRUPTCY_THRESHOLD: i64 = -10_000_000;
pub const LOW_CASH_THRESHOLD: i64 = 5_000_000;
pub const CONSECUTIVE_LOSS_LIMIT: u32 = 3;

// Events -------------------------------------------------------------------
pub const EVENT_CHANCE_PER_QUARTER: f32 = 0.10;

// Executives ---------------------------------------------------------------
pub const EXEC_ROSTER_CAP: usize = 4;
pub const EXEC_SUCCESS_BASE: f32 = 50.0;
pub const EXEC_SUCCESS_CAP: f32 = 95.0;
pub const EXEC_SKILL_WEIGHT: f32 = 0.3;
pub const EXEC_MORALE_WEIGHT: f32 = 0.2;
pub const EXEC_MORALE_PIVOT: f32 = 50.0;
pub const EXEC_MORALE_ON_SUCCESS: f32 = 5.0;
pub const EXEC_MORALE_ON_FAILURE: f32 = 10.0;
pub const EXEC_MORALE_ON_FIRE: f32 = 5.0;
pub const EXEC_MORALE_ON_CANCEL: f32 = 10.0;
pub const EXEC_XP_FOR_SENIOR: u32 = 500;
pub const EXEC_XP_FOR_EXPERT: u32 = 1_000;
pub const EXEC_PROMOTION_SALARY_MULT: f64 = 1.5;

// Competitors --------------------------------------------------------------
pub const COMPETITOR_STARTING_CASH: i64 = 30_000_000;
pub const COMPETITOR_BASE_REPUTATION: f32 = 50.0;
pub const COMPETITOR_PROFIT_PER_AIRPORT: i64 = 500_000;
pub const COMPETITOR_NOISE_MIN: f64 = -0.30;
pub const COMPETITOR_NOISE_MAX: f64 = 0.25;
pub const COMPETITOR_EXPANSION_THRESHOLD: i64 = 20_000_000;
pub const COMPETITOR_EXPANSION_CHANCE: f32 = 0.3;
pub const COMPETITOR_AIRPORT_COST_PER_POINT: i64 = 50_000;
pub const COMPETITOR_REP_GAIN: f32 = 2.0;
pub const COMPETITOR_REP_LOSS: f32 = 1.0;
pub const COMPETITOR_REP_FLOOR: f32 = 20.0;
pub const COMPETITOR_REP_CEILING: f32 = 100.0;

// News ---------------------------------------------------------------------
pub const NEWS_LOG_CAP: usize = 50;

// Scoring ------------------------------------------------------------------
pub const SCORE_CASH_DIVISOR: i64 = 1_000_000;
pub const SCORE_PER_AIRPORT: i64 = 100;
pub const SCORE_PER_AIRCRAFT: i64 = 50;
pub const SCORE_PER_REPUTATION: i64 = 10;
pub const SCORE_PER_ROUTE: i64 = 75;
