//! Fiscal calendar tracking in whole quarters.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{QUARTERS_PER_YEAR, START_YEAR};

/// Current simulation date, advanced one quarter per turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationClock {
    pub year: i32,
    /// Fiscal quarter in 1..=4.
    pub quarter: u8,
}

impl Default for SimulationClock {
    fn default() -> Self {
        Self {
            year: START_YEAR,
            quarter: 1,
        }
    }
}

impl SimulationClock {
    #[must_use]
    pub const fn new(year: i32, quarter: u8) -> Self {
        Self { year, quarter }
    }

    /// Advance one quarter. Returns true when a year boundary was crossed.
    pub fn advance_quarter(&mut self) -> bool {
        self.quarter += 1;
        if self.quarter > QUARTERS_PER_YEAR {
            self.quarter = 1;
            self.year += 1;
            true
        } else {
            false
        }
    }

    /// Total quarters elapsed since the given starting year.
    #[must_use]
    pub const fn quarters_since(&self, start_year: i32) -> i32 {
        (self.year - start_year) * QUARTERS_PER_YEAR as i32 + self.quarter as i32 - 1
    }
}

impl fmt::Display for SimulationClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q{} {}", self.quarter, self.year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advances_within_year_without_rollover() {
        let mut clock = SimulationClock::new(2030, 2);
        assert!(!clock.advance_quarter());
        assert_eq!(clock, SimulationClock::new(2030, 3));
    }

    #[test]
    fn rolls_over_to_next_year_after_q4() {
        let mut clock = SimulationClock::new(2030, 4);
        assert!(clock.advance_quarter());
        assert_eq!(clock, SimulationClock::new(2031, 1));
    }

    #[test]
    fn quarter_stays_in_bounds_over_many_turns() {
        let mut clock = SimulationClock::default();
        for _ in 0..40 {
            clock.advance_quarter();
            assert!((1..=4).contains(&clock.quarter));
        }
        assert_eq!(clock.year, START_YEAR + 10);
    }

    #[test]
    fn quarters_since_counts_from_start() {
        let clock = SimulationClock::new(START_YEAR + 2, 3);
        assert_eq!(clock.quarters_since(START_YEAR), 10);
    }

    #[test]
    fn display_formats_quarter_and_year() {
        assert_eq!(SimulationClock::new(2027, 4).to_string(), "Q4 2027");
    }
}
