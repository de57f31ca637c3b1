//! Financial ledger: loans, quarterly revenue/expense aggregation, and the
//! final score formula.
//!
//! Loan repayment deliberately mixes two schedules: the cash outflow each
//! quarter is the fixed annuity payment, while the remaining balance is
//! amortized straight-line at `amount / quarters`. The two disagree by the
//! interest portion; the balance is a countdown, not an accounting identity.

use serde::{Deserialize, Serialize};

use crate::constants::{
    AIRCRAFT_MAINTENANCE_BASE, AIRPORT_MAINTENANCE_FLAT, EMERGENCY_LOAN_QUARTERS,
    EMERGENCY_LOAN_RATE, LOAN_INTEREST_RATE, RESEARCH_COST_PER_LEVEL, SCORE_CASH_DIVISOR,
    SCORE_PER_AIRCRAFT, SCORE_PER_AIRPORT, SCORE_PER_REPUTATION, SCORE_PER_ROUTE,
};
use crate::numbers::{floor_f64_to_i64, i64_to_f64, round_f64_to_i64};
use crate::state::{CommandResult, EngineError, GameState};

/// One outstanding loan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub amount: i64,
    pub interest_rate: f64,
    /// Fixed annuity payment charged every quarter.
    pub quarterly_payment: i64,
    /// Straight-line principal reduction applied to `remaining`.
    pub principal_per_quarter: i64,
    pub remaining: i64,
    pub quarters_remaining: u32,
    #[serde(default)]
    pub emergency: bool,
}

/// Fixed quarterly annuity payment for a loan.
#[must_use]
pub fn annuity_payment(amount: i64, rate: f64, quarters: u32) -> i64 {
    let principal = i64_to_f64(amount);
    if rate <= 0.0 {
        return round_f64_to_i64(principal / f64::from(quarters.max(1)));
    }
    let q = i32::try_from(quarters).unwrap_or(i32::MAX);
    let payment = principal * rate / (1.0 - (1.0 + rate).powi(-q));
    round_f64_to_i64(payment)
}

impl GameState {
    /// Borrow at the standard rate. Cash is credited immediately; there is no
    /// affordability gate on borrowing.
    ///
    /// # Errors
    ///
    /// `Validation` for non-positive amounts or zero-quarter terms.
    pub fn take_loan(&mut self, amount: i64, quarters: u32) -> CommandResult<()> {
        self.push_loan(amount, quarters, LOAN_INTEREST_RATE, false)?;
        self.push_news(format!("Loan of ${amount} drawn over {quarters} quarters."));
        Ok(())
    }

    /// Borrow on emergency terms: fixed 12-quarter term at the penalty rate.
    /// Taking one resets the consecutive-loss counter, buying breathing room
    /// before the next emergency signal.
    ///
    /// # Errors
    ///
    /// `Validation` for non-positive amounts.
    pub fn take_emergency_loan(&mut self, amount: i64) -> CommandResult<()> {
        self.push_loan(amount, EMERGENCY_LOAN_QUARTERS, EMERGENCY_LOAN_RATE, true)?;
        self.consecutive_losses = 0;
        self.push_news(format!("Emergency credit line of ${amount} drawn."));
        Ok(())
    }

    fn push_loan(
        &mut self,
        amount: i64,
        quarters: u32,
        rate: f64,
        emergency: bool,
    ) -> CommandResult<()> {
        if amount <= 0 {
            return Err(EngineError::Validation(String::from(
                "loan amount must be positive",
            )));
        }
        if quarters == 0 {
            return Err(EngineError::Validation(String::from(
                "loan term must be at least one quarter",
            )));
        }
        self.cash += amount;
        self.loans.push(Loan {
            amount,
            interest_rate: rate,
            quarterly_payment: annuity_payment(amount, rate, quarters),
            principal_per_quarter: amount / i64::from(quarters),
            remaining: amount,
            quarters_remaining: quarters,
            emergency,
        });
        Ok(())
    }

    /// All quarterly outflows: route operating costs, leases, airport and
    /// aircraft maintenance, loan payments, advertising, research, salaries.
    /// Aircraft maintenance applies to every airframe whether or not it flies.
    #[must_use]
    pub fn quarterly_expenses(&self) -> i64 {
        let flight_costs: f64 = self
            .routes
            .iter()
            .map(|route| self.route_operating_cost(route))
            .sum();
        let leases: i64 = self
            .fleet
            .iter()
            .filter(|a| a.is_leased())
            .filter_map(|a| self.aircraft_type(&a.type_id))
            .map(|ty| ty.lease_per_quarter)
            .sum();
        let airport_maintenance =
            AIRPORT_MAINTENANCE_FLAT * self.owned_airport_count() as i64;
        let aircraft_maintenance: f64 = self
            .fleet
            .iter()
            .map(|a| i64_to_f64(AIRCRAFT_MAINTENANCE_BASE) * a.condition().maintenance_multiplier())
            .sum();
        let loan_payments: i64 = self.loans.iter().map(|l| l.quarterly_payment).sum();
        let research = i64::from(self.research_level) * RESEARCH_COST_PER_LEVEL;
        let salaries: i64 = self.executives.iter().map(|e| e.salary).sum();

        round_f64_to_i64(flight_costs + aircraft_maintenance)
            + leases
            + airport_maintenance
            + loan_payments
            + self.advertising_budget
            + research
            + salaries
    }

    /// All quarterly inflows: the sum of per-route revenue. Suspended routes
    /// contribute nothing inside the route formula.
    #[must_use]
    pub fn quarterly_revenue(&self) -> i64 {
        let total: f64 = self
            .routes
            .iter()
            .map(|route| self.route_revenue(route))
            .sum();
        round_f64_to_i64(total)
    }

    /// Final score, floored to a whole number.
    #[must_use]
    pub fn calculate_score(&self) -> i64 {
        let score = i64_to_f64(self.cash) / i64_to_f64(SCORE_CASH_DIVISOR)
            + i64_to_f64(self.owned_airport_count() as i64 * SCORE_PER_AIRPORT)
            + i64_to_f64(self.fleet.len() as i64 * SCORE_PER_AIRCRAFT)
            + f64::from(self.reputation) * i64_to_f64(SCORE_PER_REPUTATION)
            + i64_to_f64(self.routes.len() as i64 * SCORE_PER_ROUTE);
        floor_f64_to_i64(score)
    }
}

/// Quarterly loan pass: tick down the term, reduce the balance straight-line,
/// and retire loans whose term or balance has run out.
pub(crate) fn process_loans(state: &mut GameState) {
    let mut paid_off = 0usize;
    for loan in &mut state.loans {
        loan.quarters_remaining = loan.quarters_remaining.saturating_sub(1);
        loan.remaining -= loan.principal_per_quarter;
        if loan.quarters_remaining == 0 || loan.remaining <= 0 {
            paid_off += 1;
        }
    }
    state
        .loans
        .retain(|l| l.quarters_remaining > 0 && l.remaining > 0);
    for _ in 0..paid_off {
        state.push_news(String::from("A loan has been fully repaid."));
    }
}
