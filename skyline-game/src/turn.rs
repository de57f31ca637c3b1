//! Turn orchestrator: one `advance_turn` call runs the entire quarterly
//! sequence. Step order is a contract; later steps read state earlier steps
//! wrote (the loss counter feeds the emergency signal, negotiations finalize
//! before the terminal ladder, and so on).

use log::debug;
use serde::{Deserialize, Serialize};

use crate::airport::process_airport_economics;
use crate::competitor::process_competitors;
use crate::constants::{
    ADVERTISING_REP_CAP, ADVERTISING_REP_PER_DOLLAR, BANKRUPTCY_THRESHOLD,
    CONSECUTIVE_LOSS_LIMIT, LOW_CASH_THRESHOLD, MAINTENANCE_CRITICAL_YEARS,
    MAINTENANCE_MILESTONE_STEP, MAINTENANCE_WARNING_YEARS, REPUTATION_GAIN_ON_PROFIT,
    REPUTATION_LOSS_ON_DEFICIT, VICTORY_YEAR,
};
use crate::events::{maybe_trigger_event, process_events};
use crate::executive::process_executive_actions;
use crate::finance::process_loans;
use crate::hub::recompute_hub_metrics;
use crate::negotiation::process_negotiations;
use crate::numbers::{clamp_f64_to_f32, i64_to_f64};
use crate::state::GameState;

/// Outcome of one quarterly turn. At most one of the signal flags is set;
/// they are evaluated as a ladder, most severe first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TurnResult {
    /// Calendar position after the turn.
    pub year: i32,
    pub quarter: u8,
    pub revenue: i64,
    pub expenses: i64,
    pub profit: i64,
    pub game_over: bool,
    pub victory: bool,
    /// The loss streak hit its limit; the caller must force a
    /// loan-or-bankruptcy choice before advancing again.
    pub emergency_loan_required: bool,
    pub low_cash_warning: bool,
    /// Final score, present only on victory.
    pub score: Option<i64>,
}

impl GameState {
    /// Run one full quarter. Invoked only between player commands, never
    /// reentrantly; every mutation happens inside this call stack.
    pub fn advance_turn(&mut self) -> TurnResult {
        // 1. Ageing first so this quarter's costs reflect the new condition.
        self.age_fleet();

        // 2-3. Settle the books and the loss streak.
        let revenue = self.quarterly_revenue();
        let expenses = self.quarterly_expenses();
        let profit = revenue - expenses;
        self.cash += profit;
        self.last_quarter_profit = profit;
        if profit < 0 {
            self.consecutive_losses += 1;
        } else {
            self.consecutive_losses = 0;
        }
        debug!(
            "quarter settled: revenue={revenue} expenses={expenses} profit={profit} cash={}",
            self.cash
        );

        // 4. Reputation follows the profit sign; advertising adds on top.
        if profit > 0 && !self.routes.is_empty() {
            self.adjust_reputation(REPUTATION_GAIN_ON_PROFIT);
        } else if profit < 0 {
            self.adjust_reputation(-REPUTATION_LOSS_ON_DEFICIT);
        }
        if self.advertising_budget > 0 {
            let bonus = clamp_f64_to_f32(i64_to_f64(self.advertising_budget) * ADVERTISING_REP_PER_DOLLAR);
            self.adjust_reputation(bonus.min(ADVERTISING_REP_CAP));
        }

        // 5-6. Calendar and quarterly headline.
        if self.clock.advance_quarter() {
            self.push_news(format!("A new year begins: {}.", self.clock.year));
        }
        if profit >= 0 {
            self.push_news(format!("Quarterly results: ${profit} profit."));
        } else {
            self.push_news(format!("Quarterly results: ${} loss.", -profit));
        }

        // 7-14. Subsystem passes, in contract order.
        process_events(self);
        maybe_trigger_event(self);
        process_loans(self);
        process_competitors(self);
        process_airport_economics(self);
        recompute_hub_metrics(self);
        process_negotiations(self);
        process_executive_actions(self);

        // 15. Annual digest at the first quarter of each year.
        if self.clock.quarter == 1 {
            self.emit_annual_news();
        }

        // 16. Terminal ladder, most severe first.
        let mut result = TurnResult {
            year: self.clock.year,
            quarter: self.clock.quarter,
            revenue,
            expenses,
            profit,
            game_over: false,
            victory: false,
            emergency_loan_required: false,
            low_cash_warning: false,
            score: None,
        };
        if self.cash < BANKRUPTCY_THRESHOLD {
            result.game_over = true;
            self.push_news(format!("{} declares bankruptcy.", self.airline_name));
        } else if self.consecutive_losses >= CONSECUTIVE_LOSS_LIMIT {
            result.emergency_loan_required = true;
            self.push_news(String::from(
                "Creditors demand action: take an emergency loan or fold.",
            ));
        } else if self.cash < LOW_CASH_THRESHOLD && profit < 0 {
            result.low_cash_warning = true;
            self.push_news(String::from("Cash reserves are running low."));
        } else if self.clock.year >= VICTORY_YEAR {
            result.game_over = true;
            result.victory = true;
            result.score = Some(self.calculate_score());
            self.push_news(format!(
                "{} stands as an industry titan.",
                self.airline_name
            ));
        }
        result
    }

    /// Q1-only news: catalog production changes coming next year, plus
    /// maintenance milestones for ageing airframes (warning at 15 years,
    /// critical at 20 and every 5 years after).
    fn emit_annual_news(&mut self) {
        let next_year = self.clock.year + 1;
        let mut headlines: Vec<String> = Vec::new();
        if let Some(data) = &self.data {
            for ty in &data.aircraft.types {
                if ty.year_available == next_year {
                    headlines.push(format!("{} enters service next year.", ty.name));
                }
                if ty.year_discontinued == Some(next_year) {
                    headlines.push(format!("{} ends production next year.", ty.name));
                }
            }
        }
        for aircraft in &self.fleet {
            let age_years = aircraft.age_years();
            if age_years == MAINTENANCE_WARNING_YEARS {
                headlines.push(format!(
                    "{} is {age_years} years old; maintenance costs are climbing.",
                    aircraft.display_name
                ));
            } else if age_years >= MAINTENANCE_CRITICAL_YEARS
                && (age_years - MAINTENANCE_CRITICAL_YEARS) % MAINTENANCE_MILESTONE_STEP == 0
            {
                headlines.push(format!(
                    "{} is {age_years} years old and overdue for replacement.",
                    aircraft.display_name
                ));
            }
        }
        for headline in headlines {
            self.push_news(headline);
        }
    }
}
