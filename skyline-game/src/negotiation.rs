//! Slot negotiations: multi-quarter countdowns that convert unclaimed
//! airports into player-owned ones.
//!
//! The deposit is charged when talks open and is sunk on success; cancelling
//! early claws back half. Larger markets take longer to close.

use serde::{Deserialize, Serialize};

use crate::constants::{
    MARKET_SIZE_MAX, MARKET_SIZE_MIN, NEGOTIATION_CANCEL_REFUND, NEGOTIATION_DEPOSIT_PER_POINT,
    NEGOTIATION_MAX_QUARTERS, NEGOTIATION_MIN_QUARTERS,
};
use crate::numbers::{floor_f64_to_i64, i64_to_f64};
use crate::state::{CommandResult, EngineError, GameState};

/// One in-flight slot negotiation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotNegotiation {
    pub airport_id: String,
    pub quarters_remaining: u32,
    pub deposit: i64,
}

/// Terms quoted (and charged) when a negotiation opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NegotiationTerms {
    pub deposit: i64,
    pub quarters: u32,
}

/// Deposit scales linearly with market size.
#[must_use]
pub fn negotiation_deposit(market_size: u32) -> i64 {
    i64::from(market_size) * NEGOTIATION_DEPOSIT_PER_POINT
}

/// Duration interpolates between the min and max quarter bounds across the
/// market-size range. Bigger markets mean longer talks.
#[must_use]
pub fn negotiation_quarters(market_size: u32) -> u32 {
    let clamped = market_size.clamp(MARKET_SIZE_MIN, MARKET_SIZE_MAX);
    let span = f64::from(MARKET_SIZE_MAX - MARKET_SIZE_MIN);
    let t = f64::from(clamped - MARKET_SIZE_MIN) / span;
    let range = f64::from(NEGOTIATION_MAX_QUARTERS - NEGOTIATION_MIN_QUARTERS);
    NEGOTIATION_MIN_QUARTERS + (t * range).round() as u32
}

impl GameState {
    /// Open talks for slots at an unclaimed airport. The deposit is deducted
    /// immediately and is not refunded on success.
    ///
    /// # Errors
    ///
    /// `NotFound` for unknown airports; `Validation` when the airport is
    /// player-owned or competitor-held; `ResourceBusy` when talks are already
    /// open there; `CapacityExceeded` at the concurrent-negotiation limit;
    /// `InsufficientFunds` when the deposit is unaffordable.
    pub fn begin_slot_negotiation(&mut self, airport_id: &str) -> CommandResult<NegotiationTerms> {
        let market_size = {
            let airport = self
                .airport(airport_id)
                .ok_or_else(|| EngineError::NotFound(format!("airport {airport_id}")))?;
            if airport.owned {
                return Err(EngineError::Validation(format!(
                    "{airport_id} is already player-owned"
                )));
            }
            if let Some(owner) = &airport.competitor_owner {
                return Err(EngineError::Validation(format!(
                    "{airport_id} is held by {owner}"
                )));
            }
            airport.market_size
        };
        if self.negotiations.iter().any(|n| n.airport_id == airport_id) {
            return Err(EngineError::ResourceBusy(format!(
                "negotiation already open for {airport_id}"
            )));
        }
        if self.negotiations.len() >= self.negotiation_capacity {
            return Err(EngineError::CapacityExceeded(format!(
                "at most {} concurrent negotiations",
                self.negotiation_capacity
            )));
        }
        let deposit = negotiation_deposit(market_size);
        let quarters = negotiation_quarters(market_size);
        self.debit(deposit)?;
        self.negotiations.push(SlotNegotiation {
            airport_id: airport_id.to_string(),
            quarters_remaining: quarters,
            deposit,
        });
        self.push_news(format!(
            "Slot talks opened at {airport_id}, expected to run {quarters} quarters."
        ));
        Ok(NegotiationTerms { deposit, quarters })
    }

    /// Walk away from an open negotiation, recovering half the deposit.
    ///
    /// # Errors
    ///
    /// `NotFound` when no negotiation is open for the airport.
    pub fn cancel_slot_negotiation(&mut self, airport_id: &str) -> CommandResult<i64> {
        let idx = self
            .negotiations
            .iter()
            .position(|n| n.airport_id == airport_id)
            .ok_or_else(|| EngineError::NotFound(format!("negotiation for {airport_id}")))?;
        let negotiation = self.negotiations.remove(idx);
        let refund = floor_f64_to_i64(i64_to_f64(negotiation.deposit) * NEGOTIATION_CANCEL_REFUND);
        self.cash += refund;
        self.push_news(format!("Slot talks at {airport_id} abandoned."));
        Ok(refund)
    }
}

/// Quarterly negotiation pass: decrement every countdown first, then finalize
/// the ones that reached zero. The two phases stay separate so a freshly
/// opened negotiation can never close in the same turn it loses its first
/// quarter.
pub(crate) fn process_negotiations(state: &mut GameState) {
    for negotiation in &mut state.negotiations {
        negotiation.quarters_remaining = negotiation.quarters_remaining.saturating_sub(1);
    }
    let finished: Vec<String> = state
        .negotiations
        .iter()
        .filter(|n| n.quarters_remaining == 0)
        .map(|n| n.airport_id.clone())
        .collect();
    state.negotiations.retain(|n| n.quarters_remaining > 0);
    for airport_id in finished {
        let name = match state.airport_mut(&airport_id) {
            Some(airport) => {
                airport.owned = true;
                airport.competitor_owner = None;
                airport.name.clone()
            }
            None => airport_id.clone(),
        };
        state.push_news(format!("Slot agreement reached: {name} joins the network."));
    }
}
