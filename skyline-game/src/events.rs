//! Random quarterly events: a single per-turn trigger roll against a fixed
//! template catalog, plus expiry processing for multi-quarter effects.
//!
//! Multiplier effects (fuel, demand) replace the current scalar while active
//! and snap back to 1.0 on expiry. Additive effects (cash, reputation,
//! research) land once at trigger time and are never reverted.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::{EVENT_CHANCE_PER_QUARTER, RESEARCH_LEVEL_CAP};
use crate::data::EventTemplate;
use crate::state::GameState;

/// One event currently in effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveEvent {
    pub template_id: String,
    pub name: String,
    pub quarters_remaining: u32,
    /// Whether the event replaced the fuel-price scalar.
    #[serde(default)]
    pub fuel_effect: bool,
    /// Whether the event replaced the economic-condition scalar.
    #[serde(default)]
    pub demand_effect: bool,
}

/// Apply a template's immediate effects and register its countdown.
fn activate(state: &mut GameState, template: &EventTemplate) {
    if let Some(fuel) = template.fuel_multiplier {
        state.fuel_price = fuel;
    }
    if let Some(demand) = template.demand_multiplier {
        state.economic_condition = demand;
    }
    state.adjust_reputation(template.reputation_delta);
    state.cash += template.cash_delta;
    if template.research_bonus > 0 {
        state.research_level =
            (state.research_level + template.research_bonus).min(RESEARCH_LEVEL_CAP);
    }
    state.active_events.push(ActiveEvent {
        template_id: template.id.clone(),
        name: template.name.clone(),
        quarters_remaining: template.duration_quarters,
        fuel_effect: template.fuel_multiplier.is_some(),
        demand_effect: template.demand_multiplier.is_some(),
    });
    state.push_news(format!("{}: {}", template.name, template.desc));
}

/// One trigger roll per turn at a fixed chance; on a hit, a uniform pick from
/// the catalog. Without an RNG no event ever triggers.
pub(crate) fn maybe_trigger_event(state: &mut GameState) {
    let Some(mut rng) = state.rng.take() else {
        return;
    };
    if rng.random::<f32>() < EVENT_CHANCE_PER_QUARTER {
        let template = state.data.as_ref().and_then(|data| {
            if data.events.events.is_empty() {
                None
            } else {
                let idx = rng.random_range(0..data.events.events.len());
                data.events.events.get(idx).cloned()
            }
        });
        if let Some(template) = template {
            activate(state, &template);
        }
    }
    state.rng = Some(rng);
}

/// Quarterly expiry pass: decrement countdowns, then unwind multiplier
/// effects for events that just ended.
pub(crate) fn process_events(state: &mut GameState) {
    for event in &mut state.active_events {
        event.quarters_remaining = event.quarters_remaining.saturating_sub(1);
    }
    let expired: Vec<ActiveEvent> = state
        .active_events
        .iter()
        .filter(|e| e.quarters_remaining == 0)
        .cloned()
        .collect();
    state.active_events.retain(|e| e.quarters_remaining > 0);
    for event in expired {
        if event.fuel_effect {
            state.fuel_price = 1.0;
        }
        if event.demand_effect {
            state.economic_condition = 1.0;
        }
        state.push_news(format!("{} has run its course.", event.name));
    }
}
