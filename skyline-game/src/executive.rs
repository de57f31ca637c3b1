//! Executive roster and the action scheduler.
//!
//! Executives occupy one of four role slots and run multi-quarter actions
//! from a fixed catalog. Resolution rolls a success chance from level, the
//! action's primary skill, and morale; successes pay out effects and
//! experience, failures cost morale.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{
    EXEC_MORALE_ON_CANCEL, EXEC_MORALE_ON_FAILURE, EXEC_MORALE_ON_FIRE, EXEC_MORALE_ON_SUCCESS,
    EXEC_MORALE_PIVOT, EXEC_MORALE_WEIGHT, EXEC_PROMOTION_SALARY_MULT, EXEC_ROSTER_CAP,
    EXEC_SKILL_WEIGHT, EXEC_SUCCESS_BASE, EXEC_SUCCESS_CAP, EXEC_XP_FOR_EXPERT,
    EXEC_XP_FOR_SENIOR, HUB_DEVELOPMENT_BONUS,
};
use crate::numbers::{floor_f64_to_i64, i64_to_f64};
use crate::state::{CommandResult, EngineError, GameState, PendingBonus};

/// Role slots; at most one executive per role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutiveRole {
    Marketing,
    Operations,
    Finance,
    Strategy,
}

impl ExecutiveRole {
    pub const ALL: [Self; 4] = [
        Self::Marketing,
        Self::Operations,
        Self::Finance,
        Self::Strategy,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Marketing => "Marketing",
            Self::Operations => "Operations",
            Self::Finance => "Finance",
            Self::Strategy => "Strategy",
        }
    }
}

impl fmt::Display for ExecutiveRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Seniority ladder. Promotion multiplies salary and resets experience.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutiveLevel {
    Junior,
    Senior,
    Expert,
}

impl ExecutiveLevel {
    /// Quarterly salary at hire time for this level.
    #[must_use]
    pub const fn base_salary(self) -> i64 {
        match self {
            Self::Junior => 150_000,
            Self::Senior => 300_000,
            Self::Expert => 600_000,
        }
    }

    /// Flat addition to the action success chance.
    #[must_use]
    pub const fn success_bonus(self) -> f32 {
        match self {
            Self::Junior => 0.0,
            Self::Senior => 15.0,
            Self::Expert => 30.0,
        }
    }

    /// Experience granted per successful action. Juniors learn fastest.
    #[must_use]
    pub const fn experience_per_success(self) -> u32 {
        match self {
            Self::Junior => 100,
            Self::Senior => 50,
            Self::Expert => 25,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Junior => "junior",
            Self::Senior => "senior",
            Self::Expert => "expert",
        }
    }
}

/// Skill sheet, each component 0..=100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Skills {
    pub negotiation: f32,
    pub marketing: f32,
    pub analysis: f32,
    pub operations: f32,
}

/// One roster member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Executive {
    pub id: u32,
    pub name: String,
    pub role: ExecutiveRole,
    pub level: ExecutiveLevel,
    pub skills: Skills,
    /// Quarterly salary in dollars.
    pub salary: i64,
    pub experience: u32,
    /// 0..=100.
    pub morale: f32,
    /// Id of the in-flight action, if busy.
    #[serde(default)]
    pub current_action: Option<u32>,
}

impl Executive {
    fn adjust_morale(&mut self, delta: f32) {
        self.morale = (self.morale + delta).clamp(0.0, 100.0);
    }

    /// Promote when the experience threshold for the next level is met.
    fn maybe_promote(&mut self) -> bool {
        let next = match self.level {
            ExecutiveLevel::Junior if self.experience >= EXEC_XP_FOR_SENIOR => {
                ExecutiveLevel::Senior
            }
            ExecutiveLevel::Senior if self.experience >= EXEC_XP_FOR_EXPERT => {
                ExecutiveLevel::Expert
            }
            _ => return false,
        };
        self.level = next;
        self.salary = floor_f64_to_i64(i64_to_f64(self.salary) * EXEC_PROMOTION_SALARY_MULT);
        self.experience = 0;
        true
    }
}

/// Fixed action catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    SlotNegotiation,
    AdCampaign,
    RouteAnalysis,
    CompetitorIntel,
    AircraftDeal,
    LaborRelations,
    GovtRelations,
    HubDevelopment,
}

impl ActionType {
    /// Upfront cost, deducted at assignment.
    #[must_use]
    pub const fn cost(self) -> i64 {
        match self {
            Self::SlotNegotiation => 200_000,
            Self::AdCampaign => 500_000,
            Self::RouteAnalysis => 100_000,
            Self::CompetitorIntel => 150_000,
            Self::AircraftDeal => 300_000,
            Self::LaborRelations => 250_000,
            Self::GovtRelations => 400_000,
            Self::HubDevelopment => 1_000_000,
        }
    }

    #[must_use]
    pub const fn duration_quarters(self) -> u32 {
        match self {
            Self::AdCampaign | Self::RouteAnalysis => 1,
            Self::SlotNegotiation
            | Self::CompetitorIntel
            | Self::LaborRelations
            | Self::HubDevelopment => 2,
            Self::AircraftDeal | Self::GovtRelations => 3,
        }
    }

    /// Skill component feeding the success roll.
    #[must_use]
    pub const fn primary_skill(self, skills: &Skills) -> f32 {
        match self {
            Self::SlotNegotiation | Self::AircraftDeal => skills.negotiation,
            Self::AdCampaign => skills.marketing,
            Self::RouteAnalysis | Self::CompetitorIntel => skills.analysis,
            Self::LaborRelations | Self::GovtRelations | Self::HubDevelopment => skills.operations,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::SlotNegotiation => "slot negotiation",
            Self::AdCampaign => "ad campaign",
            Self::RouteAnalysis => "route analysis",
            Self::CompetitorIntel => "competitor intel",
            Self::AircraftDeal => "aircraft deal",
            Self::LaborRelations => "labor relations",
            Self::GovtRelations => "government relations",
            Self::HubDevelopment => "hub development",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One in-flight executive action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutiveAction {
    pub id: u32,
    pub executive_id: u32,
    pub action_type: ActionType,
    /// Airport id for targeted actions (hub development).
    #[serde(default)]
    pub target: Option<String>,
    pub quarters_remaining: u32,
}

/// Success chance in percent: base plus level bonus plus weighted skill plus
/// weighted morale offset. Capped at 95, deliberately unfloored — a demoralized
/// junior can roll a negative chance and is then guaranteed to fail.
#[must_use]
pub fn success_chance(executive: &Executive, action_type: ActionType) -> f32 {
    let chance = EXEC_SUCCESS_BASE
        + executive.level.success_bonus()
        + EXEC_SKILL_WEIGHT * action_type.primary_skill(&executive.skills)
        + EXEC_MORALE_WEIGHT * (executive.morale - EXEC_MORALE_PIVOT);
    chance.min(EXEC_SUCCESS_CAP)
}

impl GameState {
    /// Add a candidate to the roster. The first salary charge lands with the
    /// next quarterly expense run; hiring only validates affordability.
    ///
    /// # Errors
    ///
    /// `CapacityExceeded` at the roster cap, `ResourceBusy` when the role
    /// slot is filled, `InsufficientFunds` when the salary exceeds cash.
    pub fn hire_executive(&mut self, candidate: Executive) -> CommandResult<u32> {
        if self.executives.len() >= EXEC_ROSTER_CAP {
            return Err(EngineError::CapacityExceeded(format!(
                "roster holds at most {EXEC_ROSTER_CAP} executives"
            )));
        }
        if self.executives.iter().any(|e| e.role == candidate.role) {
            return Err(EngineError::ResourceBusy(format!(
                "{} role is already filled",
                candidate.role
            )));
        }
        if self.cash < candidate.salary {
            return Err(EngineError::InsufficientFunds {
                needed: candidate.salary,
                available: self.cash,
            });
        }
        let id = self.next_executive_id;
        self.next_executive_id += 1;
        let name = candidate.name.clone();
        let role = candidate.role;
        self.executives.push(Executive {
            id,
            current_action: None,
            ..candidate
        });
        self.push_news(format!("{name} joins as head of {role}."));
        Ok(id)
    }

    /// Remove an executive, cancelling any in-flight action. The rest of the
    /// roster takes a morale hit.
    ///
    /// # Errors
    ///
    /// `NotFound` for unknown ids.
    pub fn fire_executive(&mut self, executive_id: u32) -> CommandResult<()> {
        let name = self
            .executive(executive_id)
            .map(|e| e.name.clone())
            .ok_or_else(|| EngineError::NotFound(format!("executive {executive_id}")))?;
        self.actions.retain(|a| a.executive_id != executive_id);
        self.executives.retain(|e| e.id != executive_id);
        for executive in &mut self.executives {
            executive.adjust_morale(-EXEC_MORALE_ON_FIRE);
        }
        self.push_news(format!("{name} leaves the company."));
        Ok(())
    }

    /// Start an action from the catalog. The cost is deducted immediately and
    /// is not refunded on failure or cancellation.
    ///
    /// # Errors
    ///
    /// `NotFound` for unknown executives or an unknown target airport;
    /// `ResourceBusy` when the executive is already acting; `Validation` when
    /// hub development lacks a hub target; `InsufficientFunds` for the cost.
    pub fn assign_executive_action(
        &mut self,
        executive_id: u32,
        action_type: ActionType,
        target: Option<&str>,
    ) -> CommandResult<u32> {
        {
            let executive = self
                .executive(executive_id)
                .ok_or_else(|| EngineError::NotFound(format!("executive {executive_id}")))?;
            if executive.current_action.is_some() {
                return Err(EngineError::ResourceBusy(format!(
                    "{} is already on an assignment",
                    executive.name
                )));
            }
        }
        if action_type == ActionType::HubDevelopment {
            let target_id = target.ok_or_else(|| {
                EngineError::Validation(String::from("hub development needs a target airport"))
            })?;
            let airport = self
                .airport(target_id)
                .ok_or_else(|| EngineError::NotFound(format!("airport {target_id}")))?;
            if !airport.hub {
                return Err(EngineError::Validation(format!(
                    "{target_id} is not a hub"
                )));
            }
        }
        self.debit(action_type.cost())?;
        let id = self.next_action_id;
        self.next_action_id += 1;
        self.actions.push(ExecutiveAction {
            id,
            executive_id,
            action_type,
            target: target.map(str::to_string),
            quarters_remaining: action_type.duration_quarters(),
        });
        if let Some(executive) = self.executives.iter_mut().find(|e| e.id == executive_id) {
            executive.current_action = Some(id);
        }
        Ok(id)
    }

    /// Abort an in-flight action. No refund; the executive resents it.
    ///
    /// # Errors
    ///
    /// `NotFound` when the action or its owning executive is missing.
    pub fn cancel_executive_action(&mut self, action_id: u32) -> CommandResult<()> {
        let executive_id = self
            .actions
            .iter()
            .find(|a| a.id == action_id)
            .map(|a| a.executive_id)
            .ok_or_else(|| EngineError::NotFound(format!("action {action_id}")))?;
        let executive = self
            .executives
            .iter_mut()
            .find(|e| e.id == executive_id)
            .ok_or_else(|| EngineError::NotFound(format!("executive {executive_id}")))?;
        executive.current_action = None;
        executive.adjust_morale(-EXEC_MORALE_ON_CANCEL);
        self.actions.retain(|a| a.id != action_id);
        Ok(())
    }
}

/// Quarterly action pass: decrement every countdown, then resolve the
/// expired ones. Without an RNG the roll degrades to "succeed at 50+ chance"
/// and ranged payouts land on their midpoints.
pub(crate) fn process_executive_actions(state: &mut GameState) {
    for action in &mut state.actions {
        action.quarters_remaining = action.quarters_remaining.saturating_sub(1);
    }
    let finished: Vec<ExecutiveAction> = state
        .actions
        .iter()
        .filter(|a| a.quarters_remaining == 0)
        .cloned()
        .collect();
    state.actions.retain(|a| a.quarters_remaining > 0);

    let mut rng = state.rng.take();
    for action in finished {
        resolve_action(state, &action, rng.as_mut());
    }
    state.rng = rng;
}

fn resolve_action(
    state: &mut GameState,
    action: &ExecutiveAction,
    mut rng: Option<&mut rand_chacha::ChaCha20Rng>,
) {
    let Some(idx) = state
        .executives
        .iter()
        .position(|e| e.id == action.executive_id)
    else {
        return;
    };
    let chance = success_chance(&state.executives[idx], action.action_type);
    let succeeded = match rng.as_mut() {
        Some(rng) => rng.random_range(0.0..100.0) < chance,
        None => chance >= 50.0,
    };
    let name = state.executives[idx].name.clone();
    let label = action.action_type.label();

    if succeeded {
        apply_success(state, action, rng);
        let executive = &mut state.executives[idx];
        executive.adjust_morale(EXEC_MORALE_ON_SUCCESS);
        executive.experience += executive.level.experience_per_success();
        if executive.maybe_promote() {
            let level = executive.level.label();
            state.push_news(format!("{name} promoted to {level} level."));
        }
        state.push_news(format!("{name} delivers: {label} succeeded."));
    } else {
        state.executives[idx].adjust_morale(-EXEC_MORALE_ON_FAILURE);
        state.push_news(format!("{name} comes up short: {label} failed."));
    }
    if let Some(executive) = state.executives.iter_mut().find(|e| e.id == action.executive_id) {
        executive.current_action = None;
    }
}

fn apply_success(
    state: &mut GameState,
    action: &ExecutiveAction,
    rng: Option<&mut rand_chacha::ChaCha20Rng>,
) {
    match action.action_type {
        ActionType::SlotNegotiation => {
            let percent = match rng {
                Some(rng) => rng.random_range(10.0..=30.0),
                None => 20.0,
            };
            state
                .pending_bonuses
                .push(PendingBonus::SlotDiscount { percent });
        }
        ActionType::AircraftDeal => {
            let percent = match rng {
                Some(rng) => rng.random_range(5.0..=20.0),
                None => 12.5,
            };
            state
                .pending_bonuses
                .push(PendingBonus::AircraftDiscount { percent });
        }
        ActionType::AdCampaign => {
            let delta = match rng {
                Some(rng) => rng.random_range(5.0..=15.0),
                None => 10.0,
            };
            state.adjust_reputation(delta);
        }
        ActionType::HubDevelopment => {
            if let Some(airport) = action
                .target
                .as_deref()
                .and_then(|id| state.airport_mut(id))
            {
                if airport.hub {
                    airport.hub_efficiency_bonus =
                        (airport.hub_efficiency_bonus + HUB_DEVELOPMENT_BONUS).min(100.0);
                }
            }
        }
        ActionType::RouteAnalysis
        | ActionType::CompetitorIntel
        | ActionType::LaborRelations
        | ActionType::GovtRelations => {}
    }
}
