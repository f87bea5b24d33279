//! Battle state, status machine, event log and metrics

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::core::error::{ChronicleError, Result};
use crate::core::types::{EventId, FighterId, MoveId, SessionId, Turn};
use crate::fighter::{Environment, Fighter};
use crate::narrative::Beat;

/// How a completed battle ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Victory { winner: FighterId, loser: FighterId },
    Draw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StalemateReason {
    /// No HP changed for the configured window of consecutive ticks
    NoProgress,
    /// The configured turn limit was reached
    TurnLimit,
}

/// Battle lifecycle
///
/// Terminal flags are derived from this, so a finished battle without a
/// winner, draw or stalemate cannot be expressed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BattleStatus {
    #[default]
    Idle,
    Running,
    Completed(Outcome),
    Stalemate(StalemateReason),
    ErrorAborted { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Start,
    Finish(Outcome),
    Stall(StalemateReason),
    Abort(String),
}

impl BattleStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BattleStatus::Completed(_) | BattleStatus::Stalemate(_) | BattleStatus::ErrorAborted { .. }
        )
    }

    /// Apply a transition, rejecting anything the lifecycle does not allow
    pub fn transition(&self, transition: Transition) -> Result<BattleStatus> {
        match (self, transition) {
            (BattleStatus::Idle, Transition::Start) => Ok(BattleStatus::Running),
            (BattleStatus::Running, Transition::Finish(outcome)) => {
                Ok(BattleStatus::Completed(outcome))
            }
            (BattleStatus::Running, Transition::Stall(reason)) => Ok(BattleStatus::Stalemate(reason)),
            (BattleStatus::Idle | BattleStatus::Running, Transition::Abort(reason)) => {
                Ok(BattleStatus::ErrorAborted { reason })
            }
            (from, t) => Err(ChronicleError::InvalidTransition(format!(
                "{:?} cannot apply {:?}",
                from, t
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EventKind {
    Opening,
    Hit,
    Miss,
    Guard,
    Pass,
    Stunned,
    BattleEnded,
}

/// One narrated beat in the outbound log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleEvent {
    pub id: EventId,
    pub turn: Turn,
    pub kind: EventKind,
    pub actor: Option<FighterId>,
    pub target: Option<FighterId>,
    pub move_id: Option<MoveId>,
    /// Damage dealt by the action (0 for misses, guards and passes)
    pub outcome: i32,
    pub critical: bool,
    pub beat: Option<Beat>,
    pub narrative: String,
    pub selection_reasons: Vec<String>,
}

impl BattleEvent {
    pub fn new(turn: Turn, kind: EventKind, narrative: String) -> Self {
        Self {
            id: EventId::generate(),
            turn,
            kind,
            actor: None,
            target: None,
            move_id: None,
            outcome: 0,
            critical: false,
            beat: None,
            narrative,
            selection_reasons: Vec::new(),
        }
    }

    pub fn between(mut self, actor: &FighterId, target: &FighterId) -> Self {
        self.actor = Some(actor.clone());
        self.target = Some(target.clone());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BattleMetrics {
    pub turn_count: Turn,
    pub elapsed: Duration,
    pub event_counts: BTreeMap<EventKind, u32>,
    pub error_count: u32,
}

impl BattleMetrics {
    pub fn record_events<'a>(&mut self, events: impl IntoIterator<Item = &'a BattleEvent>) {
        for event in events {
            *self.event_counts.entry(event.kind).or_insert(0) += 1;
        }
    }

    pub fn count(&self, kind: EventKind) -> u32 {
        self.event_counts.get(&kind).copied().unwrap_or(0)
    }
}

/// Complete state of one 1v1 battle session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BattleState {
    pub session: SessionId,
    pub fighters: AHashMap<FighterId, Fighter>,
    /// Binding order; also the tie-break for acting order
    pub order: Vec<FighterId>,
    pub turn: Turn,
    pub environment: Environment,
    pub status: BattleStatus,
    pub log: Vec<BattleEvent>,
    pub metrics: BattleMetrics,
    pub error_log: Vec<String>,
    /// Consecutive ticks in which nobody's HP changed
    pub quiet_turns: u32,
}

impl BattleState {
    pub fn new(left: Fighter, right: Fighter, environment: Environment) -> Result<Self> {
        if left.id == right.id {
            return Err(ChronicleError::InvalidRoster(format!(
                "a fighter cannot duel itself ({})",
                left.id
            )));
        }

        let order = vec![left.id.clone(), right.id.clone()];
        let mut fighters = AHashMap::new();
        fighters.insert(left.id.clone(), left);
        fighters.insert(right.id.clone(), right);

        Ok(Self {
            session: SessionId::new(),
            fighters,
            order,
            turn: 0,
            environment,
            status: BattleStatus::Idle,
            log: Vec::new(),
            metrics: BattleMetrics::default(),
            error_log: Vec::new(),
            quiet_turns: 0,
        })
    }

    pub fn fighter(&self, id: &FighterId) -> Option<&Fighter> {
        self.fighters.get(id)
    }

    pub fn fighter_mut(&mut self, id: &FighterId) -> Option<&mut Fighter> {
        self.fighters.get_mut(id)
    }

    pub fn opponent_id(&self, id: &FighterId) -> Option<&FighterId> {
        if !self.order.contains(id) {
            return None;
        }
        self.order.iter().find(|other| *other != id)
    }

    pub fn opponent_of(&self, id: &FighterId) -> Option<&Fighter> {
        self.opponent_id(id).and_then(|o| self.fighter(o))
    }

    /// Fighters in binding order
    pub fn fighters_in_order(&self) -> impl Iterator<Item = &Fighter> {
        self.order.iter().filter_map(|id| self.fighters.get(id))
    }

    pub fn lowest_health_percent(&self) -> f32 {
        self.fighters_in_order()
            .map(|f| f.health_percent())
            .fold(100.0, f32::min)
    }

    pub fn battle_over(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn is_draw(&self) -> bool {
        matches!(self.status, BattleStatus::Completed(Outcome::Draw))
    }

    pub fn is_stalemate(&self) -> bool {
        matches!(self.status, BattleStatus::Stalemate(_))
    }

    pub fn winner(&self) -> Option<&FighterId> {
        match &self.status {
            BattleStatus::Completed(Outcome::Victory { winner, .. }) => Some(winner),
            _ => None,
        }
    }

    pub fn loser(&self) -> Option<&FighterId> {
        match &self.status {
            BattleStatus::Completed(Outcome::Victory { loser, .. }) => Some(loser),
            _ => None,
        }
    }

    /// Copy for a tick to work on; the log and error log start empty
    pub fn draft(&self) -> BattleState {
        BattleState {
            session: self.session,
            fighters: self.fighters.clone(),
            order: self.order.clone(),
            turn: self.turn,
            environment: self.environment.clone(),
            status: self.status.clone(),
            log: Vec::new(),
            metrics: BattleMetrics::default(),
            error_log: Vec::new(),
            quiet_turns: self.quiet_turns,
        }
    }

    /// Fighters ordered by speed descending, ties by binding order
    pub fn acting_order(&self) -> Vec<FighterId> {
        let mut order: Vec<&Fighter> = self.fighters_in_order().collect();
        // sort_by is stable, so binding order breaks ties
        order.sort_by(|a, b| b.speed.cmp(&a.speed));
        order.into_iter().map(|f| f.id.clone()).collect()
    }

    /// Sum of every fighter's HP, used to detect ticks without progress
    pub fn total_health(&self) -> i64 {
        self.fighters.values().map(|f| f.health as i64).sum()
    }

    pub fn apply(&mut self, transition: Transition) -> Result<()> {
        self.status = self.status.transition(transition)?;
        Ok(())
    }
}
