//! Condition predicates shared by move scoring and narrative matching
//!
//! Every predicate is pure and fails closed: a missing character or
//! opponent makes it return `false`.

use crate::ai::bias::{AiBias, BiasTable};
use crate::battle::state::BattleState;
use crate::core::types::FighterId;
use crate::fighter::{tags, Fighter, MentalState, Move};

/// Own HP must be above this percent to be "in control"
pub const IN_CONTROL_HP_PERCENT: f32 = 50.0;
/// Below this percent a fighter counts as desperate (and low-HP for narration)
pub const DESPERATE_HP_PERCENT: f32 = 30.0;
/// Desperation moves unlock at or below this absolute HP...
pub const DESPERATION_HP_THRESHOLD: i32 = 10;
/// ...provided at least this much chi remains
pub const DESPERATION_MIN_ENERGY: u32 = 6;

/// Read-only view for evaluating predicates about one character
#[derive(Debug, Clone, Copy, Default)]
pub struct ConditionContext<'a> {
    pub character: Option<&'a Fighter>,
    pub opponent: Option<&'a Fighter>,
    pub state: Option<&'a BattleState>,
    pub bias: AiBias,
}

impl<'a> ConditionContext<'a> {
    pub fn new(character: Option<&'a Fighter>, opponent: Option<&'a Fighter>) -> Self {
        Self {
            character,
            opponent,
            state: None,
            bias: AiBias::default(),
        }
    }

    pub fn for_actor(state: &'a BattleState, actor: &FighterId, biases: &BiasTable) -> Self {
        Self {
            character: state.fighter(actor),
            opponent: state.opponent_of(actor),
            state: Some(state),
            bias: biases.bias_for(actor),
        }
    }

    pub fn with_bias(mut self, bias: AiBias) -> Self {
        self.bias = bias;
        self
    }

    pub fn is_in_control(&self) -> bool {
        let (Some(me), Some(foe)) = (self.character, self.opponent) else {
            return false;
        };
        me.max_health > 0
            && me.health_percent() > IN_CONTROL_HP_PERCENT
            && !me.flags.took_critical
            && matches!(foe.mental_state, MentalState::Stable | MentalState::Stressed)
    }

    /// Badly hurt or mentally broken; drives the `desperate` narrative tag
    pub fn is_desperate_broken(&self) -> bool {
        self.is_low_hp()
            || self
                .character
                .is_some_and(|me| me.mental_state == MentalState::Broken)
    }

    /// HP at or below 10, chi at least 6 and the desperation move unused
    pub fn can_use_desperation(&self) -> bool {
        let Some(me) = self.character else {
            return false;
        };
        me.health <= DESPERATION_HP_THRESHOLD
            && me.energy >= DESPERATION_MIN_ENERGY
            && !me.flags.used_desperation
    }

    pub fn is_low_hp(&self) -> bool {
        self.character
            .is_some_and(|me| me.max_health > 0 && me.health_percent() < DESPERATE_HP_PERCENT)
    }

    /// A miss that plays for laughs: flashy move or a showboating character
    pub fn is_humor_trigger(&self, mv: Option<&Move>, missed: bool) -> bool {
        if !missed || self.character.is_none() {
            return false;
        }
        mv.is_some_and(|m| m.has_tag(tags::FLASHY)) || self.bias.showboating > 0.0
    }

    pub fn is_finishing_blow(&self, expected_damage: f32) -> bool {
        self.opponent
            .is_some_and(|foe| expected_damage >= foe.health as f32)
    }
}
