//! Move effects
//!
//! Applies one chosen move to the acting fighter and its target. The RNG
//! draws happen in a fixed order (hit, then crit, then variance) so a
//! seeded session replays identically.

use rand::Rng;

use crate::battle::constants::{ACCURACY_ROLL_MAX, GUARD_DAMAGE_DIVISOR, MIN_HIT_DAMAGE};
use crate::core::config::BattleConfig;
use crate::core::error::Result;
use crate::fighter::{tags, Fighter, Move};

/// What happened when a move was applied
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionOutcome {
    /// The attack roll succeeded (always false for pure guard moves)
    pub hit: bool,
    pub critical: bool,
    /// Damage dealt to the target after guard reduction
    pub damage: u32,
    /// Recoil taken by the actor
    pub recoil: u32,
    /// The actor raised its guard
    pub guarded: bool,
    /// The target's guard absorbed part of this hit
    pub blocked: bool,
    pub stunned_target: bool,
}

impl ActionOutcome {
    /// A defensive move with no attack component
    pub fn is_guard_only(&self, mv: &Move) -> bool {
        self.guarded && mv.power == 0
    }
}

/// Roll the damage of a landed hit before guard reduction
fn roll_damage<R: Rng + ?Sized>(
    mv: &Move,
    critical: bool,
    config: &BattleConfig,
    rng: &mut R,
) -> u32 {
    if mv.power == 0 {
        return 0;
    }
    let variance = 1.0 - rng.gen::<f32>() * config.damage_variance;
    let multiplier = if critical { config.crit_multiplier } else { 1.0 };
    let raw = (mv.power as f32 * variance * multiplier).round() as u32;
    raw.max(MIN_HIT_DAMAGE)
}

/// Apply `mv` from `actor` to `target`
///
/// Fails only if the actor cannot pay the move's chi cost, which the
/// decision engine should already have ruled out.
pub fn apply_move<R: Rng + ?Sized>(
    mv: &Move,
    actor: &mut Fighter,
    target: &mut Fighter,
    config: &BattleConfig,
    rng: &mut R,
) -> Result<ActionOutcome> {
    actor.spend_energy(mv.energy_cost)?;
    actor.stats.moves_used += 1;
    if mv.has_tag(tags::DESPERATION) {
        actor.flags.used_desperation = true;
    }

    let mut outcome = ActionOutcome::default();

    if mv.has_tag(tags::DEFENSE) {
        actor.flags.guarding = true;
        outcome.guarded = true;
        if mv.power == 0 {
            return Ok(outcome);
        }
    }

    outcome.hit = rng.gen_range(0..ACCURACY_ROLL_MAX) < mv.accuracy;
    if !outcome.hit {
        actor.stats.misses += 1;
    } else {
        outcome.critical = rng.gen::<f32>() < config.crit_chance;
        let mut damage = roll_damage(mv, outcome.critical, config, rng);
        if target.flags.guarding {
            damage /= GUARD_DAMAGE_DIVISOR;
            target.flags.guarding = false;
            outcome.blocked = true;
        }
        outcome.damage = damage;

        target.take_damage(damage);
        target.flags.took_critical = outcome.critical;

        actor.stats.damage_dealt += damage;
        actor.stats.hits_landed += 1;
        if outcome.critical {
            actor.stats.critical_hits += 1;
        }

        if mv.has_tag(tags::DEBUFF_DISABLE) && !target.is_down() {
            target.flags.stunned = true;
            outcome.stunned_target = true;
        }
    }

    if mv.recoil > 0 {
        actor.take_damage(mv.recoil);
        outcome.recoil = mv.recoil;
    }

    target.update_mental_state();
    actor.update_mental_state();

    Ok(outcome)
}
