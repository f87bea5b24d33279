//! Battle system constants - all tunable values in one place
//!
//! Per-session knobs (crit chance, variance, regen) live in `BattleConfig`;
//! these are fixed rules of the duel.

// Damage
/// Incoming damage is divided by this when the target is guarding
pub const GUARD_DAMAGE_DIVISOR: u32 = 2;
/// A landed hit from a move with power deals at least this much
pub const MIN_HIT_DAMAGE: u32 = 1;

// Accuracy roll is `gen_range(0..ACCURACY_ROLL_MAX) < accuracy`
pub const ACCURACY_ROLL_MAX: u32 = 100;

// Narration used outside the authored pools
pub const FALLBACK_TEMPLATE: &str = "{actor} uses {move}.";
pub const MISS_TEMPLATE: &str = "{actor}'s {move} misses {target}.";
pub const GUARD_TEMPLATE: &str = "{actor} raises {move} and waits for {target}.";
pub const OPENING_FALLBACK_TEMPLATE: &str = "{actor} faces {target} at {environment}.";
pub const PASS_TEMPLATE: &str = "{actor} hesitates, unable to act.";
pub const STUNNED_TEMPLATE: &str = "{actor} is stunned and cannot act.";
pub const VICTORY_TEMPLATE: &str = "{actor} stands victorious over {target}.";
pub const DRAW_TEMPLATE: &str = "{actor} and {target} collapse at the same moment.";
pub const STALEMATE_TEMPLATE: &str = "Neither {actor} nor {target} can break the deadlock.";
pub const ABORT_TEMPLATE: &str = "The duel between {actor} and {target} is called off.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_templates_mention_actor_and_move() {
        for template in [FALLBACK_TEMPLATE, MISS_TEMPLATE, GUARD_TEMPLATE] {
            assert!(template.contains("{actor}"), "{template}");
            assert!(template.contains("{move}"), "{template}");
        }
    }
}
