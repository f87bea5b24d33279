//! Ordered narrative filter chain
//!
//! Each strategy narrows a beat's pool or reports no match. The chain stops
//! at the first strategy that yields a non-empty list. Every strategy notes
//! a reason in the context whether it matched or not.
//!
//! Every strategy except the ultimate fallback keeps only variants whose
//! `miss` tag agrees with the turn: a landed hit never reads as a miss and
//! a miss never reads as a hit.

use crate::narrative::context::{NarrativeContext, TurnContext};
use crate::narrative::variant::NarrativeVariant;

/// Shared signature of every strategy in the chain
pub type VariantFilter = for<'p, 'c, 'e> fn(
    &'p [NarrativeVariant],
    &'c mut NarrativeContext<'e>,
) -> Option<Vec<&'p NarrativeVariant>>;

/// Strategies in priority order
pub const FILTER_CHAIN: [(&str, VariantFilter); 6] = [
    ("strict_context", strict_context_filter),
    ("miss", miss_filter),
    ("environment", environment_filter),
    ("phase", phase_filter),
    ("generic", generic_filter),
    ("ultimate", ultimate_fallback),
];

fn non_empty(list: Vec<&NarrativeVariant>) -> Option<Vec<&NarrativeVariant>> {
    if list.is_empty() {
        None
    } else {
        Some(list)
    }
}

fn fits_outcome(variant: &NarrativeVariant, turn: &TurnContext) -> bool {
    variant.describes_miss() == turn.is_miss
}

/// Variants carrying every strict tag that is currently true
pub fn strict_context_filter<'p>(
    pool: &'p [NarrativeVariant],
    ctx: &mut NarrativeContext<'_>,
) -> Option<Vec<&'p NarrativeVariant>> {
    let active = ctx.turn.active_strict_tags();
    if active.is_empty() {
        ctx.note("strict: no strict context active");
        return None;
    }

    let matched: Vec<&NarrativeVariant> = pool
        .iter()
        .filter(|v| fits_outcome(v, &ctx.turn))
        .filter(|v| active.iter().all(|tag| v.tags.contains(*tag)))
        .collect();

    ctx.note(format!(
        "strict: {} of {} variants carry [{}]",
        matched.len(),
        pool.len(),
        active.join(", ")
    ));
    non_empty(matched)
}

/// Miss prose whose other strict tags are all currently true
///
/// Catches misses whose full strict context (say miss plus humor) has no
/// dedicated variant, before hit prose further down the chain is reached.
pub fn miss_filter<'p>(
    pool: &'p [NarrativeVariant],
    ctx: &mut NarrativeContext<'_>,
) -> Option<Vec<&'p NarrativeVariant>> {
    if !ctx.turn.is_miss {
        ctx.note("miss: the attack landed");
        return None;
    }

    let active = ctx.turn.active_strict_tags();
    let matched: Vec<&NarrativeVariant> = pool
        .iter()
        .filter(|v| v.describes_miss())
        .filter(|v| v.strict_tags().all(|tag| active.iter().any(|a| *a == tag)))
        .collect();

    ctx.note(format!("miss: {} miss variants fit", matched.len()));
    non_empty(matched)
}

/// Variants sharing at least one tag with the environment
pub fn environment_filter<'p>(
    pool: &'p [NarrativeVariant],
    ctx: &mut NarrativeContext<'_>,
) -> Option<Vec<&'p NarrativeVariant>> {
    let Some(env) = ctx.environment else {
        ctx.note("environment: no environment bound");
        return None;
    };

    let matched: Vec<&NarrativeVariant> = pool
        .iter()
        .filter(|v| fits_outcome(v, &ctx.turn))
        .filter(|v| env.shares_tag(&v.environment_tags))
        .collect();

    ctx.note(format!(
        "environment: {} variants match tags of {}",
        matched.len(),
        env.id
    ));
    non_empty(matched)
}

/// Variants tagged with the current phase
pub fn phase_filter<'p>(
    pool: &'p [NarrativeVariant],
    ctx: &mut NarrativeContext<'_>,
) -> Option<Vec<&'p NarrativeVariant>> {
    let phase = ctx.turn.phase;
    let matched: Vec<&NarrativeVariant> = pool
        .iter()
        .filter(|v| fits_outcome(v, &ctx.turn))
        .filter(|v| v.applies_to_phase(phase))
        .collect();

    ctx.note(format!(
        "phase: {} variants tagged {}",
        matched.len(),
        phase.tag()
    ));
    non_empty(matched)
}

/// Variants with no tags at all
///
/// Untagged prose describes a landed action, so a miss never matches here.
pub fn generic_filter<'p>(
    pool: &'p [NarrativeVariant],
    ctx: &mut NarrativeContext<'_>,
) -> Option<Vec<&'p NarrativeVariant>> {
    let matched: Vec<&NarrativeVariant> = pool
        .iter()
        .filter(|v| fits_outcome(v, &ctx.turn))
        .filter(|v| v.is_untagged())
        .collect();
    ctx.note(format!("generic: {} untagged variants", matched.len()));
    non_empty(matched)
}

/// Whole pool, unless it is empty
pub fn ultimate_fallback<'p>(
    pool: &'p [NarrativeVariant],
    ctx: &mut NarrativeContext<'_>,
) -> Option<Vec<&'p NarrativeVariant>> {
    if pool.is_empty() {
        ctx.note("ultimate: pool is empty");
        return None;
    }
    ctx.note(format!("ultimate: using all {} variants", pool.len()));
    Some(pool.iter().collect())
}

/// Run the chain; `None` only when the pool is empty
pub fn narrow<'p>(
    pool: &'p [NarrativeVariant],
    ctx: &mut NarrativeContext<'_>,
) -> Option<Vec<&'p NarrativeVariant>> {
    for (name, filter) in FILTER_CHAIN {
        if let Some(list) = filter(pool, ctx) {
            ctx.note(format!("selected by {name} filter"));
            return Some(list);
        }
    }
    None
}
