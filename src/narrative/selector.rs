//! Variant selection: filter chain, then a uniform-random pick
//!
//! The RNG is supplied by the caller so a seeded `ChaCha8Rng` reproduces
//! the same selections run after run.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::narrative::context::NarrativeContext;
use crate::narrative::filters::narrow;
use crate::narrative::variant::NarrativeVariant;

/// Result of one selection
#[derive(Debug, Clone)]
pub struct Selection<'p> {
    /// `None` only when the pool was empty
    pub variant: Option<&'p NarrativeVariant>,
    pub reasons: Vec<String>,
}

impl<'p> Selection<'p> {
    pub fn template(&self) -> Option<&'p str> {
        self.variant.map(|v| v.template.as_str())
    }
}

pub fn select_variant<'p, R: Rng + ?Sized>(
    pool: &'p [NarrativeVariant],
    ctx: &mut NarrativeContext<'_>,
    rng: &mut R,
) -> Selection<'p> {
    let variant = narrow(pool, ctx).and_then(|candidates| {
        let picked = candidates.choose(rng).copied();
        ctx.note(format!(
            "picked 1 of {} candidates uniformly",
            candidates.len()
        ));
        picked
    });

    Selection {
        variant,
        reasons: std::mem::take(&mut ctx.reasons),
    }
}
