//! Narrative layer - picks and renders pre-authored prose for battle beats
//!
//! Selection runs a fixed, ordered chain of filters over the beat's pool
//! (strict context, environment, phase, generic, everything) and picks one
//! survivor uniformly at random. Rendering fills pronoun, name and phrase
//! placeholders in a single pass.

pub mod context;
pub mod filters;
pub mod pronouns;
pub mod selector;
pub mod template;
pub mod variant;

pub use context::{NarrativeContext, NarrativePhase, TurnContext};
pub use filters::{narrow, VariantFilter, FILTER_CHAIN};
pub use pronouns::{PronounSet, PronounTable};
pub use selector::{select_variant, Selection};
pub use template::{render, Phrases, Rendered};
pub use variant::{Beat, NarrativeLibrary, NarrativeVariant};
