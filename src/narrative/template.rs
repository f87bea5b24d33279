//! Template substitution
//!
//! Placeholders are `{role}` or `{role.field}` tokens. Roles are `actor` and
//! `target` (name or pronoun field), plus the phrases `move`, `environment`
//! and `damage`. A capitalised token (`{Actor.subject}`) capitalises its
//! value. The scan is a single left-to-right pass: substituted text is never
//! re-scanned, so a value containing braces is emitted verbatim.
//!
//! Anything that cannot be resolved is left in place and reported.

use crate::fighter::Fighter;
use crate::narrative::pronouns::PronounTable;

/// Computed phrases available to templates
#[derive(Debug, Clone, Default)]
pub struct Phrases<'a> {
    pub move_name: Option<&'a str>,
    pub environment: Option<&'a str>,
    pub damage: Option<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub text: String,
    /// Placeholders left as literal text, braces included
    pub unresolved: Vec<String>,
}

impl Rendered {
    pub fn is_clean(&self) -> bool {
        self.unresolved.is_empty()
    }
}

pub fn render(
    template: &str,
    actor: &Fighter,
    target: Option<&Fighter>,
    pronouns: &PronounTable,
    phrases: &Phrases<'_>,
) -> Rendered {
    let mut text = String::with_capacity(template.len());
    let mut unresolved = Vec::new();
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        text.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let Some(close) = after.find('}') else {
            // Unterminated brace: the rest is literal
            text.push_str(&rest[open..]);
            rest = "";
            break;
        };

        let token = &after[..close];
        if let Some(nested) = token.find('{') {
            // `{{x}` style: emit up to the inner brace and rescan from it
            text.push_str(&rest[open..open + 1 + nested]);
            rest = &after[nested..];
            continue;
        }

        match resolve(token, actor, target, pronouns, phrases) {
            Some(value) => text.push_str(&value),
            None => {
                let literal = format!("{{{token}}}");
                text.push_str(&literal);
                unresolved.push(literal);
            }
        }
        rest = &after[close + 1..];
    }
    text.push_str(rest);

    Rendered { text, unresolved }
}

fn resolve(
    token: &str,
    actor: &Fighter,
    target: Option<&Fighter>,
    pronouns: &PronounTable,
    phrases: &Phrases<'_>,
) -> Option<String> {
    let (role, field) = match token.split_once('.') {
        Some((role, field)) => (role, Some(field)),
        None => (token, None),
    };
    let capitalise = role.chars().next().is_some_and(|c| c.is_uppercase());

    let value = match (role.to_lowercase().as_str(), field) {
        ("actor", None) => Some(actor.name.clone()),
        ("target", None) => target.map(|t| t.name.clone()),
        ("actor", Some(field)) => pronoun(actor, field, pronouns),
        ("target", Some(field)) => target.and_then(|t| pronoun(t, field, pronouns)),
        ("move", None) => phrases.move_name.map(str::to_string),
        ("environment", None) => phrases.environment.map(str::to_string),
        ("damage", None) => phrases.damage.map(|d| d.to_string()),
        _ => None,
    }?;

    Some(if capitalise { capitalised(&value) } else { value })
}

fn pronoun(fighter: &Fighter, field: &str, pronouns: &PronounTable) -> Option<String> {
    pronouns
        .get(&fighter.pronouns)
        .and_then(|set| set.field(field))
        .map(str::to_string)
}

fn capitalised(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aang() -> Fighter {
        Fighter::new("aang", "Aang", 100, 20).with_pronouns("he")
    }

    fn azula() -> Fighter {
        Fighter::new("azula", "Azula", 100, 20).with_pronouns("she")
    }

    fn render_simple(template: &str, actor: &Fighter, target: Option<&Fighter>) -> Rendered {
        render(
            template,
            actor,
            target,
            &PronounTable::default(),
            &Phrases::default(),
        )
    }

    #[test]
    fn test_pronouns_and_names() {
        let out = render_simple(
            "{actor} braces {actor.reflexive} as {target} raises {target.possessive} hand at {actor.object}.",
            &aang(),
            Some(&azula()),
        );
        assert_eq!(out.text, "Aang braces himself as Azula raises her hand at him.");
        assert!(out.is_clean());
    }

    #[test]
    fn test_capitalised_placeholder() {
        let out = render_simple("{Actor.subject} leaps.", &azula(), None);
        assert_eq!(out.text, "She leaps.");
    }

    #[test]
    fn test_phrases() {
        let phrases = Phrases {
            move_name: Some("Air Scooter"),
            environment: Some("the Southern Air Temple"),
            damage: Some(12),
        };
        let out = render(
            "{actor} rides {move} across {environment} for {damage}.",
            &aang(),
            None,
            &PronounTable::default(),
            &phrases,
        );
        assert_eq!(out.text, "Aang rides Air Scooter across the Southern Air Temple for 12.");
    }

    #[test]
    fn test_unknown_pronoun_key_leaves_placeholder() {
        let actor = Fighter::new("koh", "Koh", 200, 0).with_pronouns("face_stealer");
        let out = render_simple("{actor.subject} watches.", &actor, None);
        assert_eq!(out.text, "{actor.subject} watches.");
        assert_eq!(out.unresolved, vec!["{actor.subject}".to_string()]);
    }

    #[test]
    fn test_missing_target_leaves_target_placeholders() {
        let out = render_simple("{actor} faces {target}.", &aang(), None);
        assert_eq!(out.text, "Aang faces {target}.");
        assert_eq!(out.unresolved.len(), 1);
    }

    #[test]
    fn test_no_recursive_expansion() {
        let mut actor = aang();
        actor.name = "{target}".into();
        let out = render_simple("{actor} waits.", &actor, Some(&azula()));
        assert_eq!(out.text, "{target} waits.");
        assert!(out.is_clean());
    }

    #[test]
    fn test_plain_text_unchanged() {
        let template = "The wind howls over the cliffs.";
        let out = render_simple(template, &aang(), Some(&azula()));
        assert_eq!(out.text, template);
    }

    #[test]
    fn test_malformed_braces() {
        let out = render_simple("{{actor} and {unclosed", &aang(), None);
        assert_eq!(out.text, "{Aang and {unclosed");
        assert!(out.is_clean());
    }
}
