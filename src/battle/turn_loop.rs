//! Turn loop - advances one duel a tick at a time
//!
//! Each tick runs against a draft copy of the battle state. A tick that
//! fails is discarded whole: the error is logged, counted, and the session
//! moves to `ErrorAborted`. Nothing from a failed tick reaches the
//! committed state.

use std::time::Instant;

use ahash::AHashMap;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, error, info, warn};

use crate::ai::conditions::ConditionContext;
use crate::ai::evaluator::{Decision, DecisionRequest, FighterAi, HeuristicAi};
use crate::battle::constants::*;
use crate::battle::effects::{apply_move, ActionOutcome};
use crate::battle::state::{
    BattleEvent, BattleState, BattleStatus, EventKind, Outcome, StalemateReason, Transition,
};
use crate::battle::summary::BattleSummary;
use crate::content::BattleResources;
use crate::core::config::BattleConfig;
use crate::core::error::{ChronicleError, Result};
use crate::core::types::FighterId;
use crate::fighter::{tags, Environment, Fighter, Move};
use crate::narrative::{
    render, select_variant, Beat, NarrativeContext, NarrativePhase, Phrases, PronounTable,
    Selection, TurnContext,
};

/// One running duel
pub struct BattleSession<'r> {
    resources: &'r BattleResources,
    config: BattleConfig,
    state: BattleState,
    default_ai: Box<dyn FighterAi>,
    fighter_ai: AHashMap<FighterId, Box<dyn FighterAi>>,
    combat_rng: ChaCha8Rng,
    narrative_rng: ChaCha8Rng,
}

impl<'r> BattleSession<'r> {
    pub fn new(
        resources: &'r BattleResources,
        config: BattleConfig,
        left: Fighter,
        right: Fighter,
        environment: Environment,
    ) -> Result<Self> {
        config.validate().map_err(ChronicleError::InvalidConfig)?;
        let state = BattleState::new(left, right, environment)?;

        Ok(Self {
            resources,
            combat_rng: ChaCha8Rng::seed_from_u64(config.seed),
            // Separate stream so narration never shifts combat rolls
            narrative_rng: ChaCha8Rng::seed_from_u64(config.seed.wrapping_add(1)),
            config,
            state,
            default_ai: Box::new(HeuristicAi),
            fighter_ai: AHashMap::new(),
        })
    }

    /// Build a session from roster ids
    pub fn from_roster(
        resources: &'r BattleResources,
        config: BattleConfig,
        left: &FighterId,
        right: &FighterId,
        environment: &str,
    ) -> Result<Self> {
        let left = resources.spawn_fighter(left)?;
        let right = resources.spawn_fighter(right)?;
        let environment = resources.environment(environment)?;
        Self::new(resources, config, left, right, environment)
    }

    /// Replace the AI used by both fighters
    pub fn with_ai(mut self, ai: Box<dyn FighterAi>) -> Self {
        self.default_ai = ai;
        self
    }

    /// Override the AI for a single fighter
    pub fn with_fighter_ai(mut self, fighter: &FighterId, ai: Box<dyn FighterAi>) -> Self {
        self.fighter_ai.insert(fighter.clone(), ai);
        self
    }

    pub fn state(&self) -> &BattleState {
        &self.state
    }

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    pub fn into_state(self) -> BattleState {
        self.state
    }

    pub fn summary(&self) -> BattleSummary {
        BattleSummary::from_state(&self.state)
    }

    fn ai_for(&self, fighter: &FighterId) -> &dyn FighterAi {
        self.fighter_ai
            .get(fighter)
            .map(|ai| ai.as_ref())
            .unwrap_or(self.default_ai.as_ref())
    }

    /// Idle -> Running, narrating the opening beat
    pub fn start(&mut self) -> Result<()> {
        self.state.apply(Transition::Start)?;

        let (first, second) = binding_pair(&self.state)?;
        let event = {
            let actor = lookup(&self.state, &first)?;
            let target = lookup(&self.state, &second)?;
            let turn = TurnContext {
                phase: NarrativePhase::Early,
                ..TurnContext::default()
            };
            let phrases = Phrases {
                environment: Some(&self.state.environment.name),
                ..Phrases::default()
            };
            let (text, reasons) = narrate_beat(
                self.resources,
                &mut self.narrative_rng,
                Beat::Opening,
                turn,
                &self.state.environment,
                (actor, target),
                &phrases,
                OPENING_FALLBACK_TEMPLATE,
            );
            let mut event = BattleEvent::new(0, EventKind::Opening, text).between(&first, &second);
            event.beat = Some(Beat::Opening);
            event.selection_reasons = reasons;
            event
        };

        info!(
            "Battle {} started: {} vs {} at {}",
            self.state.session, first, second, self.state.environment.name
        );
        self.state.metrics.record_events(std::iter::once(&event));
        self.state.log.push(event);
        Ok(())
    }

    /// Advance one tick
    ///
    /// A finished battle is left untouched. Ticking a battle that was never
    /// started is a caller error.
    pub fn tick(&mut self) -> Result<()> {
        if self.state.status == BattleStatus::Idle {
            return Err(ChronicleError::InvalidTransition(
                "cannot tick a battle that has not started".into(),
            ));
        }
        if self.state.battle_over() {
            return Ok(());
        }

        let started = Instant::now();
        let mut draft = self.state.draft();
        match self.run_tick(&mut draft) {
            Ok(()) => self.commit(draft),
            Err(err) => self.abort(err),
        }
        self.state.metrics.turn_count += 1;
        self.state.metrics.elapsed += started.elapsed();
        Ok(())
    }

    /// Start if needed, then tick until the battle ends
    pub fn run_to_completion(&mut self) -> Result<BattleSummary> {
        if self.state.status == BattleStatus::Idle {
            self.start()?;
        }
        while !self.state.battle_over() {
            self.tick()?;
        }
        Ok(self.summary())
    }

    fn run_tick(&mut self, draft: &mut BattleState) -> Result<()> {
        draft.turn += 1;
        let health_before = draft.total_health();

        // Order is fixed for the whole tick
        for actor_id in draft.acting_order() {
            if lookup(draft, &actor_id)?.is_down() {
                continue;
            }
            let event = self.act(draft, &actor_id)?;
            draft.log.push(event);
        }

        let regen = self.config.chi_regen;
        for fighter in draft.fighters.values_mut() {
            if !fighter.is_down() {
                fighter.regen_energy(regen);
            }
        }

        if draft.total_health() == health_before {
            draft.quiet_turns += 1;
        } else {
            draft.quiet_turns = 0;
        }

        if let Some(transition) = evaluate_terminal(draft, &self.config) {
            draft.apply(transition)?;
            let event = closing_event(draft, &self.resources.pronouns)?;
            info!(
                "Battle {} ended on turn {}: {:?}",
                draft.session, draft.turn, draft.status
            );
            draft.log.push(event);
        }
        Ok(())
    }

    /// Resolve one fighter's action inside the draft
    fn act(&mut self, draft: &mut BattleState, actor_id: &FighterId) -> Result<BattleEvent> {
        let turn = draft.turn;
        let target_id = draft
            .opponent_id(actor_id)
            .cloned()
            .ok_or_else(|| ChronicleError::UnknownFighter(actor_id.clone()))?;

        let actor = draft
            .fighter_mut(actor_id)
            .ok_or_else(|| ChronicleError::UnknownFighter(actor_id.clone()))?;
        if actor.flags.stunned {
            actor.flags.stunned = false;
            actor.flags.took_critical = false;
            debug!("turn {}: {} is stunned", turn, actor_id);
            let text = narrate_fixed(
                STUNNED_TEMPLATE,
                draft,
                actor_id,
                &target_id,
                &self.resources.pronouns,
            )?;
            return Ok(
                BattleEvent::new(turn, EventKind::Stunned, text).between(actor_id, &target_id)
            );
        }

        let decision = self.ai_for(actor_id).choose_move(&DecisionRequest {
            state: &*draft,
            actor: actor_id,
            moves: &self.resources.moves,
            biases: &self.resources.biases,
            config: &self.config,
        })?;

        // A critical rattles its victim only until the victim's next action
        draft
            .fighter_mut(actor_id)
            .ok_or_else(|| ChronicleError::UnknownFighter(actor_id.clone()))?
            .flags
            .took_critical = false;

        let move_id = match decision {
            Decision::Move { move_id, .. } => move_id,
            Decision::ExhaustedOptions => {
                warn!("turn {}: {} has no usable move, forcing a pass", turn, actor_id);
                let text = narrate_fixed(
                    PASS_TEMPLATE,
                    draft,
                    actor_id,
                    &target_id,
                    &self.resources.pronouns,
                )?;
                return Ok(
                    BattleEvent::new(turn, EventKind::Pass, text).between(actor_id, &target_id)
                );
            }
        };

        let resources = self.resources;
        let mv = resources.moves.require(&move_id)?;
        if !lookup(draft, actor_id)?.moves.contains(&move_id) {
            return Err(ChronicleError::AiFailure(format!(
                "{} chose {} which is not in its move list",
                actor_id, move_id
            )));
        }

        let mut actor = draft
            .fighters
            .remove(actor_id)
            .ok_or_else(|| ChronicleError::UnknownFighter(actor_id.clone()))?;
        let target = draft
            .fighters
            .get_mut(&target_id)
            .ok_or_else(|| ChronicleError::UnknownFighter(target_id.clone()))?;
        let applied = apply_move(mv, &mut actor, target, &self.config, &mut self.combat_rng);
        draft.fighters.insert(actor_id.clone(), actor);
        let outcome = applied?;

        debug!(
            "turn {}: {} used {} on {} (hit: {}, crit: {}, damage: {})",
            turn, actor_id, move_id, target_id, outcome.hit, outcome.critical, outcome.damage
        );

        let actor = lookup(draft, actor_id)?;
        let target = lookup(draft, &target_id)?;
        let phrases = Phrases {
            move_name: Some(&mv.name),
            environment: Some(&draft.environment.name),
            damage: Some(outcome.damage as i32),
        };

        if outcome.is_guard_only(mv) {
            let text = render_logged(
                GUARD_TEMPLATE,
                actor,
                Some(target),
                &resources.pronouns,
                &phrases,
            );
            let mut event =
                BattleEvent::new(turn, EventKind::Guard, text).between(actor_id, &target_id);
            event.move_id = Some(move_id);
            return Ok(event);
        }

        let missed = !outcome.hit;
        let conditions = ConditionContext::new(Some(actor), Some(target))
            .with_bias(resources.biases.bias_for(actor_id));
        let turn_context = TurnContext {
            is_crit: outcome.critical,
            is_miss: missed,
            humor_trigger: conditions.is_humor_trigger(Some(mv), missed),
            low_hp: conditions.is_desperate_broken(),
            phase: NarrativePhase::derive(turn, draft.lowest_health_percent()),
        };
        let beat = choose_beat(mv, actor, target, &draft.environment);
        let fallback = if missed { MISS_TEMPLATE } else { FALLBACK_TEMPLATE };
        let (text, reasons) = narrate_beat(
            resources,
            &mut self.narrative_rng,
            beat,
            turn_context,
            &draft.environment,
            (actor, target),
            &phrases,
            fallback,
        );

        let mut event = BattleEvent::new(turn, event_kind(mv, &outcome), text)
            .between(actor_id, &target_id);
        event.move_id = Some(move_id);
        event.outcome = outcome.damage as i32;
        event.critical = outcome.critical;
        event.beat = Some(beat);
        event.selection_reasons = reasons;
        Ok(event)
    }

    fn commit(&mut self, mut draft: BattleState) {
        let events = std::mem::take(&mut draft.log);
        self.state.metrics.record_events(&events);
        self.state.fighters = draft.fighters;
        self.state.turn = draft.turn;
        self.state.status = draft.status;
        self.state.quiet_turns = draft.quiet_turns;
        self.state.log.extend(events);
    }

    fn abort(&mut self, err: ChronicleError) {
        let reason = err.to_string();
        error!(
            "Battle {} aborted during turn {}: {}",
            self.state.session,
            self.state.turn + 1,
            reason
        );
        self.state.error_log.push(reason.clone());
        self.state.metrics.error_count += 1;
        if let Err(e) = self.state.apply(Transition::Abort(reason)) {
            error!("could not mark battle {} aborted: {}", self.state.session, e);
            return;
        }

        let text = binding_pair(&self.state)
            .and_then(|(a, b)| {
                narrate_fixed(ABORT_TEMPLATE, &self.state, &a, &b, &self.resources.pronouns)
            })
            .unwrap_or_else(|_| "The duel is called off.".to_string());
        let event = BattleEvent::new(self.state.turn, EventKind::BattleEnded, text);
        self.state.metrics.record_events(std::iter::once(&event));
        self.state.log.push(event);
    }
}

/// Terminal check run at the end of every tick
///
/// Knockouts take precedence over stalemates, and a stall for lack of
/// progress is reported before the turn limit.
pub fn evaluate_terminal(state: &BattleState, config: &BattleConfig) -> Option<Transition> {
    let (down, standing): (Vec<&Fighter>, Vec<&Fighter>) =
        state.fighters_in_order().partition(|f| f.is_down());

    match (standing.as_slice(), down.as_slice()) {
        ([], [_, ..]) => Some(Transition::Finish(Outcome::Draw)),
        ([winner], [loser]) => Some(Transition::Finish(Outcome::Victory {
            winner: winner.id.clone(),
            loser: loser.id.clone(),
        })),
        _ if state.quiet_turns >= config.stalemate_window => {
            Some(Transition::Stall(StalemateReason::NoProgress))
        }
        _ if state.turn >= config.max_turns => Some(Transition::Stall(StalemateReason::TurnLimit)),
        _ => None,
    }
}

/// Narrative beat for an action, judged after its effects are applied
pub fn choose_beat(mv: &Move, actor: &Fighter, target: &Fighter, environment: &Environment) -> Beat {
    if target.is_down() {
        Beat::FinishingMove
    } else if mv.has_tag(tags::TERRAIN) || environment.shares_tag(&mv.tags) {
        Beat::TerrainInteraction
    } else if actor.health_percent() >= target.health_percent() {
        Beat::AdvantageAttack
    } else {
        Beat::DisadvantageAttack
    }
}

fn event_kind(mv: &Move, outcome: &ActionOutcome) -> EventKind {
    if outcome.is_guard_only(mv) {
        EventKind::Guard
    } else if outcome.hit {
        EventKind::Hit
    } else {
        EventKind::Miss
    }
}

fn lookup<'s>(state: &'s BattleState, id: &FighterId) -> Result<&'s Fighter> {
    state
        .fighter(id)
        .ok_or_else(|| ChronicleError::UnknownFighter(id.clone()))
}

fn binding_pair(state: &BattleState) -> Result<(FighterId, FighterId)> {
    match state.order.as_slice() {
        [a, b] => Ok((a.clone(), b.clone())),
        other => Err(ChronicleError::InvalidRoster(format!(
            "a duel needs exactly two fighters, found {}",
            other.len()
        ))),
    }
}

/// Render a template, warning about anything left unresolved
fn render_logged(
    template: &str,
    actor: &Fighter,
    target: Option<&Fighter>,
    pronouns: &PronounTable,
    phrases: &Phrases<'_>,
) -> String {
    let rendered = render(template, actor, target, pronouns, phrases);
    if !rendered.is_clean() {
        warn!(
            "unresolved placeholders {:?} in template \"{}\"",
            rendered.unresolved, template
        );
    }
    rendered.text
}

/// Select a variant for `beat` and render it
///
/// Falls back to `fallback` when the pool is empty, or when the only match
/// describes the opposite outcome (hit prose for a miss or the reverse).
#[allow(clippy::too_many_arguments)]
fn narrate_beat(
    resources: &BattleResources,
    rng: &mut ChaCha8Rng,
    beat: Beat,
    turn: TurnContext,
    environment: &Environment,
    (actor, target): (&Fighter, &Fighter),
    phrases: &Phrases<'_>,
    fallback: &str,
) -> (String, Vec<String>) {
    let mut ctx = NarrativeContext::new(turn, Some(environment));
    let Selection {
        variant,
        mut reasons,
    } = select_variant(resources.narrative.pool(beat), &mut ctx, rng);
    let template = match variant {
        Some(v) if v.describes_miss() == ctx.turn.is_miss => v.template.as_str(),
        Some(_) => {
            debug!("{:?} pool has no prose for this outcome, using fallback text", beat);
            reasons.push("fallback: no variant fits the outcome".to_string());
            fallback
        }
        None => {
            debug!("{:?} pool is empty, using fallback text", beat);
            fallback
        }
    };
    let text = render_logged(template, actor, Some(target), &resources.pronouns, phrases);
    (text, reasons)
}

/// Render fixed engine text (stun, pass, endings) for two fighters
fn narrate_fixed(
    template: &str,
    state: &BattleState,
    actor: &FighterId,
    target: &FighterId,
    pronouns: &PronounTable,
) -> Result<String> {
    let actor = lookup(state, actor)?;
    let phrases = Phrases {
        environment: Some(&state.environment.name),
        ..Phrases::default()
    };
    Ok(render_logged(template, actor, state.fighter(target), pronouns, &phrases))
}

fn closing_event(state: &BattleState, pronouns: &PronounTable) -> Result<BattleEvent> {
    let (first, second) = binding_pair(state)?;
    let (template, actor, target) = match &state.status {
        BattleStatus::Completed(Outcome::Victory { winner, loser }) => {
            (VICTORY_TEMPLATE, winner.clone(), loser.clone())
        }
        BattleStatus::Completed(Outcome::Draw) => (DRAW_TEMPLATE, first, second),
        _ => (STALEMATE_TEMPLATE, first, second),
    };
    let text = narrate_fixed(template, state, &actor, &target, pronouns)?;
    Ok(BattleEvent::new(state.turn, EventKind::BattleEnded, text).between(&actor, &target))
}
