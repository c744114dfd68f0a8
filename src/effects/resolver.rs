//! Effect resolution - executing triggered effects on match state.
//!
//! Triggers are a closed set (`TriggerKind`). Each action names the
//! triggers it fires and `EffectResolver::dispatch` resolves the matching
//! effects of the source card in printed order:
//!
//! | Event             | Triggers                 |
//! |-------------------|--------------------------|
//! | play face-up      | `Main`                   |
//! | reveal            | `Main`, `Ambush`         |
//! | upgrade           | `Main`, `Upgrade`        |
//! | mission scoring   | `Score`                  |
//!
//! An upgrade fires only the new version's MAIN effects. The layered MAIN
//! chain matters for continuous and SCORE effects, not for re-triggering.
//!
//! `Continuous` effects are never dispatched. They are read passively by
//! `continuous_modifier` (power) and `BoardCard::chakra_bonus` (chakra).
//!
//! A sub-effect whose amount or target cannot be resolved is a miss: it
//! changes nothing, is logged, and the rest of the action still commits.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::cards::{BoardCard, CardId};
use crate::core::{InstanceId, MatchState, PlayerId};

use super::effect::{CardEffect, ContextAmount, EffectAmount, EffectKind};
use super::targeting::{resolve_target, TargetSpec};

/// Why an effect fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriggerKind {
    Main,
    Upgrade,
    Ambush,
    Score,
    Continuous,
}

/// One effect about to resolve.
///
/// `dynamic_amount` carries a token count computed from the board at
/// trigger time; it takes precedence over the parsed value.
#[derive(Clone, Debug, PartialEq)]
pub struct EffectInstance {
    pub source: InstanceId,
    pub owner: PlayerId,
    pub card: CardId,
    pub trigger: TriggerKind,
    pub effect: CardEffect,
    pub dynamic_amount: Option<i64>,
}

impl EffectInstance {
    /// Bind an effect to its source card.
    #[must_use]
    pub fn new(source: &BoardCard, trigger: TriggerKind, effect: CardEffect) -> Self {
        Self {
            source: source.instance,
            owner: source.owner,
            card: source.card.id,
            trigger,
            effect,
            dynamic_amount: None,
        }
    }

    /// Set the computed amount (builder pattern).
    #[must_use]
    pub fn with_dynamic_amount(mut self, amount: Option<i64>) -> Self {
        self.dynamic_amount = amount;
        self
    }

    /// Token count to place: the computed amount, else the parsed one.
    #[must_use]
    pub fn amount(&self) -> Option<i64> {
        self.dynamic_amount
            .or_else(|| self.effect.parsed().powerup_value())
    }
}

/// Why an effect resolved to nothing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissReason {
    /// No face-up character with this name is in play.
    TargetNotFound(String),
    /// The source card is face-down or gone.
    SourceNotInPlay,
    /// The amount depends on context the engine does not know.
    UnknownAmount,
}

/// What an effect did.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolutionOutcome {
    PowerTokens { target: InstanceId, amount: i64 },
    /// Nothing to do on trigger (e.g. a text with only a chakra bonus).
    NoOp,
    Miss(MissReason),
}

/// Log entry for one resolved effect.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectResolution {
    pub source: InstanceId,
    pub owner: PlayerId,
    pub card: CardId,
    pub trigger: TriggerKind,
    pub description: String,
    pub outcome: ResolutionOutcome,
}

impl EffectResolution {
    /// Whether the effect missed.
    #[must_use]
    pub fn is_miss(&self) -> bool {
        matches!(self.outcome, ResolutionOutcome::Miss(_))
    }
}

/// Resolves card effects against a `MatchState`.
pub struct EffectResolver;

impl EffectResolver {
    /// Effects of `card` that fire for `trigger`, in printed order.
    #[must_use]
    pub fn triggered_effects(card: &BoardCard, trigger: TriggerKind) -> Vec<CardEffect> {
        let one_shot = |e: &&CardEffect| {
            let parsed = e.parsed();
            !parsed.is_continuous && !parsed.is_score
        };
        let top_of_kind = |kind: EffectKind| {
            card.card
                .effects_of(kind)
                .filter(one_shot)
                .cloned()
                .collect::<Vec<_>>()
        };

        match trigger {
            // Only the top version's MAINs fire; older links of the chain
            // already resolved when they entered play.
            TriggerKind::Main => top_of_kind(EffectKind::Main),
            TriggerKind::Upgrade => top_of_kind(EffectKind::Upgrade),
            TriggerKind::Ambush => top_of_kind(EffectKind::Ambush),
            TriggerKind::Score => card
                .active_effects()
                .filter(|e| e.is_score_trigger() && !e.is_continuous())
                .cloned()
                .collect(),
            TriggerKind::Continuous => card
                .active_effects()
                .filter(|e| e.is_continuous())
                .cloned()
                .collect(),
        }
    }

    /// Resolve every effect of `source` for each trigger, in order.
    pub fn dispatch(
        state: &mut MatchState,
        source: InstanceId,
        triggers: &[TriggerKind],
    ) -> Vec<EffectResolution> {
        let mut resolutions = Vec::new();

        for &trigger in triggers {
            let effects = match trigger {
                TriggerKind::Continuous => continue,
                _ => match state.find_board_card(source) {
                    Some(card) => Self::triggered_effects(card, trigger),
                    None => continue,
                },
            };

            for effect in effects {
                let Some(card) = state.find_board_card(source) else {
                    break;
                };
                let dynamic = match effect.parsed().powerup {
                    Some(EffectAmount::Contextual(ctx)) => Self::context_amount(state, card, ctx),
                    _ => None,
                };
                let instance = EffectInstance::new(card, trigger, effect).with_dynamic_amount(dynamic);
                resolutions.push(Self::resolve(state, &instance));
            }
        }

        resolutions
    }

    /// Resolve a single effect instance.
    pub fn resolve(state: &mut MatchState, instance: &EffectInstance) -> EffectResolution {
        let parsed = instance.effect.parsed();
        let outcome = match parsed.powerup {
            None => ResolutionOutcome::NoOp,
            Some(_) => Self::place_tokens(state, instance),
        };

        if let ResolutionOutcome::Miss(reason) = &outcome {
            warn!(
                source = %instance.source,
                card = %instance.card,
                ?reason,
                "effect resolved as a miss"
            );
        }

        EffectResolution {
            source: instance.source,
            owner: instance.owner,
            card: instance.card,
            trigger: instance.trigger,
            description: parsed.clean_description.clone(),
            outcome,
        }
    }

    fn place_tokens(state: &mut MatchState, instance: &EffectInstance) -> ResolutionOutcome {
        let Some(amount) = instance.amount() else {
            return ResolutionOutcome::Miss(MissReason::UnknownAmount);
        };
        let spec = TargetSpec::from_parsed(instance.effect.parsed());

        let target = match state.find_board_card(instance.source) {
            Some(source) => resolve_target(state.board_cards(), source, &spec),
            None => return ResolutionOutcome::Miss(MissReason::SourceNotInPlay),
        };

        match (target, spec) {
            (Some(target), _) => match state.find_board_card_mut(target) {
                Some(card) => {
                    card.add_tokens(amount);
                    ResolutionOutcome::PowerTokens { target, amount }
                }
                None => ResolutionOutcome::Miss(MissReason::SourceNotInPlay),
            },
            (None, TargetSpec::Named(name)) => ResolutionOutcome::Miss(MissReason::TargetNotFound(name)),
            (None, TargetSpec::SelfCard) => ResolutionOutcome::Miss(MissReason::SourceNotInPlay),
        }
    }

    /// Value of a contextual amount for `source`.
    #[must_use]
    pub fn context_amount(state: &MatchState, source: &BoardCard, ctx: ContextAmount) -> Option<i64> {
        match ctx {
            ContextAmount::RevealedThisTurn => {
                Some(i64::from(state.players[source.owner].revealed_this_turn))
            }
            ContextAmount::FriendlyInMission => {
                let count = state.players[source.owner]
                    .board
                    .iter()
                    .filter(|c| c.lane == source.lane && c.instance != source.instance)
                    .count();
                Some(count as i64)
            }
            ContextAmount::Unknown => None,
        }
    }

    /// Power granted to `target` by face-up continuous effects in play.
    #[must_use]
    pub fn continuous_modifier(state: &MatchState, target: &BoardCard) -> i64 {
        if !target.is_face_up() {
            return 0;
        }

        let mut total: i64 = 0;
        for source in state.board_cards().filter(|c| c.is_face_up()) {
            for effect in Self::triggered_effects(source, TriggerKind::Continuous) {
                let parsed = effect.parsed();
                let amount = match parsed.powerup {
                    Some(EffectAmount::Fixed(n)) => n,
                    Some(EffectAmount::Contextual(ctx)) => {
                        match Self::context_amount(state, source, ctx) {
                            Some(n) => n,
                            None => continue,
                        }
                    }
                    None => continue,
                };
                let spec = TargetSpec::from_parsed(parsed);
                if resolve_target(state.board_cards(), source, &spec) == Some(target.instance) {
                    total = total.saturating_add(amount);
                }
            }
        }
        total
    }
}
