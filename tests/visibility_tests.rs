//! Per-player projection tests.
//!
//! What a seat may see of its opponent: counts, face-up cards, and opaque
//! placeholders for everything hidden.

mod common;

use common::{act, config, give, started};
use mission_ccg::cards::{CardId, CharacterCard};
use mission_ccg::core::{Action, InstanceId, MatchState, Phase, PlayerId};
use mission_ccg::view::{project, VisibleBoardCard};

const SECRET: &str = "Orochimaru Secret Form";

fn with_hidden_card() -> (MatchState, PlayerId, InstanceId) {
    let mut state = started(&config(1));
    let a = state.active_player;
    let card = give(&mut state, a, CharacterCard::new(CardId::new(7700), SECRET, 4, 7));
    let state = act(&state, a, Action::PlayFaceDown { card, lane: 2 }).state;
    (state, a, card)
}

#[test]
fn test_opponent_sees_opaque_placeholder() {
    let (state, owner, card) = with_hidden_card();

    let view = project(&state, owner.opponent());

    assert_eq!(view.lanes[2].theirs, vec![VisibleBoardCard::Hidden { instance: card }]);
    assert_eq!(view.lanes[2].their_power, 0);
    let json = serde_json::to_string(&view).unwrap();
    assert!(!json.contains(SECRET));
}

#[test]
fn test_owner_sees_own_hidden_card() {
    let (state, owner, card) = with_hidden_card();

    let view = project(&state, owner);

    let VisibleBoardCard::OwnHidden { instance, card: shown } = &view.lanes[2].yours[0] else {
        panic!("expected own hidden card");
    };
    assert_eq!(*instance, card);
    assert_eq!(shown.names.name, SECRET);
    assert_eq!(view.lanes[2].your_power, 0);
}

#[test]
fn test_reveal_makes_card_public() {
    let (state, owner, card) = with_hidden_card();
    let state = act(&state, owner.opponent(), Action::Pass).state;
    let state = act(&state, owner, Action::Reveal { target: card }).state;

    let view = project(&state, owner.opponent());

    let VisibleBoardCard::FaceUp { power, card: shown, .. } = &view.lanes[2].theirs[0] else {
        panic!("expected a face-up card");
    };
    assert_eq!(*power, 7);
    assert_eq!(shown.names.name, SECRET);
    assert_eq!(view.lanes[2].their_power, 7);
}

#[test]
fn test_hands_and_decks_are_counts() {
    let mut state = started(&config(2));
    let a = state.active_player;
    give(&mut state, a, CharacterCard::new(CardId::new(7710), SECRET, 1, 1));

    let mine = project(&state, a);
    let theirs = project(&state, a.opponent());

    assert_eq!(mine.you.hand.len(), 6);
    assert!(mine.you.hand.iter().any(|c| c.card.names.name == SECRET));
    assert_eq!(theirs.opponent.hand_count, 6);
    assert_eq!(theirs.opponent.deck_count, state.players[a].deck.len());
    assert!(!serde_json::to_string(&theirs).unwrap().contains(SECRET));
}

#[test]
fn test_projection_is_pure() {
    let (state, owner, _) = with_hidden_card();

    let first = project(&state, owner);
    let second = project(&state, owner);

    assert_eq!(first, second);
}

#[test]
fn test_priority_and_phase_in_view() {
    let state = started(&config(3));
    let active = state.active_player;

    let view = project(&state, active);
    let other = project(&state, active.opponent());

    assert!(view.can_act);
    assert!(!other.can_act);
    assert_eq!(view.phase, Phase::Action);
    assert_eq!(view.edge, other.edge);
    assert_eq!(view.you.chakra, other.opponent.chakra);
    assert_eq!(view.lanes.len(), 3);
    assert!(view.lanes[0].unlocked);
    assert!(!view.lanes[2].unlocked);
}

#[test]
fn test_mulligan_view() {
    let state = MatchState::new(&config(4)).unwrap();
    let state = act(&state, PlayerId::ONE, Action::Mulligan { redraw: false }).state;

    let view = project(&state, PlayerId::TWO);

    assert!(view.opponent.mulligan_decided);
    assert!(view.can_act);
    assert!(!project(&state, PlayerId::ONE).can_act);
}
