//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use mission_ccg::cards::{CardId, CharacterCard, MissionCard};
use mission_ccg::core::{
    Action, Deck, GameConfig, HandCard, InstanceId, MatchState, MatchRules, PlayerId, PlayerSpec,
};
use mission_ccg::rules::{apply, Applied};

/// 30 distinct characters and 3 missions; ids start at `offset`.
pub fn deck(offset: u32, cost: u32, power: i64) -> Deck {
    Deck {
        characters: (0..30)
            .map(|i| CharacterCard::new(CardId::new(offset + i), format!("Genin {}", offset + i), cost, power))
            .collect(),
        missions: (0..3)
            .map(|i| MissionCard::new(CardId::new(offset + 500 + i), format!("Mission {}", offset + i), 1))
            .collect(),
    }
}

pub fn config(seed: u64) -> GameConfig {
    GameConfig::new(
        PlayerSpec::human("alice", deck(0, 1, 1)),
        PlayerSpec::human("bob", deck(1000, 1, 1)),
        seed,
    )
}

pub fn config_with_rules(seed: u64, rules: MatchRules) -> GameConfig {
    config(seed).with_rules(rules)
}

/// Create a match and let both seats keep their hands.
pub fn started(config: &GameConfig) -> MatchState {
    let state = MatchState::new(config).unwrap();
    let state = act(&state, PlayerId::ONE, Action::Mulligan { redraw: false }).state;
    act(&state, PlayerId::TWO, Action::Mulligan { redraw: false }).state
}

pub fn act(state: &MatchState, player: PlayerId, action: Action) -> Applied {
    apply(state, player, &action).unwrap_or_else(|e| panic!("{player} {action:?}: {e}"))
}

/// Put a specific card into a seat's hand.
pub fn give(state: &mut MatchState, player: PlayerId, card: CharacterCard) -> InstanceId {
    let instance = InstanceId::new(50_000 + card.id.raw());
    state.players[player].hand.push_back(HandCard {
        instance,
        card: Arc::new(card),
    });
    instance
}

/// The active player passes, then the other one does.
pub fn pass_both(state: &MatchState) -> Applied {
    let first = state.active_player;
    let after = act(state, first, Action::Pass);
    let mut second = act(&after.state, first.opponent(), Action::Pass);
    let mut events = after.events;
    events.append(&mut second.events);
    Applied {
        state: second.state,
        events,
    }
}

/// Replace the mission in a lane with one worth `points`.
pub fn set_lane_points(state: &mut MatchState, lane: usize, points: u32) {
    let id = state.lanes[lane].mission.id;
    state.lanes[lane].mission = Arc::new(MissionCard::new(id, format!("Lane {lane}"), points));
}
