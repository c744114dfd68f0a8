//! Match configuration types.
//!
//! A match is configured once, at creation:
//! - `MatchRules`: numeric rules (chakra, hand sizes, lane timing, rank bonuses)
//! - `PlayerSpec`: who sits in a seat and which deck they bring
//! - `GameConfig`: both seats plus rules and the RNG seed
//!
//! `GameConfig::validate` is the only gate between untrusted deck data and
//! a `MatchState`.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::error::ConfigError;
use super::player::PlayerId;
use crate::cards::{CardId, CharacterCard, MissionCard, MissionRank, LANE_COUNT};

/// Fewest characters any deck may hold; rules can raise this, never lower it.
pub const MIN_DECK_SIZE: usize = 30;

/// Missions every deck brings, one per lane.
pub const MISSIONS_PER_DECK: usize = LANE_COUNT;

/// Bonus mission points per rank.
///
/// The production schedule is supplied by the host; the default awards no
/// bonus for any rank.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankBonusTable {
    pub d: u32,
    pub c: u32,
    pub b: u32,
    pub a: u32,
}

impl RankBonusTable {
    /// Build a table from the four bonuses, lowest rank first.
    #[must_use]
    pub fn new(d: u32, c: u32, b: u32, a: u32) -> Self {
        Self { d, c, b, a }
    }

    /// Bonus for a rank.
    #[must_use]
    pub fn bonus(&self, rank: MissionRank) -> u32 {
        match rank {
            MissionRank::D => self.d,
            MissionRank::C => self.c,
            MissionRank::B => self.b,
            MissionRank::A => self.a,
        }
    }
}

/// Numeric rules of a match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRules {
    /// Chakra every player gains at each Start Phase.
    pub base_chakra: u32,

    /// Flat cost of playing a character face-down.
    pub hidden_play_cost: u32,

    /// Cards dealt to each player at setup.
    pub opening_hand_size: usize,

    /// Cards drawn at each Start Phase.
    pub cards_drawn_per_turn: usize,

    /// Whether the turn-1 Start Phase draws too.
    pub draw_on_first_turn: bool,

    /// Number of turns before the match ends.
    pub max_turns: u32,

    /// Minimum characters per deck, at least `MIN_DECK_SIZE`.
    pub min_deck_size: usize,

    /// Exact missions per deck; must equal `MISSIONS_PER_DECK`.
    pub missions_per_deck: usize,

    /// Copies allowed per version family in one deck.
    pub max_copies_per_version: usize,

    /// Rank assigned to each lane.
    pub lane_ranks: [MissionRank; LANE_COUNT],

    /// First turn at which each lane may be scored.
    pub lane_unlock_turns: [u32; LANE_COUNT],

    /// Bonus points per rank.
    pub rank_bonus: RankBonusTable,

    /// Keep unspent chakra across turns.
    pub chakra_carries_over: bool,
}

impl Default for MatchRules {
    fn default() -> Self {
        Self {
            base_chakra: 5,
            hidden_play_cost: 1,
            opening_hand_size: 5,
            cards_drawn_per_turn: 2,
            draw_on_first_turn: false,
            max_turns: 4,
            min_deck_size: MIN_DECK_SIZE,
            missions_per_deck: MISSIONS_PER_DECK,
            max_copies_per_version: 2,
            lane_ranks: [MissionRank::D, MissionRank::C, MissionRank::B],
            lane_unlock_turns: [1, 2, 3],
            rank_bonus: RankBonusTable::default(),
            chakra_carries_over: false,
        }
    }
}

impl MatchRules {
    /// Set the base chakra gain.
    #[must_use]
    pub fn with_base_chakra(mut self, chakra: u32) -> Self {
        self.base_chakra = chakra;
        self
    }

    /// Set the rank bonus schedule.
    #[must_use]
    pub fn with_rank_bonus(mut self, table: RankBonusTable) -> Self {
        self.rank_bonus = table;
        self
    }

    /// Set lane unlock turns.
    #[must_use]
    pub fn with_lane_unlock_turns(mut self, turns: [u32; LANE_COUNT]) -> Self {
        self.lane_unlock_turns = turns;
        self
    }

    /// Set the number of cards drawn per Start Phase.
    #[must_use]
    pub fn with_cards_drawn_per_turn(mut self, count: usize) -> Self {
        self.cards_drawn_per_turn = count;
        self
    }

    /// Set the copy limit per version family.
    #[must_use]
    pub fn with_max_copies(mut self, max: usize) -> Self {
        self.max_copies_per_version = max;
        self
    }

    /// Keep or empty chakra at End Phase.
    #[must_use]
    pub fn with_chakra_carry_over(mut self, carry: bool) -> Self {
        self.chakra_carries_over = carry;
        self
    }

    /// Check the deck limits and lane tables.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_deck_size < MIN_DECK_SIZE {
            return Err(ConfigError::InvalidDeckRules(format!(
                "min_deck_size {} below {}",
                self.min_deck_size, MIN_DECK_SIZE
            )));
        }
        if self.missions_per_deck != MISSIONS_PER_DECK {
            return Err(ConfigError::InvalidDeckRules(format!(
                "missions_per_deck {} must be {}",
                self.missions_per_deck, MISSIONS_PER_DECK
            )));
        }
        if self.max_turns == 0 {
            return Err(ConfigError::InvalidLaneTable("max_turns must be positive".into()));
        }
        if let Some(turn) = self.lane_unlock_turns.iter().find(|&&t| t == 0 || t > self.max_turns) {
            return Err(ConfigError::InvalidLaneTable(format!(
                "unlock turn {} outside 1..={}",
                turn, self.max_turns
            )));
        }
        Ok(())
    }
}

/// AI strength for a computer-controlled seat.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AiDifficulty {
    Easy,
    Medium,
    Hard,
}

/// A deck: characters plus missions.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Deck {
    pub characters: Vec<CharacterCard>,
    pub missions: Vec<MissionCard>,
}

/// A deck described by card ids, resolved through a `CardRegistry`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckList {
    pub characters: Vec<CardId>,
    pub missions: Vec<CardId>,
}

/// One seat of a match.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlayerSpec {
    /// Account id of a human player, if any.
    pub user_id: Option<String>,

    /// `Some` for a computer-controlled seat.
    pub ai: Option<AiDifficulty>,

    pub deck: Deck,
}

impl PlayerSpec {
    /// A human seat.
    #[must_use]
    pub fn human(user_id: impl Into<String>, deck: Deck) -> Self {
        Self {
            user_id: Some(user_id.into()),
            ai: None,
            deck,
        }
    }

    /// A computer seat.
    #[must_use]
    pub fn ai(difficulty: AiDifficulty, deck: Deck) -> Self {
        Self {
            user_id: None,
            ai: Some(difficulty),
            deck,
        }
    }

    /// Whether this seat is computer-controlled.
    #[must_use]
    pub fn is_ai(&self) -> bool {
        self.ai.is_some()
    }
}

/// Everything needed to create a match.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameConfig {
    pub player1: PlayerSpec,
    pub player2: PlayerSpec,
    #[serde(default)]
    pub rules: MatchRules,
    pub seed: u64,
}

impl GameConfig {
    /// Create a config with default rules.
    #[must_use]
    pub fn new(player1: PlayerSpec, player2: PlayerSpec, seed: u64) -> Self {
        Self {
            player1,
            player2,
            rules: MatchRules::default(),
            seed,
        }
    }

    /// Replace the rules.
    #[must_use]
    pub fn with_rules(mut self, rules: MatchRules) -> Self {
        self.rules = rules;
        self
    }

    /// The spec for a seat.
    #[must_use]
    pub fn player(&self, player: PlayerId) -> &PlayerSpec {
        if player == PlayerId::ONE {
            &self.player1
        } else {
            &self.player2
        }
    }

    /// Validate both decks and the rule tables.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.rules.validate()?;
        for player in PlayerId::both() {
            validate_deck(player, &self.player(player).deck, &self.rules)?;
        }
        Ok(())
    }
}

fn validate_deck(player: PlayerId, deck: &Deck, rules: &MatchRules) -> Result<(), ConfigError> {
    if deck.characters.len() < rules.min_deck_size {
        return Err(ConfigError::TooFewCharacters {
            player,
            count: deck.characters.len(),
            min: rules.min_deck_size,
        });
    }
    if deck.missions.len() != rules.missions_per_deck {
        return Err(ConfigError::WrongMissionCount {
            player,
            count: deck.missions.len(),
            expected: rules.missions_per_deck,
        });
    }

    // BTreeMap keeps the reported violation stable across runs.
    let mut copies: BTreeMap<CardId, usize> = BTreeMap::new();
    for card in &deck.characters {
        *copies.entry(card.base_version()).or_default() += 1;
    }
    if let Some((&version, &count)) = copies.iter().find(|(_, &n)| n > rules.max_copies_per_version) {
        return Err(ConfigError::TooManyCopies {
            player,
            version,
            count,
            max: rules.max_copies_per_version,
        });
    }
    Ok(())
}

/// Shared handle to the rules of a running match.
pub type SharedRules = Arc<MatchRules>;

#[cfg(test)]
mod tests {
    use super::*;

    fn deck(characters: usize, missions: usize) -> Deck {
        Deck {
            characters: (0..characters)
                .map(|i| CharacterCard::new(CardId::new(i as u32), format!("Ninja {i}"), 1, 1))
                .collect(),
            missions: (0..missions)
                .map(|i| MissionCard::new(CardId::new(1000 + i as u32), format!("Mission {i}"), 1))
                .collect(),
        }
    }

    #[test]
    fn test_default_rules() {
        let rules = MatchRules::default();
        assert_eq!(rules.max_turns, 4);
        assert_eq!(rules.min_deck_size, 30);
        assert_eq!(rules.rank_bonus.bonus(MissionRank::A), 0);
        assert!(rules.validate().is_ok());
    }

    #[test]
    fn test_rank_bonus_lookup() {
        let table = RankBonusTable::new(1, 2, 3, 4);
        assert_eq!(table.bonus(MissionRank::D), 1);
        assert_eq!(table.bonus(MissionRank::A), 4);
    }

    #[test]
    fn test_valid_config() {
        let config = GameConfig::new(
            PlayerSpec::human("a", deck(30, 3)),
            PlayerSpec::ai(AiDifficulty::Easy, deck(30, 3)),
            1,
        );
        assert!(config.validate().is_ok());
        assert!(config.player(PlayerId::TWO).is_ai());
    }

    #[test]
    fn test_too_few_characters() {
        let config = GameConfig::new(
            PlayerSpec::human("a", deck(30, 3)),
            PlayerSpec::human("b", deck(29, 3)),
            1,
        );
        assert_eq!(
            config.validate(),
            Err(ConfigError::TooFewCharacters {
                player: PlayerId::TWO,
                count: 29,
                min: 30
            })
        );
    }

    #[test]
    fn test_wrong_mission_count() {
        let config = GameConfig::new(
            PlayerSpec::human("a", deck(30, 2)),
            PlayerSpec::human("b", deck(30, 3)),
            1,
        );
        assert!(matches!(
            config.validate(),
            Err(ConfigError::WrongMissionCount { count: 2, .. })
        ));
    }

    #[test]
    fn test_copy_limit_uses_base_version() {
        let mut d = deck(30, 3);
        let base = CardId::new(500);
        for i in 0..3 {
            d.characters[i] = CharacterCard::new(CardId::new(600 + i as u32), "Naruto", 2, 2)
                .with_base_version(base);
        }
        let config = GameConfig::new(PlayerSpec::human("a", d), PlayerSpec::human("b", deck(30, 3)), 1);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::TooManyCopies { count: 3, .. })
        ));
    }

    #[test]
    fn test_deck_floors_cannot_be_lowered() {
        let lowered = MatchRules {
            min_deck_size: 10,
            ..MatchRules::default()
        };
        let config = GameConfig::new(
            PlayerSpec::human("a", deck(10, 3)),
            PlayerSpec::human("b", deck(10, 3)),
            1,
        )
        .with_rules(lowered);
        assert!(matches!(config.validate(), Err(ConfigError::InvalidDeckRules(_))));

        let one_mission = MatchRules {
            missions_per_deck: 1,
            ..MatchRules::default()
        };
        assert!(matches!(one_mission.validate(), Err(ConfigError::InvalidDeckRules(_))));

        let raised = MatchRules {
            min_deck_size: 40,
            ..MatchRules::default()
        };
        assert!(raised.validate().is_ok());
    }

    #[test]
    fn test_unlock_turn_out_of_range() {
        let rules = MatchRules::default().with_lane_unlock_turns([1, 2, 5]);
        assert!(rules.validate().is_err());
    }

    #[test]
    fn test_config_serde() {
        let config = GameConfig::new(
            PlayerSpec::human("a", deck(30, 3)),
            PlayerSpec::ai(AiDifficulty::Hard, deck(30, 3)),
            9,
        );
        let json = serde_json::to_string(&config).unwrap();
        let back: GameConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.seed, 9);
        assert_eq!(back.player2.ai, Some(AiDifficulty::Hard));
        assert_eq!(back.player1.deck.characters.len(), 30);
    }
}
