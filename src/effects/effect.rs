//! Effect definitions and the effect-text parser.
//!
//! A `CardEffect` is a trigger tag plus a raw description written in a
//! small markup:
//!
//! | Markup            | Meaning                                         |
//! |-------------------|-------------------------------------------------|
//! | `[⧗]`             | continuous: applies passively while in play      |
//! | `[↯]`             | score: resolves during mission scoring           |
//! | `effect:` prefix  | modifier: layers onto the MAIN chain on upgrade  |
//! | `POWERUP <n>`     | place `n` power tokens                           |
//! | `POWERUP X`       | token count supplied by game context             |
//! | `CHAKRA +<n>`     | `n` extra chakra at every Start Phase            |
//! | `[Name]`          | reference to a character, resolved at play time  |
//!
//! Parsing is pure and total: any string yields a `ParsedEffect`. Results
//! are cached on the effect itself and can be shared across effects with
//! the same text through an `EffectCache`.

use std::sync::Arc;

use once_cell::sync::OnceCell;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Continuous marker token.
pub const CONTINUOUS_MARKER: &str = "[⧗]";

/// Score marker token.
pub const SCORE_MARKER: &str = "[↯]";

const MODIFIER_PREFIX: &str = "effect:";

/// When an effect fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    /// On entering play face-up, on reveal, and on upgrade.
    Main,
    /// On upgrade only.
    Upgrade,
    /// On reveal only.
    Ambush,
    /// During mission scoring.
    Score,
}

/// Game quantity a contextual amount is read from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContextAmount {
    /// Characters the owner revealed this turn.
    RevealedThisTurn,
    /// Other friendly characters in the source's lane.
    FriendlyInMission,
    /// Wording not understood; resolves as a miss.
    Unknown,
}

/// Amount of a `POWERUP`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectAmount {
    Fixed(i64),
    Contextual(ContextAmount),
}

/// Structured form of an effect description.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedEffect {
    pub is_continuous: bool,
    pub is_score: bool,
    pub is_effect_modifier: bool,
    pub powerup: Option<EffectAmount>,
    pub chakra_bonus: Option<i64>,
    pub character_references: SmallVec<[String; 2]>,
    pub clean_description: String,
}

impl ParsedEffect {
    /// The statically known token count, if any.
    ///
    /// `None` both when there is no `POWERUP` and when its amount depends
    /// on game context.
    #[must_use]
    pub fn powerup_value(&self) -> Option<i64> {
        match self.powerup {
            Some(EffectAmount::Fixed(n)) => Some(n),
            _ => None,
        }
    }

    /// First named target, if the text names one.
    #[must_use]
    pub fn primary_reference(&self) -> Option<&str> {
        self.character_references.first().map(String::as_str)
    }
}

/// Parse an effect description.
///
/// ```
/// use mission_ccg::effects::{parse_effect, EffectAmount};
///
/// let parsed = parse_effect("[⧗] POWERUP 2 [Sasuke Uchiha]");
/// assert!(parsed.is_continuous);
/// assert_eq!(parsed.powerup, Some(EffectAmount::Fixed(2)));
/// assert_eq!(parsed.primary_reference(), Some("Sasuke Uchiha"));
/// assert_eq!(parsed.clean_description, "POWERUP 2 Sasuke Uchiha");
/// ```
#[must_use]
pub fn parse_effect(description: &str) -> ParsedEffect {
    let trimmed = description.trim();
    let is_effect_modifier = trimmed
        .get(..MODIFIER_PREFIX.len())
        .map_or(false, |head| head.eq_ignore_ascii_case(MODIFIER_PREFIX));

    let (references, plain) = split_references(trimmed);
    let words: Vec<&str> = plain.split_whitespace().collect();

    ParsedEffect {
        is_continuous: description.contains(CONTINUOUS_MARKER),
        is_score: description.contains(SCORE_MARKER),
        is_effect_modifier,
        powerup: find_powerup(&words, description),
        chakra_bonus: find_chakra(&words),
        character_references: references,
        clean_description: clean(trimmed, is_effect_modifier),
    }
}

/// Pull `[Name]` references out of the text.
///
/// Returns the references and the text with every bracketed span removed.
fn split_references(text: &str) -> (SmallVec<[String; 2]>, String) {
    let mut references = SmallVec::new();
    let mut plain = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(open) = rest.find('[') {
        plain.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find(']') else {
            // Unclosed bracket: keep the remainder as plain text.
            plain.push_str(&rest[open..]);
            rest = "";
            break;
        };
        let span = &rest[open..open + close + 2];
        let inner = after[..close].trim();
        if span != CONTINUOUS_MARKER && span != SCORE_MARKER && !inner.is_empty() {
            references.push(inner.to_string());
        }
        plain.push(' ');
        rest = &after[close + 1..];
    }
    plain.push_str(rest);
    (references, plain)
}

fn trim_number(word: &str) -> &str {
    word.trim_end_matches(|c: char| matches!(c, '.' | ',' | ';' | ':' | ')'))
}

fn find_powerup(words: &[&str], description: &str) -> Option<EffectAmount> {
    let pos = words.iter().position(|w| w.eq_ignore_ascii_case("POWERUP"))?;
    let amount = match words.get(pos + 1).map(|w| trim_number(w)) {
        Some(word) => match word.parse::<i64>() {
            Ok(n) => EffectAmount::Fixed(n),
            Err(_) => EffectAmount::Contextual(context_of(description)),
        },
        None => EffectAmount::Contextual(context_of(description)),
    };
    Some(amount)
}

fn context_of(description: &str) -> ContextAmount {
    let lower = description.to_ascii_lowercase();
    if lower.contains("reveal") {
        ContextAmount::RevealedThisTurn
    } else if lower.contains("mission") {
        ContextAmount::FriendlyInMission
    } else {
        ContextAmount::Unknown
    }
}

fn find_chakra(words: &[&str]) -> Option<i64> {
    words.windows(2).find_map(|pair| {
        if !pair[0].eq_ignore_ascii_case("CHAKRA") {
            return None;
        }
        trim_number(pair[1]).strip_prefix('+')?.parse::<i64>().ok()
    })
}

fn clean(trimmed: &str, is_modifier: bool) -> String {
    let body = if is_modifier {
        &trimmed[MODIFIER_PREFIX.len()..]
    } else {
        trimmed
    };
    let stripped = body
        .replace(CONTINUOUS_MARKER, " ")
        .replace(SCORE_MARKER, " ")
        .replace(['[', ']'], "");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// A triggered or passive effect printed on a card.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CardEffect {
    pub kind: EffectKind,
    pub description: String,
    #[serde(skip)]
    parsed: OnceCell<Arc<ParsedEffect>>,
}

impl PartialEq for CardEffect {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.description == other.description
    }
}

impl CardEffect {
    /// Create an effect.
    #[must_use]
    pub fn new(kind: EffectKind, description: impl Into<String>) -> Self {
        Self {
            kind,
            description: description.into(),
            parsed: OnceCell::new(),
        }
    }

    /// MAIN effect.
    #[must_use]
    pub fn main(description: impl Into<String>) -> Self {
        Self::new(EffectKind::Main, description)
    }

    /// UPGRADE effect.
    #[must_use]
    pub fn upgrade(description: impl Into<String>) -> Self {
        Self::new(EffectKind::Upgrade, description)
    }

    /// AMBUSH effect.
    #[must_use]
    pub fn ambush(description: impl Into<String>) -> Self {
        Self::new(EffectKind::Ambush, description)
    }

    /// SCORE effect.
    #[must_use]
    pub fn score(description: impl Into<String>) -> Self {
        Self::new(EffectKind::Score, description)
    }

    /// Parsed form, computed on first use.
    #[must_use]
    pub fn parsed(&self) -> &ParsedEffect {
        self.parsed
            .get_or_init(|| Arc::new(parse_effect(&self.description)))
    }

    /// Seed the cache with a shared parse of the same description.
    ///
    /// Ignored if this effect was already parsed.
    pub fn prime(&self, parsed: Arc<ParsedEffect>) {
        let _ = self.parsed.set(parsed);
    }

    /// Whether this effect resolves during mission scoring.
    #[must_use]
    pub fn is_score_trigger(&self) -> bool {
        self.kind == EffectKind::Score || self.parsed().is_score
    }

    /// Whether this effect applies passively instead of triggering.
    #[must_use]
    pub fn is_continuous(&self) -> bool {
        self.parsed().is_continuous
    }
}

/// Memo of parsed descriptions, one entry per distinct text.
#[derive(Debug, Default)]
pub struct EffectCache {
    entries: FxHashMap<String, Arc<ParsedEffect>>,
}

impl EffectCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a description, or return the shared earlier parse.
    pub fn get_or_parse(&mut self, description: &str) -> Arc<ParsedEffect> {
        if let Some(parsed) = self.entries.get(description) {
            return Arc::clone(parsed);
        }
        let parsed = Arc::new(parse_effect(description));
        self.entries.insert(description.to_string(), Arc::clone(&parsed));
        parsed
    }

    /// Number of distinct descriptions parsed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been parsed yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
