//! Trump card identities and their effects as data.
//!
//! A trump's behavior is a closed tagged variant per category. Each variant
//! carries only the parameters its transform needs; the effect processor
//! matches on it. Names are normalized once, here, so that lookups never
//! compare raw strings.

use serde::{Deserialize, Serialize};

use crate::core::CardValue;

/// Normalized trump identity.
///
/// Lowercase, trimmed, inner whitespace collapsed. A trailing `+` marks an
/// upgraded variant; `base()` strips it for archetype matching.
///
/// ```
/// use duel21::cards::TrumpId;
///
/// let id = TrumpId::new("  Mind  Shift+ ");
/// assert_eq!(id.as_str(), "mind shift+");
/// assert_eq!(id.base(), TrumpId::new("Mind Shift"));
/// assert!(id.is_upgraded());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct TrumpId(String);

impl TrumpId {
    #[must_use]
    pub fn new(name: &str) -> Self {
        let normalized = name
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        Self(normalized)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Identity with every trailing `+` removed.
    #[must_use]
    pub fn base(&self) -> TrumpId {
        Self(self.0.trim_end_matches('+').trim_end().to_string())
    }

    #[must_use]
    pub fn is_upgraded(&self) -> bool {
        self.0.ends_with('+')
    }

    /// Case-insensitive substring match.
    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        self.0.contains(&needle.to_lowercase())
    }
}

impl From<String> for TrumpId {
    fn from(raw: String) -> Self {
        Self::new(&raw)
    }
}

impl From<&str> for TrumpId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<TrumpId> for String {
    fn from(id: TrumpId) -> String {
        id.0
    }
}

impl std::fmt::Display for TrumpId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Broad category of a trump.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrumpCategory {
    BetModifier,
    DrawForcer,
    BoardWipe,
    TargetModifier,
    Defensive,
    Special,
    EnemyAttack,
}

impl TrumpCategory {
    /// Parse a category label. Accepts `bet-modifier`, `Bet Modifier`,
    /// `bet_modifier` and the short label `attack`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let key: String = raw
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        match key.as_str() {
            "betmodifier" | "bet" => Some(Self::BetModifier),
            "drawforcer" | "cards" => Some(Self::DrawForcer),
            "boardwipe" | "counter" => Some(Self::BoardWipe),
            "targetmodifier" | "target" => Some(Self::TargetModifier),
            "defensive" | "defense" => Some(Self::Defensive),
            "special" | "switch" => Some(Self::Special),
            "enemyattack" | "enemyonlyattack" | "attack" => Some(Self::EnemyAttack),
            _ => None,
        }
    }
}

/// Draw-forcer variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DrawForce {
    /// Draw this exact card if it is still in the deck.
    Number(CardValue),
    /// Draw the best card for the player; optional bet raise and trump draws.
    Best { raise_other: i32, trump_draws: u8 },
    /// Return the player's own last face-up card to the deck.
    ReturnOwnLast,
    /// Swap both sides' last face-up cards.
    ExchangeLast,
    /// The other side draws the best card for itself.
    OtherDrawsBest,
}

/// Scope of a trump wipe on the other side's table entries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WipeScope {
    None,
    Last,
    All,
}

/// Card-level part of a wipe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardWipe {
    None,
    /// The other side's last face-up card becomes dead.
    OtherLastFaceUp,
}

/// Hand management and round-level specials.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpecialEffect {
    /// Discard up to `discard` random trumps, draw `draw`.
    TrumpSwitch { discard: u8, draw: u8 },
    /// Draw a trump after each later trump while on the table.
    Harvest,
    /// No damage to the owner on a loss; round resets.
    Escape,
    /// Cancel the round.
    Oblivion,
    /// Both bets become 100, the other side cannot draw.
    Desperation,
}

/// Enemy-only attacks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackEffect {
    /// Both sides draw one trump.
    Happiness,
    /// Other side's bet rises by half (or all) of its trump count.
    Desire { full: bool },
    /// Other side loses half (or all) trumps at round end unless it plays
    /// two (or three) this round.
    MindShift { full: bool },
    /// Owner discards its shields; other side's bet rises.
    ShieldAssault { raise_other: i32, shields: u8 },
    /// Other side loses a random trump and draws the highest card.
    Curse,
    /// Other side loses half its trumps, its bet rises by 10, owner draws
    /// the best card. Twice per fight.
    BlackMagic,
    /// Owner draws three trumps, its own bet rises by 1.
    Conjure,
    /// Other side cannot draw.
    DeadSilence,
    /// Other side must finish exactly on target; its bet rises by 21.
    TwentyOneUp,
}

/// What a trump does.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrumpEffect {
    /// Raise the other side's bet while on the table.
    BetModifier {
        raise_other: i32,
        trump_draws: u8,
        return_other_last: bool,
    },
    DrawForcer(DrawForce),
    /// Remove trumps from the table and/or kill a face-up card.
    BoardWipe {
        trumps: WipeScope,
        lock_trumps: bool,
        cards: CardWipe,
    },
    /// Set the target while on the table.
    TargetModifier { target: u8 },
    /// Lower the owner's bet while on the table.
    Defensive { lower_own: i32 },
    Special(SpecialEffect),
    EnemyAttack(AttackEffect),
    /// Known by name and category only (loaded from a rule-table document).
    Unmodeled(TrumpCategory),
}

impl TrumpEffect {
    #[must_use]
    pub fn category(&self) -> TrumpCategory {
        match self {
            TrumpEffect::BetModifier { .. } => TrumpCategory::BetModifier,
            TrumpEffect::DrawForcer(_) => TrumpCategory::DrawForcer,
            TrumpEffect::BoardWipe { .. } => TrumpCategory::BoardWipe,
            TrumpEffect::TargetModifier { .. } => TrumpCategory::TargetModifier,
            TrumpEffect::Defensive { .. } => TrumpCategory::Defensive,
            TrumpEffect::Special(_) => TrumpCategory::Special,
            TrumpEffect::EnemyAttack(_) => TrumpCategory::EnemyAttack,
            TrumpEffect::Unmodeled(category) => *category,
        }
    }
}

/// Static trump record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrumpCard {
    pub id: TrumpId,
    /// Display name.
    pub name: String,
    pub category: TrumpCategory,
    pub effect: TrumpEffect,
    /// Utility weight, 0..=100. Drives ordering only; never shown.
    #[serde(rename = "utility_weight")]
    pub(crate) weight: u8,
    /// Extra names resolving to this card.
    #[serde(default)]
    pub aliases: Vec<TrumpId>,
    /// Can the player hold it?
    #[serde(default)]
    pub obtainable: bool,
    /// Needs a challenge unlock before it can be added to a hand.
    #[serde(default)]
    pub unlockable: bool,
}

impl TrumpCard {
    #[must_use]
    pub fn new(name: &str, effect: TrumpEffect, weight: u8) -> Self {
        Self {
            id: TrumpId::new(name),
            name: name.to_string(),
            category: effect.category(),
            effect,
            weight: weight.min(100),
            aliases: Vec::new(),
            obtainable: weight > 0,
            unlockable: false,
        }
    }

    #[must_use]
    pub fn with_alias(mut self, alias: &str) -> Self {
        self.aliases.push(TrumpId::new(alias));
        self
    }

    #[must_use]
    pub fn unlockable(mut self) -> Self {
        self.unlockable = true;
        self
    }

    #[must_use]
    pub fn obtainable(mut self, obtainable: bool) -> Self {
        self.obtainable = obtainable;
        self
    }

    /// Base identity for archetype matching.
    #[must_use]
    pub fn base(&self) -> TrumpId {
        self.id.base()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalization() {
        assert_eq!(TrumpId::new("Two-Up+"), TrumpId::new(" two-up+"));
        assert_eq!(TrumpId::new("Destroy++").base(), TrumpId::new("destroy"));
        assert!(!TrumpId::new("Shield").is_upgraded());
    }

    #[test]
    fn test_serde_normalizes() {
        let id: TrumpId = serde_json::from_str("\"Dead  Silence\"").unwrap();
        assert_eq!(id.as_str(), "dead silence");
    }

    #[test]
    fn test_category_parse() {
        assert_eq!(TrumpCategory::parse("Bet Modifier"), Some(TrumpCategory::BetModifier));
        assert_eq!(TrumpCategory::parse("enemy-attack"), Some(TrumpCategory::EnemyAttack));
        assert_eq!(TrumpCategory::parse("Attack"), Some(TrumpCategory::EnemyAttack));
        assert_eq!(TrumpCategory::parse("mystery"), None);
    }

    #[test]
    fn test_category_kebab_serde() {
        let json = serde_json::to_string(&TrumpCategory::TargetModifier).unwrap();
        assert_eq!(json, "\"target-modifier\"");
    }
}
