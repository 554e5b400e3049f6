//! Opponent profiles, banker draw tendencies and the known roster.
//!
//! ## BankerProfile
//!
//! A banker's draw decision has three regions relative to its own total:
//!
//! - below the take-card border it always draws
//! - at or above the hand-good border it never draws
//! - in between (the gray zone) it draws with a heuristic percentage that
//!   depends on how it reads the player's face-up total
//!
//! Every border and band is defined for target 21 and shifts by
//! `target - 21` when a target trump is on the table.

use serde::{Deserialize, Serialize};

use crate::cards::{TrumpCatalog, TrumpId};
use crate::core::{DrawTendencies, BASE_TARGET};

/// Kit names resolved through the catalog so aliases and misspellings
/// land on the card's own identity. Unknown names are kept as given.
fn canonical_ids<I, S>(names: I) -> Vec<TrumpId>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let catalog = TrumpCatalog::builtin();
    names
        .into_iter()
        .map(|n| {
            let name = n.as_ref();
            catalog
                .get(name)
                .map_or_else(|| TrumpId::new(name), |card| card.id.clone())
        })
        .collect()
}

/// Inclusive range of player face-up totals.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TotalBand {
    pub low: u8,
    pub high: u8,
}

impl TotalBand {
    #[must_use]
    pub const fn new(low: u8, high: u8) -> Self {
        Self { low, high }
    }

    fn contains_shifted(self, total: u8, shift: i16) -> bool {
        let total = i16::from(total);
        i16::from(self.low) + shift <= total && total <= i16::from(self.high) + shift
    }
}

/// How likely the banker is to draw at a given total.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DrawChance {
    Always,
    Never,
    /// Gray zone: a heuristic whole percentage.
    Percent(u8),
}

/// Banker draw parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BankerProfile {
    /// Always draws below this total (the stay threshold).
    pub take_card_border: u8,
    /// Never draws at or above this total.
    pub hand_good_border: u8,
    /// Passive bankers lean on trumps rather than their hand.
    pub passive: bool,
    /// Player face-up totals the banker reads as dangerous.
    pub player_strong: TotalBand,
    /// Player face-up totals the banker reads as weak.
    pub player_weak: TotalBand,
}

impl BankerProfile {
    #[must_use]
    pub const fn new(take_card_border: u8, hand_good_border: u8, passive: bool) -> Self {
        Self {
            take_card_border,
            hand_good_border,
            passive,
            player_strong: TotalBand::new(17, 21),
            player_weak: TotalBand::new(1, 12),
        }
    }

    #[must_use]
    pub const fn with_bands(mut self, strong: TotalBand, weak: TotalBand) -> Self {
        self.player_strong = strong;
        self.player_weak = weak;
        self
    }

    /// Default banker for an opponent known only by its stay threshold.
    #[must_use]
    pub fn generic(stay_threshold: u8, tendencies: &DrawTendencies) -> Self {
        Self::new(
            stay_threshold,
            stay_threshold.saturating_add(tendencies.default_good_margin),
            false,
        )
    }

    /// Draw decision at `banker_total` against a player showing
    /// `player_visible`.
    #[must_use]
    pub fn draw_chance(
        &self,
        banker_total: u8,
        player_visible: u8,
        target: u8,
        tendencies: &DrawTendencies,
    ) -> DrawChance {
        let shift = i16::from(target) - i16::from(BASE_TARGET);
        let total = i16::from(banker_total);
        let take = i16::from(self.take_card_border) + shift;
        let good = i16::from(self.hand_good_border) + shift;

        if total >= i16::from(target) {
            return DrawChance::Never;
        }
        if total < take {
            return DrawChance::Always;
        }
        if total >= good {
            return DrawChance::Never;
        }

        if self.passive {
            return DrawChance::Percent(tendencies.passive_pct);
        }
        if self.player_weak.contains_shifted(player_visible, shift) {
            return DrawChance::Percent(tendencies.weak_player_pct);
        }
        if self.player_strong.contains_shifted(player_visible, shift) {
            return DrawChance::Percent(tendencies.strong_player_pct);
        }

        // Neutral read: fall linearly through the zone, rounded to a whole
        // percent, never below the floor.
        let width = (good - take).max(1) as u32;
        let left = (width as i16 - (total - take)).max(0) as u32;
        let start = u32::from(tendencies.neutral_start_pct);
        let pct = (2 * start * left + width) / (2 * width);
        DrawChance::Percent((pct as u8).max(tendencies.neutral_floor_pct))
    }
}

/// Archetype inferred from an opponent's trump kit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Thinkset {
    /// Baseline.
    Attacker,
    Defence,
    Tricky,
    Molded,
    /// Final-boss behavior.
    LassBoss,
    Rare,
}

impl Thinkset {
    pub const ALL: [Thinkset; 6] = [
        Thinkset::Attacker,
        Thinkset::Defence,
        Thinkset::Tricky,
        Thinkset::Molded,
        Thinkset::LassBoss,
        Thinkset::Rare,
    ];

    /// Parse a rule-table key. A trailing `_p` variant suffix is accepted.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.strip_suffix("_p").unwrap_or(key);
        Self::ALL
            .into_iter()
            .find(|t| t.key().eq_ignore_ascii_case(key))
    }

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Thinkset::Attacker => "Attacker",
            Thinkset::Defence => "Defence",
            Thinkset::Tricky => "Tricky",
            Thinkset::Molded => "Molded",
            Thinkset::LassBoss => "LassBoss",
            Thinkset::Rare => "Rare",
        }
    }
}

impl std::fmt::Display for Thinkset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Static description of an opponent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpponentProfile {
    pub name: String,
    /// Total at or above which the opponent stops drawing (target 21).
    pub stay_threshold: u8,
    pub banker: Option<BankerProfile>,
    /// Special trumps this opponent can play.
    pub kit: Vec<TrumpId>,
    /// Standard trumps (bet-ups, shields) this opponent can play.
    pub standard: Vec<TrumpId>,
}

impl OpponentProfile {
    #[must_use]
    pub fn new(name: &str, stay_threshold: u8) -> Self {
        Self {
            name: name.to_string(),
            stay_threshold,
            banker: None,
            kit: Vec::new(),
            standard: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_banker(mut self, banker: BankerProfile) -> Self {
        self.banker = Some(banker);
        self
    }

    #[must_use]
    pub fn with_kit<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.kit = canonical_ids(names);
        self
    }

    #[must_use]
    pub fn with_standard<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.standard = canonical_ids(names);
        self
    }

    /// Every trump the opponent can play, special first.
    pub fn all_trumps(&self) -> impl Iterator<Item = &TrumpId> {
        self.kit.iter().chain(self.standard.iter())
    }

    /// Does the kit hold a card with this base identity?
    #[must_use]
    pub fn has_base(&self, base: &TrumpId) -> bool {
        self.all_trumps().any(|t| &t.base() == base)
    }

    /// Stay threshold shifted with the target.
    #[must_use]
    pub fn adjusted_stay_threshold(&self, target: u8) -> u8 {
        let shifted = i16::from(self.stay_threshold) + i16::from(target) - i16::from(BASE_TARGET);
        shifted.clamp(0, i16::from(u8::MAX)) as u8
    }

    /// Banker parameters, falling back to a generic banker.
    #[must_use]
    pub fn banker_or_generic(&self, tendencies: &DrawTendencies) -> BankerProfile {
        self.banker
            .unwrap_or_else(|| BankerProfile::generic(self.stay_threshold, tendencies))
    }

    /// Boss opponents by name.
    #[must_use]
    pub fn is_boss(&self) -> bool {
        ["Boss", "Undead", "Molded"]
            .iter()
            .any(|marker| self.name.contains(marker))
    }
}

/// Known opponents.
#[derive(Clone, Debug, Default)]
pub struct Roster {
    opponents: Vec<OpponentProfile>,
}

impl Roster {
    /// Every opponent the game is known to field.
    #[must_use]
    pub fn builtin() -> Self {
        let strong = |low, high| TotalBand::new(low, high);
        let weak = |high| TotalBand::new(1, high);
        let opponents = vec![
            OpponentProfile::new("Lucas", 17)
                .with_banker(BankerProfile::new(17, 19, false).with_bands(strong(17, 21), weak(12)))
                .with_kit(["One-Up", "Two-Up", "Shield"]),
            OpponentProfile::new("Tally Mark Hoffman", 16)
                .with_banker(BankerProfile::new(16, 18, false).with_bands(strong(17, 21), weak(12)))
                .with_standard(["One-Up", "Shield"]),
            OpponentProfile::new("Bloody Handprints Hoffman", 16)
                .with_banker(BankerProfile::new(16, 19, false).with_bands(strong(16, 21), weak(13)))
                .with_kit(["Happiness", "Return", "Desire", "Mind Shift"])
                .with_standard(["One-Up", "Shield"]),
            OpponentProfile::new("Barbed Wire Hoffman", 16)
                .with_banker(BankerProfile::new(16, 17, true).with_bands(strong(18, 21), weak(14)))
                .with_kit(["Shield Assault"])
                .with_standard(["Shield", "One-Up"]),
            OpponentProfile::new("Tally Mark Hoffman (Upgraded)", 17)
                .with_banker(BankerProfile::new(17, 19, false).with_bands(strong(17, 21), weak(12)))
                .with_standard(["One-Up", "Two-Up", "Shield"]),
            OpponentProfile::new("Molded Hoffman (Survival Boss)", 17)
                .with_banker(BankerProfile::new(17, 20, false).with_bands(strong(16, 21), weak(13)))
                .with_kit(["Curse", "Conjure"])
                .with_standard(["One-Up", "Two-Up", "Shield"]),
            OpponentProfile::new("Tally Mark Hoffman (Survival+)", 17)
                .with_banker(BankerProfile::new(17, 20, false).with_bands(strong(16, 21), weak(12)))
                .with_kit([
                    "One-Up", "Two-Up", "Two-Up+", "4 Card", "5 Card", "Desire", "Happiness",
                    "Twenty-One Up",
                ]),
            OpponentProfile::new("Bloody Handprints Hoffman (Survival+)", 16)
                .with_banker(BankerProfile::new(16, 19, false).with_bands(strong(16, 21), weak(13)))
                .with_kit([
                    "4 Card", "Desire", "Desire+", "Mind Shift", "Mind Shift+", "Happiness",
                    "Return",
                ]),
            OpponentProfile::new("Barbed Wire Hoffman (Survival+)", 14)
                .with_banker(BankerProfile::new(14, 16, true).with_bands(strong(18, 21), weak(14)))
                .with_kit(["Shield", "Shield Assault", "Shield Assault+", "Go for 17", "Two-Up"]),
            OpponentProfile::new("Mr. Big Head Hoffman", 19)
                .with_banker(BankerProfile::new(19, 21, false).with_bands(strong(18, 21), weak(14)))
                .with_kit(["Escape"]),
            OpponentProfile::new("Molded Hoffman (Mid-Boss)", 17)
                .with_banker(BankerProfile::new(17, 20, false).with_bands(strong(16, 21), weak(13)))
                .with_kit(["Curse", "Black Magic", "Conjure", "Two-Up", "Destroy+", "Go for 17"]),
            OpponentProfile::new("Undead Hoffman (Final Boss)", 18)
                .with_banker(BankerProfile::new(18, 21, false).with_bands(strong(15, 21), weak(12)))
                .with_kit([
                    "Ultimate Draw",
                    "Two-Up+",
                    "Perfect Draw+",
                    "Dead Silence",
                    "Oblivion",
                ]),
        ];
        Self { opponents }
    }

    /// Case-insensitive lookup by exact name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&OpponentProfile> {
        self.opponents
            .iter()
            .find(|o| o.name.eq_ignore_ascii_case(name.trim()))
    }

    /// Identify an opponent by name, or build one from a kit and a stay
    /// threshold when the name is unknown.
    #[must_use]
    pub fn identify(&self, name: &str, kit: &[&str], stay_threshold: u8) -> OpponentProfile {
        self.find(name).cloned().unwrap_or_else(|| {
            OpponentProfile::new(name.trim(), stay_threshold).with_kit(kit.iter().copied())
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &OpponentProfile> {
        self.opponents.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.opponents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.opponents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lucas() -> BankerProfile {
        BankerProfile::new(17, 19, false)
    }

    #[test]
    fn test_hard_borders() {
        let t = DrawTendencies::default();
        assert_eq!(lucas().draw_chance(16, 10, 21, &t), DrawChance::Always);
        assert_eq!(lucas().draw_chance(19, 10, 21, &t), DrawChance::Never);
        assert_eq!(lucas().draw_chance(21, 10, 21, &t), DrawChance::Never);
    }

    #[test]
    fn test_gray_zone_reads_player() {
        let t = DrawTendencies::default();
        assert_eq!(lucas().draw_chance(17, 5, 21, &t), DrawChance::Percent(15));
        assert_eq!(lucas().draw_chance(17, 19, 21, &t), DrawChance::Percent(80));
        // 13..=16 is neither band: linear from 65%.
        assert_eq!(lucas().draw_chance(17, 14, 21, &t), DrawChance::Percent(65));
        assert_eq!(lucas().draw_chance(18, 14, 21, &t), DrawChance::Percent(33));
    }

    #[test]
    fn test_passive_banker() {
        let t = DrawTendencies::default();
        let barbed = BankerProfile::new(16, 17, true);
        assert_eq!(barbed.draw_chance(16, 20, 21, &t), DrawChance::Percent(5));
    }

    #[test]
    fn test_borders_shift_with_target() {
        let t = DrawTendencies::default();
        // Target 24: take border 20, good border 22.
        assert_eq!(lucas().draw_chance(19, 10, 24, &t), DrawChance::Always);
        assert!(matches!(lucas().draw_chance(20, 10, 24, &t), DrawChance::Percent(_)));
        assert_eq!(lucas().draw_chance(22, 10, 24, &t), DrawChance::Never);
        // Target 17: take border 13.
        assert_eq!(lucas().draw_chance(13, 2, 17, &t), DrawChance::Percent(15));
    }

    #[test]
    fn test_adjusted_stay_threshold() {
        let profile = OpponentProfile::new("Generic", 17);
        assert_eq!(profile.adjusted_stay_threshold(24), 20);
        assert_eq!(profile.adjusted_stay_threshold(17), 13);
        assert_eq!(profile.adjusted_stay_threshold(21), 17);
    }

    #[test]
    fn test_generic_banker() {
        let t = DrawTendencies::default();
        let profile = OpponentProfile::new("Generic", 16);
        let banker = profile.banker_or_generic(&t);
        assert_eq!(banker.take_card_border, 16);
        assert_eq!(banker.hand_good_border, 18);
    }

    #[test]
    fn test_roster_identify() {
        let roster = Roster::builtin();
        let boss = roster.find("undead hoffman (final boss)").unwrap();
        assert!(boss.is_boss());
        assert!(boss.has_base(&TrumpId::new("Perfect Draw")));

        let unknown = roster.identify("Stranger", &["Curse"], 15);
        assert_eq!(unknown.stay_threshold, 15);
        assert_eq!(unknown.kit, vec![TrumpId::new("curse")]);
    }

    #[test]
    fn test_kit_aliases_resolve_to_catalog_ids() {
        let profile = OpponentProfile::new("Stranger", 17)
            .with_kit(["Sheild Assalt", "Ovlivion"])
            .with_standard(["21 Up", "Lightning Bolt"]);
        assert_eq!(
            profile.kit,
            vec![TrumpId::new("Shield Assault"), TrumpId::new("Oblivion")]
        );
        assert!(profile.has_base(&TrumpId::new("Twenty-One Up")));
        assert!(profile.has_base(&TrumpId::new("lightning bolt")));
    }

    #[test]
    fn test_thinkset_keys() {
        assert_eq!(Thinkset::from_key("LassBoss"), Some(Thinkset::LassBoss));
        assert_eq!(Thinkset::from_key("Attacker_p"), Some(Thinkset::Attacker));
        assert_eq!(Thinkset::from_key("nobody"), None);
    }
}
