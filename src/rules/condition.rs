//! Rule conditions over an opponent's kit and the live round.
//!
//! Conditions are data so that rule tables can be loaded from documents.
//! Kit conditions compare base identities (`Mind Shift+` matches
//! `Mind Shift`).

use serde::{Deserialize, Serialize};

use super::engine::Predicate;
use crate::cards::{TrumpHand, TrumpId};
use crate::core::{RoundState, Side};
use crate::opponent::OpponentProfile;

/// What rules are evaluated against.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleContext {
    pub opponent_name: String,
    /// Base identities of every trump the opponent can play.
    pub kit: Vec<TrumpId>,
    /// Opponent total as far as it is known (face-up plus confirmed hidden).
    pub banker_total: Option<u8>,
    pub player_total: Option<u8>,
    pub player_trumps: u8,
    pub banker_trumps: u8,
    /// Trumps the opponent played this round.
    pub banker_items_used: u8,
    /// The player's bet is above its base.
    pub player_bet_up_active: bool,
    pub banker_last_face_up: Option<u8>,
    pub banker_visible_count: u8,
}

impl RuleContext {
    /// Kit-only context, enough for thinkset inference.
    #[must_use]
    pub fn for_profile(profile: &OpponentProfile) -> Self {
        let mut kit: Vec<TrumpId> = profile.all_trumps().map(TrumpId::base).collect();
        kit.sort();
        kit.dedup();
        Self {
            opponent_name: profile.name.clone(),
            kit,
            ..Self::default()
        }
    }

    /// Kit plus everything observable in `round`.
    #[must_use]
    pub fn for_round(profile: &OpponentProfile, round: &RoundState, hand: &TrumpHand) -> Self {
        let visible = round.visible_total(Side::Opponent);
        let banker_total = match round.opponent_hidden().confirmed() {
            Some(hidden) => visible + hidden.get(),
            None => visible,
        };
        let saturate = |n: usize| u8::try_from(n).unwrap_or(u8::MAX);
        Self {
            banker_total: Some(banker_total),
            player_total: Some(round.player_total()),
            player_trumps: saturate(hand.len()),
            banker_trumps: round.opponent_trumps(),
            banker_items_used: round.trumps_played(Side::Opponent),
            player_bet_up_active: round.bet(Side::Player) > round.base_bet(Side::Player),
            banker_last_face_up: round.last_face_up(Side::Opponent).map(|c| c.get()),
            banker_visible_count: saturate(round.face_up(Side::Opponent).len()),
            ..Self::for_profile(profile)
        }
    }

    /// Does the kit hold `base`, or something whose name contains it?
    /// An unknown (empty) kit never blocks.
    #[must_use]
    pub fn kit_has(&self, base: &TrumpId) -> bool {
        self.kit.is_empty()
            || self
                .kit
                .iter()
                .any(|t| t == base || t.contains(base.as_str()))
    }

    fn kit_holds(&self, base: &TrumpId) -> bool {
        self.kit.contains(base)
    }
}

/// A condition a rule can require.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleCondition {
    // === Kit ===
    /// Document-style: loose name match, true for an unknown kit.
    HasTrump(TrumpId),
    /// The kit holds at least one of these base identities.
    KitIncludesAny(Vec<TrumpId>),
    /// The kit is exactly this set of base identities.
    KitIs(Vec<TrumpId>),
    /// Case-insensitive substring of the opponent's name.
    NameContains(String),

    // === Round ===
    /// Opponent total within `[min, max]`; unknown totals never match.
    BankerTotal { min: u8, max: u8 },
    PlayerTotalAtLeast(u8),
    PlayerTrumpsAtLeast(u8),
    LastFaceUp { min: u8, max: u8 },
    PlayerBetUpActive,
    /// The opponent played fewer than this many trumps this round.
    ItemsUsedBelow(u8),
    /// Face-up cards plus the hidden card.
    EnemyHandCountAtLeast(u8),

    // === Combinators ===
    All(Vec<RuleCondition>),
    Any(Vec<RuleCondition>),
    Not(Box<RuleCondition>),
    Always,
    /// Never matches (unknown condition types load as this).
    Never,
}

impl RuleCondition {
    #[must_use]
    pub fn has(name: &str) -> Self {
        Self::HasTrump(TrumpId::new(name).base())
    }

    #[must_use]
    pub fn kit_includes_any(names: &[&str]) -> Self {
        Self::KitIncludesAny(names.iter().map(|n| TrumpId::new(n).base()).collect())
    }

    #[must_use]
    pub fn kit_is(names: &[&str]) -> Self {
        let mut kit: Vec<TrumpId> = names.iter().map(|n| TrumpId::new(n).base()).collect();
        kit.sort();
        kit.dedup();
        Self::KitIs(kit)
    }

    #[must_use]
    pub fn name_contains(needle: &str) -> Self {
        Self::NameContains(needle.to_lowercase())
    }

    #[must_use]
    pub fn all(conditions: impl IntoIterator<Item = RuleCondition>) -> Self {
        Self::All(conditions.into_iter().collect())
    }

    #[must_use]
    pub fn any(conditions: impl IntoIterator<Item = RuleCondition>) -> Self {
        Self::Any(conditions.into_iter().collect())
    }

    #[must_use]
    pub fn negate(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// Add another condition with AND.
    #[must_use]
    pub fn and(self, other: RuleCondition) -> Self {
        match self {
            Self::All(mut conditions) => {
                conditions.push(other);
                Self::All(conditions)
            }
            _ => Self::All(vec![self, other]),
        }
    }

    /// Add another condition with OR.
    #[must_use]
    pub fn or(self, other: RuleCondition) -> Self {
        match self {
            Self::Any(mut conditions) => {
                conditions.push(other);
                Self::Any(conditions)
            }
            _ => Self::Any(vec![self, other]),
        }
    }

    #[must_use]
    pub fn evaluate(&self, ctx: &RuleContext) -> bool {
        match self {
            Self::HasTrump(base) => ctx.kit_has(base),
            Self::KitIncludesAny(bases) => bases.iter().any(|b| ctx.kit_holds(b)),
            Self::KitIs(bases) => !ctx.kit.is_empty() && ctx.kit == *bases,
            Self::NameContains(needle) => ctx.opponent_name.to_lowercase().contains(needle),

            Self::BankerTotal { min, max } => {
                ctx.banker_total.is_some_and(|t| (*min..=*max).contains(&t))
            }
            Self::PlayerTotalAtLeast(n) => ctx.player_total.is_some_and(|t| t >= *n),
            Self::PlayerTrumpsAtLeast(n) => ctx.player_trumps >= *n,
            Self::LastFaceUp { min, max } => ctx
                .banker_last_face_up
                .is_some_and(|c| (*min..=*max).contains(&c)),
            Self::PlayerBetUpActive => ctx.player_bet_up_active,
            Self::ItemsUsedBelow(n) => ctx.banker_items_used < *n,
            Self::EnemyHandCountAtLeast(n) => {
                let visible = ctx.banker_visible_count;
                let hidden = u8::from(visible > 0);
                visible + hidden >= *n
            }

            Self::All(conditions) => conditions.iter().all(|c| c.evaluate(ctx)),
            Self::Any(conditions) => conditions.iter().any(|c| c.evaluate(ctx)),
            Self::Not(inner) => !inner.evaluate(ctx),
            Self::Always => true,
            Self::Never => false,
        }
    }
}

impl Predicate<RuleContext> for RuleCondition {
    fn matches(&self, ctx: &RuleContext) -> bool {
        self.evaluate(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CardValue;

    fn kit_ctx(names: &[&str]) -> RuleContext {
        RuleContext::for_profile(&OpponentProfile::new("Hoffman", 17).with_kit(names.iter().copied()))
    }

    #[test]
    fn test_kit_matches_base_identity() {
        let ctx = kit_ctx(&["Mind Shift+", "Shield"]);
        assert!(RuleCondition::kit_includes_any(&["Mind Shift"]).evaluate(&ctx));
        assert!(!RuleCondition::kit_includes_any(&["Curse"]).evaluate(&ctx));
    }

    #[test]
    fn test_has_is_lenient_for_unknown_kit() {
        let empty = kit_ctx(&[]);
        assert!(RuleCondition::has("Curse").evaluate(&empty));
        assert!(!RuleCondition::kit_includes_any(&["Curse"]).evaluate(&empty));
    }

    #[test]
    fn test_kit_is_exact() {
        assert!(RuleCondition::kit_is(&["Escape"]).evaluate(&kit_ctx(&["Escape"])));
        assert!(!RuleCondition::kit_is(&["Escape"]).evaluate(&kit_ctx(&["Escape", "Shield"])));
    }

    #[test]
    fn test_round_conditions() {
        let c = |v| CardValue::new(v).unwrap();
        let round = RoundState::from_cards(&[c(10), c(6)], &[c(8), c(3)]).unwrap();
        let profile = OpponentProfile::new("Hoffman", 17);
        let ctx = RuleContext::for_round(&profile, &round, &TrumpHand::from_names(["Shield"]));

        assert!(RuleCondition::BankerTotal { min: 11, max: 11 }.evaluate(&ctx));
        assert!(RuleCondition::PlayerTotalAtLeast(16).evaluate(&ctx));
        assert!(RuleCondition::LastFaceUp { min: 1, max: 3 }.evaluate(&ctx));
        assert!(RuleCondition::EnemyHandCountAtLeast(3).evaluate(&ctx));
        assert!(RuleCondition::ItemsUsedBelow(1).evaluate(&ctx));
        assert!(!RuleCondition::PlayerBetUpActive.evaluate(&ctx));
        assert!(!RuleCondition::PlayerTrumpsAtLeast(2).evaluate(&ctx));
    }

    #[test]
    fn test_combinators() {
        let ctx = kit_ctx(&["Curse"]);
        let cond = RuleCondition::kit_includes_any(&["Curse"]).and(RuleCondition::Never);
        assert!(!cond.evaluate(&ctx));
        assert!(cond.clone().or(RuleCondition::Always).evaluate(&ctx));
        assert!(cond.negate().evaluate(&ctx));
    }
}
