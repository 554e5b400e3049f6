//! When is an opponent likely to fire a given trump?
//!
//! Each known trump has a hand-tuned condition over the round's totals and
//! trump counts. The bands come from `TimingThresholds` and the levels map
//! to numbers through `LikelihoodScores`, so both can be swapped without
//! touching this module. Results are hints, never certainties.

use serde::{Deserialize, Serialize};

use crate::cards::TrumpId;
use crate::core::{HeuristicConfig, LikelihoodScores, TimingThresholds};
use crate::rules::RuleContext;

/// Qualitative likelihood, highest first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Likelihood {
    VeryHigh,
    High,
    Medium,
    Low,
    /// The trump cannot fire (e.g. Black Magic exhausted).
    None,
    /// No condition model for this trump.
    Unknown,
}

impl Likelihood {
    #[must_use]
    pub fn score(self, scores: &LikelihoodScores) -> u8 {
        match self {
            Likelihood::VeryHigh => scores.very_high,
            Likelihood::High => scores.high,
            Likelihood::Medium => scores.medium,
            Likelihood::Low => scores.low,
            Likelihood::None | Likelihood::Unknown => scores.none,
        }
    }
}

impl std::fmt::Display for Likelihood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Likelihood::VeryHigh => "VERY HIGH",
            Likelihood::High => "HIGH",
            Likelihood::Medium => "MEDIUM",
            Likelihood::Low => "LOW",
            Likelihood::None => "NONE",
            Likelihood::Unknown => "UNKNOWN",
        };
        f.write_str(label)
    }
}

/// The numbers the timing conditions read.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingView {
    pub banker_total: u8,
    pub player_total: u8,
    pub banker_trumps: u8,
    pub player_trumps: u8,
    pub black_magic_uses: u8,
    /// 1-based round within the fight.
    pub round: u32,
}

impl TimingView {
    #[must_use]
    pub fn new(ctx: &RuleContext, round: u32, black_magic_uses: u8) -> Self {
        Self {
            banker_total: ctx.banker_total.unwrap_or(0),
            player_total: ctx.player_total.unwrap_or(0),
            banker_trumps: ctx.banker_trumps,
            player_trumps: ctx.player_trumps,
            black_magic_uses,
            round: round.max(1),
        }
    }
}

/// A likelihood with the reason behind it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timing {
    pub trump: TrumpId,
    pub level: Likelihood,
    pub score: u8,
    pub reason: String,
}

/// Timing conditions plus the level-to-score table.
#[derive(Clone, Debug, Default)]
pub struct TimingModel {
    thresholds: TimingThresholds,
    scores: LikelihoodScores,
}

impl TimingModel {
    #[must_use]
    pub fn new(config: &HeuristicConfig) -> Self {
        Self {
            thresholds: config.timing.clone(),
            scores: config.scores.clone(),
        }
    }

    #[must_use]
    pub fn scores(&self) -> &LikelihoodScores {
        &self.scores
    }

    /// Score a single trump.
    #[must_use]
    pub fn evaluate(&self, trump: &TrumpId, view: &TimingView) -> Timing {
        let (level, reason) = self.likelihood(trump, view);
        Timing {
            trump: trump.clone(),
            level,
            score: level.score(&self.scores),
            reason,
        }
    }

    /// Highest-scoring trump; earlier trumps win ties.
    pub fn best<'a, I>(&self, trumps: I, view: &TimingView) -> Option<Timing>
    where
        I: IntoIterator<Item = &'a TrumpId>,
    {
        let mut best: Option<Timing> = None;
        for trump in trumps {
            let timing = self.evaluate(trump, view);
            if best.as_ref().map_or(true, |b| timing.score > b.score) {
                best = Some(timing);
            }
        }
        best
    }

    /// Raw level and reason for `trump`.
    #[must_use]
    pub fn likelihood(&self, trump: &TrumpId, view: &TimingView) -> (Likelihood, String) {
        let t = &self.thresholds;
        let TimingView {
            banker_total: bhs,
            player_total: phs,
            banker_trumps: bi,
            player_trumps: pi,
            round,
            ..
        } = *view;
        let upgraded = trump.is_upgraded();

        match trump.base().as_str() {
            "curse" => {
                if bhs <= t.curse_desperate_total {
                    (Likelihood::VeryHigh, format!("banker total is only {bhs}"))
                } else if bhs <= t.curse_behind_total && phs >= t.curse_strong_player {
                    (Likelihood::High, format!("banker at {bhs} against your {phs}"))
                } else {
                    (Likelihood::Low, "banker hand is decent".to_string())
                }
            }
            "black magic" => {
                if view.black_magic_uses >= crate::effects::BLACK_MAGIC_LIMIT {
                    (Likelihood::None, "already used twice this fight".to_string())
                } else if u16::from(bhs) + u16::from(t.black_magic_deficit) < u16::from(phs)
                    && round >= t.black_magic_round
                {
                    (
                        Likelihood::High,
                        format!("banker behind by {} in round {round}", phs - bhs),
                    )
                } else if round >= t.late_round && bhs < t.weak_banker_total {
                    (Likelihood::Medium, "late round with a weak banker hand".to_string())
                } else {
                    (Likelihood::Low, "banker is not desperate yet".to_string())
                }
            }
            "conjure" => {
                if bi <= t.conjure_low_items && round <= t.conjure_early_round {
                    (
                        Likelihood::VeryHigh,
                        format!("banker holds {bi} trumps in round {round}"),
                    )
                } else if bi <= t.conjure_some_items {
                    (Likelihood::Medium, format!("banker holds {bi} trumps"))
                } else {
                    (Likelihood::Low, format!("banker already holds {bi} trumps"))
                }
            }
            "dead silence" => {
                if phs < t.dead_silence_low_total {
                    (Likelihood::VeryHigh, format!("your total is {phs}; drawing is locked next"))
                } else if phs < t.dead_silence_mid_total {
                    (Likelihood::High, format!("at {phs} it stops your improvement"))
                } else {
                    (Likelihood::Medium, "may be played even against a strong hand".to_string())
                }
            }
            "escape" => {
                if bhs < phs {
                    (Likelihood::High, format!("banker at {bhs} against your {phs}"))
                } else if bhs < t.weak_banker_total {
                    (Likelihood::Medium, "banker hand is weak".to_string())
                } else {
                    (Likelihood::Low, "banker hand is decent".to_string())
                }
            }
            "mind shift" => {
                let needed = if upgraded { 3 } else { 2 };
                let level = self.hoard_level(pi, true);
                (level, format!("you hold {pi} trumps; play {needed} this round"))
            }
            "desire" => {
                let raise = if upgraded { pi } else { pi / 2 };
                let level = self.hoard_level(pi, false);
                (level, format!("you hold {pi} trumps; your bet would rise by {raise}"))
            }
            "shield assault" => {
                let shields = if upgraded { 2 } else { 3 };
                (
                    Likelihood::Medium,
                    format!("fires when the banker sacrifices {shields} shields"),
                )
            }
            "happiness" => {
                if bi <= t.happiness_banker_items || pi <= t.happiness_player_items {
                    (
                        Likelihood::High,
                        format!("trump counts are low (banker {bi}, you {pi})"),
                    )
                } else {
                    (Likelihood::Medium, "may be played for tempo".to_string())
                }
            }
            "go for 17" => {
                if bhs == 17 {
                    (Likelihood::VeryHigh, "banker is at 17".to_string())
                } else if bhs >= t.go_for_17_near {
                    (Likelihood::High, "banker is approaching 17".to_string())
                } else {
                    (Likelihood::Low, "banker is not near 17".to_string())
                }
            }
            _ => (Likelihood::Unknown, "no timing model".to_string()),
        }
    }

    /// Mind Shift and Desire read the player's trump hoard; only Mind Shift
    /// has a medium band.
    fn hoard_level(&self, held: u8, with_medium: bool) -> Likelihood {
        let t = &self.thresholds;
        if held >= t.hoard_very_high {
            Likelihood::VeryHigh
        } else if held >= t.hoard_high {
            Likelihood::High
        } else if with_medium && held >= t.hoard_medium {
            Likelihood::Medium
        } else {
            Likelihood::Low
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(bhs: u8, phs: u8) -> TimingView {
        TimingView {
            banker_total: bhs,
            player_total: phs,
            banker_trumps: 3,
            player_trumps: 3,
            black_magic_uses: 0,
            round: 1,
        }
    }

    fn level(name: &str, view: &TimingView) -> Likelihood {
        TimingModel::default().likelihood(&TrumpId::new(name), view).0
    }

    #[test]
    fn test_scores_are_ordinal() {
        let scores = LikelihoodScores::default();
        let ordered = [
            Likelihood::VeryHigh,
            Likelihood::High,
            Likelihood::Medium,
            Likelihood::Low,
            Likelihood::None,
        ];
        for pair in ordered.windows(2) {
            assert!(pair[0].score(&scores) > pair[1].score(&scores));
        }
        assert_eq!(Likelihood::Unknown.score(&scores), 0);
    }

    #[test]
    fn test_curse_bands() {
        assert_eq!(level("Curse", &view(12, 10)), Likelihood::VeryHigh);
        assert_eq!(level("Curse", &view(15, 18)), Likelihood::High);
        assert_eq!(level("Curse", &view(15, 14)), Likelihood::Low);
    }

    #[test]
    fn test_black_magic_exhausted() {
        let mut v = view(10, 20);
        v.round = 3;
        assert_eq!(level("Black Magic", &v), Likelihood::High);

        v.black_magic_uses = 2;
        assert_eq!(level("Black Magic", &v), Likelihood::None);
    }

    #[test]
    fn test_upgraded_variants_share_bands() {
        let mut v = view(15, 15);
        v.player_trumps = 2;
        assert_eq!(level("Mind Shift+", &v), Likelihood::Medium);
        assert_eq!(level("Desire+", &v), Likelihood::Low);

        v.player_trumps = 5;
        assert_eq!(level("Desire", &v), Likelihood::VeryHigh);
    }

    #[test]
    fn test_best_prefers_earlier_on_tie() {
        let model = TimingModel::default();
        let kit = [TrumpId::new("Shield Assault"), TrumpId::new("Escape"), TrumpId::new("Shield")];
        let best = model.best(&kit, &view(18, 17)).unwrap();

        assert_eq!(best.trump, TrumpId::new("Shield Assault"));
        assert_eq!(best.level, Likelihood::Medium);
    }

    #[test]
    fn test_unknown_trump() {
        assert_eq!(level("One-Up", &view(10, 10)), Likelihood::Unknown);
    }
}
