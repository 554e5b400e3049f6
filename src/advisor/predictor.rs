//! Opponent archetype inference and next-trump prediction.
//!
//! Two signals feed a prediction:
//! - a heuristic pick: the first matching rule in the opponent thinkset's
//!   play table (built in, or loaded from a document)
//! - a timing pick: the opponent trump with the highest timing score
//!
//! The heuristic pick wins, with confidence raised one level, when the
//! timing model also finds it plausible. Otherwise the timing pick is
//! reported and the heuristic pick rides along as a secondary note.
//! Everything here is approximate.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::timing::{Timing, TimingModel, TimingView};
use crate::cards::{TrumpHand, TrumpId};
use crate::core::{ConfidenceBands, GauntletContext, HeuristicConfig, RoundState};
use crate::opponent::{OpponentProfile, Thinkset};
use crate::rules::{PlayRules, Rule, RuleCondition, RuleContext, RuleList, RuleTable};

/// How much a prediction should be trusted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    /// One level up, saturating at `High`.
    #[must_use]
    pub fn boosted(self) -> Self {
        match self {
            Confidence::Low => Confidence::Medium,
            Confidence::Medium | Confidence::High => Confidence::High,
        }
    }

    fn for_priority(priority: u32, bands: &ConfidenceBands) -> Self {
        if priority <= bands.rule_high_priority {
            Confidence::High
        } else if priority <= bands.rule_medium_priority {
            Confidence::Medium
        } else {
            Confidence::Low
        }
    }

    fn for_score(score: u8, bands: &ConfidenceBands) -> Self {
        if score >= bands.timing_high_score {
            Confidence::High
        } else if score >= bands.timing_medium_score {
            Confidence::Medium
        } else {
            Confidence::Low
        }
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Confidence::Low => "LOW",
            Confidence::Medium => "MEDIUM",
            Confidence::High => "HIGH",
        };
        f.write_str(label)
    }
}

/// The opponent's most likely next trump.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prediction {
    pub trump: TrumpId,
    pub thinkset: Thinkset,
    pub confidence: Confidence,
    pub reason: String,
    /// The heuristic pick when the timing pick overruled it.
    pub secondary: Option<String>,
}

/// Signature-card rules, first match wins. Unmatched kits are `Attacker`.
#[must_use]
pub fn thinkset_rules() -> RuleList<RuleCondition, Thinkset> {
    [
        Rule::new(
            "final-boss",
            10,
            RuleCondition::kit_includes_any(&["Dead Silence", "Oblivion"])
                .or(RuleCondition::name_contains("Undead")),
            Thinkset::LassBoss,
        ),
        Rule::new(
            "escape-only",
            20,
            RuleCondition::kit_is(&["Escape"]).or(RuleCondition::all([
                RuleCondition::name_contains("Big Head"),
                RuleCondition::kit_includes_any(&["Escape"]),
            ])),
            Thinkset::Rare,
        ),
        Rule::new(
            "molded",
            30,
            RuleCondition::kit_includes_any(&["Curse", "Black Magic", "Conjure"])
                .or(RuleCondition::name_contains("Molded")),
            Thinkset::Molded,
        ),
        Rule::new(
            "shield-assault",
            40,
            RuleCondition::kit_includes_any(&["Shield Assault"]),
            Thinkset::Defence,
        ),
        Rule::new(
            "hand-attacks",
            50,
            RuleCondition::kit_includes_any(&["Mind Shift", "Desire", "Happiness"]),
            Thinkset::Tricky,
        ),
    ]
    .into_iter()
    .collect()
}

/// Archetype for `profile`'s kit.
#[must_use]
pub fn infer_thinkset(profile: &OpponentProfile) -> Thinkset {
    let ctx = RuleContext::for_profile(profile);
    let rules = thinkset_rules();
    let (thinkset, rule) = match rules.first_match(&ctx) {
        Some(rule) => (rule.then, rule.id.as_str()),
        None => (Thinkset::Attacker, "baseline"),
    };
    info!(opponent = %profile.name, %thinkset, rule, "thinkset inferred");
    thinkset
}

/// Play table used when no document is loaded.
#[must_use]
pub fn builtin_table() -> RuleTable {
    let play = |id: &str, priority, trump: &str, when: RuleCondition| {
        Rule::new(id, priority, RuleCondition::has(trump).and(when), TrumpId::new(trump))
    };
    let banker = |min, max| RuleCondition::BankerTotal { min, max };

    let mut table = RuleTable::new();
    let tables: [(Thinkset, PlayRules); 6] = [
        (
            Thinkset::LassBoss,
            [
                play("silence-weak-player", 10, "Dead Silence", RuleCondition::PlayerTotalAtLeast(16).negate()),
                play("oblivion-behind", 20, "Oblivion", banker(0, 14).and(RuleCondition::PlayerTotalAtLeast(18))),
                play("perfect-draw", 30, "Perfect Draw+", banker(0, 16)),
                play("bet-up", 60, "Two-Up+", RuleCondition::ItemsUsedBelow(1)),
            ]
            .into_iter()
            .collect(),
        ),
        (
            Thinkset::Rare,
            [play("escape-behind", 10, "Escape", banker(0, 16))].into_iter().collect(),
        ),
        (
            Thinkset::Molded,
            [
                play("curse-low", 10, "Curse", banker(0, 13)),
                play("black-magic-behind", 20, "Black Magic", RuleCondition::PlayerTotalAtLeast(19).and(banker(0, 15))),
                play("wipe-bets", 30, "Destroy+", RuleCondition::PlayerBetUpActive),
                play("conjure-restock", 40, "Conjure", RuleCondition::ItemsUsedBelow(1)),
            ]
            .into_iter()
            .collect(),
        ),
        (
            Thinkset::Defence,
            [
                play("assault-bet-up", 10, "Shield Assault", RuleCondition::PlayerBetUpActive),
                play("go-for-17", 20, "Go for 17", banker(15, 17)),
                play("shield", 50, "Shield", RuleCondition::PlayerTotalAtLeast(19)),
            ]
            .into_iter()
            .collect(),
        ),
        (
            Thinkset::Tricky,
            [
                play("mind-shift-hoard", 10, "Mind Shift", RuleCondition::PlayerTrumpsAtLeast(3)),
                play("desire-hoard", 15, "Desire", RuleCondition::PlayerTrumpsAtLeast(3)),
                play("happiness", 45, "Happiness", RuleCondition::ItemsUsedBelow(1)),
            ]
            .into_iter()
            .collect(),
        ),
        (
            Thinkset::Attacker,
            [
                play("go-for-17", 10, "Go for 17", banker(15, 17)),
                play("bet-up-strong", 30, "Two-Up", banker(18, 21)),
                play("bet-up", 50, "One-Up", RuleCondition::ItemsUsedBelow(1)),
            ]
            .into_iter()
            .collect(),
        ),
    ];
    for (thinkset, rules) in tables {
        table.insert(thinkset, rules);
    }
    table
}

/// Predicts an opponent's next trump.
#[derive(Clone, Debug)]
pub struct HoffmanPredictor {
    table: RuleTable,
    timing: TimingModel,
    bands: ConfidenceBands,
}

impl Default for HoffmanPredictor {
    fn default() -> Self {
        Self::new(&HeuristicConfig::default())
    }
}

impl HoffmanPredictor {
    /// Predictor over the built-in play table.
    #[must_use]
    pub fn new(config: &HeuristicConfig) -> Self {
        Self {
            table: builtin_table(),
            timing: TimingModel::new(config),
            bands: config.confidence.clone(),
        }
    }

    /// Use a loaded play table. Thinksets the document leaves out keep
    /// their built-in rules.
    #[must_use]
    pub fn with_table(mut self, table: &RuleTable) -> Self {
        for thinkset in Thinkset::ALL {
            if let Some(rules) = table.rules_for(thinkset) {
                self.table.insert(thinkset, rules.clone());
            }
        }
        self
    }

    #[must_use]
    pub fn timing(&self) -> &TimingModel {
        &self.timing
    }

    /// Predict from a live round.
    #[must_use]
    pub fn predict_round(
        &self,
        profile: &OpponentProfile,
        round: &RoundState,
        hand: &TrumpHand,
        gauntlet: &GauntletContext,
    ) -> Option<Prediction> {
        let ctx = RuleContext::for_round(profile, round, hand);
        let view = TimingView::new(&ctx, gauntlet.round, round.black_magic_uses());
        self.predict(profile, &ctx, &view)
    }

    /// Predict from an explicit context.
    #[must_use]
    pub fn predict(
        &self,
        profile: &OpponentProfile,
        ctx: &RuleContext,
        view: &TimingView,
    ) -> Option<Prediction> {
        let thinkset = infer_thinkset(profile);
        let heuristic = self.table.first_match(thinkset, ctx);
        let kit: Vec<TrumpId> = profile.all_trumps().cloned().collect();
        let timed = self.timing.best(&kit, view).filter(|t| t.score > self.timing.scores().none);

        let prediction = match (heuristic, timed) {
            (Some(rule), timed) => {
                let support = self.timing.evaluate(&rule.then, view);
                let confidence = Confidence::for_priority(rule.priority, &self.bands);
                let rule_reason = format!("[{thinkset}] rule '{}' (priority {})", rule.id, rule.priority);

                if support.score >= self.timing.scores().plausible_min {
                    Prediction {
                        trump: rule.then.clone(),
                        thinkset,
                        confidence: confidence.boosted(),
                        reason: format!("{rule_reason}; timing {}: {}", support.level, support.reason),
                        secondary: None,
                    }
                } else if let Some(timed) = timed {
                    self.from_timing(thinkset, timed, Some(format!("{} by {rule_reason}", rule.then)))
                } else {
                    Prediction {
                        trump: rule.then.clone(),
                        thinkset,
                        confidence,
                        reason: rule_reason,
                        secondary: None,
                    }
                }
            }
            (None, Some(timed)) => self.from_timing(thinkset, timed, None),
            (None, None) => return None,
        };
        debug!(
            trump = %prediction.trump,
            confidence = %prediction.confidence,
            secondary = prediction.secondary.is_some(),
            "opponent trump predicted"
        );
        Some(prediction)
    }

    fn from_timing(&self, thinkset: Thinkset, timed: Timing, secondary: Option<String>) -> Prediction {
        Prediction {
            confidence: Confidence::for_score(timed.score, &self.bands),
            reason: format!("{} [{}]: {}", timed.trump, timed.level, timed.reason),
            trump: timed.trump,
            thinkset,
            secondary,
        }
    }
}
