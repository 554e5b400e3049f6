//! Heuristic configuration.
//!
//! Opponent behavior near its stop point and the advisor's thresholds are
//! approximations of values nobody has measured exactly. They live here as
//! one swappable table instead of literals spread across the models:
//!
//! - `DrawTendencies`: banker gray-zone draw percentages
//! - `AdviceThresholds`: recommendation engine cut-offs
//! - `TimingThresholds`: enemy trump timing bands
//! - `LikelihoodScores`: likelihood level to numeric score
//! - `ConfidenceBands`: how rule priority and timing scores map to confidence
//!
//! Every struct is `#[serde(default)]`, so a JSON override may name only
//! the fields it changes. Unknown fields are ignored.

use serde::{Deserialize, Serialize};

/// Banker draw percentages in the gray zone between its take-card border
/// and its hand-good border.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawTendencies {
    /// Passive ("chicken") bankers rarely draw in the gray zone.
    pub passive_pct: u8,
    /// Player's visible total reads as weak.
    pub weak_player_pct: u8,
    /// Player's visible total reads as strong.
    pub strong_player_pct: u8,
    /// Neutral read: percentage at the bottom of the gray zone.
    pub neutral_start_pct: u8,
    /// Neutral read: lowest percentage anywhere in the gray zone.
    pub neutral_floor_pct: u8,
    /// Hand-good border = stay threshold + this, for opponents without a
    /// banker profile.
    pub default_good_margin: u8,
}

impl Default for DrawTendencies {
    fn default() -> Self {
        Self {
            passive_pct: 5,
            weak_player_pct: 15,
            strong_player_pct: 80,
            neutral_start_pct: 65,
            neutral_floor_pct: 10,
            default_good_margin: 2,
        }
    }
}

/// Recommendation engine cut-offs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdviceThresholds {
    /// Cards at or above this weight are saved for boss fights.
    pub reserve_weight: u8,
    /// Stay win percentage at or above which the position is comfortable.
    pub comfortable_win_pct: u8,
    /// HP at or below which shields are recommended.
    pub low_hp: u8,
    /// Minimum win percentage for an intentional-bust play.
    pub min_bust_win_pct: u8,
    /// Weight assumed for trumps missing from the catalog.
    pub default_weight: u8,
}

impl Default for AdviceThresholds {
    fn default() -> Self {
        Self {
            reserve_weight: 60,
            comfortable_win_pct: 55,
            low_hp: 3,
            min_bust_win_pct: 25,
            default_weight: 50,
        }
    }
}

/// Bands used by the enemy trump timing model.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingThresholds {
    /// Banker total at or below which Curse is very likely.
    pub curse_desperate_total: u8,
    /// Banker total at or below which Curse is likely against a strong player.
    pub curse_behind_total: u8,
    /// Player total that counts as strong for Curse.
    pub curse_strong_player: u8,
    /// Points behind the player that trigger Black Magic.
    pub black_magic_deficit: u8,
    /// First round in which Black Magic is likely.
    pub black_magic_round: u32,
    /// Round from which a weak banker hand counts as late-game.
    pub late_round: u32,
    /// Banker total below which its hand counts as weak.
    pub weak_banker_total: u8,
    /// Banker trump count at or below which Conjure restocks early.
    pub conjure_low_items: u8,
    /// Last round counted as early for Conjure.
    pub conjure_early_round: u32,
    /// Banker trump count at or below which Conjure is possible.
    pub conjure_some_items: u8,
    /// Player total below which Dead Silence is very likely.
    pub dead_silence_low_total: u8,
    /// Player total below which Dead Silence is likely.
    pub dead_silence_mid_total: u8,
    /// Player trump counts for the very-high / high / medium bands of
    /// Mind Shift and Desire.
    pub hoard_very_high: u8,
    pub hoard_high: u8,
    pub hoard_medium: u8,
    /// Trump counts that make Happiness likely (banker, player).
    pub happiness_banker_items: u8,
    pub happiness_player_items: u8,
    /// Banker total from which Go for 17 is likely.
    pub go_for_17_near: u8,
}

impl Default for TimingThresholds {
    fn default() -> Self {
        Self {
            curse_desperate_total: 13,
            curse_behind_total: 16,
            curse_strong_player: 17,
            black_magic_deficit: 3,
            black_magic_round: 2,
            late_round: 3,
            weak_banker_total: 16,
            conjure_low_items: 1,
            conjure_early_round: 3,
            conjure_some_items: 3,
            dead_silence_low_total: 16,
            dead_silence_mid_total: 19,
            hoard_very_high: 5,
            hoard_high: 3,
            hoard_medium: 2,
            happiness_banker_items: 2,
            happiness_player_items: 1,
            go_for_17_near: 15,
        }
    }
}

/// Numeric score per likelihood level (ordinal, highest first).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LikelihoodScores {
    pub very_high: u8,
    pub high: u8,
    pub medium: u8,
    pub low: u8,
    pub none: u8,
    /// Score at which a heuristic pick counts as plausible under timing.
    pub plausible_min: u8,
}

impl Default for LikelihoodScores {
    fn default() -> Self {
        Self {
            very_high: 100,
            high: 70,
            medium: 40,
            low: 10,
            none: 0,
            plausible_min: 40,
        }
    }
}

/// Confidence mapping for predictions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceBands {
    /// Rule priority at or below which a rule match is high confidence.
    pub rule_high_priority: u32,
    /// Rule priority at or below which a rule match is medium confidence.
    pub rule_medium_priority: u32,
    /// Timing score at or above which a timing pick is high confidence.
    pub timing_high_score: u8,
    /// Timing score at or above which a timing pick is medium confidence.
    pub timing_medium_score: u8,
}

impl Default for ConfidenceBands {
    fn default() -> Self {
        Self {
            rule_high_priority: 15,
            rule_medium_priority: 40,
            timing_high_score: 90,
            timing_medium_score: 55,
        }
    }
}

/// All heuristic thresholds in one place.
///
/// ## Example
///
/// ```
/// use duel21::core::{AdviceThresholds, HeuristicConfig};
///
/// let config = HeuristicConfig::default().with_advice(AdviceThresholds {
///     reserve_weight: 75,
///     ..AdviceThresholds::default()
/// });
/// assert_eq!(config.advice.reserve_weight, 75);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicConfig {
    pub draw: DrawTendencies,
    pub advice: AdviceThresholds,
    pub timing: TimingThresholds,
    pub scores: LikelihoodScores,
    pub confidence: ConfidenceBands,
}

impl HeuristicConfig {
    /// Parse a (possibly partial) JSON override.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    #[must_use]
    pub fn with_draw(mut self, draw: DrawTendencies) -> Self {
        self.draw = draw;
        self
    }

    #[must_use]
    pub fn with_advice(mut self, advice: AdviceThresholds) -> Self {
        self.advice = advice;
        self
    }

    #[must_use]
    pub fn with_timing(mut self, timing: TimingThresholds) -> Self {
        self.timing = timing;
        self
    }

    #[must_use]
    pub fn with_scores(mut self, scores: LikelihoodScores) -> Self {
        self.scores = scores;
        self
    }

    #[must_use]
    pub fn with_confidence(mut self, confidence: ConfidenceBands) -> Self {
        self.confidence = confidence;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = HeuristicConfig::default();
        assert_eq!(config.draw.passive_pct, 5);
        assert_eq!(config.advice.reserve_weight, 60);
        assert_eq!(config.scores.very_high, 100);
        assert_eq!(config.scores.none, 0);
    }

    #[test]
    fn test_partial_json_override() {
        let raw = r#"{ "draw": { "strong_player_pct": 90 }, "unknown_section": 1 }"#;
        let config = HeuristicConfig::from_json(raw).unwrap();

        assert_eq!(config.draw.strong_player_pct, 90);
        assert_eq!(config.draw.weak_player_pct, 15);
        assert_eq!(config.advice, AdviceThresholds::default());
    }

    #[test]
    fn test_serialization_roundtrip() {
        let config = HeuristicConfig::default().with_scores(LikelihoodScores {
            plausible_min: 70,
            ..LikelihoodScores::default()
        });
        let json = serde_json::to_string(&config).unwrap();
        let back = HeuristicConfig::from_json(&json).unwrap();
        assert_eq!(config, back);
    }
}
