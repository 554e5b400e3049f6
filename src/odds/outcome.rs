//! Comparison rule and outcome distributions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::probability::Probability;
use crate::core::{Action, CardSet, CardValue};

/// Result of comparing two final totals.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Showdown {
    Win,
    Tie,
    Lose,
}

/// Compare final totals from the player's point of view.
///
/// - neither bust: higher total wins
/// - one bust: the other side wins
/// - both bust: the smaller overage wins
///
/// Equal totals tie in every branch.
#[must_use]
pub fn compare(player: u8, opponent: u8, target: u8) -> Showdown {
    let player_bust = player > target;
    let opponent_bust = opponent > target;
    match (player_bust, opponent_bust) {
        (false, true) => Showdown::Win,
        (true, false) => Showdown::Lose,
        // Both on the same side of the target: higher wins when safe,
        // lower (smaller overage) wins when bust.
        (false, false) => rank(player, opponent),
        (true, true) => rank(opponent, player),
    }
}

fn rank(better_if_higher: u8, other: u8) -> Showdown {
    match better_if_higher.cmp(&other) {
        std::cmp::Ordering::Greater => Showdown::Win,
        std::cmp::Ordering::Less => Showdown::Lose,
        std::cmp::Ordering::Equal => Showdown::Tie,
    }
}

/// Whether a distribution is exact under the model or rests on heuristic
/// draw percentages.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Certainty {
    #[default]
    Exact,
    /// Contains a gray-zone opponent decision.
    Estimate,
}

impl Certainty {
    /// The weaker of two certainties.
    #[must_use]
    pub fn combine(self, other: Certainty) -> Certainty {
        self.max(other)
    }
}

/// Probability distribution over the opponent's final total.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalDistribution {
    masses: BTreeMap<u8, Probability>,
    certainty: Certainty,
}

impl TotalDistribution {
    /// All mass on one total.
    #[must_use]
    pub fn point(total: u8) -> Self {
        let mut masses = BTreeMap::new();
        masses.insert(total, Probability::ONE);
        Self {
            masses,
            certainty: Certainty::Exact,
        }
    }

    /// Add `p` to `total`.
    pub fn add(&mut self, total: u8, p: Probability) {
        if p.is_zero() {
            return;
        }
        *self.masses.entry(total).or_default() += p;
    }

    /// Add `other` scaled by `weight`.
    pub fn merge_scaled(&mut self, other: &TotalDistribution, weight: Probability) {
        for (&total, &p) in &other.masses {
            self.add(total, p * weight);
        }
        self.certainty = self.certainty.combine(other.certainty);
    }

    pub fn mark_estimate(&mut self) {
        self.certainty = Certainty::Estimate;
    }

    #[must_use]
    pub fn certainty(&self) -> Certainty {
        self.certainty
    }

    /// Probability of finishing on `total`.
    #[must_use]
    pub fn probability_of(&self, total: u8) -> Probability {
        self.masses.get(&total).copied().unwrap_or_default()
    }

    /// (total, probability) pairs, ascending by total.
    pub fn iter(&self) -> impl Iterator<Item = (u8, Probability)> + '_ {
        self.masses.iter().map(|(&t, &p)| (t, p))
    }

    #[must_use]
    pub fn total_mass(&self) -> Probability {
        self.masses.values().copied().sum()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.masses.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.masses.is_empty()
    }

    /// A single total with probability 1.
    #[must_use]
    pub fn is_point_mass(&self) -> bool {
        self.masses.len() == 1
    }

    /// Probability the opponent finishes above `target`.
    #[must_use]
    pub fn bust_probability(&self, target: u8) -> Probability {
        self.iter().filter(|(t, _)| *t > target).map(|(_, p)| p).sum()
    }
}

/// Win / tie / lose probabilities.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub win: Probability,
    pub tie: Probability,
    pub lose: Probability,
}

impl Outcome {
    /// Convolve a fixed player total against an opponent distribution.
    #[must_use]
    pub fn against(player_total: u8, opponent: &TotalDistribution, target: u8) -> Self {
        let mut outcome = Outcome::default();
        for (total, p) in opponent.iter() {
            outcome.add(compare(player_total, total, target), p);
        }
        outcome
    }

    pub fn add(&mut self, showdown: Showdown, p: Probability) {
        match showdown {
            Showdown::Win => self.win += p,
            Showdown::Tie => self.tie += p,
            Showdown::Lose => self.lose += p,
        }
    }

    /// Add `other` scaled by `weight`.
    pub fn merge_scaled(&mut self, other: &Outcome, weight: Probability) {
        self.win += other.win * weight;
        self.tie += other.tie * weight;
        self.lose += other.lose * weight;
    }

    #[must_use]
    pub fn total(&self) -> Probability {
        self.win + self.tie + self.lose
    }
}

/// The outcome distribution of one action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionOdds {
    pub action: Action,
    pub outcome: Outcome,
    pub certainty: Certainty,
}

/// Safe / bust / perfect partition of the remaining deck for one draw.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawOdds {
    /// Cards that keep the player at or under the target.
    pub safe_cards: CardSet,
    /// Cards that push the player over the target.
    pub bust_cards: CardSet,
    /// Cards that land exactly on the target (a subset of `safe_cards`).
    pub perfect_cards: CardSet,
    pub safe: Probability,
    pub bust: Probability,
    pub perfect: Probability,
}

/// One way of busting on purpose.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BustPath {
    pub card: CardValue,
    pub total: u8,
    pub overage: u8,
    pub outcome: Outcome,
    pub certainty: Certainty,
}
