//! Opponent final-total distribution.
//!
//! The model turns what the player can see (face-up cards, the hidden-card
//! status, the cards still unaccounted for) plus the declared stance into an
//! exact distribution over the opponent's final total:
//!
//! 1. The hidden card is drawn first: a confirmed value is used directly,
//!    otherwise it is uniform over its candidates within the deck.
//! 2. The stance decides what follows: `Stayed` stops, `ForcedDraw` takes
//!    one card, `Drawing` follows the banker's draw chances recursively.
//!
//! Gray-zone draw chances are heuristics, so any distribution that passes
//! through one is marked `Certainty::Estimate`.

use rustc_hash::FxHashMap;
use tracing::debug;

use super::profile::{BankerProfile, DrawChance, OpponentProfile};
use crate::core::{
    CardSet, DrawTendencies, HeuristicConfig, HiddenCard, OpponentStance, RoundState, Side,
};
use crate::odds::{Probability, TotalDistribution};

/// Everything the model needs to know about the opponent's position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OpponentView {
    /// Sum of the opponent's face-up cards.
    pub visible_total: u8,
    pub hidden: HiddenCard,
    /// Cards that could still reach the opponent (hidden card included
    /// unless confirmed).
    pub deck: CardSet,
    pub stance: OpponentStance,
    pub target: u8,
    /// The player's face-up total, as the banker reads it.
    pub player_visible: u8,
}

impl OpponentView {
    /// The view implied by a round.
    #[must_use]
    pub fn of_round(round: &RoundState) -> Self {
        Self {
            visible_total: round.visible_total(Side::Opponent),
            hidden: round.opponent_hidden(),
            deck: round.remaining(),
            stance: round.stance(),
            target: round.target(),
            player_visible: round.visible_total(Side::Player),
        }
    }
}

type Memo = FxHashMap<(u8, u16), TotalDistribution>;

/// Probabilistic opponent model.
#[derive(Clone, Debug)]
pub struct OpponentModel {
    profile: OpponentProfile,
    banker: BankerProfile,
    tendencies: DrawTendencies,
}

impl OpponentModel {
    #[must_use]
    pub fn new(profile: OpponentProfile, config: &HeuristicConfig) -> Self {
        let banker = profile.banker_or_generic(&config.draw);
        Self {
            profile,
            banker,
            tendencies: config.draw.clone(),
        }
    }

    #[must_use]
    pub fn profile(&self) -> &OpponentProfile {
        &self.profile
    }

    #[must_use]
    pub fn banker(&self) -> &BankerProfile {
        &self.banker
    }

    /// Stay threshold after the target shift.
    #[must_use]
    pub fn adjusted_stay_threshold(&self, target: u8) -> u8 {
        self.profile.adjusted_stay_threshold(target)
    }

    /// Final-total distribution for the opponent in `round`.
    #[must_use]
    pub fn for_round(&self, round: &RoundState) -> TotalDistribution {
        self.distribution(&OpponentView::of_round(round))
    }

    /// Final-total distribution for an explicit view.
    #[must_use]
    pub fn distribution(&self, view: &OpponentView) -> TotalDistribution {
        let mut memo = Memo::default();
        let dist = match view.hidden {
            HiddenCard::Confirmed(card) => {
                let deck = view.deck.without(card);
                self.continue_from(view.visible_total + card.get(), deck, view, &mut memo)
            }
            hidden => {
                let candidates = hidden.candidates(view.deck);
                if candidates.is_empty() {
                    // Nothing left that could be the hidden card.
                    let mut dist = TotalDistribution::point(view.visible_total);
                    dist.mark_estimate();
                    dist
                } else {
                    let weight = Probability::uniform(candidates.len());
                    let mut dist = TotalDistribution::default();
                    for card in candidates.iter() {
                        let sub = self.continue_from(
                            view.visible_total + card.get(),
                            view.deck.without(card),
                            view,
                            &mut memo,
                        );
                        dist.merge_scaled(&sub, weight);
                    }
                    dist
                }
            }
        };
        debug!(
            visible = view.visible_total,
            target = view.target,
            stance = ?view.stance,
            outcomes = dist.len(),
            certainty = ?dist.certainty(),
            "opponent distribution"
        );
        dist
    }

    fn continue_from(
        &self,
        total: u8,
        deck: CardSet,
        view: &OpponentView,
        memo: &mut Memo,
    ) -> TotalDistribution {
        match view.stance {
            OpponentStance::Stayed => TotalDistribution::point(total),
            OpponentStance::ForcedDraw => {
                if total > view.target || deck.is_empty() {
                    return TotalDistribution::point(total);
                }
                let weight = Probability::uniform(deck.len());
                let mut dist = TotalDistribution::default();
                for card in deck.iter() {
                    dist.add(total + card.get(), weight);
                }
                dist
            }
            OpponentStance::Drawing => self.drawing(total, deck, view, memo),
        }
    }

    fn drawing(
        &self,
        total: u8,
        deck: CardSet,
        view: &OpponentView,
        memo: &mut Memo,
    ) -> TotalDistribution {
        let key = (total, deck.bits());
        if let Some(hit) = memo.get(&key) {
            return hit.clone();
        }
        if total > view.target || deck.is_empty() {
            return TotalDistribution::point(total);
        }

        let chance =
            self.banker
                .draw_chance(total, view.player_visible, view.target, &self.tendencies);
        let (draw_weight, estimate) = match chance {
            DrawChance::Never => (Probability::ZERO, false),
            DrawChance::Always => (Probability::ONE, false),
            DrawChance::Percent(pct) => (Probability::percent(pct), true),
        };

        let mut dist = TotalDistribution::default();
        dist.add(total, draw_weight.complement());
        if !draw_weight.is_zero() {
            let per_card = draw_weight * Probability::uniform(deck.len());
            for card in deck.iter() {
                let sub = self.drawing(total + card.get(), deck.without(card), view, memo);
                dist.merge_scaled(&sub, per_card);
            }
        }
        if estimate {
            dist.mark_estimate();
        }

        memo.insert(key, dist.clone());
        dist
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CardValue;
    use crate::odds::Certainty;

    fn card(v: u8) -> CardValue {
        CardValue::new(v).unwrap()
    }

    fn set(values: &[u8]) -> CardSet {
        values.iter().map(|&v| card(v)).collect()
    }

    fn model() -> OpponentModel {
        let profile = OpponentProfile::new("Lucas", 17).with_banker(BankerProfile::new(17, 19, false));
        OpponentModel::new(profile, &HeuristicConfig::default())
    }

    fn view(stance: OpponentStance, hidden: HiddenCard, deck: CardSet) -> OpponentView {
        OpponentView {
            visible_total: 8,
            hidden,
            deck,
            stance,
            target: 21,
            player_visible: 6,
        }
    }

    #[test]
    fn test_stayed_is_uniform_over_remaining() {
        let deck = set(&[1, 2, 3, 4, 5, 7, 9, 11]);
        let dist = model().distribution(&view(OpponentStance::Stayed, HiddenCard::Unknown, deck));

        assert_eq!(dist.len(), 8);
        assert_eq!(dist.probability_of(13), Probability::uniform(8));
        assert!(dist.total_mass().is_one());
        assert_eq!(dist.certainty(), Certainty::Exact);
    }

    #[test]
    fn test_confirmed_stayed_is_point_mass() {
        let deck = set(&[1, 2, 3]);
        let dist = model().distribution(&view(
            OpponentStance::Stayed,
            HiddenCard::Confirmed(card(10)),
            deck,
        ));
        assert!(dist.is_point_mass());
        assert_eq!(dist.probability_of(18), Probability::ONE);
    }

    #[test]
    fn test_forced_draw_takes_one_card() {
        let deck = set(&[1, 2]);
        let dist = model().distribution(&view(
            OpponentStance::ForcedDraw,
            HiddenCard::Confirmed(card(9)),
            deck,
        ));
        assert_eq!(dist.probability_of(18), Probability::uniform(2));
        assert_eq!(dist.probability_of(19), Probability::uniform(2));
    }

    #[test]
    fn test_drawing_sums_to_one_and_flags_estimate() {
        let deck = set(&[1, 2, 3, 4, 5, 7, 9, 11]);
        let dist = model().distribution(&view(OpponentStance::Drawing, HiddenCard::Unknown, deck));

        assert!(dist.total_mass().is_one());
        assert_eq!(dist.certainty(), Certainty::Estimate);
        // Lucas never stops below 17 and the deck cannot run out first.
        assert!(dist.iter().all(|(total, _)| total >= 17));
    }

    #[test]
    fn test_at_good_border_is_exact() {
        // 8 + 11 = 19 is Lucas's hand-good border: a certain stay.
        let dist = model().distribution(&view(
            OpponentStance::Drawing,
            HiddenCard::Confirmed(card(11)),
            set(&[1, 2]),
        ));
        assert!(dist.is_point_mass());
        assert_eq!(dist.certainty(), Certainty::Exact);
    }

    #[test]
    fn test_target_shift_moves_threshold() {
        assert_eq!(model().adjusted_stay_threshold(24), 20);
    }
}
