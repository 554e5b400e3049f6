//! The odds engine: outcome distributions per action.
//!
//! All draws are uniform over the remaining deck as the player sees it.
//! For a draw of card `c` the opponent is evaluated on the deck without
//! `c`, reading a player face-up total that now includes `c`.

use tracing::debug;

use super::outcome::{compare, ActionOdds, BustPath, Certainty, DrawOdds, Outcome, Showdown};
use super::probability::Probability;
use crate::core::{Action, CardSet, CardValue, InputError, RoundState, Side};
use crate::opponent::{OpponentModel, OpponentView};

/// Exact outcome probabilities for each candidate action.
#[derive(Clone, Debug)]
pub struct OddsEngine {
    model: OpponentModel,
}

impl OddsEngine {
    #[must_use]
    pub fn new(model: OpponentModel) -> Self {
        Self { model }
    }

    #[must_use]
    pub fn model(&self) -> &OpponentModel {
        &self.model
    }

    /// Cards still drawable from the player's point of view.
    #[must_use]
    pub fn remaining(round: &RoundState) -> CardSet {
        round.remaining()
    }

    /// Safe / bust / perfect partition of the next player draw.
    ///
    /// ```
    /// use duel21::core::{CardValue, RoundState};
    /// use duel21::odds::{OddsEngine, Probability};
    ///
    /// let c = |v| CardValue::new(v).unwrap();
    /// let round = RoundState::from_cards(&[c(10), c(6)], &[c(8)]).unwrap();
    /// let odds = OddsEngine::draw_odds(&round);
    ///
    /// assert!(odds.perfect_cards.contains(c(5)));
    /// assert!(odds.bust_cards.contains(c(9)));
    /// assert_eq!(odds.safe, Probability::new(5, 8));
    /// ```
    #[must_use]
    pub fn draw_odds(round: &RoundState) -> DrawOdds {
        let remaining = round.remaining();
        let total = round.player_total();
        let target = round.target();

        let mut odds = DrawOdds::default();
        for card in remaining.iter() {
            let next = total + card.get();
            if next > target {
                odds.bust_cards.insert(card);
            } else {
                odds.safe_cards.insert(card);
                if next == target {
                    odds.perfect_cards.insert(card);
                }
            }
        }
        let n = remaining.len() as u128;
        odds.safe = Probability::new(odds.safe_cards.len() as u128, n);
        odds.bust = Probability::new(odds.bust_cards.len() as u128, n);
        odds.perfect = Probability::new(odds.perfect_cards.len() as u128, n);
        odds
    }

    /// Cards that would bust the player.
    #[must_use]
    pub fn bust_cards(round: &RoundState) -> CardSet {
        Self::draw_odds(round).bust_cards
    }

    /// Actions the player may take right now.
    #[must_use]
    pub fn legal_actions(&self, round: &RoundState) -> Vec<Action> {
        Action::ALL
            .into_iter()
            .filter(|&a| self.check_legal(a, round).is_ok())
            .collect()
    }

    fn check_legal(&self, action: Action, round: &RoundState) -> Result<(), InputError> {
        if round.is_over() {
            return Err(InputError::RoundOver);
        }
        let unavailable = |reason| InputError::ActionUnavailable { action, reason };
        match action {
            Action::Stay => Ok(()),
            Action::IntentionalBust if round.player_total() > round.target() => Ok(()),
            Action::Hit | Action::ForceDraw | Action::IntentionalBust => {
                if round.draws_locked(Side::Player) {
                    return Err(unavailable("player draws are locked"));
                }
                if round.remaining().is_empty() {
                    return Err(unavailable("the deck is empty"));
                }
                if action == Action::IntentionalBust && Self::bust_cards(round).is_empty() {
                    return Err(unavailable("no remaining card busts the player"));
                }
                Ok(())
            }
        }
    }

    /// Distribution over the opponent's final total if the player stays now.
    #[must_use]
    pub fn opponent_distribution(&self, round: &RoundState) -> super::TotalDistribution {
        self.model.for_round(round)
    }

    /// Win / tie / lose probabilities of `action`.
    pub fn distribution_for_action(
        &self,
        action: Action,
        round: &RoundState,
    ) -> Result<ActionOdds, InputError> {
        self.check_legal(action, round)?;
        let target = round.target();

        let (outcome, certainty) = match action {
            Action::Stay => self.stay(round),
            Action::IntentionalBust if round.player_total() > target => self.stay(round),
            Action::Hit | Action::ForceDraw => self.draw_over(round, round.remaining()),
            Action::IntentionalBust => self.draw_over(round, Self::bust_cards(round)),
        };

        debug!(
            %action,
            win = outcome.win.to_f64(),
            tie = outcome.tie.to_f64(),
            lose = outcome.lose.to_f64(),
            ?certainty,
            "action distribution"
        );
        Ok(ActionOdds {
            action,
            outcome,
            certainty,
        })
    }

    /// Distributions for every legal action.
    #[must_use]
    pub fn evaluate_all(&self, round: &RoundState) -> Vec<ActionOdds> {
        Action::ALL
            .into_iter()
            .filter_map(|a| self.distribution_for_action(a, round).ok())
            .collect()
    }

    /// Every way of busting on purpose, best first (highest win chance,
    /// then smallest overage).
    #[must_use]
    pub fn bust_paths(&self, round: &RoundState) -> Vec<BustPath> {
        if round.is_over() || round.draws_locked(Side::Player) {
            return Vec::new();
        }
        let target = round.target();
        let mut paths: Vec<BustPath> = Self::bust_cards(round)
            .iter()
            .map(|card| {
                let (outcome, certainty) = self.after_draw(round, card);
                let total = round.player_total() + card.get();
                BustPath {
                    card,
                    total,
                    overage: total - target,
                    outcome,
                    certainty,
                }
            })
            .collect();
        paths.sort_by(|a, b| {
            b.outcome
                .win
                .cmp(&a.outcome.win)
                .then(a.overage.cmp(&b.overage))
        });
        paths
    }

    fn stay(&self, round: &RoundState) -> (Outcome, Certainty) {
        let dist = self.model.for_round(round);
        let outcome = Self::settle(round, round.player_total(), &dist);
        (outcome, dist.certainty())
    }

    /// Uniform draw restricted to `cards` (a subset of the remaining deck).
    fn draw_over(&self, round: &RoundState, cards: CardSet) -> (Outcome, Certainty) {
        let weight = Probability::uniform(cards.len());
        let mut outcome = Outcome::default();
        let mut certainty = Certainty::Exact;
        for card in cards.iter() {
            let (sub, sub_certainty) = self.after_draw(round, card);
            outcome.merge_scaled(&sub, weight);
            certainty = certainty.combine(sub_certainty);
        }
        (outcome, certainty)
    }

    /// Outcome once the player has drawn `card` and stays.
    fn after_draw(&self, round: &RoundState, card: CardValue) -> (Outcome, Certainty) {
        let mut view = OpponentView::of_round(round);
        view.deck = view.deck.without(card);
        view.player_visible += card.get();

        let dist = self.model.distribution(&view);
        let total = round.player_total() + card.get();
        (Self::settle(round, total, &dist), dist.certainty())
    }

    /// Showdown of `player_total` against `opponent`, honouring Twenty-One Up:
    /// a side held to the exact target loses unless it lands on it.
    fn settle(round: &RoundState, player_total: u8, opponent: &super::TotalDistribution) -> Outcome {
        let target = round.target();
        let player_exact = round.exact_target_required(Side::Player);
        let opponent_exact = round.exact_target_required(Side::Opponent);
        if !player_exact && !opponent_exact {
            return Outcome::against(player_total, opponent, target);
        }
        let player_off = player_exact && player_total != target;
        let mut outcome = Outcome::default();
        for (total, p) in opponent.iter() {
            let opponent_off = opponent_exact && total != target;
            let showdown = match (player_off, opponent_off) {
                (true, false) => Showdown::Lose,
                (false, true) => Showdown::Win,
                _ => compare(player_total, total, target),
            };
            outcome.add(showdown, p);
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{TrumpHand, TrumpId};
    use crate::core::{HeuristicConfig, OpponentStance, TableEntry, TableMark};
    use crate::effects::{TrumpEffectProcessor, TrumpPlay};
    use crate::opponent::OpponentProfile;

    fn card(v: u8) -> CardValue {
        CardValue::new(v).unwrap()
    }

    fn engine() -> OddsEngine {
        let model = OpponentModel::new(OpponentProfile::new("Lucas", 17), &HeuristicConfig::default());
        OddsEngine::new(model)
    }

    fn example_round() -> RoundState {
        RoundState::from_cards(&[card(10), card(6)], &[card(8)]).unwrap()
    }

    #[test]
    fn test_draw_odds_example() {
        let odds = OddsEngine::draw_odds(&example_round());
        let bust: CardSet = [7, 9, 11].into_iter().map(card).collect();

        assert_eq!(odds.bust_cards, bust);
        assert_eq!(odds.perfect_cards, CardSet::single(card(5)));
        assert_eq!(odds.safe + odds.bust, Probability::ONE);
        assert_eq!(odds.perfect, Probability::uniform(8));
    }

    #[test]
    fn test_every_action_sums_to_one() {
        let round = example_round();
        let engine = engine();
        for odds in engine.evaluate_all(&round) {
            assert!(odds.outcome.total().is_one(), "{} does not sum to 1", odds.action);
        }
    }

    #[test]
    fn test_stay_against_stayed_opponent() {
        let round = example_round().with_stance(OpponentStance::Stayed);
        let odds = engine().distribution_for_action(Action::Stay, &round).unwrap();

        // Opponent finishes on 8 + hidden: 16 beats 9..=15 and loses to 17 and 19.
        assert_eq!(odds.outcome.win, Probability::new(3, 4));
        assert_eq!(odds.outcome.lose, Probability::new(1, 4));
        assert!(odds.outcome.tie.is_zero());
        assert_eq!(odds.certainty, Certainty::Exact);
    }

    #[test]
    fn test_hit_and_force_draw_share_math() {
        let round = example_round();
        let engine = engine();
        let hit = engine.distribution_for_action(Action::Hit, &round).unwrap();
        let forced = engine.distribution_for_action(Action::ForceDraw, &round).unwrap();
        assert_eq!(hit.outcome, forced.outcome);
    }

    #[test]
    fn test_locked_draws_remove_drawing_actions() {
        let mut round = example_round();
        round.table_mut().push_back(
            TableEntry::new(TrumpId::new("Dead Silence"), Side::Opponent)
                .with_mark(TableMark::LockDraws),
        );
        let engine = engine();

        assert_eq!(engine.legal_actions(&round), vec![Action::Stay]);
        assert!(matches!(
            engine.distribution_for_action(Action::Hit, &round),
            Err(InputError::ActionUnavailable { .. })
        ));
        assert!(engine.bust_paths(&round).is_empty());
    }

    #[test]
    fn test_intentional_bust_when_already_bust_equals_stay() {
        let round = RoundState::from_cards(&[card(10), card(9), card(4)], &[card(8)])
            .unwrap()
            .with_stance(OpponentStance::Stayed);
        let engine = engine();
        let stay = engine.distribution_for_action(Action::Stay, &round).unwrap();
        let bust = engine
            .distribution_for_action(Action::IntentionalBust, &round)
            .unwrap();
        assert_eq!(stay.outcome, bust.outcome);
    }

    #[test]
    fn test_intentional_bust_unavailable_without_bust_cards() {
        let round = RoundState::from_cards(&[card(2)], &[card(3)]).unwrap();
        assert!(matches!(
            engine().distribution_for_action(Action::IntentionalBust, &round),
            Err(InputError::ActionUnavailable { .. })
        ));
    }

    #[test]
    fn test_bust_paths_sorted() {
        let round = example_round().with_stance(OpponentStance::Stayed);
        let paths = engine().bust_paths(&round);

        assert_eq!(paths.len(), 3);
        for pair in paths.windows(2) {
            assert!(pair[0].outcome.win >= pair[1].outcome.win);
        }
        assert!(paths.iter().all(|p| p.total > 21));
    }

    #[test]
    fn test_twenty_one_up_demands_exact_total() {
        let round = RoundState::from_cards(&[card(10), card(9)], &[card(8)])
            .unwrap()
            .with_stance(OpponentStance::Stayed)
            .with_opponent_trumps(1);
        let applied = TrumpEffectProcessor::default()
            .apply(&round, &TrumpHand::new(), &TrumpPlay::opponent("Twenty-One Up"))
            .unwrap();
        assert!(applied.round.exact_target_required(Side::Player));

        let engine = engine();
        let stay = engine
            .distribution_for_action(Action::Stay, &applied.round)
            .unwrap();
        assert!(stay.outcome.win.is_zero());
        assert!(stay.outcome.tie.is_zero());
        assert!(stay.outcome.lose.is_one());

        // Only the 2 lands on 21; without the mark staying at 19 still wins sometimes.
        let hit = engine
            .distribution_for_action(Action::Hit, &applied.round)
            .unwrap();
        assert!(!hit.outcome.win.is_zero());
        assert!(hit.outcome.total().is_one());
        let unmarked = engine.distribution_for_action(Action::Stay, &round).unwrap();
        assert!(!unmarked.outcome.win.is_zero());
    }

    #[test]
    fn test_voided_round_has_no_actions() {
        let mut round = example_round();
        round.void();
        assert!(engine().legal_actions(&round).is_empty());
    }
}
