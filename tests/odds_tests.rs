//! Odds engine integration tests.
//!
//! Covers the worked example round and the sum-to-one invariant over
//! randomly generated rounds.

use duel21::cards::TrumpHand;
use duel21::core::{Action, CardValue, HeuristicConfig, OpponentStance, RoundState, Side};
use duel21::effects::{TrumpEffectProcessor, TrumpPlay};
use duel21::odds::{Certainty, OddsEngine, Probability};
use duel21::opponent::{OpponentModel, OpponentProfile, Roster};
use proptest::prelude::*;

fn card(v: u8) -> CardValue {
    CardValue::new(v).unwrap()
}

fn cards(values: &[u8]) -> Vec<CardValue> {
    values.iter().map(|&v| card(v)).collect()
}

fn engine(profile: OpponentProfile) -> OddsEngine {
    OddsEngine::new(OpponentModel::new(profile, &HeuristicConfig::default()))
}

/// Set the target by playing the matching trump from the player's hand.
fn with_target(round: RoundState, target: u8) -> RoundState {
    if target == 21 {
        return round;
    }
    let name = format!("Go for {target}");
    TrumpEffectProcessor::default()
        .apply(&round, &TrumpHand::from_names([name.as_str()]), &TrumpPlay::player(&name))
        .map(|applied| applied.round)
        .unwrap()
}

// =============================================================================
// Worked example
// =============================================================================

/// Player [10, 6], opponent [8], target 21.
#[test]
fn test_example_round() {
    let round = RoundState::from_cards(&cards(&[10, 6]), &cards(&[8])).unwrap();

    let remaining: Vec<u8> = OddsEngine::remaining(&round).iter().map(CardValue::get).collect();
    assert_eq!(remaining, [1, 2, 3, 4, 5, 7, 9, 11]);

    let draw = OddsEngine::draw_odds(&round);
    assert!(draw.perfect_cards.contains(card(5)));
    assert!(draw.bust_cards.contains(card(9)));
    assert_eq!(draw.bust, Probability::new(3, 8));
    assert_eq!(draw.safe, Probability::new(5, 8));
    assert_eq!(draw.perfect, Probability::new(1, 8));

    let lucas = Roster::builtin().find("Lucas").cloned().unwrap();
    let odds = engine(lucas);
    let stay = odds.distribution_for_action(Action::Stay, &round).unwrap();
    let hit = odds.distribution_for_action(Action::Hit, &round).unwrap();

    assert!(stay.outcome.total().is_one());
    assert!(hit.outcome.total().is_one());
    // Lucas has gray-zone draw percentages.
    assert_eq!(stay.certainty, Certainty::Estimate);
}

/// A confirmed stay draws the hidden card uniformly and needs no guessing.
#[test]
fn test_confirmed_stay_is_exact() {
    let round = RoundState::from_cards(&cards(&[10, 6]), &cards(&[8]))
        .unwrap()
        .with_stance(OpponentStance::Stayed);
    let odds = engine(OpponentProfile::new("Stranger", 17));

    let dist = odds.opponent_distribution(&round);
    assert_eq!(dist.len(), 8);
    assert_eq!(dist.certainty(), Certainty::Exact);
    assert_eq!(dist.probability_of(9), Probability::new(1, 8));
}

/// Voluntary and compelled single draws share the same math.
#[test]
fn test_force_draw_matches_hit() {
    let round = RoundState::from_cards(&cards(&[7, 5]), &cards(&[9])).unwrap();
    let odds = engine(OpponentProfile::new("Stranger", 16));

    let hit = odds.distribution_for_action(Action::Hit, &round).unwrap();
    let forced = odds.distribution_for_action(Action::ForceDraw, &round).unwrap();
    assert_eq!(hit.outcome, forced.outcome);
}

/// A raised target widens the player's safe draws.
#[test]
fn test_target_moves_bust_threshold() {
    let round = RoundState::from_cards(&cards(&[10, 6]), &cards(&[8])).unwrap();
    let round = with_target(round, 24);

    let draw = OddsEngine::draw_odds(&round);
    let busting: Vec<u8> = draw.bust_cards.iter().map(CardValue::get).collect();
    assert_eq!(busting, [9, 11]);
}

// =============================================================================
// Sum-to-one invariant
// =============================================================================

fn stance() -> impl Strategy<Value = OpponentStance> {
    prop_oneof![
        Just(OpponentStance::Drawing),
        Just(OpponentStance::Stayed),
        Just(OpponentStance::ForcedDraw),
    ]
}

/// Distinct cards split between the two sides, plus a stance and target.
fn round_strategy() -> impl Strategy<Value = RoundState> {
    (
        Just((1..=11u8).collect::<Vec<_>>()).prop_shuffle(),
        2..=4usize,
        1..=3usize,
        stance(),
        prop::sample::select(vec![17u8, 21, 24, 27]),
    )
        .prop_map(|(deck, mine, theirs, stance, target)| {
            let player = cards(&deck[..mine]);
            let opponent = cards(&deck[mine..mine + theirs]);
            let round = RoundState::from_cards(&player, &opponent)
                .unwrap()
                .with_stance(stance);
            with_target(round, target)
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_every_action_sums_to_one(round in round_strategy(), threshold in 14u8..=19) {
        let odds = engine(OpponentProfile::new("Stranger", threshold));
        let all = odds.evaluate_all(&round);

        prop_assert!(!all.is_empty());
        for action in &all {
            prop_assert!(action.outcome.total().is_one(), "{} sums to {:?}", action.action, action.outcome.total());
        }
    }

    #[test]
    fn test_remaining_excludes_accounted(round in round_strategy()) {
        let remaining = OddsEngine::remaining(&round);
        for side in [Side::Player, Side::Opponent] {
            for &c in round.face_up(side) {
                prop_assert!(!remaining.contains(c));
            }
        }
        let shown = round.face_up(Side::Player).len() + round.face_up(Side::Opponent).len();
        prop_assert_eq!(remaining.len() + shown, 11);
    }
}
