//! Rule-table documents feeding the predictor and the recommendation engine.

use duel21::advisor::{Confidence, HoffmanPredictor, Play, RecommendationEngine};
use duel21::cards::{TrumpCatalog, TrumpHand, TrumpId};
use duel21::core::{CardValue, GameMode, GauntletContext, HeuristicConfig, RoundState};
use duel21::odds::OddsEngine;
use duel21::opponent::{OpponentModel, OpponentProfile, Roster, Thinkset};
use duel21::rules::{RuleTable, TableError};

const TABLE: &str = r#"{
    "rules": {
        "Tricky": [
            { "id": "cheer-up", "priority": 10,
              "when": [ { "has": "Happiness" }, { "check": "BankerLow" } ],
              "then": { "do": "UseHappiness" } },
            { "id": "no-then", "priority": 1, "when": [] },
            { "id": "mystery-check", "priority": 2,
              "when": [ { "check": "Undefined" } ], "then": { "do": "UseDesire" } }
        ],
        "Tricky_p": [
            { "id": "ignored", "priority": 1, "when": [], "then": { "do": "UseMindShift" } }
        ],
        "Sleepy": []
    },
    "check_definitions": {
        "BankerLow": { "type": "bk_total_lte", "value": 14 }
    },
    "trumps": {
        "Return": { "category": "draw_forcer", "utility_weight": 5, "aliases": ["Take Back"] },
        "Lantern": { "category": "special", "utility_weight": 30 }
    }
}"#;

fn cards(values: &[u8]) -> Vec<CardValue> {
    values.iter().map(|&v| CardValue::new(v).unwrap()).collect()
}

fn roster(name: &str) -> OpponentProfile {
    Roster::builtin().find(name).cloned().unwrap()
}

#[test]
fn test_malformed_entries_warn_but_load() {
    let (table, warnings) = RuleTable::from_json(TABLE).unwrap();

    let tricky = table.rules_for(Thinkset::Tricky).unwrap();
    // The rule without an action is dropped; the undefined check never matches.
    assert_eq!(tricky.len(), 2);
    assert!(warnings.iter().any(|w| w.entry == "no-then"));
    assert!(warnings.iter().any(|w| w.entry == "Sleepy"));
    assert!(warnings.iter().any(|w| w.entry == "Undefined"));
    assert!(table.rules_for(Thinkset::Attacker).is_none());
    assert_eq!(table.catalog_entries().len(), 2);
}

#[test]
fn test_document_errors() {
    assert!(matches!(RuleTable::from_json("{ rules"), Err(TableError::Json(_))));
    assert!(matches!(RuleTable::from_json("\"rules\""), Err(TableError::NotAnObject)));

    let (table, warnings) = RuleTable::from_json("{}").unwrap();
    assert!(table.is_empty());
    assert!(warnings.is_empty());
}

#[test]
fn test_loaded_rules_drive_prediction() {
    let (table, _) = RuleTable::from_json(TABLE).unwrap();
    let predictor = HoffmanPredictor::new(&HeuristicConfig::default()).with_table(&table);
    let gauntlet = GauntletContext::new(GameMode::Normal);

    let tricky = roster("Bloody Handprints Hoffman");
    let round = RoundState::from_cards(&cards(&[10, 6]), &cards(&[8])).unwrap();
    let prediction = predictor
        .predict_round(&tricky, &round, &TrumpHand::from_names(["Shield"]), &gauntlet)
        .unwrap();
    assert_eq!(prediction.trump, TrumpId::new("Happiness"));
    assert_eq!(prediction.confidence, Confidence::High);

    // Thinksets the document leaves out keep the built-in play table.
    let lucas = roster("Lucas");
    let prediction = predictor
        .predict_round(&lucas, &round, &TrumpHand::new(), &gauntlet)
        .unwrap();
    assert_eq!(prediction.trump, TrumpId::new("One-Up"));
}

#[test]
fn test_merged_weights_reorder_advice() {
    let (table, _) = RuleTable::from_json(TABLE).unwrap();
    let mut catalog = TrumpCatalog::builtin();
    table.merge_into(&mut catalog);
    assert!(catalog.get("take back").is_some());
    assert!(catalog.get("Lantern").is_some());

    let round = RoundState::from_cards(&cards(&[10, 5, 8]), &cards(&[2])).unwrap();
    let hand = TrumpHand::from_names(["Go for 24", "Return"]);
    let gauntlet = GauntletContext::new(GameMode::Normal);
    let odds = OddsEngine::new(OpponentModel::new(roster("Lucas"), &HeuristicConfig::default()));

    let picks = |engine: RecommendationEngine| -> Vec<Play> {
        engine
            .recommend(&odds, &round, &hand, &gauntlet)
            .into_iter()
            .map(|r| r.play)
            .collect()
    };
    let go = Play::Trump(TrumpId::new("Go for 24"));
    let ret = Play::Trump(TrumpId::new("Return"));

    assert_eq!(picks(RecommendationEngine::default()), [go.clone(), ret.clone()]);
    assert_eq!(
        picks(RecommendationEngine::new(catalog, &HeuristicConfig::default())),
        [ret, go]
    );
}
