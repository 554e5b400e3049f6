//! Rule-table documents.
//!
//! A rule table is a JSON document with four optional sections:
//!
//! ```json
//! {
//!   "rules": {
//!     "Attacker": [
//!       { "id": "silence-low", "priority": 10,
//!         "when": [ { "has": "DeadSilence" }, { "check": "PlayerLow" } ],
//!         "then": { "do": "UseDeadSilence" } }
//!     ]
//!   },
//!   "check_definitions":  { "PlayerLow": { "type": "bk_total_lte", "value": 16 } },
//!   "action_definitions": { "UseGoal24": { "effect": "set_target", "target": 24 } },
//!   "trumps": { "Shield": { "category": "defensive", "utility_weight": 10, "aliases": [] } }
//! }
//! ```
//!
//! Loading is lenient. Unknown fields are ignored, missing optional fields
//! take defaults, and a malformed entry is skipped with a `LoadWarning`.
//! Only a document that is not a JSON object at all is an error.

use rustc_hash::FxHashMap;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

use super::condition::{RuleCondition, RuleContext};
use super::engine::{Rule, RuleList};
use crate::cards::{TrumpCard, TrumpCatalog, TrumpCategory, TrumpEffect, TrumpId};
use crate::opponent::Thinkset;

/// Priority given to rules that do not declare one.
pub const DEFAULT_PRIORITY: u32 = 9999;

/// Weight given to catalog entries that do not declare one.
pub const DEFAULT_WEIGHT: u8 = 50;

/// The document could not be read at all.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("rule table is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("rule table must be a JSON object")]
    NotAnObject,
}

/// A skipped or degraded entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadWarning {
    pub section: &'static str,
    pub entry: String,
    pub reason: String,
}

impl std::fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} '{}': {}", self.section, self.entry, self.reason)
    }
}

/// What a rule predicts the opponent plays.
pub type PlayRules = RuleList<RuleCondition, TrumpId>;

/// A catalog entry read from the document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogEntry {
    pub name: String,
    pub category: TrumpCategory,
    pub weight: Option<u8>,
    pub aliases: Vec<TrumpId>,
}

/// Loaded play rules per thinkset, plus catalog entries.
#[derive(Clone, Debug, Default)]
pub struct RuleTable {
    rules: FxHashMap<Thinkset, PlayRules>,
    catalog: Vec<CatalogEntry>,
}

impl RuleTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a document. Malformed entries come back as warnings.
    pub fn from_json(raw: &str) -> Result<(Self, Vec<LoadWarning>), TableError> {
        let doc: Value = serde_json::from_str(raw)?;
        let root = doc.as_object().ok_or(TableError::NotAnObject)?;
        let mut loader = Loader::new(root);
        let table = loader.load();
        for warning in &loader.warnings {
            warn!(section = warning.section, entry = %warning.entry, reason = %warning.reason, "skipped rule-table entry");
        }
        Ok((table, loader.warnings))
    }

    /// Rules for `thinkset`, if the table has any.
    #[must_use]
    pub fn rules_for(&self, thinkset: Thinkset) -> Option<&PlayRules> {
        self.rules.get(&thinkset).filter(|r| !r.is_empty())
    }

    pub fn insert(&mut self, thinkset: Thinkset, rules: PlayRules) {
        self.rules.insert(thinkset, rules);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.values().all(RuleList::is_empty)
    }

    /// First matching rule for `thinkset`.
    #[must_use]
    pub fn first_match(
        &self,
        thinkset: Thinkset,
        ctx: &RuleContext,
    ) -> Option<&Rule<RuleCondition, TrumpId>> {
        self.rules_for(thinkset)?.first_match(ctx)
    }

    #[must_use]
    pub fn catalog_entries(&self) -> &[CatalogEntry] {
        &self.catalog
    }

    /// Register the document's catalog entries. Known trumps keep their
    /// modeled effect and take the document's weight and aliases; unknown
    /// ones are added by name and category only.
    pub fn merge_into(&self, catalog: &mut TrumpCatalog) {
        for entry in &self.catalog {
            let mut card = match catalog.get(&entry.name) {
                Some(known) => known.clone(),
                None => TrumpCard::new(
                    &entry.name,
                    TrumpEffect::Unmodeled(entry.category),
                    entry.weight.unwrap_or(DEFAULT_WEIGHT),
                ),
            };
            if let Some(weight) = entry.weight {
                card.weight = weight.min(100);
            }
            for alias in &entry.aliases {
                if !card.aliases.contains(alias) {
                    card.aliases.push(alias.clone());
                }
            }
            catalog.register(card);
        }
    }
}

struct Loader<'a> {
    root: &'a Map<String, Value>,
    /// Names are canonicalized against the built-in cards.
    known: TrumpCatalog,
    checks: Option<&'a Map<String, Value>>,
    actions: Option<&'a Map<String, Value>>,
    warnings: Vec<LoadWarning>,
}

impl<'a> Loader<'a> {
    fn new(root: &'a Map<String, Value>) -> Self {
        Self {
            root,
            known: TrumpCatalog::builtin(),
            checks: root.get("check_definitions").and_then(Value::as_object),
            actions: root.get("action_definitions").and_then(Value::as_object),
            warnings: Vec::new(),
        }
    }

    fn skip(&mut self, section: &'static str, entry: &str, reason: impl Into<String>) {
        self.warnings.push(LoadWarning {
            section,
            entry: entry.to_string(),
            reason: reason.into(),
        });
    }

    fn load(&mut self) -> RuleTable {
        let mut table = RuleTable::new();

        if let Some(rules) = self.root.get("rules") {
            match rules.as_object() {
                Some(per_thinkset) => {
                    for (key, list) in per_thinkset {
                        let Some(thinkset) = Thinkset::from_key(key) else {
                            self.skip("rules", key, "unknown thinkset");
                            continue;
                        };
                        let Some(list) = list.as_array() else {
                            self.skip("rules", key, "expected a list of rules");
                            continue;
                        };
                        let parsed: PlayRules = list
                            .iter()
                            .enumerate()
                            .filter_map(|(i, rule)| self.rule(key, i, rule))
                            .collect();
                        // A `_p` variant never overrides the plain key.
                        if key.ends_with("_p") && table.rules.contains_key(&thinkset) {
                            continue;
                        }
                        table.rules.insert(thinkset, parsed);
                    }
                }
                None => self.skip("rules", "rules", "expected an object keyed by thinkset"),
            }
        }

        if let Some(trumps) = self.root.get("trumps") {
            match trumps.as_object() {
                Some(entries) => {
                    for (name, entry) in entries {
                        if let Some(parsed) = self.catalog_entry(name, entry) {
                            table.catalog.push(parsed);
                        }
                    }
                }
                None => self.skip("trumps", "trumps", "expected an object keyed by name"),
            }
        }
        table
    }

    fn rule(&mut self, thinkset: &str, index: usize, raw: &Value) -> Option<Rule<RuleCondition, TrumpId>> {
        let fallback_id = format!("{thinkset}#{index}");
        let Some(obj) = raw.as_object() else {
            self.skip("rules", &fallback_id, "rule is not an object");
            return None;
        };
        let id = obj
            .get("id")
            .and_then(Value::as_str)
            .map_or(fallback_id, str::to_string);
        let priority = obj
            .get("priority")
            .and_then(Value::as_u64)
            .map_or(DEFAULT_PRIORITY, |p| u32::try_from(p).unwrap_or(DEFAULT_PRIORITY));

        let Some(action) = obj
            .get("then")
            .and_then(|t| t.get("do"))
            .and_then(Value::as_str)
        else {
            self.skip("rules", &id, "missing then.do");
            return None;
        };
        let pick = self.action_to_trump(action);

        let conditions = match obj.get("when") {
            None => Vec::new(),
            Some(Value::Array(items)) => items.iter().map(|c| self.condition(&id, c)).collect(),
            Some(_) => {
                self.skip("rules", &id, "`when` is not a list");
                return None;
            }
        };
        let when = if conditions.is_empty() {
            RuleCondition::Always
        } else {
            RuleCondition::All(conditions)
        };
        Some(Rule::new(&id, priority, when, pick))
    }

    fn condition(&mut self, rule_id: &str, raw: &Value) -> RuleCondition {
        if let Some(token) = raw.get("has").and_then(Value::as_str) {
            return RuleCondition::HasTrump(self.canonical(&token_to_name(token)).base());
        }
        if let Some(check) = raw.get("check").and_then(Value::as_str) {
            return self.check(rule_id, check);
        }
        if let Some(limit) = raw.get("items_used_lt").and_then(Value::as_u64) {
            return RuleCondition::ItemsUsedBelow(clamp_u8(limit));
        }
        self.skip("rules", rule_id, "unknown condition type; rule can never match");
        RuleCondition::Never
    }

    fn check(&mut self, rule_id: &str, name: &str) -> RuleCondition {
        if let Some(def) = self.checks.and_then(|c| c.get(name)) {
            if let Some(cond) = check_definition(def) {
                return cond;
            }
        }
        if let Some(cond) = inline_check(name) {
            return cond;
        }
        self.skip("check_definitions", name, format!("unusable check in rule '{rule_id}'"));
        RuleCondition::Never
    }

    fn action_to_trump(&self, action: &str) -> TrumpId {
        let def = self.actions.and_then(|a| a.get(action));
        let field = |key: &str| def.and_then(|d| d.get(key)).and_then(Value::as_u64);
        let effect = def.and_then(|d| d.get("effect")).and_then(Value::as_str);

        let name = match effect {
            Some("set_target") => field("target").map(|t| format!("Go for {t}")),
            Some("draw_n") => field("n").map(|n| format!("Draw {n}")),
            Some("bet_up") => match field("amount") {
                Some(1) => Some("One-Up".to_string()),
                Some(2) => Some("Two-Up".to_string()),
                _ => None,
            },
            Some("bet_down") => match field("amount") {
                Some(1) => Some("Shield".to_string()),
                Some(2) => Some("Shield+".to_string()),
                _ => None,
            },
            Some(named) => named_effect(named).map(str::to_string),
            None => None,
        };
        let name = name.unwrap_or_else(|| {
            action
                .strip_prefix("UseGoal")
                .and_then(|n| n.parse::<u8>().ok())
                .map_or_else(|| token_to_name(action), |t| format!("Go for {t}"))
        });
        self.canonical(&name)
    }

    /// `One Up` resolves to the card `One-Up`; unknown names pass through.
    fn canonical(&self, name: &str) -> TrumpId {
        self.known
            .get(name)
            .or_else(|| self.known.get(&name.replace(' ', "-")))
            .map_or_else(|| TrumpId::new(name), |card| card.id.clone())
    }

    fn catalog_entry(&mut self, name: &str, raw: &Value) -> Option<CatalogEntry> {
        let Some(obj) = raw.as_object() else {
            self.skip("trumps", name, "entry is not an object");
            return None;
        };
        let Some(category) = obj
            .get("category")
            .and_then(Value::as_str)
            .and_then(TrumpCategory::parse)
        else {
            self.skip("trumps", name, "missing or unknown category");
            return None;
        };
        let weight = match obj.get("utility_weight") {
            None | Some(Value::Null) => None,
            Some(w) => match w.as_u64() {
                Some(w) => Some(clamp_u8(w).min(100)),
                None => {
                    self.skip("trumps", name, "utility_weight is not a number; using default");
                    None
                }
            },
        };
        let aliases = obj
            .get("aliases")
            .and_then(Value::as_array)
            .map(|list| {
                list.iter()
                    .filter_map(Value::as_str)
                    .map(TrumpId::new)
                    .collect()
            })
            .unwrap_or_default();
        Some(CatalogEntry {
            name: name.to_string(),
            category,
            weight,
            aliases,
        })
    }
}

fn clamp_u8(value: u64) -> u8 {
    u8::try_from(value).unwrap_or(u8::MAX)
}

fn check_definition(def: &Value) -> Option<RuleCondition> {
    let num = |key: &str| def.get(key).and_then(Value::as_u64).map(clamp_u8);
    let cond = match def.get("type").and_then(Value::as_str)? {
        "bk_total_lte" => RuleCondition::BankerTotal {
            min: 0,
            max: num("value")?,
        },
        "bk_total_eq" => {
            let v = num("value")?;
            RuleCondition::BankerTotal { min: v, max: v }
        }
        "bk_total_gte" => RuleCondition::BankerTotal {
            min: num("value")?,
            max: u8::MAX,
        },
        "bk_total_range_inclusive" => RuleCondition::BankerTotal {
            min: num("min")?,
            max: num("max")?,
        },
        "player_total_gte" => RuleCondition::PlayerTotalAtLeast(num("value")?),
        "player_trumps_gte" => RuleCondition::PlayerTrumpsAtLeast(num("value")?),
        "last_faceup_range_inclusive" => RuleCondition::LastFaceUp {
            min: num("min")?,
            max: num("max")?,
        },
        "player_betup_active" => RuleCondition::PlayerBetUpActive,
        "enemy_can_use_item" => RuleCondition::ItemsUsedBelow(1),
        "enemy_hand_count_gte" => RuleCondition::EnemyHandCountAtLeast(num("value")?),
        _ => return None,
    };
    Some(cond)
}

/// `Check_21_19` style names: opponent total within the two bounds.
fn inline_check(name: &str) -> Option<RuleCondition> {
    let rest = name.strip_prefix("Check_")?;
    let (a, b) = rest.split_once('_')?;
    let (a, b): (u8, u8) = (a.parse().ok()?, b.parse().ok()?);
    Some(RuleCondition::BankerTotal {
        min: a.min(b),
        max: a.max(b),
    })
}

fn named_effect(effect: &str) -> Option<&'static str> {
    let name = match effect {
        "desire" => "Desire",
        "happiness" => "Happiness",
        "mind_shift" => "Mind Shift",
        "curse" => "Curse",
        "conjure" => "Conjure",
        "dead_silence" => "Dead Silence",
        "oblivion" => "Oblivion",
        "escape" => "Escape",
        "perfect_draw" => "Perfect Draw",
        "shield_assault" => "Shield Assault",
        "destroy" => "Destroy",
        "black_magic" => "Black Magic",
        "twenty_one_up" => "Twenty-One Up",
        _ => return None,
    };
    Some(name)
}

/// `UseDeadSilence` → `Dead Silence`, `HasSheildAssalt` → `Shield Assault`,
/// `Goal24` → `Go for 24`.
fn token_to_name(token: &str) -> String {
    let fixed = token
        .replace("Sheild", "Shield")
        .replace("Assalt", "Assault")
        .replace("Ovlivion", "Oblivion");
    let stripped = ["Use", "Has", "Check_", "Check"]
        .iter()
        .find_map(|p| fixed.strip_prefix(p))
        .unwrap_or(&fixed);

    let mut words = String::new();
    let mut prev: Option<char> = None;
    for ch in stripped.chars() {
        if ch == '_' || ch == '-' {
            words.push(' ');
        } else {
            let boundary = match prev {
                Some(p) => {
                    (ch.is_ascii_uppercase() && p != ' ')
                        || (ch.is_ascii_digit() && p.is_ascii_alphabetic())
                }
                None => false,
            };
            if boundary {
                words.push(' ');
            }
            words.push(ch);
        }
        prev = words.chars().last();
    }
    let name = words.split_whitespace().collect::<Vec<_>>().join(" ");
    match name.strip_prefix("Goal ") {
        Some(target) => format!("Go for {target}"),
        None => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opponent::OpponentProfile;

    const DOC: &str = r#"{
        "rules": {
            "Attacker": [
                { "id": "late", "priority": 50, "when": [], "then": { "do": "UseOneUp" } },
                { "id": "silence", "priority": 10,
                  "when": [ { "has": "DeadSilence" }, { "check": "Low" } ],
                  "then": { "do": "UseDeadSilence" } },
                { "id": "broken", "priority": 5 },
                { "id": "goal", "priority": 20,
                  "when": [ { "check": "Check_17_15" } ],
                  "then": { "do": "UseGoal17" } }
            ],
            "Nobody": []
        },
        "check_definitions": { "Low": { "type": "bk_total_lte", "value": 12 } },
        "action_definitions": { "UseGoal17": { "effect": "set_target", "target": 17 } },
        "trumps": {
            "Shield": { "category": "defensive", "utility_weight": 12, "extra": true },
            "Mystery": { "category": "special" },
            "Bad": { "utility_weight": 3 }
        },
        "unknown_section": 42
    }"#;

    fn ctx(banker_total: u8) -> RuleContext {
        RuleContext {
            banker_total: Some(banker_total),
            ..RuleContext::for_profile(&OpponentProfile::new("Hoffman", 17).with_kit(["Dead Silence"]))
        }
    }

    #[test]
    fn test_load_with_warnings() {
        let (table, warnings) = RuleTable::from_json(DOC).unwrap();
        let rules = table.rules_for(Thinkset::Attacker).unwrap();

        assert_eq!(rules.len(), 3);
        assert_eq!(warnings.len(), 3);
        assert!(warnings.iter().any(|w| w.entry == "broken"));
        assert!(warnings.iter().any(|w| w.entry == "Nobody"));
        assert!(warnings.iter().any(|w| w.entry == "Bad"));
    }

    #[test]
    fn test_first_match_by_priority() {
        let (table, _) = RuleTable::from_json(DOC).unwrap();
        let pick = |total| table.first_match(Thinkset::Attacker, &ctx(total)).map(|r| r.then.clone());

        assert_eq!(pick(10), Some(TrumpId::new("Dead Silence")));
        assert_eq!(pick(16), Some(TrumpId::new("Go for 17")));
        assert_eq!(pick(19), Some(TrumpId::new("One-Up")));
    }

    #[test]
    fn test_merge_into_catalog() {
        let (table, _) = RuleTable::from_json(DOC).unwrap();
        let mut catalog = TrumpCatalog::builtin();
        table.merge_into(&mut catalog);

        assert_eq!(catalog.weight_or(&TrumpId::new("Shield"), 0), 12);
        let mystery = catalog.get("mystery").unwrap();
        assert_eq!(mystery.effect, TrumpEffect::Unmodeled(TrumpCategory::Special));
    }

    #[test]
    fn test_not_json() {
        assert!(matches!(RuleTable::from_json("not json"), Err(TableError::Json(_))));
        assert!(matches!(RuleTable::from_json("[1, 2]"), Err(TableError::NotAnObject)));
    }

    #[test]
    fn test_token_names() {
        assert_eq!(token_to_name("UseDeadSilence"), "Dead Silence");
        assert_eq!(token_to_name("HasSheildAssalt"), "Shield Assault");
        assert_eq!(token_to_name("Goal24"), "Go for 24");
        assert_eq!(token_to_name("UseMind_Shift"), "Mind Shift");
    }

    #[test]
    fn test_action_names_canonicalized() {
        let root = serde_json::json!({
            "action_definitions": {
                "Pull": { "effect": "draw_n", "n": 4 },
                "Guard": { "effect": "bet_down", "amount": 2 }
            }
        });
        let loader = Loader::new(root.as_object().unwrap());

        assert_eq!(loader.action_to_trump("Pull"), TrumpId::new("4 Card"));
        assert_eq!(loader.action_to_trump("Guard"), TrumpId::new("Shield+"));
        assert_eq!(loader.action_to_trump("UseOneUp"), TrumpId::new("One-Up"));
        assert_eq!(loader.action_to_trump("UseGoal27"), TrumpId::new("Go for 27"));
    }
}
