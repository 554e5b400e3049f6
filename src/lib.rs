//! # duel21
//!
//! Exact-odds decision support for a two-player blackjack duel played to a
//! variable target, with one-shot trump cards layered on top.
//!
//! ## Design Principles
//!
//! 1. **Exact, Not Sampled**: Every probability is a rational over the
//!    remaining deck. Win, tie and lose always sum to exactly one.
//!
//! 2. **Uncertainty Is Data**: When the opponent model has to guess (a
//!    banker near its stop point), results carry `Certainty::Estimate`
//!    instead of pretending to be confirmed.
//!
//! 3. **Effects as Data**: Player plays and opponent interrupts are the same
//!    `TrumpPlay` value routed through one processor. A failed effect leaves
//!    the round untouched.
//!
//! 4. **Explicit Context**: Round, hand and gauntlet state are passed by
//!    reference. There is no global profile.
//!
//! ## Modules
//!
//! - `core`: card values and sets, sides, actions, round and gauntlet state,
//!   heuristic configuration
//! - `odds`: exact probabilities, the comparison rule, the odds engine
//! - `opponent`: profiles, banker tendencies, the opponent total model
//! - `cards`: trump identities, effects, the catalog and the player hand
//! - `effects`: the trump effect processor
//! - `rules`: the ordered first-match rule engine and rule-table documents
//! - `advisor`: recommendations, timing model, opponent trump prediction

pub mod core;
pub mod odds;
pub mod opponent;
pub mod cards;
pub mod effects;
pub mod rules;
pub mod advisor;

// Re-export commonly used types
pub use crate::core::{
    Action, CardSet, CardValue, DeckState, GameMode, GauntletContext, HeuristicConfig,
    HiddenCard, InputError, Objective, OpponentStance, RoundResult, RoundState, Side,
};

pub use crate::odds::{ActionOdds, BustPath, Certainty, DrawOdds, OddsEngine, Outcome, Probability};

pub use crate::opponent::{OpponentModel, OpponentProfile, Roster, Thinkset};

pub use crate::cards::{TrumpCard, TrumpCatalog, TrumpEffect, TrumpHand, TrumpId};

pub use crate::effects::{Applied, EffectError, EffectEvent, TrumpEffectProcessor, TrumpPlay};

pub use crate::rules::{LoadWarning, Rule, RuleCondition, RuleContext, RuleList, RuleTable};

pub use crate::advisor::{
    HoffmanPredictor, Prediction, Recommendation, RecommendationEngine,
};
