//! Core types: cards, sides, actions, round and gauntlet state, configuration.
//!
//! Everything else in the crate reads these types. The odds engine and the
//! advisor never mutate them; the effect processor returns new values.

pub mod card;
pub mod side;
pub mod action;
pub mod error;
pub mod deck;
pub mod round;
pub mod gauntlet;
pub mod config;

pub use card::{parse_cards, CardSet, CardValue, MAX_CARD, MIN_CARD};
pub use side::{Side, SideMap};
pub use action::Action;
pub use error::InputError;
pub use deck::DeckState;
pub use round::{
    validate_target, HiddenCard, OpponentStance, RoundState, RoundStatus, TableEntry, TableMark,
    BASE_TARGET, SUPPORTED_TARGETS,
};
pub use gauntlet::{GameMode, GauntletContext, Objective, RoundRecord, RoundResult};
pub use config::{
    AdviceThresholds, ConfidenceBands, DrawTendencies, HeuristicConfig, LikelihoodScores,
    TimingThresholds,
};
