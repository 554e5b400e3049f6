//! Exact odds for the player's next decision.
//!
//! - `Probability`: reduced rational, so outcomes sum to exactly 1
//! - `compare`: the showdown rule, including both-bust by overage
//! - `TotalDistribution`: opponent final totals with a certainty flag
//! - `OddsEngine`: per-action win / tie / lose, draw odds, bust paths

pub mod probability;
pub mod outcome;
pub mod engine;

pub use probability::Probability;
pub use outcome::{
    compare, ActionOdds, BustPath, Certainty, DrawOdds, Outcome, Showdown, TotalDistribution,
};
pub use engine::OddsEngine;
