//! Advice built on the odds engine and the rule engine.
//!
//! - `recommend`: tiered ranking of the player's held trumps
//! - `timing`: when an opponent is likely to fire each trump
//! - `predictor`: thinkset inference and next-trump prediction
//!
//! Nothing here mutates game state. Outputs are data; rendering them as
//! text is left to the caller.

pub mod predictor;
pub mod recommend;
pub mod timing;

pub use predictor::{
    builtin_table, infer_thinkset, thinkset_rules, Confidence, HoffmanPredictor, Prediction,
};
pub use recommend::{Play, Problem, Recommendation, RecommendationEngine, Tier, Verdict};
pub use timing::{Likelihood, Timing, TimingModel, TimingView};
