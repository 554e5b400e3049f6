//! Priority-ordered rules.
//!
//! - `engine`: the generic first-match `RuleList` and the `Predicate` seam
//! - `condition`: kit and round conditions, evaluated against a `RuleContext`
//! - `table`: per-thinkset play rules loaded from JSON documents
//!
//! Thinkset inference and opponent trump prediction both evaluate a
//! `RuleList`; neither interprets rule contents directly.

pub mod condition;
pub mod engine;
pub mod table;

pub use condition::{RuleCondition, RuleContext};
pub use engine::{Predicate, Rule, RuleList};
pub use table::{CatalogEntry, LoadWarning, PlayRules, RuleTable, TableError};
