//! Input validity errors.
//!
//! Raised when a declared card or action does not fit the current round.
//! State is never modified when one of these is returned; the caller fixes
//! the input and tries again.

use thiserror::Error;

use super::action::Action;
use super::card::CardValue;
use super::side::Side;

/// A rejected card, target or action declaration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("card value {0} is outside 1..=11")]
    OutOfRange(u8),

    #[error("'{0}' is not a card value")]
    NotANumber(String),

    #[error("card {0} is already accounted for this round")]
    Duplicate(CardValue),

    #[error("card {0} is not in the remaining deck")]
    NotInDeck(CardValue),

    #[error("{0} has no face-up card")]
    NoFaceUpCard(Side),

    #[error("target {0} is not supported (expected 17, 21, 24 or 27)")]
    UnsupportedTarget(u8),

    #[error("{action} is not available: {reason}")]
    ActionUnavailable { action: Action, reason: &'static str },

    #[error("the opponent's hidden card cannot be {declared}: {reason}")]
    HiddenContradiction {
        declared: CardValue,
        reason: &'static str,
    },

    #[error("no value is left for the opponent's hidden card")]
    NoCandidates,

    #[error("the round is already over")]
    RoundOver,
}
