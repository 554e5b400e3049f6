//! Drawable-card tracking for one round.
//!
//! `DeckState` is always derived from a `RoundState`, never stored: the
//! remaining set is {1..11} minus every card the round has accounted for
//! (both hands including a confirmed hidden card, plus dead cards). A new
//! round builds a fresh `RoundState`, so dead cards never leak across the
//! round boundary.

use serde::{Deserialize, Serialize};

use super::card::{CardSet, CardValue};
use super::error::InputError;

/// The set of card values still drawable from the player's point of view.
///
/// The opponent's unconfirmed face-down card is part of this set: the
/// player cannot tell it apart from the deck.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeckState {
    remaining: CardSet,
}

impl DeckState {
    /// A full deck, 1 through 11.
    #[must_use]
    pub const fn full() -> Self {
        Self {
            remaining: CardSet::full(),
        }
    }

    /// Deck after removing every accounted-for card.
    #[must_use]
    pub const fn from_accounted(accounted: CardSet) -> Self {
        Self {
            remaining: CardSet::full().difference(accounted),
        }
    }

    #[must_use]
    pub const fn remaining(&self) -> CardSet {
        self.remaining
    }

    #[must_use]
    pub const fn contains(&self, card: CardValue) -> bool {
        self.remaining.contains(card)
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.remaining.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.remaining.is_empty()
    }

    /// Deck after drawing `card`. Fails if it is not drawable.
    pub fn draw(&self, card: CardValue) -> Result<DeckState, InputError> {
        if !self.contains(card) {
            return Err(InputError::NotInDeck(card));
        }
        Ok(Self {
            remaining: self.remaining.without(card),
        })
    }
}

impl Default for DeckState {
    fn default() -> Self {
        Self::full()
    }
}
