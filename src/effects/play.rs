//! Trump plays as data.
//!
//! A `TrumpPlay` names the trump, the side that played it, and whatever the
//! player observed while it resolved: the card that was drawn, whether a
//! numbered draw succeeded, which trumps left or joined the player's hand.
//! Player plays and opponent interrupts use the same type.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cards::{CatalogError, TrumpHand, TrumpId};
use crate::core::{CardValue, InputError, RoundState, Side};

/// Why a trump could not be applied. The round is left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EffectError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("'{0}' is not in the player's hand")]
    NotHeld(TrumpId),

    #[error("{0} cannot play trumps this round")]
    TrumpsLocked(Side),

    #[error("{0} cannot draw cards this round")]
    DrawsLocked(Side),

    #[error("no trump on the table to destroy")]
    NothingToDestroy,

    #[error("observation required: {0}")]
    ObservationRequired(&'static str),

    #[error("Black Magic was already used twice this fight")]
    BlackMagicExhausted,

    #[error("'{0}' has no modeled effect")]
    Unmodeled(TrumpId),
}

/// One trump being played.
///
/// ```
/// use duel21::core::{CardValue, Side};
/// use duel21::effects::TrumpPlay;
///
/// let play = TrumpPlay::opponent("4 Card").drew(false);
/// assert_eq!(play.owner, Side::Opponent);
/// assert_eq!(play.drawn, Some(false));
///
/// let play = TrumpPlay::player("Perfect Draw").observing(CardValue::new(5).unwrap());
/// assert_eq!(play.observed.map(CardValue::get), Some(5));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrumpPlay {
    /// Name or alias as entered.
    pub trump: String,
    pub owner: Side,
    /// The card that was drawn because of this trump.
    pub observed: Option<CardValue>,
    /// For numbered draws: did the card actually come out of the deck?
    pub drawn: Option<bool>,
    /// Trumps that left the player's hand (random discards, steals).
    pub lost: Vec<TrumpId>,
    /// Trumps that joined the player's hand.
    pub gained: Vec<TrumpId>,
}

impl TrumpPlay {
    fn new(trump: &str, owner: Side) -> Self {
        Self {
            trump: trump.to_string(),
            owner,
            observed: None,
            drawn: None,
            lost: Vec::new(),
            gained: Vec::new(),
        }
    }

    /// A trump played by the player.
    #[must_use]
    pub fn player(trump: &str) -> Self {
        Self::new(trump, Side::Player)
    }

    /// An opponent interrupt.
    #[must_use]
    pub fn opponent(trump: &str) -> Self {
        Self::new(trump, Side::Opponent)
    }

    #[must_use]
    pub fn observing(mut self, card: CardValue) -> Self {
        self.observed = Some(card);
        self
    }

    #[must_use]
    pub fn drew(mut self, drawn: bool) -> Self {
        self.drawn = Some(drawn);
        self
    }

    #[must_use]
    pub fn losing<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.lost
            .extend(names.into_iter().map(|n| TrumpId::new(n.as_ref())));
        self
    }

    #[must_use]
    pub fn gaining<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.gained
            .extend(names.into_iter().map(|n| TrumpId::new(n.as_ref())));
        self
    }
}

/// Something that happened while a trump resolved.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectEvent {
    /// A persistent entry joined the table.
    TableEntryAdded(TrumpId),
    /// Table entries removed by a wipe, or replaced by a new target.
    TableEntriesRemoved(usize),
    CardDrawn { side: Side, card: CardValue },
    CardReturned { side: Side, card: CardValue },
    CardKilled { side: Side, card: CardValue },
    CardsExchanged,
    /// A numbered draw found nothing to draw.
    NothingDrawn(CardValue),
    /// One-way deduction of the opponent's hidden card.
    HiddenConfirmed(CardValue),
    /// A compelled draw did not happen because the side's draws are locked.
    DrawBlocked(Side),
    TargetChanged(u8),
    TrumpsGained { side: Side, count: usize },
    TrumpsLost { side: Side, count: usize },
    RoundVoided,
}

/// The consistent state after a trump resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Applied {
    pub round: RoundState,
    pub hand: TrumpHand,
    pub events: Vec<EffectEvent>,
}

/// Result of settling round-end effects.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settlement {
    pub hand: TrumpHand,
    pub opponent_trumps: u8,
    /// Trumps lost by the player to Mind Shift.
    pub player_lost: usize,
    /// Trumps lost by the opponent to Mind Shift.
    pub opponent_lost: usize,
}
