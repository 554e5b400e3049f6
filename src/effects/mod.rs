//! Trump effects as state transforms.
//!
//! Every trump, whoever plays it, goes through `TrumpEffectProcessor::apply`:
//!
//! ```text
//! RoundState + TrumpHand + TrumpPlay  ──apply──▶  Applied { round, hand, events }
//!                                       └──────▶  EffectError (inputs unchanged)
//! ```
//!
//! Persistent effects live as table entries on the round, so bets and the
//! target are always derived from what is on the table.

pub mod play;
pub mod processor;

pub use play::{Applied, EffectError, EffectEvent, Settlement, TrumpPlay};
pub use processor::{best_card, TrumpEffectProcessor, BLACK_MAGIC_LIMIT, DESPERATION_BET};
