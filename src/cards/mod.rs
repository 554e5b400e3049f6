//! Trump cards: identities, effects as data, the catalog and the player hand.
//!
//! ## Key Types
//!
//! - `TrumpId`: normalized name; `base()` strips the `+` upgrade suffix
//! - `TrumpEffect`: closed tagged variant per category
//! - `TrumpCard`: static record (category, effect, weight, aliases)
//! - `TrumpCatalog`: lookup by name or alias
//! - `TrumpHand`: the player's held trumps
//! - `Availability`: unlocked identities supplied by the progress store
//!
//! ## Weights
//!
//! Utility weights order recommendations internally. They are crate-private
//! and never part of any advice text.

pub mod trump;
pub mod catalog;
pub mod hand;

pub use trump::{
    AttackEffect, CardWipe, DrawForce, SpecialEffect, TrumpCard, TrumpCategory, TrumpEffect,
    TrumpId, WipeScope,
};
pub use catalog::{Availability, CatalogError, TrumpCatalog};
pub use hand::TrumpHand;
