//! Opponent modeling: profiles, banker tendencies and the final-total model.
//!
//! - `OpponentProfile`: name, stay threshold, kit, optional banker data
//! - `BankerProfile`: draw borders and how the banker reads the player
//! - `Roster`: opponents known by name
//! - `OpponentModel`: exact distribution over the opponent's final total

pub mod profile;
pub mod model;

pub use profile::{BankerProfile, DrawChance, OpponentProfile, Roster, Thinkset, TotalBand};
pub use model::{OpponentModel, OpponentView};
