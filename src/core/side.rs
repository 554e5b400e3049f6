//! The two sides of a duel and per-side data storage.
//!
//! ## Side
//!
//! Every duel has exactly two seats: the player being advised and the
//! opponent. Trump effects are written relative to the side that plays them,
//! so `Side::other` is used throughout the effect processor.
//!
//! ## SideMap
//!
//! Fixed two-slot storage indexed by `Side`.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// One of the two seats at the table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// The player being advised.
    Player,
    /// The opponent (banker).
    Opponent,
}

impl Side {
    /// Both sides, player first.
    pub const BOTH: [Side; 2] = [Side::Player, Side::Opponent];

    /// The other seat.
    #[must_use]
    pub const fn other(self) -> Side {
        match self {
            Side::Player => Side::Opponent,
            Side::Opponent => Side::Player,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Player => write!(f, "player"),
            Side::Opponent => write!(f, "opponent"),
        }
    }
}

/// Per-side data with O(1) access.
///
/// ## Example
///
/// ```
/// use duel21::core::{Side, SideMap};
///
/// let mut bets: SideMap<i32> = SideMap::with_value(1);
/// bets[Side::Opponent] += 2;
///
/// assert_eq!(bets[Side::Player], 1);
/// assert_eq!(bets[Side::Opponent], 3);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SideMap<T> {
    player: T,
    opponent: T,
}

impl<T> SideMap<T> {
    /// Create a map from explicit values.
    pub const fn new(player: T, opponent: T) -> Self {
        Self { player, opponent }
    }

    /// Create a map with both entries set to the same value.
    pub fn with_value(value: T) -> Self
    where
        T: Clone,
    {
        Self {
            player: value.clone(),
            opponent: value,
        }
    }

    /// Build a map from a factory function.
    pub fn from_fn(factory: impl Fn(Side) -> T) -> Self {
        Self {
            player: factory(Side::Player),
            opponent: factory(Side::Opponent),
        }
    }

    /// Get a reference to a side's data.
    #[must_use]
    pub fn get(&self, side: Side) -> &T {
        match side {
            Side::Player => &self.player,
            Side::Opponent => &self.opponent,
        }
    }

    /// Get a mutable reference to a side's data.
    pub fn get_mut(&mut self, side: Side) -> &mut T {
        match side {
            Side::Player => &mut self.player,
            Side::Opponent => &mut self.opponent,
        }
    }

    /// Iterate over (Side, &T) pairs, player first.
    pub fn iter(&self) -> impl Iterator<Item = (Side, &T)> {
        [(Side::Player, &self.player), (Side::Opponent, &self.opponent)].into_iter()
    }
}

impl<T> Index<Side> for SideMap<T> {
    type Output = T;

    fn index(&self, side: Side) -> &Self::Output {
        self.get(side)
    }
}

impl<T> IndexMut<Side> for SideMap<T> {
    fn index_mut(&mut self, side: Side) -> &mut Self::Output {
        self.get_mut(side)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_other_side() {
        assert_eq!(Side::Player.other(), Side::Opponent);
        assert_eq!(Side::Opponent.other(), Side::Player);
        assert_eq!(Side::Player.other().other(), Side::Player);
    }

    #[test]
    fn test_side_map_from_fn() {
        let map = SideMap::from_fn(|s| if s == Side::Player { 10 } else { 20 });
        assert_eq!(map[Side::Player], 10);
        assert_eq!(map[Side::Opponent], 20);
    }

    #[test]
    fn test_side_map_mutation() {
        let mut map: SideMap<i32> = SideMap::with_value(0);
        map[Side::Player] = 3;
        *map.get_mut(Side::Opponent) -= 1;

        let pairs: Vec<_> = map.iter().collect();
        assert_eq!(pairs, vec![(Side::Player, &3), (Side::Opponent, &-1)]);
    }

    #[test]
    fn test_side_map_serialization() {
        let map = SideMap::new(1u8, 2u8);
        let json = serde_json::to_string(&map).unwrap();
        let back: SideMap<u8> = serde_json::from_str(&json).unwrap();
        assert_eq!(map, back);
    }
}
