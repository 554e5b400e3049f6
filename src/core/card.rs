//! Numbered card values and compact card sets.
//!
//! The duel uses one copy each of the values 1 through 11. A `CardSet`
//! is an 11-bit mask over those values, so set algebra on the deck is a
//! handful of integer operations and sets are `Copy`.

use serde::{Deserialize, Serialize};

use super::error::InputError;

/// Lowest card value in the deck.
pub const MIN_CARD: u8 = 1;

/// Highest card value in the deck.
pub const MAX_CARD: u8 = 11;

/// A validated card value in `1..=11`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct CardValue(u8);

impl CardValue {
    /// Validate a raw value.
    ///
    /// ```
    /// use duel21::core::CardValue;
    ///
    /// assert_eq!(CardValue::new(7).unwrap().get(), 7);
    /// assert!(CardValue::new(0).is_err());
    /// assert!(CardValue::new(12).is_err());
    /// ```
    pub fn new(value: u8) -> Result<Self, InputError> {
        if (MIN_CARD..=MAX_CARD).contains(&value) {
            Ok(Self(value))
        } else {
            Err(InputError::OutOfRange(value))
        }
    }

    /// The raw value.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Every card value, ascending.
    pub fn all() -> impl Iterator<Item = CardValue> {
        (MIN_CARD..=MAX_CARD).map(CardValue)
    }

    const fn bit(self) -> u16 {
        1 << self.0
    }
}

impl TryFrom<u8> for CardValue {
    type Error = InputError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CardValue> for u8 {
    fn from(card: CardValue) -> u8 {
        card.0
    }
}

impl std::fmt::Display for CardValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parse whitespace-separated card values, rejecting out-of-range and
/// repeated values.
pub fn parse_cards(raw: &str) -> Result<Vec<CardValue>, InputError> {
    let mut seen = CardSet::EMPTY;
    let mut cards = Vec::new();
    for token in raw.split_whitespace() {
        let value: u8 = token
            .parse()
            .map_err(|_| InputError::NotANumber(token.to_string()))?;
        let card = CardValue::new(value)?;
        if !seen.insert(card) {
            return Err(InputError::Duplicate(card));
        }
        cards.push(card);
    }
    Ok(cards)
}

/// A set of card values backed by a bit mask.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardSet(u16);

impl CardSet {
    /// The empty set.
    pub const EMPTY: CardSet = CardSet(0);

    const FULL_MASK: u16 = 0b1111_1111_1110;

    /// Every value 1 through 11.
    #[must_use]
    pub const fn full() -> Self {
        CardSet(Self::FULL_MASK)
    }

    /// A set holding one card.
    #[must_use]
    pub const fn single(card: CardValue) -> Self {
        CardSet(card.bit())
    }

    #[must_use]
    pub const fn contains(self, card: CardValue) -> bool {
        self.0 & card.bit() != 0
    }

    /// Insert a card. Returns `false` if it was already present.
    pub fn insert(&mut self, card: CardValue) -> bool {
        let fresh = !self.contains(card);
        self.0 |= card.bit();
        fresh
    }

    /// Remove a card. Returns `false` if it was absent.
    pub fn remove(&mut self, card: CardValue) -> bool {
        let present = self.contains(card);
        self.0 &= !card.bit();
        present
    }

    /// Copy of this set without `card`.
    #[must_use]
    pub const fn without(self, card: CardValue) -> Self {
        CardSet(self.0 & !card.bit())
    }

    #[must_use]
    pub const fn union(self, other: CardSet) -> Self {
        CardSet(self.0 | other.0)
    }

    #[must_use]
    pub const fn intersection(self, other: CardSet) -> Self {
        CardSet(self.0 & other.0)
    }

    #[must_use]
    pub const fn difference(self, other: CardSet) -> Self {
        CardSet(self.0 & !other.0)
    }

    #[must_use]
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Largest value in the set.
    #[must_use]
    pub fn max(self) -> Option<CardValue> {
        self.iter().last()
    }

    /// Smallest value in the set.
    #[must_use]
    pub fn min(self) -> Option<CardValue> {
        self.iter().next()
    }

    /// Raw mask, usable as a compact memo key.
    #[must_use]
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// Iterate values in ascending order.
    pub fn iter(self) -> impl Iterator<Item = CardValue> {
        CardValue::all().filter(move |c| self.contains(*c))
    }
}

impl FromIterator<CardValue> for CardSet {
    fn from_iter<I: IntoIterator<Item = CardValue>>(iter: I) -> Self {
        let mut set = CardSet::EMPTY;
        for card in iter {
            set.insert(card);
        }
        set
    }
}

impl std::fmt::Display for CardSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let values: Vec<String> = self.iter().map(|c| c.to_string()).collect();
        write!(f, "{{{}}}", values.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(v: u8) -> CardValue {
        CardValue::new(v).unwrap()
    }

    #[test]
    fn test_card_value_range() {
        assert!(CardValue::new(1).is_ok());
        assert!(CardValue::new(11).is_ok());
        assert_eq!(CardValue::new(0), Err(InputError::OutOfRange(0)));
        assert_eq!(CardValue::new(12), Err(InputError::OutOfRange(12)));
        assert_eq!(CardValue::all().count(), 11);
    }

    #[test]
    fn test_full_set() {
        let full = CardSet::full();
        assert_eq!(full.len(), 11);
        assert_eq!(full.min(), Some(card(1)));
        assert_eq!(full.max(), Some(card(11)));
    }

    #[test]
    fn test_set_algebra() {
        let a: CardSet = [1, 2, 3].into_iter().map(card).collect();
        let b: CardSet = [3, 4].into_iter().map(card).collect();

        assert_eq!(a.union(b).len(), 4);
        assert_eq!(a.intersection(b), CardSet::single(card(3)));
        assert_eq!(a.difference(b).len(), 2);
        assert!(!a.without(card(1)).contains(card(1)));
    }

    #[test]
    fn test_insert_and_remove_report_change() {
        let mut set = CardSet::EMPTY;
        assert!(set.insert(card(5)));
        assert!(!set.insert(card(5)));
        assert!(set.remove(card(5)));
        assert!(!set.remove(card(5)));
        assert!(set.is_empty());
    }

    #[test]
    fn test_parse_cards() {
        let cards = parse_cards(" 10 6  8 ").unwrap();
        assert_eq!(cards, vec![card(10), card(6), card(8)]);
        assert!(parse_cards("").unwrap().is_empty());
        assert_eq!(parse_cards("3 3"), Err(InputError::Duplicate(card(3))));
        assert_eq!(parse_cards("14"), Err(InputError::OutOfRange(14)));
        assert!(matches!(parse_cards("x"), Err(InputError::NotANumber(_))));
    }

    #[test]
    fn test_card_value_serde_rejects_out_of_range() {
        let ok: CardValue = serde_json::from_str("4").unwrap();
        assert_eq!(ok, card(4));
        assert!(serde_json::from_str::<CardValue>("0").is_err());
    }

    #[test]
    fn test_display() {
        let set: CardSet = [2, 9].into_iter().map(card).collect();
        assert_eq!(set.to_string(), "{2,9}");
    }
}
