//! The player's trump hand.
//!
//! Order does not matter for the rules, but insertion order is kept so
//! that display stays stable. Backed by `im::Vector` so that the effect
//! processor can clone and commit it together with the round.

use im::Vector;
use serde::{Deserialize, Serialize};

use super::catalog::TrumpCatalog;
use super::trump::TrumpId;

/// Trump identities held by the player.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrumpHand {
    cards: Vector<TrumpId>,
}

impl TrumpHand {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from display names. Names are normalized, not validated.
    #[must_use]
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            cards: names.into_iter().map(|n| TrumpId::new(n.as_ref())).collect(),
        }
    }

    pub fn add(&mut self, id: TrumpId) {
        self.cards.push_back(id);
    }

    /// Remove one copy of `id`. Returns `false` if it was not held.
    pub fn remove_one(&mut self, id: &TrumpId) -> bool {
        match self.cards.iter().position(|c| c == id) {
            Some(pos) => {
                self.cards.remove(pos);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn contains(&self, id: &TrumpId) -> bool {
        self.cards.contains(id)
    }

    /// Number of held cards whose base identity is `base`.
    #[must_use]
    pub fn count_base(&self, base: &TrumpId) -> usize {
        self.cards.iter().filter(|c| &c.base() == base).count()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrumpId> {
        self.cards.iter()
    }

    pub fn clear(&mut self) {
        self.cards.clear();
    }

    /// Held cards ordered cheapest first by catalog weight.
    #[must_use]
    pub fn by_weight(&self, catalog: &TrumpCatalog, fallback: u8) -> Vec<TrumpId> {
        let mut cards: Vec<TrumpId> = self.cards.iter().cloned().collect();
        cards.sort_by_key(|id| catalog.weight_or(id, fallback));
        cards
    }
}

impl FromIterator<TrumpId> for TrumpHand {
    fn from_iter<I: IntoIterator<Item = TrumpId>>(iter: I) -> Self {
        Self {
            cards: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_remove() {
        let mut hand = TrumpHand::from_names(["Shield", "Shield", "Destroy"]);
        assert_eq!(hand.len(), 3);

        assert!(hand.remove_one(&TrumpId::new("shield")));
        assert_eq!(hand.len(), 2);
        assert!(hand.contains(&TrumpId::new("Shield")));
        assert!(!hand.remove_one(&TrumpId::new("Harvest")));
    }

    #[test]
    fn test_count_base() {
        let hand = TrumpHand::from_names(["Destroy", "Destroy+", "Shield"]);
        assert_eq!(hand.count_base(&TrumpId::new("Destroy")), 2);
    }

    #[test]
    fn test_by_weight() {
        let catalog = TrumpCatalog::builtin();
        let hand = TrumpHand::from_names(["Exchange", "One-Up", "Return"]);
        let ordered: Vec<_> = hand
            .by_weight(&catalog, 50)
            .into_iter()
            .map(|id| id.to_string())
            .collect();
        assert_eq!(ordered, vec!["one-up", "return", "exchange"]);
    }
}
