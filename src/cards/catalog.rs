//! Trump catalog: static registry of every known trump.
//!
//! Cards are stored in registration order and indexed by normalized name
//! and every alias. Registering a card whose name is already known
//! replaces the old record, which is how a rule-table document overrides
//! weights or adds aliases.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::trump::{
    AttackEffect, CardWipe, DrawForce, SpecialEffect, TrumpCard, TrumpEffect, TrumpId, WipeScope,
};
use crate::core::CardValue;

/// Failed catalog lookup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("unknown trump '{0}'")]
    Unknown(String),

    #[error("trump '{0}' is locked")]
    Locked(String),

    #[error("trump '{0}' cannot be held by the player")]
    NotObtainable(String),
}

/// Unlocked trump identities, as projected by the progress store.
///
/// `None` inside means "no projection supplied": every card counts as
/// available.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Availability {
    unlocked: Option<FxHashSet<TrumpId>>,
}

impl Availability {
    /// No projection: everything is available.
    #[must_use]
    pub fn unrestricted() -> Self {
        Self { unlocked: None }
    }

    /// Only these unlockable identities are available.
    #[must_use]
    pub fn from_unlocked<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            unlocked: Some(names.into_iter().map(|n| TrumpId::new(n.as_ref())).collect()),
        }
    }

    /// Can `card` be offered as addable?
    #[must_use]
    pub fn allows(&self, card: &TrumpCard) -> bool {
        match &self.unlocked {
            None => true,
            Some(set) => !card.unlockable || set.contains(&card.id),
        }
    }

    pub fn unlock(&mut self, id: TrumpId) {
        self.unlocked.get_or_insert_with(FxHashSet::default).insert(id);
    }
}

/// Registry of trump cards.
///
/// ## Example
///
/// ```
/// use duel21::cards::TrumpCatalog;
///
/// let catalog = TrumpCatalog::builtin();
/// let card = catalog.get("go for 24").unwrap();
/// assert_eq!(card.name, "Go for 24");
/// ```
#[derive(Clone, Debug, Default)]
pub struct TrumpCatalog {
    cards: Vec<TrumpCard>,
    index: FxHashMap<TrumpId, usize>,
}

impl TrumpCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a card, replacing any card with the same identity.
    pub fn register(&mut self, card: TrumpCard) {
        let slot = match self.index.get(&card.id) {
            Some(&slot) => {
                // Aliases of the replaced record no longer resolve.
                self.index.retain(|_, s| *s != slot);
                self.cards[slot] = card;
                slot
            }
            None => {
                self.cards.push(card);
                self.cards.len() - 1
            }
        };
        let card = &self.cards[slot];
        self.index.insert(card.id.clone(), slot);
        for alias in &card.aliases {
            self.index.insert(alias.clone(), slot);
        }
    }

    /// Look a card up by name or alias.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&TrumpCard> {
        self.get_id(&TrumpId::new(name))
    }

    #[must_use]
    pub fn get_id(&self, id: &TrumpId) -> Option<&TrumpCard> {
        self.index.get(id).map(|&slot| &self.cards[slot])
    }

    /// Look up, failing on unknown names.
    pub fn resolve(&self, name: &str) -> Result<&TrumpCard, CatalogError> {
        self.get(name)
            .ok_or_else(|| CatalogError::Unknown(name.to_string()))
    }

    /// Look up a card the player wants to add to their hand.
    pub fn resolve_addable(
        &self,
        name: &str,
        availability: &Availability,
    ) -> Result<&TrumpCard, CatalogError> {
        let card = self.resolve(name)?;
        if !card.obtainable {
            return Err(CatalogError::NotObtainable(card.name.clone()));
        }
        if !availability.allows(card) {
            return Err(CatalogError::Locked(card.name.clone()));
        }
        Ok(card)
    }

    /// Utility weight; `fallback` for unknown cards.
    #[must_use]
    pub(crate) fn weight_or(&self, id: &TrumpId, fallback: u8) -> u8 {
        self.get_id(id).map_or(fallback, |c| c.weight)
    }

    /// Player-obtainable cards the availability projection allows.
    pub fn addable<'a>(
        &'a self,
        availability: &'a Availability,
    ) -> impl Iterator<Item = &'a TrumpCard> + 'a {
        self.cards
            .iter()
            .filter(move |c| c.obtainable && availability.allows(c))
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrumpCard> {
        self.cards.iter()
    }

    /// Every trump known to the game.
    #[must_use]
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        for card in builtin_cards() {
            catalog.register(card);
        }
        catalog
    }
}

fn bet_up(raise: i32, trump_draws: u8, return_other_last: bool) -> TrumpEffect {
    TrumpEffect::BetModifier {
        raise_other: raise,
        trump_draws,
        return_other_last,
    }
}

fn wipe(trumps: WipeScope, lock_trumps: bool, cards: CardWipe) -> TrumpEffect {
    TrumpEffect::BoardWipe {
        trumps,
        lock_trumps,
        cards,
    }
}

fn attack(effect: AttackEffect) -> TrumpEffect {
    TrumpEffect::EnemyAttack(effect)
}

fn builtin_cards() -> Vec<TrumpCard> {
    let mut cards = vec![
        // === Bet modifiers ===
        TrumpCard::new("One-Up", bet_up(1, 1, false), 10),
        TrumpCard::new("Two-Up", bet_up(2, 1, false), 20),
        TrumpCard::new("Two-Up+", bet_up(2, 0, true), 50).unlockable(),
        // === Card manipulation ===
        TrumpCard::new("Remove", wipe(WipeScope::None, false, CardWipe::OtherLastFaceUp), 45),
        TrumpCard::new("Return", TrumpEffect::DrawForcer(DrawForce::ReturnOwnLast), 40),
        TrumpCard::new("Exchange", TrumpEffect::DrawForcer(DrawForce::ExchangeLast), 75),
        TrumpCard::new(
            "Perfect Draw",
            TrumpEffect::DrawForcer(DrawForce::Best {
                raise_other: 0,
                trump_draws: 0,
            }),
            80,
        ),
        TrumpCard::new(
            "Perfect Draw+",
            TrumpEffect::DrawForcer(DrawForce::Best {
                raise_other: 5,
                trump_draws: 0,
            }),
            90,
        )
        .unlockable(),
        TrumpCard::new(
            "Ultimate Draw",
            TrumpEffect::DrawForcer(DrawForce::Best {
                raise_other: 0,
                trump_draws: 2,
            }),
            100,
        )
        .unlockable(),
        TrumpCard::new("Love Your Enemy", TrumpEffect::DrawForcer(DrawForce::OtherDrawsBest), 60)
            .with_alias("LYE"),
        // === Trump management ===
        TrumpCard::new(
            "Trump Switch",
            TrumpEffect::Special(SpecialEffect::TrumpSwitch {
                discard: 2,
                draw: 3,
            }),
            20,
        ),
        TrumpCard::new(
            "Trump Switch+",
            TrumpEffect::Special(SpecialEffect::TrumpSwitch {
                discard: 1,
                draw: 4,
            }),
            30,
        )
        .unlockable(),
        TrumpCard::new("Harvest", TrumpEffect::Special(SpecialEffect::Harvest), 50).unlockable(),
        // === Defense ===
        TrumpCard::new("Shield", TrumpEffect::Defensive { lower_own: 1 }, 10),
        TrumpCard::new("Shield+", TrumpEffect::Defensive { lower_own: 2 }, 20).unlockable(),
        // === Counters ===
        TrumpCard::new("Destroy", wipe(WipeScope::Last, false, CardWipe::None), 60),
        TrumpCard::new("Destroy+", wipe(WipeScope::All, false, CardWipe::None), 90),
        TrumpCard::new("Destroy++", wipe(WipeScope::All, true, CardWipe::None), 100),
        // === Targets ===
        TrumpCard::new("Go for 24", TrumpEffect::TargetModifier { target: 24 }, 35)
            .with_alias("Go For 24")
            .unlockable(),
        TrumpCard::new("Go for 27", TrumpEffect::TargetModifier { target: 27 }, 40)
            .with_alias("Go For 27")
            .unlockable(),
        TrumpCard::new("Go for 17", TrumpEffect::TargetModifier { target: 17 }, 30)
            .with_alias("Go For 17")
            .obtainable(false),
        // === Enemy-only ===
        TrumpCard::new("Happiness", attack(AttackEffect::Happiness), 0),
        TrumpCard::new("Desire", attack(AttackEffect::Desire { full: false }), 0),
        TrumpCard::new("Desire+", attack(AttackEffect::Desire { full: true }), 0),
        TrumpCard::new("Mind Shift", attack(AttackEffect::MindShift { full: false }), 0),
        TrumpCard::new("Mind Shift+", attack(AttackEffect::MindShift { full: true }), 0),
        TrumpCard::new(
            "Shield Assault",
            attack(AttackEffect::ShieldAssault {
                raise_other: 3,
                shields: 3,
            }),
            0,
        )
        .with_alias("Sheild Assalt"),
        TrumpCard::new(
            "Shield Assault+",
            attack(AttackEffect::ShieldAssault {
                raise_other: 5,
                shields: 2,
            }),
            0,
        ),
        TrumpCard::new("Curse", attack(AttackEffect::Curse), 0),
        TrumpCard::new("Black Magic", attack(AttackEffect::BlackMagic), 0),
        TrumpCard::new("Conjure", attack(AttackEffect::Conjure), 0),
        TrumpCard::new("Dead Silence", attack(AttackEffect::DeadSilence), 0),
        TrumpCard::new("Twenty-One Up", attack(AttackEffect::TwentyOneUp), 0)
            .with_alias("21 Up"),
        TrumpCard::new("Escape", TrumpEffect::Special(SpecialEffect::Escape), 0),
        TrumpCard::new("Oblivion", TrumpEffect::Special(SpecialEffect::Oblivion), 0)
            .with_alias("Ovlivion"),
        TrumpCard::new("Desperation", TrumpEffect::Special(SpecialEffect::Desperation), 0),
    ];

    // Numbered draws, 2 through 7.
    for value in 2..=7u8 {
        if let Ok(card) = CardValue::new(value) {
            cards.push(
                TrumpCard::new(
                    &format!("{value} Card"),
                    TrumpEffect::DrawForcer(DrawForce::Number(card)),
                    15,
                )
                .with_alias(&format!("Draw {value}")),
            );
        }
    }
    cards
}
