//! The trump effect state machine.
//!
//! `TrumpEffectProcessor::apply` resolves one `TrumpPlay` against a round
//! and the player's hand. Work happens on clones; the caller receives either
//! the complete new state or an error, never a half-applied round.
//!
//! Effects are written relative to the owner: bet-ups raise the other
//! side's bet, shields lower the owner's own, Dead Silence locks the other
//! side's draws. Player plays and opponent interrupts differ only in which
//! hand is charged.

use tracing::{debug, info, warn};

use super::play::{Applied, EffectError, EffectEvent, Settlement, TrumpPlay};
use crate::cards::{
    AttackEffect, CardWipe, DrawForce, SpecialEffect, TrumpCard, TrumpCatalog, TrumpEffect,
    TrumpHand, TrumpId, WipeScope,
};
use crate::core::{
    validate_target, CardSet, CardValue, InputError, RoundState, Side, TableEntry, TableMark,
};

/// Black Magic uses allowed per fight.
pub const BLACK_MAGIC_LIMIT: u8 = 2;

/// Both bets under Desperation.
pub const DESPERATION_BET: i32 = 100;

/// Bet raise from Black Magic.
const BLACK_MAGIC_RAISE: i32 = 10;

/// Bet raise from Twenty-One Up.
const TWENTY_ONE_UP_RAISE: i32 = 21;

/// The card closest to bringing `total` onto `target`; ties go to the
/// smaller card.
///
/// ```
/// use duel21::core::{CardSet, CardValue};
/// use duel21::effects::best_card;
///
/// let c = |v| CardValue::new(v).unwrap();
/// let deck: CardSet = [2, 4, 9].into_iter().map(c).collect();
///
/// assert_eq!(best_card(deck, 17, 21), Some(c(4)));
/// assert_eq!(best_card(deck, 14, 21), Some(c(9)));
/// ```
#[must_use]
pub fn best_card(deck: CardSet, total: u8, target: u8) -> Option<CardValue> {
    let needed = i16::from(target) - i16::from(total);
    deck.iter()
        .min_by_key(|c| ((i16::from(c.get()) - needed).abs(), c.get()))
}

/// Applies trump effects to rounds.
#[derive(Clone, Debug)]
pub struct TrumpEffectProcessor {
    catalog: TrumpCatalog,
}

impl Default for TrumpEffectProcessor {
    fn default() -> Self {
        Self::new(TrumpCatalog::builtin())
    }
}

impl TrumpEffectProcessor {
    #[must_use]
    pub fn new(catalog: TrumpCatalog) -> Self {
        Self { catalog }
    }

    #[must_use]
    pub fn catalog(&self) -> &TrumpCatalog {
        &self.catalog
    }

    /// Resolve `play`. On error the inputs are untouched and nothing is
    /// returned but the reason.
    pub fn apply(
        &self,
        round: &RoundState,
        hand: &TrumpHand,
        play: &TrumpPlay,
    ) -> Result<Applied, EffectError> {
        match self.resolve(round, hand, play) {
            Ok(applied) => {
                debug!(
                    trump = %play.trump,
                    owner = %play.owner,
                    events = ?applied.events,
                    bet_player = applied.round.bet(Side::Player),
                    bet_opponent = applied.round.bet(Side::Opponent),
                    target = applied.round.target(),
                    "trump applied"
                );
                Ok(applied)
            }
            Err(err) => {
                warn!(trump = %play.trump, owner = %play.owner, %err, "trump rejected");
                Err(err)
            }
        }
    }

    fn resolve(
        &self,
        round: &RoundState,
        hand: &TrumpHand,
        play: &TrumpPlay,
    ) -> Result<Applied, EffectError> {
        let card = self.catalog.resolve(&play.trump)?;
        let mut r = Resolution {
            catalog: &self.catalog,
            play,
            owner: play.owner,
            round: round.clone(),
            hand: hand.clone(),
            events: Vec::new(),
        };

        r.charge(card)?;
        let harvesting = r.round.harvest_active(r.owner);
        r.run(card)?;
        if harvesting {
            r.grant(r.owner, 1);
        }
        r.finish()
    }

    /// Apply round-end effects (Mind Shift) before the round is discarded.
    ///
    /// `lost` lists the trumps the player saw disappear; its length must
    /// match what Mind Shift takes.
    pub fn settle_round_end(
        &self,
        round: &RoundState,
        hand: &TrumpHand,
        lost: &[TrumpId],
    ) -> Result<Settlement, EffectError> {
        let opponent_held = usize::from(round.opponent_trumps());
        let player_lost = round.mind_shift_loss(Side::Player, hand.len());
        let opponent_lost = round.mind_shift_loss(Side::Opponent, opponent_held);
        if lost.len() != player_lost {
            return Err(EffectError::ObservationRequired("the trumps lost to Mind Shift"));
        }

        let mut hand = hand.clone();
        for id in lost {
            if !hand.remove_one(id) {
                return Err(EffectError::NotHeld(id.clone()));
            }
        }
        if player_lost + opponent_lost > 0 {
            info!(player_lost, opponent_lost, "mind shift settled");
        }
        let opponent_trumps = u8::try_from(opponent_held - opponent_lost).unwrap_or(u8::MAX);
        Ok(Settlement {
            hand,
            opponent_trumps,
            player_lost,
            opponent_lost,
        })
    }
}

/// Working copy of one resolution.
struct Resolution<'a> {
    catalog: &'a TrumpCatalog,
    play: &'a TrumpPlay,
    owner: Side,
    round: RoundState,
    hand: TrumpHand,
    events: Vec<EffectEvent>,
}

impl Resolution<'_> {
    fn other(&self) -> Side {
        self.owner.other()
    }

    /// Take the trump out of its owner's hand.
    fn charge(&mut self, card: &TrumpCard) -> Result<(), EffectError> {
        if self.round.is_over() {
            return Err(InputError::RoundOver.into());
        }
        if self.round.trumps_locked(self.owner) {
            return Err(EffectError::TrumpsLocked(self.owner));
        }
        match self.owner {
            Side::Player => {
                let held = std::iter::once(&card.id)
                    .chain(card.aliases.iter())
                    .find(|id| self.hand.contains(id))
                    .cloned()
                    .ok_or_else(|| EffectError::NotHeld(card.id.clone()))?;
                self.hand.remove_one(&held);
            }
            Side::Opponent => {
                let left = self.round.opponent_trumps().saturating_sub(1);
                self.round.set_opponent_trumps(left);
            }
        }
        self.round.record_trump_played(self.owner);
        Ok(())
    }

    fn run(&mut self, card: &TrumpCard) -> Result<(), EffectError> {
        let owner = self.owner;
        let other = self.other();
        let entry = || TableEntry::new(card.id.clone(), owner);

        match card.effect {
            TrumpEffect::BetModifier {
                raise_other,
                trump_draws,
                return_other_last,
            } => {
                self.table(entry().with_bet(other, raise_other));
                if return_other_last && !self.round.face_up(other).is_empty() {
                    let returned = self.round.return_last(other)?;
                    self.events.push(EffectEvent::CardReturned {
                        side: other,
                        card: returned,
                    });
                }
                self.grant(owner, trump_draws);
            }

            TrumpEffect::DrawForcer(force) => match force {
                DrawForce::Number(value) => self.numbered_draw(value)?,
                DrawForce::Best {
                    raise_other,
                    trump_draws,
                } => {
                    if self.round.draws_locked(owner) {
                        return Err(EffectError::DrawsLocked(owner));
                    }
                    if let Some(pick) = self.best_for(owner)? {
                        self.draw(owner, pick)?;
                    }
                    if raise_other != 0 {
                        self.table(entry().with_bet(other, raise_other));
                    }
                    self.grant(owner, trump_draws);
                }
                DrawForce::ReturnOwnLast => {
                    let returned = self.round.return_last(owner)?;
                    self.events.push(EffectEvent::CardReturned {
                        side: owner,
                        card: returned,
                    });
                }
                DrawForce::ExchangeLast => {
                    self.round.exchange_last()?;
                    self.events.push(EffectEvent::CardsExchanged);
                }
                DrawForce::OtherDrawsBest => {
                    self.draw_compelled(other, |r| r.best_for(other))?;
                }
            },

            TrumpEffect::BoardWipe {
                trumps,
                lock_trumps,
                cards,
            } => {
                let removed = match trumps {
                    WipeScope::None => 0,
                    WipeScope::Last => self.remove_entries(Some(1), |e| e.owner == other),
                    WipeScope::All => self.remove_entries(None, |e| e.owner == other),
                };
                if trumps != WipeScope::None && removed == 0 && !lock_trumps {
                    return Err(EffectError::NothingToDestroy);
                }
                if lock_trumps {
                    self.table(entry().with_mark(TableMark::LockTrumps));
                }
                if cards == CardWipe::OtherLastFaceUp {
                    let killed = self.round.kill_last(other)?;
                    self.events.push(EffectEvent::CardKilled {
                        side: other,
                        card: killed,
                    });
                }
            }

            TrumpEffect::TargetModifier { target } => {
                let target = validate_target(target)?;
                self.remove_entries(None, |e| e.target.is_some());
                self.table(entry().with_target(target));
                self.events.push(EffectEvent::TargetChanged(target));
            }

            TrumpEffect::Defensive { lower_own } => {
                self.table(entry().with_bet(owner, -lower_own));
            }

            TrumpEffect::Special(special) => match special {
                SpecialEffect::TrumpSwitch { discard, draw } => {
                    self.strip(owner, usize::from(discard));
                    self.grant(owner, draw);
                }
                SpecialEffect::Harvest => self.table(entry().with_mark(TableMark::Harvest)),
                SpecialEffect::Escape => self.table(entry().with_mark(TableMark::EscapeDamage)),
                SpecialEffect::Oblivion => {
                    self.round.void();
                    self.events.push(EffectEvent::RoundVoided);
                }
                SpecialEffect::Desperation => {
                    let mut desperate = entry().with_mark(TableMark::LockDraws);
                    for side in Side::BOTH {
                        desperate = desperate.with_bet(side, DESPERATION_BET - self.round.bet(side));
                    }
                    self.table(desperate);
                }
            },

            TrumpEffect::EnemyAttack(attack) => self.attack(attack, card)?,

            TrumpEffect::Unmodeled(_) => return Err(EffectError::Unmodeled(card.id.clone())),
        }
        Ok(())
    }

    fn attack(&mut self, attack: AttackEffect, card: &TrumpCard) -> Result<(), EffectError> {
        let owner = self.owner;
        let other = self.other();
        let entry = || TableEntry::new(card.id.clone(), owner);

        match attack {
            AttackEffect::Happiness => {
                self.grant(owner, 1);
                self.grant(other, 1);
            }
            AttackEffect::Desire { full } => {
                let held = self.held(other);
                let raise = if full { held } else { held / 2 };
                let raise = i32::try_from(raise).unwrap_or(i32::MAX);
                self.table(entry().with_bet(other, raise));
            }
            AttackEffect::MindShift { full } => {
                let plays_to_block = if full { 3 } else { 2 };
                self.table(entry().with_mark(TableMark::MindShift {
                    plays_to_block,
                    lose_all: full,
                }));
            }
            AttackEffect::ShieldAssault {
                raise_other,
                shields,
            } => {
                let catalog = self.catalog;
                self.remove_entries(Some(usize::from(shields)), |e| {
                    e.owner == owner
                        && matches!(
                            catalog.get_id(&e.trump).map(|c| c.effect),
                            Some(TrumpEffect::Defensive { .. })
                        )
                });
                self.table(entry().with_bet(other, raise_other));
            }
            AttackEffect::Curse => {
                self.strip(other, 1);
                self.draw_compelled(other, |r| r.highest())?;
            }
            AttackEffect::BlackMagic => {
                if self.round.black_magic_uses() >= BLACK_MAGIC_LIMIT {
                    return Err(EffectError::BlackMagicExhausted);
                }
                let half = self.held(other) / 2;
                self.strip(other, half);
                self.table(entry().with_bet(other, BLACK_MAGIC_RAISE));
                self.draw_compelled(owner, |r| r.best_for(owner))?;
                self.round.record_black_magic();
            }
            AttackEffect::Conjure => {
                self.grant(owner, 3);
                self.table(entry().with_bet(owner, 1));
            }
            AttackEffect::DeadSilence => self.table(entry().with_mark(TableMark::LockDraws)),
            AttackEffect::TwentyOneUp => self.table(
                entry()
                    .with_bet(other, TWENTY_ONE_UP_RAISE)
                    .with_mark(TableMark::ExactTarget),
            ),
        }
        Ok(())
    }

    /// 2-7 Card. When the card is in `remaining` but did not come out of the
    /// deck, the opponent must be holding it face down.
    fn numbered_draw(&mut self, value: CardValue) -> Result<(), EffectError> {
        if self.round.draws_locked(self.owner) {
            return Err(EffectError::DrawsLocked(self.owner));
        }
        let in_remaining = self.round.remaining().contains(value);
        match (in_remaining, self.play.drawn) {
            (true, Some(false)) => {
                self.round.confirm_opponent_hidden(value)?;
                self.events.push(EffectEvent::HiddenConfirmed(value));
            }
            (true, _) => self.draw(self.owner, value)?,
            (false, Some(true)) => return Err(InputError::NotInDeck(value).into()),
            (false, _) => self.events.push(EffectEvent::NothingDrawn(value)),
        }
        Ok(())
    }

    /// The deck as it really is, once the opponent's hidden card is known.
    fn known_deck(&self) -> Option<CardSet> {
        self.round
            .opponent_hidden()
            .confirmed()
            .map(|_| self.round.remaining())
    }

    fn side_total(&self, side: Side) -> Option<u8> {
        match side {
            Side::Player => Some(self.round.player_total()),
            Side::Opponent => self
                .round
                .opponent_hidden()
                .confirmed()
                .map(|c| self.round.visible_total(Side::Opponent) + c.get()),
        }
    }

    /// The best card for `side`, observed or computed.
    fn best_for(&self, side: Side) -> Result<Option<CardValue>, EffectError> {
        if let Some(card) = self.play.observed {
            return Ok(Some(card));
        }
        let required = EffectError::ObservationRequired("the card that was drawn");
        let deck = self.known_deck().ok_or(required.clone())?;
        let total = self.side_total(side).ok_or(required)?;
        Ok(best_card(deck, total, self.round.target()))
    }

    /// The highest card left in the deck, observed or computed.
    fn highest(&self) -> Result<Option<CardValue>, EffectError> {
        if let Some(card) = self.play.observed {
            return Ok(Some(card));
        }
        self.known_deck()
            .map(CardSet::max)
            .ok_or(EffectError::ObservationRequired("the card that was drawn"))
    }

    fn draw(&mut self, side: Side, card: CardValue) -> Result<(), EffectError> {
        self.round.draw(side, card)?;
        self.events.push(EffectEvent::CardDrawn { side, card });
        Ok(())
    }

    /// A draw the side cannot refuse. Locked draws skip it.
    fn draw_compelled(
        &mut self,
        side: Side,
        pick: impl FnOnce(&Self) -> Result<Option<CardValue>, EffectError>,
    ) -> Result<(), EffectError> {
        if self.round.draws_locked(side) {
            self.events.push(EffectEvent::DrawBlocked(side));
            return Ok(());
        }
        if let Some(card) = pick(self)? {
            self.draw(side, card)?;
        }
        Ok(())
    }

    fn table(&mut self, entry: TableEntry) {
        self.events.push(EffectEvent::TableEntryAdded(entry.trump.clone()));
        self.round.table_mut().push_back(entry);
    }

    /// Remove matching entries, newest first.
    fn remove_entries(
        &mut self,
        limit: Option<usize>,
        matches: impl Fn(&TableEntry) -> bool,
    ) -> usize {
        let table = self.round.table_mut();
        let mut removed = 0;
        let mut idx = table.len();
        while idx > 0 && limit.map_or(true, |l| removed < l) {
            idx -= 1;
            if matches(&table[idx]) {
                table.remove(idx);
                removed += 1;
            }
        }
        if removed > 0 {
            self.events.push(EffectEvent::TableEntriesRemoved(removed));
        }
        removed
    }

    fn held(&self, side: Side) -> usize {
        match side {
            Side::Player => self.hand.len(),
            Side::Opponent => usize::from(self.round.opponent_trumps()),
        }
    }

    /// `side` draws trumps. The player's draws are read from the play.
    fn grant(&mut self, side: Side, count: u8) {
        if side == Side::Opponent && count > 0 {
            let held = self.round.opponent_trumps().saturating_add(count);
            self.round.set_opponent_trumps(held);
            self.events.push(EffectEvent::TrumpsGained {
                side,
                count: usize::from(count),
            });
        }
    }

    /// `side` loses trumps. The player's losses are read from the play.
    fn strip(&mut self, side: Side, count: usize) {
        if side == Side::Opponent {
            let held = self.round.opponent_trumps();
            let lost = u8::try_from(count).unwrap_or(u8::MAX).min(held);
            if lost > 0 {
                self.round.set_opponent_trumps(held - lost);
                self.events.push(EffectEvent::TrumpsLost {
                    side,
                    count: usize::from(lost),
                });
            }
        }
    }

    /// Apply the player's observed hand changes and hand back the result.
    fn finish(mut self) -> Result<Applied, EffectError> {
        for id in &self.play.lost {
            if !self.hand.remove_one(id) {
                return Err(EffectError::NotHeld(id.clone()));
            }
        }
        if !self.play.lost.is_empty() {
            self.events.push(EffectEvent::TrumpsLost {
                side: Side::Player,
                count: self.play.lost.len(),
            });
        }
        for id in &self.play.gained {
            self.hand.add(id.clone());
        }
        if !self.play.gained.is_empty() {
            self.events.push(EffectEvent::TrumpsGained {
                side: Side::Player,
                count: self.play.gained.len(),
            });
        }
        Ok(Applied {
            round: self.round,
            hand: self.hand,
            events: self.events,
        })
    }
}
