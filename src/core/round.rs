//! Round state: hands, bets, target and the trumps on the table.
//!
//! ## Ownership of derived values
//!
//! Bets and the target are never stored directly. They are derived from the
//! base bets plus the `TableEntry` list, so removing a trump from the table
//! (Destroy and friends) reverts its effects without bookkeeping:
//!
//! - `bet(side) = max(0, base_bet[side] + sum of bet deltas on the table)`
//! - `target()  = most recent target entry on the table, else 21`
//!
//! The remaining deck is likewise derived from the accounted cards.
//!
//! ## Mutation
//!
//! Every mutator validates before touching state and returns
//! `InputError` on failure, leaving the round unchanged. The effect
//! processor applies whole effects to a clone; `im::Vector` keeps that
//! clone O(1).

use im::Vector;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::info;

use super::card::{CardSet, CardValue};
use super::deck::DeckState;
use super::error::InputError;
use super::side::{Side, SideMap};
use crate::cards::TrumpId;

/// Target score with no target trump on the table.
pub const BASE_TARGET: u8 = 21;

/// Targets reachable through target-modifier trumps.
pub const SUPPORTED_TARGETS: [u8; 4] = [17, 21, 24, 27];

/// Validate a target value.
pub fn validate_target(target: u8) -> Result<u8, InputError> {
    if SUPPORTED_TARGETS.contains(&target) {
        Ok(target)
    } else {
        Err(InputError::UnsupportedTarget(target))
    }
}

/// What the player knows about the opponent's face-down card.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HiddenCard {
    /// Nothing known: uniform over the remaining deck.
    #[default]
    Unknown,
    /// Uniform over these candidates (intersected with the remaining deck).
    Distribution(CardSet),
    /// Known with certainty.
    Confirmed(CardValue),
}

impl HiddenCard {
    /// Candidate values given the cards still unaccounted for.
    #[must_use]
    pub fn candidates(self, deck: CardSet) -> CardSet {
        match self {
            HiddenCard::Unknown => deck,
            HiddenCard::Distribution(set) => set.intersection(deck),
            HiddenCard::Confirmed(card) => CardSet::single(card),
        }
    }

    #[must_use]
    pub const fn confirmed(self) -> Option<CardValue> {
        match self {
            HiddenCard::Confirmed(card) => Some(card),
            _ => None,
        }
    }
}

/// Declared opponent behavior for the rest of the round.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OpponentStance {
    /// Still drawing according to its thresholds.
    #[default]
    Drawing,
    /// Confirmed stay: no more draws.
    Stayed,
    /// Draws exactly one more card, then stops.
    ForcedDraw,
}

/// Persistent "while on table" behavior attached to a table entry.
///
/// Marks are relative to the entry's owner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TableMark {
    #[default]
    None,
    /// The owner's opponent cannot draw cards.
    LockDraws,
    /// The owner's opponent cannot play trumps.
    LockTrumps,
    /// The owner takes no damage when losing.
    EscapeDamage,
    /// The owner's opponent must finish exactly on target.
    ExactTarget,
    /// The owner's opponent loses trumps at round end unless it plays
    /// `plays_to_block` trumps this round.
    MindShift { plays_to_block: u8, lose_all: bool },
    /// The owner draws a trump after each trump it plays.
    Harvest,
}

/// A trump sitting on the table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableEntry {
    /// Which trump.
    pub trump: TrumpId,
    /// Who played it.
    pub owner: Side,
    /// Bet change applied while on the table.
    pub bet_delta: SideMap<i32>,
    /// Target set while on the table.
    pub target: Option<u8>,
    /// Persistent behavior.
    pub mark: TableMark,
}

impl TableEntry {
    /// An entry with no effect of its own.
    #[must_use]
    pub fn new(trump: TrumpId, owner: Side) -> Self {
        Self {
            trump,
            owner,
            bet_delta: SideMap::with_value(0),
            target: None,
            mark: TableMark::None,
        }
    }

    /// Add a bet change for `side`.
    #[must_use]
    pub fn with_bet(mut self, side: Side, delta: i32) -> Self {
        self.bet_delta[side] += delta;
        self
    }

    #[must_use]
    pub fn with_target(mut self, target: u8) -> Self {
        self.target = Some(target);
        self
    }

    #[must_use]
    pub fn with_mark(mut self, mark: TableMark) -> Self {
        self.mark = mark;
        self
    }
}

/// Lifecycle of a round.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoundStatus {
    #[default]
    InPlay,
    /// Cancelled (Oblivion, Escape reset). No damage, no legal actions.
    Voided,
}

/// Snapshot of one round.
///
/// ## Example
///
/// ```
/// use duel21::core::{CardValue, RoundState};
///
/// let c = |v| CardValue::new(v).unwrap();
/// let round = RoundState::from_cards(&[c(10), c(6)], &[c(8)]).unwrap();
///
/// assert_eq!(round.player_total(), 16);
/// assert_eq!(round.remaining().len(), 8);
/// assert_eq!(round.target(), 21);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundState {
    // === Cards ===
    player_hidden: Option<CardValue>,
    face_up: SideMap<SmallVec<[CardValue; 6]>>,
    opponent_hidden: HiddenCard,
    stance: OpponentStance,
    dead: CardSet,

    // === Bets and table ===
    base_bet: SideMap<i32>,
    table: Vector<TableEntry>,

    // === Trump bookkeeping ===
    trumps_played: SideMap<u8>,
    opponent_trumps: u8,
    black_magic_uses: u8,

    status: RoundStatus,
}

impl Default for RoundState {
    fn default() -> Self {
        Self::new()
    }
}

impl RoundState {
    /// An empty round: no cards dealt, both bets 1.
    #[must_use]
    pub fn new() -> Self {
        Self {
            player_hidden: None,
            face_up: SideMap::default(),
            opponent_hidden: HiddenCard::Unknown,
            stance: OpponentStance::Drawing,
            dead: CardSet::EMPTY,
            base_bet: SideMap::with_value(1),
            table: Vector::new(),
            trumps_played: SideMap::with_value(0),
            opponent_trumps: 0,
            black_magic_uses: 0,
            status: RoundStatus::InPlay,
        }
    }

    /// Opening deal: the player's face-down and face-up cards plus the
    /// opponent's face-up card.
    pub fn deal(
        player_hidden: CardValue,
        player_up: CardValue,
        opponent_up: CardValue,
    ) -> Result<Self, InputError> {
        let mut round = Self::new();
        round.set_player_hidden(player_hidden)?;
        round.draw(Side::Player, player_up)?;
        round.draw(Side::Opponent, opponent_up)?;
        Ok(round)
    }

    /// A round from face-up card lists, in draw order.
    pub fn from_cards(player: &[CardValue], opponent: &[CardValue]) -> Result<Self, InputError> {
        let mut round = Self::new();
        for &card in player {
            round.draw(Side::Player, card)?;
        }
        for &card in opponent {
            round.draw(Side::Opponent, card)?;
        }
        Ok(round)
    }

    /// Set the starting bets.
    #[must_use]
    pub fn with_base_bets(mut self, player: i32, opponent: i32) -> Self {
        self.base_bet = SideMap::new(player, opponent);
        self
    }

    /// Carry the opponent's trump count into this round.
    #[must_use]
    pub fn with_opponent_trumps(mut self, count: u8) -> Self {
        self.opponent_trumps = count;
        self
    }

    /// Carry the fight's Black Magic usage into this round.
    #[must_use]
    pub fn with_black_magic_uses(mut self, uses: u8) -> Self {
        self.black_magic_uses = uses;
        self
    }

    #[must_use]
    pub fn with_stance(mut self, stance: OpponentStance) -> Self {
        self.stance = stance;
        self
    }

    // === Card queries ===

    #[must_use]
    pub fn player_hidden(&self) -> Option<CardValue> {
        self.player_hidden
    }

    /// Face-up cards of a side, in draw order.
    #[must_use]
    pub fn face_up(&self, side: Side) -> &[CardValue] {
        &self.face_up[side]
    }

    /// Most recently drawn face-up card of a side.
    #[must_use]
    pub fn last_face_up(&self, side: Side) -> Option<CardValue> {
        self.face_up[side].last().copied()
    }

    #[must_use]
    pub fn opponent_hidden(&self) -> HiddenCard {
        self.opponent_hidden
    }

    #[must_use]
    pub fn stance(&self) -> OpponentStance {
        self.stance
    }

    #[must_use]
    pub fn dead(&self) -> CardSet {
        self.dead
    }

    /// Sum of a side's face-up cards.
    #[must_use]
    pub fn visible_total(&self, side: Side) -> u8 {
        self.face_up[side].iter().map(|c| c.get()).sum()
    }

    /// The player's full total (face-down card included once entered).
    #[must_use]
    pub fn player_total(&self) -> u8 {
        self.visible_total(Side::Player) + self.player_hidden.map_or(0, CardValue::get)
    }

    /// The opponent's total as far as it is known: face-up cards plus a
    /// confirmed hidden card.
    #[must_use]
    pub fn opponent_known_total(&self) -> u8 {
        self.visible_total(Side::Opponent)
            + self.opponent_hidden.confirmed().map_or(0, CardValue::get)
    }

    /// Every card the round has accounted for.
    #[must_use]
    pub fn accounted(&self) -> CardSet {
        let mut set = self.dead;
        for side in Side::BOTH {
            for &card in &self.face_up[side] {
                set.insert(card);
            }
        }
        if let Some(card) = self.player_hidden {
            set.insert(card);
        }
        if let Some(card) = self.opponent_hidden.confirmed() {
            set.insert(card);
        }
        set
    }

    /// Cards still drawable from the player's point of view.
    #[must_use]
    pub fn remaining(&self) -> CardSet {
        self.deck().remaining()
    }

    #[must_use]
    pub fn deck(&self) -> DeckState {
        DeckState::from_accounted(self.accounted())
    }

    // === Table queries ===

    /// Trumps on the table, oldest first.
    #[must_use]
    pub fn table(&self) -> &Vector<TableEntry> {
        &self.table
    }

    #[must_use]
    pub fn base_bet(&self, side: Side) -> i32 {
        self.base_bet[side]
    }

    /// Effective bet: base plus every table delta, never negative.
    #[must_use]
    pub fn bet(&self, side: Side) -> i32 {
        let delta: i32 = self.table.iter().map(|e| e.bet_delta[side]).sum();
        (self.base_bet[side] + delta).max(0)
    }

    /// Active target.
    #[must_use]
    pub fn target(&self) -> u8 {
        self.table
            .iter()
            .rev()
            .find_map(|e| e.target)
            .unwrap_or(BASE_TARGET)
    }

    fn marked_against(&self, side: Side, mark: TableMark) -> bool {
        self.table
            .iter()
            .any(|e| e.owner == side.other() && e.mark == mark)
    }

    /// Can `side` not draw cards (Dead Silence, Desperation)?
    #[must_use]
    pub fn draws_locked(&self, side: Side) -> bool {
        self.marked_against(side, TableMark::LockDraws)
    }

    /// Can `side` not play trumps (Destroy++)?
    #[must_use]
    pub fn trumps_locked(&self, side: Side) -> bool {
        self.marked_against(side, TableMark::LockTrumps)
    }

    /// Must `side` finish exactly on target (Twenty-One Up)?
    #[must_use]
    pub fn exact_target_required(&self, side: Side) -> bool {
        self.marked_against(side, TableMark::ExactTarget)
    }

    /// Is `side` protected from damage (Escape)?
    #[must_use]
    pub fn escape_active(&self, side: Side) -> bool {
        self.table
            .iter()
            .any(|e| e.owner == side && e.mark == TableMark::EscapeDamage)
    }

    /// Does `side` draw a trump after each trump it plays (Harvest)?
    #[must_use]
    pub fn harvest_active(&self, side: Side) -> bool {
        self.table
            .iter()
            .any(|e| e.owner == side && e.mark == TableMark::Harvest)
    }

    /// Trumps `victim` loses at round end to Mind Shift, given its hand size.
    #[must_use]
    pub fn mind_shift_loss(&self, victim: Side, held: usize) -> usize {
        let played = self.trumps_played[victim];
        self.table
            .iter()
            .filter(|e| e.owner == victim.other())
            .filter_map(|e| match e.mark {
                TableMark::MindShift {
                    plays_to_block,
                    lose_all,
                } if played < plays_to_block => Some(if lose_all { held } else { held / 2 }),
                _ => None,
            })
            .max()
            .unwrap_or(0)
    }

    // === Trump bookkeeping ===

    #[must_use]
    pub fn trumps_played(&self, side: Side) -> u8 {
        self.trumps_played[side]
    }

    /// Number of trumps the opponent holds.
    #[must_use]
    pub fn opponent_trumps(&self) -> u8 {
        self.opponent_trumps
    }

    #[must_use]
    pub fn black_magic_uses(&self) -> u8 {
        self.black_magic_uses
    }

    #[must_use]
    pub fn status(&self) -> RoundStatus {
        self.status
    }

    #[must_use]
    pub fn is_over(&self) -> bool {
        self.status == RoundStatus::Voided
    }

    // === Validated mutation ===

    fn check_in_play(&self) -> Result<(), InputError> {
        if self.is_over() {
            Err(InputError::RoundOver)
        } else {
            Ok(())
        }
    }

    fn check_drawable(&self, card: CardValue) -> Result<(), InputError> {
        if self.remaining().contains(card) {
            Ok(())
        } else if self.dead.contains(card) {
            Err(InputError::NotInDeck(card))
        } else {
            Err(InputError::Duplicate(card))
        }
    }

    /// Enter the player's face-down card.
    pub fn set_player_hidden(&mut self, card: CardValue) -> Result<(), InputError> {
        self.check_in_play()?;
        if self.player_hidden == Some(card) {
            return Ok(());
        }
        self.check_drawable(card)?;
        self.player_hidden = Some(card);
        Ok(())
    }

    /// Record a face-up card drawn by `side`.
    pub fn draw(&mut self, side: Side, card: CardValue) -> Result<(), InputError> {
        self.check_in_play()?;
        self.check_drawable(card)?;
        self.face_up[side].push(card);
        Ok(())
    }

    /// Mark a remaining card as dead for the rest of the round.
    pub fn add_dead(&mut self, card: CardValue) -> Result<(), InputError> {
        self.check_in_play()?;
        self.check_drawable(card)?;
        self.dead.insert(card);
        Ok(())
    }

    /// Pin the opponent's hidden card to a single value.
    ///
    /// One-way: only an effect that changes the opponent's hand can undo it.
    pub fn confirm_opponent_hidden(&mut self, card: CardValue) -> Result<(), InputError> {
        self.check_in_play()?;
        match self.opponent_hidden {
            HiddenCard::Confirmed(known) if known == card => return Ok(()),
            HiddenCard::Confirmed(_) => {
                return Err(InputError::HiddenContradiction {
                    declared: card,
                    reason: "a different value is already confirmed",
                })
            }
            HiddenCard::Distribution(set) if !set.contains(card) => {
                return Err(InputError::HiddenContradiction {
                    declared: card,
                    reason: "value lies outside the known candidates",
                })
            }
            _ => {}
        }
        self.check_drawable(card)?;
        self.opponent_hidden = HiddenCard::Confirmed(card);
        info!(card = card.get(), "opponent hidden card confirmed");
        Ok(())
    }

    /// Restrict the opponent's hidden card to `candidates`.
    pub fn narrow_opponent_hidden(&mut self, candidates: CardSet) -> Result<(), InputError> {
        self.check_in_play()?;
        let current = self.opponent_hidden.candidates(self.remaining());
        let narrowed = current.intersection(candidates);
        match (self.opponent_hidden, narrowed.len()) {
            (HiddenCard::Confirmed(_), _) => Ok(()),
            (_, 0) => Err(InputError::NoCandidates),
            _ => {
                self.opponent_hidden = HiddenCard::Distribution(narrowed);
                Ok(())
            }
        }
    }

    pub fn set_stance(&mut self, stance: OpponentStance) {
        self.stance = stance;
    }

    /// Send `side`'s last face-up card back to the deck.
    pub fn return_last(&mut self, side: Side) -> Result<CardValue, InputError> {
        self.check_in_play()?;
        self.face_up[side].pop().ok_or(InputError::NoFaceUpCard(side))
    }

    /// Move `side`'s last face-up card to the dead set.
    pub fn kill_last(&mut self, side: Side) -> Result<CardValue, InputError> {
        self.check_in_play()?;
        let card = self.face_up[side].pop().ok_or(InputError::NoFaceUpCard(side))?;
        self.dead.insert(card);
        Ok(card)
    }

    /// Swap the last face-up cards of both sides.
    pub fn exchange_last(&mut self) -> Result<(), InputError> {
        self.check_in_play()?;
        for side in Side::BOTH {
            if self.face_up[side].is_empty() {
                return Err(InputError::NoFaceUpCard(side));
            }
        }
        let player = self.face_up[Side::Player].pop();
        let opponent = self.face_up[Side::Opponent].pop();
        if let (Some(player), Some(opponent)) = (player, opponent) {
            self.face_up[Side::Player].push(opponent);
            self.face_up[Side::Opponent].push(player);
        }
        Ok(())
    }

    // === Crate-internal mutation (effect processor) ===

    pub(crate) fn table_mut(&mut self) -> &mut Vector<TableEntry> {
        &mut self.table
    }

    pub(crate) fn record_trump_played(&mut self, side: Side) {
        self.trumps_played[side] = self.trumps_played[side].saturating_add(1);
    }

    pub(crate) fn set_opponent_trumps(&mut self, count: u8) {
        self.opponent_trumps = count;
    }

    pub(crate) fn record_black_magic(&mut self) {
        self.black_magic_uses = self.black_magic_uses.saturating_add(1);
    }

    /// Cancel the round.
    pub fn void(&mut self) {
        self.status = RoundStatus::Voided;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(v: u8) -> CardValue {
        CardValue::new(v).unwrap()
    }

    fn entry(name: &str, owner: Side) -> TableEntry {
        TableEntry::new(TrumpId::new(name), owner)
    }

    #[test]
    fn test_remaining_example() {
        let round = RoundState::from_cards(&[card(10), card(6)], &[card(8)]).unwrap();
        let expected: CardSet = [1, 2, 3, 4, 5, 7, 9, 11].into_iter().map(card).collect();
        assert_eq!(round.remaining(), expected);
        assert_eq!(round.player_total(), 16);
        assert_eq!(round.visible_total(Side::Opponent), 8);
    }

    #[test]
    fn test_deal_includes_hidden_in_total_only() {
        let round = RoundState::deal(card(9), card(4), card(2)).unwrap();
        assert_eq!(round.player_total(), 13);
        assert_eq!(round.visible_total(Side::Player), 4);
        assert!(!round.remaining().contains(card(9)));
    }

    #[test]
    fn test_duplicate_rejected_without_change() {
        let mut round = RoundState::from_cards(&[card(5)], &[]).unwrap();
        let before = round.clone();
        assert_eq!(round.draw(Side::Opponent, card(5)), Err(InputError::Duplicate(card(5))));
        assert_eq!(round, before);
    }

    #[test]
    fn test_dead_card_not_drawable() {
        let mut round = RoundState::new();
        round.add_dead(card(7)).unwrap();
        assert_eq!(round.draw(Side::Player, card(7)), Err(InputError::NotInDeck(card(7))));
    }

    #[test]
    fn test_bets_follow_table() {
        let mut round = RoundState::new();
        round
            .table_mut()
            .push_back(entry("two-up", Side::Player).with_bet(Side::Opponent, 2));
        round
            .table_mut()
            .push_back(entry("shield", Side::Player).with_bet(Side::Player, -2));

        assert_eq!(round.bet(Side::Opponent), 3);
        assert_eq!(round.bet(Side::Player), 0);

        round.table_mut().clear();
        assert_eq!(round.bet(Side::Opponent), 1);
    }

    #[test]
    fn test_target_is_latest_on_table() {
        let mut round = RoundState::new();
        assert_eq!(round.target(), BASE_TARGET);

        round
            .table_mut()
            .push_back(entry("go for 24", Side::Player).with_target(24));
        round
            .table_mut()
            .push_back(entry("go for 17", Side::Opponent).with_target(17));
        assert_eq!(round.target(), 17);

        round.table_mut().pop_back();
        assert_eq!(round.target(), 24);
    }

    #[test]
    fn test_locks_apply_to_other_side() {
        let mut round = RoundState::new();
        round
            .table_mut()
            .push_back(entry("dead silence", Side::Opponent).with_mark(TableMark::LockDraws));

        assert!(round.draws_locked(Side::Player));
        assert!(!round.draws_locked(Side::Opponent));
    }

    #[test]
    fn test_confirm_hidden_is_one_way() {
        let mut round = RoundState::from_cards(&[card(10)], &[card(3)]).unwrap();
        round.confirm_opponent_hidden(card(5)).unwrap();

        assert_eq!(round.opponent_hidden(), HiddenCard::Confirmed(card(5)));
        assert!(!round.remaining().contains(card(5)));
        assert_eq!(round.opponent_known_total(), 8);
        assert!(matches!(
            round.confirm_opponent_hidden(card(6)),
            Err(InputError::HiddenContradiction { .. })
        ));
    }

    #[test]
    fn test_narrow_hidden() {
        let mut round = RoundState::new();
        let set: CardSet = [2, 3].into_iter().map(card).collect();
        round.narrow_opponent_hidden(set).unwrap();
        assert_eq!(round.opponent_hidden().candidates(round.remaining()), set);

        let other: CardSet = [9].into_iter().map(card).collect();
        assert!(round.narrow_opponent_hidden(other).is_err());
    }

    #[test]
    fn test_exchange_last() {
        let mut round = RoundState::from_cards(&[card(2), card(9)], &[card(4)]).unwrap();
        round.exchange_last().unwrap();
        assert_eq!(round.face_up(Side::Player), &[card(2), card(4)]);
        assert_eq!(round.face_up(Side::Opponent), &[card(9)]);
    }

    #[test]
    fn test_mind_shift_loss() {
        let mut round = RoundState::new();
        round.table_mut().push_back(entry("mind shift", Side::Opponent).with_mark(
            TableMark::MindShift {
                plays_to_block: 2,
                lose_all: false,
            },
        ));
        assert_eq!(round.mind_shift_loss(Side::Player, 5), 2);

        round.record_trump_played(Side::Player);
        round.record_trump_played(Side::Player);
        assert_eq!(round.mind_shift_loss(Side::Player, 5), 0);
    }

    #[test]
    fn test_voided_round_rejects_input() {
        let mut round = RoundState::new();
        round.void();
        assert_eq!(round.draw(Side::Player, card(1)), Err(InputError::RoundOver));
    }
}
