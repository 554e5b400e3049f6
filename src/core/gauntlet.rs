//! State carried across rounds and fights.
//!
//! A `GauntletContext` is owned by the session and threaded by reference
//! into the advisor. Only `record` and `start_fight` mutate it; the odds
//! engine never does.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::round::{RoundState, BASE_TARGET};
use super::side::Side;

/// Game mode: fixes HP, fight count and boss positions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameMode {
    /// Single fight against Lucas.
    #[default]
    Normal,
    /// Five fights, 5 HP.
    Survival,
    /// Ten fights, 10 HP, bosses at 5 and 10.
    SurvivalPlus,
}

impl GameMode {
    /// Starting HP for both sides.
    #[must_use]
    pub const fn hp(self) -> u32 {
        match self {
            GameMode::Normal | GameMode::SurvivalPlus => 10,
            GameMode::Survival => 5,
        }
    }

    #[must_use]
    pub const fn fights(self) -> u32 {
        match self {
            GameMode::Normal => 1,
            GameMode::Survival => 5,
            GameMode::SurvivalPlus => 10,
        }
    }

    /// 1-based fight indices that are boss fights.
    #[must_use]
    pub const fn boss_fights(self) -> &'static [u32] {
        match self {
            GameMode::Normal => &[],
            GameMode::Survival => &[5],
            GameMode::SurvivalPlus => &[5, 10],
        }
    }
}

/// How a round ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoundResult {
    Win,
    Loss,
    Tie,
    /// Cancelled; no damage either way.
    Void,
}

/// Challenge objectives the advisor can steer toward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Objective {
    BeatNormal,
    BeatSurvival,
    BeatSurvivalPlus,
    /// Win a round while bust.
    BustWin,
    /// Play fifteen or more trumps in one round.
    FifteenTrumps,
    NoDamageSurvival,
    NoDamageSurvivalPlus,
    /// Finish on exactly 21 three rounds in a row.
    ThreeTwentyOnes,
    OpponentsDefeated,
}

/// One concluded round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundRecord {
    pub fight: u32,
    pub round: u32,
    pub result: RoundResult,
    pub player_total: u8,
    pub opponent_total: u8,
    pub target: u8,
    pub damage_taken: u32,
    pub damage_dealt: u32,
    /// Objectives completed by this round.
    pub completed: Vec<Objective>,
}

/// Fight and gauntlet progress.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GauntletContext {
    pub mode: GameMode,
    /// 1-based fight index.
    pub fight: u32,
    /// 1-based round index within the fight.
    pub round: u32,
    pub player_hp: u32,
    pub player_max_hp: u32,
    pub opponent_hp: u32,
    pub opponent_max_hp: u32,
    pub opponents_defeated: u32,
    /// Trumps the opponent holds at the start of the next round.
    pub opponent_trumps: u8,
    /// Black Magic plays this fight.
    pub black_magic_uses: u8,
    /// Consecutive rounds finished on exactly 21.
    pub perfect_streak: u8,
    /// Damage the player has taken over the gauntlet.
    pub damage_taken: u32,
    pub outstanding: FxHashSet<Objective>,
    pub history: Vec<RoundRecord>,
}

impl GauntletContext {
    /// A gauntlet at the first round of the first fight.
    #[must_use]
    pub fn new(mode: GameMode) -> Self {
        Self {
            mode,
            fight: 1,
            round: 1,
            player_hp: mode.hp(),
            player_max_hp: mode.hp(),
            opponent_hp: mode.hp(),
            opponent_max_hp: mode.hp(),
            opponents_defeated: 0,
            opponent_trumps: 0,
            black_magic_uses: 0,
            perfect_streak: 0,
            damage_taken: 0,
            outstanding: FxHashSet::default(),
            history: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_objectives(mut self, objectives: impl IntoIterator<Item = Objective>) -> Self {
        self.outstanding.extend(objectives);
        self
    }

    #[must_use]
    pub fn with_player_hp(mut self, hp: u32) -> Self {
        self.player_hp = hp.min(self.player_max_hp);
        self
    }

    #[must_use]
    pub fn with_fight(mut self, fight: u32) -> Self {
        self.fight = fight.max(1);
        self
    }

    #[must_use]
    pub fn with_opponent_trumps(mut self, count: u8) -> Self {
        self.opponent_trumps = count;
        self
    }

    #[must_use]
    pub fn is_full_hp(&self) -> bool {
        self.player_hp >= self.player_max_hp
    }

    #[must_use]
    pub fn is_boss_fight(&self) -> bool {
        self.mode.boss_fights().contains(&self.fight)
    }

    /// Is there a boss fight after the current one?
    #[must_use]
    pub fn boss_ahead(&self) -> bool {
        self.mode.boss_fights().iter().any(|&b| b > self.fight)
    }

    #[must_use]
    pub fn is_outstanding(&self, objective: Objective) -> bool {
        self.outstanding.contains(&objective)
    }

    /// A fresh round seeded with the counters carried across rounds.
    #[must_use]
    pub fn new_round(&self) -> RoundState {
        RoundState::new()
            .with_opponent_trumps(self.opponent_trumps)
            .with_black_magic_uses(self.black_magic_uses)
    }

    /// Move to the next fight. Player HP carries over.
    pub fn start_fight(&mut self) {
        self.fight += 1;
        self.round = 1;
        self.opponent_hp = self.opponent_max_hp;
        self.opponent_trumps = 0;
        self.black_magic_uses = 0;
    }

    /// Conclude `round` with `result`: apply damage, update objectives and
    /// carry the opponent's counters into the next round.
    pub fn record(&mut self, round: &RoundState, result: RoundResult) -> RoundRecord {
        let target = round.target();
        let player_total = round.player_total();

        let (damage_taken, damage_dealt) = match result {
            RoundResult::Loss => (round.bet(Side::Player).max(0) as u32, 0),
            RoundResult::Win if round.escape_active(Side::Opponent) => (0, 0),
            RoundResult::Win => (0, round.bet(Side::Opponent).max(0) as u32),
            RoundResult::Tie | RoundResult::Void => (0, 0),
        };
        self.player_hp = self.player_hp.saturating_sub(damage_taken);
        self.opponent_hp = self.opponent_hp.saturating_sub(damage_dealt);
        self.damage_taken += damage_taken;

        let mut completed = Vec::new();
        if result != RoundResult::Void {
            if player_total == BASE_TARGET {
                self.perfect_streak = self.perfect_streak.saturating_add(1);
            } else {
                self.perfect_streak = 0;
            }
            if self.perfect_streak >= 3 {
                completed.push(Objective::ThreeTwentyOnes);
            }
            if result == RoundResult::Win && player_total > target {
                completed.push(Objective::BustWin);
            }
            if round.trumps_played(Side::Player) >= 15 {
                completed.push(Objective::FifteenTrumps);
            }
        }
        if damage_dealt > 0 && self.opponent_hp == 0 {
            self.opponents_defeated += 1;
        }
        for objective in &completed {
            if self.outstanding.remove(objective) {
                info!(?objective, "objective completed");
            }
        }

        self.opponent_trumps = round.opponent_trumps();
        self.black_magic_uses = round.black_magic_uses();

        let record = RoundRecord {
            fight: self.fight,
            round: self.round,
            result,
            player_total,
            opponent_total: round.opponent_known_total(),
            target,
            damage_taken,
            damage_dealt,
            completed,
        };
        info!(
            fight = self.fight,
            round = self.round,
            ?result,
            damage_taken,
            damage_dealt,
            "round recorded"
        );
        self.round += 1;
        self.history.push(record.clone());
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::TrumpId;
    use crate::core::{CardValue, TableEntry, TableMark};

    fn card(v: u8) -> CardValue {
        CardValue::new(v).unwrap()
    }

    #[test]
    fn test_mode_bosses() {
        assert_eq!(GameMode::Survival.boss_fights(), &[5]);
        assert_eq!(GameMode::SurvivalPlus.boss_fights(), &[5, 10]);
        assert!(GameMode::Normal.boss_fights().is_empty());

        let ctx = GauntletContext::new(GameMode::SurvivalPlus).with_fight(5);
        assert!(ctx.is_boss_fight());
        assert!(ctx.boss_ahead());

        let last = ctx.with_fight(10);
        assert!(last.is_boss_fight());
        assert!(!last.boss_ahead());
    }

    #[test]
    fn test_loss_damages_player_by_bet() {
        let mut ctx = GauntletContext::new(GameMode::Survival);
        let round = RoundState::new().with_base_bets(2, 1);

        let record = ctx.record(&round, RoundResult::Loss);
        assert_eq!(record.damage_taken, 2);
        assert_eq!(ctx.player_hp, 3);
        assert_eq!(ctx.round, 2);
    }

    #[test]
    fn test_escape_blocks_damage() {
        let mut ctx = GauntletContext::new(GameMode::Normal);
        let mut round = RoundState::new();
        round.table_mut().push_back(
            TableEntry::new(TrumpId::new("Escape"), Side::Opponent).with_mark(TableMark::EscapeDamage),
        );

        let record = ctx.record(&round, RoundResult::Win);
        assert_eq!(record.damage_dealt, 0);
        assert_eq!(ctx.opponent_hp, 10);
    }

    #[test]
    fn test_bust_win_objective() {
        let mut ctx =
            GauntletContext::new(GameMode::Normal).with_objectives([Objective::BustWin]);
        let round = RoundState::from_cards(&[card(11), card(10), card(3)], &[]).unwrap();

        let record = ctx.record(&round, RoundResult::Win);
        assert_eq!(record.completed, vec![Objective::BustWin]);
        assert!(!ctx.is_outstanding(Objective::BustWin));
    }

    #[test]
    fn test_perfect_streak() {
        let mut ctx = GauntletContext::new(GameMode::Normal)
            .with_objectives([Objective::ThreeTwentyOnes]);
        let perfect = RoundState::from_cards(&[card(10), card(11)], &[]).unwrap();

        ctx.record(&perfect, RoundResult::Tie);
        ctx.record(&perfect, RoundResult::Win);
        assert_eq!(ctx.perfect_streak, 2);
        let record = ctx.record(&perfect, RoundResult::Win);
        assert!(record.completed.contains(&Objective::ThreeTwentyOnes));

        let miss = RoundState::from_cards(&[card(10)], &[]).unwrap();
        ctx.record(&miss, RoundResult::Loss);
        assert_eq!(ctx.perfect_streak, 0);
    }

    #[test]
    fn test_counters_carry_into_next_round() {
        let mut ctx = GauntletContext::new(GameMode::SurvivalPlus);
        let round = RoundState::new()
            .with_opponent_trumps(4)
            .with_black_magic_uses(1);
        ctx.record(&round, RoundResult::Tie);

        let next = ctx.new_round();
        assert_eq!(next.opponent_trumps(), 4);
        assert_eq!(next.black_magic_uses(), 1);

        ctx.start_fight();
        assert_eq!(ctx.fight, 2);
        assert_eq!(ctx.new_round().black_magic_uses(), 0);
    }
}
