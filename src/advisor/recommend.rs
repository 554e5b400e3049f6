//! Tiered trump recommendations.
//!
//! The player's held trumps are scored against the live round and the
//! gauntlet in three tiers:
//!
//! 1. Necessity: bust recovery, lethal damage, dangerous trumps in the
//!    opponent's kit. Only cards that address the problem are eligible.
//! 2. Conservation: heavy cards are held back for boss fights, and a
//!    cheaper fix displaces a reserved one.
//! 3. Opportunity: perfect-total bet stacking, safe draws, challenge plays
//!    such as an intentional bust.
//!
//! A comfortable position (winning, full HP, no boss, no outstanding
//! objective, no dangerous opponent trumps) yields no advice at all.
//! Within a tier and problem, cheaper cards come first. Weights only
//! order the output.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cards::{
    AttackEffect, DrawForce, SpecialEffect, TrumpCatalog, TrumpEffect, TrumpHand, TrumpId,
    WipeScope,
};
use crate::core::{
    Action, AdviceThresholds, GauntletContext, HeuristicConfig, Objective, OpponentStance,
    RoundState, Side,
};
use crate::odds::OddsEngine;
use crate::opponent::OpponentProfile;

/// Priority band of a recommendation; lower is more urgent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tier {
    Necessity,
    Conservation,
    Opportunity,
}

/// What a recommendation addresses, most urgent first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Problem {
    Bust,
    Lethal,
    EnemyThreat,
    BossReserve,
    Objective,
    Value,
}

/// Recommended move.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Play {
    Trump(TrumpId),
    Action(Action),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    /// Play it now.
    Play,
    /// Keep it for a later threat or fight.
    Save,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub play: Play,
    pub verdict: Verdict,
    pub tier: Tier,
    pub problem: Problem,
    pub note: String,
    #[serde(skip)]
    weight: u8,
}

/// A held trump with what the catalog knows about it.
struct Held {
    id: TrumpId,
    effect: Option<TrumpEffect>,
    weight: u8,
}

/// Everything the tiers read, computed once.
struct Situation<'a> {
    round: &'a RoundState,
    gauntlet: &'a GauntletContext,
    total: u8,
    target: u8,
    busted: bool,
    boss: bool,
    stay_win_pct: f64,
    lethal: bool,
    threats: Vec<Threat>,
}

impl Situation<'_> {
    fn threatened_by(&self, pred: impl Fn(TrumpEffect) -> bool) -> bool {
        self.threats.iter().any(|t| pred(t.effect))
    }
}

/// A dangerous trump in the opponent's kit.
struct Threat {
    name: String,
    effect: TrumpEffect,
}

/// Opponent trumps that change what the player should hold or play.
fn is_threat(effect: TrumpEffect) -> bool {
    matches!(
        effect,
        TrumpEffect::BoardWipe { trumps: WipeScope::All, .. }
            | TrumpEffect::Special(SpecialEffect::Escape | SpecialEffect::Oblivion)
            | TrumpEffect::EnemyAttack(
                AttackEffect::DeadSilence
                    | AttackEffect::BlackMagic
                    | AttackEffect::Curse
                    | AttackEffect::MindShift { .. }
                    | AttackEffect::Desire { .. }
                    | AttackEffect::ShieldAssault { .. }
                    | AttackEffect::TwentyOneUp
            )
    )
}

/// Trumps worth keeping a table wipe for.
fn wipe_counters(effect: TrumpEffect) -> bool {
    matches!(
        effect,
        TrumpEffect::Special(SpecialEffect::Escape)
            | TrumpEffect::EnemyAttack(
                AttackEffect::DeadSilence | AttackEffect::BlackMagic | AttackEffect::TwentyOneUp
            )
    )
}

/// Ranks the player's held trumps.
#[derive(Clone, Debug)]
pub struct RecommendationEngine {
    catalog: TrumpCatalog,
    thresholds: AdviceThresholds,
}

impl Default for RecommendationEngine {
    fn default() -> Self {
        Self::new(TrumpCatalog::builtin(), &HeuristicConfig::default())
    }
}

impl RecommendationEngine {
    #[must_use]
    pub fn new(catalog: TrumpCatalog, config: &HeuristicConfig) -> Self {
        Self {
            catalog,
            thresholds: config.advice.clone(),
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &TrumpCatalog {
        &self.catalog
    }

    /// Recommendations for the current position, most urgent first.
    /// Empty when the round is over or the position is comfortable. An
    /// empty hand can still be advised to bust on purpose.
    #[must_use]
    pub fn recommend(
        &self,
        odds: &OddsEngine,
        round: &RoundState,
        hand: &TrumpHand,
        gauntlet: &GauntletContext,
    ) -> Vec<Recommendation> {
        let Ok(stay) = odds.distribution_for_action(Action::Stay, round) else {
            return Vec::new();
        };
        let profile = odds.model().profile();
        let total = round.player_total();
        let target = round.target();
        let stay_win_pct = stay.outcome.win.as_percent();
        let behind = stay_win_pct < f64::from(self.thresholds.comfortable_win_pct);
        let situation = Situation {
            round,
            gauntlet,
            total,
            target,
            busted: total > target,
            boss: gauntlet.is_boss_fight() || profile.is_boss(),
            stay_win_pct,
            lethal: behind && i64::from(gauntlet.player_hp) <= i64::from(round.bet(Side::Player)),
            threats: self.threats_in(profile),
        };

        if self.is_comfortable(&situation) {
            debug!(win_pct = stay_win_pct, "position comfortable, advice suppressed");
            return Vec::new();
        }

        let held = self.held(hand);
        let mut recs = Vec::new();
        self.necessity(&situation, &held, &mut recs);
        self.conserve(&situation, &held, &mut recs);
        if !situation.busted {
            self.opportunity(&situation, &held, odds, &mut recs);
        }

        recs.sort_by_key(|r| (r.tier, r.problem, r.weight));
        let mut seen = Vec::new();
        recs.retain(|r| {
            if seen.contains(&r.play) {
                false
            } else {
                seen.push(r.play.clone());
                true
            }
        });
        debug!(count = recs.len(), "recommendations ranked");
        recs
    }

    fn is_comfortable(&self, s: &Situation<'_>) -> bool {
        !s.busted
            && !s.boss
            && !s.lethal
            && s.gauntlet.is_full_hp()
            && s.gauntlet.outstanding.is_empty()
            && s.threats.is_empty()
            && s.stay_win_pct >= f64::from(self.thresholds.comfortable_win_pct)
    }

    fn threats_in(&self, profile: &OpponentProfile) -> Vec<Threat> {
        profile
            .all_trumps()
            .filter_map(|id| self.catalog.get_id(id))
            .filter(|card| is_threat(card.effect))
            .map(|card| Threat {
                name: card.name.clone(),
                effect: card.effect,
            })
            .collect()
    }

    fn held(&self, hand: &TrumpHand) -> Vec<Held> {
        hand.iter()
            .map(|id| Held {
                id: id.clone(),
                effect: self.catalog.get_id(id).map(|c| c.effect),
                weight: self.catalog.weight_or(id, self.thresholds.default_weight),
            })
            .collect()
    }

    // === Tier 1 ===

    fn necessity(&self, s: &Situation<'_>, held: &[Held], recs: &mut Vec<Recommendation>) {
        let shields: Vec<&Held> = held
            .iter()
            .filter(|h| matches!(h.effect, Some(TrumpEffect::Defensive { .. })))
            .collect();

        if s.busted {
            let mut fixes = Vec::new();
            for h in held {
                let note = match h.effect {
                    Some(TrumpEffect::DrawForcer(DrawForce::ReturnOwnLast))
                        if !s.round.face_up(Side::Player).is_empty() =>
                    {
                        "send your last card back to the deck".to_string()
                    }
                    Some(TrumpEffect::TargetModifier { target })
                        if target > s.target && s.total <= target =>
                    {
                        format!("{} is safe under {target}", s.total)
                    }
                    Some(TrumpEffect::DrawForcer(DrawForce::ExchangeLast)) => {
                        match (s.round.last_face_up(Side::Player), s.round.last_face_up(Side::Opponent)) {
                            (Some(mine), Some(theirs)) if theirs < mine => {
                                format!("swap your {mine} for their {theirs}")
                            }
                            _ => continue,
                        }
                    }
                    _ => continue,
                };
                fixes.push(rec(h, Verdict::Play, Tier::Necessity, Problem::Bust, note));
            }
            if fixes.is_empty() {
                fixes.extend(shields.iter().map(|h| {
                    rec(h, Verdict::Play, Tier::Necessity, Problem::Bust, "no way back under; reduce the damage".to_string())
                }));
            }
            recs.extend(fixes);
            return;
        }

        if s.lethal || s.gauntlet.player_hp <= u32::from(self.thresholds.low_hp) {
            let note = format!("HP {}: reduce the damage of a loss", s.gauntlet.player_hp);
            recs.extend(
                shields
                    .iter()
                    .map(|h| rec(h, Verdict::Play, Tier::Necessity, Problem::Lethal, note.clone())),
            );
        }

        self.threats(s, held, recs);
    }

    fn threats(&self, s: &Situation<'_>, held: &[Held], recs: &mut Vec<Recommendation>) {
        let wipes_table = |h: &&Held| {
            matches!(
                h.effect,
                Some(TrumpEffect::BoardWipe { trumps, .. }) if trumps != WipeScope::None
            )
        };
        let countered: Vec<&str> = s
            .threats
            .iter()
            .filter(|t| wipe_counters(t.effect))
            .map(|t| t.name.as_str())
            .collect();
        if !countered.is_empty() {
            let note = format!("keep it to destroy {}", countered.join(", "));
            recs.extend(
                held.iter()
                    .filter(wipes_table)
                    .map(|h| rec(h, Verdict::Save, Tier::Necessity, Problem::EnemyThreat, note.clone())),
            );
        }

        if s.threatened_by(|e| e == TrumpEffect::EnemyAttack(AttackEffect::Curse)) {
            let highest = s.round.remaining().max();
            if let Some(highest) = highest.filter(|c| s.total + c.get() > s.target) {
                let note = format!("undo a cursed {highest} (would reach {})", s.total + highest.get());
                recs.extend(
                    held.iter()
                        .filter(|h| {
                            matches!(
                                h.effect,
                                Some(TrumpEffect::DrawForcer(DrawForce::ReturnOwnLast | DrawForce::ExchangeLast))
                            )
                        })
                        .map(|h| rec(h, Verdict::Save, Tier::Necessity, Problem::EnemyThreat, note.clone())),
                );
            }
        }

        let mind_shift = s.threats.iter().find_map(|t| match t.effect {
            TrumpEffect::EnemyAttack(AttackEffect::MindShift { full }) => Some(full),
            _ => None,
        });
        let played = usize::from(s.round.trumps_played(Side::Player));
        if let Some(full) = mind_shift {
            let needed = if full { 3 } else { 2 };
            if played < needed {
                let note = format!("play {needed} trumps this round or lose them to Mind Shift");
                self.burn_cheapest(held, needed - played, &note, recs);
            }
        }
        if s.threatened_by(|e| matches!(e, TrumpEffect::EnemyAttack(AttackEffect::Desire { .. }))) {
            self.burn_cheapest(held, 2, "every trump held raises your bet under Desire", recs);
        }
    }

    fn burn_cheapest(&self, held: &[Held], count: usize, note: &str, recs: &mut Vec<Recommendation>) {
        let mut cheapest: Vec<&Held> = held.iter().collect();
        cheapest.sort_by_key(|h| h.weight);
        recs.extend(
            cheapest
                .into_iter()
                .take(count)
                .map(|h| rec(h, Verdict::Play, Tier::Necessity, Problem::EnemyThreat, note.to_string())),
        );
    }

    // === Tier 2 ===

    /// Drop reserved Tier 1 plays that a cheaper card also solves, then
    /// hold heavy cards back while a boss is still ahead.
    fn conserve(&self, s: &Situation<'_>, held: &[Held], recs: &mut Vec<Recommendation>) {
        if s.boss {
            return;
        }
        let reserve = self.thresholds.reserve_weight;
        let cheap_fix = |problem: Problem, recs: &[Recommendation]| {
            recs.iter()
                .any(|r| r.problem == problem && r.verdict == Verdict::Play && r.weight < reserve)
        };
        let snapshot = recs.clone();
        recs.retain(|r| r.verdict != Verdict::Play || r.weight < reserve || !cheap_fix(r.problem, &snapshot));

        if !s.gauntlet.boss_ahead() {
            return;
        }
        let committed: Vec<Play> = recs.iter().map(|r| r.play.clone()).collect();
        recs.extend(
            held.iter()
                .filter(|h| h.weight >= reserve && !committed.contains(&Play::Trump(h.id.clone())))
                .map(|h| {
                    rec(h, Verdict::Save, Tier::Conservation, Problem::BossReserve, "save it for the boss fight".to_string())
                }),
        );
    }

    // === Tier 3 ===

    fn opportunity(
        &self,
        s: &Situation<'_>,
        held: &[Held],
        odds: &OddsEngine,
        recs: &mut Vec<Recommendation>,
    ) {
        let remaining = s.round.remaining();
        let gap = s.target.saturating_sub(s.total);
        let mut best_draw_seen = false;
        let mut by_weight: Vec<&Held> = held.iter().collect();
        by_weight.sort_by_key(|h| h.weight);

        for h in by_weight {
            let note = match h.effect {
                Some(TrumpEffect::BetModifier { .. }) if gap == 0 => {
                    format!("you are on {}; raise the stakes", s.target)
                }
                Some(TrumpEffect::DrawForcer(DrawForce::Best { .. })) if gap > 0 && !best_draw_seen => {
                    best_draw_seen = true;
                    format!("draws the best card (need {gap} to reach {})", s.target)
                }
                Some(TrumpEffect::DrawForcer(DrawForce::Number(card)))
                    if gap > 0 && remaining.contains(card) && card.get() <= gap =>
                {
                    if card.get() == gap {
                        format!("gives you exactly {}", s.target)
                    } else {
                        format!("safe: {} + {card} = {}", s.total, s.total + card.get())
                    }
                }
                Some(TrumpEffect::DrawForcer(DrawForce::OtherDrawsBest)) => {
                    let visible = s.round.visible_total(Side::Opponent);
                    let busting = remaining.iter().filter(|c| visible + c.get() > s.target).count();
                    if s.round.stance() == OpponentStance::Stayed
                        || visible + 3 < s.target
                        || busting == 0
                    {
                        continue;
                    }
                    format!("{busting}/{} remaining cards bust the opponent", remaining.len())
                }
                Some(TrumpEffect::Special(SpecialEffect::Harvest))
                    if !s.round.harvest_active(Side::Player) =>
                {
                    "play it first; every later trump draws a replacement".to_string()
                }
                Some(TrumpEffect::Special(SpecialEffect::TrumpSwitch { draw, .. }))
                    if held.len() < usize::from(draw) =>
                {
                    format!("refill a thin hand (draws {draw})")
                }
                _ => continue,
            };
            recs.push(rec(h, Verdict::Play, Tier::Opportunity, Problem::Value, note));
        }

        if s.gauntlet.is_outstanding(Objective::BustWin)
            && odds.legal_actions(s.round).contains(&Action::IntentionalBust)
        {
            let best = odds.bust_paths(s.round).into_iter().next();
            if let Some(path) = best.filter(|p| p.outcome.win.as_percent() >= f64::from(self.thresholds.min_bust_win_pct)) {
                recs.push(Recommendation {
                    play: Play::Action(Action::IntentionalBust),
                    verdict: Verdict::Play,
                    tier: Tier::Opportunity,
                    problem: Problem::Objective,
                    note: format!(
                        "a {} busts to {} and still wins {:.0}% for the bust-win challenge",
                        path.card,
                        path.total,
                        path.outcome.win.as_percent()
                    ),
                    weight: 0,
                });
            }
        }
    }
}

fn rec(h: &Held, verdict: Verdict, tier: Tier, problem: Problem, note: String) -> Recommendation {
    Recommendation {
        play: Play::Trump(h.id.clone()),
        verdict,
        tier,
        problem,
        note,
        weight: h.weight,
    }
}
