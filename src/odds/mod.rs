//! The four decision-EV engines and their orchestrator.
//!
//! Everything here evaluates per unit of the original stake: a busted hit
//! loses 1, a busted double loses 2, a natural pays 1.5. The shoe is the one
//! piece of shared mutable state inside a solve; every engine removes cards
//! before descending and puts them back on every return path.

use std::collections::HashMap;

use log::debug;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::dealer::{self, DealerResolution};
use crate::enumerate::{draw_combinations, group_by_len_desc};
use crate::error::SolverError;
use crate::hand::{
    check_rank, is_blackjack, is_busted, is_pair, low_total, score, Rank, ACE, MAX_RANK,
};
use crate::shoe::Shoe;
use crate::trie::EvTrie;

/// Payout for a natural two-card 21, per unit stake.
const BLACKJACK_EV: f64 = 1.5;

/// Tunables for a solve. Defaults follow the browser game: 250 dealer
/// trials per stand estimate and a single re-split.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    pub dealer_resolution: DealerResolution,
    /// How many further splits a post-split hand may take.
    pub max_split_depth: u8,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            dealer_resolution: DealerResolution::MonteCarlo { trials: 250 },
            max_split_depth: 1,
        }
    }
}

/// The four decision EVs for one state, per unit of the original stake.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Odds {
    pub stand: f64,
    pub hit: f64,
    /// `NEG_INFINITY` when the hand is not exactly two cards.
    pub double: f64,
    /// `None` when the hand is not a splittable pair.
    pub split: Option<f64>,
}

impl Odds {
    /// Flat `(stand, hit, double, split)` view for callers wanting the raw
    /// 4-tuple; a missing split becomes `NEG_INFINITY`.
    pub fn to_tuple(&self) -> (f64, f64, f64, f64) {
        (
            self.stand,
            self.hit,
            self.double,
            self.split.unwrap_or(f64::NEG_INFINITY),
        )
    }
}

/// Expected-value solver for one blackjack decision point.
///
/// A solver instance owns its sampling source and memoization caches. The
/// caches key on exact deck compositions, so an instance is only valid
/// within one shoe epoch; build a fresh solver after a reshuffle.
pub struct OddsSolver {
    config: SolverConfig,
    rng: SmallRng,
    /// (up-card, deck-composition) key -> trie of (sorted hand -> best EV),
    /// shared across split branches.
    split_cache: HashMap<String, EvTrie>,
}

impl OddsSolver {
    pub fn new(config: SolverConfig) -> Self {
        Self {
            config,
            rng: SmallRng::from_entropy(),
            split_cache: HashMap::new(),
        }
    }

    /// Solver with a deterministic sampling source, for reproducible runs.
    pub fn seeded(config: SolverConfig, seed: u64) -> Self {
        Self {
            config,
            rng: SmallRng::seed_from_u64(seed),
            split_cache: HashMap::new(),
        }
    }

    /// Decision EVs for one state: the remaining `deck`, the player `hand`,
    /// and the dealer up-card. The deck array must already exclude every
    /// card on the table. Each EV is rounded to two decimal places.
    pub fn get_odds(
        &mut self,
        deck: &[Rank],
        hand: &[Rank],
        dealer_up: Rank,
    ) -> Result<Odds, SolverError> {
        if hand.is_empty() {
            return Err(SolverError::EmptyHand);
        }
        for &card in hand {
            check_rank(card)?;
        }
        check_rank(dealer_up)?;
        if is_busted(hand) {
            return Err(SolverError::BustedHand(score(hand)));
        }
        let mut shoe = Shoe::from_cards(deck)?;

        if is_blackjack(hand) {
            // natural pays 3:2 and ends the decision
            return Ok(Odds {
                stand: BLACKJACK_EV,
                hit: 0.0,
                double: 0.0,
                split: None,
            });
        }

        debug!(
            "solving: deck={} hand={:?} up={}",
            shoe.cache_key(),
            hand,
            dealer_up
        );

        let stand = self.stand_ev(dealer_up, score(hand), &mut shoe);
        let hit = self.hit_ev(hand, dealer_up, &mut shoe)?;
        let double = if hand.len() == 2 {
            self.double_ev(hand, dealer_up, &mut shoe)?
        } else {
            f64::NEG_INFINITY
        };
        let split = if is_pair(hand) {
            Some(self.split_ev(&hand[..1], dealer_up, &mut shoe, self.config.max_split_depth)?)
        } else {
            None
        };

        Ok(Odds {
            stand: round2(stand),
            hit: round2(hit),
            double: round2(double),
            split: split.map(round2),
        })
    }

    fn stand_ev(&mut self, up_card: Rank, player_total: u8, shoe: &mut Shoe) -> f64 {
        match self.config.dealer_resolution {
            DealerResolution::MonteCarlo { trials } => {
                dealer::stand_ev_sampled(up_card, player_total, shoe, trials, &mut self.rng)
            }
            DealerResolution::Exact => dealer::stand_ev_exact(up_card, player_total, shoe),
        }
    }

    /// EV of hitting now and playing optimally afterwards.
    ///
    /// Bottom-up DP over every drawable completion of the hand, processed
    /// longest-combinations-first so that when a path is evaluated, all of
    /// its one-card extensions are already in the trie. That ordering is a
    /// correctness requirement, not an optimization.
    fn hit_ev(
        &mut self,
        player_hand: &[Rank],
        up_card: Rank,
        shoe: &mut Shoe,
    ) -> Result<f64, SolverError> {
        let budget = 21u8.saturating_sub(low_total(player_hand));
        let groups = group_by_len_desc(draw_combinations(shoe, budget));

        let mut evs = EvTrie::new();
        for group in &groups {
            for combo in group {
                let value = shoe.with_removed_all(combo, |shoe| {
                    let mut held = player_hand.to_vec();
                    held.extend_from_slice(combo);

                    // one more tentative card per remaining rank
                    let mut hit_acc = 0.0;
                    for rank in ACE..=MAX_RANK {
                        let count = shoe.count(rank);
                        if count == 0 {
                            continue;
                        }
                        held.push(rank);
                        let best = score(&held);
                        held.pop();

                        if best > 21 {
                            // bust loses the stake outright
                            hit_acc -= count as f64;
                        } else if best < 21 {
                            // a non-busting extension fits the budget, so it
                            // was evaluated in an earlier, longer-length
                            // pass; a miss only ever means a busting draw
                            let deeper = evs
                                .lookup(&sorted_desc(combo, Some(rank)))
                                .unwrap_or(-1.0);
                            hit_acc += deeper * count as f64;
                        }
                        // exactly 21 is terminal and contributes nothing extra
                    }

                    let stand = self.stand_ev(up_card, score(&held), shoe);
                    let remaining = shoe.total();
                    if remaining == 0 {
                        stand
                    } else {
                        // ties favor stand
                        (hit_acc / remaining as f64).max(stand)
                    }
                })?;
                evs.insert(&sorted_desc(combo, None), value);
            }
        }

        // The reported hit EV is the expectation over the first drawn card.
        // A rank whose single draw busts was never enumerated and loses the
        // stake.
        let total = shoe.total();
        if total == 0 {
            return Ok(0.0);
        }
        let mut ev = 0.0;
        for rank in ACE..=MAX_RANK {
            let count = shoe.count(rank);
            if count == 0 {
                continue;
            }
            ev += evs.lookup(&[rank]).unwrap_or(-1.0) * count as f64;
        }
        Ok(ev / total as f64)
    }

    /// EV of taking exactly one more card at double stake, then standing.
    /// Only meaningful for two-card hands; the aggregator enforces that.
    fn double_ev(
        &mut self,
        player_hand: &[Rank],
        up_card: Rank,
        shoe: &mut Shoe,
    ) -> Result<f64, SolverError> {
        let total = shoe.total();
        if total == 0 {
            return Ok(0.0);
        }

        let mut acc = 0.0;
        let mut held = player_hand.to_vec();
        for rank in ACE..=MAX_RANK {
            let count = shoe.count(rank);
            if count == 0 {
                continue;
            }
            held.push(rank);
            let best = score(&held);
            held.pop();

            if best > 21 {
                acc -= 2.0 * count as f64;
            } else {
                let stand =
                    shoe.with_removed(rank, |shoe| self.stand_ev(up_card, best, shoe))?;
                acc += 2.0 * count as f64 * stand;
            }
        }
        Ok(acc / total as f64)
    }

    /// EV of splitting a pair: twice the EV of one post-split hand played
    /// optimally against the shared, depleting shoe. `base` is the lone
    /// card that starts the split hand; `depth` budgets further re-splits.
    fn split_ev(
        &mut self,
        base: &[Rank],
        up_card: Rank,
        shoe: &mut Shoe,
        depth: u8,
    ) -> Result<f64, SolverError> {
        if base.len() != 1 {
            return Err(SolverError::SplitBase { len: base.len() });
        }
        let total = shoe.total();
        if total == 0 {
            return Ok(0.0);
        }

        let mut one_hand = 0.0;
        for rank in ACE..=MAX_RANK {
            let count = shoe.count(rank);
            if count == 0 {
                continue;
            }
            let ev = shoe.with_removed(rank, |shoe| {
                self.best_hand_ev(&[base[0], rank], up_card, shoe, depth)
            })??;
            one_hand += ev * count as f64;
        }
        Ok(2.0 * one_hand / total as f64)
    }

    /// Best-action EV for a post-split hand, memoized per (up-card, deck
    /// composition, sorted hand). The same sub-problem recurs across both
    /// split branches, so the memo is what keeps split evaluation from
    /// going exponential in depth. At depth 0 the value is the plain
    /// stand/hit/double optimum.
    fn best_hand_ev(
        &mut self,
        hand: &[Rank],
        up_card: Rank,
        shoe: &mut Shoe,
        depth: u8,
    ) -> Result<f64, SolverError> {
        let key = format!("{up_card}:{}", shoe.cache_key());
        let path = sorted_desc(hand, None);
        if let Some(cached) = self
            .split_cache
            .get(&key)
            .and_then(|trie| trie.lookup(&path))
        {
            debug!("split cache hit: deck={key} hand={path:?} ev={cached}");
            return Ok(cached);
        }

        if score(hand) > 21 {
            return Ok(-1.0);
        }

        let stand = self.stand_ev(up_card, score(hand), shoe);
        let hit = self.hit_ev(hand, up_card, shoe)?;
        let mut best = stand.max(hit);
        if hand.len() == 2 {
            best = best.max(self.double_ev(hand, up_card, shoe)?);
            if is_pair(hand) && depth > 0 {
                best = best.max(self.split_ev(&hand[..1], up_card, shoe, depth - 1)?);
            }
        }

        self.split_cache.entry(key).or_default().insert(&path, best);
        Ok(best)
    }
}

/// One-shot solve with the default configuration and an entropy-seeded
/// sampler. This is the boundary the UI/reducer calls.
pub fn get_odds(deck: &[Rank], hand: &[Rank], dealer_up: Rank) -> Result<Odds, SolverError> {
    OddsSolver::new(SolverConfig::default()).get_odds(deck, hand, dealer_up)
}

fn sorted_desc(cards: &[Rank], extra: Option<Rank>) -> Vec<Rank> {
    let mut path = cards.to_vec();
    if let Some(rank) = extra {
        path.push(rank);
    }
    path.sort_unstable_by(|a, b| b.cmp(a));
    path
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
