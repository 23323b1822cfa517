//! Dealer resolution: the stand-EV engines.
//!
//! Two interchangeable engines estimate the value of standing on a total
//! against a dealer up-card: a Monte-Carlo sampler and an exact enumerator.
//! Both condition the hole card on the dealer not holding a natural (an ace
//! up-card cannot hide a ten and a ten cannot hide an ace), and both leave
//! the shoe exactly as they found it.

use log::trace;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::hand::{score, Rank, ACE, MAX_RANK};
use crate::shoe::Shoe;

/// How the dealer's terminal distribution is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DealerResolution {
    /// Sample dealer rounds; the estimate's variance shrinks with `trials`.
    MonteCarlo { trials: u32 },
    /// Enumerate every dealer draw sequence, weighted by draw probability.
    Exact,
}

/// Per-unit-stake settlement of a stood player total against a finished
/// dealer total.
fn settle(player_total: u8, dealer_total: u8) -> f64 {
    if dealer_total > 21 || player_total > dealer_total {
        1.0
    } else if dealer_total > player_total {
        -1.0
    } else {
        0.0
    }
}

/// Ranks the hole card may not take without completing a dealer natural.
fn forbidden_hole(up_card: Rank) -> Option<Rank> {
    match up_card {
        ACE => Some(MAX_RANK),
        MAX_RANK => Some(ACE),
        _ => None,
    }
}

/// Draw one card proportionally to the remaining counts, skipping `skip`,
/// and take it out of the shoe. `None` when nothing is drawable.
fn sample_rank<R: Rng>(shoe: &mut Shoe, rng: &mut R, skip: Option<Rank>) -> Option<Rank> {
    let total: u32 = (ACE..=MAX_RANK)
        .filter(|&r| Some(r) != skip)
        .map(|r| shoe.count(r) as u32)
        .sum();
    if total == 0 {
        return None;
    }

    let mut ticket = rng.gen_range(0..total);
    for rank in ACE..=MAX_RANK {
        if Some(rank) == skip {
            continue;
        }
        let count = shoe.count(rank) as u32;
        if ticket < count {
            return shoe.remove(rank).ok().map(|_| rank);
        }
        ticket -= count;
    }
    None
}

/// Play out one dealer round from the up-card, sampling hole and hit cards
/// from the shoe. Dealer stands on every 17. Drawn cards are put back
/// before returning the final total.
fn dealer_round<R: Rng>(up_card: Rank, shoe: &mut Shoe, rng: &mut R) -> u8 {
    let mut cards = vec![up_card];

    if let Some(rank) = sample_rank(shoe, rng, forbidden_hole(up_card)) {
        cards.push(rank);
    }

    while score(&cards) < 17 {
        match sample_rank(shoe, rng, None) {
            Some(rank) => cards.push(rank),
            None => break,
        }
    }

    for &rank in &cards[1..] {
        shoe.replace(rank);
    }
    score(&cards)
}

/// Monte-Carlo estimate of the stand EV: +1 when the player total beats the
/// dealer's (or the dealer busts), -1 when the dealer's wins, 0 on a push.
///
/// This is an estimator: repeated calls differ unless the caller controls
/// the sampling source.
pub fn stand_ev_sampled<R: Rng>(
    up_card: Rank,
    player_total: u8,
    shoe: &mut Shoe,
    trials: u32,
    rng: &mut R,
) -> f64 {
    if trials == 0 {
        return 0.0;
    }
    let mut total = 0.0;
    for _ in 0..trials {
        let dealer_total = dealer_round(up_card, shoe, rng);
        total += settle(player_total, dealer_total);
    }
    trace!("sampled stand ev: up={up_card} player={player_total} trials={trials}");
    total / trials as f64
}

/// Incremental hand total, one soft ace tracked.
fn add_card(value: u8, soft: bool, rank: Rank) -> (u8, bool) {
    if rank == ACE {
        if value + 11 <= 21 {
            (value + 11, true)
        } else {
            (value + 1, soft)
        }
    } else {
        let next = value + rank;
        if next > 21 && soft {
            (next - 10, false)
        } else {
            (next, soft)
        }
    }
}

/// Exact stand EV by recursively enumerating every dealer draw sequence,
/// weighted by its probability against the current shoe. Ground truth for
/// the sampler, tractable only for small remaining shoes.
pub fn stand_ev_exact(up_card: Rank, player_total: u8, shoe: &mut Shoe) -> f64 {
    let (value, soft) = add_card(0, false, up_card);
    let skip = forbidden_hole(up_card);

    let total: u32 = (ACE..=MAX_RANK)
        .filter(|&r| Some(r) != skip)
        .map(|r| shoe.count(r) as u32)
        .sum();
    if total == 0 {
        // no legal hole card left; dealer draws unconditioned
        return dealer_ev(value, soft, player_total, shoe);
    }

    let mut ev = 0.0;
    for rank in ACE..=MAX_RANK {
        if Some(rank) == skip || shoe.count(rank) == 0 {
            continue;
        }
        let p = shoe.count(rank) as f64 / total as f64;
        let (next, next_soft) = add_card(value, soft, rank);
        if let Ok(sub) = shoe.with_removed(rank, |s| dealer_ev(next, next_soft, player_total, s)) {
            ev += p * sub;
        }
    }
    ev
}

fn dealer_ev(value: u8, soft: bool, player_total: u8, shoe: &mut Shoe) -> f64 {
    if value >= 17 {
        return settle(player_total, value);
    }
    let total = shoe.total();
    if total == 0 {
        return settle(player_total, value);
    }

    let mut ev = 0.0;
    for rank in ACE..=MAX_RANK {
        if shoe.count(rank) == 0 {
            continue;
        }
        let p = shoe.count(rank) as f64 / total as f64;
        let (next, next_soft) = add_card(value, soft, rank);
        if let Ok(sub) = shoe.with_removed(rank, |s| dealer_ev(next, next_soft, player_total, s)) {
            ev += p * sub;
        }
    }
    ev
}
