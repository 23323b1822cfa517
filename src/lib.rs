// TODO: memoize stand EVs per (player total, deck key) so the hit DP stops
// re-sampling identical dealer states

mod dealer;
mod enumerate;
mod error;
mod hand;
mod odds;
mod shoe;
mod trie;

pub use dealer::{stand_ev_exact, stand_ev_sampled, DealerResolution};
pub use enumerate::{draw_combinations, group_by_len_desc};
pub use error::SolverError;
pub use hand::{is_blackjack, is_busted, is_pair, low_total, score, Rank, ACE, MAX_RANK};
pub use odds::{get_odds, Odds, OddsSolver, SolverConfig};
pub use shoe::Shoe;
pub use trie::EvTrie;
