use thiserror::Error;

/// Errors surfaced by the solver. A cache miss is never one of these; every
/// variant indicates a caller bug or an unreachable deck composition.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SolverError {
    #[error("invalid card rank {0}, expected 1..=10")]
    InvalidRank(u8),

    #[error("cannot remove a {0} from the shoe, none left")]
    ShoeUnderflow(u8),

    #[error("player hand is empty")]
    EmptyHand,

    #[error("player hand is already busted at {0}")]
    BustedHand(u8),

    #[error("split base hand must hold exactly one card, got {len}")]
    SplitBase { len: usize },
}
