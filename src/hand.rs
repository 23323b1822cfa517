use crate::error::SolverError;

/// Card rank: 1 = ace, 2..=9 pip value, 10 = ten and every face card.
pub type Rank = u8;

pub const ACE: Rank = 1;
pub const MAX_RANK: Rank = 10;

pub fn check_rank(rank: Rank) -> Result<(), SolverError> {
    if (ACE..=MAX_RANK).contains(&rank) {
        Ok(())
    } else {
        Err(SolverError::InvalidRank(rank))
    }
}

/// Hand total with every ace counted low.
pub fn low_total(cards: &[Rank]) -> u8 {
    let sum: u16 = cards.iter().map(|&c| c as u16).sum();
    u8::try_from(sum).unwrap_or(u8::MAX)
}

/// Best blackjack total for a hand. Aces count as 1, and one ace is promoted
/// to 11 when that does not bust. A result over 21 means the hand is busted
/// (see [`is_busted`]); order of the cards never matters.
pub fn score(cards: &[Rank]) -> u8 {
    let low = low_total(cards) as u16;
    if cards.contains(&ACE) && low + 10 <= 21 {
        (low + 10) as u8
    } else {
        u8::try_from(low).unwrap_or(u8::MAX)
    }
}

/// Check if a hand is busted
pub fn is_busted(cards: &[Rank]) -> bool {
    score(cards) > 21
}

/// Check if a hand is a natural: two cards totalling 21, one of them an ace
pub fn is_blackjack(cards: &[Rank]) -> bool {
    cards.len() == 2 && cards.contains(&ACE) && score(cards) == 21
}

/// Check if a two-card hand can be split
pub fn is_pair(cards: &[Rank]) -> bool {
    cards.len() == 2 && cards[0] == cards[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_simple() {
        assert_eq!(score(&[2, 3]), 5);
        assert_eq!(score(&[10, 10]), 20);
    }

    #[test]
    fn test_score_blackjack() {
        assert_eq!(score(&[10, 1]), 21);
        assert_eq!(score(&[1, 10]), 21);
    }

    #[test]
    fn test_score_soft_ace() {
        assert_eq!(score(&[1, 6]), 17);
    }

    #[test]
    fn test_score_hard_ace() {
        assert_eq!(score(&[1, 6, 9]), 16);
    }

    #[test]
    fn test_score_twenty_one_either_counting() {
        assert_eq!(score(&[10, 10, 1]), 21);
        assert_eq!(score(&[2, 10, 7, 1, 1]), 21);
    }

    #[test]
    fn test_score_multiple_aces() {
        // only one ace is ever promoted
        assert_eq!(score(&[1, 1, 9]), 21);
        assert_eq!(score(&[1, 1]), 12);
    }

    #[test]
    fn test_score_order_invariant() {
        let hands: [&[Rank]; 3] = [&[2, 10, 7, 1, 1], &[10, 5, 1], &[3, 3, 9]];
        for hand in hands {
            let mut reversed = hand.to_vec();
            reversed.reverse();
            assert_eq!(score(hand), score(&reversed));
        }
    }

    #[test]
    fn test_score_bust() {
        assert_eq!(score(&[10, 10, 2]), 22);
        assert!(is_busted(&[10, 10, 2]));
        assert!(!is_busted(&[10, 10, 1]));
    }

    #[test]
    fn test_is_blackjack() {
        assert!(is_blackjack(&[1, 10]));
        assert!(is_blackjack(&[10, 1]));
        assert!(!is_blackjack(&[10, 10, 1])); // three cards
        assert!(!is_blackjack(&[10, 10])); // no ace
    }

    #[test]
    fn test_is_pair() {
        assert!(is_pair(&[8, 8]));
        assert!(!is_pair(&[8, 9]));
        assert!(!is_pair(&[8, 8, 8]));
    }

    #[test]
    fn test_check_rank() {
        assert_eq!(check_rank(0), Err(SolverError::InvalidRank(0)));
        assert_eq!(check_rank(11), Err(SolverError::InvalidRank(11)));
        assert!(check_rank(1).is_ok());
        assert!(check_rank(10).is_ok());
    }
}
