use crate::error::SolverError;
use crate::hand::{check_rank, Rank, ACE, MAX_RANK};

/// Multiset of the ranks still in the shoe, one count per rank.
///
/// Solver recursions mutate a shoe in a strict decrement-before-recurse,
/// increment-after discipline: every exit path, including bust
/// short-circuits and error returns, must leave the composition exactly as
/// it found it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shoe {
    counts: [u16; MAX_RANK as usize],
}

impl Shoe {
    /// Tally a raw deck array into per-rank counts.
    pub fn from_cards(cards: &[Rank]) -> Result<Self, SolverError> {
        let mut counts = [0u16; MAX_RANK as usize];
        for &card in cards {
            check_rank(card)?;
            counts[(card - 1) as usize] += 1;
        }
        Ok(Shoe { counts })
    }

    pub fn count(&self, rank: Rank) -> u16 {
        self.counts[(rank - 1) as usize]
    }

    pub fn total(&self) -> u32 {
        self.counts.iter().map(|&c| c as u32).sum()
    }

    /// Take one card of `rank` out of the shoe.
    pub fn remove(&mut self, rank: Rank) -> Result<(), SolverError> {
        check_rank(rank)?;
        let slot = &mut self.counts[(rank - 1) as usize];
        if *slot == 0 {
            return Err(SolverError::ShoeUnderflow(rank));
        }
        *slot -= 1;
        Ok(())
    }

    /// Put a previously removed card back.
    pub fn replace(&mut self, rank: Rank) {
        debug_assert!(check_rank(rank).is_ok());
        self.counts[(rank - 1) as usize] += 1;
    }

    /// Run `f` with one card of `rank` taken out of the shoe, restoring it
    /// afterwards whatever `f` does. Scoped acquisition for the
    /// decrement-before-recurse discipline.
    pub fn with_removed<T>(
        &mut self,
        rank: Rank,
        f: impl FnOnce(&mut Self) -> T,
    ) -> Result<T, SolverError> {
        self.remove(rank)?;
        let result = f(self);
        self.replace(rank);
        Ok(result)
    }

    /// Like [`Shoe::with_removed`] for a whole combination. If any card is
    /// unavailable the ones already taken are put back before the error
    /// returns.
    pub fn with_removed_all<T>(
        &mut self,
        ranks: &[Rank],
        f: impl FnOnce(&mut Self) -> T,
    ) -> Result<T, SolverError> {
        for (taken, &rank) in ranks.iter().enumerate() {
            if let Err(err) = self.remove(rank) {
                for &r in &ranks[..taken] {
                    self.replace(r);
                }
                return Err(err);
            }
        }
        let result = f(self);
        for &rank in ranks {
            self.replace(rank);
        }
        Ok(result)
    }

    /// Ranks with at least one card left, ascending.
    pub fn ranks(&self) -> impl Iterator<Item = Rank> + '_ {
        (ACE..=MAX_RANK).filter(move |&r| self.count(r) > 0)
    }

    /// Canonical key for this composition. Derived from the fixed-order
    /// count array, so it is independent of how the deck array was ordered.
    pub fn cache_key(&self) -> String {
        self.counts
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cards_tallies() {
        let shoe = Shoe::from_cards(&[2, 2, 3, 10, 10, 10, 1]).unwrap();
        assert_eq!(shoe.count(2), 2);
        assert_eq!(shoe.count(3), 1);
        assert_eq!(shoe.count(10), 3);
        assert_eq!(shoe.count(1), 1);
        assert_eq!(shoe.count(7), 0);
        assert_eq!(shoe.total(), 7);
    }

    #[test]
    fn test_from_cards_rejects_bad_rank() {
        assert_eq!(
            Shoe::from_cards(&[2, 11]),
            Err(SolverError::InvalidRank(11))
        );
        assert_eq!(Shoe::from_cards(&[0]), Err(SolverError::InvalidRank(0)));
    }

    #[test]
    fn test_remove_underflow() {
        let mut shoe = Shoe::from_cards(&[5]).unwrap();
        assert!(shoe.remove(5).is_ok());
        assert_eq!(shoe.remove(5), Err(SolverError::ShoeUnderflow(5)));
    }

    #[test]
    fn test_remove_then_replace_restores() {
        let mut shoe = Shoe::from_cards(&[4, 4, 9]).unwrap();
        let before = shoe.clone();
        shoe.remove(4).unwrap();
        shoe.remove(9).unwrap();
        shoe.replace(9);
        shoe.replace(4);
        assert_eq!(shoe, before);
    }

    #[test]
    fn test_with_removed_restores() {
        let mut shoe = Shoe::from_cards(&[4, 4, 9]).unwrap();
        let before = shoe.clone();
        let inner_total = shoe.with_removed(4, |s| s.total()).unwrap();
        assert_eq!(inner_total, 2);
        assert_eq!(shoe, before);
    }

    #[test]
    fn test_with_removed_unavailable_rank() {
        let mut shoe = Shoe::from_cards(&[4]).unwrap();
        let err = shoe.with_removed(9, |_| ()).unwrap_err();
        assert_eq!(err, SolverError::ShoeUnderflow(9));
    }

    #[test]
    fn test_with_removed_all_partial_failure_restores() {
        let mut shoe = Shoe::from_cards(&[4, 4, 9]).unwrap();
        let before = shoe.clone();
        let err = shoe.with_removed_all(&[4, 9, 9], |_| ()).unwrap_err();
        assert_eq!(err, SolverError::ShoeUnderflow(9));
        assert_eq!(shoe, before);
    }

    #[test]
    fn test_cache_key_order_independent() {
        let a = Shoe::from_cards(&[10, 2, 1, 2]).unwrap();
        let b = Shoe::from_cards(&[2, 1, 10, 2]).unwrap();
        assert_eq!(a.cache_key(), b.cache_key());
    }

    #[test]
    fn test_cache_key_distinguishes_compositions() {
        let a = Shoe::from_cards(&[2, 2]).unwrap();
        let b = Shoe::from_cards(&[2]).unwrap();
        assert_ne!(a.cache_key(), b.cache_key());
    }

    #[test]
    fn test_ranks_skips_empty() {
        let shoe = Shoe::from_cards(&[3, 3, 8]).unwrap();
        let ranks: Vec<Rank> = shoe.ranks().collect();
        assert_eq!(ranks, vec![3, 8]);
    }
}
