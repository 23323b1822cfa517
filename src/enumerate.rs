use std::collections::BTreeMap;

use crate::hand::{Rank, MAX_RANK};
use crate::shoe::Shoe;

/// Every distinct combination of additional cards drawable from `shoe` whose
/// total (aces counted low) stays within `max_total`.
///
/// The search only ever extends with ranks at least as large as the last one
/// chosen, so each multiset is emitted exactly once rather than once per
/// ordering. Per-rank counts are respected by decrementing on descent and
/// restoring on backtrack; the shoe is unchanged on return. Combinations
/// come out ascending-sorted.
pub fn draw_combinations(shoe: &mut Shoe, max_total: u8) -> Vec<Vec<Rank>> {
    let mut combos = Vec::new();
    let mut prefix = Vec::new();
    dfs(shoe, max_total, 1, &mut prefix, &mut combos);
    combos
}

fn dfs(
    shoe: &mut Shoe,
    budget: u8,
    min_rank: Rank,
    prefix: &mut Vec<Rank>,
    out: &mut Vec<Vec<Rank>>,
) {
    for rank in min_rank..=MAX_RANK {
        if rank > budget {
            continue;
        }
        // an exhausted rank is just a pruned branch
        let _ = shoe.with_removed(rank, |shoe| {
            prefix.push(rank);
            out.push(prefix.clone());
            dfs(shoe, budget - rank, rank, prefix, out);
            prefix.pop();
        });
    }
}

/// Bucket combinations by length, longest bucket first, with the empty
/// combination appended as the final sentinel group (the hand as dealt, no
/// further draws). The hit-EV engine depends on this ordering: a path's
/// one-card extensions must be evaluated before the path itself.
pub fn group_by_len_desc(combos: Vec<Vec<Rank>>) -> Vec<Vec<Vec<Rank>>> {
    let mut by_len: BTreeMap<usize, Vec<Vec<Rank>>> = BTreeMap::new();
    for combo in combos {
        by_len.entry(combo.len()).or_default().push(combo);
    }
    let mut groups: Vec<Vec<Vec<Rank>>> = by_len.into_values().rev().collect();
    groups.push(vec![Vec::new()]);
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hand::low_total;

    #[test]
    fn test_small_deck_target_five() {
        let mut shoe = Shoe::from_cards(&[2, 2, 3]).unwrap();
        let combos = draw_combinations(&mut shoe, 5);

        assert!(combos.iter().all(|c| low_total(c) <= 5));

        let exactly_five: Vec<&Vec<Rank>> =
            combos.iter().filter(|c| low_total(c) == 5).collect();
        assert_eq!(exactly_five, vec![&vec![2, 3]]);
    }

    #[test]
    fn test_no_duplicate_multisets() {
        let mut shoe = Shoe::from_cards(&[2, 2, 3, 3, 5]).unwrap();
        let combos = draw_combinations(&mut shoe, 10);
        let mut sorted: Vec<Vec<Rank>> = combos.clone();
        for combo in &mut sorted {
            combo.sort_unstable();
        }
        sorted.sort();
        let before = sorted.len();
        sorted.dedup();
        assert_eq!(sorted.len(), before, "duplicate multiset emitted");
    }

    #[test]
    fn test_respects_counts() {
        let mut shoe = Shoe::from_cards(&[2, 2]).unwrap();
        let combos = draw_combinations(&mut shoe, 21);
        assert!(!combos.contains(&vec![2, 2, 2]));
        assert!(combos.contains(&vec![2, 2]));
    }

    #[test]
    fn test_shoe_restored() {
        let mut shoe = Shoe::from_cards(&[1, 2, 5, 5, 10]).unwrap();
        let before = shoe.clone();
        let _ = draw_combinations(&mut shoe, 21);
        assert_eq!(shoe, before);
    }

    #[test]
    fn test_grouping_longest_first_with_sentinel() {
        let mut shoe = Shoe::from_cards(&[2, 2, 3]).unwrap();
        let combos = draw_combinations(&mut shoe, 7);
        let groups = group_by_len_desc(combos);

        let lens: Vec<usize> = groups
            .iter()
            .map(|g| g.first().map(|c| c.len()).unwrap_or(0))
            .collect();
        let mut sorted = lens.clone();
        sorted.sort_unstable_by(|a, b| b.cmp(a));
        assert_eq!(lens, sorted, "groups not in descending length order");

        let last = groups.last().unwrap();
        assert_eq!(last, &vec![Vec::<Rank>::new()]);
    }

    #[test]
    fn test_aces_counted_low() {
        let mut shoe = Shoe::from_cards(&[1, 1, 1]).unwrap();
        let combos = draw_combinations(&mut shoe, 3);
        assert!(combos.contains(&vec![1, 1, 1]));
    }
}
