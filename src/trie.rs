use std::collections::HashMap;

use crate::hand::Rank;

/// Prefix tree memoizing one final EV per rank path.
///
/// Paths are sorted rank sequences, so every distinct hand composition maps
/// to exactly one node. Nodes are created on demand and never deleted; a
/// trie is only valid for the deck composition it was populated against.
#[derive(Debug, Default)]
pub struct EvTrie {
    final_ev: Option<f64>,
    children: HashMap<Rank, EvTrie>,
}

impl EvTrie {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` at the end of `path`, creating intermediate nodes as
    /// needed. The zero-length path addresses the root itself.
    pub fn insert(&mut self, path: &[Rank], value: f64) {
        match path.split_first() {
            None => self.final_ev = Some(value),
            Some((&head, rest)) => self.children.entry(head).or_default().insert(rest, value),
        }
    }

    /// Value stored under exactly `path`, if any. A miss is normal control
    /// flow meaning "compute and insert", never an error.
    pub fn lookup(&self, path: &[Rank]) -> Option<f64> {
        match path.split_first() {
            None => self.final_ev,
            Some((&head, rest)) => self.children.get(&head)?.lookup(rest),
        }
    }
}
