//! Pair enumeration over a seed set

use std::iter::FusedIterator;

use crate::types::PairTask;

/// Lazy, finite sequence of pair tasks covering every unordered pair once.
///
/// Seeds are sorted and deduplicated; task `i` pairs `items[i]` with every
/// later item, so each pair is emitted under its lexicographically smaller
/// member. The last item has no later items and produces no task.
#[derive(Debug, Clone)]
pub struct PairEnumerator {
    items: Vec<String>,
    index: usize,
}

impl PairEnumerator {
    pub fn new<I, S>(seeds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut items: Vec<String> = seeds.into_iter().map(Into::into).collect();
        items.sort();
        items.dedup();
        Self { items, index: 0 }
    }

    /// Distinct seed items
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Unordered pairs across all tasks, including ones already yielded
    pub fn pair_count(&self) -> usize {
        let n = self.items.len();
        n * n.saturating_sub(1) / 2
    }

    fn remaining_tasks(&self) -> usize {
        self.items.len().saturating_sub(1).saturating_sub(self.index)
    }
}

impl Iterator for PairEnumerator {
    type Item = PairTask;

    fn next(&mut self) -> Option<PairTask> {
        if self.remaining_tasks() == 0 {
            return None;
        }
        let left = self.items[self.index].clone();
        let candidates = self.items[self.index + 1..].to_vec();
        self.index += 1;
        Some(PairTask { left, candidates })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining_tasks();
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for PairEnumerator {}

impl FusedIterator for PairEnumerator {}
