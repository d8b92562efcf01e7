/// Identifier gap detection
///
/// Collects order identifiers in any arrival order and reports which values in
/// `0..=max` never showed up, which showed up twice, and whether arrival was
/// strictly increasing.

use std::collections::BTreeSet;

#[derive(Debug, Clone)]
pub struct GapDetector {
    seen: BTreeSet<u64>,
    duplicates: Vec<u64>,
    last_id: Option<u64>,
    in_order: bool,
}

impl GapDetector {
    pub fn new() -> Self {
        GapDetector {
            seen: BTreeSet::new(),
            duplicates: Vec::new(),
            last_id: None,
            in_order: true,
        }
    }

    /// Record one identifier
    pub fn process(&mut self, id: u64) {
        if let Some(last) = self.last_id {
            if id <= last {
                self.in_order = false;
            }
        }
        self.last_id = Some(id);

        if !self.seen.insert(id) {
            self.duplicates.push(id);
        }
    }

    /// Missing identifiers as (start, end) inclusive ranges, counted from 0
    pub fn gaps(&self) -> Vec<(u64, u64)> {
        let mut gaps = Vec::new();
        let mut expected = 0u64;
        for &id in &self.seen {
            if id > expected {
                gaps.push((expected, id - 1));
            }
            match id.checked_add(1) {
                Some(next) => expected = next,
                None => break,
            }
        }
        gaps
    }

    /// Total number of missing identifiers
    pub fn total_gaps(&self) -> u64 {
        self.gaps()
            .iter()
            .fold(0u64, |acc, &(start, end)| acc.saturating_add(end - start + 1))
    }

    pub fn duplicates(&self) -> &[u64] {
        &self.duplicates
    }

    /// True while every identifier arrived greater than the previous one
    pub fn is_sequential(&self) -> bool {
        self.in_order
    }

    /// Exactly {0, .., n-1} with nothing repeated
    pub fn is_complete(&self) -> bool {
        self.duplicates.is_empty() && self.gaps().is_empty()
    }
}

impl Default for GapDetector {
    fn default() -> Self {
        Self::new()
    }
}
