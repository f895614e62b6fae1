/// Observed base counts at one fragment position.
///
/// Slots are created on first observation and kept sorted by base byte, so
/// `argmax` resolves ties to the lowest byte (A < C < G < T) no matter in which
/// order the reads arrived.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionCounter {
    counts: Vec<(u8, u64)>,
}

impl PositionCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, base: u8) {
        match self.counts.binary_search_by_key(&base, |&(b, _)| b) {
            Ok(i) => self.counts[i].1 += 1,
            Err(i) => self.counts.insert(i, (base, 1)),
        }
    }

    /// Count for `base`, zero when never observed.
    pub fn get(&self, base: u8) -> u64 {
        self.counts
            .binary_search_by_key(&base, |&(b, _)| b)
            .map(|i| self.counts[i].1)
            .unwrap_or(0)
    }

    /// Base with the highest count; the lowest base byte wins a tie.
    pub fn argmax(&self) -> Option<u8> {
        let max = self.max_value();
        self.counts
            .iter()
            .find(|&&(_, count)| count == max)
            .map(|&(base, _)| base)
    }

    pub fn max_value(&self) -> u64 {
        self.counts.iter().map(|&(_, count)| count).max().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().map(|&(_, count)| count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}
