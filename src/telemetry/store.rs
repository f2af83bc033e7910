//! Append-only sample history for one session.

/// One telemetry point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Ingestion counter, starting at 0.
    pub index: u64,
    /// Field strength in mT.
    pub value: f64,
}

/// Every sample received since the session started or was last reset.
///
/// Indices are always exactly `0..len()`. The store is unbounded: history
/// is kept in full so the chart can scroll back to the first sample.
#[derive(Debug, Clone, Default)]
pub struct SampleStore {
    samples: Vec<Sample>,
}

impl SampleStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value under the next index.
    pub fn append(&mut self, value: f64) {
        let index = self.samples.len() as u64;
        self.samples.push(Sample { index, value });
    }

    /// Drop all samples. The next append starts again at index 0.
    pub fn reset(&mut self) {
        self.samples.clear();
    }

    /// Samples with `start <= index < end`, clamped to the stored range.
    pub fn slice(&self, start: usize, end: usize) -> &[Sample] {
        let end = end.min(self.samples.len());
        let start = start.min(end);
        &self.samples[start..end]
    }

    /// Number of stored samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Most recent sample.
    pub fn last(&self) -> Option<&Sample> {
        self.samples.last()
    }

    /// Iterate over all samples in index order.
    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }
}
