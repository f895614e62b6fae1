use fxhash::FxHashMap;
use crate::config::defs::PipelineError;
use crate::demux::counter::PositionCounter;

pub type SampleKey = String;
pub type FragmentKey = String;

/// One counter per message position; grows with the longest read seen.
pub type FragmentVotes = Vec<PositionCounter>;

/// Per (sample, fragment) bucket. `Resolved` is terminal; a discarded
/// fragment is removed from the index rather than given a state.
#[derive(Debug, Clone, PartialEq)]
pub enum FragmentState {
    Accumulating(FragmentVotes),
    Resolved(String),
}

/// All vote buckets of a run, keyed by sample then fragment.
///
/// Ingestion is only allowed until the index is resolved; afterwards every
/// surviving bucket holds its consensus string and is never mutated again.
#[derive(Debug, Default)]
pub struct ConsensusIndex {
    samples: FxHashMap<SampleKey, FxHashMap<FragmentKey, FragmentState>>,
    resolved: bool,
}

impl ConsensusIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one vote per message position to the bucket for `(sample_id, fragment_id)`.
    ///
    /// Buckets and counters are created on first use. Counts commute, so the
    /// final index does not depend on ingestion order.
    ///
    /// # Arguments
    ///
    /// * `sample_id` - Decoded sample ID.
    /// * `fragment_id` - Decoded fragment ID.
    /// * `message` - Message region of a frame-corrected read.
    ///
    /// # Returns
    /// Err(PipelineError::IndexResolved) once the index has been resolved.
    pub fn ingest(&mut self, sample_id: &str, fragment_id: &str, message: &[u8]) -> Result<(), PipelineError> {
        let sealed = || PipelineError::IndexResolved {
            sample_id: sample_id.to_string(),
            fragment_id: fragment_id.to_string(),
        };
        if self.resolved {
            return Err(sealed());
        }

        let state = self
            .samples
            .entry(sample_id.to_string())
            .or_default()
            .entry(fragment_id.to_string())
            .or_insert_with(|| FragmentState::Accumulating(Vec::new()));

        match state {
            FragmentState::Accumulating(votes) => {
                if votes.len() < message.len() {
                    votes.resize_with(message.len(), PositionCounter::new);
                }
                for (counter, &base) in votes.iter_mut().zip(message) {
                    counter.increment(base);
                }
                Ok(())
            }
            FragmentState::Resolved(_) => Err(sealed()),
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    pub(crate) fn mark_resolved(&mut self) {
        self.resolved = true;
    }

    pub(crate) fn samples_mut(&mut self) -> &mut FxHashMap<SampleKey, FxHashMap<FragmentKey, FragmentState>> {
        &mut self.samples
    }

    /// Sample IDs in ascending order.
    pub fn sample_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.samples.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn state(&self, sample_id: &str, fragment_id: &str) -> Option<&FragmentState> {
        self.samples.get(sample_id)?.get(fragment_id)
    }

    pub fn votes(&self, sample_id: &str, fragment_id: &str) -> Option<&FragmentVotes> {
        match self.state(sample_id, fragment_id)? {
            FragmentState::Accumulating(votes) => Some(votes),
            FragmentState::Resolved(_) => None,
        }
    }

    pub fn consensus(&self, sample_id: &str, fragment_id: &str) -> Option<&str> {
        match self.state(sample_id, fragment_id)? {
            FragmentState::Resolved(seq) => Some(seq),
            FragmentState::Accumulating(_) => None,
        }
    }

    /// Resolved `(fragment_id, consensus)` pairs of one sample, unordered.
    pub fn consensus_fragments(&self, sample_id: &str) -> Vec<(&str, &str)> {
        self.samples
            .get(sample_id)
            .map(|fragments| {
                fragments
                    .iter()
                    .filter_map(|(id, state)| match state {
                        FragmentState::Resolved(seq) => Some((id.as_str(), seq.as_str())),
                        FragmentState::Accumulating(_) => None,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn fragment_count(&self) -> usize {
        self.samples.values().map(|fragments| fragments.len()).sum()
    }

    /// Position counters currently resident.
    pub fn counter_count(&self) -> u64 {
        self.samples
            .values()
            .flat_map(|fragments| fragments.values())
            .map(|state| match state {
                FragmentState::Accumulating(votes) => votes.len() as u64,
                FragmentState::Resolved(_) => 0,
            })
            .sum()
    }
}
