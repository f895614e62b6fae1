use log::{debug, info};
use crate::config::defs::PipelineError;
use crate::demux::counter::PositionCounter;
use crate::demux::index::{ConsensusIndex, FragmentState};
use crate::utils::system::CancelFlag;

/// First position whose winning base is under the count threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeakPosition {
    pub position: usize,
    pub max_count: u64,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ResolveSummary {
    pub resolved: usize,
    pub discarded: usize,
}

/// Majority-vote consensus of one fragment.
///
/// A single position under `threshold` rejects the whole fragment; scanning
/// stops at that position. A fragment with no positions has no evidence and is
/// rejected at position 0.
///
/// # Arguments
///
/// * `votes` - Per-position counters of the fragment.
/// * `threshold` - Minimum count for the winning base at every position.
///
/// # Returns
/// The consensus sequence, or the first weak position.
pub fn consensus_sequence(votes: &[PositionCounter], threshold: u64) -> Result<String, WeakPosition> {
    if votes.is_empty() {
        return Err(WeakPosition { position: 0, max_count: 0 });
    }
    let mut consensus = String::with_capacity(votes.len());
    for (position, counter) in votes.iter().enumerate() {
        let max_count = counter.max_value();
        match counter.argmax() {
            Some(base) if max_count >= threshold => consensus.push(base as char),
            _ => return Err(WeakPosition { position, max_count }),
        }
    }
    Ok(consensus)
}

/// Replaces every accumulating bucket with its consensus, deleting the ones
/// that fail the threshold, and seals the index against further ingestion.
///
/// # Arguments
///
/// * `index` - Fully ingested consensus index.
/// * `threshold` - Minimum count for the winning base at every position.
/// * `cancel` - Checked before each fragment.
///
/// # Returns
/// Counts of resolved and discarded fragments.
pub fn resolve(index: &mut ConsensusIndex, threshold: u64, cancel: &CancelFlag) -> Result<ResolveSummary, PipelineError> {
    let mut summary = ResolveSummary::default();

    for (sample_id, fragments) in index.samples_mut().iter_mut() {
        let mut discarded = Vec::new();
        for (fragment_id, state) in fragments.iter_mut() {
            if cancel.is_cancelled() {
                return Err(PipelineError::Cancelled("consensus resolution"));
            }
            if let FragmentState::Accumulating(votes) = state {
                match consensus_sequence(votes, threshold) {
                    Ok(consensus) => {
                        *state = FragmentState::Resolved(consensus);
                        summary.resolved += 1;
                    }
                    Err(weak) => {
                        debug!(
                            "Discarding sample {} fragment {}: position {} has max count {}",
                            sample_id, fragment_id, weak.position, weak.max_count
                        );
                        discarded.push(fragment_id.clone());
                    }
                }
            }
        }
        for fragment_id in discarded {
            fragments.remove(&fragment_id);
            summary.discarded += 1;
        }
    }

    index.mark_resolved();
    info!(
        "Resolved {} fragments; discarded {} below count threshold {}",
        summary.resolved, summary.discarded, threshold
    );
    Ok(summary)
}
