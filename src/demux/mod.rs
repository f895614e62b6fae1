//! Read demultiplexing and consensus reconstruction.
//!
//! Data flows one way through the stages:
//! raw read -> [`tag`] -> [`index`] (vote accumulation) -> [`consensus`]
//! -> [`assemble`] -> [`translate`].

pub mod assemble;
pub mod consensus;
pub mod counter;
pub mod index;
pub mod tag;
pub mod translate;

pub use assemble::assemble;
pub use consensus::{resolve, ResolveSummary};
pub use counter::PositionCounter;
pub use index::{ConsensusIndex, FragmentState};
pub use tag::{extract_tag, TagRejection, TaggedRead};
pub use translate::{write_sample_payload, SampleArtifacts};
