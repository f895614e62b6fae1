// src/lib.rs
pub mod cli;
pub mod codec;
pub mod config;
pub mod demux;
pub mod pipelines;
pub mod utils;

pub use cli::{Arguments, CodecKind};
pub use codec::{Codec, CodonCodec, BinaryCodec};
pub use config::defs::{PipelineError, RunConfig};
