use std::path::PathBuf;
use thiserror::Error;
use crate::cli::Arguments;
use crate::utils::system::CancelFlag;

// Tag layout
//
// [0:4)   start marker, decodes to '#'
// [4:12)  sample id, two characters
// [12:16) separator marker, decodes to '$'
// [16:28) fragment id, three characters
pub const TAG_START_MARKER: &str = "TGTC";
pub const TAG_SEPARATOR_MARKER: &str = "TGAT";
pub const SAMPLE_ID_START: usize = 4;
pub const SAMPLE_ID_END: usize = 12;
pub const FRAGMENT_ID_START: usize = 16;
pub const FRAGMENT_ID_END: usize = 28;
pub const TAG_LEN: usize = 28;
pub const SAMPLE_ID_BASES: usize = SAMPLE_ID_END - SAMPLE_ID_START;
pub const FRAGMENT_ID_BASES: usize = FRAGMENT_ID_END - FRAGMENT_ID_START;

/// Decoded tag shape, anchored at the start of the decoded text.
pub const TAG_TEXT_FORMAT: &str = r"^#[0-9]{2}\$[0-9]{3}";

pub const CODON_SIZE: usize = 4;
pub const BINARY_WORD_SIZE: usize = 8;

// Static Parameters

/// Frame-corrected reads are capped at this many bases (tag + message).
pub const MAX_OLIGO_LEN: usize = 104;

/// Minimum support for the winning base at every position of a fragment.
pub const COUNT_THRESHOLD: u64 = 100;

pub const VALID_BASES: &[u8] = b"ACGT";

// Array synthesis adapters flanking every ordered oligo; B is ligated as its reverse complement
pub const UNIVERSAL_A: &str = "CTACACGACGCTCTTCCGATCT";
pub const UNIVERSAL_B: &str = "TGCTGAACCGCTCTTCCGATCT";
pub const ARRAY_TAIL: &str = "AA";

// Array chunking defaults: 28 tag bases + 76 payload bases = MAX_OLIGO_LEN
pub const ARRAY_CHUNK_SIZE: usize = 76;
pub const ARRAY_STEP_SIZE: usize = 76;
/// Codon for `'`.
pub const ARRAY_STUFFER: &str = "TGAC";
pub const MAX_SAMPLE_ID: usize = 99;
pub const MAX_FRAGMENT_ID: usize = 999;

pub const READ_CHANNEL_BUFFER: usize = 1_000;
pub const PROGRESS_INTERVAL: u64 = 1_000_000;

// Approximate resident cost of one position counter, four (base, count) slots plus the Vec header.
pub const COUNTER_BYTES_ESTIMATE: u64 = 4 * 16 + 24;

// Static Filenames
pub const CONDENSED_TAG: &str = "condensed";
pub const TRANSLATED_TAG: &str = "translated";
pub const ENCODED_TAG: &str = "encoded";
pub const DECODED_TAG: &str = "decoded";
pub const CHUNKS_TAG: &str = "chunks";
pub const ARTIFACT_EXT: &str = "txt";

pub const FASTA_TAG : &str = "fasta";
pub const FASTQ_TAG : &str = "fastq";
pub const FASTA_EXTS: &[&'static str] = &["fasta", "fa", "fna", "faa", "ffn", "frn"];
pub const FASTQ_EXTS: &[&'static str] = &["fastq", "fq"];


#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid FASTQ/FASTA input: {0}")]
    InvalidFastqFormat(String),

    #[error("I/O error: {0}")]
    IOError(String),

    #[error("{codec} codec error: {reason}")]
    Codec {
        codec: &'static str,
        reason: String,
    },

    #[error("Consensus index already resolved; cannot ingest sample '{sample_id}' fragment '{fragment_id}'")]
    IndexResolved {
        sample_id: String,
        fragment_id: String,
    },

    #[error("Run cancelled during {0}")]
    Cancelled(&'static str),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<std::io::Error> for PipelineError {
    fn from(e: std::io::Error) -> Self {
        PipelineError::IOError(e.to_string())
    }
}


pub struct RunConfig {
    pub cwd: PathBuf,
    pub out_dir: PathBuf,
    pub args: Arguments,
    pub cancel: CancelFlag,
}
