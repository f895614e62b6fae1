use clap::{Parser, ValueEnum};
use crate::config::defs::{ARRAY_CHUNK_SIZE, ARRAY_STEP_SIZE, ARRAY_STUFFER, COUNT_THRESHOLD, MAX_OLIGO_LEN};

#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq)]
pub enum CodecKind {
    #[default]
    Codon,
    Binary,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "oligo-pipelines", version, about = "DNA storage oligo encoding and read demultiplexing")]
pub struct Arguments {

    #[arg(short, long, help = "Pipeline module: demux, encode, decode or chunk")]
    pub module: String,

    #[arg(short = 'v', long = "verbose", action)]
    pub verbose: bool,

    #[arg(short = 'i', long = "file1", help = "Input reads (FASTQ/FASTA, optionally gzipped) or text for encode")]
    pub file1: Option<String>,

    #[arg(short = 'o', long = "out", help = "Output directory for all generated files. If not specified, a directory named '<input_stem>_YYYYMMDD' will be created in the current working directory.")]
    pub out_dir: Option<String>,

    #[arg(long = "codec", default_value = "codon", value_enum)]
    pub codec: CodecKind,

    #[arg(long, default_value_t = COUNT_THRESHOLD, help = "Minimum count of the winning base at every fragment position")]
    pub count_threshold: u64,

    #[arg(long, default_value_t = MAX_OLIGO_LEN, help = "Frame-corrected reads are truncated to this length")]
    pub max_oligo_len: usize,

    #[arg(long, default_value_t = ARRAY_STEP_SIZE, help = "Chunk: bases between the starts of consecutive chunks")]
    pub step_size: usize,

    #[arg(long, default_value_t = ARRAY_CHUNK_SIZE, help = "Chunk: payload bases per oligo")]
    pub chunk_size: usize,

    #[arg(long, default_value = ARRAY_STUFFER, help = "Chunk: bases repeated to fill the last chunk of a payload")]
    pub stuffer: String,

    #[arg(long, help = "Stop after this many input records")]
    pub max_reads: Option<usize>,

    #[clap(long, help = "Optional fixed seed for reproducibility; defaults to OS entropy")]
    pub seed: Option<u64>,
}

impl Default for Arguments {
    fn default() -> Self {
        Arguments {
            module: "demux".to_string(),
            verbose: false,
            file1: None,
            out_dir: None,
            codec: CodecKind::Codon,
            count_threshold: COUNT_THRESHOLD,
            max_oligo_len: MAX_OLIGO_LEN,
            step_size: ARRAY_STEP_SIZE,
            chunk_size: ARRAY_CHUNK_SIZE,
            stuffer: ARRAY_STUFFER.to_string(),
            max_reads: None,
            seed: None,
        }
    }
}
