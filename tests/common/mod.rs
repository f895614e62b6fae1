#![allow(dead_code)]

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use flate2::write::GzEncoder;
use flate2::Compression;
use rand::rngs::StdRng;

use oligo_pipelines::cli::Arguments;
use oligo_pipelines::codec::{Codec, CodonCodec};
use oligo_pipelines::config::defs::RunConfig;
use oligo_pipelines::utils::fastx::write_fastq_record;
use oligo_pipelines::utils::sequence::{array_oligo, normal_phred_qual_string, oligo_tag};
use oligo_pipelines::utils::system::CancelFlag;

/// Text characters per 76-base payload chunk.
pub const CHUNK_CHARS: usize = 19;

pub fn run_config(cwd: &Path, input: &str, out_dir: &Path) -> Result<Arc<RunConfig>> {
    run_config_with(cwd, input, out_dir, |_| {})
}

pub fn run_config_with<F: FnOnce(&mut Arguments)>(
    cwd: &Path,
    input: &str,
    out_dir: &Path,
    customize: F,
) -> Result<Arc<RunConfig>> {
    std::fs::create_dir_all(out_dir)?;
    let mut args = Arguments { file1: Some(input.to_string()), ..Arguments::default() };
    customize(&mut args);
    Ok(Arc::new(RunConfig {
        cwd: cwd.to_path_buf(),
        out_dir: out_dir.to_path_buf(),
        args,
        cancel: CancelFlag::new(),
    }))
}

/// Codon DNA of `text` padded with spaces to a full chunk.
pub fn chunk(text: &str) -> Result<String> {
    assert!(text.len() <= CHUNK_CHARS);
    Ok(CodonCodec::new().text_to_dna(&format!("{:<width$}", text, width = CHUNK_CHARS))?)
}

/// `copies` array oligos for one fragment of a sample.
pub fn fragment_reads(sample: u32, fragment: u32, text: &str, copies: usize) -> Result<Vec<String>> {
    let oligo = array_oligo(&oligo_tag(sample, fragment)?, &chunk(text)?);
    Ok(vec![oligo; copies])
}

fn write_records<W: Write>(writer: &mut W, reads: &[String], rng: &mut StdRng) -> Result<()> {
    for (i, read) in reads.iter().enumerate() {
        let qual = normal_phred_qual_string(read.len(), 35.0, 3.0, rng);
        write_fastq_record(writer, &format!("read{}", i), None, read.as_bytes(), qual.as_bytes())?;
    }
    Ok(())
}

pub fn write_fastq(path: &Path, reads: &[String], rng: &mut StdRng) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_records(&mut writer, reads, rng)?;
    writer.flush()?;
    Ok(())
}

pub fn write_fastq_gz(path: &Path, reads: &[String], rng: &mut StdRng) -> Result<()> {
    let mut writer = GzEncoder::new(File::create(path)?, Compression::default());
    write_records(&mut writer, reads, rng)?;
    writer.finish()?;
    Ok(())
}
