use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use log::{debug, info, warn};
use tokio::sync::mpsc::Receiver;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::ReceiverStream;
use crate::cli::Arguments;
use crate::codec::{codec_for, Codec};
use crate::config::defs::{PipelineError, RunConfig, CHUNKS_TAG, MAX_FRAGMENT_ID, MAX_SAMPLE_ID, READ_CHANNEL_BUFFER, TAG_LEN, VALID_BASES};
use crate::pipelines::input_path;
use crate::utils::fastx::{read_sequences, write_fasta_record, SequenceRecord};
use crate::utils::file::{extension_remover, file_path_manipulator};
use crate::utils::sequence::{array_oligo, oligo_tag};
use crate::utils::system::CancelFlag;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkStats {
    pub output: PathBuf,
    /// Input payloads, one sample each.
    pub records: u64,
    pub oligos: u64,
}

/// Window settings for cutting a payload into oligo-sized pieces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkLayout {
    pub step: usize,
    pub chunk_size: usize,
    pub stuffer: String,
}

impl From<&Arguments> for ChunkLayout {
    fn from(args: &Arguments) -> Self {
        ChunkLayout {
            step: args.step_size,
            chunk_size: args.chunk_size,
            stuffer: args.stuffer.to_ascii_uppercase(),
        }
    }
}


/// Checks the window settings against the codec before any input is read.
///
/// A step longer than the chunk would skip payload bases, and a chunk that
/// does not hold whole codec words cannot be decoded downstream.
///
/// # Arguments
///
/// * `layout` - Window settings.
/// * `codec` - Codec the payloads were encoded with.
/// * `max_oligo_len` - Read cap applied by demux.
///
/// # Returns
/// Err(PipelineError::InvalidConfig) on an unusable layout.
pub fn validate_layout(layout: &ChunkLayout, codec: &dyn Codec, max_oligo_len: usize) -> Result<(), PipelineError> {
    if layout.step == 0 || layout.step > layout.chunk_size {
        return Err(PipelineError::InvalidConfig(format!(
            "step size {} must be between 1 and the chunk size {}",
            layout.step, layout.chunk_size
        )));
    }
    let width = codec.width();
    if layout.chunk_size % width != 0 || layout.step % width != 0 {
        return Err(PipelineError::InvalidConfig(format!(
            "chunk size {} and step size {} must be multiples of the {} codec width {}",
            layout.chunk_size,
            layout.step,
            codec.name(),
            width
        )));
    }
    if layout.stuffer.is_empty() || !layout.stuffer.bytes().all(|b| VALID_BASES.contains(&b)) {
        return Err(PipelineError::InvalidConfig(format!(
            "stuffer '{}' must be a non-empty run of A, C, G and T",
            layout.stuffer
        )));
    }
    if TAG_LEN + layout.chunk_size > max_oligo_len {
        warn!(
            "Tag plus chunk is {} bases but demux keeps only {}; chunk tails will be cut off",
            TAG_LEN + layout.chunk_size,
            max_oligo_len
        );
    }
    Ok(())
}


/// Cuts `seq` into windows of `chunk_size` bases starting every `step` bases.
///
/// A window running past the end is filled up to `chunk_size` by repeating
/// the stuffer. Empty input yields no windows.
pub fn chunk_sequence(seq: &str, layout: &ChunkLayout) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut start = 0;
    while start < seq.len() {
        let end = (start + layout.chunk_size).min(seq.len());
        let mut chunk = String::with_capacity(layout.chunk_size);
        chunk.push_str(&seq[start..end]);
        chunk.extend(layout.stuffer.chars().cycle().take(layout.chunk_size - (end - start)));
        chunks.push(chunk);
        start += layout.step;
    }
    chunks
}


/// Writes one FASTA record per array oligo for every payload record.
///
/// Records are numbered as samples in input order from 0. Each oligo id is
/// `<record id>_<fragment>` and its description is the decoded tag.
///
/// # Arguments
///
/// * `rx` - Payload stream from `read_sequences`.
/// * `writer` - FASTA output.
/// * `layout` - Window settings, already validated.
/// * `cancel` - Checked before each record.
///
/// # Returns
/// Tuple: (records read, oligos written).
pub async fn chunk_records<W: Write>(
    rx: Receiver<Result<SequenceRecord, PipelineError>>,
    writer: &mut W,
    layout: &ChunkLayout,
    cancel: &CancelFlag,
) -> Result<(u64, u64), PipelineError> {
    let mut stream = ReceiverStream::new(rx);
    let mut records = 0usize;
    let mut oligos = 0u64;

    while let Some(record) = stream.next().await {
        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled("chunking"));
        }
        let record = record?;
        let sample = records;
        if sample > MAX_SAMPLE_ID {
            return Err(PipelineError::InvalidConfig(format!(
                "more than {} payload records; sample ids are two digits",
                MAX_SAMPLE_ID + 1
            )));
        }

        let seq = record.seq().to_ascii_uppercase();
        if let Some(bad) = seq.iter().find(|b| !VALID_BASES.contains(b)) {
            return Err(PipelineError::InvalidFastqFormat(format!(
                "payload '{}' contains non-ACGT base '{}'",
                record.id(),
                *bad as char
            )));
        }
        let seq = String::from_utf8_lossy(&seq);

        let chunks = chunk_sequence(&seq, layout);
        if chunks.len() > MAX_FRAGMENT_ID + 1 {
            return Err(PipelineError::InvalidConfig(format!(
                "payload '{}' needs {} chunks; fragment ids stop at {}",
                record.id(),
                chunks.len(),
                MAX_FRAGMENT_ID
            )));
        }

        for (fragment, chunk) in chunks.iter().enumerate() {
            let tag = oligo_tag(sample as u32, fragment as u32)?;
            let oligo = array_oligo(&tag, chunk);
            let id = format!("{}_{:03}", record.id(), fragment);
            let desc = format!("#{:02}${:03}", sample, fragment);
            write_fasta_record(writer, &id, Some(&desc), oligo.as_bytes())?;
            oligos += 1;
        }
        debug!("Payload {} ({} bases) -> sample {:02}, {} oligos", record.id(), seq.len(), sample, chunks.len());
        records += 1;
    }
    writer.flush()?;
    Ok((records as u64, oligos))
}


/// `<out_dir>/<input stem>_chunks.fa`
fn output_path(out_dir: &Path, input: &Path) -> PathBuf {
    let (stem, _) = extension_remover(input);
    let name = stem
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "payload".to_string());
    file_path_manipulator(Path::new(&name), Some(out_dir), None, Some(&format!("{}.fa", CHUNKS_TAG)), "_")
}


/// Run function for array oligo chunking
///
/// # Arguments
///
/// * `config` - RunConfig struct from main.
///
/// # Returns
/// Result<ChunkStats, PipelineError>
pub async fn run(config: Arc<RunConfig>) -> Result<ChunkStats, PipelineError> {
    info!("\n-------------\n Oligo Chunk\n-------------\n");
    let layout = ChunkLayout::from(&config.args);
    let codec = codec_for(config.args.codec, config.args.seed);
    validate_layout(&layout, codec.as_ref(), config.args.max_oligo_len)?;

    let input = input_path(&config, "chunk")?;
    let output = output_path(&config.out_dir, &input);
    let rx = read_sequences(input, config.args.max_reads, READ_CHANNEL_BUFFER)?;
    let mut writer = BufWriter::new(File::create(&output)?);
    let (records, oligos) = chunk_records(rx, &mut writer, &layout, &config.cancel).await?;

    info!(
        "Chunked {} payloads into {} oligos (chunk {}, step {}) at {}",
        records,
        oligos,
        layout.chunk_size,
        layout.step,
        output.display()
    );
    Ok(ChunkStats { output, records, oligos })
}
