use std::path::Path;
use std::sync::Arc;
use log::{debug, info};
use tokio::sync::mpsc::Receiver;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::ReceiverStream;
use crate::cli::Arguments;
use crate::codec::{codec_for, Codec};
use crate::config::defs::{PipelineError, RunConfig, CODON_SIZE, PROGRESS_INTERVAL, READ_CHANNEL_BUFFER, TAG_LEN};
use crate::demux::{assemble, extract_tag, resolve, write_sample_payload, ConsensusIndex, SampleArtifacts};
use crate::pipelines::input_path;
use crate::utils::fastx::{read_sequences, SequenceRecord};
use crate::utils::system::{report_index_memory, CancelFlag};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DemuxStats {
    pub reads_seen: u64,
    pub reads_accepted: u64,
    pub fragments_resolved: usize,
    pub fragments_discarded: usize,
    pub samples: Vec<SampleArtifacts>,
}


/// Checks the assay parameters before any input is read.
///
/// # Arguments
///
/// * `args` - Parsed command-line arguments.
///
/// # Returns
/// Err(PipelineError::InvalidConfig) on an unusable threshold or length cap.
pub fn validate_params(args: &Arguments) -> Result<(), PipelineError> {
    if args.count_threshold == 0 {
        return Err(PipelineError::InvalidConfig("count threshold must be at least 1".to_string()));
    }
    if args.max_oligo_len < TAG_LEN || args.max_oligo_len % CODON_SIZE != 0 {
        return Err(PipelineError::InvalidConfig(format!(
            "max oligo length {} must be at least {} and a multiple of {}",
            args.max_oligo_len, TAG_LEN, CODON_SIZE
        )));
    }
    Ok(())
}


/// Drains the record stream into a consensus index.
///
/// Reads without a valid tag are dropped silently. A record error from the
/// reader is fatal and ends the run.
///
/// # Arguments
///
/// * `rx` - Record stream from `read_sequences`.
/// * `codec` - Tag decoder.
/// * `max_oligo_len` - Cap on frame-corrected read length.
/// * `cancel` - Checked before each read.
///
/// # Returns
/// Tuple: (index, reads seen, reads accepted).
pub async fn accumulate_reads(
    rx: Receiver<Result<SequenceRecord, PipelineError>>,
    codec: &dyn Codec,
    max_oligo_len: usize,
    cancel: &CancelFlag,
) -> Result<(ConsensusIndex, u64, u64), PipelineError> {
    let mut index = ConsensusIndex::new();
    let mut stream = ReceiverStream::new(rx);
    let mut reads_seen = 0u64;
    let mut reads_accepted = 0u64;

    while let Some(record) = stream.next().await {
        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled("read ingestion"));
        }
        let record = record?;
        reads_seen += 1;

        if let Ok(tagged) = extract_tag(record.seq(), codec, max_oligo_len) {
            index.ingest(&tagged.sample_id, &tagged.fragment_id, tagged.message)?;
            reads_accepted += 1;
        }

        if reads_seen % PROGRESS_INTERVAL == 0 {
            debug!("Processed {} reads, {} tagged", reads_seen, reads_accepted);
        }
    }

    Ok((index, reads_seen, reads_accepted))
}


/// Assembles and writes every sample of a resolved index, in sample order.
///
/// # Arguments
///
/// * `index` - Resolved consensus index.
/// * `out_dir` - Existing output directory.
/// * `codec` - Payload decoder.
/// * `cancel` - Checked before each sample.
///
/// # Returns
/// Artifacts of samples with a non-empty payload.
pub fn emit_samples(
    index: &ConsensusIndex,
    out_dir: &Path,
    codec: &dyn Codec,
    cancel: &CancelFlag,
) -> Result<Vec<SampleArtifacts>, PipelineError> {
    let mut written = Vec::new();
    for sample_id in index.sample_ids() {
        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled("assembly"));
        }
        let payload = assemble(sample_id, &index.consensus_fragments(sample_id));
        if let Some(artifacts) = write_sample_payload(out_dir, sample_id, &payload, codec)? {
            written.push(artifacts);
        }
    }
    Ok(written)
}


/// Run function for the read demultiplexing pipeline
///
/// # Arguments
///
/// * `config` - RunConfig struct from main.
///
/// # Returns
/// Result<DemuxStats, PipelineError>
pub async fn run(config: Arc<RunConfig>) -> Result<DemuxStats, PipelineError> {
    info!("\n-------------\n Oligo Demux\n-------------\n");
    let args = &config.args;
    validate_params(args)?;

    let input = input_path(&config, "demux")?;
    info!("Reading {} with the {:?} codec", input.display(), args.codec);

    let codec = codec_for(args.codec, args.seed);
    let rx = read_sequences(input, args.max_reads, READ_CHANNEL_BUFFER)?;

    let (mut index, reads_seen, reads_accepted) =
        accumulate_reads(rx, codec.as_ref(), args.max_oligo_len, &config.cancel).await?;
    info!(
        "Ingested {} reads; {} carried a valid tag across {} fragments",
        reads_seen,
        reads_accepted,
        index.fragment_count()
    );
    report_index_memory(index.counter_count());

    let summary = resolve(&mut index, args.count_threshold, &config.cancel)?;

    let samples = emit_samples(&index, &config.out_dir, codec.as_ref(), &config.cancel)?;
    for artifacts in &samples {
        info!("Sample {} written to {}", artifacts.sample_id, artifacts.condensed.display());
    }
    info!("Wrote {} samples to {}", samples.len(), config.out_dir.display());

    Ok(DemuxStats {
        reads_seen,
        reads_accepted,
        fragments_resolved: summary.resolved,
        fragments_discarded: summary.discarded,
        samples,
    })
}
