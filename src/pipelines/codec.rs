use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use log::{debug, info, warn};
use tokio::sync::mpsc::Receiver;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::ReceiverStream;
use crate::codec::{codec_for, text_to_bytes, Codec};
use crate::config::defs::{PipelineError, RunConfig, ARTIFACT_EXT, DECODED_TAG, ENCODED_TAG, READ_CHANNEL_BUFFER};
use crate::pipelines::input_path;
use crate::utils::fastx::{read_sequences, SequenceRecord};
use crate::utils::file::{extension_remover, file_path_manipulator, open_maybe_gzipped};
use crate::utils::system::CancelFlag;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationStats {
    pub output: PathBuf,
    pub records: u64,
    /// Records the codec could not translate.
    pub skipped: u64,
}

/// `<out_dir>/<input stem>_<tag>.txt`
fn output_path(out_dir: &Path, input: &Path, tag: &str) -> PathBuf {
    let (stem, _) = extension_remover(input);
    let name = stem
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    file_path_manipulator(Path::new(&name), Some(out_dir), None, Some(&format!("{}.{}", tag, ARTIFACT_EXT)), "_")
}


/// Translates each text line into one DNA line.
///
/// Lines are read as Latin-1 bytes and trimmed of surrounding ASCII whitespace.
/// A codec failure is fatal.
///
/// # Arguments
///
/// * `reader` - Text input.
/// * `writer` - DNA output.
/// * `codec` - Encoder.
/// * `cancel` - Checked before each line.
///
/// # Returns
/// Number of lines written.
pub fn encode_lines<R: BufRead, W: Write>(
    reader: R,
    writer: &mut W,
    codec: &mut dyn Codec,
    cancel: &CancelFlag,
) -> Result<u64, PipelineError> {
    let mut written = 0u64;
    for line in reader.split(b'\n') {
        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled("encoding"));
        }
        let text: String = line?.iter().map(|&b| b as char).collect();
        let dna = codec.text_to_dna(text.trim_matches(|c: char| c.is_ascii_whitespace()))?;
        writeln!(writer, "{}", dna)?;
        written += 1;
    }
    writer.flush()?;
    Ok(written)
}


/// Writes a header line and the decoded text line for every record.
///
/// Records the codec rejects are skipped and counted. A record error from the
/// reader is fatal.
///
/// # Arguments
///
/// * `rx` - Record stream from `read_sequences`.
/// * `writer` - Text output.
/// * `codec` - Decoder.
/// * `cancel` - Checked before each record.
///
/// # Returns
/// Tuple: (records written, records skipped).
pub async fn decode_records<W: Write>(
    rx: Receiver<Result<SequenceRecord, PipelineError>>,
    writer: &mut W,
    codec: &dyn Codec,
    cancel: &CancelFlag,
) -> Result<(u64, u64), PipelineError> {
    let mut stream = ReceiverStream::new(rx);
    let mut written = 0u64;
    let mut skipped = 0u64;

    while let Some(record) = stream.next().await {
        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled("decoding"));
        }
        let record = record?;
        let decoded = std::str::from_utf8(record.seq())
            .map_err(|e| PipelineError::InvalidFastqFormat(format!("{}: {}", record.id(), e)))
            .and_then(|dna| codec.dna_to_text(dna));
        match decoded {
            Ok(text) => {
                match record.desc() {
                    Some(desc) => writeln!(writer, "{} {}", record.id(), desc)?,
                    None => writeln!(writer, "{}", record.id())?,
                }
                writer.write_all(&text_to_bytes(&text))?;
                writer.write_all(b"\n")?;
                written += 1;
            }
            Err(e) => {
                debug!("Skipping record {}: {}", record.id(), e);
                skipped += 1;
            }
        }
    }
    writer.flush()?;
    Ok((written, skipped))
}


/// Run function for text to DNA encoding
///
/// # Arguments
///
/// * `config` - RunConfig struct from main.
///
/// # Returns
/// Result<TranslationStats, PipelineError>
pub async fn encode(config: Arc<RunConfig>) -> Result<TranslationStats, PipelineError> {
    info!("\n-------------\n Oligo Encode\n-------------\n");
    let input = input_path(&config, "encode")?;
    let output = output_path(&config.out_dir, &input, ENCODED_TAG);

    let mut codec = codec_for(config.args.codec, config.args.seed);
    let reader = BufReader::new(open_maybe_gzipped(&input)?);
    let mut writer = BufWriter::new(File::create(&output)?);
    let records = encode_lines(reader, &mut writer, codec.as_mut(), &config.cancel)?;

    info!("Encoded {} lines with the {} codec to {}", records, codec.name(), output.display());
    Ok(TranslationStats { output, records, skipped: 0 })
}


/// Run function for read to text decoding
///
/// # Arguments
///
/// * `config` - RunConfig struct from main.
///
/// # Returns
/// Result<TranslationStats, PipelineError>
pub async fn decode(config: Arc<RunConfig>) -> Result<TranslationStats, PipelineError> {
    info!("\n-------------\n Oligo Decode\n-------------\n");
    let input = input_path(&config, "decode")?;
    let output = output_path(&config.out_dir, &input, DECODED_TAG);

    let codec = codec_for(config.args.codec, config.args.seed);
    let rx = read_sequences(input, config.args.max_reads, READ_CHANNEL_BUFFER)?;
    let mut writer = BufWriter::new(File::create(&output)?);
    let (records, skipped) = decode_records(rx, &mut writer, codec.as_ref(), &config.cancel).await?;

    if skipped > 0 {
        warn!("{} records could not be decoded with the {} codec", skipped, codec.name());
    }
    info!("Decoded {} records to {}", records, output.display());
    Ok(TranslationStats { output, records, skipped })
}
