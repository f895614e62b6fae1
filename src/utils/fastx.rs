use seq_io::fasta::{Reader as FastaReader, OwnedRecord as FastaOwnedRecord};
use seq_io::fastq::{Reader as FastqReader, OwnedRecord as FastqOwnedRecord};
use std::fmt::Display;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use log::debug;
use tokio::sync::mpsc;
use crate::config::defs::{PipelineError, FASTA_EXTS, FASTA_TAG, FASTQ_EXTS, FASTQ_TAG};
use crate::utils::file::{extension_remover, open_maybe_gzipped, FileReader};

/// Defines FASTA and FASTQ as part of a unified FASTX structure.
#[derive(Clone, Debug, PartialEq)]
pub enum SequenceRecord {
    Fasta {
        id: String,
        desc: Option<String>,
        seq: Vec<u8>,
    },
    Fastq {
        id: String,
        desc: Option<String>,
        seq: Vec<u8>,
        qual: Vec<u8>,
    },
}

/// Maps id and seq to the correct file type.
impl SequenceRecord {
    pub fn id(&self) -> &str {
        match self {
            SequenceRecord::Fasta { id, .. } => id,
            SequenceRecord::Fastq { id, .. } => id,
        }
    }

    pub fn desc(&self) -> Option<&str> {
        match self {
            SequenceRecord::Fasta { desc, .. } => desc.as_deref(),
            SequenceRecord::Fastq { desc, .. } => desc.as_deref(),
        }
    }

    pub fn seq(&self) -> &[u8] {
        match self {
            SequenceRecord::Fasta { seq, .. } => seq,
            SequenceRecord::Fastq { seq, .. } => seq,
        }
    }

    /// Quality string, absent for FASTA input.
    pub fn qual(&self) -> Option<&[u8]> {
        match self {
            SequenceRecord::Fasta { .. } => None,
            SequenceRecord::Fastq { qual, .. } => Some(qual),
        }
    }

    /// Structural check of a single record: FASTQ sequence and quality must be the same length.
    pub fn validate(self) -> Result<Self, PipelineError> {
        if let SequenceRecord::Fastq { id, seq, qual, .. } = &self {
            if seq.len() != qual.len() {
                return Err(PipelineError::InvalidFastqFormat(format!(
                    "record '{}' has {} bases but {} quality scores",
                    id,
                    seq.len(),
                    qual.len()
                )));
            }
        }
        Ok(self)
    }
}

impl From<FastaOwnedRecord> for SequenceRecord {
    fn from(record: FastaOwnedRecord) -> Self {
        let (id, desc) = parse_header(&record.head, '>');
        SequenceRecord::Fasta {
            id,
            desc,
            seq: record.seq,
        }
    }
}

impl From<FastqOwnedRecord> for SequenceRecord {
    fn from(record: FastqOwnedRecord) -> Self {
        let (id, desc) = parse_header(&record.head, '@');
        SequenceRecord::Fastq {
            id,
            desc,
            seq: record.seq,
            qual: record.qual,
        }
    }
}


/// Enum to hold either FASTA or FASTQ reader
pub enum SequenceReader {
    Fasta(FastaReader<FileReader>),
    Fastq(FastqReader<FileReader>),
}

/// Creates a SequenceReader for either FASTA or FASTQ files.
///
/// # Arguments
///
/// * `path`: &Path - Valid path to a fastx file, optionally gzipped.
///
/// # Returns
/// io::Result<SequenceReader>: Result bearing the correct SequenceReader.
///
pub fn sequence_reader(path: &Path) -> io::Result<SequenceReader> {
    let filetype = fastx_filetype(path)?;
    let reader = open_maybe_gzipped(path)?;

    match filetype {
        FASTA_TAG => Ok(SequenceReader::Fasta(FastaReader::new(reader))),
        _ => Ok(SequenceReader::Fastq(FastqReader::new(reader))),
    }
}


pub fn write_fasta_record<W: Write>(
    writer: &mut W,
    id: &str,
    desc: Option<&str>,
    seq: &[u8],
) -> io::Result<()> {
    writer.write_all(b">")?;
    writer.write_all(id.as_bytes())?;
    if let Some(desc) = desc {
        writer.write_all(b" ")?;
        writer.write_all(desc.as_bytes())?;
    }
    writer.write_all(b"\n")?;

    for chunk in seq.chunks(80) {
        writer.write_all(chunk)?;
        writer.write_all(b"\n")?;
    }
    Ok(())
}

pub fn write_fastq_record<W: Write>(
    writer: &mut W,
    id: &str,
    desc: Option<&str>,
    seq: &[u8],
    qual: &[u8],
) -> io::Result<()> {
    writer.write_all(b"@")?;
    writer.write_all(id.as_bytes())?;
    if let Some(desc) = desc {
        writer.write_all(b" ")?;
        writer.write_all(desc.as_bytes())?;
    }
    writer.write_all(b"\n")?;
    writer.write_all(seq)?;
    writer.write_all(b"\n+\n")?;
    writer.write_all(qual)?;
    writer.write_all(b"\n")?;
    Ok(())
}


/// Determines if a file path is a FASTA, FASTQ, or neither.
/// Checks extensions, not the body.
///
/// # Arguments
///
/// * `path` - Path to a fastx file.
///
/// # Returns
/// Ok FASTA_TAG or FASTQ_TAG, or err.
///
fn fastx_filetype(path: &Path) -> io::Result<&'static str> {
    let (_, extensions) = extension_remover(path);

    for ext in &extensions {
        if FASTA_EXTS.iter().any(|&e| e.eq_ignore_ascii_case(ext)) {
            return Ok(FASTA_TAG);
        }

        if FASTQ_EXTS.iter().any(|&e| e.eq_ignore_ascii_case(ext)) {
            return Ok(FASTQ_TAG);
        }
    }

    Err(io::Error::new(
        io::ErrorKind::InvalidData,
        format!(
            "File '{}' has invalid extension(s) '{:?}'. Expected FASTA ({:?}) or FASTQ ({:?}).",
            path.display(),
            extensions,
            FASTA_EXTS,
            FASTQ_EXTS
        ),
    ))
}


/// Parses a FASTX header.
///
/// # Arguments
///
/// * `head` - Header line of a FASTX record.
/// * 'prefix' - Leading, defining character of the header. > for FASTA, @ for FASTQ.
///
/// # Returns
/// Tuple: (id, desc) split of header on whitespace.
///
fn parse_header(head: &[u8], prefix: char) -> (String, Option<String>) {
    let head_str = String::from_utf8_lossy(head);
    let mut parts = head_str.splitn(2, char::is_whitespace);
    let id = parts.next().unwrap_or_default().trim_start_matches(prefix).to_string();
    let desc = parts.next().map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
    (id, desc)
}


/// Streams records from a FASTA or FASTQ file over a bounded channel.
///
/// The file is opened here so that missing or unrecognised inputs fail
/// immediately. A malformed record is forwarded as an error and ends the
/// stream. The stream is finite and single-use; call again to reread.
///
/// # Arguments
///
/// * `path` - Valid path to a fastx file.
/// * `max_reads` - Optional cap on the number of records sent.
/// * `buffer` - Channel capacity.
///
/// # Returns
/// Receiver of parsed records.
///
pub fn read_sequences(
    path: PathBuf,
    max_reads: Option<usize>,
    buffer: usize,
) -> Result<mpsc::Receiver<Result<SequenceRecord, PipelineError>>, PipelineError> {
    let reader = sequence_reader(&path)
        .map_err(|e| PipelineError::InvalidFastqFormat(format!("{}: {}", path.display(), e)))?;
    let (tx, rx) = mpsc::channel(buffer.max(1));
    let limit = max_reads.unwrap_or(usize::MAX);

    match reader {
        SequenceReader::Fastq(reader) => {
            tokio::spawn(forward_records(reader.into_records(), tx, limit));
        }
        SequenceReader::Fasta(reader) => {
            tokio::spawn(forward_records(reader.into_records(), tx, limit));
        }
    }

    Ok(rx)
}

async fn forward_records<I, R, E>(
    records: I,
    tx: mpsc::Sender<Result<SequenceRecord, PipelineError>>,
    limit: usize,
)
where
    I: Iterator<Item = Result<R, E>>,
    R: Into<SequenceRecord>,
    E: Display,
{
    let mut sent = 0usize;
    for result in records {
        if sent >= limit {
            debug!("Reached record limit of {}", limit);
            break;
        }
        let item = result
            .map_err(|e| PipelineError::InvalidFastqFormat(e.to_string()))
            .and_then(|record| Into::<SequenceRecord>::into(record).validate());
        let failed = item.is_err();
        if tx.send(item).await.is_err() {
            debug!("Record receiver dropped after {} records", sent);
            return;
        }
        if failed {
            return;
        }
        sent += 1;
    }
}
