use lazy_static::lazy_static;
use regex::Regex;
use regex::bytes::Regex as BytesRegex;
use crate::codec::Codec;
use crate::config::defs::{
    CODON_SIZE, FRAGMENT_ID_BASES, FRAGMENT_ID_END, FRAGMENT_ID_START, SAMPLE_ID_BASES, SAMPLE_ID_END,
    SAMPLE_ID_START, TAG_LEN, TAG_SEPARATOR_MARKER, TAG_START_MARKER, TAG_TEXT_FORMAT, VALID_BASES,
};

lazy_static! {
    // TGTC[ACGT]{8}TGAT[ACGT]{12}
    static ref TAG_PATTERN: BytesRegex = BytesRegex::new(&format!(
        "{}[ACGT]{{{}}}{}[ACGT]{{{}}}",
        TAG_START_MARKER, SAMPLE_ID_BASES, TAG_SEPARATOR_MARKER, FRAGMENT_ID_BASES
    ))
    .expect("tag pattern is a valid regex");

    static ref TAG_FORMAT: Regex = Regex::new(TAG_TEXT_FORMAT).expect("tag format is a valid regex");
}

/// Why a read was dropped by the tag extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagRejection {
    InvalidBase,
    TagNotFound,
    TagFormat,
    /// Frame-corrected (and capped) length not codon aligned.
    FrameLength(usize),
    Undecodable,
}

/// A read that carried a valid tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedRead<'a> {
    pub sample_id: String,
    pub fragment_id: String,
    /// Bases after the tag, within the length cap.
    pub message: &'a [u8],
}

fn decode(codec: &dyn Codec, dna: &[u8]) -> Result<String, TagRejection> {
    let dna = std::str::from_utf8(dna).map_err(|_| TagRejection::Undecodable)?;
    codec.dna_to_text(dna).map_err(|_| TagRejection::Undecodable)
}

/// Finds and validates the structural tag of one raw read.
///
/// Checks run in order and stop at the first failure: alphabet, tag grammar,
/// decoded tag format, then the length of the frame-corrected read after
/// capping it at `max_oligo_len`. Sample and fragment IDs are decoded from
/// their own tag slices, independently of the format check.
///
/// # Arguments
///
/// * `sequence` - Read bases.
/// * `codec` - DNA to text codec for the tag.
/// * `max_oligo_len` - Cap on tag plus message length.
///
/// # Returns
/// The tagged read, or the reason it was dropped.
pub fn extract_tag<'a>(
    sequence: &'a [u8],
    codec: &dyn Codec,
    max_oligo_len: usize,
) -> Result<TaggedRead<'a>, TagRejection> {
    if sequence.iter().any(|base| !VALID_BASES.contains(base)) {
        return Err(TagRejection::InvalidBase);
    }

    let found = TAG_PATTERN.find(sequence).ok_or(TagRejection::TagNotFound)?;

    let tag_text = decode(codec, found.as_bytes())?;
    if !TAG_FORMAT.is_match(&tag_text) {
        return Err(TagRejection::TagFormat);
    }

    // correct the reading frame, then cap
    let framed = &sequence[found.start()..];
    let framed = &framed[..framed.len().min(max_oligo_len)];
    if framed.len() % CODON_SIZE != 0 || framed.len() < TAG_LEN {
        return Err(TagRejection::FrameLength(framed.len()));
    }

    let (tag, message) = framed.split_at(TAG_LEN);
    Ok(TaggedRead {
        sample_id: decode(codec, &tag[SAMPLE_ID_START..SAMPLE_ID_END])?,
        fragment_id: decode(codec, &tag[FRAGMENT_ID_START..FRAGMENT_ID_END])?,
        message,
    })
}
