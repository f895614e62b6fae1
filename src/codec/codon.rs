use lazy_static::lazy_static;
use crate::codec::{char_to_byte, check_width, invalid_base, Codec};
use crate::config::defs::{CODON_SIZE, PipelineError};

const CODON_TAG: &str = "codon";

// Digit order of the base-4 codon value, T=0 A=1 G=2 C=3.
const DIGIT_BASES: [u8; 4] = [b'T', b'A', b'G', b'C'];

lazy_static! {
    // BYTE_TO_CODON[b] is the codon for byte b, e.g. [35] = "TGTC" ('#')
    static ref BYTE_TO_CODON: Vec<String> = (0..=255u8)
        .map(|byte| {
            (0..CODON_SIZE)
                .rev()
                .map(|place| DIGIT_BASES[((byte >> (2 * place)) & 0b11) as usize] as char)
                .collect()
        })
        .collect();
}

fn base_value(base: u8) -> Option<u8> {
    match base {
        b'T' => Some(0),
        b'A' => Some(1),
        b'G' => Some(2),
        b'C' => Some(3),
        _ => None,
    }
}

/// Four-base codon encoding of 8-bit characters.
#[derive(Debug, Default, Clone, Copy)]
pub struct CodonCodec;

impl CodonCodec {
    pub fn new() -> Self {
        CodonCodec
    }

    /// Decodes one codon to its byte value.
    pub fn codon_to_byte(codon: &[u8]) -> Result<u8, PipelineError> {
        codon.iter().try_fold(0u8, |acc, &base| {
            let value = base_value(base).ok_or_else(|| invalid_base(CODON_TAG, base))?;
            Ok((acc << 2) | value)
        })
    }

    pub fn byte_to_codon(byte: u8) -> &'static str {
        &BYTE_TO_CODON[byte as usize]
    }
}

impl Codec for CodonCodec {
    fn name(&self) -> &'static str {
        CODON_TAG
    }

    fn width(&self) -> usize {
        CODON_SIZE
    }

    fn text_to_dna(&mut self, text: &str) -> Result<String, PipelineError> {
        let mut dna = String::with_capacity(text.len() * CODON_SIZE);
        for c in text.chars() {
            dna.push_str(Self::byte_to_codon(char_to_byte(CODON_TAG, c)?));
        }
        Ok(dna)
    }

    fn dna_to_text(&self, dna: &str) -> Result<String, PipelineError> {
        check_width(CODON_TAG, dna, CODON_SIZE)?;
        dna.as_bytes()
            .chunks(CODON_SIZE)
            .map(|codon| Self::codon_to_byte(codon).map(char::from))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_markers() {
        assert_eq!(CodonCodec::byte_to_codon(b'#'), "TGTC");
        assert_eq!(CodonCodec::byte_to_codon(b'$'), "TGAT");
        assert_eq!(CodonCodec::byte_to_codon(b'0'), "TCTT");
        assert_eq!(CodonCodec::byte_to_codon(b'9'), "TCGA");
    }

    #[test]
    fn test_known_tag_decodes() {
        let codec = CodonCodec::new();
        let tag = "TGTCTCTTTCTATGATTCTTTCTTTCTT";
        assert_eq!(codec.dna_to_text(tag).unwrap(), "#01$000");
    }

    #[test]
    fn test_text_round_trip() {
        let mut codec = CodonCodec::new();
        let text = "hello, world ÿ";
        let dna = codec.text_to_dna(text).unwrap();
        assert_eq!(dna.len(), text.chars().count() * 4);
        assert_eq!(codec.dna_to_text(&dna).unwrap(), text);
    }

    #[test]
    fn test_every_codon_is_distinct() {
        let mut seen: Vec<&str> = (0..=255u8).map(CodonCodec::byte_to_codon).collect();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 256);
    }

    #[test]
    fn test_rejects_ragged_length() {
        let codec = CodonCodec::new();
        assert!(matches!(codec.dna_to_text("TGTCA"), Err(PipelineError::Codec { .. })));
    }

    #[test]
    fn test_rejects_unknown_base() {
        let codec = CodonCodec::new();
        assert!(codec.dna_to_text("TGNC").is_err());
    }
}
