//! Fixed-width DNA <-> text codecs.
//!
//! Every codec maps a fixed number of bases onto one 8-bit character. Decoded
//! text is returned as a `String` whose characters are the byte values read as
//! Latin-1 code points, so a round trip through `text_to_dna` is lossless for
//! any text made of code points 0..=255.

pub mod binary;
pub mod codon;

use crate::cli::CodecKind;
use crate::config::defs::PipelineError;
use crate::utils::system::generate_rng;

pub use binary::BinaryCodec;
pub use codon::CodonCodec;

pub trait Codec {
    /// Short name used in logs and error messages.
    fn name(&self) -> &'static str;

    /// Number of DNA bases consumed per output character.
    fn width(&self) -> usize;

    fn text_to_dna(&mut self, text: &str) -> Result<String, PipelineError>;

    fn dna_to_text(&self, dna: &str) -> Result<String, PipelineError>;
}

/// Builds the codec selected on the command line.
///
/// # Arguments
///
/// * `kind` - Codec selector.
/// * `seed` - Seed for the binary codec's base choices; ignored by the codon codec.
///
/// # Returns
/// Boxed codec.
pub fn codec_for(kind: CodecKind, seed: Option<u64>) -> Box<dyn Codec> {
    match kind {
        CodecKind::Codon => Box::new(CodonCodec::new()),
        CodecKind::Binary => Box::new(BinaryCodec::new(generate_rng(seed))),
    }
}

/// Raw bytes of decoded text, one byte per character.
///
/// Decoded characters are always in 0..=255; anything wider is truncated.
pub fn text_to_bytes(text: &str) -> Vec<u8> {
    text.chars().map(|c| c as u8).collect()
}

/// Rejects DNA whose length does not split evenly into codec words.
pub(crate) fn check_width(codec: &'static str, dna: &str, width: usize) -> Result<(), PipelineError> {
    if dna.len() % width != 0 {
        return Err(PipelineError::Codec {
            codec,
            reason: format!("length {} is not a multiple of {}", dna.len(), width),
        });
    }
    Ok(())
}

/// Converts a text character to the byte it stands for.
pub(crate) fn char_to_byte(codec: &'static str, c: char) -> Result<u8, PipelineError> {
    u8::try_from(u32::from(c)).map_err(|_| PipelineError::Codec {
        codec,
        reason: format!("character {:?} is outside the 8-bit range", c),
    })
}

pub(crate) fn invalid_base(codec: &'static str, base: u8) -> PipelineError {
    PipelineError::Codec {
        codec,
        reason: format!("invalid base {:?}", base as char),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codec_for_selects_width() {
        assert_eq!(codec_for(CodecKind::Codon, None).width(), 4);
        assert_eq!(codec_for(CodecKind::Binary, Some(1)).width(), 8);
    }

    #[test]
    fn test_text_to_bytes_is_latin1() {
        let text: String = [0x23u8, 0xE9, 0xFF].iter().map(|&b| char::from(b)).collect();
        assert_eq!(text_to_bytes(&text), vec![0x23, 0xE9, 0xFF]);
    }

    #[test]
    fn test_char_to_byte_rejects_wide_chars() {
        assert_eq!(char_to_byte("codon", 'A').unwrap(), 65);
        assert_eq!(char_to_byte("codon", 'ÿ').unwrap(), 255);
        assert!(char_to_byte("codon", 'Ā').is_err());
    }
}
