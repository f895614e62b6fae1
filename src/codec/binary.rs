use rand::rngs::StdRng;
use rand::Rng;
use crate::codec::{char_to_byte, check_width, invalid_base, Codec};
use crate::config::defs::{BINARY_WORD_SIZE, PipelineError};

const BINARY_TAG: &str = "binary";

// Either base may carry a bit; zero is A/C, one is G/T.
const ZERO_BASES: [u8; 2] = [b'A', b'C'];
const ONE_BASES: [u8; 2] = [b'G', b'T'];

fn base_bit(base: u8) -> Option<u8> {
    match base {
        b'A' | b'C' => Some(0),
        b'G' | b'T' => Some(1),
        _ => None,
    }
}

/// One base per bit, eight bases per character.
///
/// Encoding draws the base for each bit at random and never repeats the
/// previous base, which keeps homopolymer runs out of the synthesized strand.
pub struct BinaryCodec {
    rng: StdRng,
}

impl BinaryCodec {
    pub fn new(rng: StdRng) -> Self {
        BinaryCodec { rng }
    }
}

impl Codec for BinaryCodec {
    fn name(&self) -> &'static str {
        BINARY_TAG
    }

    fn width(&self) -> usize {
        BINARY_WORD_SIZE
    }

    fn text_to_dna(&mut self, text: &str) -> Result<String, PipelineError> {
        let mut dna: Vec<u8> = Vec::with_capacity(text.len() * BINARY_WORD_SIZE);
        for c in text.chars() {
            let byte = char_to_byte(BINARY_TAG, c)?;
            for place in (0..BINARY_WORD_SIZE).rev() {
                let pair = if (byte >> place) & 1 == 0 { ZERO_BASES } else { ONE_BASES };
                let mut choice = self.rng.random_range(0..2usize);
                if dna.last() == Some(&pair[choice]) {
                    choice = (choice + 1) % 2;
                }
                dna.push(pair[choice]);
            }
        }
        Ok(String::from_utf8_lossy(&dna).into_owned())
    }

    fn dna_to_text(&self, dna: &str) -> Result<String, PipelineError> {
        check_width(BINARY_TAG, dna, BINARY_WORD_SIZE)?;
        dna.as_bytes()
            .chunks(BINARY_WORD_SIZE)
            .map(|word| {
                word.iter()
                    .try_fold(0u8, |acc, &base| {
                        let bit = base_bit(base).ok_or_else(|| invalid_base(BINARY_TAG, base))?;
                        Ok((acc << 1) | bit)
                    })
                    .map(char::from)
            })
            .collect()
    }
}
