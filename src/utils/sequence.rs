use rand::Rng;
use rand::seq::IndexedRandom;
use rand_distr::{Distribution, Normal};

use crate::codec::{Codec, CodonCodec};
use lazy_static::lazy_static;

use crate::config::defs::{PipelineError, ARRAY_TAIL, UNIVERSAL_A, UNIVERSAL_B};

lazy_static! {
    static ref UNIVERSAL_B_RC: String = reverse_complement(UNIVERSAL_B);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DNA {
    A,
    C,
    G,
    T,
}

impl DNA {
    /// Convert nucleotide to its character representation.
    pub fn to_char(&self) -> char {
        match self {
            DNA::A => 'A',
            DNA::C => 'C',
            DNA::G => 'G',
            DNA::T => 'T',
        }
    }

    /// Get all possible nucleotides as a static slice.
    pub fn all() -> &'static [DNA] {
        &[DNA::A, DNA::C, DNA::G, DNA::T]
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> DNA {
        let all = DNA::all();
        all[rng.random_range(0..all.len())]
    }

    /// Generate a random sequence of nucleotides of the given length.
    pub fn random_sequence<R: Rng + ?Sized>(length: usize, rng: &mut R) -> String {
        (0..length)
            .map(|_| DNA::random(rng).to_char())
            .collect()
    }
}

fn phred33(score: u8) -> u8 {
    score + 33
}

fn normal_phred_qual<R: Rng + ?Sized>(normal: &Normal<f32>, rng: &mut R) -> u8 {
    let mut raw_phred = -1.0;

    while !(0.0..=40.0).contains(&raw_phred) {
        raw_phred = normal.sample(rng);
    }

    phred33(raw_phred as u8)
}

/// Phred+33 quality string with scores drawn from N(mean, stdev), clamped to 0..=40.
pub fn normal_phred_qual_string<R: Rng + ?Sized>(length: usize, mean: f32, stdev: f32, rng: &mut R) -> String {
    let normal = match Normal::new(mean, stdev) {
        Ok(normal) => normal,
        Err(_) => return std::iter::repeat_n(phred33(mean.clamp(0.0, 40.0) as u8) as char, length).collect(),
    };

    (0..length)
        .map(|_| normal_phred_qual(&normal, rng) as char)
        .collect()
}

/// Substitutes each base with a different random base at the given rate.
pub fn mutate<R: Rng + ?Sized>(seq: &str, rate: f64, rng: &mut R) -> String {
    seq.chars()
        .map(|base| {
            if rng.random_bool(rate.clamp(0.0, 1.0)) {
                let alternatives: Vec<char> = DNA::all()
                    .iter()
                    .map(DNA::to_char)
                    .filter(|&c| c != base)
                    .collect();
                *alternatives.choose(rng).unwrap_or(&base)
            } else {
                base
            }
        })
        .collect()
}

/// Codon-encoded structural tag `#SS$FFF` for a sample and fragment number.
pub fn oligo_tag(sample: u32, fragment: u32) -> Result<String, PipelineError> {
    CodonCodec::new().text_to_dna(&format!("#{:02}${:03}", sample, fragment))
}

/// Reverse complement; bases outside ACGT (either case) become `N`.
pub fn reverse_complement(seq: &str) -> String {
    seq.chars()
        .rev()
        .map(|base| match base {
            'A' => 'T',
            'T' => 'A',
            'G' => 'C',
            'C' => 'G',
            'a' => 't',
            't' => 'a',
            'g' => 'c',
            'c' => 'g',
            _ => 'N',
        })
        .collect()
}

/// A synthesis-ready oligo: forward adapter, tag, payload chunk, reverse adapter.
/// The trailing `AA` keeps the full construct codon aligned.
pub fn array_oligo(tag: &str, chunk: &str) -> String {
    format!("{}{}{}{}{}", UNIVERSAL_A, tag, chunk, UNIVERSAL_B_RC.as_str(), ARRAY_TAIL)
}
