use std::path::{Path, PathBuf};
use log::{debug, warn};
use crate::codec::{text_to_bytes, Codec};
use crate::config::defs::{PipelineError, ARTIFACT_EXT, CONDENSED_TAG, TRANSLATED_TAG};
use crate::utils::file::{file_path_manipulator, write_line_file};

/// Files written for one sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleArtifacts {
    pub sample_id: String,
    pub condensed: PathBuf,
    /// Absent when the codec could not decode the payload.
    pub translated: Option<PathBuf>,
}

/// `<out_dir>/<sample_id>_<tag>.txt`
pub fn artifact_path(out_dir: &Path, sample_id: &str, tag: &str) -> PathBuf {
    file_path_manipulator(
        Path::new(sample_id),
        Some(out_dir),
        None,
        Some(&format!("{}.{}", tag, ARTIFACT_EXT)),
        "_",
    )
}

/// Writes the condensed DNA payload of a sample and its decoded text.
///
/// # Arguments
///
/// * `out_dir` - Existing output directory.
/// * `sample_id` - Sample the payload belongs to.
/// * `payload` - Assembled DNA; an empty payload writes nothing.
/// * `codec` - Decoder for the text artifact.
///
/// # Returns
/// Paths written, or None for an empty payload.
pub fn write_sample_payload(
    out_dir: &Path,
    sample_id: &str,
    payload: &str,
    codec: &dyn Codec,
) -> Result<Option<SampleArtifacts>, PipelineError> {
    if payload.is_empty() {
        debug!("Sample {} assembled no fragments; nothing written", sample_id);
        return Ok(None);
    }

    let condensed = artifact_path(out_dir, sample_id, CONDENSED_TAG);
    write_line_file(&condensed, payload.as_bytes())?;

    let translated = match codec.dna_to_text(payload) {
        Ok(text) => {
            let path = artifact_path(out_dir, sample_id, TRANSLATED_TAG);
            write_line_file(&path, &text_to_bytes(&text))?;
            Some(path)
        }
        Err(e) => {
            warn!("Sample {}: payload not translated: {}", sample_id, e);
            None
        }
    };

    Ok(Some(SampleArtifacts {
        sample_id: sample_id.to_string(),
        condensed,
        translated,
    }))
}
