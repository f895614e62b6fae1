pub mod chunk;
pub mod codec;
pub mod demux;

use std::path::{Path, PathBuf};
use crate::config::defs::{PipelineError, RunConfig};
use crate::utils::file::file_path_manipulator;

/// Resolves `-i` against the working directory.
///
/// # Arguments
///
/// * `config` - RunConfig struct from main.
/// * `module` - Module name for the error message.
///
/// # Returns
/// Absolute input path, or InvalidConfig if none was given or it does not exist.
pub fn input_path(config: &RunConfig, module: &str) -> Result<PathBuf, PipelineError> {
    let input = config
        .args
        .file1
        .as_ref()
        .ok_or_else(|| PipelineError::InvalidConfig(format!("{} requires an input file (-i)", module)))?;
    let path = file_path_manipulator(Path::new(input), Some(&config.cwd), None, None, "");
    if !path.exists() {
        return Err(PipelineError::InvalidConfig(format!("Input file not found: {}", path.display())));
    }
    Ok(path)
}
