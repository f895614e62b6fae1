use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use flate2::read::GzDecoder;

/// Checks the first two bytes for the gzip magic number.
pub fn is_gzipped(path: &Path) -> io::Result<bool> {
    let mut file = File::open(path)?;
    let mut buffer = [0u8; 2];
    match file.read_exact(&mut buffer) {
        Ok(()) => Ok(buffer == [0x1F, 0x8B]), // Gzip magic bytes
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(e),
    }
}


/// Enum to hold either an uncompressed or gzipped file reader
pub enum FileReader {
    Uncompressed(BufReader<File>),
    Gzipped(GzDecoder<File>),
}

impl Read for FileReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            FileReader::Uncompressed(r) => r.read(buf),
            FileReader::Gzipped(r) => r.read(buf),
        }
    }
}

/// Opens a file, transparently decompressing gzip input.
pub fn open_maybe_gzipped(path: &Path) -> io::Result<FileReader> {
    let is_gz = is_gzipped(path)?;
    let file = File::open(path)?;
    Ok(if is_gz {
        FileReader::Gzipped(GzDecoder::new(file))
    } else {
        FileReader::Uncompressed(BufReader::new(file))
    })
}


/// Splits every extension off a path.
///
/// # Arguments
///
/// * `path` - Path such as `reads.fastq.gz`.
///
/// # Returns
/// Tuple: (path without extensions, extensions in file order), e.g. (`reads`, [`fastq`, `gz`]).
pub fn extension_remover(path: &Path) -> (PathBuf, Vec<String>) {
    let mut stem = path.to_path_buf();
    let mut extensions = Vec::new();
    while let Some(ext) = stem.extension().map(|e| e.to_string_lossy().into_owned()) {
        extensions.push(ext);
        stem.set_extension("");
    }
    extensions.reverse();
    (stem, extensions)
}


/// Resolves a possibly relative path against a directory and optionally decorates the file name.
///
/// # Arguments
///
/// * `path` - Input path.
/// * `base_dir` - Directory used when `path` is relative.
/// * `prefix` - Optional text placed before the file name.
/// * `suffix` - Optional text placed after the file name.
/// * `delimiter` - Joins prefix/suffix to the file name.
///
/// # Returns
/// Decorated absolute path.
pub fn file_path_manipulator(
    path: &Path,
    base_dir: Option<&Path>,
    prefix: Option<&str>,
    suffix: Option<&str>,
    delimiter: &str,
) -> PathBuf {
    let full_path = match base_dir {
        Some(dir) if path.is_relative() => dir.join(path),
        _ => path.to_path_buf(),
    };

    if prefix.is_none() && suffix.is_none() {
        return full_path;
    }

    let file_name = full_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut new_name = String::new();
    if let Some(prefix) = prefix {
        new_name.push_str(prefix);
        new_name.push_str(delimiter);
    }
    new_name.push_str(&file_name);
    if let Some(suffix) = suffix {
        new_name.push_str(delimiter);
        new_name.push_str(suffix);
    }
    full_path.with_file_name(new_name)
}


/// Writes `content` plus a trailing newline, replacing any existing file.
pub fn write_line_file(path: &Path, content: &[u8]) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(content)?;
    writer.write_all(b"\n")?;
    writer.flush()
}
