use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Result};
use env_logger::Builder;
use log::{debug, error, info, LevelFilter};

use oligo_pipelines::cli::{parse, Arguments};
use oligo_pipelines::config::defs::{PipelineError, RunConfig};
use oligo_pipelines::pipelines::{chunk, codec, demux};
use oligo_pipelines::utils::file::{extension_remover, file_path_manipulator};
use oligo_pipelines::utils::system::{detect_ram, install_interrupt_handler, CancelFlag};


#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let run_start = Instant::now();

    let args = parse();

    let log_level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    Builder::new()
        .filter_level(log_level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {}: {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .init();

    println!("\n-------------\n Oligo Pipelines\n-------------\n");

    let dir = env::current_dir()?;
    info!("The current directory is {:?}\n", dir);

    match detect_ram() {
        Ok((total_ram, available_ram)) => {
            debug!("Available RAM: {} bytes (~{} GiB)", available_ram, available_ram / 1_073_741_824);
            debug!("Total RAM: {} bytes (~{} GiB)", total_ram, total_ram / 1_073_741_824);
        }
        Err(e) => debug!("RAM detection failed: {}", e),
    }

    let out_dir = setup_output_dir(&args, &dir)?;
    info!("Writing results to {:?}", out_dir);

    let cancel = CancelFlag::new();
    install_interrupt_handler(cancel.clone());

    let module = args.module.clone();
    let run_config = Arc::new(RunConfig {
        cwd: dir,
        out_dir,
        args,
        cancel,
    });

    if let Err(e) = match module.as_str() {
        "demux" => demux_run(run_config).await,
        "encode" => encode_run(run_config).await,
        "decode" => decode_run(run_config).await,
        "chunk" => chunk_run(run_config).await,
        _ => Err(PipelineError::InvalidConfig(format!("Invalid module: {}", module))),
    } {
        error!("Pipeline failed: {} at {} milliseconds.", e, run_start.elapsed().as_millis());
        std::process::exit(1);
    }

    println!("Run complete: {} milliseconds.", run_start.elapsed().as_millis());
    Ok(())
}


async fn demux_run(run_config: Arc<RunConfig>) -> Result<(), PipelineError> {
    let stats = demux::run(run_config).await?;
    info!(
        "Demux summary: {} reads, {} tagged, {} fragments resolved, {} discarded, {} samples written",
        stats.reads_seen,
        stats.reads_accepted,
        stats.fragments_resolved,
        stats.fragments_discarded,
        stats.samples.len()
    );
    Ok(())
}

async fn encode_run(run_config: Arc<RunConfig>) -> Result<(), PipelineError> {
    codec::encode(run_config).await.map(|_| ())
}

async fn decode_run(run_config: Arc<RunConfig>) -> Result<(), PipelineError> {
    codec::decode(run_config).await.map(|_| ())
}

async fn chunk_run(run_config: Arc<RunConfig>) -> Result<(), PipelineError> {
    chunk::run(run_config).await.map(|_| ())
}

/// Sets up output directory
/// If `out_dir` is specified from args, uses it;
/// otherwise, creates a directory named `<input_stem>_YYYYMMDD`.
/// Ensures the directory exists.
///
/// # Arguments
/// * `args` - The parsed command-line arguments.
/// * `cwd` - The current working directory.
/// # Returns
/// path to the output directory.
fn setup_output_dir(args: &Arguments, cwd: &Path) -> Result<PathBuf> {
    let out_dir = match &args.out_dir {
        Some(out) => file_path_manipulator(Path::new(out), Some(cwd), None, None, ""),
        None => {
            let file1_path = match &args.file1 {
                Some(file) => {
                    let full_path = file_path_manipulator(Path::new(file), Some(cwd), None, None, "");
                    if full_path.exists() {
                        full_path
                    } else {
                        return Err(anyhow!("Cannot find file 1 (-i)"));
                    }
                }
                None => return Err(anyhow!("File1 path required")),
            };

            let (stem, _) = extension_remover(&file1_path);
            let dir_base = stem
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| "default_sample".to_string());

            let timestamp = chrono::Local::now().format("%Y%m%d");
            cwd.join(format!("{}_{}", dir_base, timestamp))
        }
    };
    fs::create_dir_all(&out_dir)?;
    Ok(out_dir)
}
