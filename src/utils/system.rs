// src/utils/system.rs: System functions

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{anyhow, Result};
use log::{debug, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use sysinfo::{MemoryRefreshKind, RefreshKind, System};

use crate::config::defs::COUNTER_BYTES_ESTIMATE;


/// Cooperative cancellation shared between the signal handler and the
/// pipeline stages. Checked at every read, fragment and sample boundary.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        CancelFlag(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}


/// Sets the cancel flag when the process receives Ctrl-C.
///
/// # Arguments
///
/// * `cancel` - Flag observed by the running pipeline.
pub fn install_interrupt_handler(cancel: CancelFlag) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received; stopping at the next record boundary");
            cancel.cancel();
        }
    });
}


/// Finds the amount of total and available RAM, keyed to OS
///
/// # Returns
///
/// Result<u64, u64> total ram, available ram
pub fn detect_ram() -> Result<(u64, u64)> {
    let (total_ram, available_ram) = if cfg!(target_os = "macos") {
        let refresh_kind = RefreshKind::nothing().with_memory(MemoryRefreshKind::everything());
        let mut system = System::new_with_specifics(refresh_kind);
        system.refresh_memory_specifics(MemoryRefreshKind::everything());
        let total = system.total_memory();
        let used = system.used_memory();
        (total, total.saturating_sub(used))
    } else {
        let mut system = System::new_with_specifics(RefreshKind::nothing().with_memory(MemoryRefreshKind::everything()));
        system.refresh_memory();
        (system.total_memory(), system.available_memory())
    };

    if total_ram == 0 || available_ram == 0 {
        return Err(anyhow!("Failed to detect valid RAM values"));
    }

    Ok((total_ram, available_ram))
}


/// Estimated resident size of the consensus index.
///
/// # Arguments
///
/// * `counters` - Number of position counters held by the index.
///
/// # Returns
/// Estimated bytes.
pub fn estimate_index_bytes(counters: u64) -> u64 {
    counters.saturating_mul(COUNTER_BYTES_ESTIMATE)
}


/// Logs the index footprint against available RAM and warns when the index
/// holds more than half of it. The index is fully resident for the whole run.
///
/// # Arguments
///
/// * `counters` - Number of position counters held by the index.
pub fn report_index_memory(counters: u64) {
    let index_bytes = estimate_index_bytes(counters);
    match detect_ram() {
        Ok((total_ram, available_ram)) => {
            debug!(
                "Consensus index: {} counters (~{} MB); available RAM {} MB of {} MB",
                counters,
                index_bytes / 1_048_576,
                available_ram / 1_048_576,
                total_ram / 1_048_576
            );
            if index_bytes > available_ram / 2 {
                warn!(
                    "Consensus index (~{} MB) exceeds half of available RAM ({} MB)",
                    index_bytes / 1_048_576,
                    available_ram / 1_048_576
                );
            }
        }
        Err(e) => debug!("Skipping RAM check: {}", e),
    }
}


/// Creates a project-wide RNG from the system, using entropy pool. Optional seed for
/// reproducibility.
///
/// # Arguments
///
///  * `seed` - Seed number that allows reproducible results.
///
/// # Returns
///
/// A StdRng
pub fn generate_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}
