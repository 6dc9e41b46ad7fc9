//! Operator interrupt handling
//!
//! Ctrl-C does not kill the process outright. It sets a shared stop flag that
//! every worker polls between reads, so the current measurement is abandoned
//! as a whole and the run exits with an "interrupted" status. A second Ctrl-C
//! while workers are still draining exits immediately.

use anyhow::{Context, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::warn;

/// Exit status used when the run was interrupted
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Watch for SIGINT on a background thread and raise `stop_flag` when it arrives
pub fn install_interrupt_handler(stop_flag: Arc<AtomicBool>) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create signal runtime")?;

    std::thread::Builder::new()
        .name("iosweep-signal".to_string())
        .spawn(move || {
            runtime.block_on(async move {
                if tokio::signal::ctrl_c().await.is_err() {
                    warn!("unable to listen for interrupts");
                    return;
                }
                warn!("interrupt received, stopping workers");
                stop_flag.store(true, Ordering::SeqCst);

                if tokio::signal::ctrl_c().await.is_ok() {
                    eprintln!("interrupted");
                    std::process::exit(INTERRUPTED_EXIT_CODE);
                }
            });
        })
        .context("Failed to spawn signal thread")?;

    Ok(())
}
