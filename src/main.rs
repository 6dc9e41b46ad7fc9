//! iosweep CLI entry point

use iosweep::config::cli::Cli;
use iosweep::config::toml::build_config;
use iosweep::coordinator::Benchmark;
use iosweep::engine::sync::DeviceSource;
use iosweep::output::create_reporter;
use iosweep::target::platform_probe;
use iosweep::util::signal::{install_interrupt_handler, INTERRUPTED_EXIT_CODE};
use iosweep::BenchError;
use std::io;
use std::process::ExitCode;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse_args();
    init_tracing(cli.debug);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if matches!(err.downcast_ref::<BenchError>(), Some(BenchError::Interrupted)) {
                eprintln!("interrupted");
                return ExitCode::from(INTERRUPTED_EXIT_CODE as u8);
            }
            eprintln!("error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> iosweep::Result<()> {
    let config = build_config(cli)?;
    debug!(?config, "configuration");

    let stop_flag = Arc::new(AtomicBool::new(false));
    install_interrupt_handler(Arc::clone(&stop_flag))?;

    let source = Arc::new(DeviceSource::new(config.device.clone(), config.direct));
    let stdout = io::stdout();
    let mut reporter = create_reporter(&config.output, stdout.lock());

    let summary = Benchmark::new(config, source)
        .with_stop_flag(stop_flag)
        .run(platform_probe().as_ref(), reporter.as_mut())?;

    debug!(
        iterations = summary.iterations,
        stop_reason = %summary.stop_reason,
        peak_iops_block = summary.peak_iops.block_size_bytes,
        peak_iops = summary.peak_iops.iops_total,
        peak_bandwidth_block = summary.peak_bandwidth.block_size_bytes,
        "sweep summary"
    );

    Ok(())
}

/// Diagnostics go to stderr so report lines on stdout stay parseable
fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}
