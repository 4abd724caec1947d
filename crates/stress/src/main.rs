use anyhow::Context;
use common::setup_logging;
use signal_hook::{
    consts::{SIGINT, SIGTERM},
    flag,
};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use stress::{StressConfig, run};

fn main() -> anyhow::Result<()> {
    let config = StressConfig::from_env()?;
    setup_logging(config.environment);
    let shutdown = Arc::new(AtomicBool::new(false));

    flag::register(SIGTERM, Arc::clone(&shutdown))?;
    flag::register(SIGINT, Arc::clone(&shutdown))?;

    tracing::info!(environment = %config.environment, config = ?config, "Loaded configuration");

    let report = run(&config, &shutdown).context("Stress run failed")?;

    if report.interrupted {
        tracing::warn!("Stress run interrupted before completing all iterations");
    }

    if !report.is_conserved() {
        tracing::error!(
            written = report.tokens_written,
            returned = report.tokens_returned,
            remaining = report.tokens_remaining,
            "Exchanged values were lost or duplicated"
        );
        anyhow::bail!(
            "Token conservation violated: wrote {}, observed {}",
            report.tokens_written,
            report.tokens_returned + report.tokens_remaining
        );
    }

    tracing::info!(
        exchanges = report.exchanges,
        loads = report.loads,
        "All exchanged values accounted for"
    );
    Ok(())
}
