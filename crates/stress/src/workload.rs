use crate::config::StressConfig;
use anyhow::{Context, bail};
use atomics::{ArrayBuffer, TypedArray, Value, atomics_exchange, atomics_load, atomics_store};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// Outcome of a stress run.
#[derive(Debug, Clone, Default)]
pub struct StressReport {
    pub exchanges: u64,
    pub loads: u64,
    /// Sum of every token written by an exchange.
    pub tokens_written: i64,
    /// Sum of every previous value handed back by an exchange.
    pub tokens_returned: i64,
    /// Sum of the cells once all agents finished.
    pub tokens_remaining: i64,
    pub elapsed: Duration,
    pub interrupted: bool,
}

impl StressReport {
    /// Each written token was returned by exactly one later exchange or is
    /// still sitting in its cell.
    pub fn is_conserved(&self) -> bool {
        self.tokens_written == self.tokens_returned + self.tokens_remaining
    }
}

#[derive(Debug, Default)]
struct AgentTally {
    exchanges: u64,
    loads: u64,
    written: i64,
    returned: i64,
}

/// Hammer one shared buffer from `config.agents` threads.
///
/// Fails if any atomic returns a value no agent could have written, which
/// would indicate a torn access.
pub fn run(config: &StressConfig, shutdown: &AtomicBool) -> anyhow::Result<StressReport> {
    config.validate()?;

    let kind = config.element_kind;
    let byte_length = config
        .length
        .checked_mul(kind.element_size())
        .context("Shared buffer size overflows usize")?;
    let buffer =
        ArrayBuffer::new_shared(byte_length).context("Failed to allocate shared buffer")?;
    let view = Value::from(TypedArray::over(buffer, kind).context("Failed to create view")?);

    let zero = Value::SmallInt(0);
    for cell in 0..config.length {
        atomics_store(&view, &cell_index(cell), &zero)?;
    }

    tracing::info!(
        agents = config.agents,
        iterations = config.iterations,
        kind = kind.name(),
        length = config.length,
        "Starting stress run"
    );

    let start = Instant::now();
    let tallies = thread::scope(|scope| {
        let handles: Vec<_> = (0..config.agents)
            .map(|agent| {
                let view = &view;
                scope.spawn(move || run_agent(agent, view, config, shutdown))
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| match handle.join() {
                Ok(result) => result,
                Err(_) => bail!("Agent thread panicked"),
            })
            .collect::<anyhow::Result<Vec<_>>>()
    })?;
    let elapsed = start.elapsed();

    let mut tokens_remaining = 0;
    for cell in 0..config.length {
        tokens_remaining += as_token(atomics_load(&view, &cell_index(cell))?, config.agents)?;
    }

    let report = tallies.iter().fold(
        StressReport {
            tokens_remaining,
            elapsed,
            interrupted: shutdown.load(Ordering::Relaxed),
            ..StressReport::default()
        },
        |mut report, tally| {
            report.exchanges += tally.exchanges;
            report.loads += tally.loads;
            report.tokens_written += tally.written;
            report.tokens_returned += tally.returned;
            report
        },
    );

    tracing::info!(
        exchanges = report.exchanges,
        loads = report.loads,
        elapsed_ms = report.elapsed.as_millis() as u64,
        conserved = report.is_conserved(),
        "Stress run finished"
    );

    Ok(report)
}

fn run_agent(
    agent: u32,
    view: &Value,
    config: &StressConfig,
    shutdown: &AtomicBool,
) -> anyhow::Result<AgentTally> {
    let agents = u64::from(config.agents);
    let length = config.length as u64;
    let token_number = i64::from(agent) + 1;
    let token = Value::from_f64(token_number as f64);
    let mut tally = AgentTally::default();

    for iteration in 0..config.iterations {
        if shutdown.load(Ordering::Relaxed) {
            tracing::debug!(agent, iteration, "Agent stopping on shutdown");
            break;
        }

        let cell = (iteration * agents + u64::from(agent)) % length;

        let previous = atomics_exchange(view, &cell_index(cell as usize), &token)?;
        tally.returned += as_token(previous, config.agents)?;
        tally.written += token_number;
        tally.exchanges += 1;

        let neighbour = (cell + 1) % length;
        as_token(atomics_load(view, &cell_index(neighbour as usize))?, config.agents)?;
        tally.loads += 1;
    }

    tracing::debug!(agent, exchanges = tally.exchanges, "Agent finished");
    Ok(tally)
}

fn cell_index(cell: usize) -> Value {
    Value::from_f64(cell as f64)
}

/// The value as a token, rejecting anything outside `0..=agents`.
fn as_token(value: Value, agents: u32) -> anyhow::Result<i64> {
    match value.as_number() {
        Some(n) if n >= 0.0 && n <= f64::from(agents) && n.fract() == 0.0 => Ok(n as i64),
        _ => bail!("Observed {value:?}, which no agent wrote"),
    }
}
