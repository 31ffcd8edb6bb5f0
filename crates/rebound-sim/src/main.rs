use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use rebound_core::{BackoffTable, MetricsHandle};
use rebound_model::BackoffCategory;
use rebound_observe::{LoggerConfig, LoggerLevel, init_logger};
use rebound_prometheus::{Encoder, PrometheusMetrics, TextEncoder};

mod sim;
use sim::{FlakyOp, SequenceOutcome, run_sequence};

/// Longest single wait a simulated caller accepts.
const MAX_WAIT: Duration = Duration::from_secs(3);
/// Wall-clock budget for the whole simulation.
const DEADLINE: Duration = Duration::from_secs(15);
const MAX_ATTEMPTS: u32 = 8;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    // 1) logger
    let level = env::var("REBOUND_LOG").unwrap_or_else(|_| "info".to_string());
    let cfg = LoggerConfig {
        level: LoggerLevel::new(level)?,
        ..Default::default()
    };
    init_logger(&cfg)?;
    info!("logger initialized");

    // 2) backoff table, optionally overridden from a JSON file
    let table = match env::args().nth(1) {
        Some(path) => BackoffTable::from_json_file(&path)
            .with_context(|| format!("loading backoff table from {path}"))?,
        None => BackoffTable::default(),
    };
    for (category, s) in table.iter() {
        info!(%category, base_ms = s.base_ms, cap_ms = s.cap_ms, jitter = %s.jitter, "backoff config");
    }

    // 3) metrics
    let metrics = PrometheusMetrics::new()?;
    let handle: MetricsHandle = Arc::new(metrics.clone());

    // 4) cancellation: ctrl-c or deadline
    let token = CancellationToken::new();
    {
        let token = token.clone();
        tokio::spawn(async move {
            tokio::select! {
                res = tokio::signal::ctrl_c() => {
                    if let Err(e) = res {
                        warn!(error = %e, "ctrl-c handler failed");
                    }
                    info!("interrupted, cancelling retry sequences");
                }
                _ = tokio::time::sleep(DEADLINE) => {
                    warn!(deadline_s = DEADLINE.as_secs(), "deadline reached, cancelling retry sequences");
                }
            }
            token.cancel();
        });
    }

    // 5) one retry sequence per simulated operation
    let ops = [
        (BackoffCategory::RegionMiss, 4),
        (BackoffCategory::UpdateLeader, 6),
        (BackoffCategory::TikvRpc, 3),
        (BackoffCategory::TxnLock, 2),
        (BackoffCategory::ServerBusy, 2),
        (BackoffCategory::CheckTimeout, 5),
        (BackoffCategory::PdRpc, 20),
    ];

    let mut set = JoinSet::new();
    for (category, failures) in ops {
        let seq = table.sequence(category, handle.clone());
        let op = FlakyOp::new(category.as_label(), failures);
        let token = token.child_token();
        set.spawn(run_sequence(op, seq, MAX_ATTEMPTS, MAX_WAIT, token));
    }

    while let Some(joined) = set.join_next().await {
        match joined.context("retry sequence panicked")? {
            SequenceOutcome::Succeeded { op, attempts, waited } => {
                info!(op, attempts, waited_ms = waited.as_millis() as u64, "succeeded");
            }
            SequenceOutcome::Exhausted { op, attempts, waited } => {
                warn!(op, attempts, waited_ms = waited.as_millis() as u64, "gave up");
            }
            SequenceOutcome::Cancelled { op, attempts } => {
                warn!(op, attempts, "cancelled while waiting");
            }
        }
    }

    // 6) metrics exposition
    let mut buf = Vec::new();
    TextEncoder::new().encode(&metrics.gather(), &mut buf)?;
    println!("{}", String::from_utf8(buf)?);
    Ok(())
}
