use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use rebound_core::{CategoryBackoff, RandomSource};

/// Simulated remote call that fails a fixed number of times before succeeding.
#[derive(Debug)]
pub struct FlakyOp {
    name: &'static str,
    failures_left: u32,
}

impl FlakyOp {
    pub fn new(name: &'static str, failures: u32) -> Self {
        Self {
            name,
            failures_left: failures,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn call(&mut self) -> Result<(), String> {
        if self.failures_left == 0 {
            return Ok(());
        }
        self.failures_left -= 1;
        Err(format!("{} failed ({} failures left)", self.name, self.failures_left))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequenceOutcome {
    Succeeded {
        op: &'static str,
        attempts: u32,
        waited: Duration,
    },
    Exhausted {
        op: &'static str,
        attempts: u32,
        waited: Duration,
    },
    Cancelled {
        op: &'static str,
        attempts: u32,
    },
}

/// Drives `op` until it succeeds, `max_attempts` is reached or `token` is cancelled.
///
/// Waits are bounded by `max_wait` and abandoned as soon as the token fires.
pub async fn run_sequence<R: RandomSource>(
    mut op: FlakyOp,
    mut seq: CategoryBackoff<R>,
    max_attempts: u32,
    max_wait: Duration,
    token: CancellationToken,
) -> SequenceOutcome {
    let mut attempts = 0;
    let mut waited = Duration::ZERO;

    loop {
        attempts += 1;
        let err = match op.call() {
            Ok(()) => {
                return SequenceOutcome::Succeeded {
                    op: op.name(),
                    attempts,
                    waited,
                };
            }
            Err(e) => e,
        };

        if attempts >= max_attempts {
            return SequenceOutcome::Exhausted {
                op: op.name(),
                attempts,
                waited,
            };
        }

        let delay = seq.next_delay(Some(max_wait));
        debug!(
            op = op.name(),
            category = %seq.category(),
            attempt = attempts,
            error = %err,
            delay_ms = delay.as_millis() as u64,
            "retrying after backoff"
        );

        tokio::select! {
            biased;
            _ = token.cancelled() => {
                return SequenceOutcome::Cancelled {
                    op: op.name(),
                    attempts,
                };
            }
            _ = tokio::time::sleep(delay) => waited += delay,
        }
    }
}
