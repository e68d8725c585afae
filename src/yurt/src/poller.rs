//! Convergence polling.
//!
//! A probe is evaluated until it reports convergence or fails. "Not yet"
//! answers are retried forever; a probe error ends polling at once because
//! it means the query itself could not run. Deadlines belong in the probe.

use std::future::Future;
use std::time::Duration;

/// Outcome of one probe evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollResult<T, E> {
    Converged(T),
    NotYetConverged,
    Error(E),
}

/// Poll `probe` until it converges or errors.
///
/// After every `NotYetConverged`, `on_waiting` is called with a 1-based
/// attempt counter and the poller sleeps for `interval`.
pub async fn poll_until<T, E, P, Fut, W>(
    mut probe: P,
    mut on_waiting: W,
    interval: Duration,
) -> Result<T, E>
where
    P: FnMut() -> Fut,
    Fut: Future<Output = PollResult<T, E>>,
    W: FnMut(u32),
{
    let mut attempt: u32 = 1;
    loop {
        match probe().await {
            PollResult::Converged(value) => {
                tracing::debug!("[Poller] Converged after {} wait(s)", attempt - 1);
                return Ok(value);
            }
            PollResult::Error(e) => {
                tracing::debug!("[Poller] Probe failed on attempt {}", attempt);
                return Err(e);
            }
            PollResult::NotYetConverged => {
                on_waiting(attempt);
                tokio::time::sleep(interval).await;
                attempt = attempt.saturating_add(1);
            }
        }
    }
}

/// Literal readiness check: converged only when the trimmed output equals
/// `expected` exactly.
pub fn expect_status<E>(output: &str, expected: &str) -> PollResult<String, E> {
    let status = output.trim();
    if status == expected {
        PollResult::Converged(status.to_string())
    } else {
        PollResult::NotYetConverged
    }
}
