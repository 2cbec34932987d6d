//! Readiness polling for the database dependency.
//!
//! Nothing later in the sequence works until the database answers, so both
//! variants funnel through one primitive: probe at a fixed interval until
//! success or until a bounded number of attempts is spent. The co-located
//! instance gets an unbounded wait (it always comes up eventually, and the
//! container restarting would not help), while a managed database gets a
//! bounded one so a bad endpoint fails the deployment instead of hanging it.

use std::future::Future;
use std::time::Duration;

use tracing::{info, warn};

use crate::error::{BootError, Result};

/// How many attempts between progress warnings on an unbounded wait.
const NAG_EVERY: u32 = 30;

/// Poll `probe` every `interval` until it succeeds.
///
/// With `max_attempts` of `None` this retries forever. With `Some(n)` the
/// n-th consecutive failure aborts, carrying the last probe error as the
/// diagnostic. Returns the number of attempts the successful probe took.
pub async fn wait_for<F, Fut>(
    what: &str,
    mut probe: F,
    interval: Duration,
    max_attempts: Option<u32>,
) -> Result<u32>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<()>>,
{
    let mut attempt: u32 = 0;
    loop {
        attempt += 1;
        match probe().await {
            Ok(()) => {
                info!(attempt, "{what} is ready");
                return Ok(attempt);
            }
            Err(e) => {
                if let Some(max) = max_attempts {
                    if attempt >= max {
                        return Err(BootError::DatabaseUnreachable {
                            attempts: attempt,
                            source: Box::new(e),
                        });
                    }
                    warn!(attempt, max, error = %e, "{what} not ready, retrying");
                } else if attempt % NAG_EVERY == 0 {
                    warn!(attempt, error = %e, "still waiting for {what}");
                }
                tokio::time::sleep(interval).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::pin::Pin;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    const TICK: Duration = Duration::from_millis(1);

    fn failing_until(
        threshold: u32,
    ) -> (
        Arc<AtomicU32>,
        impl FnMut() -> Pin<Box<dyn Future<Output = Result<()>>>>,
    ) {
        let counter = Arc::new(AtomicU32::new(0));
        let probe_counter = counter.clone();
        let probe = move || -> Pin<Box<dyn Future<Output = Result<()>>>> {
            let counter = probe_counter.clone();
            Box::pin(async move {
                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                if n < threshold {
                    Err(BootError::Config("not yet".to_string()))
                } else {
                    Ok(())
                }
            })
        };
        (counter, probe)
    }

    #[tokio::test]
    async fn test_wait_for_returns_attempt_count_on_success() {
        let (counter, probe) = failing_until(3);
        let attempts = wait_for("db", probe, TICK, Some(10)).await.unwrap();
        assert_eq!(attempts, 3);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_wait_for_stops_after_exactly_max_attempts() {
        let (counter, probe) = failing_until(u32::MAX);
        let err = wait_for("db", probe, TICK, Some(4)).await.unwrap_err();
        assert_eq!(counter.load(Ordering::SeqCst), 4);
        match err {
            BootError::DatabaseUnreachable { attempts, source } => {
                assert_eq!(attempts, 4);
                assert!(source.to_string().contains("not yet"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_wait_for_first_try_success_probes_once() {
        let (counter, probe) = failing_until(1);
        let attempts = wait_for("db", probe, TICK, Some(1)).await.unwrap();
        assert_eq!(attempts, 1);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unbounded_wait_survives_past_any_bound() {
        // More failures than any remote run would tolerate.
        let (_, probe) = failing_until(35);
        let attempts = wait_for("db", probe, TICK, None).await.unwrap();
        assert_eq!(attempts, 35);
    }
}
