//! Fan-out/fan-in over independent asynchronous operations.
//!
//! Log file downloads are independent of each other, so they run
//! concurrently and the pipeline waits for every branch to finish before
//! moving on. One failed download must not sink the run: outcomes are
//! partitioned into successes (used) and failure reasons (reported), and
//! the join itself always resolves.

use std::future::Future;
use tokio::task::JoinSet;

/// Outcome of an all-settled join.
///
/// Value order follows branch completion, not submission; any order the
/// caller shows a user must come from an explicit sort downstream.
#[derive(Debug)]
pub struct Settled<T> {
    pub values: Vec<T>,
    pub failures: Vec<anyhow::Error>,
}

/// Runs every future to completion and partitions the outcomes.
///
/// Branch errors (and panicked tasks) land in [`Settled::failures`]; the
/// join never errors because a branch did. No branch is retried.
pub async fn join_all_settled<T, F>(futures: impl IntoIterator<Item = F>) -> Settled<T>
where
    T: Send + 'static,
    F: Future<Output = anyhow::Result<T>> + Send + 'static,
{
    let mut tasks = JoinSet::new();
    for future in futures {
        tasks.spawn(future);
    }

    let mut settled = Settled {
        values: Vec::new(),
        failures: Vec::new(),
    };

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Ok(value)) => settled.values.push(value),
            Ok(Err(error)) => settled.failures.push(error),
            Err(join_error) => settled.failures.push(anyhow::Error::new(join_error)),
        }
    }

    settled
}
