use std::future::Future;

use futures::future::try_join_all;

use crate::{Error, Result};

/// Runs `worker` once per element of `args`, in consecutive waves of at most
/// `batch_size` concurrent invocations. A wave has to settle completely before
/// the next one starts, so no more than `batch_size` calls are ever in flight.
///
/// Results come back in input order regardless of completion order. The first
/// failed invocation aborts the whole run: no partial results, later waves are
/// never started.
pub async fn run_batched<T, R, F, Fut>(worker: F, args: Vec<T>, batch_size: usize) -> Result<Vec<R>>
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = Result<R>>,
{
    if batch_size == 0 {
        return Err(Error::InvalidBatchSize(batch_size));
    }

    let mut results = Vec::with_capacity(args.len());
    let mut remaining = args.into_iter();
    loop {
        let wave: Vec<_> = remaining.by_ref().take(batch_size).map(&worker).collect();
        if wave.is_empty() {
            break;
        }
        results.extend(try_join_all(wave).await?);
    }

    Ok(results)
}
