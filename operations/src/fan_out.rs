use {
    crate::{Bundle, OperationError, Result},
    deployer_shared::primitives::ChainSelector,
    std::collections::{BTreeMap, BTreeSet, HashMap},
    tokio::task::JoinSet,
    tracing::{Instrument, info_span, warn},
};

/// Runs `worker` once per distinct chain concurrently and collects the outputs keyed by chain.
///
/// Every worker receives a clone of `bundle`, so their reports land in the same log. The first
/// failing worker aborts the ones still running and its error is returned. A worker that panics or
/// is aborted fails with [`OperationError::Join`] wrapped under its chain.
pub async fn fan_out<T, F, Fut>(
    bundle: &Bundle,
    chains: impl IntoIterator<Item = ChainSelector>,
    worker: F,
) -> Result<BTreeMap<ChainSelector, T>>
where
    T: Send + 'static,
    F: Fn(ChainSelector, Bundle) -> Fut,
    Fut: Future<Output = Result<T>> + Send + 'static,
{
    bundle.ensure_active()?;

    let mut workers = JoinSet::new();
    let mut tasks = HashMap::new();
    for chain in chains.into_iter().collect::<BTreeSet<_>>() {
        let task = worker(chain, bundle.clone()).instrument(info_span!("worker", %chain));
        tasks.insert(workers.spawn(task).id(), chain);
    }

    let mut outputs = BTreeMap::new();
    while let Some(joined) = workers.join_next_with_id().await {
        let (chain, result) = match joined {
            Ok((id, result)) => (tasks[&id], result),
            Err(e) => (tasks[&e.id()], Err(OperationError::Join(e.to_string()))),
        };

        match result {
            Ok(output) => {
                outputs.insert(chain, output);
            }
            Err(e) => {
                warn!(%chain, error = %e, "Worker failed, aborting the rest");
                workers.abort_all();
                return Err(OperationError::Worker {
                    chain,
                    source: Box::new(e),
                });
            }
        }
    }

    Ok(outputs)
}
