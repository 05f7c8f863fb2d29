use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use incinerator_config::{DEFAULT_MAX_CONCURRENCY, RunSettings};
use incinerator_types::{DispatchFailure, ItemId, MatchRule, RunSummary, select_matches};
use tokio::sync::Semaphore;
use tokio::task::{Id, JoinSet};

use crate::backend::Backend;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinatorOptions {
    /// Dispatch units allowed in flight at once. `0` means no limit.
    pub max_concurrency: usize,
    pub rule: MatchRule,
}

impl Default for CoordinatorOptions {
    fn default() -> Self {
        Self {
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            rule: MatchRule::default(),
        }
    }
}

impl From<&RunSettings> for CoordinatorOptions {
    fn from(settings: &RunSettings) -> Self {
        Self {
            max_concurrency: settings.max_concurrency,
            rule: settings.rule.clone(),
        }
    }
}

/// Runs one fetch → filter → dispatch pass against a [`Backend`].
pub struct Coordinator<B> {
    backend: Arc<B>,
    options: CoordinatorOptions,
}

impl<B: Backend> Coordinator<B> {
    pub fn new(backend: Arc<B>, options: CoordinatorOptions) -> Self {
        Self { backend, options }
    }

    /// Execute a full run.
    ///
    /// A fetch failure aborts before any dispatch is attempted. Dispatch
    /// failures never abort the run; they are collected into the summary.
    /// Returns only after every dispatch unit has finished.
    pub async fn run(&self) -> Result<RunSummary, B::FetchError> {
        let started = Instant::now();

        let records = match self.backend.fetch().await {
            Ok(records) => records,
            Err(e) => {
                tracing::error!(error = %e, "Fetch failed; no items dispatched");
                return Err(e);
            }
        };

        let matched = select_matches(&records, &self.options.rule);
        tracing::info!(
            records = records.len(),
            matched = matched.len(),
            "Selected items for incineration"
        );

        let attempted = matched.len();
        let failures = self.dispatch_all(matched).await;
        let summary = RunSummary::new(records.len(), attempted, failures, started.elapsed());

        tracing::info!(
            attempted = summary.attempted,
            succeeded = summary.succeeded,
            failed = summary.failed,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "Run complete"
        );
        Ok(summary)
    }

    /// Launch one unit per id behind the concurrency gate and join them all.
    async fn dispatch_all(&self, ids: Vec<ItemId>) -> Vec<DispatchFailure> {
        let mut failures = Vec::new();
        if ids.is_empty() {
            return failures;
        }

        let gate = Arc::new(Semaphore::new(self.permits_for(ids.len())));
        let mut units = JoinSet::new();
        // Lets a panicked unit still be reported against its item.
        let mut in_flight: HashMap<Id, ItemId> = HashMap::with_capacity(ids.len());

        for id in ids {
            let permit = match Arc::clone(&gate).acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    failures.push(DispatchFailure::new(id, e.to_string()));
                    continue;
                }
            };
            let backend = Arc::clone(&self.backend);
            let unit_id = id.clone();
            let handle = units.spawn(async move {
                // Released when the unit exits, including by panic.
                let _permit = permit;
                backend
                    .dispatch(&unit_id)
                    .await
                    .map_err(|e| e.to_string())
            });
            in_flight.insert(handle.id(), id);
        }

        while let Some(joined) = units.join_next_with_id().await {
            match joined {
                Ok((task_id, Ok(()))) => {
                    in_flight.remove(&task_id);
                }
                Ok((task_id, Err(reason))) => {
                    let id = take_item(&mut in_flight, task_id);
                    tracing::warn!(item_id = %id, %reason, "Incineration failed");
                    failures.push(DispatchFailure::new(id, reason));
                }
                Err(join_error) => {
                    let id = take_item(&mut in_flight, join_error.id());
                    tracing::error!(item_id = %id, error = %join_error, "Dispatch unit panicked");
                    failures.push(DispatchFailure::new(
                        id,
                        format!("dispatch unit panicked: {join_error}"),
                    ));
                }
            }
        }

        failures
    }

    fn permits_for(&self, units: usize) -> usize {
        let wanted = match self.options.max_concurrency {
            0 => units,
            limit => limit.min(units),
        };
        wanted.clamp(1, Semaphore::MAX_PERMITS)
    }
}

fn take_item(in_flight: &mut HashMap<Id, ItemId>, task_id: Id) -> ItemId {
    in_flight
        .remove(&task_id)
        .unwrap_or_else(|| ItemId::new(format!("<task {task_id}>")))
}
