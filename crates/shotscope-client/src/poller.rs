//! Bounded status polling.
//!
//! `await_completion` drives the loop inline and hands every non-terminal
//! snapshot to a callback. `spawn_poller` runs the same loop as a tokio
//! task and streams `PollEvent`s over a channel so the owner never blocks
//! on it.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn, Instrument};

use shotscope_models::{AnalysisResult, JobSnapshot, JobStatus};

use crate::api::JobApi;
use crate::config::PollConfig;
use crate::error::{ClientError, ClientResult};
use crate::metrics::{record_poll_attempt, record_poll_outcome};

/// Poll `job_id` until it succeeds, fails, or the attempt ceiling is hit.
///
/// `on_snapshot` sees every non-terminal snapshot, in order. Transport and
/// decoding errors abort the loop; nothing is retried.
pub async fn await_completion<A, F>(
    api: &A,
    job_id: &str,
    config: &PollConfig,
    mut on_snapshot: F,
) -> ClientResult<AnalysisResult>
where
    A: JobApi + ?Sized,
    F: FnMut(&JobSnapshot),
{
    info!(
        job_id = %job_id,
        interval_ms = config.interval.as_millis() as u64,
        max_attempts = config.max_attempts,
        "Polling job"
    );

    let span = tracing::info_span!("await_completion", job_id = %job_id);
    let outcome = poll_loop(api, job_id, config, &mut on_snapshot)
        .instrument(span)
        .await;

    match &outcome {
        Ok(result) => {
            record_poll_outcome("succeeded");
            info!(job_id = %job_id, segments = result.segments().len(), "Job completed");
        }
        Err(ClientError::Analysis(msg)) => {
            record_poll_outcome("failed");
            error!(job_id = %job_id, error = %msg, "Job failed");
        }
        Err(e @ ClientError::Timeout { .. }) => {
            record_poll_outcome("timeout");
            warn!(job_id = %job_id, error = %e, "Gave up waiting for job");
        }
        Err(e) => {
            record_poll_outcome("error");
            error!(job_id = %job_id, error = %e, "Polling aborted");
        }
    }

    outcome
}

async fn poll_loop<A, F>(
    api: &A,
    job_id: &str,
    config: &PollConfig,
    on_snapshot: &mut F,
) -> ClientResult<AnalysisResult>
where
    A: JobApi + ?Sized,
    F: FnMut(&JobSnapshot),
{
    for attempt in 1..=config.max_attempts {
        record_poll_attempt();
        let snapshot = api.poll(job_id).await?;

        match snapshot.status {
            JobStatus::Succeeded => {
                return snapshot.result.ok_or_else(|| {
                    ClientError::invalid_response(format!(
                        "job {} succeeded without a result",
                        job_id
                    ))
                });
            }
            JobStatus::Failed => {
                let message = snapshot
                    .error_message()
                    .unwrap_or_else(|| "unknown error".to_string());
                return Err(ClientError::Analysis(message));
            }
            JobStatus::Queued | JobStatus::Running => {
                if let Some(progress) = &snapshot.progress {
                    info!(job_id = %job_id, progress = %progress.label(), "Job progress");
                }
                tracing::debug!(
                    job_id = %job_id,
                    attempt = attempt,
                    status = %snapshot.status,
                    partial = snapshot.partial_result().is_some(),
                    "Job not finished yet"
                );
                on_snapshot(&snapshot);
            }
        }

        if attempt < config.max_attempts {
            tokio::time::sleep(config.interval).await;
        }
    }

    Err(ClientError::Timeout {
        attempts: config.max_attempts,
    })
}

/// Event produced by a spawned polling loop.
#[derive(Debug)]
pub enum PollEvent {
    /// Non-terminal status check
    Snapshot(JobSnapshot),
    /// Job succeeded with its final result
    Completed(AnalysisResult),
    /// Loop ended without a result (analysis failure, timeout, transport error)
    Failed(ClientError),
}

impl PollEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PollEvent::Snapshot(_))
    }
}

/// Handle to a spawned polling loop.
///
/// Dropping the handle abandons the loop.
#[derive(Debug)]
pub struct PollTask {
    job_id: String,
    handle: JoinHandle<()>,
    events: mpsc::UnboundedReceiver<PollEvent>,
}

impl PollTask {
    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    /// Wait for the next event; `None` once the loop has ended and all
    /// events have been taken.
    pub async fn next_event(&mut self) -> Option<PollEvent> {
        self.events.recv().await
    }

    /// Take an event if one is ready.
    pub fn try_next_event(&mut self) -> Option<PollEvent> {
        self.events.try_recv().ok()
    }

    /// True once the loop has stopped issuing requests.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Stop polling. Events already queued are discarded.
    pub fn abandon(self) {
        tracing::info!(job_id = %self.job_id, "Abandoning polling loop");
        drop(self);
    }
}

impl Drop for PollTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Spawn the polling loop for `job_id` on the current tokio runtime.
pub fn spawn_poller<A>(api: Arc<A>, job_id: impl Into<String>, config: PollConfig) -> PollTask
where
    A: JobApi + ?Sized + 'static,
{
    let job_id = job_id.into();
    let (tx, events) = mpsc::unbounded_channel();

    let task_job_id = job_id.clone();
    let handle = tokio::spawn(async move {
        let snapshot_tx = tx.clone();
        let outcome = await_completion(api.as_ref(), &task_job_id, &config, |snapshot| {
            // A closed receiver means nobody is listening; the loop still ends
            // on its own ceiling.
            let _ = snapshot_tx.send(PollEvent::Snapshot(snapshot.clone()));
        })
        .await;

        let event = match outcome {
            Ok(result) => PollEvent::Completed(result),
            Err(e) => PollEvent::Failed(e),
        };
        let _ = tx.send(event);
    });

    PollTask {
        job_id,
        handle,
        events,
    }
}
