//! Long-running generation operations and the poller that drives them.
//!
//! An operation is only ever advanced by re-asking the provider; nothing
//! here mutates one locally. The poller sleeps between status checks and
//! gives up on cancellation, after a bounded number of checks, or once a
//! wall-clock deadline passes.

use crate::ai::VideoGenerationService;
use crate::{Error, Result};
use std::time::Duration;
use tokio::sync::watch;
use tokio_retry::strategy::FixedInterval;
use tracing::{debug, info};

/// Location of a generated asset, plus the provider's content-type hint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetReference {
    pub url: String,
    pub content_type: Option<String>,
}

/// Snapshot of a remote long-running job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationOperation {
    pub handle: String,
    pub done: bool,
    pub error: Option<String>,
    pub output: Option<AssetReference>,
}

impl GenerationOperation {
    pub fn pending(handle: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
            done: false,
            error: None,
            output: None,
        }
    }

    pub fn succeeded(handle: impl Into<String>, output: Option<AssetReference>) -> Self {
        Self {
            handle: handle.into(),
            done: true,
            error: None,
            output,
        }
    }

    pub fn failed(handle: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
            done: true,
            error: Some(message.into()),
            output: None,
        }
    }

    /// Resolve a terminal operation into its asset reference.
    pub fn into_asset(self) -> Result<AssetReference> {
        if let Some(message) = self.error {
            return Err(Error::GenerationFailed(message));
        }
        self.output.ok_or_else(|| {
            Error::OutputMissing(format!(
                "operation {} completed without a generated asset",
                self.handle
            ))
        })
    }
}

/// How patiently to wait for an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: Option<usize>,
    pub deadline: Option<Duration>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            max_attempts: None,
            deadline: Some(Duration::from_secs(600)),
        }
    }
}

/// Sender half of a cancellation signal.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }
}

/// Receiver half of a cancellation signal, cheap to clone.
#[derive(Debug, Clone)]
pub struct Cancellation {
    rx: watch::Receiver<bool>,
}

impl Cancellation {
    /// A signal that can never fire.
    pub fn never() -> Self {
        let (_tx, rx) = watch::channel(false);
        Self { rx }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once the paired [`CancelHandle`] fires. Pends forever if the
    /// handle is dropped without firing.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

/// Create a linked cancel handle and signal.
pub fn cancellation() -> (CancelHandle, Cancellation) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, Cancellation { rx })
}

/// Drives a [`GenerationOperation`] to a terminal state.
pub struct OperationPoller<'a> {
    service: &'a dyn VideoGenerationService,
    policy: PollPolicy,
}

impl<'a> OperationPoller<'a> {
    pub fn new(service: &'a dyn VideoGenerationService, policy: PollPolicy) -> Self {
        Self { service, policy }
    }

    /// Poll until terminal and return the generated asset's reference.
    ///
    /// Does not download the asset.
    pub async fn wait(
        &self,
        operation: GenerationOperation,
        cancel: &Cancellation,
    ) -> Result<AssetReference> {
        let handle = operation.handle.clone();
        let polling = self.poll_until_done(operation, cancel);

        let finished = match self.policy.deadline {
            Some(deadline) => tokio::time::timeout(deadline, polling)
                .await
                .map_err(|_| {
                    Error::Timeout(format!(
                        "operation {} still running after {:?}",
                        handle, deadline
                    ))
                })??,
            None => polling.await?,
        };

        info!("Operation {} reached a terminal state", finished.handle);
        finished.into_asset()
    }

    async fn poll_until_done(
        &self,
        mut operation: GenerationOperation,
        cancel: &Cancellation,
    ) -> Result<GenerationOperation> {
        let mut delays = FixedInterval::new(self.policy.interval)
            .take(self.policy.max_attempts.unwrap_or(usize::MAX));
        let mut checks = 0usize;

        while !operation.done {
            if cancel.is_cancelled() {
                return Err(cancelled(&operation.handle));
            }

            let Some(delay) = delays.next() else {
                return Err(Error::Timeout(format!(
                    "operation {} not done after {} status checks",
                    operation.handle, checks
                )));
            };

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = cancel.cancelled() => return Err(cancelled(&operation.handle)),
            }

            let next = tokio::select! {
                result = self.service.check_operation(&operation) => result?,
                _ = cancel.cancelled() => return Err(cancelled(&operation.handle)),
            };
            checks += 1;
            debug!(
                "Operation {} status check {}: done={}",
                next.handle, checks, next.done
            );
            operation = next;
        }

        Ok(operation)
    }
}

fn cancelled(handle: &str) -> Error {
    Error::Cancelled(format!("stopped polling operation {}", handle))
}
