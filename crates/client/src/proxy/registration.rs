//! Host-side lifecycle driver.
//!
//! A [`Registration`] owns one lifecycle handler and moves it through the
//! worker states, awaiting each handler future before the next transition.

use std::fmt;
use std::sync::Arc;

use aramaps_core::{Error, Request};
use tokio::sync::RwLock;

use super::{FetchOutcome, HostControl, LifecycleHandler};

/// Worker lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Parsed,
    Installing,
    Installed,
    Activating,
    Activated,
    /// Install failed; this worker will never activate.
    Redundant,
}

impl WorkerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkerState::Parsed => "parsed",
            WorkerState::Installing => "installing",
            WorkerState::Installed => "installed",
            WorkerState::Activating => "activating",
            WorkerState::Activated => "activated",
            WorkerState::Redundant => "redundant",
        }
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct Registration<H> {
    handler: Arc<H>,
    control: Arc<HostControl>,
    state: RwLock<WorkerState>,
}

impl<H: LifecycleHandler> Registration<H> {
    /// `control` must be the same host control the handler was built with.
    pub fn new(handler: Arc<H>, control: Arc<HostControl>) -> Self {
        Self { handler, control, state: RwLock::new(WorkerState::Parsed) }
    }

    pub fn handler(&self) -> &Arc<H> {
        &self.handler
    }

    pub async fn state(&self) -> WorkerState {
        *self.state.read().await
    }

    /// Whether the active worker has claimed open clients.
    pub async fn controls_clients(&self) -> bool {
        self.state().await == WorkerState::Activated && self.control.claimed()
    }

    /// Move from one of `from` to `to`, or fail without changing state.
    async fn transition(&self, from: &[WorkerState], to: WorkerState) -> Result<(), Error> {
        let mut state = self.state.write().await;
        if !from.contains(&*state) {
            return Err(Error::InvalidInput(format!("cannot move worker from {} to {}", *state, to)));
        }
        tracing::info!(from = %*state, to = %to, "worker state change");
        *state = to;
        Ok(())
    }

    async fn set(&self, to: WorkerState) {
        let mut state = self.state.write().await;
        tracing::info!(from = %*state, to = %to, "worker state change");
        *state = to;
    }

    /// Run the install handler. On success the worker is `Installed`, and
    /// activates straight away if the handler asked to skip waiting. On
    /// failure the worker becomes `Redundant`.
    pub async fn install(&self) -> Result<(), Error> {
        self.transition(&[WorkerState::Parsed, WorkerState::Redundant], WorkerState::Installing)
            .await?;

        if let Err(e) = self.handler.on_install().await {
            tracing::error!(error = %e, "install failed");
            self.set(WorkerState::Redundant).await;
            return Err(e);
        }
        self.set(WorkerState::Installed).await;

        if self.control.skip_waiting_requested() {
            self.activate().await?;
        }
        Ok(())
    }

    /// Run the activate handler. Requires `Installed`; on failure the worker
    /// returns to `Installed` so activation can be retried.
    pub async fn activate(&self) -> Result<(), Error> {
        self.transition(&[WorkerState::Installed], WorkerState::Activating)
            .await?;

        if let Err(e) = self.handler.on_activate().await {
            tracing::error!(error = %e, "activate failed");
            self.set(WorkerState::Installed).await;
            return Err(e);
        }
        self.set(WorkerState::Activated).await;
        Ok(())
    }

    /// Bring up a worker whose install already completed in an earlier run:
    /// skip install and activate only.
    pub async fn resume(&self) -> Result<(), Error> {
        self.transition(&[WorkerState::Parsed], WorkerState::Installed)
            .await?;
        self.activate().await
    }

    /// Route a request through the active worker.
    pub async fn fetch(&self, request: Request) -> Result<FetchOutcome, Error> {
        let state = self.state().await;
        if state != WorkerState::Activated {
            return Err(Error::NotActive(format!("worker is {state}")));
        }
        self.handler.on_fetch(request).await
    }
}
