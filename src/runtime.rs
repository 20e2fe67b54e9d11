//! Runtime for the dialogue engine
//!
//! Owns the single widget state, applies transitions in arrival order and
//! carries out their effects. Deferred emissions run as cancellable timer
//! tasks that feed events back into the same queue.

mod executor;

#[cfg(test)]
pub mod testing;

pub use executor::WidgetRuntime;

use crate::config::EngineConfig;
use crate::session::{Event, TransitionError, WidgetState, WidgetUpdate};
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use uuid::Uuid;

const COMMAND_BUFFER: usize = 32;
const UPDATE_BUFFER: usize = 128;

/// Errors returned to callers of `WidgetHandle`
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The action does not fit the current phase; nothing changed
    #[error(transparent)]
    Rejected(#[from] TransitionError),
    #[error("Dialogue runtime has stopped")]
    Stopped,
}

/// An event queued for the runtime, with an optional reply slot
#[derive(Debug)]
pub(crate) struct Command {
    pub event: Event,
    pub reply: Option<oneshot::Sender<Result<(), TransitionError>>>,
}

impl Command {
    fn request(event: Event) -> (Self, oneshot::Receiver<Result<(), TransitionError>>) {
        let (reply_tx, reply_rx) = oneshot::channel();
        (
            Self {
                event,
                reply: Some(reply_tx),
            },
            reply_rx,
        )
    }

    pub(crate) fn timer(event: Event) -> Self {
        Self { event, reply: None }
    }
}

/// Handle to interact with a running widget.
///
/// Cloneable; the runtime stops once every handle is dropped.
#[derive(Clone)]
pub struct WidgetHandle {
    command_tx: mpsc::Sender<Command>,
    state_rx: watch::Receiver<WidgetState>,
    update_tx: broadcast::Sender<WidgetUpdate>,
}

/// Build a runtime and its handle without starting it
pub fn build(config: EngineConfig) -> (WidgetRuntime, WidgetHandle) {
    let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
    let (state_tx, state_rx) = watch::channel(WidgetState::Closed);
    let (update_tx, _) = broadcast::channel(UPDATE_BUFFER);

    let runtime = WidgetRuntime::new(
        config,
        command_rx,
        command_tx.downgrade(),
        state_tx,
        update_tx.clone(),
    );
    let handle = WidgetHandle {
        command_tx,
        state_rx,
        update_tx,
    };
    (runtime, handle)
}

/// Start a widget runtime on the current tokio runtime
pub fn spawn(config: EngineConfig) -> WidgetHandle {
    let (runtime, handle) = build(config);
    tokio::spawn(runtime.run());
    handle
}

impl WidgetHandle {
    /// Open the assistant with a fresh session, replacing any current one
    pub async fn open(&self) -> Result<Uuid, RuntimeError> {
        let session_id = Uuid::new_v4();
        self.send(Event::Open { session_id }).await?;
        Ok(session_id)
    }

    /// Close the assistant, discarding the session and anything scheduled for it
    pub async fn close(&self) -> Result<(), RuntimeError> {
        self.send(Event::Close).await
    }

    /// Choose an option at the current step
    pub async fn select_option(
        &self,
        option_id: impl Into<String>,
        label: impl Into<String>,
    ) -> Result<(), RuntimeError> {
        self.send(Event::select(option_id, label)).await
    }

    /// Choose an option rendered under `step`; rejected if the dialogue has moved on
    pub async fn select_option_at(
        &self,
        step: impl Into<String>,
        option_id: impl Into<String>,
        label: impl Into<String>,
    ) -> Result<(), RuntimeError> {
        self.send(Event::select_at(step, option_id, label)).await
    }

    pub async fn submit_rating(&self, stars: u8) -> Result<(), RuntimeError> {
        self.send(Event::SubmitRating { stars }).await
    }

    /// Current widget state
    pub fn snapshot(&self) -> WidgetState {
        self.state_rx.borrow().clone()
    }

    /// Receiver that always holds the latest widget state
    pub fn watch(&self) -> watch::Receiver<WidgetState> {
        self.state_rx.clone()
    }

    /// Stream of incremental updates (messages, phase changes, resets)
    pub fn subscribe(&self) -> broadcast::Receiver<WidgetUpdate> {
        self.update_tx.subscribe()
    }

    async fn send(&self, event: Event) -> Result<(), RuntimeError> {
        let (command, reply_rx) = Command::request(event);
        self.command_tx
            .send(command)
            .await
            .map_err(|_| RuntimeError::Stopped)?;
        reply_rx.await.map_err(|_| RuntimeError::Stopped)??;
        Ok(())
    }
}
