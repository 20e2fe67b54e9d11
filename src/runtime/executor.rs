//! Widget runtime executor

use super::Command;
use crate::config::EngineConfig;
use crate::session::{transition, Effect, Event, TransitionError, WidgetState, WidgetUpdate};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, watch};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Event loop that owns the widget state
pub struct WidgetRuntime {
    config: EngineConfig,
    state: WidgetState,
    command_rx: mpsc::Receiver<Command>,
    /// Weak so that dropping every handle stops the loop
    timer_tx: mpsc::WeakSender<Command>,
    state_tx: watch::Sender<WidgetState>,
    update_tx: broadcast::Sender<WidgetUpdate>,
    /// Token of the deferred emission currently scheduled
    pending_timer: Option<CancellationToken>,
}

impl WidgetRuntime {
    pub(crate) fn new(
        config: EngineConfig,
        command_rx: mpsc::Receiver<Command>,
        timer_tx: mpsc::WeakSender<Command>,
        state_tx: watch::Sender<WidgetState>,
        update_tx: broadcast::Sender<WidgetUpdate>,
    ) -> Self {
        Self {
            config,
            state: WidgetState::Closed,
            command_rx,
            timer_tx,
            state_tx,
            update_tx,
            pending_timer: None,
        }
    }

    pub async fn run(mut self) {
        tracing::info!(
            reply_delay = ?self.config.reply_delay,
            reset_delay = ?self.config.reset_delay,
            routine_profile = self.config.routine_profile,
            "Starting dialogue runtime"
        );

        // Process commands one at a time, in arrival order
        while let Some(command) = self.command_rx.recv().await {
            self.process_command(command);
        }

        self.cancel_pending();
        tracing::info!("Dialogue runtime stopped");
    }

    fn process_command(&mut self, command: Command) {
        let Command { event, reply } = command;
        let kind = event.kind();

        let outcome = self.process_event(event);
        if let Err(e) = &outcome {
            // Out-of-order UI events and late timers end up here; not a fault
            tracing::debug!(event = kind, error = %e, "Event rejected");
        }

        if let Some(reply) = reply {
            let _ = reply.send(outcome);
        }
    }

    fn process_event(&mut self, event: Event) -> Result<(), TransitionError> {
        let fired = matches!(event, Event::ReplyDue { .. } | Event::ResetDue { .. });
        let kind = event.kind();

        // Pure state transition
        let result = transition(&self.state, &self.config, event)?;

        if fired {
            self.pending_timer = None;
        }
        self.state = result.new_state;
        self.state_tx.send_replace(self.state.clone());
        self.log_transition(kind);

        for effect in result.effects {
            self.execute_effect(effect);
        }
        Ok(())
    }

    fn log_transition(&self, kind: &'static str) {
        match &self.state {
            WidgetState::Closed => tracing::info!(event = kind, "Assistant closed"),
            WidgetState::Open(session) => {
                let phase = session.phase();
                match kind {
                    "open" | "reset_due" => {
                        tracing::info!(session_id = %session.id, event = kind, "Session started");
                    }
                    _ => tracing::debug!(
                        session_id = %session.id,
                        event = kind,
                        step = %session.current_step,
                        ?phase,
                        messages = session.log.len(),
                        "Transition applied"
                    ),
                }
            }
        }
    }

    fn execute_effect(&mut self, effect: Effect) {
        match effect {
            Effect::ScheduleReply { session_id, delay } => {
                self.schedule(delay, Event::ReplyDue { session_id });
            }

            Effect::ScheduleReset { session_id, delay } => {
                let fresh_id = Uuid::new_v4();
                self.schedule(
                    delay,
                    Event::ResetDue {
                        session_id,
                        fresh_id,
                    },
                );
            }

            Effect::CancelPending => self.cancel_pending(),

            Effect::Notify(update) => {
                // No subscribers is fine
                let _ = self.update_tx.send(update);
            }
        }
    }

    /// Deliver `event` after `delay` unless cancelled first.
    ///
    /// Only one deferred emission is outstanding at a time.
    fn schedule(&mut self, delay: Duration, event: Event) {
        self.cancel_pending();

        let token = CancellationToken::new();
        self.pending_timer = Some(token.clone());
        let timer_tx = self.timer_tx.clone();
        let kind = event.kind();

        tokio::spawn(async move {
            tokio::select! {
                biased;

                () = token.cancelled() => {
                    tracing::debug!(event = kind, "Deferred emission cancelled");
                }

                () = tokio::time::sleep(delay) => {
                    if let Some(tx) = timer_tx.upgrade() {
                        let _ = tx.send(Command::timer(event)).await;
                    }
                }
            }
        });
    }

    fn cancel_pending(&mut self) {
        if let Some(token) = self.pending_timer.take() {
            token.cancel();
        }
    }
}
