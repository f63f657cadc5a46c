use crate::session::{CallSession, SessionEvent, SessionState};
use huddle_core::{ClientMessage, ServerMessage};
use tokio::sync::{mpsc, watch};
use tokio::time::{Duration, Instant};
use tracing::{debug, info};

/// Local one-shot commands into a running driver.
#[derive(Debug)]
pub enum DriverCommand {
    EndCall,
}

/// Application-side handle to a running [`CallDriver`]. Dropping it ends
/// the call.
pub struct CallHandle {
    command_tx: mpsc::Sender<DriverCommand>,
    /// Observes every state transition; the application renders from this.
    pub state: watch::Receiver<SessionState>,
}

impl CallHandle {
    pub async fn end_call(&self) {
        let _ = self.command_tx.send(DriverCommand::EndCall).await;
    }

    pub fn current_state(&self) -> SessionState {
        self.state.borrow().clone()
    }
}

/// Event loop around one [`CallSession`]: a single task that serializes
/// inbound server messages, local commands and the negotiation deadline,
/// so the state machine never sees concurrent events.
pub struct CallDriver {
    session: CallSession,
    server_rx: mpsc::Receiver<ServerMessage>,
    outbound_tx: mpsc::Sender<ClientMessage>,
    command_rx: mpsc::Receiver<DriverCommand>,
    state_tx: watch::Sender<SessionState>,
    negotiation_timeout: Duration,
}

impl CallDriver {
    pub fn new(
        session: CallSession,
        server_rx: mpsc::Receiver<ServerMessage>,
        outbound_tx: mpsc::Sender<ClientMessage>,
        negotiation_timeout: Duration,
    ) -> (Self, CallHandle) {
        let (command_tx, command_rx) = mpsc::channel(8);
        let (state_tx, state_rx) = watch::channel(session.state().clone());

        let driver = Self {
            session,
            server_rx,
            outbound_tx,
            command_rx,
            state_tx,
            negotiation_timeout,
        };
        let handle = CallHandle {
            command_tx,
            state: state_rx,
        };
        (driver, handle)
    }

    pub async fn run(mut self) {
        let mut deadline: Option<Instant> = None;

        loop {
            tokio::select! {
                message = self.server_rx.recv() => match message {
                    Some(message) => {
                        if let Some(event) = SessionEvent::from_server(message) {
                            self.apply(event).await;
                        }
                    }
                    // The connection layer went away; same as hanging up.
                    None => self.apply(SessionEvent::EndCall).await,
                },

                command = self.command_rx.recv() => {
                    debug!(?command, "local end-call");
                    self.apply(SessionEvent::EndCall).await;
                }

                _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)),
                    if deadline.is_some() =>
                {
                    deadline = None;
                    self.apply(SessionEvent::NegotiationTimedOut).await;
                }
            }

            match self.session.state() {
                state if state.is_terminal() => break,
                // The deadline covers the offer/answer exchange only; once
                // it settles the call may stay in `Negotiating` (responder
                // side) for as long as it likes.
                SessionState::Negotiating(_) if !self.session.negotiation_settled() => {
                    if deadline.is_none() {
                        deadline = Some(Instant::now() + self.negotiation_timeout);
                    }
                }
                _ => deadline = None,
            }
        }

        info!(state = ?self.session.state(), "call driver finished");
    }

    async fn apply(&mut self, event: SessionEvent) {
        for message in self.session.handle_event(event).await {
            if self.outbound_tx.send(message).await.is_err() {
                debug!("outbound channel closed, envelope dropped");
            }
        }
        let _ = self.state_tx.send(self.session.state().clone());
    }
}
