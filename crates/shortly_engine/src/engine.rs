use std::io;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use shortly_logging::{shortly_debug, shortly_info, shortly_trace, shortly_warn};
use thiserror::Error;
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};
use tokio_util::sync::CancellationToken;

use crate::{EngineEvent, IdentityProvider, RequestId, ShortenRequest, ShortenerApi};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to build async runtime: {0}")]
    Runtime(#[source] io::Error),
    #[error("failed to spawn engine thread: {0}")]
    Spawn(#[source] io::Error),
}

enum EngineCommand {
    Shorten {
        request_id: RequestId,
        request: ShortenRequest,
    },
    FetchHistory {
        request_id: RequestId,
        email: String,
    },
    SignIn {
        request_id: RequestId,
    },
    SignOut,
}

/// Runs remote calls on a background thread and reports them as events.
///
/// The thread drives a current-thread tokio runtime, so calls interleave
/// cooperatively and never run in parallel.
pub struct EngineHandle {
    cmd_tx: UnboundedSender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
    shutdown: CancellationToken,
    worker: Option<thread::JoinHandle<()>>,
}

impl EngineHandle {
    pub fn new(
        api: Arc<dyn ShortenerApi>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Result<Self, EngineError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(EngineError::Runtime)?;
        let (cmd_tx, mut cmd_rx) = unbounded_channel();
        let (event_tx, event_rx) = mpsc::channel();
        let shutdown = CancellationToken::new();
        let cancelled = shutdown.clone();

        let worker = thread::Builder::new()
            .name("shortly-engine".to_string())
            .spawn(move || {
                runtime.block_on(async move {
                    loop {
                        tokio::select! {
                            _ = cancelled.cancelled() => break,
                            command = cmd_rx.recv() => {
                                let Some(command) = command else { break };
                                tokio::spawn(handle_command(
                                    api.clone(),
                                    identity.clone(),
                                    command,
                                    event_tx.clone(),
                                ));
                            }
                        }
                    }
                });
                shortly_debug!("Engine thread stopped");
            })
            .map_err(EngineError::Spawn)?;

        Ok(Self {
            cmd_tx,
            event_rx,
            shutdown,
            worker: Some(worker),
        })
    }

    pub fn shorten(&self, request_id: RequestId, request: ShortenRequest) {
        self.send(EngineCommand::Shorten {
            request_id,
            request,
        });
    }

    pub fn fetch_history(&self, request_id: RequestId, email: impl Into<String>) {
        self.send(EngineCommand::FetchHistory {
            request_id,
            email: email.into(),
        });
    }

    pub fn sign_in(&self, request_id: RequestId) {
        self.send(EngineCommand::SignIn { request_id });
    }

    pub fn sign_out(&self) {
        self.send(EngineCommand::SignOut);
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            shortly_warn!("Engine stopped; command dropped");
        }
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.shutdown.cancel();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

async fn handle_command(
    api: Arc<dyn ShortenerApi>,
    identity: Arc<dyn IdentityProvider>,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let event = match command {
        EngineCommand::Shorten {
            request_id,
            request,
        } => {
            let result = api.shorten(&request).await;
            match &result {
                Ok(fragment) => shortly_info!("Shorten #{} -> {}", request_id, fragment),
                Err(err) => shortly_warn!("Shorten #{} failed: {}", request_id, err),
            }
            EngineEvent::ShortenCompleted { request_id, result }
        }
        EngineCommand::FetchHistory { request_id, email } => {
            let result = api.fetch_history(&email).await;
            match &result {
                Ok(records) => {
                    shortly_info!("History #{}: {} entries", request_id, records.len())
                }
                Err(err) => shortly_warn!("History #{} failed: {}", request_id, err),
            }
            EngineEvent::HistoryFetched { request_id, result }
        }
        EngineCommand::SignIn { request_id } => {
            let result = identity.sign_in().await;
            if let Err(err) = &result {
                shortly_warn!("Sign-in #{} failed: {}", request_id, err);
            }
            EngineEvent::SignInCompleted { request_id, result }
        }
        EngineCommand::SignOut => {
            let result = identity.sign_out().await;
            if let Err(err) = &result {
                shortly_warn!("Sign-out failed: {}", err);
            }
            EngineEvent::SignOutCompleted(result)
        }
    };
    if event_tx.send(event).is_err() {
        shortly_trace!("Event dropped; engine handle is gone");
    }
}
