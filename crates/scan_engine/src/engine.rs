use std::collections::HashMap;
use std::io;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use scan_logging::{scan_debug, scan_info};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::submit::{ReqwestSubmitter, SubmitSettings, Submitter};
use crate::{EngineEvent, RequestId};

enum EngineCommand {
    Submit { request_id: RequestId, body: Value },
    Cancel { request_id: RequestId },
}

type InFlight = Arc<Mutex<HashMap<RequestId, CancellationToken>>>;

/// Handle to the background submission runtime.
///
/// Commands are processed in the order they are sent, so a cancel always sees
/// the submit that preceded it. A cancelled request produces no event.
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    events: EngineEvents,
}

/// Receiving side of the engine, detached from the command sender.
///
/// Holding one does not keep the engine alive: once every `EngineHandle` is
/// dropped the command thread exits, the runtime goes with it, and receives
/// report `Disconnected`.
#[derive(Clone)]
pub struct EngineEvents {
    rx: Arc<Mutex<mpsc::Receiver<EngineEvent>>>,
}

impl EngineEvents {
    pub fn recv_timeout(&self, timeout: Duration) -> Result<EngineEvent, RecvTimeoutError> {
        self.rx
            .lock()
            .map_err(|_| RecvTimeoutError::Disconnected)?
            .recv_timeout(timeout)
    }
}

impl EngineHandle {
    pub fn new(settings: SubmitSettings) -> io::Result<Self> {
        Self::with_submitter(Arc::new(ReqwestSubmitter::new(settings)))
    }

    pub fn with_submitter(submitter: Arc<dyn Submitter>) -> io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("scan-engine")
            .enable_all()
            .build()?;
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::Builder::new()
            .name("scan-engine-commands".to_string())
            .spawn(move || {
                let in_flight: InFlight = Arc::default();
                while let Ok(command) = cmd_rx.recv() {
                    handle_command(&runtime, &submitter, &in_flight, &event_tx, command);
                }
                scan_debug!("Engine command channel closed; shutting down runtime");
            })?;

        Ok(Self {
            cmd_tx,
            events: EngineEvents {
                rx: Arc::new(Mutex::new(event_rx)),
            },
        })
    }

    pub fn submit(&self, request_id: RequestId, body: Value) {
        let _ = self.cmd_tx.send(EngineCommand::Submit { request_id, body });
    }

    pub fn cancel(&self, request_id: RequestId) {
        let _ = self.cmd_tx.send(EngineCommand::Cancel { request_id });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.events.rx.lock().ok()?.try_recv().ok()
    }

    pub fn events(&self) -> EngineEvents {
        self.events.clone()
    }
}

fn handle_command(
    runtime: &tokio::runtime::Runtime,
    submitter: &Arc<dyn Submitter>,
    in_flight: &InFlight,
    event_tx: &mpsc::Sender<EngineEvent>,
    command: EngineCommand,
) {
    match command {
        EngineCommand::Submit { request_id, body } => {
            let token = CancellationToken::new();
            in_flight
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(request_id, token.clone());

            let submitter = submitter.clone();
            let event_tx = event_tx.clone();
            let in_flight = in_flight.clone();
            runtime.spawn(async move {
                tokio::select! {
                    _ = token.cancelled() => {
                        scan_info!("request_id={} cancelled before completion", request_id);
                    }
                    result = submitter.submit(request_id, &body) => {
                        let _ = event_tx.send(EngineEvent::ScanCompleted { request_id, result });
                    }
                }
                in_flight
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .remove(&request_id);
            });
        }
        EngineCommand::Cancel { request_id } => {
            let token = in_flight
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&request_id);
            match token {
                Some(token) => token.cancel(),
                None => scan_debug!("cancel for request_id={} with nothing in flight", request_id),
            }
        }
    }
}
