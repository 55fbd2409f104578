use std::io;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use scan_core::{Effect, ErrorInfo, FailureCategory, Msg, ScanOutcome};
use scan_engine::{
    EngineEvent, EngineHandle, FailureKind, ScanOutput, SubmitError, SubmitSettings,
};
use scan_logging::{scan_debug, scan_error, scan_info};

use crate::app::AppEvent;

/// Runs core effects against the engine and feeds completions back as messages.
pub struct EffectRunner {
    engine: EngineHandle,
    events: mpsc::Sender<AppEvent>,
}

impl EffectRunner {
    pub fn new(settings: SubmitSettings, events: mpsc::Sender<AppEvent>) -> io::Result<Self> {
        let engine = EngineHandle::new(settings)?;
        let runner = Self { engine, events };
        runner.spawn_event_loop();
        Ok(runner)
    }

    pub fn run(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::SubmitScan { request_id, config } => {
                    match serde_json::to_value(&config) {
                        Ok(body) => {
                            scan_info!(
                                "SubmitScan request_id={} base_url={}",
                                request_id,
                                config.base_url()
                            );
                            self.engine.submit(request_id, body);
                        }
                        Err(err) => {
                            scan_error!("Could not encode scan config: {}", err);
                            let _ = self.events.send(AppEvent::Dispatch(Msg::ScanCompleted {
                                request_id,
                                outcome: Err(ErrorInfo::new(
                                    FailureCategory::InvalidConfig,
                                    err.to_string(),
                                )),
                            }));
                        }
                    }
                }
                Effect::CancelScan { request_id } => {
                    scan_info!("CancelScan request_id={}", request_id);
                    self.engine.cancel(request_id);
                }
            }
        }
    }

    fn spawn_event_loop(&self) {
        let engine_events = self.engine.events();
        let events = self.events.clone();
        thread::spawn(move || loop {
            let event = match engine_events.recv_timeout(Duration::from_millis(100)) {
                Ok(event) => event,
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => {
                    scan_debug!("Engine event channel closed");
                    break;
                }
            };
            match event {
                EngineEvent::ScanCompleted { request_id, result } => {
                    let msg = Msg::ScanCompleted {
                        request_id,
                        outcome: to_outcome(result),
                    };
                    if events.send(AppEvent::Dispatch(msg)).is_err() {
                        break;
                    }
                }
            }
        });
    }
}

fn to_outcome(result: Result<ScanOutput, SubmitError>) -> ScanOutcome {
    result
        .map(|output| {
            let meta = &output.metadata;
            scan_info!(
                "Scan response from {}: status={} bytes={} encoding={}",
                meta.scan_url,
                meta.status,
                meta.byte_len,
                meta.encoding_label
            );
            output.payload
        })
        .map_err(|err| {
            let info = ErrorInfo::new(category_for(&err.kind), err.to_string());
            match err.kind {
                FailureKind::HttpStatus(code) => info.with_status(code),
                _ => info,
            }
        })
}

fn category_for(kind: &FailureKind) -> FailureCategory {
    match kind {
        FailureKind::InvalidServiceUrl | FailureKind::Network | FailureKind::Timeout => {
            FailureCategory::Network
        }
        FailureKind::HttpStatus(_) => FailureCategory::Server,
        FailureKind::TooLarge { .. } | FailureKind::Decode => FailureCategory::Decode,
        FailureKind::Encode => FailureCategory::InvalidConfig,
    }
}
