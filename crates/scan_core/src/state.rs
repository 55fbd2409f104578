use serde_json::Value;

use crate::view_model::{AppViewModel, SUBMIT_IDLE_CAPTION, SUBMIT_PENDING_CAPTION};
use crate::{ErrorInfo, Phase, RequestId, ScanConfig, SubmissionState};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    config: ScanConfig,
    submission: SubmissionState,
    /// Last successful payload. Survives later failures so the results panel
    /// keeps showing it.
    last_result: Option<Value>,
    last_request_id: RequestId,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a session from a config loaded elsewhere (e.g. a file).
    pub fn with_config(config: ScanConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn submission(&self) -> &SubmissionState {
        &self.submission
    }

    pub fn phase(&self) -> Phase {
        self.submission.phase()
    }

    pub fn view(&self) -> AppViewModel {
        let phase = self.phase();
        let pending = phase == Phase::Pending;
        AppViewModel {
            base_url: self.config.base_url().to_string(),
            endpoints: self.config.endpoints().to_vec(),
            phase,
            submit_label: if pending {
                SUBMIT_PENDING_CAPTION
            } else {
                SUBMIT_IDLE_CAPTION
            },
            submit_enabled: !pending,
            cancel_enabled: pending,
            results_text: self.last_result.as_ref().map(pretty_json),
            error: self.submission.error_info().cloned(),
            dirty: self.dirty,
        }
    }

    /// Returns whether anything changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn replace_config(&mut self, config: ScanConfig) {
        self.config = config;
        self.dirty = true;
    }

    pub(crate) fn begin_request(&mut self) -> RequestId {
        self.last_request_id += 1;
        let request_id = self.last_request_id;
        self.submission = SubmissionState::Pending { request_id };
        self.dirty = true;
        request_id
    }

    pub(crate) fn succeed(&mut self, result: Value) {
        self.last_result = Some(result.clone());
        self.submission = SubmissionState::Succeeded { result };
        self.dirty = true;
    }

    pub(crate) fn fail(&mut self, error: ErrorInfo) {
        self.submission = SubmissionState::Failed { error };
        self.dirty = true;
    }

    pub(crate) fn reset_to_idle(&mut self) {
        self.submission = SubmissionState::Idle;
        self.dirty = true;
    }
}

fn pretty_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
