use scan_logging::{scan_debug, scan_info, scan_warn};

use crate::config::{append_endpoint, set_base_url, set_endpoint_at};
use crate::{AppState, Effect, ErrorInfo, FailureCategory, Msg, Phase};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::BaseUrlChanged(value) => {
            let next = set_base_url(state.config(), value);
            state.replace_config(next);
            Vec::new()
        }
        Msg::EndpointChanged { index, value } => {
            let len = state.config().endpoint_count();
            if index < len {
                let next = set_endpoint_at(state.config(), index, value);
                state.replace_config(next);
            } else {
                scan_warn!("Ignoring edit for endpoint row {} (only {} rows)", index, len);
            }
            Vec::new()
        }
        Msg::EndpointAdded => {
            let next = append_endpoint(state.config());
            state.replace_config(next);
            Vec::new()
        }
        Msg::SubmitClicked => {
            if state.phase() == Phase::Pending {
                // One outstanding request at a time; the control is disabled anyway.
                scan_debug!("Submit ignored: a scan is already pending");
                return (state, Vec::new());
            }
            match state.config().validate() {
                Ok(()) => {
                    let request_id = state.begin_request();
                    scan_info!(
                        "Submitting scan request_id={} endpoints={}",
                        request_id,
                        state.config().endpoint_count()
                    );
                    vec![Effect::SubmitScan {
                        request_id,
                        config: state.config().clone(),
                    }]
                }
                Err(err) => {
                    scan_warn!("Submit rejected before sending: {}", err);
                    state.fail(ErrorInfo::new(
                        FailureCategory::InvalidConfig,
                        err.to_string(),
                    ));
                    Vec::new()
                }
            }
        }
        Msg::CancelClicked => match state.submission().pending_request() {
            Some(request_id) => {
                scan_info!("Cancelling scan request_id={}", request_id);
                state.reset_to_idle();
                vec![Effect::CancelScan { request_id }]
            }
            None => Vec::new(),
        },
        Msg::ScanCompleted {
            request_id,
            outcome,
        } => {
            if state.submission().pending_request() != Some(request_id) {
                scan_debug!("Dropping stale response for request_id={}", request_id);
                return (state, Vec::new());
            }
            match outcome {
                Ok(result) => {
                    scan_info!("Scan request_id={} succeeded", request_id);
                    state.succeed(result);
                }
                Err(error) => {
                    scan_warn!("Scan request_id={} failed: {}", request_id, error);
                    state.fail(error);
                }
            }
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}
