use std::sync::Once;

use pretty_assertions::assert_eq;
use scan_core::{
    update, AppState, Effect, ErrorInfo, FailureCategory, Msg, Phase, RequestId, ScanConfig,
    SubmissionState, SUBMIT_IDLE_CAPTION, SUBMIT_PENDING_CAPTION,
};
use serde_json::json;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(scan_logging::initialize_for_tests);
}

fn ready_state() -> AppState {
    let (state, _) = update(
        AppState::new(),
        Msg::BaseUrlChanged("https://api.example.com".to_string()),
    );
    state
}

fn submit(state: AppState) -> (AppState, RequestId) {
    let (state, effects) = update(state, Msg::SubmitClicked);
    let request_id = effects
        .iter()
        .find_map(|effect| match effect {
            Effect::SubmitScan { request_id, .. } => Some(*request_id),
            _ => None,
        })
        .expect("submit effect");
    (state, request_id)
}

#[test]
fn edits_flow_through_the_config_model() {
    init_logging();
    let (state, effects) = update(
        AppState::new(),
        Msg::BaseUrlChanged("https://api.example.com".to_string()),
    );
    assert!(effects.is_empty());
    let (state, _) = update(state, Msg::EndpointAdded);
    let (mut state, _) = update(
        state,
        Msg::EndpointChanged {
            index: 1,
            value: "/users".to_string(),
        },
    );

    let view = state.view();
    assert_eq!(view.base_url, "https://api.example.com");
    assert_eq!(view.endpoints, vec!["".to_string(), "/users".to_string()]);
    assert_eq!(view.phase, Phase::Idle);
    assert!(state.consume_dirty());
}

#[test]
fn out_of_range_endpoint_edit_is_ignored() {
    init_logging();
    let mut state = ready_state();
    assert!(state.consume_dirty());

    let (mut next, effects) = update(
        state,
        Msg::EndpointChanged {
            index: 3,
            value: "/nope".to_string(),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(next.config().endpoints(), &[String::new()]);
    assert!(!next.consume_dirty());
}

#[test]
fn submit_moves_to_pending_and_emits_config_snapshot() {
    init_logging();
    let state = ready_state();
    let expected_config = state.config().clone();

    let (state, effects) = update(state, Msg::SubmitClicked);

    assert_eq!(
        effects,
        vec![Effect::SubmitScan {
            request_id: 1,
            config: expected_config,
        }]
    );
    assert_eq!(
        state.submission(),
        &SubmissionState::Pending { request_id: 1 }
    );
    let view = state.view();
    assert_eq!(view.submit_label, SUBMIT_PENDING_CAPTION);
    assert!(!view.submit_enabled);
    assert!(view.cancel_enabled);
    assert_eq!(view.results_text, None);
}

#[test]
fn submit_while_pending_does_not_issue_a_second_request() {
    init_logging();
    let (mut state, request_id) = submit(ready_state());
    assert!(state.consume_dirty());

    let (mut state, effects) = update(state, Msg::SubmitClicked);
    assert!(effects.is_empty());
    assert_eq!(state.submission().pending_request(), Some(request_id));
    assert!(!state.consume_dirty());
}

#[test]
fn editing_while_pending_keeps_the_request_outstanding() {
    init_logging();
    let (state, request_id) = submit(ready_state());
    let (state, effects) = update(state, Msg::EndpointAdded);

    assert!(effects.is_empty());
    assert_eq!(state.config().endpoint_count(), 2);
    assert_eq!(state.submission().pending_request(), Some(request_id));
}

#[test]
fn successful_response_is_stored_verbatim() {
    init_logging();
    let (state, request_id) = submit(ready_state());
    let payload = json!({"vulnerabilities": []});

    let (state, effects) = update(
        state,
        Msg::ScanCompleted {
            request_id,
            outcome: Ok(payload.clone()),
        },
    );

    assert!(effects.is_empty());
    assert_eq!(state.phase(), Phase::Succeeded);
    assert_eq!(state.submission().result(), Some(&payload));
    assert_eq!(state.submission().error_info(), None);

    let view = state.view();
    assert_eq!(view.submit_label, SUBMIT_IDLE_CAPTION);
    assert!(view.submit_enabled);
    assert_eq!(
        view.results_text.as_deref(),
        Some("{\n  \"vulnerabilities\": []\n}")
    );
}

#[test]
fn network_failure_returns_control_to_interactive_state() {
    init_logging();
    let (state, request_id) = submit(ready_state());
    let error = ErrorInfo::new(FailureCategory::Network, "connection refused");

    let (state, _) = update(
        state,
        Msg::ScanCompleted {
            request_id,
            outcome: Err(error.clone()),
        },
    );

    assert_eq!(state.phase(), Phase::Failed);
    assert_eq!(state.submission().result(), None);
    assert_eq!(state.submission().error_info(), Some(&error));
    let view = state.view();
    assert!(view.submit_enabled);
    assert!(!view.cancel_enabled);
    assert_eq!(view.error, Some(error));
}

#[test]
fn failure_after_success_keeps_last_result_on_display() {
    init_logging();
    let (state, first) = submit(ready_state());
    let (state, _) = update(
        state,
        Msg::ScanCompleted {
            request_id: first,
            outcome: Ok(json!({"vulnerabilities": [{"title": "Missing Authentication"}]})),
        },
    );
    let shown = state.view().results_text;
    assert!(shown.is_some());

    let (state, second) = submit(state);
    assert_eq!(second, first + 1);
    let (state, _) = update(
        state,
        Msg::ScanCompleted {
            request_id: second,
            outcome: Err(ErrorInfo::new(FailureCategory::Server, "boom").with_status(500)),
        },
    );

    assert_eq!(state.phase(), Phase::Failed);
    assert_eq!(state.submission().result(), None);
    assert_eq!(state.view().results_text, shown);
}

#[test]
fn invalid_base_url_fails_without_sending() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::SubmitClicked);

    assert!(effects.is_empty());
    assert_eq!(state.phase(), Phase::Failed);
    let error = state.submission().error_info().expect("error info");
    assert_eq!(error.category, FailureCategory::InvalidConfig);

    let (state, _) = update(state, Msg::BaseUrlChanged("not a url".to_string()));
    let (state, effects) = update(state, Msg::SubmitClicked);
    assert!(effects.is_empty());
    assert_eq!(
        state.submission().error_info().map(|e| e.category),
        Some(FailureCategory::InvalidConfig)
    );
}

#[test]
fn padded_base_url_is_not_sent() {
    init_logging();
    let (state, _) = update(
        AppState::new(),
        Msg::BaseUrlChanged("  https://api.example.com \t".to_string()),
    );
    let (state, effects) = update(state, Msg::SubmitClicked);

    assert!(effects.is_empty());
    assert_eq!(
        state.submission().error_info().map(|e| e.category),
        Some(FailureCategory::InvalidConfig)
    );
}

#[test]
fn resubmit_after_failure_is_allowed() {
    init_logging();
    let (state, first) = submit(ready_state());
    let (state, _) = update(
        state,
        Msg::ScanCompleted {
            request_id: first,
            outcome: Err(ErrorInfo::new(FailureCategory::Decode, "expected value")),
        },
    );

    let (state, second) = submit(state);
    assert_eq!(state.phase(), Phase::Pending);
    assert_ne!(first, second);
}

#[test]
fn stale_response_is_dropped() {
    init_logging();
    let (state, request_id) = submit(ready_state());
    let before = state.clone();

    let (state, effects) = update(
        state,
        Msg::ScanCompleted {
            request_id: request_id + 7,
            outcome: Ok(json!({"vulnerabilities": []})),
        },
    );

    assert!(effects.is_empty());
    assert_eq!(state, before);
}

#[test]
fn cancel_returns_to_idle_and_ignores_late_response() {
    init_logging();
    let (state, request_id) = submit(ready_state());

    let (state, effects) = update(state, Msg::CancelClicked);
    assert_eq!(effects, vec![Effect::CancelScan { request_id }]);
    assert_eq!(state.phase(), Phase::Idle);
    assert!(state.view().submit_enabled);

    let (state, _) = update(
        state,
        Msg::ScanCompleted {
            request_id,
            outcome: Ok(json!({"vulnerabilities": []})),
        },
    );
    assert_eq!(state.phase(), Phase::Idle);
    assert_eq!(state.view().results_text, None);
}

#[test]
fn late_response_for_cancelled_request_does_not_overwrite_newer_one() {
    init_logging();
    let (state, old) = submit(ready_state());
    let (state, _) = update(state, Msg::CancelClicked);
    let (state, new) = submit(state);

    let (state, _) = update(
        state,
        Msg::ScanCompleted {
            request_id: old,
            outcome: Ok(json!({"from": "old"})),
        },
    );
    assert_eq!(state.submission().pending_request(), Some(new));

    let (state, _) = update(
        state,
        Msg::ScanCompleted {
            request_id: new,
            outcome: Ok(json!({"from": "new"})),
        },
    );
    assert_eq!(state.submission().result(), Some(&json!({"from": "new"})));
}

#[test]
fn cancel_when_not_pending_is_noop() {
    init_logging();
    let mut state = ready_state();
    assert!(state.consume_dirty());

    let (mut next, effects) = update(state, Msg::CancelClicked);
    assert!(effects.is_empty());
    assert_eq!(next.phase(), Phase::Idle);
    assert!(!next.consume_dirty());
}

#[test]
fn state_can_start_from_loaded_config() {
    let config: ScanConfig = serde_json::from_value(json!({
        "api": {"base_url": "https://api.example.com", "endpoints": ["/a"]}
    }))
    .unwrap();
    let (_, effects) = update(AppState::with_config(config.clone()), Msg::SubmitClicked);
    assert_eq!(
        effects,
        vec![Effect::SubmitScan {
            request_id: 1,
            config,
        }]
    );
}
