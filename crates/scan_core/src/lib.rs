//! Scanner core: scan-config model, submission state machine and view-model helpers.
mod config;
mod effect;
mod msg;
mod state;
mod store;
mod submission;
mod update;
mod view_model;

pub use config::{append_endpoint, set_base_url, set_endpoint_at, ConfigError, ScanConfig};
pub use effect::Effect;
pub use msg::Msg;
pub use state::AppState;
pub use store::Store;
pub use submission::{
    ErrorInfo, FailureCategory, Phase, RequestId, ScanOutcome, SubmissionState,
};
pub use update::update;
pub use view_model::{AppViewModel, SUBMIT_IDLE_CAPTION, SUBMIT_PENDING_CAPTION};
