use crate::{ErrorInfo, Phase};

/// Submit control caption while no request is outstanding.
pub const SUBMIT_IDLE_CAPTION: &str = "Start Scan";
/// Submit control caption while a request is outstanding.
pub const SUBMIT_PENDING_CAPTION: &str = "Scanning...";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub base_url: String,
    pub endpoints: Vec<String>,
    pub phase: Phase,
    pub submit_label: &'static str,
    pub submit_enabled: bool,
    pub cancel_enabled: bool,
    /// Pretty-printed last successful result; `None` until the first success.
    pub results_text: Option<String>,
    pub error: Option<ErrorInfo>,
    pub dirty: bool,
}
