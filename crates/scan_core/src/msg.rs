#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User edited the base url field.
    BaseUrlChanged(String),
    /// User edited one endpoint row.
    EndpointChanged { index: usize, value: String },
    /// User asked for another endpoint row.
    EndpointAdded,
    /// User pressed the submit control.
    SubmitClicked,
    /// User abandoned the outstanding request.
    CancelClicked,
    /// Engine finished a request, successfully or not.
    ScanCompleted {
        request_id: crate::RequestId,
        outcome: crate::ScanOutcome,
    },
    /// Fallback for placeholder wiring.
    NoOp,
}
