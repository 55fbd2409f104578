#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Send `config` to the scanning service, tagged with `request_id`.
    SubmitScan {
        request_id: crate::RequestId,
        config: crate::ScanConfig,
    },
    /// Abandon the request; any late response for it is ignored.
    CancelScan { request_id: crate::RequestId },
}
