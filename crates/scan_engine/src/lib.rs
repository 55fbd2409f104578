//! Scanner engine: request submission and response decoding.
mod decode;
mod engine;
mod submit;
mod types;

pub use decode::{decode_json, DecodeError, DecodedBody};
pub use engine::{EngineEvents, EngineHandle};
pub use submit::{ReqwestSubmitter, SubmitSettings, Submitter, DEFAULT_SERVICE_URL};
pub use types::{
    EngineEvent, FailureKind, RequestId, ResponseMetadata, ScanOutput, SubmitError,
};
