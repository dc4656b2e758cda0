//! HTTP plumbing: a single-attempt transport and the resilient layer on top.

pub mod resilient;
pub mod transport;

pub use resilient::{classify_response, decode_envelope, BackendReadiness, ResilientClient};
pub use transport::{
    ApiRequest, FilePart, Method, RawResponse, ReqwestTransport, RequestBody, Transport,
    TransportError,
};
