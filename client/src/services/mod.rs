//! Typed access to the REST collaborator
//!
//! Each service is a stateless set of calls over a [`ResilientClient`].
//! Responses are converted into the shared model before they leave this
//! module, and mutations are checked locally before they touch the network.

pub mod adherence;
pub mod assessments;
pub mod connections;
pub mod logs;
pub mod plans;
pub mod profile;
pub mod sessions;
pub mod uploads;

pub use adherence::{AdherenceService, DayOverview};
pub use assessments::AssessmentApi;
pub use connections::ConnectionApi;
pub use logs::LogApi;
pub use plans::PlanApi;
pub use profile::ProfileApi;
pub use sessions::{NewSession, SessionApi};
pub use uploads::UploadApi;

use crate::error::{RequestError, RequestResult};
use crate::http::ResilientClient;
use peak_partner_shared::Actor;

/// The signed-in actor, or `Auth` when nobody is signed in.
pub(crate) fn require_actor(client: &ResilientClient) -> RequestResult<Actor> {
    client.session().actor().ok_or(RequestError::Auth)
}

/// Append `key=value` pairs that are present to a path.
pub(crate) fn with_query(path: &str, params: &[(&str, Option<String>)]) -> String {
    let query: Vec<String> = params
        .iter()
        .filter_map(|(key, value)| value.as_ref().map(|v| format!("{key}={v}")))
        .collect();

    if query.is_empty() {
        path.to_string()
    } else {
        format!("{path}?{}", query.join("&"))
    }
}
