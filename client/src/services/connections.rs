//! Trainer/client connections

use super::with_query;
use crate::error::RequestResult;
use crate::http::ResilientClient;
use peak_partner_shared::{ConnectionDto, ConnectionStatus};

pub struct ConnectionApi;

impl ConnectionApi {
    /// Connections of the signed-in user, optionally filtered by status.
    pub async fn list(
        client: &ResilientClient,
        status: Option<ConnectionStatus>,
    ) -> RequestResult<Vec<ConnectionDto>> {
        let path = with_query("/connections", &[("status", status.map(|s| s.to_string()))]);
        client.get(&path).await
    }

    /// Number of accepted clients of the signed-in trainer.
    pub async fn active_client_count(client: &ResilientClient) -> RequestResult<u64> {
        client.get("/connections/count").await
    }
}
