//! Profile lookups

use crate::error::RequestResult;
use crate::http::ResilientClient;
use peak_partner_shared::ProfileDto;

pub struct ProfileApi;

impl ProfileApi {
    /// Profile of the signed-in user.
    pub async fn me(client: &ResilientClient) -> RequestResult<ProfileDto> {
        client.get("/profiles/me").await
    }
}
