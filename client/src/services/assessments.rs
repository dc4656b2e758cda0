//! Assessments

use crate::error::RequestResult;
use crate::http::ResilientClient;
use peak_partner_shared::AssessmentDto;

pub struct AssessmentApi;

impl AssessmentApi {
    pub async fn list(client: &ResilientClient) -> RequestResult<Vec<AssessmentDto>> {
        client.get("/assessments").await
    }
}
