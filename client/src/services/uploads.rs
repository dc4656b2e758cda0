//! Photo uploads for meal logs

use crate::error::{RequestError, RequestResult};
use crate::http::{ApiRequest, FilePart, ResilientClient};
use peak_partner_shared::{UploadedPhoto, ValidationError};
use tracing::info;

/// Largest accepted photo
pub const MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;

pub struct UploadApi;

impl UploadApi {
    /// Upload an image and return its public URL.
    pub async fn photo(
        client: &ResilientClient,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> RequestResult<String> {
        Self::check_photo(content_type, bytes.len())?;

        info!(file_name, size = bytes.len(), "Uploading photo");
        let part = FilePart {
            field: "file".to_string(),
            file_name: file_name.to_string(),
            content_type: content_type.to_string(),
            bytes,
        };
        let uploaded: UploadedPhoto = client
            .call(ApiRequest::post("/uploads/photo").multipart(part))
            .await?;
        Ok(uploaded.url)
    }

    fn check_photo(content_type: &str, size: usize) -> Result<(), RequestError> {
        if size == 0 {
            return Err(ValidationError::new("file", "File is empty").into());
        }
        if size > MAX_PHOTO_BYTES {
            return Err(ValidationError::new("file", "File size exceeds 5MB limit").into());
        }
        if !content_type.starts_with("image/") {
            return Err(ValidationError::new("file", "Only image files are allowed").into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_photo_limits() {
        assert!(UploadApi::check_photo("image/jpeg", 1024).is_ok());
        assert!(UploadApi::check_photo("image/png", 0).is_err());
        assert!(UploadApi::check_photo("image/png", MAX_PHOTO_BYTES + 1).is_err());
        assert!(UploadApi::check_photo("application/pdf", 1024).is_err());
    }
}
