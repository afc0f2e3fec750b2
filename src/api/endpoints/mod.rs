pub mod detect;
pub mod docs;
pub mod health;
pub mod ocr_search;
pub mod recommend;

use axum::extract::Multipart;

use super::error::ApiError;

/// Pull the `image` field out of a multipart upload.
pub(crate) async fn read_image_field(mut multipart: Multipart) -> Result<Vec<u8>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(ApiError::bad_upload)?
    {
        if field.name() == Some("image") {
            let bytes = field.bytes().await.map_err(ApiError::bad_upload)?;
            if bytes.is_empty() {
                return Err(ApiError::BadRequest("Empty image upload".to_string()));
            }
            return Ok(bytes.to_vec());
        }
    }

    Err(ApiError::BadRequest("No image uploaded".to_string()))
}
