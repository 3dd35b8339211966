//! Body of `POST /materials`: multipart with an optional file part, or JSON.

use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header::CONTENT_TYPE;
use bytes::Bytes;

use tutorhub_core::error::AppError;
use tutorhub_core::types::MaterialId;
use tutorhub_entity::material::MaterialKind;
use tutorhub_service::material::{CreateMaterialRequest, UploadedFile};

use super::path::parse_id;
use crate::dto::request::CreateMaterialBody;
use crate::error::ApiError;

/// Extracted create request.
#[derive(Debug, Clone)]
pub struct CreateMaterialForm(pub CreateMaterialRequest);

impl<S> FromRequest<S> for CreateMaterialForm
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.to_ascii_lowercase().starts_with("multipart/form-data"));

        if is_multipart {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| AppError::validation(format!("Invalid multipart body: {e}")))?;
            return Ok(Self(read_multipart(multipart).await?));
        }

        let body = Bytes::from_request(req, state)
            .await
            .map_err(|e| AppError::validation(format!("Failed to read request body: {e}")))?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self(CreateMaterialRequest::default()));
        }
        let parsed: CreateMaterialBody = serde_json::from_slice(&body)
            .map_err(|e| AppError::validation(format!("Invalid JSON body: {e}")))?;
        Ok(Self(parsed.into()))
    }
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> AppError {
    AppError::validation(format!("Invalid multipart body: {e}"))
}

async fn read_multipart(mut multipart: Multipart) -> Result<CreateMaterialRequest, AppError> {
    let mut req = CreateMaterialRequest::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if let Some(file_name) = field.file_name().map(str::to_string) {
            let data = field.bytes().await.map_err(multipart_error)?;
            req.upload = Some(UploadedFile { file_name, data });
            continue;
        }

        let name = field.name().unwrap_or_default().to_string();
        let value = field.text().await.map_err(multipart_error)?;
        let value = value.trim();

        match name.as_str() {
            "Name" => req.name = Some(value.to_string()),
            "Kind" if !value.is_empty() => req.kind = Some(value.parse::<MaterialKind>()?),
            "ParentId" if !value.is_empty() && !value.eq_ignore_ascii_case("null") => {
                req.parent_id = Some(parse_id::<MaterialId>(value, "parent")?);
            }
            "StorageLocator" if !value.is_empty() => req.storage_locator = Some(value.to_string()),
            _ => {}
        }
    }

    Ok(req)
}
