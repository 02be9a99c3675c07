use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// The ten-code error taxonomy of the IIIF Image API surface.
///
/// Every failure mode in the request parser, the source layer, the cache
/// layer and the transformation pipeline maps to exactly one of these
/// variants. Response bodies are always the IIIF error envelope, never a
/// partial image.
#[derive(Error, Debug)]
pub enum IiifError {
    #[error("canonicalisation changed the path")]
    InvalidPath,
    #[error("url-decode failed: {0}")]
    InvalidEncoding(String),
    #[error("request does not match the IIIF grammar: {0}")]
    InvalidRequest(String),
    #[error("region bounds exceed the image: {0}")]
    InvalidRegion(String),
    #[error("computed size is invalid: {0}")]
    SizeInvalid(String),
    #[error("output pixel count exceeds the configured maximum")]
    SizeTooLarge,
    #[error("rotation angle is not one of 0/90/180/270")]
    RotationUnsupported,
    #[error("identifier not found: {0}")]
    NotFound(String),
    #[error("upstream store error: {0}")]
    UpstreamError(String),
    #[error("internal server error: {0}")]
    InternalServerError(String),
}

impl IiifError {
    pub fn code(&self) -> &'static str {
        match self {
            IiifError::InvalidPath => "InvalidPath",
            IiifError::InvalidEncoding(_) => "InvalidEncoding",
            IiifError::InvalidRequest(_) => "InvalidRequest",
            IiifError::InvalidRegion(_) => "InvalidRegion",
            IiifError::SizeInvalid(_) => "SizeInvalid",
            IiifError::SizeTooLarge => "SizeTooLarge",
            IiifError::RotationUnsupported => "RotationUnsupported",
            IiifError::NotFound(_) => "NotFound",
            IiifError::UpstreamError(_) => "UpstreamError",
            IiifError::InternalServerError(_) => "InternalServerError",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            IiifError::InvalidPath
            | IiifError::InvalidEncoding(_)
            | IiifError::InvalidRequest(_)
            | IiifError::InvalidRegion(_)
            | IiifError::SizeInvalid(_)
            | IiifError::SizeTooLarge
            | IiifError::RotationUnsupported => StatusCode::BAD_REQUEST,
            IiifError::NotFound(_) => StatusCode::NOT_FOUND,
            IiifError::UpstreamError(_) | IiifError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorDetail {
    code: &'static str,
    message: String,
}

#[derive(Serialize)]
struct ErrorEnvelope {
    #[serde(rename = "@context")]
    context: &'static str,
    #[serde(rename = "type")]
    kind: &'static str,
    error: ErrorDetail,
}

pub type Result<T> = std::result::Result<T, IiifError>;

impl IntoResponse for IiifError {
    fn into_response(self) -> Response {
        tracing::warn!(code = self.code(), "request rejected: {}", self);
        let body = ErrorEnvelope {
            context: "http://iiif.io/api/image/3/context.json",
            kind: "error",
            error: ErrorDetail {
                code: self.code(),
                message: self.to_string(),
            },
        };
        (self.status(), Json(body)).into_response()
    }
}
