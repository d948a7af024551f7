// Copyright (c) 2025 TexasFortress.AI
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error handling for the HTTP endpoints
//!
//! Request-level failures (bad JSON, failed validation, missing fields) are
//! reported through [`ApiError`]. Upstream failures are not: the handlers
//! forward those in their own envelopes so the caller sees the upstream status.

use actix_web::{
    error::{JsonPayloadError, ResponseError},
    http::StatusCode,
    web::JsonConfig,
    HttpRequest, HttpResponse,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Standardized error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Always `"error"`, matching the success envelopes' `status` field
    pub status: String,
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationError>>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Field-specific validation error
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationError {
    /// Field name that failed validation
    pub field: String,
    pub message: String,
    /// Validation constraint that failed (e.g., "length", "account_number_format")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constraint: Option<String>,
}

#[derive(Debug, Error)]
pub enum ApiError {
    // === 400 ===
    #[error("Invalid request: {message}")]
    BadRequest { message: String },

    #[error("Validation failed: {message}")]
    ValidationFailed {
        message: String,
        errors: Vec<ValidationError>,
    },

    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("{reason}")]
    InvalidFieldValue { field: String, reason: String },

    // === 401 ===
    #[error("{message}")]
    Unauthorized { message: String },

    // === 500 ===
    #[error("Internal server error: {message}")]
    InternalError { message: String },
}

impl ApiError {
    /// Get the error code for programmatic handling
    pub fn code(&self) -> String {
        match self {
            ApiError::BadRequest { .. } => "BAD_REQUEST".to_string(),
            ApiError::ValidationFailed { .. } => "VALIDATION_FAILED".to_string(),
            ApiError::MissingField { .. } => "MISSING_FIELD".to_string(),
            ApiError::InvalidFieldValue { .. } => "INVALID_FIELD_VALUE".to_string(),
            ApiError::Unauthorized { .. } => "AUTH_REQUIRED".to_string(),
            ApiError::InternalError { .. } => "INTERNAL_ERROR".to_string(),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest { .. }
            | ApiError::ValidationFailed { .. }
            | ApiError::MissingField { .. }
            | ApiError::InvalidFieldValue { .. } => StatusCode::BAD_REQUEST,

            ApiError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,

            ApiError::InternalError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        match status.as_u16() {
            400..=499 => log::warn!("Client error: {} ({})", self, status),
            500..=599 => log::error!("Server error: {} ({})", self, status),
            _ => log::info!("API response: {} ({})", self, status),
        }

        let details = match self {
            ApiError::ValidationFailed { errors, .. } => Some(errors.to_vec()),
            _ => None,
        };

        HttpResponse::build(status).json(ErrorResponse {
            status: "error".to_string(),
            code: self.code(),
            message: self.to_string(),
            details,
            timestamp: chrono::Utc::now(),
        })
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let validation_errors: Vec<ValidationError> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, field_errors)| {
                field_errors.iter().map(|e| ValidationError {
                    field: field.to_string(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string()),
                    constraint: Some(e.code.to_string()),
                })
            })
            .collect();

        ApiError::ValidationFailed {
            message: "Request validation failed".to_string(),
            errors: validation_errors,
        }
    }
}

/// JSON extractor config that reports unreadable bodies as [`ApiError::BadRequest`].
pub fn json_config() -> JsonConfig {
    JsonConfig::default()
        .limit(64 * 1024)
        .error_handler(|err: JsonPayloadError, _req: &HttpRequest| {
            ApiError::BadRequest { message: err.to_string() }.into()
        })
}
