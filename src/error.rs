// Copyright (c) 2025 TexasFortress.AI
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Typed failures for calls to upstream services (mail provider, account lookup).
//!
//! The [`ErrorKind`] of an [`UpstreamError`] is fixed at the point the failure is
//! detected. Callers branch on the kind, never on the message text.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::session::store::StoreError;

/// Result type for upstream calls
pub type UpstreamResult<T> = Result<T, UpstreamError>;

/// Classification of every failure the mailbox workflow can run into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Timeout,
    NetworkFailure,
    MalformedResponse,
    ProviderError,
    SessionInvalid,
    NoDomainsAvailable,
    ValidationError,
    StorageFailure,
}

#[derive(Debug, Error, Clone)]
pub enum UpstreamError {
    #[error("{operation}: request timed out")]
    Timeout { operation: String },

    #[error("{operation}: network failure: {message}")]
    Network { operation: String, message: String },

    #[error("{operation}: response was not valid JSON")]
    MalformedResponse { operation: String, raw: String },

    #[error("{operation}: provider error (HTTP {status}): {message}")]
    Provider {
        operation: String,
        status: u16,
        code: Option<String>,
        message: String,
        raw: Option<Value>,
    },

    #[error("{operation}: session is no longer valid: {message}")]
    SessionInvalid {
        operation: String,
        message: String,
        raw: Option<Value>,
    },

    #[error("no active domains available")]
    NoDomainsAvailable,

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("session store failure: {0}")]
    Storage(String),
}

impl UpstreamError {
    /// Maps a reqwest transport error, keeping timeouts apart from other network errors.
    pub fn from_transport(operation: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            UpstreamError::Timeout { operation: operation.to_string() }
        } else {
            UpstreamError::Network {
                operation: operation.to_string(),
                message: err.to_string(),
            }
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            UpstreamError::Timeout { .. } => ErrorKind::Timeout,
            UpstreamError::Network { .. } => ErrorKind::NetworkFailure,
            UpstreamError::MalformedResponse { .. } => ErrorKind::MalformedResponse,
            UpstreamError::Provider { .. } => ErrorKind::ProviderError,
            UpstreamError::SessionInvalid { .. } => ErrorKind::SessionInvalid,
            UpstreamError::NoDomainsAvailable => ErrorKind::NoDomainsAvailable,
            UpstreamError::Validation(_) => ErrorKind::ValidationError,
            UpstreamError::Storage(_) => ErrorKind::StorageFailure,
        }
    }

    /// HTTP status a proxy should answer with when forwarding this failure.
    pub fn http_status(&self) -> u16 {
        match self {
            UpstreamError::Provider { status, .. } => *status,
            UpstreamError::SessionInvalid { .. } => 401,
            UpstreamError::Validation(_) => 400,
            _ => 500,
        }
    }

    /// Upstream body kept for diagnostics, if any.
    pub fn raw_response(&self) -> Option<Value> {
        match self {
            UpstreamError::MalformedResponse { raw, .. } => Some(Value::String(raw.clone())),
            UpstreamError::Provider { raw, .. } | UpstreamError::SessionInvalid { raw, .. } => raw.clone(),
            _ => None,
        }
    }

    /// Short message suitable for showing to the person using the mailbox.
    pub fn user_message(&self) -> String {
        match self {
            UpstreamError::Timeout { .. } => {
                "The request took too long. Please try again.".to_string()
            }
            UpstreamError::Network { .. } => {
                "The remote service could not be reached.".to_string()
            }
            UpstreamError::MalformedResponse { .. } => {
                "The remote service returned an unexpected (non-JSON) response, it may be blocking requests.".to_string()
            }
            UpstreamError::Provider { status: 429, .. } => {
                "Too many requests (rate limit). Try again in a moment.".to_string()
            }
            UpstreamError::Provider { message, .. } => message.clone(),
            UpstreamError::SessionInvalid { .. } => {
                "Session is no longer valid, the account may have expired. Generate a new address.".to_string()
            }
            UpstreamError::NoDomainsAvailable => {
                "No active domains are available from the mail provider.".to_string()
            }
            UpstreamError::Validation(message) => message.clone(),
            UpstreamError::Storage(_) => "The session could not be saved locally.".to_string(),
        }
    }
}

impl From<StoreError> for UpstreamError {
    fn from(err: StoreError) -> Self {
        UpstreamError::Storage(err.to_string())
    }
}
