// Copyright (c) 2025 TexasFortress.AI
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

// Turning raw provider responses into JSON values or typed errors.

use log::{debug, error};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{UpstreamError, UpstreamResult};

/// Parses a provider response body.
///
/// Non-JSON bodies become `MalformedResponse`. HTTP 401 becomes
/// `SessionInvalid`. Any other non-2xx status, or a body carrying a provider
/// `code`, becomes `Provider`.
pub fn decode_provider_body(operation: &str, status: u16, raw: &str) -> UpstreamResult<Value> {
    debug!("Raw provider response for '{}' (HTTP {}): {}", operation, status, raw);

    let body: Value = serde_json::from_str(raw).map_err(|_| {
        error!("Provider response for '{}' is not JSON: {}", operation, raw);
        UpstreamError::MalformedResponse {
            operation: operation.to_string(),
            raw: raw.to_string(),
        }
    })?;

    let code = body.get("code").filter(|c| !c.is_null()).map(code_to_string);
    let success = (200..300).contains(&status);

    if status == 401 {
        return Err(UpstreamError::SessionInvalid {
            operation: operation.to_string(),
            message: provider_message(&body).unwrap_or_else(|| "Unauthorized".to_string()),
            raw: Some(body),
        });
    }

    if !success || code.is_some() {
        error!(
            "Provider error for '{}': status {}, code {}, detail {:?}",
            operation,
            status,
            code.as_deref().unwrap_or("N/A"),
            provider_message(&body)
        );
        let message = provider_message(&body).unwrap_or_else(|| {
            format!(
                "Provider error: {} (code: {})",
                status,
                code.as_deref().unwrap_or("N/A")
            )
        });
        return Err(UpstreamError::Provider {
            operation: operation.to_string(),
            status,
            code,
            message,
            raw: Some(body),
        });
    }

    Ok(body)
}

/// Deserializes a successful body into a typed value.
pub fn decode_as<T: DeserializeOwned>(operation: &str, body: Value) -> UpstreamResult<T> {
    serde_json::from_value(body.clone()).map_err(|e| {
        error!("Unexpected provider payload for '{}': {}", operation, e);
        UpstreamError::MalformedResponse {
            operation: operation.to_string(),
            raw: body.to_string(),
        }
    })
}

fn provider_message(body: &Value) -> Option<String> {
    ["detail", "message", "hydra:description"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}

fn code_to_string(code: &Value) -> String {
    match code {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
