// Copyright (c) 2025 TexasFortress.AI
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

// POST /mailbox-proxy: forwards one provider call and passes the answer through.

use actix_web::{http::StatusCode, web, HttpResponse};
use log::{error, info};

use crate::api::errors::ApiError;
use crate::api::rest::AppState;
use crate::error::UpstreamError;
use crate::mailtm::proxy::ProxyErrorBody;
use crate::mailtm::{MailboxAction, MailboxProxyRequest, ProviderCall};

fn required(value: Option<String>, field: &str) -> Result<String, ApiError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::MissingField { field: field.to_string() })
}

/// Turns a proxy request into a provider call, checking the per-action fields.
pub fn provider_call(request: MailboxProxyRequest) -> Result<ProviderCall, ApiError> {
    match request.action {
        MailboxAction::GetDomains => Ok(ProviderCall::Domains),
        MailboxAction::CreateAccount => Ok(ProviderCall::CreateAccount {
            address: required(request.email, "email")?,
            password: required(request.password, "password")?,
        }),
        MailboxAction::GetToken => Ok(ProviderCall::Token {
            address: required(request.email, "email")?,
            password: required(request.password, "password")?,
        }),
        MailboxAction::GetMessages => match request.token.filter(|t| !t.is_empty()) {
            Some(token) => Ok(ProviderCall::Messages { token }),
            None => Err(ApiError::Unauthorized {
                message: "Authorization token is missing.".to_string(),
            }),
        },
        MailboxAction::ReadMessage => Ok(ProviderCall::Message {
            token: required(request.token, "token")?,
            message_id: required(request.message_id, "messageId")?,
        }),
        MailboxAction::Unknown => Err(ApiError::BadRequest {
            message: "Invalid API action.".to_string(),
        }),
    }
}

/// Error envelope for a failed upstream call, sent with the upstream status.
pub fn upstream_error_response(err: &UpstreamError) -> HttpResponse {
    let status = StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    HttpResponse::build(status).json(ProxyErrorBody {
        status: "error".to_string(),
        kind: Some(err.kind()),
        message: err.user_message(),
        raw_response: err.raw_response(),
    })
}

pub async fn mailbox_proxy(
    state: web::Data<AppState>,
    payload: web::Json<MailboxProxyRequest>,
) -> Result<HttpResponse, ApiError> {
    let call = provider_call(payload.into_inner())?;
    let operation = call.operation();
    info!("Handling POST /mailbox-proxy action={}", operation);

    match state.mail_gateway.forward(call).await {
        Ok(response) => {
            let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::OK);
            Ok(HttpResponse::build(status).json(response.body))
        }
        Err(err) => {
            error!("Mailbox proxy action '{}' failed: {}", operation, err);
            Ok(upstream_error_response(&err))
        }
    }
}
