// Copyright (c) 2025 TexasFortress.AI
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

// MailService implementation that goes through our own `/mailbox-proxy`.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde_json::Value;

use super::proxy::{MailboxAction, MailboxProxyRequest, ProxyErrorBody};
use super::response::decode_as;
use super::types::{Account, AuthToken, Collection, MessageDetail, MessageSummary, ProviderDomain};
use super::MailService;
use crate::error::{ErrorKind, UpstreamError, UpstreamResult};
use crate::models::Domain;

#[derive(Clone, Debug)]
pub struct ProxyMailClient {
    http_client: Client,
    proxy_url: String,
}

impl ProxyMailClient {
    pub fn new(proxy_url: impl Into<String>, timeout: Duration) -> UpstreamResult<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| UpstreamError::Network {
                operation: "build_client".to_string(),
                message: e.to_string(),
            })?;
        Ok(Self {
            http_client,
            proxy_url: proxy_url.into(),
        })
    }

    async fn post(&self, operation: &str, request: &MailboxProxyRequest) -> UpstreamResult<Value> {
        debug!("Posting '{}' to mailbox proxy {}", operation, self.proxy_url);
        let response = self
            .http_client
            .post(&self.proxy_url)
            .json(request)
            .send()
            .await
            .map_err(|e| UpstreamError::from_transport(operation, e))?;
        let status = response.status().as_u16();
        let raw = response
            .text()
            .await
            .map_err(|e| UpstreamError::from_transport(operation, e))?;

        let body: Value = serde_json::from_str(&raw).map_err(|_| UpstreamError::MalformedResponse {
            operation: operation.to_string(),
            raw: raw.clone(),
        })?;

        let is_error_envelope = body.get("status").and_then(Value::as_str) == Some("error");
        if (200..300).contains(&status) && !is_error_envelope {
            return Ok(body);
        }

        let envelope: ProxyErrorBody = serde_json::from_value(body.clone()).unwrap_or(ProxyErrorBody {
            status: "error".to_string(),
            kind: None,
            message: body
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            raw_response: Some(body),
        });
        let err = error_from_envelope(operation, status, envelope);
        error!("Mailbox proxy reported failure for '{}': {}", operation, err);
        Err(err)
    }
}

/// Rebuilds a typed error from the proxy's error envelope.
pub fn error_from_envelope(operation: &str, status: u16, envelope: ProxyErrorBody) -> UpstreamError {
    let operation = operation.to_string();
    let message = envelope.message;
    let raw = envelope.raw_response;
    let kind = envelope.kind.unwrap_or(if status == 401 {
        ErrorKind::SessionInvalid
    } else {
        ErrorKind::ProviderError
    });

    match kind {
        ErrorKind::Timeout => UpstreamError::Timeout { operation },
        ErrorKind::NetworkFailure => UpstreamError::Network { operation, message },
        ErrorKind::MalformedResponse => UpstreamError::MalformedResponse {
            operation,
            raw: match raw {
                Some(Value::String(s)) => s,
                Some(other) => other.to_string(),
                None => String::new(),
            },
        },
        ErrorKind::SessionInvalid => UpstreamError::SessionInvalid { operation, message, raw },
        ErrorKind::NoDomainsAvailable => UpstreamError::NoDomainsAvailable,
        ErrorKind::ValidationError => UpstreamError::Validation(message),
        ErrorKind::StorageFailure => UpstreamError::Storage(message),
        ErrorKind::ProviderError => UpstreamError::Provider {
            operation,
            status,
            code: raw
                .as_ref()
                .and_then(|r| r.get("code"))
                .map(|c| c.as_str().map(str::to_string).unwrap_or_else(|| c.to_string())),
            message,
            raw,
        },
    }
}

#[async_trait]
impl MailService for ProxyMailClient {
    async fn list_domains(&self) -> UpstreamResult<Vec<Domain>> {
        let body = self
            .post("get_domains", &MailboxProxyRequest::new(MailboxAction::GetDomains))
            .await?;
        let domains: Collection<ProviderDomain> = decode_as("get_domains", body)?;
        Ok(domains.into_items().into_iter().map(Domain::from).collect())
    }

    async fn create_account(&self, address: &str, password: &str) -> UpstreamResult<Account> {
        let request = MailboxProxyRequest::new(MailboxAction::CreateAccount).with_credentials(address, password);
        let body = self.post("create_account", &request).await?;
        decode_as("create_account", body)
    }

    async fn obtain_token(&self, address: &str, password: &str) -> UpstreamResult<AuthToken> {
        let request = MailboxProxyRequest::new(MailboxAction::GetToken).with_credentials(address, password);
        let body = self.post("get_token", &request).await?;
        decode_as("get_token", body)
    }

    async fn list_messages(&self, token: &str) -> UpstreamResult<Vec<MessageSummary>> {
        let request = MailboxProxyRequest::new(MailboxAction::GetMessages).with_token(token);
        let body = self.post("get_messages", &request).await?;
        let messages: Collection<MessageSummary> = decode_as("get_messages", body)?;
        Ok(messages.into_items())
    }

    async fn read_message(&self, token: &str, message_id: &str) -> UpstreamResult<MessageDetail> {
        let request = MailboxProxyRequest::new(MailboxAction::ReadMessage)
            .with_token(token)
            .with_message_id(message_id);
        let body = self.post("read_message", &request).await?;
        decode_as("read_message", body)
    }
}
