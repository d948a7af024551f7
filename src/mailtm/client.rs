// Copyright (c) 2025 TexasFortress.AI
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

// src/mailtm/client.rs

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};
#[cfg(test)]
use mockall::automock;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use super::response::{decode_as, decode_provider_body};
use super::types::{Account, AuthToken, Collection, MessageDetail, MessageSummary, ProviderDomain};
use super::MailService;
use crate::config::MailboxConfig;
use crate::error::{UpstreamError, UpstreamResult};
use crate::models::Domain;

/// One provider request, owned so it can be built from a proxied request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCall {
    Domains,
    CreateAccount { address: String, password: String },
    Token { address: String, password: String },
    Messages { token: String },
    Message { token: String, message_id: String },
}

impl ProviderCall {
    /// Action name used in logs and in the proxy protocol.
    pub fn operation(&self) -> &'static str {
        match self {
            ProviderCall::Domains => "get_domains",
            ProviderCall::CreateAccount { .. } => "create_account",
            ProviderCall::Token { .. } => "get_token",
            ProviderCall::Messages { .. } => "get_messages",
            ProviderCall::Message { .. } => "read_message",
        }
    }
}

/// Successful provider answer: upstream status and JSON body, untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderResponse {
    pub status: u16,
    pub body: Value,
}

/// Raw pass-through access to the provider, used by the proxy endpoint.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ProviderGateway: Send + Sync {
    async fn forward(&self, call: ProviderCall) -> UpstreamResult<ProviderResponse>;
}

#[derive(Serialize)]
struct Credentials<'a> {
    address: &'a str,
    password: &'a str,
}

/// Direct HTTP client for a mail.tm compatible provider.
#[derive(Clone, Debug)]
pub struct MailTmClient {
    http_client: Client,
    base_url: String,
}

impl MailTmClient {
    /// Every request is bounded by `timeout`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> UpstreamResult<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| UpstreamError::Network {
                operation: "build_client".to_string(),
                message: e.to_string(),
            })?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        info!("Mail provider client targeting {} (timeout {:?})", base_url, timeout);
        Ok(Self { http_client, base_url })
    }

    pub fn from_config(config: &MailboxConfig) -> UpstreamResult<Self> {
        Self::new(config.base_url.clone(), config.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, call: &ProviderCall) -> UpstreamResult<ProviderResponse> {
        let operation = call.operation();
        let request = match call {
            ProviderCall::Domains => self.http_client.get(self.url("/domains")),
            ProviderCall::CreateAccount { address, password } => self
                .http_client
                .post(self.url("/accounts"))
                .json(&Credentials { address, password }),
            ProviderCall::Token { address, password } => self
                .http_client
                .post(self.url("/token"))
                .json(&Credentials { address, password }),
            ProviderCall::Messages { token } => {
                self.http_client.get(self.url("/messages")).bearer_auth(token)
            }
            ProviderCall::Message { token, message_id } => self
                .http_client
                .get(self.url(&format!("/messages/{}", urlencoding::encode(message_id))))
                .bearer_auth(token),
        };

        debug!("Sending '{}' to mail provider", operation);
        let response = request
            .send()
            .await
            .map_err(|e| UpstreamError::from_transport(operation, e))?;
        let status = response.status().as_u16();
        let raw = response
            .text()
            .await
            .map_err(|e| UpstreamError::from_transport(operation, e))?;

        let body = decode_provider_body(operation, status, &raw)?;
        Ok(ProviderResponse { status, body })
    }
}

#[async_trait]
impl ProviderGateway for MailTmClient {
    async fn forward(&self, call: ProviderCall) -> UpstreamResult<ProviderResponse> {
        self.send(&call).await
    }
}

#[async_trait]
impl MailService for MailTmClient {
    async fn list_domains(&self) -> UpstreamResult<Vec<Domain>> {
        let call = ProviderCall::Domains;
        let response = self.send(&call).await?;
        let domains: Collection<ProviderDomain> = decode_as(call.operation(), response.body)?;
        Ok(domains.into_items().into_iter().map(Domain::from).collect())
    }

    async fn create_account(&self, address: &str, password: &str) -> UpstreamResult<Account> {
        let call = ProviderCall::CreateAccount {
            address: address.to_string(),
            password: password.to_string(),
        };
        let response = self.send(&call).await?;
        decode_as(call.operation(), response.body)
    }

    async fn obtain_token(&self, address: &str, password: &str) -> UpstreamResult<AuthToken> {
        let call = ProviderCall::Token {
            address: address.to_string(),
            password: password.to_string(),
        };
        let response = self.send(&call).await?;
        decode_as(call.operation(), response.body)
    }

    async fn list_messages(&self, token: &str) -> UpstreamResult<Vec<MessageSummary>> {
        let call = ProviderCall::Messages { token: token.to_string() };
        let response = self.send(&call).await?;
        let messages: Collection<MessageSummary> = decode_as(call.operation(), response.body)?;
        Ok(messages.into_items())
    }

    async fn read_message(&self, token: &str, message_id: &str) -> UpstreamResult<MessageDetail> {
        let call = ProviderCall::Message {
            token: token.to_string(),
            message_id: message_id.to_string(),
        };
        let response = self.send(&call).await?;
        decode_as(call.operation(), response.body)
    }
}
