// Copyright (c) 2025 TexasFortress.AI
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use async_trait::async_trait;
use log::debug;
#[cfg(test)]
use mockall::automock;
use reqwest::Client;
use serde_json::Value;

use crate::config::AccountCheckConfig;
use crate::error::{UpstreamError, UpstreamResult};

const OPERATION: &str = "validate_account";

/// Upstream account-holder lookup. Returns the parsed JSON body whatever the status.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait AccountLookup: Send + Sync {
    async fn lookup(&self, account_type_code: &str, account_number: &str) -> UpstreamResult<Value>;
}

#[derive(Clone, Debug)]
pub struct KedaiLookupClient {
    http_client: Client,
    endpoint: String,
    referer: String,
    user_agent: String,
}

impl KedaiLookupClient {
    pub fn new(config: &AccountCheckConfig) -> UpstreamResult<Self> {
        let http_client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| UpstreamError::Network {
                operation: "build_client".to_string(),
                message: e.to_string(),
            })?;
        Ok(Self {
            http_client,
            endpoint: config.endpoint.clone(),
            referer: config.referer.clone(),
            user_agent: config.user_agent.clone(),
        })
    }
}

#[async_trait]
impl AccountLookup for KedaiLookupClient {
    async fn lookup(&self, account_type_code: &str, account_number: &str) -> UpstreamResult<Value> {
        let form = [("account_type", account_type_code), ("account_number", account_number)];
        let response = self
            .http_client
            .post(&self.endpoint)
            .header("X-Requested-With", "XMLHttpRequest")
            .header(reqwest::header::REFERER, &self.referer)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .form(&form)
            .send()
            .await
            .map_err(|e| UpstreamError::from_transport(OPERATION, e))?;

        let status = response.status().as_u16();
        let raw = response
            .text()
            .await
            .map_err(|e| UpstreamError::from_transport(OPERATION, e))?;
        debug!("Account lookup for {} answered HTTP {}: {}", account_number, status, raw);

        serde_json::from_str(&raw).map_err(|_| UpstreamError::MalformedResponse {
            operation: OPERATION.to_string(),
            raw,
        })
    }
}
