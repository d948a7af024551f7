// Copyright (c) 2025 TexasFortress.AI
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Client side of the disposable-mail provider.
//!
//! [`MailService`] is the seam the session manager talks to. It has two
//! implementations: [`MailTmClient`] calls the provider directly, and
//! [`ProxyMailClient`] goes through this crate's own `/mailbox-proxy` endpoint.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::error::UpstreamResult;
use crate::models::Domain;

pub mod client;
pub mod proxy;
pub mod proxy_client;
pub mod response;
pub mod types;

pub use client::{MailTmClient, ProviderCall, ProviderGateway, ProviderResponse};
pub use proxy::{MailboxAction, MailboxProxyRequest};
pub use proxy_client::ProxyMailClient;
pub use types::{Account, AuthToken, MessageDetail, MessageSummary};

/// The logical operations of the mail provider.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait MailService: Send + Sync {
    /// All domains the provider knows about, active or not.
    async fn list_domains(&self) -> UpstreamResult<Vec<Domain>>;

    async fn create_account(&self, address: &str, password: &str) -> UpstreamResult<Account>;

    async fn obtain_token(&self, address: &str, password: &str) -> UpstreamResult<AuthToken>;

    /// Inbox listing, newest first as returned by the provider.
    async fn list_messages(&self, token: &str) -> UpstreamResult<Vec<MessageSummary>>;

    async fn read_message(&self, token: &str, message_id: &str) -> UpstreamResult<MessageDetail>;
}
