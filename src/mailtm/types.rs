// Copyright (c) 2025 TexasFortress.AI
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

// Wire types of the mail.tm compatible provider API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Domain, MailMessage, MessageBody};

/// Collection responses come either as JSON-LD (`hydra:member`) or as a plain
/// array, depending on the `Accept` header the provider honours.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Collection<T> {
    Hydra {
        #[serde(rename = "hydra:member", alias = "member")]
        member: Vec<T>,
    },
    Plain(Vec<T>),
}

impl<T> Collection<T> {
    pub fn into_items(self) -> Vec<T> {
        match self {
            Collection::Hydra { member } => member,
            Collection::Plain(items) => items,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderDomain {
    #[serde(default)]
    pub id: String,
    pub domain: String,
    #[serde(default)]
    pub is_active: bool,
}

impl From<ProviderDomain> for Domain {
    fn from(d: ProviderDomain) -> Self {
        Domain { name: d.domain, active: d.is_active }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthToken {
    pub token: String,
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MessageAddress {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageSummary {
    pub id: String,
    #[serde(default)]
    pub from: MessageAddress,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub intro: String,
    #[serde(default)]
    pub seen: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDetail {
    pub id: String,
    #[serde(default)]
    pub from: MessageAddress,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub intro: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub html: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl From<MessageSummary> for MailMessage {
    fn from(m: MessageSummary) -> Self {
        MailMessage {
            id: m.id,
            from_address: m.from.address,
            subject: m.subject,
            preview: m.intro,
            body: None,
            created_at: m.created_at,
        }
    }
}

impl From<MessageDetail> for MailMessage {
    fn from(m: MessageDetail) -> Self {
        let html = if m.html.is_empty() { None } else { Some(m.html.concat()) };
        MailMessage {
            id: m.id,
            from_address: m.from.address,
            subject: m.subject,
            preview: m.intro,
            body: Some(MessageBody { text: m.text, html }),
            created_at: m.created_at,
        }
    }
}
