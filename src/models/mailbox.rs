// Copyright (c) 2025 TexasFortress.AI
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Credentials and token of the disposable mailbox currently in use.
///
/// `auth_token` is present exactly while the session is active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailboxSession {
    pub email_address: String,
    pub auth_token: Option<String>,
    pub account_id: Option<String>,
    pub password: String,
}

impl MailboxSession {
    pub fn is_active(&self) -> bool {
        self.auth_token.is_some()
    }
}

/// A mail domain offered by the provider. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Domain {
    pub name: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageBody {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
}

/// A received message. Inbox entries carry no body; `read_message` fills it in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailMessage {
    pub id: String,
    pub from_address: String,
    pub subject: String,
    pub preview: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<MessageBody>,
    pub created_at: DateTime<Utc>,
}
