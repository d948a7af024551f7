// Copyright (c) 2025 TexasFortress.AI
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Library core for tempmail.

// --- Modules ---
pub mod account_check;
pub mod api;
pub mod config;
pub mod error;
pub mod mailtm;
pub mod models;
pub mod session;

pub mod prelude {
    // Config
    pub use crate::config::Settings;

    // Errors
    pub use crate::error::{ErrorKind, UpstreamError, UpstreamResult};

    // Mailbox
    pub use crate::mailtm::{MailService, MailTmClient, ProxyMailClient};
    pub use crate::models::{Domain, MailMessage, MailboxSession};
    pub use crate::session::{
        AutoRefresh, FileSessionStore, ManagerOptions, MemorySessionStore, RefreshOutcome, SessionManager,
        SessionSnapshot, SessionState, SessionStore,
    };

    // Common Libs
    pub use log::{debug, error, info, trace, warn};
    pub use std::sync::Arc;
}
