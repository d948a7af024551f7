// Copyright (c) 2025 TexasFortress.AI
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

pub mod manager;
pub mod poller;
pub mod store;

pub use manager::{
    merge_messages, ManagerOptions, RefreshOutcome, SessionError, SessionManager, SessionSnapshot, SessionState,
    ERROR_SENTINEL_EMAIL,
};
pub use poller::AutoRefresh;
pub use store::{FileSessionStore, MemorySessionStore, SessionKey, SessionStore, StoreError, StoredSession};
