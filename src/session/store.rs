// Copyright (c) 2025 TexasFortress.AI
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::{debug, info, warn};
use serde_json::Value;
use thiserror::Error;
use tokio::fs as async_fs;
use tokio::sync::{Mutex, RwLock};

use crate::models::MailboxSession;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// The four persisted session fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionKey {
    Email,
    Token,
    AccountId,
    Password,
}

impl SessionKey {
    pub const ALL: [SessionKey; 4] = [
        SessionKey::Email,
        SessionKey::Token,
        SessionKey::AccountId,
        SessionKey::Password,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionKey::Email => "mailbox.email",
            SessionKey::Token => "mailbox.token",
            SessionKey::AccountId => "mailbox.accountId",
            SessionKey::Password => "mailbox.password",
        }
    }
}

/// Durable copy of an active session. Only complete sessions are persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSession {
    pub email: String,
    pub token: String,
    pub account_id: String,
    pub password: String,
}

impl StoredSession {
    fn value(&self, key: SessionKey) -> &str {
        match key {
            SessionKey::Email => &self.email,
            SessionKey::Token => &self.token,
            SessionKey::AccountId => &self.account_id,
            SessionKey::Password => &self.password,
        }
    }
}

impl From<StoredSession> for MailboxSession {
    fn from(s: StoredSession) -> Self {
        MailboxSession {
            email_address: s.email.to_lowercase(),
            auth_token: Some(s.token),
            account_id: Some(s.account_id),
            password: s.password,
        }
    }
}

/// Key-value persistence for the mailbox session.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, key: SessionKey) -> Result<Option<String>, StoreError>;

    async fn set(&self, key: SessionKey, value: &str) -> Result<(), StoreError>;

    async fn remove(&self, key: SessionKey) -> Result<(), StoreError>;

    /// Removes all four session keys in one step.
    async fn clear_all(&self) -> Result<(), StoreError>;

    /// Writes all four session keys in one step.
    async fn save_session(&self, session: &StoredSession) -> Result<(), StoreError>;

    /// Returns the stored session only when every field is present and non-empty.
    async fn load_session(&self) -> Result<Option<StoredSession>, StoreError> {
        let email = self.get(SessionKey::Email).await?;
        let token = self.get(SessionKey::Token).await?;
        let account_id = self.get(SessionKey::AccountId).await?;
        let password = self.get(SessionKey::Password).await?;

        match (email, token, account_id, password) {
            (Some(email), Some(token), Some(account_id), Some(password))
                if ![&email, &token, &account_id, &password].iter().any(|v| v.is_empty()) =>
            {
                Ok(Some(StoredSession { email, token, account_id, password }))
            }
            _ => Ok(None),
        }
    }
}

/// In-memory store, for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    values: RwLock<HashMap<SessionKey, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.values.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.values.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, key: SessionKey) -> Result<Option<String>, StoreError> {
        Ok(self.values.read().await.get(&key).cloned())
    }

    async fn set(&self, key: SessionKey, value: &str) -> Result<(), StoreError> {
        self.values.write().await.insert(key, value.to_string());
        Ok(())
    }

    async fn remove(&self, key: SessionKey) -> Result<(), StoreError> {
        self.values.write().await.remove(&key);
        Ok(())
    }

    async fn clear_all(&self) -> Result<(), StoreError> {
        let mut values = self.values.write().await;
        for key in SessionKey::ALL {
            values.remove(&key);
        }
        Ok(())
    }

    async fn save_session(&self, session: &StoredSession) -> Result<(), StoreError> {
        let mut values = self.values.write().await;
        for key in SessionKey::ALL {
            values.insert(key, session.value(key).to_string());
        }
        Ok(())
    }
}

/// JSON file store. Keys it does not own are preserved on every write.
pub struct FileSessionStore {
    path: PathBuf,
    // Serializes read-modify-write cycles on the file
    lock: Mutex<()>,
}

impl FileSessionStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_map(&self) -> Result<BTreeMap<String, String>, StoreError> {
        if !async_fs::try_exists(&self.path).await? {
            return Ok(BTreeMap::new());
        }
        let contents = async_fs::read_to_string(&self.path).await?;
        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(parse_map(&self.path, &contents))
    }

    /// Atomic write: temp file, restrictive permissions, rename.
    async fn write_map(&self, map: &BTreeMap<String, String>) -> Result<(), StoreError> {
        debug!("Saving mailbox session to: {:?}", self.path);

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                async_fs::create_dir_all(parent).await?;
            }
        }

        let json = serde_json::to_string_pretty(map)?;
        let temp_path = self.path.with_extension("tmp");
        async_fs::write(&temp_path, json).await?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut permissions = async_fs::metadata(&temp_path).await?.permissions();
            permissions.set_mode(0o600);
            async_fs::set_permissions(&temp_path, permissions).await?;
        }

        async_fs::rename(&temp_path, &self.path).await?;
        Ok(())
    }

    async fn update<F>(&self, apply: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut BTreeMap<String, String>) + Send,
    {
        let _guard = self.lock.lock().await;
        let mut map = self.read_map().await?;
        apply(&mut map);
        self.write_map(&map).await
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn get(&self, key: SessionKey) -> Result<Option<String>, StoreError> {
        let _guard = self.lock.lock().await;
        Ok(self.read_map().await?.remove(key.as_str()))
    }

    async fn set(&self, key: SessionKey, value: &str) -> Result<(), StoreError> {
        let value = value.to_string();
        self.update(move |map| {
            map.insert(key.as_str().to_string(), value);
        })
        .await
    }

    async fn remove(&self, key: SessionKey) -> Result<(), StoreError> {
        self.update(move |map| {
            map.remove(key.as_str());
        })
        .await
    }

    async fn clear_all(&self) -> Result<(), StoreError> {
        self.update(|map| {
            for key in SessionKey::ALL {
                map.remove(key.as_str());
            }
        })
        .await
    }

    async fn save_session(&self, session: &StoredSession) -> Result<(), StoreError> {
        let values = session.clone();
        self.update(move |map| {
            for key in SessionKey::ALL {
                map.insert(key.as_str().to_string(), values.value(key).to_string());
            }
        })
        .await?;
        info!("Persisted mailbox session for {}", session.email);
        Ok(())
    }
}

/// Keeps the string entries of a JSON object. Anything unreadable counts as
/// empty so the next write replaces it.
fn parse_map(path: &Path, contents: &str) -> BTreeMap<String, String> {
    match serde_json::from_str::<Value>(contents) {
        Ok(Value::Object(entries)) => entries
            .into_iter()
            .filter_map(|(key, value)| match value {
                Value::String(s) => Some((key, s)),
                other => {
                    warn!("Ignoring non-string entry '{}' in {:?}: {}", key, path, other);
                    None
                }
            })
            .collect(),
        Ok(other) => {
            warn!("Session file {:?} is not a JSON object ({}), treating it as empty", path, other);
            BTreeMap::new()
        }
        Err(e) => {
            warn!("Session file {:?} is unreadable ({}), treating it as empty", path, e);
            BTreeMap::new()
        }
    }
}
