// Copyright (c) 2025 TexasFortress.AI
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Disposable mailbox session lifecycle.
//!
//! [`SessionManager`] owns the current [`MailboxSession`] and its inbox. It
//! bootstraps from the [`SessionStore`], provisions new mailboxes through a
//! [`MailService`], merges inbox refreshes and recovers from expired tokens.
//! Generation and refresh share one in-flight guard, so at most one of them
//! runs at a time whoever triggers it.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info, warn};
use rand::distributions::Alphanumeric;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::{watch, Mutex};

use crate::config::MailboxConfig;
use crate::error::{ErrorKind, UpstreamError, UpstreamResult};
use crate::mailtm::MailService;
use crate::models::{Domain, MailMessage, MailboxSession};
use crate::session::store::{SessionStore, StoredSession};

/// Address shown while no usable mailbox exists after a failure.
pub const ERROR_SENTINEL_EMAIL: &str = "error@email.com";

const LOCAL_PART_LEN: usize = 10;
const PASSWORD_LEN: usize = 13;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionState {
    Uninitialized,
    Bootstrapping,
    Active,
    Generating,
    Failed { kind: ErrorKind, reason: String },
}

/// Errors surfaced to the presentation layer. Upstream errors arrive here
/// already classified.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Another mailbox operation is still in progress")]
    Busy,
    #[error("No active mailbox session")]
    NoActiveSession,
    #[error("{message}")]
    Failed { kind: ErrorKind, message: String },
}

impl SessionError {
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            SessionError::Failed { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Refreshed { new_messages: usize },
    /// Nothing was attempted: no token, sentinel address, or another operation in flight.
    Skipped,
    Failed(ErrorKind),
}

impl RefreshOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RefreshOutcome::Refreshed { .. })
    }
}

#[derive(Debug, Clone)]
pub struct ManagerOptions {
    /// Wait between account creation and token request.
    pub settle_delay: Duration,
}

impl Default for ManagerOptions {
    fn default() -> Self {
        Self { settle_delay: Duration::from_millis(2000) }
    }
}

impl From<&MailboxConfig> for ManagerOptions {
    fn from(config: &MailboxConfig) -> Self {
        Self { settle_delay: config.settle_delay() }
    }
}

/// Read-only view handed to the presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub email: Option<String>,
    pub inbox: Vec<MailMessage>,
    pub status: Option<String>,
    pub busy: bool,
}

#[derive(Debug, Default)]
struct Inner {
    session: Option<MailboxSession>,
    inbox: Vec<MailMessage>,
    status: Option<String>,
    // Bumped whenever the session identity changes; stale refresh results are dropped
    epoch: u64,
}

/// Clears the in-flight flag when dropped.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct SessionManager {
    service: Arc<dyn MailService>,
    store: Arc<dyn SessionStore>,
    options: ManagerOptions,
    inner: Mutex<Inner>,
    in_flight: AtomicBool,
    state_tx: watch::Sender<SessionState>,
}

impl SessionManager {
    pub fn new(service: Arc<dyn MailService>, store: Arc<dyn SessionStore>, options: ManagerOptions) -> Self {
        let (state_tx, _) = watch::channel(SessionState::Uninitialized);
        Self {
            service,
            store,
            options,
            inner: Mutex::new(Inner::default()),
            in_flight: AtomicBool::new(false),
            state_tx,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state_tx.borrow().clone()
    }

    /// Subscribe to state transitions.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// The address to display: the live one, or the sentinel after a failed generation.
    pub async fn email(&self) -> Option<String> {
        let inner = self.inner.lock().await;
        self.display_email(&inner)
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let inner = self.inner.lock().await;
        SessionSnapshot {
            state: self.state(),
            email: self.display_email(&inner),
            inbox: inner.inbox.clone(),
            status: inner.status.clone(),
            busy: self.is_busy(),
        }
    }

    /// Whether the periodic refresh should fire right now.
    pub async fn auto_refresh_eligible(&self) -> bool {
        if self.state() != SessionState::Active {
            return false;
        }
        let inner = self.inner.lock().await;
        Self::has_live_token(&inner)
    }

    /// Resume the stored session or provision a new mailbox. Runs once at startup.
    pub async fn bootstrap(&self) -> SessionState {
        let Some(_guard) = self.try_begin() else {
            warn!("bootstrap called while another mailbox operation is in flight");
            return self.state();
        };

        self.set_state(SessionState::Bootstrapping);
        self.set_status("Loading the stored mailbox or creating a new one...").await;

        match self.store.load_session().await {
            Ok(Some(stored)) => {
                info!("Resuming stored mailbox session for {}", stored.email);
                {
                    let mut inner = self.inner.lock().await;
                    inner.session = Some(MailboxSession::from(stored));
                    inner.inbox.clear();
                    inner.epoch += 1;
                    inner.status = Some("Resuming the existing mailbox...".to_string());
                }
                self.set_state(SessionState::Active);

                if let RefreshOutcome::Failed(ErrorKind::SessionInvalid) = self.refresh_locked().await {
                    info!("Stored mailbox session was rejected by the provider, generating a new one");
                    let _ = self.generate_locked().await;
                }
            }
            Ok(None) => {
                info!("No stored mailbox session, generating a new one");
                let _ = self.generate_locked().await;
            }
            Err(e) => {
                error!("Failed to read stored mailbox session: {}", e);
                self.fail("bootstrap", UpstreamError::from(e)).await;
            }
        }

        self.state()
    }

    /// Throw away the current mailbox and provision a new one.
    ///
    /// Ends with either a complete session (memory and store) or nothing at all.
    pub async fn generate_new_mailbox(&self) -> Result<String, SessionError> {
        let Some(_guard) = self.try_begin() else {
            debug!("generate_new_mailbox skipped: operation in flight");
            return Err(SessionError::Busy);
        };
        self.generate_locked().await
    }

    /// Fetch the inbox and merge unseen messages ahead of the known ones.
    pub async fn refresh_inbox(&self) -> RefreshOutcome {
        {
            let inner = self.inner.lock().await;
            if !Self::has_live_token(&inner) {
                return RefreshOutcome::Skipped;
            }
        }
        let Some(_guard) = self.try_begin() else {
            debug!("refresh_inbox skipped: operation in flight");
            return RefreshOutcome::Skipped;
        };
        self.refresh_locked().await
    }

    /// Load the full content of one message.
    pub async fn read_message(&self, message_id: &str) -> Result<MailMessage, SessionError> {
        let (token, epoch) = {
            let inner = self.inner.lock().await;
            match inner.session.as_ref().and_then(|s| s.auth_token.clone()) {
                Some(token) => (token, inner.epoch),
                None => return Err(SessionError::NoActiveSession),
            }
        };

        self.set_status("Loading message...").await;
        match self.service.read_message(&token, message_id).await {
            Ok(detail) => {
                let message = MailMessage::from(detail);
                self.set_status(format!(
                    "Message from {} with subject \"{}\" loaded.",
                    if message.from_address.is_empty() { "unknown sender" } else { message.from_address.as_str() },
                    if message.subject.is_empty() { "(no subject)" } else { message.subject.as_str() },
                ))
                .await;
                Ok(message)
            }
            Err(err) => {
                warn!("read_message({}) failed: {}", message_id, err);
                let kind = err.kind();
                let message = err.user_message();
                if kind == ErrorKind::SessionInvalid {
                    self.invalidate(epoch, &message).await;
                } else {
                    self.set_status(format!("Failed to read message: {}", message)).await;
                }
                Err(SessionError::Failed { kind, message })
            }
        }
    }

    // --- internals; callers of the *_locked methods hold the in-flight guard ---

    fn try_begin(&self) -> Option<InFlight<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| InFlight(&self.in_flight))
    }

    fn set_state(&self, next: SessionState) {
        self.state_tx.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                debug!("Mailbox session state: {:?} -> {:?}", current, next);
                *current = next;
                true
            }
        });
    }

    async fn set_status(&self, status: impl Into<String>) {
        self.inner.lock().await.status = Some(status.into());
    }

    fn display_email(&self, inner: &Inner) -> Option<String> {
        match (&inner.session, self.state()) {
            (Some(session), _) => Some(session.email_address.clone()),
            (None, SessionState::Failed { .. }) => Some(ERROR_SENTINEL_EMAIL.to_string()),
            (None, _) => None,
        }
    }

    fn has_live_token(inner: &Inner) -> bool {
        inner
            .session
            .as_ref()
            .map(|s| s.is_active() && s.email_address != ERROR_SENTINEL_EMAIL)
            .unwrap_or(false)
    }

    async fn generate_locked(&self) -> Result<String, SessionError> {
        self.set_state(SessionState::Generating);
        {
            let mut inner = self.inner.lock().await;
            inner.session = None;
            inner.inbox.clear();
            inner.epoch += 1;
            inner.status = Some("Looking up domains and creating a new address...".to_string());
        }
        if let Err(e) = self.store.clear_all().await {
            return Err(self.fail("generate_new_mailbox", UpstreamError::from(e)).await);
        }

        match self.provision().await {
            Ok(session) => {
                let email = session.email_address.clone();
                {
                    let mut inner = self.inner.lock().await;
                    inner.session = Some(session);
                    inner.status = Some("New address created and ready to use!".to_string());
                }
                self.set_state(SessionState::Active);
                info!("Mailbox {} is ready", email);
                Ok(email)
            }
            Err(err) => Err(self.fail("generate_new_mailbox", err).await),
        }
    }

    async fn provision(&self) -> UpstreamResult<MailboxSession> {
        let domains = self.service.list_domains().await?;
        let domain = pick_active_domain(&domains).ok_or(UpstreamError::NoDomainsAvailable)?;

        let address = format!("{}@{}", random_token(LOCAL_PART_LEN), domain.name).to_lowercase();
        let password = random_token(PASSWORD_LEN);

        self.set_status(format!("Creating account ({})...", address)).await;
        let account = self.service.create_account(&address, &password).await?;
        debug!("Created provider account {} for {}", account.id, address);

        // Fixed wait for provider-side propagation; not a retry
        if !self.options.settle_delay.is_zero() {
            tokio::time::sleep(self.options.settle_delay).await;
        }

        self.set_status("Obtaining authentication token...").await;
        let token = self.service.obtain_token(&address, &password).await?;

        let stored = StoredSession {
            email: address,
            token: token.token,
            account_id: account.id,
            password,
        };
        self.store.save_session(&stored).await?;
        Ok(MailboxSession::from(stored))
    }

    async fn refresh_locked(&self) -> RefreshOutcome {
        let (token, epoch) = {
            let inner = self.inner.lock().await;
            match inner.session.as_ref().and_then(|s| s.auth_token.clone()) {
                Some(token) if Self::has_live_token(&inner) => (token, inner.epoch),
                _ => return RefreshOutcome::Skipped,
            }
        };

        debug!("Refreshing inbox");
        match self.service.list_messages(&token).await {
            Ok(batch) => {
                let mut inner = self.inner.lock().await;
                if inner.epoch != epoch {
                    debug!("Discarding inbox refresh for a mailbox that is no longer current");
                    return RefreshOutcome::Skipped;
                }
                let added = merge_messages(&mut inner.inbox, batch.into_iter().map(MailMessage::from).collect());
                inner.status = Some(if added > 0 {
                    format!("Loaded {} new message(s).", added)
                } else {
                    "No new messages.".to_string()
                });
                RefreshOutcome::Refreshed { new_messages: added }
            }
            Err(err) => {
                warn!("Inbox refresh failed: {}", err);
                let kind = err.kind();
                let message = err.user_message();
                if kind == ErrorKind::SessionInvalid {
                    self.invalidate(epoch, &message).await;
                } else {
                    self.set_status(format!("Failed to refresh inbox: {}", message)).await;
                }
                RefreshOutcome::Failed(kind)
            }
        }
    }

    /// Destroy a session the provider no longer accepts, memory and store.
    async fn invalidate(&self, epoch: u64, message: &str) {
        {
            let mut inner = self.inner.lock().await;
            if inner.epoch != epoch {
                return;
            }
            inner.session = None;
            inner.inbox.clear();
            inner.epoch += 1;
            inner.status = Some(message.to_string());
        }
        if let Err(e) = self.store.clear_all().await {
            warn!("Failed to clear stored mailbox session: {}", e);
        }
        self.set_state(SessionState::Failed {
            kind: ErrorKind::SessionInvalid,
            reason: message.to_string(),
        });
    }

    /// Clear every session field, memory and store, and enter `Failed`.
    async fn fail(&self, operation: &str, err: UpstreamError) -> SessionError {
        error!("{} failed: {}", operation, err);
        let kind = err.kind();
        let message = err.user_message();
        {
            let mut inner = self.inner.lock().await;
            inner.session = None;
            inner.inbox.clear();
            inner.epoch += 1;
            inner.status = Some(format!("Failed to create a new address: {}", message));
        }
        if let Err(e) = self.store.clear_all().await {
            warn!("Failed to clear stored mailbox session: {}", e);
        }
        self.set_state(SessionState::Failed {
            kind,
            reason: message.clone(),
        });
        SessionError::Failed { kind, message }
    }
}

/// Puts unseen messages ahead of the known ones, keeping the batch order.
///
/// The provider lists newest first, so the newest arrival ends up on top. Ids
/// already in `inbox`, or repeated within the batch, are skipped. Returns the
/// number of messages added.
pub fn merge_messages(inbox: &mut Vec<MailMessage>, fetched: Vec<MailMessage>) -> usize {
    let mut known: HashSet<String> = inbox.iter().map(|m| m.id.clone()).collect();
    let fresh: Vec<MailMessage> = fetched
        .into_iter()
        .filter(|m| known.insert(m.id.clone()))
        .collect();
    let added = fresh.len();
    inbox.splice(0..0, fresh);
    added
}

fn pick_active_domain(domains: &[Domain]) -> Option<&Domain> {
    let active: Vec<&Domain> = domains.iter().filter(|d| d.active).collect();
    active.choose(&mut rand::thread_rng()).copied()
}

fn random_token(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(|b| (b as char).to_ascii_lowercase())
        .collect()
}
