// Copyright (c) 2025 TexasFortress.AI
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Periodic inbox refresh.
//!
//! The timer is armed only while the manager reports `Active` with a usable
//! token, and disarmed on any other state. Ticks that land while a generation
//! or refresh is running are skipped by the manager's in-flight guard.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::manager::{RefreshOutcome, SessionManager, SessionState};

pub struct AutoRefresh {
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl AutoRefresh {
    /// Spawn the refresh loop on the current runtime.
    pub fn start(manager: Arc<SessionManager>, period: Duration) -> Self {
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run(manager, period, cancel.clone()));
        info!("Auto-refresh started with a period of {:?}", period);
        Self { cancel, handle: Some(handle) }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().map(|h| !h.is_finished()).unwrap_or(false)
    }

    /// Cancel the loop and wait for it to exit.
    pub async fn stop(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                warn!("Auto-refresh task ended abnormally: {}", e);
            }
        }
        info!("Auto-refresh stopped");
    }
}

impl Drop for AutoRefresh {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run(manager: Arc<SessionManager>, period: Duration, cancel: CancellationToken) {
    let mut states = manager.subscribe();

    loop {
        // Disarmed: wait until the session becomes active
        while *states.borrow_and_update() != SessionState::Active {
            tokio::select! {
                _ = cancel.cancelled() => return,
                changed = states.changed() => {
                    if changed.is_err() {
                        return;
                    }
                }
            }
        }

        debug!("Auto-refresh armed");
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => return,
                changed = states.changed() => {
                    if changed.is_err() {
                        return;
                    }
                    if *states.borrow_and_update() != SessionState::Active {
                        debug!("Auto-refresh disarmed");
                        break;
                    }
                }
                _ = ticker.tick() => {
                    if !manager.auto_refresh_eligible().await {
                        continue;
                    }
                    match manager.refresh_inbox().await {
                        RefreshOutcome::Refreshed { new_messages } if new_messages > 0 => {
                            info!("Auto-refresh picked up {} new message(s)", new_messages);
                        }
                        RefreshOutcome::Failed(kind) => {
                            warn!("Auto-refresh failed: {:?}", kind);
                        }
                        _ => {}
                    }
                }
            }
        }
    }
}
