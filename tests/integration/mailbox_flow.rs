// Copyright (c) 2025 TexasFortress.AI
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! End-to-end mailbox workflow: session manager -> proxy client ->
//! tempmail server -> fake provider.

#[cfg(test)]
mod mailbox_flow_tests {
    use std::sync::atomic::Ordering;
    use std::sync::Arc;
    use std::time::Duration;

    use tempfile::TempDir;
    use tempmail::error::ErrorKind;
    use tempmail::mailtm::{MailService, ProxyMailClient};
    use tempmail::session::{
        AutoRefresh, FileSessionStore, ManagerOptions, MemorySessionStore, RefreshOutcome, SessionKey,
        SessionManager, SessionState, SessionStore, StoredSession, ERROR_SENTINEL_EMAIL,
    };

    use crate::fake_provider::{start_lookup_service, start_provider, start_proxy, ProviderState, ACTIVE_DOMAIN};

    fn manager_through_proxy(store: Arc<dyn SessionStore>) -> (Arc<ProviderState>, Arc<SessionManager>) {
        let (provider, provider_url) = start_provider();
        let proxy_url = start_proxy(&provider_url, &start_lookup_service());
        let client: Arc<dyn MailService> = Arc::new(
            ProxyMailClient::new(format!("{}/mailbox-proxy", proxy_url), Duration::from_secs(5)).unwrap(),
        );
        let manager = Arc::new(SessionManager::new(
            client,
            store,
            ManagerOptions { settle_delay: Duration::ZERO },
        ));
        (provider, manager)
    }

    #[actix_web::test]
    async fn test_fresh_mailbox_receives_and_reads_messages() {
        let store = Arc::new(MemorySessionStore::new());
        let (provider, manager) = manager_through_proxy(store.clone());

        assert_eq!(manager.bootstrap().await, SessionState::Active);
        let email = manager.email().await.unwrap();
        assert!(email.ends_with(&format!("@{}", ACTIVE_DOMAIN)));
        assert_eq!(email, email.to_lowercase());
        assert_eq!(provider.account_count(), 1);

        let stored = store.load_session().await.unwrap().unwrap();
        assert_eq!(stored.email, email);
        assert_eq!(stored.token, format!("tok-{}", email));

        provider.deliver("m1", "Welcome");
        assert_eq!(manager.refresh_inbox().await, RefreshOutcome::Refreshed { new_messages: 1 });

        provider.deliver("m2", "Your code");
        assert_eq!(manager.refresh_inbox().await, RefreshOutcome::Refreshed { new_messages: 1 });
        assert_eq!(manager.refresh_inbox().await, RefreshOutcome::Refreshed { new_messages: 0 });

        let snapshot = manager.snapshot().await;
        let ids: Vec<&str> = snapshot.inbox.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["m2", "m1"]);
        assert_eq!(snapshot.status.as_deref(), Some("No new messages."));

        let message = manager.read_message("m2").await.unwrap();
        assert_eq!(message.subject, "Your code");
        let body = message.body.unwrap();
        assert_eq!(body.text, "Body of Your code");
        assert_eq!(body.html.as_deref(), Some("<p>Body of Your code</p>"));
    }

    #[actix_web::test]
    async fn test_expired_stored_session_is_replaced() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session.json");
        let store = Arc::new(FileSessionStore::new(&path));
        store
            .save_session(&StoredSession {
                email: "abc@x.com".into(),
                token: "tok1".into(),
                account_id: "id1".into(),
                password: "pw1".into(),
            })
            .await
            .unwrap();

        let (provider, manager) = manager_through_proxy(store.clone());
        assert_eq!(manager.bootstrap().await, SessionState::Active);

        let email = manager.email().await.unwrap();
        assert_ne!(email, "abc@x.com");
        assert!(email.ends_with(ACTIVE_DOMAIN));
        assert_eq!(provider.account_count(), 1);

        // A second handle on the file sees the replacement session
        let reopened = FileSessionStore::new(&path);
        let stored = reopened.load_session().await.unwrap().unwrap();
        assert_eq!(stored.email, email);
        assert_ne!(stored.token, "tok1");
    }

    #[actix_web::test]
    async fn test_valid_stored_session_is_resumed() {
        let store = Arc::new(MemorySessionStore::new());
        store
            .save_session(&StoredSession {
                email: "abc@x.com".into(),
                token: "tok1".into(),
                account_id: "id1".into(),
                password: "pw1".into(),
            })
            .await
            .unwrap();

        let (provider, manager) = manager_through_proxy(store.clone());
        provider.issue_token("tok1", "abc@x.com");
        provider.deliver("m1", "Hello");

        assert_eq!(manager.bootstrap().await, SessionState::Active);
        assert_eq!(manager.email().await.as_deref(), Some("abc@x.com"));
        assert_eq!(manager.snapshot().await.inbox.len(), 1);
        assert_eq!(provider.account_count(), 0);
    }

    #[actix_web::test]
    async fn test_token_revoked_mid_session() {
        let store = Arc::new(MemorySessionStore::new());
        let (provider, manager) = manager_through_proxy(store.clone());
        manager.bootstrap().await;

        provider.reject_tokens.store(true, Ordering::SeqCst);
        assert_eq!(
            manager.refresh_inbox().await,
            RefreshOutcome::Failed(ErrorKind::SessionInvalid)
        );
        assert!(matches!(
            manager.state(),
            SessionState::Failed { kind: ErrorKind::SessionInvalid, .. }
        ));
        for key in SessionKey::ALL {
            assert_eq!(store.get(key).await.unwrap(), None);
        }

        // Recovery is always possible through regeneration
        provider.reject_tokens.store(false, Ordering::SeqCst);
        let email = manager.generate_new_mailbox().await.unwrap();
        assert_eq!(manager.state(), SessionState::Active);
        assert_eq!(store.load_session().await.unwrap().unwrap().email, email);
    }

    #[actix_web::test]
    async fn test_no_active_domains() {
        let store = Arc::new(MemorySessionStore::new());
        let (provider, manager) = manager_through_proxy(store.clone());
        provider.no_active_domains.store(true, Ordering::SeqCst);

        let state = manager.bootstrap().await;
        assert!(matches!(state, SessionState::Failed { kind: ErrorKind::NoDomainsAvailable, .. }));
        assert_eq!(manager.email().await.as_deref(), Some(ERROR_SENTINEL_EMAIL));
        assert!(store.is_empty().await);
        assert_eq!(provider.account_count(), 0);
    }

    #[actix_web::test]
    async fn test_auto_refresh_picks_up_new_mail() {
        let store = Arc::new(MemorySessionStore::new());
        let (provider, manager) = manager_through_proxy(store);
        manager.bootstrap().await;

        let poller = AutoRefresh::start(manager.clone(), Duration::from_millis(50));
        provider.deliver("m1", "First");
        provider.deliver("m2", "Second");

        let mut inbox_len = 0;
        for _ in 0..40 {
            tokio::time::sleep(Duration::from_millis(50)).await;
            inbox_len = manager.snapshot().await.inbox.len();
            if inbox_len == 2 {
                break;
            }
        }
        poller.stop().await;

        assert_eq!(inbox_len, 2);
        assert!(provider.message_list_calls.load(Ordering::SeqCst) >= 2);
    }
}
