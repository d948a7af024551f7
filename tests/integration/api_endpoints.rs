// Copyright (c) 2025 TexasFortress.AI
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! HTTP-level checks of the two proxy endpoints over a real socket.

#[cfg(test)]
mod api_endpoint_tests {
    use reqwest::{Client, StatusCode};
    use serde_json::{json, Value};

    use crate::fake_provider::{start_lookup_service, start_provider, start_proxy};

    fn start() -> String {
        let (_provider, provider_url) = start_provider();
        start_proxy(&provider_url, &start_lookup_service())
    }

    #[actix_web::test]
    async fn test_only_post_is_allowed() {
        let base = start();
        let client = Client::new();

        for path in ["/check-account", "/mailbox-proxy"] {
            let resp = client.get(format!("{}{}", base, path)).send().await.unwrap();
            assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
            assert_eq!(resp.headers().get("allow").unwrap(), "POST");
            assert_eq!(resp.text().await.unwrap(), "Method GET Not Allowed");

            let resp = client.patch(format!("{}{}", base, path)).send().await.unwrap();
            assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        }
    }

    #[actix_web::test]
    async fn test_check_account_bank_and_wallets() {
        let base = start();
        let client = Client::new();
        let url = format!("{}/check-account", base);

        let body: Value = client
            .post(&url)
            .json(&json!({ "category": "bank", "number": "1234567890" }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["data"]["status"], "Maintenance");

        let resp = client
            .post(&url)
            .json(&json!({ "category": "e-wallet", "walletType": "OVO", "number": "081234567890" }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["status"], "success");
        assert_eq!(body["data"]["ownerName"], "RINA WULANDARI");
        assert_eq!(body["data"]["type"], "OVO");
        assert_eq!(body["data"]["accountNumber"], "081234567890");

        let body: Value = client
            .post(&url)
            .json(&json!({ "category": "e-wallet", "walletType": "DANA", "number": "081200000000" }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["status"], "error");
        assert_eq!(body["data"]["status"], "Gagal");
        assert_eq!(body["message"], "Ewallet tidak terdaftar.");

        let resp = client
            .post(&url)
            .json(&json!({ "category": "e-wallet", "walletType": "DANA", "number": "081299999999" }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["rawResponse"], "<html>Just a moment...</html>");

        let resp = client
            .post(&url)
            .json(&json!({ "category": "e-wallet", "walletType": "UNKNOWN", "number": "0812" }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_mailbox_proxy_forwards_upstream_answers() {
        let base = start();
        let client = Client::new();
        let url = format!("{}/mailbox-proxy", base);

        let resp = client.post(&url).json(&json!({ "action": "get_domains" })).send().await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["hydra:member"].as_array().unwrap().len(), 2);

        let credentials = json!({ "action": "create_account", "email": "probe@flow.test", "password": "secret123" });
        let resp = client.post(&url).json(&credentials).send().await.unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);

        // Same address again: upstream 422 comes back with the error envelope
        let resp = client.post(&url).json(&credentials).send().await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["status"], "error");
        assert_eq!(body["kind"], "provider_error");
        assert_eq!(body["message"], "address: This value is already used.");

        let resp = client
            .post(&url)
            .json(&json!({ "action": "get_messages", "token": "forged" }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["kind"], "session_invalid");
        assert_eq!(body["rawResponse"]["message"], "Expired JWT Token");

        let resp = client
            .post(&url)
            .json(&json!({ "action": "read_message", "token": "forged" }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = client
            .post(&url)
            .header("Content-Type", "application/json")
            .body("{ not json")
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
