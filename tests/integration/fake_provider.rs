// Copyright (c) 2025 TexasFortress.AI
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! In-process stand-ins for the mail provider, the account-lookup service and
//! the tempmail proxy server, each bound to an ephemeral local port.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use serde::Deserialize;
use serde_json::{json, Value};

use tempmail::account_check::KedaiLookupClient;
use tempmail::api::routes::configure_routes;
use tempmail::api::AppState;
use tempmail::config::{AccountCheckConfig, Settings};
use tempmail::mailtm::MailTmClient;

pub const ACTIVE_DOMAIN: &str = "flow.test";

#[derive(Default)]
pub struct ProviderState {
    accounts: Mutex<HashMap<String, String>>,
    tokens: Mutex<HashMap<String, String>>,
    messages: Mutex<Vec<Value>>,
    pub reject_tokens: AtomicBool,
    pub no_active_domains: AtomicBool,
    pub message_list_calls: AtomicUsize,
}

impl ProviderState {
    /// Deliver a message; the newest message is listed first.
    pub fn deliver(&self, id: &str, subject: &str) {
        self.messages.lock().unwrap().insert(
            0,
            json!({
                "id": id,
                "from": { "address": "noreply@service.test", "name": "Service" },
                "subject": subject,
                "intro": format!("Preview of {subject}"),
                "text": format!("Body of {subject}"),
                "html": [format!("<p>Body of {subject}</p>")],
                "seen": false,
                "createdAt": "2025-05-01T12:00:00+00:00"
            }),
        );
    }

    pub fn account_count(&self) -> usize {
        self.accounts.lock().unwrap().len()
    }

    /// Register a token as valid, as if issued earlier.
    pub fn issue_token(&self, token: &str, address: &str) {
        self.tokens.lock().unwrap().insert(token.to_string(), address.to_string());
    }

    fn token_valid(&self, req: &HttpRequest) -> bool {
        if self.reject_tokens.load(Ordering::SeqCst) {
            return false;
        }
        req.headers()
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(|token| self.tokens.lock().unwrap().contains_key(token))
            .unwrap_or(false)
    }
}

#[derive(Deserialize)]
struct Credentials {
    address: String,
    password: String,
}

fn unauthorized() -> HttpResponse {
    HttpResponse::Unauthorized().json(json!({ "code": 401, "message": "Expired JWT Token" }))
}

async fn domains(state: web::Data<ProviderState>) -> HttpResponse {
    let active = !state.no_active_domains.load(Ordering::SeqCst);
    HttpResponse::Ok().json(json!({
        "hydra:member": [
            { "id": "d1", "domain": ACTIVE_DOMAIN, "isActive": active },
            { "id": "d2", "domain": "retired.test", "isActive": false }
        ],
        "hydra:totalItems": 2
    }))
}

async fn create_account(state: web::Data<ProviderState>, body: web::Json<Credentials>) -> HttpResponse {
    let mut accounts = state.accounts.lock().unwrap();
    if accounts.contains_key(&body.address) {
        return HttpResponse::UnprocessableEntity()
            .json(json!({ "hydra:description": "address: This value is already used." }));
    }
    accounts.insert(body.address.clone(), body.password.clone());
    HttpResponse::Created().json(json!({
        "id": format!("acc-{}", accounts.len()),
        "address": body.address,
    }))
}

async fn token(state: web::Data<ProviderState>, body: web::Json<Credentials>) -> HttpResponse {
    let known = state.accounts.lock().unwrap().get(&body.address) == Some(&body.password);
    if !known {
        return HttpResponse::Unauthorized().json(json!({ "code": 401, "message": "Invalid credentials." }));
    }
    let token = format!("tok-{}", body.address);
    state.issue_token(&token, &body.address);
    HttpResponse::Ok().json(json!({ "token": token, "id": "acc" }))
}

async fn messages(state: web::Data<ProviderState>, req: HttpRequest) -> HttpResponse {
    state.message_list_calls.fetch_add(1, Ordering::SeqCst);
    if !state.token_valid(&req) {
        return unauthorized();
    }
    let list = state.messages.lock().unwrap().clone();
    HttpResponse::Ok().json(json!({ "hydra:member": list, "hydra:totalItems": list.len() }))
}

async fn message(state: web::Data<ProviderState>, req: HttpRequest, path: web::Path<String>) -> HttpResponse {
    if !state.token_valid(&req) {
        return unauthorized();
    }
    let id = path.into_inner();
    let found = state.messages.lock().unwrap().iter().find(|m| m["id"] == id.as_str()).cloned();
    match found {
        Some(message) => HttpResponse::Ok().json(message),
        None => HttpResponse::NotFound().json(json!({ "detail": "Not Found" })),
    }
}

/// Starts the fake provider and returns its state and base URL.
pub fn start_provider() -> (Arc<ProviderState>, String) {
    let state = web::Data::new(ProviderState::default());
    let shared = state.clone().into_inner();
    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .route("/domains", web::get().to(domains))
            .route("/accounts", web::post().to(create_account))
            .route("/token", web::post().to(token))
            .route("/messages", web::get().to(messages))
            .route("/messages/{id}", web::get().to(message))
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .unwrap();
    let addr = server.addrs()[0];
    actix_rt::spawn(server.run());
    (shared, format!("http://{}", addr))
}

async fn validate_account(form: web::Form<HashMap<String, String>>) -> HttpResponse {
    match form.get("account_number").map(String::as_str) {
        Some("081200000000") => HttpResponse::Ok().json(json!({
            "status": "Gagal",
            "valid": false,
            "account_name": "Nomor tidak terdaftar"
        })),
        Some("081299999999") => HttpResponse::Ok().content_type("text/html").body("<html>Just a moment...</html>"),
        Some(number) => HttpResponse::Ok().json(json!({
            "status": "Berhasil",
            "valid": true,
            "account_name": "RINA WULANDARI",
            "bank": "OVO",
            "number": number
        })),
        None => HttpResponse::BadRequest().json(json!({ "status": "Error", "message": "missing number" })),
    }
}

/// Starts a fake account-lookup service and returns its endpoint URL.
pub fn start_lookup_service() -> String {
    let server = HttpServer::new(|| App::new().route("/validate_account", web::post().to(validate_account)))
        .workers(1)
        .bind(("127.0.0.1", 0))
        .unwrap();
    let addr = server.addrs()[0];
    actix_rt::spawn(server.run());
    format!("http://{}/validate_account", addr)
}

/// Starts the real tempmail HTTP routes against the given upstreams and
/// returns the server's base URL.
pub fn start_proxy(provider_url: &str, lookup_url: &str) -> String {
    let mut settings = Settings::default();
    settings.mailbox.base_url = provider_url.to_string();
    settings.mailbox.request_timeout_ms = 5_000;
    settings.account_check = AccountCheckConfig {
        endpoint: lookup_url.to_string(),
        request_timeout_ms: 5_000,
        ..AccountCheckConfig::default()
    };

    let state = web::Data::new(AppState {
        mail_gateway: Arc::new(MailTmClient::from_config(&settings.mailbox).unwrap()),
        account_lookup: Arc::new(KedaiLookupClient::new(&settings.account_check).unwrap()),
        settings: Arc::new(settings),
    });

    let server = HttpServer::new(move || App::new().app_data(state.clone()).configure(configure_routes))
        .workers(1)
        .bind(("127.0.0.1", 0))
        .unwrap();
    let addr = server.addrs()[0];
    actix_rt::spawn(server.run());
    format!("http://{}", addr)
}
