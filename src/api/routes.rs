// Copyright (c) 2025 TexasFortress.AI
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use actix_web::{http::header, web, HttpRequest, HttpResponse};
use serde_json::json;

use crate::api::check_account::check_account;
use crate::api::errors::json_config;
use crate::api::mailbox_proxy::mailbox_proxy;

/// Both proxy endpoints accept POST only.
pub async fn method_not_allowed(req: HttpRequest) -> HttpResponse {
    HttpResponse::MethodNotAllowed()
        .insert_header((header::ALLOW, "POST"))
        .body(format!("Method {} Not Allowed", req.method()))
}

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config());

    cfg.service(
        web::resource("/check-account")
            .route(web::post().to(check_account))
            .default_service(web::to(method_not_allowed)),
    );

    cfg.service(
        web::resource("/mailbox-proxy")
            .route(web::post().to(mailbox_proxy))
            .default_service(web::to(method_not_allowed)),
    );

    cfg.service(web::resource("/health").route(web::get().to(health)));
}
