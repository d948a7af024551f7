// Copyright (c) 2025 TexasFortress.AI
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{http::header, middleware::Logger, web::Data, App, HttpServer};
use log::info;

use crate::account_check::{AccountLookup, KedaiLookupClient};
use crate::api::routes::configure_routes;
use crate::config::Settings;
use crate::error::UpstreamResult;
use crate::mailtm::{MailTmClient, ProviderGateway};

/// Shared state for the HTTP handlers
pub struct AppState {
    pub settings: Arc<Settings>,
    pub mail_gateway: Arc<dyn ProviderGateway>,
    pub account_lookup: Arc<dyn AccountLookup>,
}

impl AppState {
    /// Builds the real upstream clients from configuration.
    pub fn from_settings(settings: Settings) -> UpstreamResult<Self> {
        let mail_gateway = MailTmClient::from_config(&settings.mailbox)?;
        let account_lookup = KedaiLookupClient::new(&settings.account_check)?;
        Ok(Self {
            settings: Arc::new(settings),
            mail_gateway: Arc::new(mail_gateway),
            account_lookup: Arc::new(account_lookup),
        })
    }
}

/// CORS policy: the configured origins, or any origin when none are configured.
pub fn build_cors(allowed_origins: &[String]) -> Cors {
    if allowed_origins.is_empty() {
        return Cors::permissive();
    }

    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "OPTIONS"])
        .allowed_headers(vec![header::CONTENT_TYPE, header::ACCEPT, header::ORIGIN])
        .max_age(3600);

    for origin in allowed_origins {
        cors = cors.allowed_origin(origin);
    }

    cors
}

pub async fn run_server(settings: Settings) -> std::io::Result<()> {
    let bind_address = settings.bind_address();
    let allowed_origins = settings.server.allowed_origins.clone();

    let app_state = Data::new(
        AppState::from_settings(settings)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?,
    );
    info!("Starting HTTP server at {}", bind_address);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(build_cors(&allowed_origins))
            .app_data(app_state.clone())
            .configure(configure_routes)
    })
    .bind(bind_address)?
    .run()
    .await
}
