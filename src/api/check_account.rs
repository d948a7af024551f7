// Copyright (c) 2025 TexasFortress.AI
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

// POST /check-account

use actix_web::{http::StatusCode, web, HttpResponse};
use log::{error, info};

use crate::account_check::{bank_placeholder, classify_lookup, wallet_code, AccountCategory, AccountCheckResponse};
use crate::api::errors::ApiError;
use crate::api::rest::AppState;
use crate::api::validation::{validate_payload, CheckAccountRequest};
use crate::error::UpstreamError;

fn upstream_failure(err: &UpstreamError) -> HttpResponse {
    let message = match err {
        UpstreamError::MalformedResponse { .. } => {
            "Respon dari API eksternal bukan JSON. Kemungkinan diblokir atau ada error HTML.".to_string()
        }
        UpstreamError::Timeout { .. } => {
            "Permintaan ke API eksternal melebihi batas waktu (timeout).".to_string()
        }
        other => format!("Kesalahan server internal: {}", other.user_message()),
    };
    let mut body = AccountCheckResponse::error(message);
    if let Some(raw) = err.raw_response() {
        body = body.with_raw(raw);
    }
    HttpResponse::InternalServerError().json(body)
}

pub async fn check_account(
    state: web::Data<AppState>,
    payload: web::Json<CheckAccountRequest>,
) -> Result<HttpResponse, ApiError> {
    let request = payload.into_inner();

    match request.category {
        AccountCategory::Bank => {
            let number = request.number.trim();
            info!("Bank lookup requested for {:?}, answering with maintenance placeholder", number);
            Ok(HttpResponse::Ok().json(bank_placeholder(number)))
        }
        AccountCategory::EWallet => {
            let request = validate_payload(request)?;
            let number = request.number.trim().to_string();
            let wallet_type = request.wallet_type.unwrap_or_default();
            let Some(code) = wallet_code(&wallet_type) else {
                error!("E-wallet code not found for: {}", wallet_type);
                return Err(ApiError::InvalidFieldValue {
                    field: "walletType".to_string(),
                    reason: "Jenis E-wallet tidak valid atau kode tidak ditemukan.".to_string(),
                });
            };

            info!("Looking up {} account {}", wallet_type, number);
            match state.account_lookup.lookup(code, &number).await {
                Ok(raw) => {
                    let outcome = classify_lookup(raw, &wallet_type, &number);
                    let status =
                        StatusCode::from_u16(outcome.http_status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                    Ok(HttpResponse::build(status).json(outcome.body))
                }
                Err(err) => {
                    error!("Account lookup for {} {} failed: {}", wallet_type, number, err);
                    Ok(upstream_failure(&err))
                }
            }
        }
    }
}
