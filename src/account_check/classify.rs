// Copyright (c) 2025 TexasFortress.AI
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Interpretation of the lookup service's answer.
//!
//! The service has no documented contract. This is a best-effort heuristic
//! built from observed answers: `status`, `valid`, `account_name`, `msg`,
//! `message` and `bank` fields. Keep all of the guessing in this file.

use log::error;
use serde_json::Value;

use super::{AccountCheckData, AccountCheckResponse, LookupStatus};

const NAME_NOT_FOUND: &str = "nama tidak ditemukan";
const NUMBER_NOT_REGISTERED: &str = "nomor tidak terdaftar";

/// HTTP status and body to send back for one lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupOutcome {
    pub http_status: u16,
    pub body: AccountCheckResponse,
}

fn str_field<'a>(raw: &'a Value, field: &str) -> Option<&'a str> {
    raw.get(field).and_then(Value::as_str)
}

pub fn classify_lookup(raw: Value, wallet_type: &str, number: &str) -> LookupOutcome {
    let provider_status = str_field(&raw, "status");
    let is_valid = raw.get("valid").and_then(Value::as_bool).unwrap_or(false);
    let account_name = str_field(&raw, "account_name").filter(|name| !name.is_empty());
    let account_type = str_field(&raw, "bank").unwrap_or(wallet_type).to_string();
    let lowered = account_name.map(str::to_lowercase);

    let data = |status: LookupStatus, account_type: String, owner_name: String| AccountCheckData {
        status,
        account_type,
        owner_name,
        account_number: number.to_string(),
    };

    if let Some(name) = account_name {
        let lowered = name.to_lowercase();
        if lowered != NAME_NOT_FOUND && lowered != NUMBER_NOT_REGISTERED {
            return LookupOutcome {
                http_status: 200,
                body: AccountCheckResponse::success(data(LookupStatus::Berhasil, account_type, name.to_string())),
            };
        }
    }

    let name_is_null = raw.get("account_name").map(Value::is_null).unwrap_or(false);
    if provider_status == Some("Gagal") || !is_valid || name_is_null || lowered.is_some() {
        let message = match lowered.as_deref() {
            Some(name) if name.contains("tidak terdaftar") => "Ewallet tidak terdaftar.",
            Some(name) if name.contains("tidak ditemukan") => "Ewallet tidak ditemukan.",
            _ => "Ewallet tidak tersedia",
        };
        return LookupOutcome {
            http_status: 200,
            body: AccountCheckResponse::error(message)
                .with_data(data(LookupStatus::Gagal, account_type, message.to_string())),
        };
    }

    if provider_status == Some("Error") {
        let provider_message = str_field(&raw, "message").map(str::to_string);
        let body = AccountCheckResponse::error(
            provider_message
                .clone()
                .unwrap_or_else(|| "Terjadi kesalahan pada API eksternal (rate limit/internal error).".to_string()),
        )
        .with_data(data(
            LookupStatus::Gagal,
            wallet_type.to_string(),
            provider_message.unwrap_or_else(|| "Error API (tidak dikenal)".to_string()),
        ))
        .with_raw(raw);
        return LookupOutcome { http_status: 200, body };
    }

    error!("Unexpected account lookup answer for {} {}: {}", wallet_type, number, raw);
    LookupOutcome {
        http_status: 500,
        body: AccountCheckResponse::error("Format respons API eksternal tidak terduga atau API berubah.")
            .with_data(data(
                LookupStatus::Gagal,
                wallet_type.to_string(),
                "Respons tidak valid/berubah".to_string(),
            ))
            .with_raw(raw),
    }
}
