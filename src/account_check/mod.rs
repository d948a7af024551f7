// Copyright (c) 2025 TexasFortress.AI
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Bank and e-wallet account-holder lookups.
//!
//! Bank lookups are not supported by the upstream service and always answer
//! with a maintenance placeholder. E-wallet lookups are forwarded through an
//! [`AccountLookup`] and the answer is normalized by [`classify_lookup`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod classify;
pub mod client;

pub use classify::{classify_lookup, LookupOutcome};
pub use client::{AccountLookup, KedaiLookupClient};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountCategory {
    #[serde(rename = "bank")]
    Bank,
    #[serde(rename = "e-wallet")]
    EWallet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LookupStatus {
    Berhasil,
    Gagal,
    Maintenance,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountCheckData {
    pub status: LookupStatus,
    #[serde(rename = "type")]
    pub account_type: String,
    pub owner_name: String,
    pub account_number: String,
}

/// Body of every `/check-account` answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountCheckResponse {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<AccountCheckData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<Value>,
}

impl AccountCheckResponse {
    pub fn success(data: AccountCheckData) -> Self {
        Self {
            status: "success".to_string(),
            message: None,
            data: Some(data),
            raw_response: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: Some(message.into()),
            data: None,
            raw_response: None,
        }
    }

    pub fn with_data(mut self, data: AccountCheckData) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_raw(mut self, raw: Value) -> Self {
        self.raw_response = Some(raw);
        self
    }
}

// Account-type codes expected by the lookup service
const WALLET_CODES: &[(&str, &str)] = &[
    ("DANA", "kPTh+rsIRDKKTeYWkaPh10QxQ2tiTFFLTml5eFRBME1NbmxqVjFFSWRkL0crVEhxSERWK3V0YTdNbzA9"),
    ("OVO", "sS/AWaTnhjm66U9P/vbjyUNhY2g3d3NxeXdLVk5ObVhTRElLRDdPUTNLYzB5ZTQycW13WFFxb2xNeUk9"),
    (
        "GOPAY",
        "KgtVgI/JN0VrPz+qhwyU3UlIa1hsWHhMM0RGbHY5dkQyb3NvT0pGdUFudVFUcnltdzJlSE1iQW1XY2FqY2F2Z2dleVBuU2JZdVgyaGNoODA=",
    ),
    ("SHOPEEPAY", "RRRj9w9nFnIvDwYu8vAcyHoxc2dMNnVaNkpLSGR3bE5pdkY2dytLQWJCZHlUdk90cUdiOUlKTGVNU2M9"),
    ("LINK AJA", "e/FsJuSdqID+MkmS4zCSNkU1dHJVc3hDQkgrVndnR3NNU1VVakJvVVk2TE9lbmZ4YS95WXZyWXZ4LzQ9"),
];

/// Lookup-service code for a wallet name, `None` for unsupported wallets.
pub fn wallet_code(wallet_type: &str) -> Option<&'static str> {
    WALLET_CODES
        .iter()
        .find(|(name, _)| *name == wallet_type)
        .map(|(_, code)| *code)
}

pub fn supported_wallets() -> impl Iterator<Item = &'static str> {
    WALLET_CODES.iter().map(|(name, _)| *name)
}

/// Answer for bank lookups, which the upstream service cannot serve yet.
pub fn bank_placeholder(number: &str) -> AccountCheckResponse {
    AccountCheckResponse::error("Pengecekan bank masih dalam proses pengembangan (Maintenance).").with_data(
        AccountCheckData {
            status: LookupStatus::Maintenance,
            account_type: "Bank".to_string(),
            owner_name: "Sedang dalam pengembangan".to_string(),
            account_number: number.to_string(),
        },
    )
}
