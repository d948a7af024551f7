// Copyright (c) 2025 TexasFortress.AI
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Request validation for the HTTP endpoints.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::account_check::AccountCategory;
use crate::api::errors::ApiError;

lazy_static! {
    // Digits with optional leading '+' and ' '/'-' group separators
    static ref ACCOUNT_NUMBER_REGEX: Regex = Regex::new(r"^\+?[0-9][0-9 \-]*$").unwrap();
}

pub mod validators {
    use super::*;

    /// Validate a bank account or e-wallet phone number
    pub fn validate_account_number(number: &str) -> Result<(), ValidationError> {
        if !ACCOUNT_NUMBER_REGEX.is_match(number.trim()) {
            return Err(ValidationError::new("account_number_format"));
        }
        Ok(())
    }
}

/// Body of `POST /check-account`.
///
/// `number` is only checked for e-wallet lookups; bank requests are answered
/// whatever it holds.
#[derive(Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CheckAccountRequest {
    #[serde(alias = "kategori")]
    pub category: AccountCategory,
    #[serde(default, alias = "jenis_e_wallet")]
    pub wallet_type: Option<String>,
    #[serde(default, alias = "nomor")]
    #[validate(
        length(min = 1, max = 32),
        custom(function = "validators::validate_account_number")
    )]
    pub number: String,
}

/// Validate request payload using the Validate trait
pub fn validate_payload<T>(payload: T) -> Result<T, ApiError>
where
    T: Validate,
{
    match payload.validate() {
        Ok(_) => Ok(payload),
        Err(errors) => Err(errors.into()),
    }
}
