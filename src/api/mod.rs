// Copyright (c) 2025 TexasFortress.AI
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

pub mod check_account;
pub mod errors;
pub mod mailbox_proxy;
pub mod rest;
pub mod routes;
pub mod validation;

pub use rest::{run_server, AppState};
