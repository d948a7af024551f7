// Copyright (c) 2025 TexasFortress.AI
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::env;
use std::time::Duration;

use config::{Environment, File};
use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_MAILTM_BASE_URL: &str = "https://api.mail.tm";
pub const DEFAULT_ACCOUNT_CHECK_ENDPOINT: &str = "https://kedaimutasi.com/cekrekening/home/validate_account";
pub const DEFAULT_ACCOUNT_CHECK_REFERER: &str = "https://wisnucekrekening.xyz/";
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Empty means any origin is accepted.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailboxConfig {
    pub base_url: String,
    pub request_timeout_ms: u64,
    /// Wait between account creation and token request
    pub settle_delay_ms: u64,
    pub refresh_interval_ms: u64,
    pub store_path: String,
    /// When set, the CLI talks to this `/mailbox-proxy` URL instead of the provider.
    #[serde(default)]
    pub proxy_url: Option<String>,
}

impl MailboxConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountCheckConfig {
    pub endpoint: String,
    pub referer: String,
    pub user_agent: String,
    pub request_timeout_ms: u64,
}

impl AccountCheckConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub log: LogConfig,
    pub mailbox: MailboxConfig,
    pub account_check: AccountCheckConfig,
}

impl Settings {
    pub fn new(config_path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut config_builder = config::Config::builder()
            // Server defaults
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.allowed_origins", Vec::<String>::new())?

            // Log defaults
            .set_default("log.level", "info")?

            // Mailbox defaults
            .set_default("mailbox.base_url", DEFAULT_MAILTM_BASE_URL)?
            .set_default("mailbox.request_timeout_ms", 15_000)?
            .set_default("mailbox.settle_delay_ms", 2_000)?
            .set_default("mailbox.refresh_interval_ms", 10_000)?
            .set_default("mailbox.store_path", default_store_path())?

            // Account check defaults
            .set_default("account_check.endpoint", DEFAULT_ACCOUNT_CHECK_ENDPOINT)?
            .set_default("account_check.referer", DEFAULT_ACCOUNT_CHECK_REFERER)?
            .set_default("account_check.user_agent", DEFAULT_USER_AGENT)?
            .set_default("account_check.request_timeout_ms", 15_000)?;

        if let Some(path) = config_path {
            config_builder = config_builder.add_source(File::with_name(path));
        }

        // e.g. `TEMPMAIL_MAILBOX__SETTLE_DELAY_MS=0` overrides `mailbox.settle_delay_ms`
        config_builder = config_builder.add_source(
            Environment::with_prefix("TEMPMAIL")
                .prefix_separator("_")
                .separator("__")
                .ignore_empty(true)
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("server.allowed_origins"),
        );

        // Direct environment variables for the settings most often changed at deploy time
        let env_vars = [
            ("HOST", "server.host"),
            ("PORT", "server.port"),
            ("MAILTM_BASE_URL", "mailbox.base_url"),
        ];

        for (env_var, config_path) in &env_vars {
            if let Ok(value) = env::var(env_var) {
                if *env_var == "PORT" {
                    if let Ok(port) = value.parse::<u16>() {
                        config_builder = config_builder.set_override(config_path, port)?;
                    } else {
                        warn!("Invalid port value in {}: {}", env_var, value);
                    }
                } else {
                    config_builder = config_builder.set_override(config_path, value)?;
                }
            }
        }

        config_builder.build()?.try_deserialize()
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn default_store_path() -> String {
    ".tempmail/session.json".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            allowed_origins: Vec::new(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig { level: "info".to_string() }
    }
}

impl Default for MailboxConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_MAILTM_BASE_URL.to_string(),
            request_timeout_ms: 15_000,
            settle_delay_ms: 2_000,
            refresh_interval_ms: 10_000,
            store_path: default_store_path(),
            proxy_url: None,
        }
    }
}

impl Default for AccountCheckConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ACCOUNT_CHECK_ENDPOINT.to_string(),
            referer: DEFAULT_ACCOUNT_CHECK_REFERER.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout_ms: 15_000,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            log: LogConfig::default(),
            mailbox: MailboxConfig::default(),
            account_check: AccountCheckConfig::default(),
        }
    }
}

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to load or parse configuration: {0}")]
    LoadError(#[from] config::ConfigError),
}
