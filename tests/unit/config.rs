// Copyright (c) 2025 TexasFortress.AI
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

#[cfg(test)]
mod tests {
    use serial_test::serial;
    use std::env;
    use std::time::Duration;
    use tempfile::TempDir;
    use tempmail::config::{Settings, DEFAULT_MAILTM_BASE_URL};

    const ENV_VARS: &[&str] = &[
        "HOST",
        "PORT",
        "MAILTM_BASE_URL",
        "TEMPMAIL_SERVER__PORT",
        "TEMPMAIL_SERVER__ALLOWED_ORIGINS",
        "TEMPMAIL_MAILBOX__SETTLE_DELAY_MS",
        "TEMPMAIL_MAILBOX__PROXY_URL",
    ];

    fn clear_env() {
        for var in ENV_VARS {
            env::remove_var(var);
        }
    }

    // Helper to create a config file in a temp dir
    fn write_config(dir: &TempDir, content: &str) -> String {
        let path = dir.path().join("tempmail.toml");
        std::fs::write(&path, content).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();
        let settings = Settings::new(None).expect("Failed to load default settings");

        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.server.port, 3000);
        assert!(settings.server.allowed_origins.is_empty());
        assert_eq!(settings.log.level, "info");
        assert_eq!(settings.mailbox.base_url, DEFAULT_MAILTM_BASE_URL);
        assert_eq!(settings.mailbox.request_timeout(), Duration::from_millis(15_000));
        assert_eq!(settings.mailbox.settle_delay(), Duration::from_millis(2_000));
        assert_eq!(settings.mailbox.refresh_interval(), Duration::from_millis(10_000));
        assert_eq!(settings.mailbox.proxy_url, None);
        assert_eq!(settings.account_check.request_timeout(), Duration::from_millis(15_000));
    }

    #[test]
    #[serial]
    fn test_file_overrides_defaults() {
        clear_env();
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"
[server]
port = 8088
allowed_origins = ["https://mail.example"]

[log]
level = "debug"

[mailbox]
settle_delay_ms = 500
proxy_url = "http://127.0.0.1:8088/mailbox-proxy"
"#,
        );

        let settings = Settings::new(Some(&path)).expect("Failed to load settings from file");
        assert_eq!(settings.server.port, 8088);
        assert_eq!(settings.server.allowed_origins, vec!["https://mail.example".to_string()]);
        assert_eq!(settings.log.level, "debug");
        assert_eq!(settings.mailbox.settle_delay_ms, 500);
        assert_eq!(
            settings.mailbox.proxy_url.as_deref(),
            Some("http://127.0.0.1:8088/mailbox-proxy")
        );
        // Untouched keys keep their defaults
        assert_eq!(settings.mailbox.refresh_interval_ms, 10_000);
    }

    #[test]
    #[serial]
    fn test_environment_overrides_file() {
        clear_env();
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "[server]\nport = 8088\n");

        env::set_var("TEMPMAIL_SERVER__PORT", "9000");
        env::set_var("TEMPMAIL_MAILBOX__SETTLE_DELAY_MS", "0");
        env::set_var("TEMPMAIL_SERVER__ALLOWED_ORIGINS", "https://a.example,https://b.example");

        let settings = Settings::new(Some(&path)).expect("Failed to load settings");
        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.mailbox.settle_delay(), Duration::ZERO);
        assert_eq!(settings.server.allowed_origins.len(), 2);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_direct_variables_win() {
        clear_env();
        env::set_var("TEMPMAIL_SERVER__PORT", "9000");
        env::set_var("PORT", "7070");
        env::set_var("MAILTM_BASE_URL", "http://localhost:4010");

        let settings = Settings::new(None).expect("Failed to load settings");
        assert_eq!(settings.server.port, 7070);
        assert_eq!(settings.mailbox.base_url, "http://localhost:4010");
        assert_eq!(settings.bind_address(), "127.0.0.1:7070");

        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_port_is_ignored() {
        clear_env();
        env::set_var("PORT", "not-a-port");
        let settings = Settings::new(None).expect("Failed to load settings");
        assert_eq!(settings.server.port, 3000);
        clear_env();
    }
}
