// Copyright (c) 2025 TexasFortress.AI
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::process::exit;

use clap::Parser;
use env_logger::Env;
use log::{error, info};

use tempmail::api::run_server;
use tempmail::config::{Settings, SettingsError};

#[derive(Parser, Debug)]
#[command(name = "tempmail-server", about = "Account-check and mailbox proxy HTTP server", version)]
struct Cli {
    /// Optional TOML configuration file
    #[arg(long, env = "TEMPMAIL_CONFIG")]
    config: Option<String>,

    /// Overrides `server.host`
    #[arg(long)]
    host: Option<String>,

    /// Overrides `server.port`
    #[arg(long)]
    port: Option<u16>,
}

fn load_settings(cli: &Cli) -> Result<Settings, SettingsError> {
    let mut settings = Settings::new(cli.config.as_deref())?;
    if let Some(host) = &cli.host {
        settings.server.host = host.clone();
    }
    if let Some(port) = cli.port {
        settings.server.port = port;
    }
    Ok(settings)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let settings = load_settings(&cli).unwrap_or_else(|err| {
        eprintln!("Failed to load configuration: {}", err);
        exit(1);
    });

    env_logger::Builder::from_env(Env::default().default_filter_or(settings.log.level.as_str())).init();
    info!(
        "tempmail-server {} using mail provider {}",
        env!("CARGO_PKG_VERSION"),
        settings.mailbox.base_url
    );

    match run_server(settings).await {
        Ok(()) => {
            info!("HTTP server finished.");
            Ok(())
        }
        Err(e) => {
            error!("HTTP server failed: {}", e);
            exit(1);
        }
    }
}
