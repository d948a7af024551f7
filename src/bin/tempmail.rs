// Copyright (c) 2025 TexasFortress.AI
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Terminal front end for the disposable mailbox.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Configuration error or failed operation

use std::collections::HashSet;
use std::process::exit;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use log::{debug, error, info};

use tempmail::account_check::{
    bank_placeholder, classify_lookup, supported_wallets, wallet_code, AccountCheckResponse, AccountLookup,
    KedaiLookupClient,
};
use tempmail::config::Settings;
use tempmail::error::UpstreamResult;
use tempmail::mailtm::{MailService, MailTmClient, ProxyMailClient};
use tempmail::models::MailMessage;
use tempmail::session::{
    AutoRefresh, FileSessionStore, ManagerOptions, SessionManager, SessionSnapshot, SessionState,
};

#[derive(Parser)]
#[command(name = "tempmail", about = "Disposable mailbox in the terminal", version)]
struct Cli {
    /// Optional TOML configuration file
    #[arg(long, env = "TEMPMAIL_CONFIG")]
    config: Option<String>,

    /// Go through a tempmail-server `/mailbox-proxy` endpoint instead of the provider
    #[arg(long, env = "TEMPMAIL_PROXY_URL")]
    proxy_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the address and print new messages as they arrive (Ctrl-C to quit)
    Watch,
    /// Discard the current mailbox and create a new one
    New,
    /// Refresh and list the inbox
    Inbox,
    /// Print one message in full
    Read { id: String },
    /// Print the current address
    Address,
    /// Look up the holder of a bank or e-wallet account
    CheckAccount {
        #[arg(value_enum)]
        category: CategoryArg,
        number: String,
        /// E-wallet name, e.g. DANA or "LINK AJA"
        #[arg(long)]
        wallet: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum CategoryArg {
    Bank,
    #[value(name = "e-wallet")]
    EWallet,
}

fn build_service(settings: &Settings) -> UpstreamResult<Arc<dyn MailService>> {
    match &settings.mailbox.proxy_url {
        Some(url) => {
            info!("Using mailbox proxy at {}", url);
            Ok(Arc::new(ProxyMailClient::new(url.clone(), settings.mailbox.request_timeout())?))
        }
        None => Ok(Arc::new(MailTmClient::from_config(&settings.mailbox)?)),
    }
}

fn print_status(snapshot: &SessionSnapshot) {
    if let Some(status) = &snapshot.status {
        eprintln!("{}", status);
    }
}

fn print_summary(message: &MailMessage) {
    println!(
        "{}  {}  {:<30}  {}",
        message.created_at.format("%Y-%m-%d %H:%M"),
        message.id,
        message.from_address,
        message.subject
    );
}

fn print_message(message: &MailMessage) {
    println!("From:    {}", message.from_address);
    println!("Subject: {}", message.subject);
    println!("Date:    {}", message.created_at.to_rfc3339());
    println!();
    match &message.body {
        Some(body) if !body.text.is_empty() => println!("{}", body.text),
        Some(body) => println!("{}", body.html.as_deref().unwrap_or_default()),
        None => println!("{}", message.preview),
    }
}

/// Bootstrap and report whether a usable mailbox came out of it.
async fn ready(manager: &SessionManager) -> bool {
    let state = manager.bootstrap().await;
    let snapshot = manager.snapshot().await;
    print_status(&snapshot);
    match state {
        SessionState::Active => true,
        SessionState::Failed { kind, reason } => {
            error!("Mailbox unavailable ({:?}): {}", kind, reason);
            false
        }
        other => {
            debug!("Unexpected state after bootstrap: {:?}", other);
            false
        }
    }
}

async fn watch(manager: Arc<SessionManager>, period: Duration) -> bool {
    if !ready(&manager).await {
        return false;
    }
    println!("Address: {}", manager.email().await.unwrap_or_default());

    let mut printed: HashSet<String> = HashSet::new();
    for message in manager.snapshot().await.inbox.iter().rev() {
        print_summary(message);
        printed.insert(message.id.clone());
    }

    let poller = AutoRefresh::start(manager.clone(), period);
    let mut ticker = tokio::time::interval(Duration::from_millis(500));
    let mut last_state = manager.state();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = ticker.tick() => {
                let snapshot = manager.snapshot().await;
                for message in snapshot.inbox.iter().rev() {
                    if printed.insert(message.id.clone()) {
                        print_summary(message);
                    }
                }
                if snapshot.state != last_state {
                    if let SessionState::Failed { reason, .. } = &snapshot.state {
                        eprintln!("{}", reason);
                        eprintln!("Run `tempmail new` to create a new address.");
                    }
                    last_state = snapshot.state;
                }
            }
        }
    }

    poller.stop().await;
    true
}

async fn check_account(settings: &Settings, category: CategoryArg, number: &str, wallet: Option<String>) -> bool {
    let response: AccountCheckResponse = match category {
        CategoryArg::Bank => bank_placeholder(number),
        CategoryArg::EWallet => {
            let wallet = wallet.unwrap_or_default();
            let Some(code) = wallet_code(&wallet) else {
                eprintln!(
                    "Unknown e-wallet '{}'. Supported: {}",
                    wallet,
                    supported_wallets().collect::<Vec<_>>().join(", ")
                );
                return false;
            };
            let client = match KedaiLookupClient::new(&settings.account_check) {
                Ok(client) => client,
                Err(e) => {
                    error!("Failed to build lookup client: {}", e);
                    return false;
                }
            };
            match client.lookup(code, number).await {
                Ok(raw) => classify_lookup(raw, &wallet, number).body,
                Err(e) => {
                    eprintln!("{}", e.user_message());
                    return false;
                }
            }
        }
    };

    match serde_json::to_string_pretty(&response) {
        Ok(json) => println!("{}", json),
        Err(e) => error!("Failed to render response: {}", e),
    }
    response.status == "success"
}

fn mailbox(settings: &Settings) -> Option<Arc<SessionManager>> {
    let service = match build_service(settings) {
        Ok(service) => service,
        Err(e) => {
            error!("Failed to set up mail client: {}", e);
            return None;
        }
    };
    let store = Arc::new(FileSessionStore::new(&settings.mailbox.store_path));
    Some(Arc::new(SessionManager::new(service, store, ManagerOptions::from(&settings.mailbox))))
}

async fn run(command: Command, settings: Settings) -> bool {
    match command {
        Command::CheckAccount { category, number, wallet } => {
            check_account(&settings, category, &number, wallet).await
        }
        Command::Watch => {
            let Some(manager) = mailbox(&settings) else { return false };
            watch(manager, settings.mailbox.refresh_interval()).await
        }
        Command::New => {
            let Some(manager) = mailbox(&settings) else { return false };
            match manager.generate_new_mailbox().await {
                Ok(email) => {
                    println!("{}", email);
                    true
                }
                Err(e) => {
                    eprintln!("{}", e);
                    false
                }
            }
        }
        Command::Inbox => {
            let Some(manager) = mailbox(&settings) else { return false };
            if !ready(&manager).await {
                return false;
            }
            let snapshot = manager.snapshot().await;
            println!("Address: {}", snapshot.email.unwrap_or_default());
            if snapshot.inbox.is_empty() {
                println!("Inbox is empty.");
            }
            snapshot.inbox.iter().for_each(print_summary);
            true
        }
        Command::Read { id } => {
            let Some(manager) = mailbox(&settings) else { return false };
            if !ready(&manager).await {
                return false;
            }
            match manager.read_message(&id).await {
                Ok(message) => {
                    print_message(&message);
                    true
                }
                Err(e) => {
                    eprintln!("{}", e);
                    false
                }
            }
        }
        Command::Address => {
            let Some(manager) = mailbox(&settings) else { return false };
            let ok = ready(&manager).await;
            if let Some(email) = manager.email().await {
                println!("{}", email);
            }
            ok
        }
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let mut cli = Cli::parse();

    let mut settings = Settings::new(cli.config.as_deref()).unwrap_or_else(|err| {
        eprintln!("Failed to load configuration: {}", err);
        exit(1);
    });
    if let Some(url) = cli.proxy_url.take() {
        settings.mailbox.proxy_url = Some(url);
    }

    env_logger::init_from_env(env_logger::Env::new().default_filter_or(settings.log.level.as_str()));

    if !run(cli.command, settings).await {
        exit(1);
    }
}
