mod cli;
mod commands;
mod logging;
mod output;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use commands::App;
use diary_client::config::ClientConfig;
use diary_client::session::{FileStore, SessionSlot, SessionStore};
use diary_client::{DiaryClient, DiaryClientError};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let mut config = ClientConfig::from_env();
    if let Some(server) = cli.server {
        config.base_url = server;
    }
    tracing::debug!(base_url = %config.base_url, "using API");

    let client = DiaryClient::new(config);

    let session_path = match cli.session_file {
        Some(path) => path,
        None => FileStore::default_path().context("Failed to get home directory")?,
    };
    let sessions = SessionStore::new(FileStore::new(session_path));

    let slot = cli.command.slot();
    let is_login = cli.command.is_login();
    let session = sessions
        .load(slot)
        .with_context(|| format!("Failed to read {:?}", sessions.backend().path()))?;
    if let Some(session) = &session {
        client.set_token(session.token.clone()).await;
        tracing::debug!(user = %session.user.username, "authenticated with saved session");
    }

    let app = App {
        client,
        sessions,
        slot,
        session,
        json: cli.json,
    };

    if let Err(e) = commands::run(&app, cli.command).await {
        report(&app, &e, is_login);
        std::process::exit(1);
    }

    Ok(())
}

fn report(app: &App, e: &DiaryClientError, is_login: bool) {
    eprintln!("❌ {}", e);

    let login_hint = match app.slot {
        SessionSlot::User => "diary-cli login",
        SessionSlot::Admin => "diary-cli admin login",
    };

    if e.is_session_expired() && !is_login {
        if let Err(clear_err) = app.sessions.clear(app.slot) {
            tracing::warn!(error = %clear_err, "failed to clear session");
        }
        eprintln!("   Your session has ended. Please log in again:");
        eprintln!("   {} --username <username> --password <password>", login_hint);
    } else if e.is_unauthorized() && !is_login {
        eprintln!("   {} --username <username> --password <password>", login_hint);
    } else if e.is_not_found() {
        eprintln!("   Tip: use 'list' to see available diaries");
    }
}
