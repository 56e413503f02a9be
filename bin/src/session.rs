//! Session setup shared by the networked commands.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use indicatif::{ProgressBar, ProgressStyle};
use inquire::{Password, PasswordDisplayMode, Text};
use smartconnect_lib::{
    ClientConfig, Credentials, HttpTransport, SessionOptions, SmartClient, SmartConnectError,
    cancellable,
};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;

use crate::AuthArgs;

/// Returns the default token cache location.
///
/// - Linux: `~/.local/share/smartconnect/session.json`
/// - macOS: `~/Library/Application Support/smartconnect/session.json`
/// - Windows: `C:\Users\<User>\AppData\Roaming\smartconnect\session.json`
pub(crate) fn default_cache_path() -> PathBuf {
    ProjectDirs::from("", "", "smartconnect")
        .map_or_else(dirs_fallback, |dirs| dirs.data_dir().to_path_buf())
        .join("session.json")
}

fn dirs_fallback() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".smartconnect")
}

/// Translates the command line into client options.
pub(crate) fn session_options(auth: &AuthArgs) -> SessionOptions {
    let mut options = SessionOptions::new();

    if let Some(key) = &auth.trade_key {
        options = options.with_trade_key(key);
    }
    if let Some(key) = &auth.history_key {
        options = options.with_history_key(key);
    }
    if let Some(code) = &auth.client_code {
        options = options.with_client_code(code);
    }
    if !auth.no_cache {
        options = options.with_cache_path(auth.cache.clone().unwrap_or_else(default_cache_path));
    }
    if let (Some(code), Some(password), Some(totp)) =
        (&auth.client_code, &auth.password, &auth.totp)
    {
        options = options.with_credentials(Credentials::new(code, password, totp));
    }

    options
}

/// Resolves when the user presses Ctrl-C.
pub(crate) async fn interrupted() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}

pub(crate) fn spinner(message: &'static str, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Builds a client and establishes a session.
///
/// With `force` the cached session and refresh are skipped. When no
/// credentials were supplied and stdin is a terminal, the missing ones are
/// prompted for and the login is retried once.
pub(crate) async fn connect(auth: &AuthArgs, force: bool, quiet: bool) -> Result<SmartClient> {
    let options = session_options(auth);

    let pb = spinner("Resolving network identity...", quiet);
    let transport = cancellable(HttpTransport::new(ClientConfig::default()), interrupted())
        .await
        .context("Failed to prepare HTTP transport")?;

    let mut client = SmartClient::new(transport, options);

    if !force {
        pb.set_message("Establishing session...");
        let result = cancellable(client.bootstrap(), interrupted()).await;
        pb.finish_and_clear();

        match result {
            Ok(()) => return Ok(client),
            Err(SmartConnectError::Bootstrap { authenticate, .. })
                if matches!(*authenticate, SmartConnectError::MissingCredentials)
                    && std::io::stdin().is_terminal() =>
            {
                tracing::debug!("no credentials configured, prompting");
            }
            Err(e) => return Err(e).context("Could not establish a session"),
        }
    } else {
        pb.finish_and_clear();
    }

    let credentials = match (&auth.client_code, &auth.password, &auth.totp) {
        (Some(code), Some(password), Some(totp)) => Credentials::new(code, password, totp),
        _ => prompt_credentials(auth)?,
    };

    let pb = spinner("Logging in...", quiet);
    let result = cancellable(client.authenticate(&credentials), interrupted()).await;
    pb.finish_and_clear();
    result.context("Login failed")?;

    Ok(client)
}

fn prompt_credentials(auth: &AuthArgs) -> Result<Credentials> {
    let client_code = match &auth.client_code {
        Some(code) => code.clone(),
        None => Text::new("Client code:").prompt()?,
    };
    let password = match &auth.password {
        Some(password) => password.clone(),
        None => Password::new("PIN:")
            .with_display_mode(PasswordDisplayMode::Masked)
            .without_confirmation()
            .prompt()?,
    };
    let totp = match &auth.totp {
        Some(totp) => totp.clone(),
        None => Text::new("TOTP:").prompt()?,
    };
    Ok(Credentials::new(client_code, password, totp))
}
