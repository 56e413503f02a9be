//! smartconnect CLI - Angel One SmartAPI session and historical data tool.

use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand};
use smartconnect_lib::{Exchange, Interval};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod display;
mod session;

use display::Format;

#[derive(Parser)]
#[command(name = "smartconnect")]
#[command(about = "Angel One SmartAPI client", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    auth: AuthArgs,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Quiet mode (suppress progress output)
    #[arg(short, long, global = true)]
    quiet: bool,
}

/// Keys, credentials and cache location shared by every networked command.
#[derive(Args, Clone, Default)]
pub(crate) struct AuthArgs {
    /// API key for trading-scope endpoints (login, refresh, profile)
    #[arg(long, env = "SMARTCONNECT_TRADE_KEY", global = true, hide_env_values = true)]
    pub(crate) trade_key: Option<String>,

    /// API key for the historical data endpoint
    #[arg(long, env = "SMARTCONNECT_HISTORY_KEY", global = true, hide_env_values = true)]
    pub(crate) history_key: Option<String>,

    /// Broker client code
    #[arg(long, env = "SMARTCONNECT_CLIENT_CODE", global = true)]
    pub(crate) client_code: Option<String>,

    /// Account PIN or password
    #[arg(long, env = "SMARTCONNECT_PASSWORD", global = true, hide_env_values = true)]
    pub(crate) password: Option<String>,

    /// Current one-time code from the authenticator app
    #[arg(long, global = true)]
    pub(crate) totp: Option<String>,

    /// Token cache file. Defaults to session.json in the user data directory.
    #[arg(long, global = true)]
    pub(crate) cache: Option<PathBuf>,

    /// Do not read or write the token cache
    #[arg(long, global = true, conflicts_with = "cache")]
    pub(crate) no_cache: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Establish a session and store its tokens
    Login {
        /// Skip the cached session and token refresh, log in with the password
        #[arg(long)]
        force: bool,
    },

    /// Show the account profile
    Profile,

    /// Download historical candles
    Candles {
        /// Exchange segment (NSE, NFO, BSE, BFO, CDS, MCX)
        #[arg(short, long, default_value = "NSE")]
        exchange: Exchange,

        /// Instrument symbol token (e.g., 3045)
        token: String,

        /// Candle interval (1m, 3m, 5m, 10m, 15m, 30m, 1h, 1d)
        #[arg(short, long, default_value = "1d")]
        interval: Interval,

        /// Range start (YYYY-MM-DD or "YYYY-MM-DD HH:MM", exchange local time)
        #[arg(short, long)]
        from: String,

        /// Range end (YYYY-MM-DD or "YYYY-MM-DD HH:MM", exchange local time)
        #[arg(short, long)]
        to: String,

        /// Output file path, or - for stdout. Defaults to <token>_<interval>.<format>
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "csv")]
        format: Format,
    },

    /// List candle intervals and their maximum request span
    Intervals,
}

fn init_tracing(verbose: u8, quiet: bool) {
    let default = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    // Show help if no command provided
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Login { force } => commands::login::login(&cli.auth, force, cli.quiet).await,
        Commands::Profile => commands::profile::show_profile(&cli.auth, cli.quiet).await,
        Commands::Candles {
            exchange,
            token,
            interval,
            from,
            to,
            output,
            format,
        } => {
            commands::candles::candles(
                &cli.auth, exchange, &token, interval, &from, &to, output, format, cli.quiet,
            )
            .await
        }
        Commands::Intervals => {
            commands::intervals::list_intervals();
            Ok(())
        }
    }
}
