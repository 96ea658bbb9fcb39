//! fanta - a command line client for fantasy tournament data.
//!
//! Log in once, then list tournaments and players. Expired access tokens
//! are refreshed automatically; when the session cannot be recovered the
//! stored tokens are dropped and the user is asked to log in again.

mod app;
mod display;

use std::io;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use app::App;

/// Environment variable naming an optional log file
const LOG_FILE_ENV: &str = "FANTA_LOG_FILE";

#[derive(Parser)]
#[command(name = "fanta", version, about = "Fantasy tournament and player data from the command line")]
struct Cli {
    /// API base URL (overrides FANTA_BASE_URL and the config file)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Print raw JSON instead of formatted lists
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in and store the session tokens
    Login {
        #[arg(short, long, env = "FANTA_USERNAME")]
        username: Option<String>,
        #[arg(long, env = "FANTA_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show whether a session is stored
    Status,
    /// List tournaments
    Tournaments {
        /// Filter as key=value, repeatable
        #[arg(short, long = "filter", value_parser = parse_filter)]
        filters: Vec<(String, String)>,
    },
    /// List players
    Players {
        /// Filter as key=value, repeatable
        #[arg(short, long = "filter", value_parser = parse_filter)]
        filters: Vec<(String, String)>,
    },
    /// Fetch tournaments and players together
    Overview,
}

fn parse_filter(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", s))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty filter key in '{}'", s));
    }
    Ok((key.to_string(), value.trim().to_string()))
}

/// Initialize the tracing subscriber for logging.
/// Returns the file writer guard, which must live until exit.
fn init_tracing() -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match std::env::var(LOG_FILE_ENV).ok().filter(|p| !p.is_empty()) {
        Some(path) => {
            let path = std::path::PathBuf::from(path);
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| std::path::PathBuf::from("."));
            let file_name = path
                .file_name()
                .map(|n| n.to_os_string())
                .unwrap_or_else(|| "fanta.log".into());
            let appender = tracing_appender::rolling::never(dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_ansi(false).with_writer(writer)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let _log_guard = init_tracing();
    info!("fanta starting");

    let app = App::new(cli.base_url.as_deref(), cli.json)?;

    match cli.command {
        Command::Login { username, password } => app.login(username, password).await,
        Command::Logout => app.logout(),
        Command::Status => app.status(),
        Command::Tournaments { filters } => app.tournaments(filters.into_iter().collect()).await,
        Command::Players { filters } => app.players(filters.into_iter().collect()).await,
        Command::Overview => app.overview().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_filter() {
        assert_eq!(
            parse_filter("is_active=true").unwrap(),
            ("is_active".to_string(), "true".to_string())
        );
        assert_eq!(
            parse_filter("name = De Rossi ").unwrap(),
            ("name".to_string(), "De Rossi".to_string())
        );
        // Empty value is allowed; the client skips it
        assert_eq!(parse_filter("season=").unwrap(), ("season".to_string(), String::new()));
        assert!(parse_filter("novalue").is_err());
        assert!(parse_filter("=x").is_err());
    }

    #[test]
    fn test_cli_parses_repeated_filters() {
        let cli = Cli::try_parse_from(["fanta", "players", "-f", "main_role=P", "--filter", "overall=80"])
            .unwrap();
        match cli.command {
            Command::Players { filters } => assert_eq!(filters.len(), 2),
            _ => panic!("expected players command"),
        }
    }

    #[test]
    fn test_base_url_flag_does_not_read_env() {
        use clap::CommandFactory;
        let command = Cli::command();
        let arg = command
            .get_arguments()
            .find(|a| a.get_id() == "base_url")
            .expect("base_url argument");
        assert!(arg.get_env().is_none());
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
