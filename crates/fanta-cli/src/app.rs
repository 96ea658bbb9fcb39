use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use fanta_core::{ApiClient, Config, Filters, LoginRedirect, Session};
use serde::Serialize;
use tracing::{debug, warn};

use crate::display;

/// Tells the user to log in again when the session ends
struct TerminalRedirect;

impl LoginRedirect for TerminalRedirect {
    fn redirect_to_login(&self, location: &str) {
        debug!(location, "Redirecting to login");
        eprintln!("Your session has ended. Run `fanta login` to sign in again.");
    }
}

pub struct App {
    config: Config,
    api: ApiClient,
    json: bool,
}

impl App {
    pub fn new(base_url: Option<&str>, json: bool) -> Result<Self> {
        let config = match Config::load() {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Failed to load config, using defaults");
                Config::default()
            }
        };

        let base_url = base_url
            .map(str::to_string)
            .unwrap_or_else(|| config.base_url());
        debug!(%base_url, backend = ?config.token_backend, "Config loaded");

        let session = Session::new(config.token_store()?);
        let api = ApiClient::new(&base_url, session, Arc::new(TerminalRedirect))?;

        Ok(Self { config, api, json })
    }

    pub async fn login(mut self, username: Option<String>, password: Option<String>) -> Result<()> {
        let username = match username {
            Some(u) => u,
            None => Self::prompt_username(self.config.last_username.as_deref())?,
        };
        let password = match password {
            Some(p) => p,
            None => rpassword::prompt_password("Password: ")?,
        };

        if username.is_empty() || password.is_empty() {
            anyhow::bail!("Username and password required");
        }

        self.api.login(&username, &password).await?;

        self.config.last_username = Some(username);
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }

        println!("Login successful");
        Ok(())
    }

    fn prompt_username(last: Option<&str>) -> Result<String> {
        match last {
            Some(last) => print!("Username [{}]: ", last),
            None => print!("Username: "),
        }
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        let input = input.trim();

        Ok(match (input.is_empty(), last) {
            (true, Some(last)) => last.to_string(),
            _ => input.to_string(),
        })
    }

    pub fn logout(self) -> Result<()> {
        self.api.logout()?;
        println!("Logged out");
        Ok(())
    }

    pub fn status(self) -> Result<()> {
        let session = self.api.session();
        let logged_in = session.is_authenticated()?;
        let can_refresh = session.refresh_token()?.is_some();

        match (logged_in, &self.config.last_username) {
            (true, Some(user)) => println!("Logged in as {}", user),
            (true, None) => println!("Logged in"),
            (false, _) if can_refresh => {
                println!("Access token missing; it will be refreshed on the next request")
            }
            (false, _) => println!("Not logged in"),
        }
        if logged_in && !can_refresh {
            println!("No refresh token stored; the session ends when the access token expires");
        }
        Ok(())
    }

    /// Fail early when no session is stored, like the protected views do.
    /// A lone refresh token is enough; the first request will refresh it.
    fn require_login(&self) -> Result<()> {
        let session = self.api.session();
        if !session.is_authenticated()? && session.refresh_token()?.is_none() {
            anyhow::bail!("Not logged in. Run `fanta login` first.");
        }
        Ok(())
    }

    pub async fn tournaments(self, filters: Filters) -> Result<()> {
        self.require_login()?;
        let tournaments = self
            .api
            .fetch_tournaments(&filters)
            .await
            .context("Failed to fetch tournaments")?;

        if self.json {
            print_json(&tournaments)?;
        } else {
            display::print_tournaments(&tournaments);
        }
        Ok(())
    }

    pub async fn players(self, filters: Filters) -> Result<()> {
        self.require_login()?;
        let players = self
            .api
            .fetch_players(&filters)
            .await
            .context("Failed to fetch players")?;

        if self.json {
            print_json(&players)?;
        } else {
            display::print_players(&players);
        }
        Ok(())
    }

    /// Both lists at once. Each request refreshes on its own if the token
    /// has expired.
    pub async fn overview(self) -> Result<()> {
        self.require_login()?;
        let filters = Filters::new();
        let (tournaments, players) = futures::try_join!(
            self.api.fetch_tournaments(&filters),
            self.api.fetch_players(&filters),
        )?;

        if self.json {
            print_json(&serde_json::json!({
                "tournaments": tournaments,
                "players": players,
            }))?;
        } else {
            display::print_tournaments(&tournaments);
            println!();
            display::print_players(&players);
        }
        Ok(())
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
