// FILE: crates/cli/src/commands.rs

use anyhow::{bail, Context, Result};
use clap::ArgMatches;
use console::style;
use nestegg_config::{Config, ConfigManager};
use nestegg_core::{AuthStatus, Settings, SettingsAction, User};
use nestegg_network::{
    ApiClient, AuthSession, ClientConfig, LivenessPinger, PingerConfig, RequestExecutor,
    SessionWatcher, SettingsSession,
};
use nestegg_resilience::with_timeout;
use serde_json::Value;
use std::time::Duration;

/// Everything a command needs, resolved once per invocation
pub struct App {
    manager: ConfigManager,
    config: Config,
}

impl App {
    pub fn new(manager: ConfigManager, config: Config) -> Self {
        Self { manager, config }
    }

    fn client(&self) -> Result<ApiClient> {
        ApiClient::with_config(ClientConfig::from(&self.config.api))
            .context("Failed to create API client")
    }

    /// Auth session with any stored sign-in already restored
    fn session(&self) -> Result<AuthSession> {
        let session = AuthSession::new(self.client()?, self.manager.session_storage());
        session.restore();
        Ok(session)
    }

    fn settings(&self) -> SettingsSession {
        SettingsSession::load(self.manager.settings_file())
    }
}

/// Check whether the API answers its health endpoint
pub async fn health(app: &App) -> Result<()> {
    let client = app.client()?;
    let url = client.url("health")?;

    match with_timeout(app.config.keepalive.timeout(), client.health()).await {
        Ok(Ok(())) => {
            println!("{} API is up at {}", style("✓").green().bold(), url);
            Ok(())
        }
        Ok(Err(e)) => bail!("Health check failed: {}", e),
        Err(e) => bail!("Health check failed: {}", e),
    }
}

/// Sign in with a token or with email and password
pub async fn login(app: &App, matches: &ArgMatches) -> Result<()> {
    let session = app.session()?;

    let user = if let Some(token) = matches.get_one::<String>("token") {
        let user = match matches.get_one::<String>("user-json") {
            Some(raw) => User::from_json(raw).context("Invalid --user-json")?,
            None => fetch_profile(app, token).await?,
        };
        session
            .sign_in(user.clone(), token.clone())
            .context("Failed to store session")?;
        user
    } else if let (Some(email), Some(password)) = (
        matches.get_one::<String>("email"),
        matches.get_one::<String>("password"),
    ) {
        session
            .login(email, password)
            .await
            .context("Login failed")?
    } else {
        bail!("Provide --token, or --email and --password");
    };

    println!("{} Signed in as {}", style("✓").green().bold(), user);
    Ok(())
}

/// Looks up the profile that belongs to `token`
async fn fetch_profile(app: &App, token: &str) -> Result<User> {
    let client = app.client()?;
    client.set_token(Some(token.to_string()));
    client
        .get_json::<User>("auth/me")
        .await
        .context("Failed to fetch user profile for token")
}

/// Sign out and forget the stored session
pub fn logout(app: &App) -> Result<()> {
    let session = app.session()?;
    if !session.state().is_authenticated() {
        println!("Not signed in.");
        return Ok(());
    }

    session.logout().context("Failed to clear session")?;
    println!("{} Signed out", style("✓").green().bold());
    Ok(())
}

/// Show the signed-in user
pub fn whoami(app: &App) -> Result<()> {
    let state = app.session()?.state();
    let user = match state.user {
        Some(user) if state.status == AuthStatus::Authenticated => user,
        _ => {
            println!("Not signed in. Use 'login' first.");
            return Ok(());
        }
    };

    println!("{}", style(&user.name).bold());
    println!("  Email: {}", user.email);
    println!("  Role: {}", role_label(&user));
    if let Some(family) = &user.family_id {
        println!("  Family: {}", family);
    }
    Ok(())
}

/// Fetch a JSON resource through the retrying executor
pub async fn get(app: &App, matches: &ArgMatches) -> Result<()> {
    let path = matches
        .get_one::<String>("path")
        .ok_or_else(|| anyhow::anyhow!("API path is required"))?
        .clone();

    let session = app.session()?;
    let client = session.client().clone();
    let executor_path = path.clone();
    let executor = RequestExecutor::builder(move || {
        let client = client.clone();
        let path = path.clone();
        async move { client.get_json::<Value>(&path).await }
    })
    .with_config(&app.config.fetch)
    .build();

    let mut updates = executor.subscribe();
    let state = loop {
        let state = updates.borrow_and_update().clone();
        if !state.loading {
            break state;
        }
        if state.retrying {
            log::info!(
                "GET {} retry {}/{}",
                executor_path,
                state.attempt,
                executor.policy().max_attempts()
            );
            eprintln!(
                "{} Service waking up, retry {}/{}...",
                style("…").yellow(),
                state.attempt,
                executor.policy().max_attempts()
            );
        }
        if updates.changed().await.is_err() {
            break executor.state();
        }
    };

    if let Some(error) = state.error {
        log::warn!("GET {} gave up after {} call(s)", executor_path, executor.calls());
        bail!("Request failed: {}", error);
    }
    let data = state.data.unwrap_or(Value::Null);
    println!("{}", serde_json::to_string_pretty(&data)?);
    Ok(())
}

/// Ping the backend while signed in, for a bounded time
pub async fn keepalive(app: &App, matches: &ArgMatches) -> Result<()> {
    let seconds = matches.get_one::<u64>("for").copied().unwrap_or(600);

    if !app.config.keepalive.enabled {
        bail!("Keep-alive is disabled in the configuration");
    }

    let session = app.session()?;
    if !session.state().is_authenticated() {
        bail!("Not signed in. Use 'login' first.");
    }

    let pinger = LivenessPinger::new(
        session.client().clone(),
        PingerConfig::from(&app.config.keepalive),
    )
    .install();
    let watcher = SessionWatcher::spawn(session.store(), pinger.clone());
    log::info!("Keep-alive started for {}s", seconds);

    println!(
        "Pinging every {}s for {}s (Ctrl-C to stop)",
        pinger.config().interval.as_secs(),
        seconds
    );

    tokio::select! {
        _ = tokio::time::sleep(Duration::from_secs(seconds)) => {}
        _ = tokio::signal::ctrl_c() => {}
    }

    drop(watcher);
    log::info!("Keep-alive stopped after {} ping(s)", pinger.ping_count());
    println!(
        "{} Sent {} health ping(s)",
        style("✓").green().bold(),
        pinger.ping_count()
    );
    Ok(())
}

/// Show or change user settings
pub fn settings(app: &App, matches: &ArgMatches) -> Result<()> {
    let session = app.settings();

    match matches.subcommand() {
        Some(("show", _)) => print_settings(&session.settings())?,
        Some(("set", sub_matches)) => {
            let key = required(sub_matches, "key")?;
            let value = required(sub_matches, "value")?;
            let action = SettingsAction::parse(key, value)?;
            let settings = session.apply(action).context("Failed to save settings")?;
            println!(
                "{} {} = {}",
                style("✓").green().bold(),
                key,
                settings.get(key)?
            );
        }
        Some(("reset", _)) => {
            let settings = session
                .apply(SettingsAction::Reset)
                .context("Failed to save settings")?;
            println!("{} Settings reset to defaults", style("✓").green().bold());
            print_settings(&settings)?;
        }
        _ => bail!("Unknown settings command"),
    }
    Ok(())
}

/// Manage the configuration file
pub fn config(app: &App, matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("init", _)) => {
            let created = app
                .manager
                .initialize()
                .context("Failed to write config file")?;
            let path = app.manager.config_path();
            if created {
                println!("{} Created {}", style("✓").green().bold(), path.display());
            } else {
                println!("Config already exists at {}", path.display());
            }
        }
        Some(("show", _)) => {
            println!("# {}", app.manager.config_path().display());
            print!(
                "{}",
                toml::to_string_pretty(&app.config).context("Failed to render config")?
            );
        }
        _ => bail!("Unknown config command"),
    }
    Ok(())
}

fn required<'a>(matches: &'a ArgMatches, name: &str) -> Result<&'a str> {
    matches
        .get_one::<String>(name)
        .map(String::as_str)
        .ok_or_else(|| anyhow::anyhow!("{} is required", name))
}

fn print_settings(settings: &Settings) -> Result<()> {
    println!("\n{}", style("Settings").bold().cyan());
    println!("{}", "=".repeat(40));
    for key in Settings::KEYS {
        println!("{:<20} {}", key, settings.get(key)?);
    }
    Ok(())
}

fn role_label(user: &User) -> &'static str {
    if user.is_admin() {
        "admin"
    } else {
        "member"
    }
}
