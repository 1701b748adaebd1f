// FILE: crates/cli/src/main.rs

use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use nestegg_config::ConfigManager;
use std::path::PathBuf;

mod commands;

fn build_cli() -> Command {
    Command::new("nestegg")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Nestegg Team")
        .about("Family budgeting client for the Nestegg API")
        .arg(
            Arg::new("config-dir")
                .short('c')
                .long("config-dir")
                .value_name("DIR")
                .help("Directory holding config.toml, settings and session")
                .global(true),
        )
        .subcommand(Command::new("health").about("Check whether the API is reachable"))
        .subcommand(
            Command::new("login")
                .about("Sign in with a token or with email and password")
                .arg(Arg::new("token").short('t').long("token").value_name("TOKEN").help("Bearer token issued by the server").conflicts_with_all(["email", "password"]))
                .arg(Arg::new("user-json").long("user-json").value_name("JSON").help("User profile to store with the token").requires("token"))
                .arg(Arg::new("email").short('e').long("email").value_name("EMAIL").help("Account email").requires("password"))
                .arg(Arg::new("password").short('p').long("password").value_name("PASSWORD").help("Account password").requires("email")),
        )
        .subcommand(Command::new("logout").about("Sign out and forget the stored session"))
        .subcommand(Command::new("whoami").about("Show the signed-in user"))
        .subcommand(
            Command::new("get")
                .about("Fetch a JSON resource, retrying while the backend wakes up")
                .arg(Arg::new("path").required(true).value_name("PATH").help("API path, e.g. expenses")),
        )
        .subcommand(
            Command::new("keepalive")
                .about("Ping the backend periodically while signed in")
                .arg(
                    Arg::new("for")
                        .short('f')
                        .long("for")
                        .value_name("SECONDS")
                        .help("How long to keep pinging")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("600"),
                ),
        )
        .subcommand(
            Command::new("settings")
                .about("Show or change user settings")
                .subcommand_required(true)
                .subcommand(Command::new("show").about("Print all settings"))
                .subcommand(
                    Command::new("set")
                        .about("Change one setting")
                        .arg(Arg::new("key").required(true).value_name("KEY").help("Setting name"))
                        .arg(Arg::new("value").required(true).value_name("VALUE").help("New value")),
                )
                .subcommand(Command::new("reset").about("Restore default settings")),
        )
        .subcommand(
            Command::new("config")
                .about("Manage the client configuration file")
                .subcommand_required(true)
                .subcommand(Command::new("init").about("Write a default config file"))
                .subcommand(Command::new("show").about("Print the effective configuration")),
        )
}

fn config_manager(matches: &ArgMatches) -> Result<ConfigManager> {
    match matches.get_one::<String>("config-dir") {
        Some(dir) => ConfigManager::with_directory(PathBuf::from(dir))
            .context("Failed to open config directory"),
        None => ConfigManager::new().context("Failed to resolve config directory"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = build_cli().get_matches();
    let manager = config_manager(&matches)?;
    let config = manager
        .load_with_env_overrides()
        .context("Failed to load configuration")?;

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.app.log_level.to_string()),
    )
    .init();

    let app = commands::App::new(manager, config);

    match matches.subcommand() {
        Some(("health", _)) => commands::health(&app).await,
        Some(("login", sub_matches)) => commands::login(&app, sub_matches).await,
        Some(("logout", _)) => commands::logout(&app),
        Some(("whoami", _)) => commands::whoami(&app),
        Some(("get", sub_matches)) => commands::get(&app, sub_matches).await,
        Some(("keepalive", sub_matches)) => commands::keepalive(&app, sub_matches).await,
        Some(("settings", sub_matches)) => commands::settings(&app, sub_matches),
        Some(("config", sub_matches)) => commands::config(&app, sub_matches),
        _ => {
            build_cli().print_help()?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        build_cli().debug_assert();
    }

    #[test]
    fn test_login_token_conflicts_with_password() {
        let result = build_cli().try_get_matches_from([
            "nestegg", "login", "--token", "t0k", "--email", "a@b.c", "--password", "x",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_config_dir() {
        let matches = build_cli()
            .try_get_matches_from(["nestegg", "whoami", "--config-dir", "/tmp/nestegg"])
            .expect("valid args");
        assert_eq!(
            matches.get_one::<String>("config-dir").map(String::as_str),
            Some("/tmp/nestegg")
        );
    }
}
