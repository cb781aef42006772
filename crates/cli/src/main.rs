// FILE: crates/cli/src/main.rs

use anyhow::{bail, Context, Result};
use clap::{Arg, Command};
use std::path::PathBuf;
use summit_config::{default_config_path, ConfigPersistence};
use summit_core::AccountId;

mod commands;

fn build_cli() -> Command {
    Command::new("summit")
        .version("0.1.0")
        .author("Summit Team")
        .about("Conference companion: schedule, videos and cross-device sync")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("PATH")
                .help("Path to the config file (defaults to the platform config dir)")
                .global(true),
        )
        .arg(
            Arg::new("account")
                .short('a')
                .long("account")
                .value_name("ACCOUNT")
                .help("Account to operate on (overrides the config file)")
                .global(true),
        )
        .subcommand(Command::new("init").about("Initialize the local database"))
        .subcommand(
            Command::new("star")
                .about("Add a session to your schedule")
                .arg(Arg::new("session").required(true).value_name("SESSION_ID").help("Session ID")),
        )
        .subcommand(
            Command::new("unstar")
                .about("Remove a session from your schedule")
                .arg(Arg::new("session").required(true).value_name("SESSION_ID").help("Session ID")),
        )
        .subcommand(
            Command::new("viewed")
                .about("Mark a video as watched")
                .arg(Arg::new("video").required(true).value_name("VIDEO_ID").help("Video ID")),
        )
        .subcommand(
            Command::new("feedback")
                .about("Record that you submitted feedback for a session")
                .arg(Arg::new("session").required(true).value_name("SESSION_ID").help("Session ID")),
        )
        .subcommand(Command::new("sync").about("Run one sync pass against the remote replica"))
        .subcommand(Command::new("register").about("Register this device for push-triggered sync"))
        .subcommand(Command::new("unregister").about("Unregister this device from push sync"))
        .subcommand(
            Command::new("status")
                .about("Show local user data and sync state")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print the snapshot as JSON")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
}

fn load_context(matches: &clap::ArgMatches) -> Result<commands::AppContext> {
    let config_path = match matches.get_one::<String>("config") {
        Some(path) => PathBuf::from(path),
        None => default_config_path().context("Failed to resolve config path")?,
    };

    let config = ConfigPersistence::new(config_path.clone())
        .load()
        .context("Failed to load config")?;

    let account = matches
        .get_one::<String>("account")
        .cloned()
        .or_else(|| (!config.account.is_empty()).then(|| config.account.clone()));
    let Some(account) = account else {
        bail!("No account given. Pass --account or set `account` in the config file.");
    };

    Ok(commands::AppContext {
        config,
        config_path,
        account: AccountId::new(account),
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let matches = build_cli().get_matches();
    if matches.subcommand().is_none() {
        build_cli().print_help()?;
        return Ok(());
    }
    let mut ctx = load_context(&matches)?;

    match matches.subcommand() {
        Some(("init", _)) => commands::init(&ctx).await,
        Some(("star", sub_matches)) => {
            let session = sub_matches
                .get_one::<String>("session")
                .ok_or_else(|| anyhow::anyhow!("Session ID is required"))?;
            commands::star(&ctx, session).await
        }
        Some(("unstar", sub_matches)) => {
            let session = sub_matches
                .get_one::<String>("session")
                .ok_or_else(|| anyhow::anyhow!("Session ID is required"))?;
            commands::unstar(&ctx, session).await
        }
        Some(("viewed", sub_matches)) => {
            let video = sub_matches
                .get_one::<String>("video")
                .ok_or_else(|| anyhow::anyhow!("Video ID is required"))?;
            commands::viewed(&ctx, video).await
        }
        Some(("feedback", sub_matches)) => {
            let session = sub_matches
                .get_one::<String>("session")
                .ok_or_else(|| anyhow::anyhow!("Session ID is required"))?;
            commands::feedback(&ctx, session).await
        }
        Some(("sync", _)) => commands::sync(&ctx).await,
        Some(("register", _)) => commands::register(&mut ctx).await,
        Some(("unregister", _)) => commands::unregister(&ctx).await,
        Some(("status", sub_matches)) => {
            commands::status(&ctx, sub_matches.get_flag("json")).await
        }
        _ => {
            build_cli().print_help()?;
            Ok(())
        }
    }
}
