//! `olle`: administer study-group account settings from the command line.
//!
//! Reads `olle.toml` (or the path given with `--config`) plus `OLLE_*`
//! environment variables, opens the SQLite store and runs one command.
//!
//! # Usage
//!
//! ```text
//! olle account create --nickname keesun --email keesun@example.com --password 12345678
//! olle profile --account keesun --bio "짧은 소개"
//! olle tags add --account keesun newTag
//! olle zones seed zones_kr.csv
//! olle zones add --account keesun "Andong(안동시)/Gyeongsangbuk-do"
//! ```

mod commands;
mod config;
mod password;

use std::{path::PathBuf, process::ExitCode, sync::Arc};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use commands::{App, NotificationFlags, ProfileOverrides};
use olle_core::password::PasswordEncoder as _;
use olle_store_sqlite::SqliteStore;
use password::Argon2Encoder;
use serde::Serialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::config::CliConfig;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(author, version, about = "Study-group account settings administration")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "olle.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Register or inspect accounts.
  #[command(subcommand)]
  Account(AccountCommand),

  /// Update profile fields; omitted fields keep their value, "" clears one.
  Profile {
    #[arg(long)]
    account:       String,
    #[arg(long)]
    bio:           Option<String>,
    #[arg(long)]
    url:           Option<String>,
    #[arg(long)]
    occupation:    Option<String>,
    #[arg(long)]
    location:      Option<String>,
    #[arg(long)]
    profile_image: Option<String>,
  },

  /// Change an account's nickname.
  Nickname {
    #[arg(long)]
    account:      String,
    new_nickname: String,
  },

  /// Change an account's password.
  Password {
    #[arg(long)]
    account:      String,
    #[arg(long = "new")]
    new_password: String,
    #[arg(long)]
    confirm:      String,
  },

  /// Update notification preferences; omitted flags keep their value.
  Notifications(NotificationArgs),

  /// Manage an account's tags.
  #[command(subcommand)]
  Tags(TagCommand),

  /// Manage an account's zones and the zone reference data.
  #[command(subcommand)]
  Zones(ZoneCommand),

  /// Print the argon2 hash for a password read from stdin and exit.
  HashPassword,
}

#[derive(Subcommand, Debug)]
enum AccountCommand {
  Create {
    #[arg(long)]
    nickname: String,
    #[arg(long)]
    email:    String,
    #[arg(long)]
    password: String,
  },
  /// Print an account as JSON.
  Show {
    #[arg(long)]
    account: String,
  },
}

#[derive(Args, Debug)]
struct NotificationArgs {
  #[arg(long)]
  account:                          String,
  #[arg(long)]
  study_create_by_email:            Option<bool>,
  #[arg(long)]
  study_create_by_web:              Option<bool>,
  #[arg(long)]
  study_enrollment_result_by_email: Option<bool>,
  #[arg(long)]
  study_enrollment_result_by_web:   Option<bool>,
  #[arg(long)]
  study_update_by_email:            Option<bool>,
  #[arg(long)]
  study_update_by_web:              Option<bool>,
}

#[derive(Subcommand, Debug)]
enum TagCommand {
  Add {
    #[arg(long)]
    account: String,
    title:   String,
  },
  Remove {
    #[arg(long)]
    account: String,
    title:   String,
  },
  /// List every known tag title.
  Whitelist,
}

#[derive(Subcommand, Debug)]
enum ZoneCommand {
  Add {
    #[arg(long)]
    account:   String,
    /// `city(localName)/province`
    zone_name: String,
  },
  Remove {
    #[arg(long)]
    account:   String,
    zone_name: String,
  },
  /// List every known zone name.
  Whitelist,
  /// Load `city,localName,province` lines into an empty zone table.
  Seed {
    /// Defaults to `zones_csv` from the configuration.
    file: Option<PathBuf>,
  },
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();

  match run(cli).await {
    Ok(()) => Ok(ExitCode::SUCCESS),
    Err(err) => {
      // Rejected input is an expected outcome: report per field, no trace.
      let Some(errors) = err
        .downcast_ref::<olle_core::Error>()
        .and_then(olle_core::Error::validation_errors)
      else {
        return Err(err);
      };
      for e in errors.iter() {
        eprintln!("{}: {} ({})", e.field, e.message, e.code);
      }
      Ok(ExitCode::from(2))
    }
  }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
  if let Command::HashPassword = cli.command {
    let password = read_password()?;
    println!("{}", Argon2Encoder::default().encode(&password)?);
    return Ok(());
  }

  let cfg = CliConfig::load(&cli.config)?;
  let store = SqliteStore::open(&cfg.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", cfg.store_path))?;
  let app = App::new(Arc::new(store), Arc::new(Argon2Encoder::default()));

  match cli.command {
    Command::Account(AccountCommand::Create { nickname, email, password }) => {
      print_json(&app.create_account(&nickname, &email, &password).await?)
    }
    Command::Account(AccountCommand::Show { account }) => {
      print_json(&app.show_account(&account).await?)
    }
    Command::Profile { account, bio, url, occupation, location, profile_image } => {
      let overrides = ProfileOverrides { bio, url, occupation, location, profile_image };
      print_json(&app.update_profile(&account, overrides).await?)
    }
    Command::Nickname { account, new_nickname } => {
      print_json(&app.update_nickname(&account, &new_nickname).await?)
    }
    Command::Password { account, new_password, confirm } => {
      app.update_password(&account, &new_password, &confirm).await
    }
    Command::Notifications(args) => {
      let flags = NotificationFlags {
        study_create_by_email:            args.study_create_by_email,
        study_create_by_web:              args.study_create_by_web,
        study_enrollment_result_by_email: args.study_enrollment_result_by_email,
        study_enrollment_result_by_web:   args.study_enrollment_result_by_web,
        study_update_by_email:            args.study_update_by_email,
        study_update_by_web:              args.study_update_by_web,
      };
      print_json(&app.update_notifications(&args.account, flags).await?)
    }
    Command::Tags(TagCommand::Add { account, title }) => {
      print_json(&app.add_tag(&account, &title).await?)
    }
    Command::Tags(TagCommand::Remove { account, title }) => {
      print_json(&app.remove_tag(&account, &title).await?)
    }
    Command::Tags(TagCommand::Whitelist) => print_json(&app.tag_whitelist().await?),
    Command::Zones(ZoneCommand::Add { account, zone_name }) => {
      print_json(&app.add_zone(&account, &zone_name).await?)
    }
    Command::Zones(ZoneCommand::Remove { account, zone_name }) => {
      print_json(&app.remove_zone(&account, &zone_name).await?)
    }
    Command::Zones(ZoneCommand::Whitelist) => print_json(&app.zone_whitelist().await?),
    Command::Zones(ZoneCommand::Seed { file }) => {
      let path = file
        .or(cfg.zones_csv)
        .context("no zone file given and `zones_csv` is not configured")?;
      let csv = std::fs::read_to_string(&path)
        .with_context(|| format!("reading zone file {}", path.display()))?;
      let inserted = app.seed_zones(&csv).await?;
      println!("{inserted} zones inserted");
      Ok(())
    }
    Command::HashPassword => unreachable!("handled before the store is opened"),
  }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
  println!("{}", serde_json::to_string_pretty(value)?);
  Ok(())
}

/// Read a password from stdin.
fn read_password() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  let stdin = io::stdin();
  eprint!("Password: ");
  io::stderr().flush().ok();
  let mut line = String::new();
  stdin.lock().read_line(&mut line)?;
  Ok(
    line
      .trim_end_matches('\n')
      .trim_end_matches('\r')
      .to_string(),
  )
}
