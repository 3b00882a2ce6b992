use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod auth;
mod commands;
mod config;
mod db;
mod models;

use commands::{FoodCommand, LogCommand, UserCommand};
use config::Config;
use db::{DailyLog, FoodStore, UserStore};

#[derive(Parser)]
#[command(name = "nosh")]
#[command(version)]
#[command(about = "A calorie tracking CLI application", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// User whose daily log to operate on (defaults to the configured user)
    #[arg(long, global = true)]
    user: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage basic and composite foods
    Food(FoodCommand),

    /// Manage the daily consumption log
    Log(LogCommand),

    /// Manage user accounts and profiles
    User(UserCommand),
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nosh=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = Config::load(cli.config)?;
    let username = cli.user.unwrap_or_else(|| config.username.clone());

    match cli.command {
        Some(Commands::Food(cmd)) => {
            let mut store =
                FoodStore::open(config.basic_foods_path(), config.composite_foods_path())?;
            cmd.run(&mut store)?;
        }
        Some(Commands::Log(cmd)) => {
            let store =
                FoodStore::open(config.basic_foods_path(), config.composite_foods_path())?;
            let mut log = DailyLog::open(config.log_dir(&username))?;
            cmd.run(&mut log, &store)?;
        }
        Some(Commands::User(cmd)) => {
            let mut users = UserStore::open(config.users_path())?;
            cmd.run(&mut users)?;
        }
        None => {
            println!("Use --help to see available commands");
        }
    }

    Ok(())
}
