//! Main entry point for the AI `HealthPal` command-line client.

use std::{path::PathBuf, process::ExitCode};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use shared::config::ClientConfig;
use url::Url;

use commands::{
    auth::{SignInArgs, SignUpArgs},
    session::Session,
};

mod commands;
mod logging;
mod routes;
mod validation;

/// AI `HealthPal` CLI
#[derive(Parser, Debug)]
#[command(name = "healthpal")]
#[command(about = "Command-line client for AI HealthPal accounts", long_about = None)]
struct Cli {
    /// Path to the configuration file (yaml, json or toml)
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Base URL of the HealthPal API (e.g. `http://localhost:5000`)
    #[arg(long, global = true)]
    api_url: Option<Url>,

    /// Directory holding the saved session and cookies
    #[arg(long, global = true)]
    session_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sign in with email and password
    SignIn(SignInArgs),

    /// Create an account and sign in
    SignUp(SignUpArgs),

    /// Show the home page; requires a session
    Home {
        /// Ask the server whether the session is still valid first
        #[arg(long)]
        verify: bool,
    },

    /// Visit a page by path (`/`, `/login` or `/register`)
    Open {
        /// Page path
        path: String,
    },

    /// Sign out and forget the saved session
    Logout,

    /// Ask the server whether the saved session is still valid
    Check,

    /// Generate shell completion scripts for the CLI
    Completion {
        /// The shell type for which to generate the completion script (e.g., bash, zsh, fish, powershell)
        #[arg(long, short)]
        shell: clap_complete::Shell,
    },

    /// Generate a configuration file
    Config {
        /// Format of the configuration file to generate (yaml or json)
        #[arg(long, short, default_value = "yaml")]
        format: String,

        /// Where to write the file; defaults to `config.<format>`
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

fn resolve_config(cli: &Cli) -> Result<ClientConfig> {
    let mut config = ClientConfig::load_config(cli.config.as_deref(), cli.api_url.clone())
        .context("failed to load configuration")?;
    if let Some(dir) = &cli.session_dir {
        config.session_dir.clone_from(dir);
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenv().ok();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Completion { shell } => {
            commands::completion::generate_completion(*shell);
            return Ok(ExitCode::SUCCESS);
        }
        Commands::Config { format, output } => {
            commands::config::generate_config(format, output.clone())?;
            return Ok(ExitCode::SUCCESS);
        }
        _ => {}
    }

    let config = resolve_config(&cli)?;
    logging::init(&config.log_level);
    let session = Session::open(config)?;

    let code = match cli.command {
        Commands::SignIn(args) => commands::auth::sign_in(&session, args).await?,
        Commands::SignUp(args) => commands::auth::sign_up(&session, args).await?,
        Commands::Home { verify } => commands::home::run(&session, verify).await,
        Commands::Open { path } => commands::home::open(&session, &path),
        Commands::Logout => commands::auth::logout(&session).await,
        Commands::Check => commands::auth::check(&session).await,
        Commands::Completion { .. } | Commands::Config { .. } => ExitCode::SUCCESS,
    };
    Ok(code)
}
