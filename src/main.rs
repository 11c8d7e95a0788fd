//! Atlas Server - Entry Point
//!
//! Serves a directory over WebDAV behind basic authentication and manages
//! the users allowed in.

use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use atlas_dav_server::Server;
use atlas_dav_server::auth::CredentialStore;
use atlas_dav_server::config::{ConfigOverrides, ServerConfig};
use atlas_dav_server::error::AtlasError;
use atlas_dav_server::error::handlers::{exit_code, handle_error};
use atlas_dav_server::utils::logging::setup_logging;

#[derive(Parser, Debug)]
#[command(name = "atlas", about = "Atlas storage server")]
struct Cli {
    /// Config file (default: ~/.atlas.*, then atlas.* or .atlas.* in the working directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the storage server
    Server {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Directory to store data files
        #[arg(short, long)]
        data_dir: Option<String>,

        /// Storage quota reported to clients (e.g. 2G, 512M)
        #[arg(long)]
        quota: Option<String>,
    },
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand, Debug)]
enum UserAction {
    /// Add a new user
    Add { username: String, password: String },
    /// Remove a user
    Rm { username: String },
    /// List all users
    Ls,
}

#[tokio::main]
async fn main() -> ExitCode {
    setup_logging();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            handle_error(&e);
            ExitCode::from(exit_code(&e))
        }
    }
}

fn load_config(overrides: &ConfigOverrides) -> Result<ServerConfig, AtlasError> {
    let config = ServerConfig::load(overrides)?;
    if let Some(path) = config.config_file() {
        info!("Using config file: {}", path.display());
    }
    Ok(config)
}

async fn run(cli: Cli) -> Result<(), AtlasError> {
    let mut overrides = ConfigOverrides {
        config_file: cli.config,
        ..Default::default()
    };

    match cli.command {
        Commands::Server {
            port,
            data_dir,
            quota,
        } => {
            overrides.port = port;
            overrides.data_dir = data_dir;
            overrides.quota = quota;

            let config = load_config(&overrides)?;
            let store = Arc::new(CredentialStore::open(config.users_file())?);

            info!("Launching Atlas server...");
            Server::new(config, store).start().await
        }
        Commands::User { action } => {
            let config = load_config(&overrides)?;
            let store = CredentialStore::open(config.users_file())?;
            manage_users(&store, action)
        }
    }
}

fn manage_users(store: &CredentialStore, action: UserAction) -> Result<(), AtlasError> {
    match action {
        UserAction::Add { username, password } => {
            store.add(&username, &password)?;
            store.save()?;
            println!("User {} created successfully.", username);
        }
        UserAction::Rm { username } => {
            store.delete(&username);
            store.save()?;
            println!("User {} removed (if existed).", username);
        }
        UserAction::Ls => {
            let mut users = store.list();
            if users.is_empty() {
                println!("No users found.");
                return Ok(());
            }
            users.sort();
            println!("Users:");
            for user in users {
                println!("- {}", user);
            }
        }
    }
    Ok(())
}
