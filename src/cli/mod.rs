//! Command-line interface parsing and handling
//!
//! This module handles parsing command-line arguments and executing the appropriate commands.

pub mod auth;
pub mod say;
pub mod settings;


use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::cli::auth::{run_auth, run_deauth};
use crate::cli::say::run_say;
use crate::cli::settings::apply_setting;
use crate::core::app::setup::StartupOptions;
use crate::core::config::Config;
use crate::ui::chat_loop::run_chat;
use crate::utils::logging::init_tracing;

#[derive(Parser)]
#[command(name = "geechat")]
#[command(about = "A terminal chat client for Google Gemini")]
#[command(
    long_about = "GeeChat is a full-screen terminal chat client for Google Gemini. Replies \
stream in as they are generated, the API key lives in your system keyring, and an idle \
clock takes over the screen when you step away.\n\n\
Authentication:\n\
  Use 'geechat auth' to verify and store a Gemini API key, or set one from the\n\
  settings panel (F2) inside the chat.\n\n\
Environment Variables:\n\
  GEMINI_API_KEY    API key used with --env-only (the keyring is never touched)\n\
  GEECHAT_LOG       Filter for --debug-log output (default: info)\n\n\
Controls:\n\
  Enter             Send the message\n\
  Alt+Enter         Insert a newline\n\
  Alt+1..Alt+5      Insert a suggestion prefix (EO, INV, CL, CF, QS)\n\
  PgUp/PgDn/Mouse   Scroll through the conversation\n\
  F2 / Ctrl+S       Open settings\n\
  Ctrl+T            Toggle light/dark theme\n\
  Esc               Close settings or dismiss the error banner\n\
  Ctrl+C            Quit the application"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Read the API key from GEMINI_API_KEY instead of the keyring
    #[arg(long, global = true)]
    pub env_only: bool,

    /// Write diagnostics to the given file
    #[arg(long, global = true, value_name = "FILE")]
    pub debug_log: Option<PathBuf>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Start the chat interface (default)
    Chat,
    /// Verify a Gemini API key and store it in the system keyring
    Auth,
    /// Remove the stored Gemini API key
    Deauth,
    /// Send one message and stream the reply to stdout
    Say {
        /// Message to send (multiple words are joined with spaces)
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        message: Vec<String>,
    },
    /// Set a configuration value (theme, model, base-url, idle-timeout-ms)
    Set {
        /// Configuration key to set
        key: String,
        /// Value to set for the key
        value: Option<String>,
    },
    /// Print the current configuration
    Config,
}

impl Args {
    pub fn startup_options(&self) -> StartupOptions {
        StartupOptions {
            env_only: self.env_only,
        }
    }
}

pub fn main() -> Result<(), Box<dyn Error>> {
    tokio::runtime::Runtime::new()?.block_on(async_main())
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    if let Some(path) = args.debug_log.as_deref() {
        init_tracing(path)?;
    }

    let options = args.startup_options();
    match args.command.unwrap_or(Commands::Chat) {
        Commands::Chat => run_chat(options).await,
        Commands::Auth => run_auth(options).await,
        Commands::Deauth => run_deauth(),
        Commands::Say { message } => run_say(message, options).await,
        Commands::Set { key, value } => {
            let path = Config::config_path()?;
            let mut config = Config::load_from_path(&path)?;
            match apply_setting(&mut config, &key, value.as_deref()) {
                Ok(message) => {
                    config.save_to_path(&path)?;
                    println!("✅ {message}");
                    Ok(())
                }
                Err(err) => {
                    eprintln!("❌ {err}");
                    std::process::exit(1);
                }
            }
        }
        Commands::Config => {
            let path = Config::config_path()?;
            let config = Config::load_from_path(&path)?;
            config.print_all(Some(&path));
            Ok(())
        }
    }
}
