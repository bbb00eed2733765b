//! Command-line interface parsing and handling
//!
//! This module parses command-line arguments, sets up logging and the async
//! runtime, and dispatches to the chat screen or one of the batch commands.

pub mod ask;
pub mod batch;
pub mod space_list;

use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{debug, warn};

use crate::cli::ask::run_ask;
use crate::cli::batch::{run_batch_command, BatchOptions};
use crate::cli::space_list::list_spaces;
use crate::core::config::{project_dirs, Config};
use crate::core::credentials::{exit_with_credential_error, resolve_credentials, ApiCredentials};
use crate::core::spaces::SpaceId;
use crate::ui::chat_loop::run_chat;
use crate::utils::logging::{init_tracing, LogDestination};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "\ncommit: ",
    env!("VERGEN_GIT_DESCRIBE"),
    "\nbuilt: ",
    env!("VERGEN_BUILD_TIMESTAMP"),
    "\nrustc: ",
    env!("VERGEN_RUSTC_SEMVER"),
);

#[derive(Parser)]
#[command(name = "slangit")]
#[command(version, long_version = LONG_VERSION)]
#[command(about = "A terminal client for chatting with Slangit spaces")]
#[command(
    long_about = "Slangit is a terminal client for the Slangit conversational API. The chat \
screen shows three spaces side by side and can broadcast one prompt to all of them; the \
batch command asks a list of questions in several spaces and can save the answers as JSON.\n\n\
Environment Variables:\n\
  SLANGIT_TOKEN     Your Slangit API token (required)\n\
  SLANGIT_BASE_URL  Custom API base URL (optional, defaults to https://mvp.slangit.ai/api)\n\
  RUST_LOG          Log filter, e.g. slangit=debug\n\
A .env file in the working directory is read at startup.\n\n\
Controls:\n\
  Tab/Shift+Tab     Move between panels and the broadcast input\n\
  Ctrl+←/Ctrl+→     Change the project shown in the focused panel\n\
  Enter             Send the message\n\
  Up/Down/PgUp/PgDn Scroll the focused panel\n\
  Backspace         Delete characters in the input field\n\
  Ctrl+C            Quit the application"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Append chat transcripts to the specified file
    #[arg(short = 'l', long, global = true)]
    pub log: Option<String>,

    /// API base URL, overriding SLANGIT_BASE_URL and the config file
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Start the chat interface (default)
    Chat,
    /// Ask one question in one space and print the reply
    Ask {
        /// Space to ask
        #[arg(short = 's', long)]
        space: SpaceId,
        /// The question
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        prompt: Vec<String>,
    },
    /// Ask a list of questions in several spaces
    Batch {
        /// Spaces to ask; repeat the flag or separate ids with commas
        #[arg(short = 's', long = "space", required = true, value_delimiter = ',')]
        spaces: Vec<SpaceId>,
        /// File with one question per line
        #[arg(short = 'f', long)]
        questions_file: Option<PathBuf>,
        /// Question to ask (repeatable)
        #[arg(short = 'q', long = "question")]
        questions: Vec<String>,
        /// Save the results as JSON
        #[arg(long)]
        save: bool,
        /// File name prefix for saved results
        #[arg(long, requires = "save")]
        prefix: Option<String>,
        /// Directory for saved results
        #[arg(short = 'o', long, requires = "save")]
        output_dir: Option<PathBuf>,
        /// Number of spaces processed at once
        #[arg(short = 'j', long)]
        jobs: Option<usize>,
    },
    /// List the spaces the chat screen offers
    Spaces,
    /// Set configuration values
    Set {
        /// Configuration key to set
        key: String,
        /// Value to set for the key
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        value: Vec<String>,
    },
    /// Unset configuration values
    Unset {
        /// Configuration key to unset
        key: String,
    },
    /// Show the current configuration
    Config,
}

pub fn main() -> Result<(), Box<dyn Error>> {
    // A missing .env is fine.
    let dotenv = dotenvy::dotenv();
    let args = Args::parse();

    init_logging(args.command.as_ref());
    if let Ok(path) = dotenv {
        debug!(path = %path.display(), "loaded .env");
    }

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async_main(args))
}

/// The chat screen owns the terminal, so its logs go to a file.
fn init_logging(command: Option<&Commands>) {
    let destination = match command {
        None | Some(Commands::Chat) => match project_dirs() {
            Some(dirs) => LogDestination::File(dirs.data_local_dir().join("slangit.log")),
            None => return,
        },
        Some(_) => LogDestination::Stderr,
    };
    let default_directive = match destination {
        LogDestination::File(_) => "info",
        LogDestination::Stderr => "warn",
    };
    if let Err(err) = init_tracing(destination, default_directive) {
        eprintln!("⚠️  Logging disabled: {err}");
    }
}

fn credentials_or_exit(config: &Config, base_url: Option<&str>) -> ApiCredentials {
    match resolve_credentials(config, base_url) {
        Ok(credentials) => credentials,
        Err(err) => exit_with_credential_error(&err),
    }
}

async fn async_main(args: Args) -> Result<(), Box<dyn Error>> {
    let Args {
        command,
        log,
        base_url,
    } = args;

    match command.unwrap_or(Commands::Chat) {
        Commands::Chat => {
            let config = Config::load()?;
            let credentials = credentials_or_exit(&config, base_url.as_deref());
            run_chat(config, credentials, log).await
        }
        Commands::Ask { space, prompt } => {
            let config = Config::load()?;
            let credentials = credentials_or_exit(&config, base_url.as_deref());
            run_ask(space, prompt, &config, credentials).await
        }
        Commands::Batch {
            spaces,
            questions_file,
            questions,
            save,
            prefix,
            output_dir,
            jobs,
        } => {
            let config = Config::load()?;
            let credentials = credentials_or_exit(&config, base_url.as_deref());
            let options = BatchOptions {
                spaces,
                questions_file,
                questions,
                save,
                prefix,
                output_dir,
                jobs,
            };
            run_batch_command(options, &config, credentials).await
        }
        Commands::Spaces => {
            let config = Config::load()?;
            list_spaces(&config);
            Ok(())
        }
        Commands::Set { key, value } => {
            let mut config = Config::load()?;
            if value.is_empty() {
                config.print_all();
                return Ok(());
            }
            let value = value.join(" ");
            if let Err(message) = config.set_value(&key, &value) {
                eprintln!("❌ {message}");
                std::process::exit(1);
            }
            config.save()?;
            println!("✅ Set {key} to: {value}");
            Ok(())
        }
        Commands::Unset { key } => {
            let mut config = Config::load()?;
            if let Err(message) = config.unset_value(&key) {
                eprintln!("❌ {message}");
                std::process::exit(1);
            }
            config.save()?;
            println!("✅ Unset {key}");
            Ok(())
        }
        Commands::Config => {
            let config = Config::load()?;
            match Config::get_config_path() {
                Ok(path) => println!("Config file: {}\n", path.display()),
                Err(err) => warn!(error = %err, "could not resolve config path"),
            }
            config.print_all();
            Ok(())
        }
    }
}
