use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::io::BufReader;
use tokio::sync::watch;

use befri::application::errors::{BotError, ConfigError};
use befri::application::scheduler::TaskScheduler;
use befri::application::state::{release_channel, BotState, NAME, VERSION};
use befri::extensions;
use befri::infrastructure::adapters::{console::ConsoleAdapter, discord};
use befri::infrastructure::config::{env, Config, Design};
use befri::infrastructure::i18n::LocalizationProvider;
use befri::infrastructure::logging;

#[derive(Parser)]
#[command(name = "befri")]
#[command(about = "A multifunctional Discord bot", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file path
    #[arg(short, long, default_value = "config.yml")]
    config: PathBuf,

    /// Design file path
    #[arg(short, long, default_value = "design.yml")]
    design: PathBuf,

    /// Folder with localization packages
    #[arg(short, long, default_value = "languages")]
    languages: PathBuf,

    /// Environment file path
    #[arg(short, long, default_value = ".env")]
    env: PathBuf,

    /// Bot token (overrides BOT_TOKEN)
    #[arg(short, long)]
    token: Option<String>,
}

#[derive(Subcommand, Clone, Copy, PartialEq, Eq)]
enum Commands {
    /// Start the bot
    Run,
    /// Run commands from stdin (dev mode)
    Console,
    /// Show version
    Version,
    /// Print the default config
    InitConfig,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Version => {
            println!("{} v{} ({} channel)", NAME.to_lowercase(), VERSION, release_channel(VERSION));
            ExitCode::SUCCESS
        }
        Commands::InitConfig => match Config::default().to_yaml() {
            Ok(yaml) => {
                print!("{}", yaml);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("{}", e);
                ExitCode::FAILURE
            }
        },
        Commands::Run => run(&cli, false).await,
        Commands::Console => run(&cli, true).await,
    }
}

async fn run(cli: &Cli, console: bool) -> ExitCode {
    let (config, design) = match load_files(cli) {
        Ok(files) => files,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let guard = match logging::init(&config.logger) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to set up logging: {}", e);
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(target: "launcher", "Starting {} v{} ({} channel)", NAME, VERSION, release_channel(VERSION));
    if let Some(file) = &guard.file {
        tracing::debug!(target: "launcher", "Writing logs to {}", file.display());
    }
    if !cli.config.exists() {
        tracing::warn!(target: "launcher", "{} not found, using the default config", cli.config.display());
    }
    if !cli.design.exists() {
        tracing::warn!(target: "launcher", "{} not found, messages will have no colours or emojis", cli.design.display());
    }

    match serve(cli, config, design, console).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(BotError::Auth(_)) => {
            tracing::error!(target: "launcher", "An incorrect token was passed. Check BOT_TOKEN or --token");
            ExitCode::FAILURE
        }
        Err(e) => {
            tracing::error!(target: "launcher", "{}", e);
            ExitCode::FAILURE
        }
    }
}

/// `.env`, design and config; missing design and config files fall back to defaults
fn load_files(cli: &Cli) -> Result<(Config, Design), ConfigError> {
    env::load_dotenv(&cli.env)?;

    let design = if cli.design.exists() {
        Design::load(&cli.design)?
    } else {
        Design::default()
    };
    let config = if cli.config.exists() {
        Config::load(&cli.config)?
    } else {
        Config::default()
    };
    Ok((config, design))
}

async fn serve(cli: &Cli, config: Config, design: Design, console: bool) -> Result<(), BotError> {
    let mut i18n = LocalizationProvider::new();
    match i18n.scan(&cli.languages) {
        Ok(count) => tracing::info!(target: "launcher", "Loaded {} localization packages", count),
        Err(e) => tracing::error!(target: "launcher", "Failed to load localization packages: {}", e),
    }

    let state = Arc::new(BotState::new(config, design, i18n));
    for extension in extensions::builtin() {
        let disabled = state.config.is_extension_disabled(extension.id());
        state.loader_mut()?.register(extension, disabled);
    }
    let loaded = state.load_extensions()?;
    let commands = state.loader()?.commands().len();
    tracing::info!(target: "launcher", "Loaded {} extensions with {} commands", loaded, commands);

    let (shutdown, receiver) = watch::channel(false);
    let scheduler = TaskScheduler::new(state.clone()).spawn(receiver);

    let result = if console {
        Arc::new(ConsoleAdapter::new())
            .run(state.clone(), BufReader::new(tokio::io::stdin()))
            .await
            .map(|_| ())
    } else {
        match env::bot_token(cli.token.clone()) {
            Ok(token) => discord::start(&token, state.clone()).await,
            Err(e) => Err(e.into()),
        }
    };

    let _ = shutdown.send(true);
    if let Err(e) = scheduler.await {
        tracing::error!(target: "scheduler", "Task scheduler panicked: {}", e);
    }
    result
}
