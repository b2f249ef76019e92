use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tokio::io::BufReader;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use science_helper::cli::{ask, run_chat, Commands};
use science_helper::{
    ApiCredential, ChatSession, CompletionService, MockCompletion, OpenAiClient, MISSING_KEY_MESSAGE,
};

#[derive(Parser)]
#[command(name = "science-helper")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(short, long, global = true)]
    verbose: bool,

    /// TOML file holding OPENAI_API_KEY, consulted when the environment has none
    #[arg(long, global = true, default_value = "~/.science-helper/secrets.toml")]
    secrets_file: String,

    /// Answer from a canned offline backend instead of the OpenAI API
    #[arg(long, global = true)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let completion_service: Arc<dyn CompletionService> = if cli.mock {
        info!("Using mock completion service");
        Arc::new(MockCompletion::new())
    } else {
        let secrets_path = PathBuf::from(expand_tilde(&cli.secrets_file));
        let credential = match ApiCredential::load(Some(secrets_path.as_path())) {
            Ok(credential) => credential,
            Err(_) => {
                eprintln!("{}", MISSING_KEY_MESSAGE);
                std::process::exit(1);
            }
        };
        info!(
            "Using OpenAI completion service at {}",
            OpenAiClient::configured_base_url()
        );
        Arc::new(OpenAiClient::from_credential(&credential))
    };

    let mut session = ChatSession::new(completion_service);
    let mut stdout = tokio::io::stdout();

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => {
            let stdin = BufReader::new(tokio::io::stdin());
            run_chat(&mut session, stdin, &mut stdout).await?;
        }

        Commands::Ask { question } => {
            if question.trim().is_empty() {
                anyhow::bail!("question must not be empty");
            }
            let answered = ask(&mut session, &question, &mut stdout).await?;
            if !answered {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

fn expand_tilde(path: &str) -> String {
    if path == "~" || path.starts_with("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            if path == "~" {
                return home.to_string_lossy().to_string();
            }
            return path.replacen("~", &home.to_string_lossy(), 1);
        }
    }
    path.to_string()
}
