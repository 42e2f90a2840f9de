use bloss_bridge::{BlossClient, BridgeConfig};
use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

#[derive(Parser)]
#[command(version, about = "List OpenPGP cards and sign messages through the Bloss native helper")]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, env = "BLOSS_CONFIG")]
    config: Option<PathBuf>,

    /// Launch this helper executable instead of looking up its manifest
    #[arg(long)]
    executable: Option<PathBuf>,

    /// Native messaging host name to look up
    #[arg(long)]
    host_name: Option<String>,

    /// Give up after this many seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Debug level output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the cards the helper can see
    List,

    /// Sign a message with a card
    #[command(group(clap::ArgGroup::new("input").required(true).args(["message", "hex"])))]
    Sign {
        /// Application ID of the card, as printed by `list`
        #[arg(long)]
        aid: String,

        /// Message to sign, as UTF-8 text
        #[arg(long)]
        message: Option<String>,

        /// Message to sign, as a hex string
        #[arg(long)]
        hex: Option<String>,
    },
}

fn setup_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_writer(io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<BridgeConfig, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => BridgeConfig::load(path)?,
        None => BridgeConfig::default(),
    };
    if let Some(exe) = &cli.executable {
        config.executable = Some(exe.clone());
    }
    if let Some(name) = &cli.host_name {
        config.host_name = name.clone();
    }
    if let Some(secs) = cli.timeout {
        config.request_timeout_secs = Some(secs);
        config.sign_timeout_secs = Some(secs);
    }
    Ok(config)
}

/// PIN from `BLOSS_PIN`, or one line from stdin.
fn read_pin() -> io::Result<Vec<u8>> {
    if let Ok(pin) = std::env::var("BLOSS_PIN") {
        return Ok(pin.into_bytes());
    }
    eprint!("PIN: ");
    io::stderr().flush()?;
    pin_from_line(io::stdin().lock())
}

fn pin_from_line(mut input: impl BufRead) -> io::Result<Vec<u8>> {
    let mut line = zeroize::Zeroizing::new(String::new());
    input.read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).as_bytes().to_vec())
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(&cli)?;
    let client = BlossClient::from_config(&config)?;
    info!(
        host = %config.host_name,
        program = %client.transport().program().display(),
        "using native host"
    );

    match cli.command {
        Commands::List => {
            let cards = client.list_cards().await?;
            println!("{}", serde_json::to_string_pretty(&cards)?);
        }
        Commands::Sign {
            aid,
            message,
            hex: hex_message,
        } => {
            let message = match (message, hex_message) {
                (Some(text), _) => text.into_bytes(),
                (None, Some(h)) => hex::decode(h)?,
                (None, None) => return Err("nothing to sign".into()),
            };
            let pin = zeroize::Zeroizing::new(read_pin()?);
            let signature = client
                .sign_message(&aid, &message, &pin, || {
                    eprintln!("Touch your card to confirm the signature...");
                })
                .await?;
            println!("{}", hex::encode(signature));
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<bloss_bridge::Error>() {
                Some(err) => match err.details() {
                    Some(details) if !details.is_null() => {
                        eprintln!("error [{}]: {err} {details}", err.kind())
                    }
                    _ => eprintln!("error [{}]: {err}", err.kind()),
                },
                None => eprintln!("error: {e}"),
            }
            ExitCode::FAILURE
        }
    }
}
