use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use totp_engine::config::Configuration;
use totp_engine::{
    Clock, Code, Enrollment, Error, Result, Secret, SecretStore, SystemClock,
    TotpClock, telemetry,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to `config.yaml`.
    #[clap(long, short, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Generate and store a new secret, then print its provisioning URI.
    Enroll {
        /// Replace the existing secret. The old one is lost.
        #[clap(long, short)]
        force: bool,
    },
    /// Print the provisioning URI of the stored secret.
    Uri,
    /// Print the current code and the seconds it stays valid.
    Code,
    /// Refresh the current code until Ctrl-C.
    Watch,
    /// Check a code against the stored secret.
    Verify { code: String },
}

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(err) = telemetry::init_logging() {
        eprintln!("cannot initialize logging: {err}");
    }

    let args = Args::parse();
    match run(args).await {
        Ok(code) => code,
        Err(err) => {
            tracing::error!(error = %err, "command failed");
            ExitCode::FAILURE
        },
    }
}

async fn run(args: Args) -> Result<ExitCode> {
    let config = Configuration::default()
        .path(args.config.unwrap_or_default())
        .read()?;
    let store = config.store();

    match args.cmd {
        Commands::Enroll { force } => {
            let mut state = store.load()?;
            if state.is_configured() && !force {
                tracing::warn!(
                    "a secret is already configured, use `--force` to replace it"
                );
                return Ok(ExitCode::FAILURE);
            }

            let secret = state.reset(config.totp.secret_length)?.clone();
            store.save(&secret)?;

            let record = config.provisioning(secret)?;
            println!("{}", record.uri());
            println!("secret: {}", record.secret_record().secret_base32);
        },
        Commands::Uri => {
            let secret = load_secret(&store)?;
            println!("{}", config.provisioning(secret)?.uri());
        },
        Commands::Code => {
            let secret = load_secret(&store)?;
            let clock = config.clock()?;
            let now = SystemClock.now();

            println!(
                "{} ({}s)",
                clock.current_code(&secret, now)?,
                clock.remaining_seconds(now)
            );
        },
        Commands::Watch => {
            watch(config.clock()?, load_secret(&store)?).await?;
        },
        Commands::Verify { code } => {
            let secret = load_secret(&store)?;

            if config.verifier()?.check_now(&code, &secret, &SystemClock) {
                tracing::info!("code accepted");
            } else {
                tracing::warn!("code rejected");
                return Ok(ExitCode::FAILURE);
            }
        },
    }

    Ok(ExitCode::SUCCESS)
}

fn load_secret(store: &impl SecretStore) -> Result<Secret> {
    match store.load()? {
        Enrollment::Configured(secret) => Ok(secret),
        Enrollment::Unconfigured => Err(Error::NotConfigured),
    }
}

/// Poll four times per second and print whenever the display changes.
async fn watch(clock: TotpClock, secret: Secret) -> Result<()> {
    let mut interval = tokio::time::interval(Duration::from_millis(250));
    let mut shown: Option<(Code, u64)> = None;

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = interval.tick() => {
                let now = SystemClock.now();
                let current = (
                    clock.current_code(&secret, now)?,
                    clock.remaining_seconds(now),
                );

                if shown.as_ref() != Some(&current) {
                    println!("{} ({:>2}s)", current.0, current.1);
                    shown = Some(current);
                }
            },
        }
    }

    Ok(())
}
