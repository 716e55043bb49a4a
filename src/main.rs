mod config;
mod decode;
mod notification;

use config::{BarkConfig, Env};
use notification::{BarkNotifier, DryRunNotifier, Notification, Notifier};
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{Level, debug, error, info};
use tracing_subscriber::{EnvFilter, fmt};

const DEFAULT_PREFIX: &str = "PLUGIN";
const DEFAULT_ENV_FILE: &str = "/run/drone/env";

/// Command line options.
#[derive(Debug, Clone, PartialEq)]
struct Args {
    dry_run: bool,
    prefix: String,
    env_file: PathBuf,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Args {
    let mut parsed = Args {
        dry_run: false,
        prefix: DEFAULT_PREFIX.to_string(),
        env_file: PathBuf::from(DEFAULT_ENV_FILE),
    };

    for arg in args {
        if arg == "--dry-run" {
            parsed.dry_run = true;
        } else if let Some(prefix) = arg.strip_prefix("--prefix=") {
            parsed.prefix = prefix.to_string();
        } else if let Some(path) = arg.strip_prefix("--env-file=") {
            parsed.env_file = PathBuf::from(path);
        }
    }

    parsed
}

fn init_tracing(log_level: Option<&str>) {
    let level = match log_level {
        Some("debug") => Level::DEBUG,
        Some("info") => Level::INFO,
        Some("warn") | Some("warning") => Level::WARN,
        Some("error") => Level::ERROR,
        Some("trace") => Level::TRACE,
        _ => Level::INFO,
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let args = parse_args(env::args().skip(1));

    let env = match Env::load(&args.env_file) {
        Ok(env) => env,
        Err(e) => {
            eprintln!("Failed to load environment: {}", e);
            return ExitCode::FAILURE;
        }
    };

    init_tracing(env.log_level());

    if env.is_debug() {
        let mut keys: Vec<_> = env.vars().keys().collect();
        keys.sort();
        for key in keys {
            debug!("{} = {}", key, env.vars()[key]);
        }
    }

    let config = match BarkConfig::load(&env, &args.prefix) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, prefix = %args.prefix, "Failed to load config");
            return ExitCode::FAILURE;
        }
    };

    let notifier: Box<dyn Notifier> = if args.dry_run {
        Box::new(DryRunNotifier::new(&config))
    } else {
        match BarkNotifier::new(&config) {
            Ok(notifier) => Box::new(notifier),
            Err(e) => {
                error!(error = %e, "Failed to create notifier");
                return ExitCode::FAILURE;
            }
        }
    };

    info!(
        notifier = notifier.name(),
        devices = config.token.len(),
        "Sending notification"
    );

    match notifier.send(&Notification::from_config(&config)).await {
        Ok(()) => {
            info!("Notification sent");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Notification failed");
            ExitCode::FAILURE
        }
    }
}
