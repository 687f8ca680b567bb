use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use dynserve::{lifecycle, Config, Registry, Shared, StoreKind};
use is_terminal::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// dynserve - static files, JSON echo and ad-hoc dynamic endpoints over HTTP
#[derive(Parser, Debug)]
#[command(name = "dynserve")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve a directory and accept dynamic endpoints
    Serve(ServeArgs),
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Directory to serve, takes precedence over --path
    #[arg(value_name = "DIR")]
    dir: Option<PathBuf>,

    /// Directory to serve [default: .]
    #[arg(long, value_name = "DIR")]
    path: Option<PathBuf>,

    /// Allow serving dotfiles
    #[arg(long)]
    dotfiles: bool,

    /// Port for the HTTP server [default: 8000]
    #[arg(short, long)]
    port: Option<u16>,

    /// JSON config file, overridden by any flags given
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Where dynamic endpoint content is kept [default: tempfile]
    #[arg(long, value_enum)]
    store: Option<StoreKind>,

    /// Directory for dynamic endpoint temp files [default: OS temp dir]
    #[arg(long, value_name = "DIR")]
    temp_dir: Option<PathBuf>,

    /// Per-request timeout in seconds [default: 15]
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_init();

    let Command::Serve(args) = Cli::parse().command;
    let config = config_init(args)?;
    let registry = Arc::new(Registry::from_config(&config));

    tracing::info!(
        "serving {} on {} (dotfiles {})",
        config.root.display(),
        config.bind_addr(),
        if config.dotfiles { "allowed" } else { "blocked" },
    );
    let api_server = dynserve::api::new(config.clone(), registry.clone())?;
    let api_handle = tokio::spawn(api_server);

    let result = tokio::select! {
        signal = lifecycle::shutdown_signal() => {
            signal.map(|name| tracing::info!("quitting from {name}")).map_err(anyhow::Error::from)
        },
        api_res = api_handle => match api_res {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => Err(anyhow::Error::from(err).context("HTTP server failed")),
            Err(err) => Err(err.into()),
        },
    };

    lifecycle::turn_down(&registry).await;
    tracing::info!("goodbye");
    result
}

fn tracing_init() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_ansi(std::io::stderr().is_terminal()))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dynserve=info,tower_http=info".into()),
        )
        .init();
}

fn config_init(args: ServeArgs) -> Result<Shared> {
    let mut config = match &args.config {
        None => Config::default(),
        Some(config_file) => {
            let config = Config::try_from_file(config_file)
                .with_context(|| format!("loading config from {}", config_file.display()))?;
            tracing::debug!("loaded config from {}", config_file.display());
            config
        }
    };

    if let Some(root) = args.dir.or(args.path) {
        config.root = root;
    }
    config.dotfiles |= args.dotfiles;
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(store) = args.store {
        config.store = store;
    }
    if let Some(temp_dir) = args.temp_dir {
        config.temp_dir = Some(temp_dir);
    }
    if let Some(timeout) = args.timeout {
        config.timeout = Duration::from_secs(timeout);
    }

    config.validate()?;
    Ok(Arc::new(config))
}
