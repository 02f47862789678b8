// SPDX-FileCopyrightText: 2026 Gleanplumb Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gleanplumb - in-app messaging engine.
//!
//! Command-line host that loads message definitions from configuration,
//! selects and records messages, and runs the notification poller.

mod app;
mod commands;
mod platform;
mod shutdown;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::error;

use gleanplumb_config::{ConfigError, PlumbConfig};
use gleanplumb_core::{MessageSurfaceId, MessagingFeatureConfig, PlumbError, TelemetrySink};
use gleanplumb_messaging::LinuxBootId;
use gleanplumb_telemetry::{MetricsTelemetry, PrometheusTelemetry};

use crate::app::App;
use crate::commands::MessageSummary;
use crate::platform::{StdoutLauncher, StdoutNotifier};

/// Gleanplumb - in-app messaging engine.
#[derive(Parser, Debug)]
#[command(name = "gleanplumb", version, about, long_about = None)]
struct Cli {
    /// Configuration file to load instead of the XDG hierarchy.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print output as JSON.
    #[arg(long, global = true)]
    json: bool,

    /// Print Prometheus metrics for the recorded events before exiting.
    #[arg(long, global = true)]
    metrics: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// List eligible messages in selection order.
    Messages,
    /// Pick the next message for a surface and count it as displayed.
    Evaluate {
        #[arg(long, default_value = "homescreen")]
        surface: MessageSurfaceId,
    },
    /// Press a message and open its action.
    Click { id: String },
    /// Dismiss a message.
    Dismiss { id: String },
    /// Post notification messages, once per device boot.
    Poll {
        /// Poll a single time instead of running until interrupted.
        #[arg(long)]
        once: bool,
    },
    /// Show stored per-message metadata.
    Metadata,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let (config, feature) = match load(cli.config.as_deref()) {
        Ok(loaded) => loaded,
        Err(errors) => {
            gleanplumb_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.app.log_level);

    if let Err(e) = run(cli, config, feature).await {
        error!(error = %e, "command failed");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn load(
    path: Option<&std::path::Path>,
) -> Result<(PlumbConfig, MessagingFeatureConfig), Vec<ConfigError>> {
    let config = match path {
        Some(path) => gleanplumb_config::load_and_validate_path(path)?,
        None => gleanplumb_config::load_and_validate()?,
    };
    let feature = gleanplumb_config::resolve_feature(&config.messaging)?;
    Ok((config, feature))
}

async fn run(
    cli: Cli,
    config: PlumbConfig,
    feature: MessagingFeatureConfig,
) -> Result<(), PlumbError> {
    let prometheus = if cli.metrics {
        Some(Arc::new(PrometheusTelemetry::new()?))
    } else {
        None
    };
    let telemetry: Arc<dyn TelemetrySink> = match &prometheus {
        Some(prometheus) => prometheus.clone(),
        None => Arc::new(MetricsTelemetry::new()),
    };

    let app = App::new(config, feature, telemetry);
    let launcher = Arc::new(StdoutLauncher);

    match cli.command {
        Commands::Messages => {
            let messages = commands::list_messages(&app).await?;
            print_messages(&messages, cli.json)?;
        }
        Commands::Evaluate { surface } => match commands::evaluate(&app, surface).await? {
            Some(message) => print_messages(&[MessageSummary::from(&message)], cli.json)?,
            None => println!("no message for {surface}"),
        },
        Commands::Click { id } => {
            commands::click(&app, &id, launcher).await?;
        }
        Commands::Dismiss { id } => {
            commands::dismiss(&app, &id, launcher).await?;
            println!("dismissed {id}");
        }
        Commands::Poll { once } => {
            let cancel = shutdown::install_signal_handler();
            let posted = commands::poll(
                &app,
                once,
                Arc::new(StdoutNotifier),
                launcher,
                Arc::new(LinuxBootId),
                cancel,
            )
            .await?;
            if once && posted.is_none() {
                println!("nothing to post");
            }
        }
        Commands::Metadata => {
            let records = commands::metadata(&app).await?;
            println!("{}", to_json(&records)?);
        }
    }

    app.shutdown().await?;
    if let Some(prometheus) = prometheus {
        print!("{}", prometheus.render());
    }
    Ok(())
}

fn print_messages(messages: &[MessageSummary], json: bool) -> Result<(), PlumbError> {
    if json {
        println!("{}", to_json(messages)?);
        return Ok(());
    }
    for m in messages {
        println!(
            "{:<24} {:<12} priority={:<4} shown={}/{}  {}",
            m.id, m.surface, m.priority, m.display_count, m.max_display_count, m.action
        );
    }
    Ok(())
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, PlumbError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| PlumbError::Internal(format!("failed to render JSON: {e}")))
}

/// Initializes the tracing subscriber with the given log level.
///
/// `RUST_LOG` takes precedence when set.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("gleanplumb={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
