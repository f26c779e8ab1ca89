//! Returns Notifier
//!
//! Command-line front end for the return-notification workflow. Reads one
//! event payload (file or stdin), runs it against a JSON reference
//! directory and prints the per-channel delivery report as JSON.
//!
//! ## Modules
//!
//! - `config`: environment detection and tracing setup
//! - `dry_run`: transports that only log

pub mod config;
pub mod dry_run;

use clap::Parser;
use config::{Environment, init_tracing, install_color_eyre};
use domain_return_notifications::providers::{
    HttpNotificationManager, SmtpConfig, SmtpMessagesClient,
};
use domain_return_notifications::{
    DispatchMode, InMemoryDirectory, MessagesClient, NotificationManager,
    ReturnNotificationConfig, ReturnOperation, TemplateCatalog,
};
use dry_run::{LoggingMessagesClient, LoggingNotificationManager};
use eyre::{Result, WrapErr};
use serde_json::Value;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};

/// Exit status for rejected events.
pub const EXIT_REJECTED: i32 = 2;

#[derive(Debug, Parser)]
#[command(name = "returns-notifier")]
#[command(about = "Notify employees and clients about a goods-return status change")]
pub struct Cli {
    /// Event payload as a JSON object. `-` reads stdin.
    #[arg(short, long, default_value = "-")]
    pub event: String,

    /// Reference directory (resellers, employees, clients, permits, statuses).
    #[arg(short, long)]
    pub directory: PathBuf,

    /// Extra templates as `{ "<locale>": { "<key>": "<template>" } }`.
    #[arg(short, long)]
    pub templates: Option<PathBuf>,

    /// Log messages instead of delivering them.
    #[arg(long)]
    pub dry_run: bool,

    /// Run channels one after another instead of concurrently.
    #[arg(long)]
    pub sequential: bool,
}

/// Parse an event payload.
pub fn parse_payload(text: &str) -> Result<Value> {
    serde_json::from_str(text).wrap_err("Event payload is not valid JSON")
}

/// Read an event payload from a file, or from stdin when `source` is `-`.
pub fn load_payload(source: &str) -> Result<Value> {
    let text = if source == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .wrap_err("Failed to read event from stdin")?;
        buffer
    } else {
        std::fs::read_to_string(source)
            .wrap_err_with(|| format!("Failed to read event file {}", source))?
    };
    parse_payload(&text)
}

fn load_templates(catalog: &mut TemplateCatalog, path: &Path) -> Result<()> {
    let json = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read templates {}", path.display()))?;
    catalog
        .register_json(&json)
        .wrap_err_with(|| format!("Invalid templates in {}", path.display()))
}

/// Wire the workflow from command-line options and the environment.
pub fn build_operation(cli: &Cli) -> Result<ReturnOperation> {
    let directory = InMemoryDirectory::from_path(&cli.directory)
        .wrap_err_with(|| format!("Failed to load directory {}", cli.directory.display()))?;

    let mut catalog = TemplateCatalog::new()?;
    if let Some(path) = &cli.templates {
        load_templates(&mut catalog, path)?;
    }
    for (reseller_id, locale) in directory.reseller_locales() {
        catalog = catalog.with_reseller_locale(reseller_id, locale);
    }

    let (messages, notifications): (Arc<dyn MessagesClient>, Arc<dyn NotificationManager>) =
        if cli.dry_run {
            (
                Arc::new(LoggingMessagesClient),
                Arc::new(LoggingNotificationManager),
            )
        } else {
            (
                Arc::new(SmtpMessagesClient::new(SmtpConfig::from_env())?),
                Arc::new(
                    HttpNotificationManager::from_env()
                        .wrap_err("SMS gateway is not configured")?,
                ),
            )
        };

    let mut config = ReturnNotificationConfig::from_env();
    if cli.sequential {
        config = config.with_dispatch_mode(DispatchMode::Sequential);
    }

    info!(
        dry_run = cli.dry_run,
        email = messages.name(),
        sms = notifications.name(),
        dispatch_mode = ?config.dispatch_mode,
        "Return notifier configured"
    );

    let directory = Arc::new(directory);
    Ok(ReturnOperation::new(
        directory.clone(),
        directory.clone(),
        directory,
        Arc::new(catalog),
        messages,
        notifications,
    )
    .with_config(config))
}

pub async fn run() -> Result<()> {
    install_color_eyre();
    init_tracing(&Environment::from_env());

    let cli = Cli::parse();
    let operation = build_operation(&cli)?;
    let payload = load_payload(&cli.event)?;

    match operation.do_operation(&payload).await {
        Ok(outcome) => {
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            Ok(())
        }
        Err(e) if e.is_client_error() => {
            error!(error = %e, status = e.status_code(), "Event rejected");
            eprintln!("{}", e);
            std::process::exit(EXIT_REJECTED);
        }
        Err(e) => Err(e).wrap_err("Return notification failed"),
    }
}
