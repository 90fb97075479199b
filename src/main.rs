use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use reward_fleet::account::{CredentialSource, FileSource, build_accounts};
use reward_fleet::cli::{Cli, Commands, ConfigAction, Display, OutputFormat, SourceArgs};
use reward_fleet::config::FleetConfig;
use reward_fleet::error::{FleetError, Result};
use reward_fleet::notification::Notifier;
use reward_fleet::presenter::{JsonMode, JsonPresenter, Presenter, TerminalPresenter};
use reward_fleet::remote::HttpClientFactory;
use reward_fleet::supervisor::{Shutdown, Supervisor, check_credentials};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            Display::new().print_error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr; stdout carries the table or JSON.
fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("reward_fleet=debug")
        } else {
            EnvFilter::new("reward_fleet=info")
        }
    });

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let display = Display::new();
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Run {
            source,
            claim_daily,
            validate,
        } => {
            let mut config = FleetConfig::load(config_path).await?;
            config.worker.claim_daily_reward |= claim_daily;
            config.worker.validate_on_start |= validate;
            cmd_run(&display, cli.output, config, &source).await
        }
        Commands::Check { source } => {
            let config = FleetConfig::load(config_path).await?;
            cmd_check(&display, cli.output, config, &source).await
        }
        Commands::Config { action } => cmd_config(&display, cli.output, config_path, action).await,
    }
}

async fn cmd_run(
    display: &Display,
    output: OutputFormat,
    config: FleetConfig,
    source: &SourceArgs,
) -> Result<()> {
    let source = FileSource::new(&source.tokens, source.proxies_path());

    let presenter: Arc<dyn Presenter> = match output {
        OutputFormat::Text => Arc::new(TerminalPresenter::new(&config.presenter)),
        OutputFormat::Json => Arc::new(JsonPresenter::stdout(JsonMode::Document)),
        OutputFormat::Stream => Arc::new(JsonPresenter::stdout(JsonMode::Lines)),
    };
    let factory = Arc::new(HttpClientFactory::new(config.remote.clone()));
    let notifier = Arc::new(Notifier::new(config.notification.clone()));

    let shutdown = Shutdown::new();
    shutdown.trigger_on_signals();

    let supervisor = Supervisor::new(config, factory, notifier, presenter);
    let snapshot = supervisor.run(&source, &shutdown).await?;

    if snapshot.records.is_empty() && output == OutputFormat::Text {
        display.print_warning("No credentials loaded; add one per line to the tokens file.");
    }
    Ok(())
}

async fn cmd_check(
    display: &Display,
    output: OutputFormat,
    config: FleetConfig,
    source: &SourceArgs,
) -> Result<()> {
    let source = FileSource::new(&source.tokens, source.proxies_path());
    let credentials = source.load_credentials().await?;
    let proxies = source.load_proxies().await?;
    let accounts = build_accounts(&credentials, &proxies);
    let factory = HttpClientFactory::new(config.remote);

    let checks = if output == OutputFormat::Text {
        let spinner = display.create_spinner(&format!("Checking {} credentials...", accounts.len()));
        let checks = check_credentials(&accounts, &factory).await;
        spinner.finish_and_clear();
        checks
    } else {
        check_credentials(&accounts, &factory).await
    };

    match output {
        OutputFormat::Text => {
            display.print_header("Credential check");
            display.print_check_table(&checks);
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&checks)?),
        OutputFormat::Stream => {
            for check in &checks {
                println!("{}", serde_json::to_string(check)?);
            }
        }
    }

    if checks.iter().any(|c| !c.verdict.is_valid()) {
        let failed = checks.iter().filter(|c| !c.verdict.is_valid()).count();
        return Err(FleetError::Other(format!(
            "{} of {} credentials failed validation",
            failed,
            checks.len()
        )));
    }
    Ok(())
}

async fn cmd_config(
    display: &Display,
    output: OutputFormat,
    config_path: Option<&Path>,
    action: ConfigAction,
) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = FleetConfig::load(config_path).await?;
            match output {
                OutputFormat::Text => println!("{}", toml::to_string_pretty(&config)?),
                OutputFormat::Json | OutputFormat::Stream => {
                    println!("{}", serde_json::to_string_pretty(&config)?)
                }
            }
        }
        ConfigAction::Init { path, force } => {
            if path.exists() && !force {
                return Err(FleetError::Config(format!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                )));
            }
            FleetConfig::default().save(&path).await?;
            if output == OutputFormat::Text {
                display.print_success(&format!("Wrote default configuration to {}", path.display()));
            }
        }
    }

    Ok(())
}
