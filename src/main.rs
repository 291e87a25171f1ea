use clap::{Parser, Subcommand};
use review_orchestrator::config::{NotifierKind, RecipientGroup};
use review_orchestrator::extraction::{CommandGateway, load_dataset};
use review_orchestrator::orchestrator::INTERRUPTED;
use review_orchestrator::reports::{generate_report, producer_from_config};
use review_orchestrator::run_log::RunLog;
use review_orchestrator::{Category, Config, Orchestrator, ReportStatus, RunStatus, logging};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

const EXIT_OK: u8 = 0;
const EXIT_FAILED: u8 = 1;
const EXIT_INTERRUPTED: u8 = 130;

const DEFAULT_CONFIG_FILE: &str = "review.toml";
const DEFAULT_ENV_FILE: &str = "credentials.env";

/// Annual credit review workflow
#[derive(Debug, Parser)]
#[command(name = "review-orchestrator", version, about)]
struct Cli {
    /// TOML configuration file (default: review.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Credentials file in dotenv format (default: credentials.env when present)
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the full workflow once
    Run,
    /// Generate one category's report from a dataset file
    Generate {
        /// Category: a (auto finance) or b (three wheeler)
        category: Category,
        /// Dataset file to read
        #[arg(long)]
        dataset: PathBuf,
        /// Where to write the report
        #[arg(long)]
        output: PathBuf,
    },
    /// Show the resolved configuration and recipient counts
    CheckConfig,
    /// Print recent runs from the run log
    History {
        /// Number of runs to show
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config_file = cli.config.or_else(|| existing(DEFAULT_CONFIG_FILE));
    let env_file = cli.env_file.or_else(|| existing(DEFAULT_ENV_FILE));
    let config = match Config::load(config_file.as_deref(), env_file.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(EXIT_FAILED);
        }
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("error: cannot start runtime: {e}");
            return ExitCode::from(EXIT_FAILED);
        }
    };

    match cli.command {
        Command::Run => runtime.block_on(cmd_run(config)),
        Command::Generate {
            category,
            dataset,
            output,
        } => runtime.block_on(cmd_generate(config, category, &dataset, output)),
        Command::CheckConfig => cmd_check_config(&config, config_file.as_deref()),
        Command::History { limit } => cmd_history(&config, limit),
    }
}

fn existing(path: &str) -> Option<PathBuf> {
    let path = PathBuf::from(path);
    path.is_file().then_some(path)
}

async fn cmd_run(config: Config) -> ExitCode {
    if let Err(e) = logging::init(&config) {
        eprintln!("error: {e}");
        return ExitCode::from(EXIT_FAILED);
    }

    let orchestrator = match Orchestrator::from_config(Arc::new(config)) {
        Ok(orchestrator) => orchestrator,
        Err(e) => {
            tracing::error!(error = %e, code = e.error_code(), "cannot start run");
            return ExitCode::from(EXIT_FAILED);
        }
    };

    let record = orchestrator
        .run_until(review_orchestrator::shutdown_signal())
        .await;
    println!("{}", record.summary_line());

    match record.status {
        RunStatus::Completed => ExitCode::from(EXIT_OK),
        RunStatus::Aborted if record.cause.as_deref() == Some(INTERRUPTED) => {
            ExitCode::from(EXIT_INTERRUPTED)
        }
        RunStatus::Aborted => ExitCode::from(EXIT_FAILED),
    }
}

async fn cmd_generate(
    config: Config,
    category: Category,
    dataset: &Path,
    output: PathBuf,
) -> ExitCode {
    if let Err(e) = logging::init(&config) {
        eprintln!("error: {e}");
        return ExitCode::from(EXIT_FAILED);
    }

    let path = dataset.to_path_buf();
    let delimiter = config.extraction.delimiter;
    let loaded = tokio::task::spawn_blocking(move || load_dataset(&path, delimiter)).await;
    let dataset = match loaded {
        Ok(Ok(dataset)) => dataset,
        Ok(Err(e)) => {
            println!("failed: {e}");
            return ExitCode::from(EXIT_FAILED);
        }
        Err(e) => {
            println!("failed: dataset load task failed: {e}");
            return ExitCode::from(EXIT_FAILED);
        }
    };

    let producer = producer_from_config(&config);
    let result = generate_report(
        producer,
        &config,
        &dataset,
        category,
        output,
        chrono::Local::now(),
    )
    .await;

    match result.status {
        ReportStatus::Generated { artifact } => {
            println!("generated {}", artifact.display());
            ExitCode::from(EXIT_OK)
        }
        ReportStatus::Empty => {
            println!("empty");
            ExitCode::from(EXIT_OK)
        }
        ReportStatus::Failed { cause } => {
            println!("failed: {cause}");
            ExitCode::from(EXIT_FAILED)
        }
    }
}

fn cmd_check_config(config: &Config, config_file: Option<&Path>) -> ExitCode {
    let paths = &config.paths;
    println!(
        "config file: {}",
        config_file.map_or("(defaults)".to_string(), |p| p.display().to_string())
    );
    println!("incoming:    {}", paths.incoming.display());
    println!("history:     {}", paths.history.display());
    println!("reports:     {}", paths.reports.display());
    println!("staging:     {}", paths.staging.display());
    println!("log file:    {}", paths.log_file.display());
    println!("run log:     {}", paths.run_log.display());

    let notifications = &config.notifications;
    println!("recipients:");
    for group in RecipientGroup::ALL {
        println!(
            "  {:<8} {} ({})",
            group.as_str(),
            notifications.recipients.members(group).len(),
            group.env_var()
        );
    }
    println!(
        "  distinct {}",
        notifications.resolve_recipients(&RecipientGroup::ALL).len()
    );

    let notifier = match notifications.kind {
        NotifierKind::Disabled => "disabled",
        NotifierKind::Webhook => "webhook",
    };
    println!("notifier:    {notifier}");

    let gateway = CommandGateway::from_config(config);
    match (&config.extraction.command, gateway.resolve_command()) {
        (None, _) => println!("extractor:   (none, scanning incoming area only)"),
        (Some(_), Some(resolved)) => println!("extractor:   {}", resolved.display()),
        (Some(command), None) => {
            println!("extractor:   {} (not found)", command.display());
            return ExitCode::from(EXIT_FAILED);
        }
    }

    ExitCode::from(EXIT_OK)
}

fn cmd_history(config: &Config, limit: usize) -> ExitCode {
    let log = RunLog::new(config.paths.run_log.clone());
    match log.read_history(limit) {
        Ok(records) if records.is_empty() => {
            println!("no runs recorded in {}", log.path().display());
            ExitCode::from(EXIT_OK)
        }
        Ok(records) => {
            for record in records {
                println!("{}", record.summary_line());
            }
            ExitCode::from(EXIT_OK)
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(EXIT_FAILED)
        }
    }
}
