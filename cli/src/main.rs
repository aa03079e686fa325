//! CLI for the Code Migration Assistant.
//!
//! This tool rewrites code patterns across many git repositories and raises
//! pull requests with the result.

use clap::{Parser, ValueEnum};
use code_migration_assistant::runner::{
    DEFAULT_ACTOR_EMAIL, DEFAULT_ACTOR_NAME, DEFAULT_CLONE_DIR, DEFAULT_CONFIG_PATH,
    DEFAULT_USER_AGENT,
};
use code_migration_assistant::{
    render_json, render_table, Credentials, Identity, ReconciliationMethod, RunSummary, Runner,
    RunnerConfig, RunnerError,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Report format written to stdout.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

/// Code Migration Assistant - Rewrite code patterns across repositories and raise pull requests.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the targets document.
    #[arg(
        long,
        env = "CODE_MIGRATION_ASSISTANT_TARGETS_CONFIG_FILE",
        default_value = DEFAULT_CONFIG_PATH
    )]
    config: PathBuf,

    /// Directory remote repositories are cloned into.
    #[arg(
        long,
        env = "CODE_MIGRATION_ASSISTANT_REMOTE_TARGETS_CLONING_PATH",
        default_value = DEFAULT_CLONE_DIR
    )]
    clone_dir: PathBuf,

    /// Name used as commit author and committer.
    #[arg(
        long,
        env = "CODE_MIGRATION_ASSISTANT_ACTOR_USERNAME",
        default_value = DEFAULT_ACTOR_NAME
    )]
    actor_username: String,

    /// Email used as commit author and committer.
    #[arg(
        long,
        env = "CODE_MIGRATION_ASSISTANT_ACTOR_EMAIL",
        default_value = DEFAULT_ACTOR_EMAIL
    )]
    actor_email: String,

    /// User agent sent to provider APIs.
    #[arg(
        long,
        env = "CODE_MIGRATION_ASSISTANT_USER_AGENT",
        default_value = DEFAULT_USER_AGENT
    )]
    user_agent: String,

    /// GitHub Personal Access Token for github.com.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    github_token: Option<String>,

    /// Token for GitHub Enterprise hosts.
    #[arg(long, env = "GITHUB_ENTERPRISE_TOKEN", hide_env_values = true)]
    github_enterprise_token: Option<String>,

    /// Azure DevOps Personal Access Token.
    #[arg(long, env = "AZURE_DEVOPS_PAT", hide_env_values = true)]
    azure_devops_pat: Option<String>,

    /// Seconds a push (and the pull before it) may take.
    #[arg(
        long,
        env = "CODE_MIGRATION_ASSISTANT_PUSH_TIMEOUT_SECS",
        default_value_t = 180
    )]
    push_timeout_secs: u64,

    /// How a diverged remote branch is reconciled: merge, rebase or ff-only.
    #[arg(
        long,
        env = "CODE_MIGRATION_ASSISTANT_RECONCILIATION",
        default_value = "merge",
        value_parser = parse_reconciliation
    )]
    reconciliation: ReconciliationMethod,

    /// Also search hidden directories.
    #[arg(long)]
    include_hidden_dirs: bool,

    /// Report format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,

    /// Log level used when RUST_LOG is not set.
    #[arg(long, env = "CODE_MIGRATION_ASSISTANT_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

fn parse_reconciliation(value: &str) -> Result<ReconciliationMethod, String> {
    value.parse()
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(&args.log_level);

    if rustls::crypto::aws_lc_rs::default_provider()
        .install_default()
        .is_err()
    {
        error!("Failed to install the default TLS crypto provider");
    }

    let output = args.output;
    match run(args).await {
        Ok(summary) => {
            print_report(&summary, output);
            let status = summary.status();
            info!(exit_code = status.exit_code(), "Done");
            ExitCode::from(status.exit_code())
        }
        Err(e) => {
            error!(error = %e, "Critical failure");
            ExitCode::from(e.status().exit_code())
        }
    }
}

/// Initializes tracing on stderr so stdout only carries the report.
///
/// `RUST_LOG` takes precedence over `level` when set and valid.
fn init_tracing(level: &str) {
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .init();
}

/// Main execution logic.
async fn run(args: Args) -> Result<RunSummary, RunnerError> {
    let credentials = Credentials::new()
        .with_github_token(args.github_token)
        .with_github_enterprise_token(args.github_enterprise_token)
        .with_azure_devops_pat(args.azure_devops_pat);

    let config = RunnerConfig::new(args.config, credentials)
        .with_clone_dir(args.clone_dir)
        .with_actor(Identity::new(args.actor_username, args.actor_email))
        .with_user_agent(args.user_agent)
        .with_push_timeout(Duration::from_secs(args.push_timeout_secs))
        .with_reconciliation(args.reconciliation)
        .with_include_hidden_dirs(args.include_hidden_dirs);

    Runner::new(config).run().await
}

/// Prints the match report to stdout.
fn print_report(summary: &RunSummary, output: OutputFormat) {
    match output {
        OutputFormat::Table => println!("{}", render_table(summary)),
        OutputFormat::Json => match render_json(summary) {
            Ok(json) => println!("{json}"),
            Err(e) => error!(error = %e, "Failed to render report"),
        },
    }
}
