use anyhow::Result;
use std::io::Write;
use tracing::{error, info, warn};
use world_reports::cli::app::{generate_completion, write_degraded, write_tips};
use world_reports::cli::{Cli, Config, Invocation, Mode, VERSION};
use world_reports::database::{check_connectivity, MySqlProvider};
use world_reports::reports::build_catalog;
use world_reports::runtime::{run_session, ReplOptions};

#[tokio::main]
async fn main() -> Result<()> {
    // Missing .env files are fine; the environment and defaults still apply
    let _ = dotenvy::dotenv();

    let cli = match Cli::parse_lenient(std::env::args_os()) {
        Ok(Invocation::Run(cli)) => cli,
        Ok(Invocation::Degraded { unknown }) => {
            write_degraded(&unknown, &mut std::io::stdout())?;
            return Ok(());
        }
        Err(e) => e.exit(),
    };

    let mode = cli.mode();
    if !mode.needs_config() {
        if let Mode::Completions(shell) = mode {
            generate_completion(shell, &mut std::io::stdout());
        }
        return Ok(());
    }

    let (config, problem) = cli.load_config();

    // Initialize tracing with environment-based filtering
    let default_level = if config.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    info!("Starting world-reports {}", VERSION);
    if let Some(e) = problem {
        warn!("Configuration problem, continuing with defaults: {}", e);
        eprintln!("Warning: {}", e.user_message());
    }

    match mode {
        Mode::ConnectivityCheck => connectivity_check(&config).await,
        Mode::Interactive => interactive(&config).await,
        Mode::Completions(_) => Ok(()),
    }
}

async fn connectivity_check(config: &Config) -> Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(stdout, "Testing database connectivity...")?;

    let provider = MySqlProvider::new(&config.database);
    let passed = check_connectivity(provider.pool(), &config.database, &mut stdout).await?;
    provider.close().await;

    if !passed {
        writeln!(stdout)?;
        writeln!(stdout, "Database connectivity issues occurred")?;
        std::process::exit(1);
    }

    writeln!(stdout)?;
    writeln!(stdout, "All systems operational!")?;
    Ok(())
}

async fn interactive(config: &Config) -> Result<()> {
    let catalog = build_catalog(
        config.discovery.mode,
        &config.discovery.namespace,
        config.discovery.manifest.as_deref(),
    );
    if catalog.is_empty() {
        warn!("No reports were registered");
        write_tips(&mut std::io::stderr())?;
    }

    let options = ReplOptions {
        prompt: config.repl.prompt.clone(),
        color: config.repl.color,
        banner: true,
    };

    let provider = MySqlProvider::new(&config.database);
    let input = tokio::io::BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();

    let outcome = run_session(&provider, &catalog, options, input, &mut stdout).await;
    provider.close().await;

    match outcome {
        Ok(stats) => {
            info!(
                executed = stats.executed,
                failed = stats.failed,
                unknown = stats.unknown,
                "Session finished"
            );
            Ok(())
        }
        Err(e) => {
            error!("Session failed: {:?}", e);
            eprintln!("Error: {}", e.user_message());
            std::process::exit(1);
        }
    }
}
