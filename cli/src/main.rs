use clap::Parser;
use launchpad_cli::commands::{cli, score};
use launchpad_cli::http;
use launchpad_core::api::{self as core_api, AppContext, CliError, ConfigError};
use launchpad_plugins::services::PluginServicesFactory;
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

static LOG_GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
    std::sync::OnceLock::new();

#[tokio::main]
async fn main() {
    let exit = match real_main().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{e}");
            exit_code_for_error(&e)
        }
    };

    std::process::exit(exit);
}

async fn real_main() -> Result<i32, CliError> {
    let args = cli::Args::parse();
    let cfg = match args.config.as_deref() {
        Some(path) => core_api::load_from_path(path)?,
        None => core_api::load_default()?,
    };
    init_tracing(&cfg.logging).map_err(CliError::Command)?;

    let ctx = AppContext::new(cfg, Some(Arc::new(PluginServicesFactory)));
    dispatch(args.command, ctx).await
}

fn exit_code_for_error(e: &CliError) -> i32 {
    // 0: success
    // 11: config error
    // 20: IO / command error
    // 30: server error
    // 40: remote api error
    // 50: internal/uncategorized
    match e {
        CliError::Config(ce) => match ce {
            ConfigError::Read { .. } => 20,
            _ => 11,
        },
        CliError::Io(_) => 20,
        CliError::Command(_) => 20,
        CliError::Server(_) => 30,
        CliError::Api(_) => 40,
        CliError::Anyhow(_) => 50,
    }
}

async fn dispatch(cmd: cli::Commands, ctx: AppContext) -> Result<i32, CliError> {
    match cmd {
        cli::Commands::Serve(serve_args) => {
            http::handle_serve(serve_args, &ctx).await?;
        }
        cli::Commands::Score(score_args) => {
            score::handle_score(score_args)?;
        }
        cli::Commands::Classify(classify_args) => {
            score::handle_classify(classify_args, &ctx)?;
        }
        cli::Commands::Assess(assess_args) => {
            score::handle_assess(assess_args, &ctx).await?;
        }
    }
    Ok(0)
}

fn init_tracing(logging: &core_api::LoggingConfig) -> Result<(), String> {
    if !logging.enabled {
        return Ok(());
    }

    let filter = match std::env::var("RUST_LOG") {
        Ok(v) if !v.trim().is_empty() => EnvFilter::from_default_env(),
        _ => EnvFilter::try_new(logging.level.clone()).map_err(|e| e.to_string())?,
    };

    let mut maybe_writer = None;

    if logging.file {
        let dir = match logging
            .directory
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            Some(d) => std::path::PathBuf::from(d),
            None => std::env::temp_dir().join("launchpad"),
        };

        std::fs::create_dir_all(&dir).map_err(|e| format!("create log dir failed: {e}"))?;
        let file_name = format!("launchpad.{}.log", std::process::id());
        let appender = tracing_appender::rolling::never(dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);
        let _ = LOG_GUARD.set(guard);
        maybe_writer = Some(non_blocking);
    }

    if !logging.console && maybe_writer.is_none() {
        return Err("logging disabled for both console and file".to_string());
    }

    let console_layer = logging.console.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(atty::is(atty::Stream::Stderr))
    });

    let file_layer = maybe_writer.map(|w| {
        tracing_subscriber::fmt::layer()
            .with_writer(w)
            .with_ansi(false)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    Ok(())
}
