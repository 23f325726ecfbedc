//! acl-es - operator CLI for access-control sets stored in Elasticsearch

mod cli;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use cli::op::{Op, OpContext};
use cli::{args::Args, Add, Clean, Del, Get, Init, Remove, Union};

command_enum! {
    (Init, Init),
    (Get, Get),
    (Union, Union),
    (Add, Add),
    (Remove, Remove),
    (Del, Del),
    (Clean, Clean),
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Logs go to stderr so command output stays pipeable
    let (non_blocking_writer, guard) = tracing_appender::non_blocking(std::io::stderr());
    let log_level: tracing::Level = args.log_level.parse().unwrap_or(tracing::Level::WARN);
    let env_filter = EnvFilter::builder()
        .with_default_directive(log_level.into())
        .from_env_lossy();

    let stderr_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_writer(non_blocking_writer)
        .with_filter(env_filter);

    tracing_subscriber::registry().with(stderr_layer).init();

    let ctx = match context(&args) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(2);
        }
    };

    let code = match args.command.execute(&ctx).await {
        Ok(output) => {
            let output = output.to_string();
            if !output.is_empty() {
                println!("{}", output);
            }
            0
        }
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("Error: {}", e);
            1
        }
    };

    // Flush buffered logs before exiting
    drop(guard);
    std::process::exit(code);
}

/// Resolve settings (explicit flags > config file > defaults) and connect.
fn context(args: &Args) -> anyhow::Result<OpContext> {
    let (url, config) = cli::op::resolve_config(args.config.as_deref(), args.overrides())
        .context("failed to resolve settings")?;
    tracing::debug!(%url, index = %config.index, prefix = %config.prefix, "resolved settings");
    OpContext::new(&url, config).context("failed to set up backend")
}
