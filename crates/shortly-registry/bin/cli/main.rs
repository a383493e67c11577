mod cli;
mod commands;

use crate::cli::{LogFormatArg, CLI};
use anyhow::Context;
use clap::Parser;
use shortly_core::SystemClock;
use shortly_generator::RandomGenerator;
use shortly_registry::{Registry, RegistrySettings};
use shortly_storage::FileStore;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "warn,shortly=info,shortly_registry=info,shortly_storage=info";

fn init_tracing(format: LogFormatArg) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);

    match format {
        LogFormatArg::Text => builder.init(),
        LogFormatArg::Json => builder.json().init(),
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let config = CLI::parse();
    init_tracing(config.log_format);

    debug!(
        store_dir = %config.store_dir.display(),
        storage_key = %config.storage_key,
        on_corrupt = %config.on_corrupt,
        "starting shortly"
    );

    url::Url::parse(&config.base_url)
        .with_context(|| format!("invalid base url '{}'", config.base_url))?;

    let settings = RegistrySettings::builder()
        .storage_key(config.storage_key)
        .corrupt_state(config.on_corrupt.into())
        .build();

    let mut registry = Registry::open(
        FileStore::new(config.store_dir),
        RandomGenerator::new(),
        SystemClock,
        settings,
    )?;

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout().lock();
    commands::run(
        &mut registry,
        config.command,
        &config.base_url,
        &mut stdin.lock(),
        &mut stdout,
    )
}
