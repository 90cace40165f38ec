//! The `cmdr` demo program.
//!
//! Wires the commands in [`commands`] into a [`Program`], loads an optional
//! TOML configuration and sets up logging and Ctrl+C handling for `main`.

pub mod commands;

use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context as _, Result};
use cmdr_commands::{Context, Program, ProgramConfig};
use tracing_subscriber::EnvFilter;

/// Program name used when the configuration does not set one.
pub const APP_NAME: &str = "cmdr";

/// Program version used when the configuration does not set one.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable holding the path of a TOML configuration file.
pub const CONFIG_ENV: &str = "CMDR_CONFIG";

/// Environment variable holding the log filter, checked before `RUST_LOG`.
pub const LOG_ENV: &str = "CMDR_LOG";

const DEFAULT_LOG_FILTER: &str = "warn";

static INTERRUPT_HANDLER_INSTALLED: AtomicBool = AtomicBool::new(false);

/// Load the configuration named by `CMDR_CONFIG`, or the built-in one.
pub fn load_config() -> Result<ProgramConfig> {
    let config = match std::env::var_os(CONFIG_ENV) {
        Some(path) if !path.is_empty() => ProgramConfig::from_path(&path)
            .with_context(|| format!("invalid {} configuration", CONFIG_ENV))?,
        _ => ProgramConfig::default(),
    };
    Ok(config.with_fallbacks(APP_NAME, APP_VERSION))
}

/// Build the program from a configuration.
///
/// An unset default command falls back to `serve`; an empty one disables
/// the default.
pub fn build_program(mut config: ProgramConfig) -> Program {
    config
        .default_command
        .get_or_insert_with(|| commands::DEFAULT_COMMAND.to_string());
    config
        .usage
        .get_or_insert_with(|| "A small demo of sub-command dispatch".to_string());

    let mut program = Program::from_config(config);
    for command in commands::all() {
        program.register(command);
    }
    program
}

/// Install the global tracing subscriber writing to stderr.
///
/// The filter comes from `CMDR_LOG`, then `RUST_LOG`, then `warn`.
pub fn init_logging() {
    let filter = std::env::var(LOG_ENV)
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string());
    let filter = EnvFilter::try_new(&filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Cancel `ctx` on the first Ctrl+C and exit with 130 on the second.
pub fn install_interrupt_handler(ctx: &Context) {
    if INTERRUPT_HANDLER_INSTALLED.swap(true, Ordering::SeqCst) {
        return;
    }

    let token = ctx.cancellation_token().clone();
    let result = ctrlc::set_handler(move || {
        if token.is_cancelled() {
            std::process::exit(130);
        }
        tracing::debug!("Interrupt received, cancelling");
        token.cancel();
    });
    if let Err(err) = result {
        tracing::warn!("Failed to install Ctrl+C handler: {}", err);
    }
}
