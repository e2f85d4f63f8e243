//! Outline Logger
//!
//! Installs the global `tracing` subscriber for the extension.
//! In the browser events go to the devtools console, natively to stderr.

use serde::Deserialize;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::EnvFilter;

#[cfg(target_arch = "wasm32")]
mod console;

const TIME_FORMAT: &str = "%H:%M:%S%.3f";

/// Logger settings, usually shipped alongside the store config
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoggerConfig {
    /// Filter directives, e.g. `info` or `milan_outline=debug,warn`
    pub filter: String,
    /// Name printed in the startup line
    pub app_name: String,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            app_name: "MilanOutline".to_string(),
        }
    }
}

/// Parse filter directives
pub fn build_filter(directives: &str) -> Result<EnvFilter, String> {
    EnvFilter::try_new(directives)
        .map_err(|e| format!("Invalid log filter '{}': {}", directives, e))
}

/// Install the global subscriber.
///
/// Fails when a subscriber is already installed for this process.
pub fn init_logger(config: &LoggerConfig) -> Result<(), String> {
    let filter = build_filter(&config.filter)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(ChronoLocal::new(TIME_FORMAT.to_string()))
        .with_target(true);

    #[cfg(target_arch = "wasm32")]
    let result = {
        console_error_panic_hook::set_once();
        builder
            .with_ansi(false)
            .with_writer(console::ConsoleMakeWriter)
            .try_init()
    };

    #[cfg(not(target_arch = "wasm32"))]
    let result = builder.with_writer(std::io::stderr).try_init();

    result.map_err(|e| format!("Failed to install logger: {}", e))?;
    tracing::info!("{} logger initialized", config.app_name);
    Ok(())
}
