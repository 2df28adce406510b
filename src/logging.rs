//! Logging setup
//!
//! The library only emits through the `log` facade. Applications that do not
//! bring their own logger can call [`init`] to install `env_logger` with the
//! configured filter; `RUST_LOG` still overrides it.

use crate::config::LoggingConfig;
use env_logger::{Builder, Env};

/// Install `env_logger`. Returns `false` if a logger was already installed.
pub fn init(config: &LoggingConfig) -> bool {
    let mut builder = builder(config);
    builder.try_init().is_ok()
}

pub fn builder(config: &LoggingConfig) -> Builder {
    let mut builder = Builder::from_env(Env::default().default_filter_or(config.filter.as_str()));
    if !config.timestamps {
        builder.format_timestamp(None);
    }
    builder
}
