use std::path::Path;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_BIND: &str = "127.0.0.1:5000";
const ENV_PREFIX: &str = "LYRICS";

/// Runtime settings shared by all subcommands.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Settings {
    pub user_agent: String,
    pub timeout_secs: u64,
    pub delay_secs: f64,
    pub accept_invalid_certs: bool,
    pub bind: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            delay_secs: 0.0,
            accept_invalid_certs: false,
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

/// Per-invocation overrides coming from CLI flags. `None` keeps the layered value.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub user_agent: Option<String>,
    pub timeout_secs: Option<u64>,
    pub delay_secs: Option<f64>,
    pub insecure: bool,
    pub bind: Option<String>,
}

impl Settings {
    /// Defaults, then the optional config file, then `LYRICS_*` env vars.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let defaults = Settings::default();
        let mut builder = Config::builder()
            .set_default("user_agent", defaults.user_agent)?
            .set_default("timeout_secs", defaults.timeout_secs as i64)?
            .set_default("delay_secs", defaults.delay_secs)?
            .set_default("accept_invalid_certs", defaults.accept_invalid_certs)?
            .set_default("bind", defaults.bind)?;

        if let Some(path) = file {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .context("Failed to load configuration")?
            .try_deserialize()
            .context("Invalid configuration")
    }

    pub fn apply(mut self, o: Overrides) -> Self {
        if let Some(ua) = o.user_agent {
            self.user_agent = ua;
        }
        if let Some(t) = o.timeout_secs {
            self.timeout_secs = t;
        }
        if let Some(d) = o.delay_secs {
            self.delay_secs = d.max(0.0);
        }
        if o.insecure {
            self.accept_invalid_certs = true;
        }
        if let Some(bind) = o.bind {
            self.bind = bind;
        }
        self
    }
}
