//! Configuration loaded from environment variables

use std::env;

use anyhow::Result;

use crate::builder::BuilderOptions;

/// Runtime configuration for the compiler front end
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Compile every query as live unless a call opts out
    pub force_live_queries: bool,

    /// Emit logs as JSON lines instead of human-readable text
    pub log_json: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            force_live_queries: env_flag("GQLORM_FORCE_LIVE_QUERIES"),
            log_json: env_flag("GQLORM_LOG_JSON"),
        })
    }

    pub fn builder_options(&self) -> BuilderOptions {
        BuilderOptions {
            force_live_queries: self.force_live_queries,
        }
    }
}

fn env_flag(name: &str) -> bool {
    env::var(name).map(|v| parse_flag(&v)).unwrap_or(false)
}

fn parse_flag(value: &str) -> bool {
    value == "true" || value == "1"
}
