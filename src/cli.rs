//! Minimal CLI parsing for the compiler binary.

use std::env;

use serde::Deserialize;
use serde_json::Value as JsonValue;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct CliOptions {
    /// Read the request from this file instead of stdin
    pub input: Option<String>,
    /// Per-call live override
    pub live: Option<bool>,
    /// Print the parsed AST instead of the compiled document
    pub print_ast: bool,
}

impl CliOptions {
    pub fn from_args() -> Self {
        Self::parse(env::args().skip(1))
    }

    pub fn parse(args: impl IntoIterator<Item = String>) -> Self {
        let mut options = CliOptions::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--live" => options.live = Some(true),
                "--no-live" => options.live = Some(false),
                "--ast" => options.print_ast = true,
                "--input" => options.input = args.next(),
                _ if arg.starts_with("--input=") => {
                    if let Some(value) = arg.split_once('=').map(|(_, v)| v) {
                        options.input = Some(value.to_string());
                    }
                }
                _ => {}
            }
        }
        options
    }
}

/// A compile request read from JSON.
#[derive(Debug, Deserialize)]
pub struct CompileRequest {
    pub model: String,
    pub operation: String,
    #[serde(default)]
    pub args: Option<JsonValue>,
}
