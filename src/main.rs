//! gqlorm command line front end
//!
//! Reads a `{ "model", "operation", "args" }` request as JSON from a file or
//! stdin and prints the compiled GraphQL document and variables.

mod cli;

use std::fs;
use std::io::{self, Read};

use anyhow::{Context, Result};
use gqlorm::{BuildOptions, Config, QueryBuilder, QueryOperation, parse_query};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{CliOptions, CompileRequest};

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gqlorm=info".into()),
        )
        .with(
            config
                .log_json
                .then(|| tracing_subscriber::fmt::layer().json().with_writer(io::stderr)),
        )
        .with(
            (!config.log_json).then(|| tracing_subscriber::fmt::layer().with_writer(io::stderr)),
        )
        .init();

    let options = CliOptions::from_args();
    let input = read_input(options.input.as_deref())?;
    let request: CompileRequest =
        serde_json::from_str(&input).context("Request is not valid JSON")?;
    let operation: QueryOperation = request.operation.parse()?;

    tracing::debug!(model = %request.model, operation = %operation, "Compiling request");

    let output = if options.print_ast {
        let ast = parse_query(&request.model, operation, request.args.as_ref())?;
        serde_json::to_string_pretty(&ast)?
    } else {
        let builder = QueryBuilder::new(config.builder_options());
        let compiled = builder.build(
            &request.model,
            operation,
            request.args.as_ref(),
            BuildOptions {
                is_live: options.live,
            },
        )?;
        serde_json::to_string_pretty(&compiled)?
    };

    println!("{output}");
    Ok(())
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => fs::read_to_string(path).with_context(|| format!("Failed to read {path}")),
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read request from stdin")?;
            Ok(buf)
        }
    }
}
