//! # yeti CLI
//!
//! Build or wrap structured errors from the command line and report how a
//! protocol layer would classify them.
//!
//! Usage:
//!   yeti build --origin <name> [--variant base|client|final] [--status <code>] [-d key=value]...
//!   yeti wrap --cause <text> --origin <name> [...]
//!
//! Examples:
//!   yeti build --origin billing::Invoice -d a=x -d b=2
//!   yeti build --origin api --variant client --status 422 -d 'field="email"'
//!   yeti wrap --origin storage --cause "disk full" --variant final -d path=/var/data

use anyhow::bail;
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde_json::{json, Value};
use std::convert::Infallible;
use tracing_subscriber::EnvFilter;
use yeti_error::{
    BaseError, ClientError, Details, Error, ErrorFactory, FinalError, Origin, Overrides,
    StatusOverride, Variant,
};

#[derive(Parser)]
#[command(name = "yeti")]
#[command(author, version, about = "yeti - inspect structured errors")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log factory events to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Construct an error and report it
    Build(ErrorArgs),
    /// Wrap a failure described by --cause and report it
    Wrap {
        /// Description of the original failure
        #[arg(long)]
        cause: String,

        #[command(flatten)]
        error: ErrorArgs,
    },
}

#[derive(Args)]
struct ErrorArgs {
    /// Component the error originates in
    #[arg(short, long)]
    origin: String,

    #[arg(long, value_enum, default_value_t = VariantArg::Base)]
    variant: VariantArg,

    /// Status code (defaults to the variant's)
    #[arg(short, long)]
    status: Option<u16>,

    /// Mark a base error as not transient
    #[arg(long)]
    permanent: bool,

    /// Detail entry as key=value; the value is parsed as JSON when possible
    #[arg(short = 'd', long = "detail", value_parser = parse_detail)]
    details: Vec<(String, Value)>,
}

#[derive(Clone, Copy, ValueEnum)]
enum VariantArg {
    Base,
    Client,
    Final,
}

fn parse_detail(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))?;
    if key.is_empty() {
        return Err(format!("empty key in '{}'", raw));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

/// Signal an error through the factory, wrapping `cause` when given
fn signal<V: Variant>(
    factory: &ErrorFactory,
    variant: V,
    details: Details,
    options: V::Options,
    cause: Option<String>,
) -> yeti_error::Result<Infallible> {
    match cause {
        Some(cause) => factory.wrap_with(anyhow::Error::msg(cause), variant, details, options),
        None => factory.raise_with(variant, details, options),
    }
}

fn produce(args: ErrorArgs, cause: Option<String>) -> anyhow::Result<Error> {
    let factory = ErrorFactory::new(Origin::named(args.origin));
    let details: Details = args.details.into_iter().collect();

    let result = match args.variant {
        VariantArg::Base => {
            let options = Overrides {
                transient: args.permanent.then_some(false),
                status: args.status,
            };
            signal(&factory, BaseError, details, options, cause)
        }
        _ if args.permanent => bail!("--permanent only applies to base errors"),
        VariantArg::Client => {
            let options = StatusOverride { status: args.status };
            signal(&factory, ClientError, details, options, cause)
        }
        VariantArg::Final => {
            let options = StatusOverride { status: args.status };
            signal(&factory, FinalError, details, options, cause)
        }
    };

    match result {
        Ok(never) => match never {},
        Err(error) => Ok(error),
    }
}

/// The classification a protocol layer reads from an error
fn report(error: &Error) -> Value {
    let mut report = json!({
        "origin": error.origin().name(),
        "variant": error.variant(),
        "transient": error.is_transient(),
        "status": error.status(),
        "message": error.message(),
        "details": error.details().as_map(),
    });
    if let Some(cause) = error.cause() {
        report["cause"] = json!(cause.to_string());
    }
    if let Some(location) = error.location() {
        report["location"] = json!(location.to_string());
    }
    report
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let error = match cli.command {
        Commands::Build(args) => produce(args, None)?,
        Commands::Wrap { cause, error } => produce(error, Some(cause))?,
    };

    println!("{}", serde_json::to_string_pretty(&report(&error))?);
    Ok(())
}
