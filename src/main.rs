//! utilkit command-line interface
//! Author: kartik4091
//! Created: 2025-06-06
//!
//! Thin front end over the library helpers: file digests, network probes,
//! JWT issuance and checks, JSON validation and a logging demo.

use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use std::time::Duration;

use chrono::TimeDelta;
use clap::{Arg, ArgAction, ArgMatches, Command, ValueEnum};
use serde_json::{Map, Value};
use tracing::{error, info};
use uuid::Uuid;

use utilkit::config::ToolkitConfig;
use utilkit::error::{Error, Result};
use utilkit::logging::{self, with_field, LogManager, TracingAppender};
use utilkit::{files, json, jwt, network};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    /// Error messages only
    Error,
    /// Warning and error messages
    Warn,
    /// Info, warning, and error messages (default)
    Info,
    /// Debug and all messages
    Debug,
    /// Trace and all messages (most verbose)
    Trace,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DigestAlgorithm {
    Md5,
    Sha256,
}

#[tokio::main]
async fn main() {
    let matches = build_cli().get_matches();

    let log_level = matches.get_one::<LogLevel>("verbose").copied().unwrap_or(LogLevel::Info);
    init_logging(log_level);

    let config = match load_config(matches.get_one::<String>("config")) {
        Ok(config) => config,
        Err(e) => {
            error!("❌ Failed to load config file: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run(&matches, &config).await {
        error!("❌ {} ({})", e, e.kind());
        process::exit(1);
    }
}

fn build_cli() -> Command {
    Command::new("utilkit")
        .version(env!("CARGO_PKG_VERSION"))
        .author("kartik4091")
        .about("Everyday helpers: hashing, network probes, JWT and JSON checks")
        .subcommand_required(true)
        .arg_required_else_help(true)

        // Global options
        .arg(Arg::new("config")
            .short('c')
            .long("config")
            .value_name("FILE")
            .global(true)
            .help("Configuration file (JSON/YAML)"))

        .arg(Arg::new("verbose")
            .short('v')
            .long("verbose")
            .value_parser(clap::value_parser!(LogLevel))
            .default_value("info")
            .global(true)
            .help("Set logging verbosity"))

        .subcommand(Command::new("hash")
            .about("Print the digest of a file")
            .arg(Arg::new("file").value_name("FILE").required(true))
            .arg(Arg::new("algorithm")
                .short('a')
                .long("algorithm")
                .value_parser(clap::value_parser!(DigestAlgorithm))
                .default_value("sha256")))

        .subcommand(Command::new("ping")
            .about("Ping a host with the system ping tool")
            .arg(Arg::new("host").value_name("HOST").required(true))
            .arg(Arg::new("count")
                .short('n')
                .long("count")
                .value_parser(clap::value_parser!(u32))
                .default_value("4")))

        .subcommand(Command::new("port")
            .about("Check whether a TCP port accepts connections")
            .arg(Arg::new("host").value_name("HOST").required(true))
            .arg(Arg::new("port")
                .value_name("PORT")
                .value_parser(clap::value_parser!(u16))
                .required(true))
            .arg(Arg::new("timeout")
                .long("timeout-ms")
                .value_parser(clap::value_parser!(u64))
                .help("Connect timeout, defaults to the configured value")))

        .subcommand(Command::new("dns")
            .about("Resolve a host name, or an address with --reverse")
            .arg(Arg::new("target").value_name("HOST_OR_IP").required(true))
            .arg(Arg::new("reverse")
                .short('r')
                .long("reverse")
                .action(ArgAction::SetTrue)))

        .subcommand(Command::new("jwt-generate")
            .about("Issue an HS256 token")
            .arg(Arg::new("secret").long("secret").value_name("SECRET").required(true))
            .arg(Arg::new("subject").long("subject").value_name("SUBJECT").required(true))
            .arg(Arg::new("ttl")
                .long("ttl-secs")
                .value_parser(clap::value_parser!(i64))
                .help("Lifetime in seconds, defaults to the access token lifetime"))
            .arg(Arg::new("claim")
                .long("claim")
                .value_name("KEY=VALUE")
                .action(ArgAction::Append)
                .help("Extra claim; VALUE is parsed as JSON when possible")))

        .subcommand(Command::new("jwt-validate")
            .about("Validate a token and print its claims")
            .arg(Arg::new("secret").long("secret").value_name("SECRET").required(true))
            .arg(Arg::new("token").value_name("TOKEN").required(true)))

        .subcommand(Command::new("json-validate")
            .about("Check that a file holds well-formed JSON")
            .arg(Arg::new("file").value_name("FILE").required(true)))

        .subcommand(Command::new("log-demo")
            .about("Route a few events through the structured logger"))
}

fn init_logging(level: LogLevel) {
    let filter_level = match level {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    };

    if let Err(e) = logging::init_tracing(&format!("utilkit={}", filter_level)) {
        eprintln!("{}", e);
    }
}

fn load_config(path: Option<&String>) -> Result<ToolkitConfig> {
    match path {
        Some(path) => ToolkitConfig::load(Path::new(path)),
        None => Ok(ToolkitConfig::default()),
    }
}

fn required<'a>(matches: &'a ArgMatches, id: &str) -> Result<&'a str> {
    matches
        .get_one::<String>(id)
        .map(String::as_str)
        .ok_or_else(|| Error::validation(format!("Missing argument: {}", id)))
}

async fn run(matches: &ArgMatches, config: &ToolkitConfig) -> Result<()> {
    match matches.subcommand() {
        Some(("hash", sub)) => {
            let path = PathBuf::from(required(sub, "file")?);
            let digest = match sub.get_one::<DigestAlgorithm>("algorithm").copied() {
                Some(DigestAlgorithm::Md5) => files::md5_hex(&path)?,
                _ => files::sha256_hex(&path)?,
            };
            println!("{}  {}", digest, path.display());
        }
        Some(("ping", sub)) => {
            let count = sub.get_one::<u32>("count").copied().unwrap_or(4);
            println!("{}", network::ping(required(sub, "host")?, count)?);
        }
        Some(("port", sub)) => {
            let host = required(sub, "host")?;
            let port = sub
                .get_one::<u16>("port")
                .copied()
                .ok_or_else(|| Error::validation("Missing argument: port"))?;
            let timeout = sub
                .get_one::<u64>("timeout")
                .map(|ms| Duration::from_millis(*ms))
                .unwrap_or_else(|| config.network.connect_timeout());
            let state = if network::is_port_open(host, port, timeout) { "open" } else { "closed" };
            println!("{}:{} is {}", host, port, state);
        }
        Some(("dns", sub)) => {
            let target = required(sub, "target")?;
            if sub.get_flag("reverse") {
                println!("{}", network::reverse_dns_lookup(target)?);
            } else {
                for addr in network::dns_lookup(target)? {
                    println!("{}", addr);
                }
            }
        }
        Some(("jwt-generate", sub)) => {
            let ttl = sub
                .get_one::<i64>("ttl")
                .copied()
                .unwrap_or(config.jwt.access_token_lifetime_secs);
            let claims = parse_claims(sub.get_many::<String>("claim").into_iter().flatten())?;
            let token = jwt::generate_token(
                required(sub, "secret")?,
                required(sub, "subject")?,
                &claims,
                TimeDelta::seconds(ttl),
            )?;
            println!("{}", token);
        }
        Some(("jwt-validate", sub)) => {
            let secret = required(sub, "secret")?;
            let token = required(sub, "token")?;
            let result = jwt::validate_token_with_details(secret, token);
            if !result.is_valid() {
                return Err(Error::validation(result.message().to_string()));
            }
            let claims = jwt::extract_claims(secret, token)?;
            println!("{}", json::to_pretty_json(&claims)?);
        }
        Some(("json-validate", sub)) => {
            let path = PathBuf::from(required(sub, "file")?);
            json::validate_json(&files::read_file(&path)?)?;
            info!("✅ {} is valid JSON", path.display());
        }
        Some(("log-demo", _)) => log_demo(config)?,
        _ => return Err(Error::validation("Unknown command")),
    }
    Ok(())
}

/// `KEY=VALUE` pairs; values that parse as JSON keep their type.
fn parse_claims<'a>(pairs: impl Iterator<Item = &'a String>) -> Result<Map<String, Value>> {
    let mut claims = Map::new();
    for pair in pairs {
        let (key, raw) = pair
            .split_once('=')
            .ok_or_else(|| Error::validation(format!("Claim must be KEY=VALUE: {}", pair)))?;
        let value = json::parse_json(raw).unwrap_or_else(|_| Value::from(raw));
        claims.insert(key.trim().to_string(), value);
    }
    Ok(claims)
}

fn log_demo(config: &ToolkitConfig) -> Result<()> {
    let manager = Arc::new(LogManager::from_config(&config.logging)?);
    manager.register_appender("tracing", Arc::new(TracingAppender::default()));

    let logger = manager.logger("utilkit.cli.demo");
    logger.info("Structured logging demo started");

    let request_id = Uuid::new_v4().to_string();
    with_field("requestId", request_id.as_str(), || {
        logger.structured().field("step", 1).info("Inside a scoped context");
    });

    let mut tracker = logger.track_performance("demo");
    std::thread::sleep(Duration::from_millis(5));
    tracker.checkpoint("warmup");
    let total = tracker.stop();

    let err = std::io::Error::new(std::io::ErrorKind::Other, "simulated failure");
    logger.error_with("Demo error with cause", err);
    logger.debug(format!("Demo finished after {} ms", total.as_millis()));
    Ok(())
}
