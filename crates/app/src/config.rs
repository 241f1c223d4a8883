use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

pub const DEFAULT_DB_URL: &str = "sqlite://dev.sqlite3";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

#[derive(Debug, PartialEq, Eq)]
pub enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidBindAddr { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidBindAddr { raw } => write!(f, "invalid --bind value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

/// What the binary was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Serve(Settings),
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub db_url: String,
    pub bind_addr: SocketAddr,
}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn parse_bind(raw: String) -> Result<SocketAddr, ArgsError> {
    raw.trim()
        .parse()
        .map_err(|_| ArgsError::InvalidBindAddr { raw })
}

pub fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [serve] [--db <sqlite_url>] [--bind <addr>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db {DEFAULT_DB_URL}");
    eprintln!("  --bind {DEFAULT_BIND_ADDR}");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  DREPPY_DB_URL, DREPPY_BIND_ADDR, DREPPY_AI_API_KEY (or OPENAI_API_KEY),");
    eprintln!("  DREPPY_AI_BASE_URL, DREPPY_AI_MODEL, RUST_LOG");
}

/// Parse arguments on top of environment defaults. `env` looks up a
/// variable by name.
///
/// # Errors
///
/// Returns `ArgsError` for unknown flags, missing values, or values that
/// do not parse.
pub fn parse_args(
    args: impl IntoIterator<Item = String>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<Command, ArgsError> {
    let mut db_url = env("DREPPY_DB_URL").map_or_else(|| DEFAULT_DB_URL.into(), normalize_sqlite_url);
    let mut bind_addr = parse_bind(env("DREPPY_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.into()))?;

    let mut args = args.into_iter().peekable();
    if args.peek().is_some_and(|first| first == "serve") {
        args.next();
    }

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--db" => {
                let value = require_value(&mut args, "--db")?;
                if value.trim().is_empty() {
                    return Err(ArgsError::InvalidDbUrl { raw: value });
                }
                db_url = normalize_sqlite_url(value);
            }
            "--bind" => {
                bind_addr = parse_bind(require_value(&mut args, "--bind")?)?;
            }
            "--help" | "-h" => return Ok(Command::Help),
            _ => return Err(ArgsError::UnknownArg(arg)),
        }
    }

    Ok(Command::Serve(Settings { db_url, bind_addr }))
}

/// Turn relative paths and `sqlite:` URLs into absolute `sqlite://` URLs.
#[must_use]
pub fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim();
    let path = Path::new(trimmed.strip_prefix("sqlite:").unwrap_or(trimmed));
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

/// Create the database file and its parent directories if missing.
///
/// # Errors
///
/// Returns an error for URLs without a path or when the file cannot be
/// created.
pub fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| (*s).to_string()).collect()
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn defaults_apply_without_flags() {
        let Command::Serve(settings) = parse_args(args(&[]), no_env).unwrap() else {
            panic!("expected serve");
        };
        assert_eq!(settings.db_url, DEFAULT_DB_URL);
        assert_eq!(settings.bind_addr.port(), 3000);
    }

    #[test]
    fn flags_override_the_environment() {
        let env = |key: &str| match key {
            "DREPPY_BIND_ADDR" => Some("0.0.0.0:8080".to_string()),
            "DREPPY_DB_URL" => Some("sqlite:///tmp/env.sqlite3".to_string()),
            _ => None,
        };
        let Command::Serve(from_env) = parse_args(args(&["serve"]), env).unwrap() else {
            panic!("expected serve");
        };
        assert_eq!(from_env.bind_addr.port(), 8080);
        assert_eq!(from_env.db_url, "sqlite:///tmp/env.sqlite3");

        let Command::Serve(flagged) =
            parse_args(args(&["--bind", "127.0.0.1:4000", "--db", "sqlite::memory:"]), env)
                .unwrap()
        else {
            panic!("expected serve");
        };
        assert_eq!(flagged.bind_addr.port(), 4000);
        assert_eq!(flagged.db_url, "sqlite::memory:");
    }

    #[test]
    fn bad_arguments_are_reported() {
        assert_eq!(
            parse_args(args(&["--db"]), no_env),
            Err(ArgsError::MissingValue { flag: "--db" })
        );
        assert_eq!(
            parse_args(args(&["--bind", "nowhere"]), no_env),
            Err(ArgsError::InvalidBindAddr {
                raw: "nowhere".into()
            })
        );
        assert_eq!(
            parse_args(args(&["--verbose"]), no_env),
            Err(ArgsError::UnknownArg("--verbose".into()))
        );
        assert_eq!(parse_args(args(&["-h"]), no_env), Ok(Command::Help));
    }

    #[test]
    fn relative_paths_become_absolute_urls() {
        let url = normalize_sqlite_url("sqlite:data/app.sqlite3".into());
        assert!(url.starts_with("sqlite:///"));
        assert!(url.ends_with("data/app.sqlite3"));
        assert_eq!(normalize_sqlite_url("sqlite::memory:".into()), "sqlite::memory:");
    }
}
