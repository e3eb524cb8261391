//! CLI argument parsing, validation, and startup helpers.

use crate::db::{Database, UserRole};
use crate::jwt::{TokenConfig, TokenService};
use crate::session::start_session;
use clap::Parser;
use std::time::Duration;
use tracing::{error, info};

const MIN_SECRET_LENGTH: usize = 32;

/// Longest accepted token lifetime (100 years).
const MAX_EXPIRY: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

pub const ACCESS_SECRET_ENV: &str = "ACCESS_TOKEN_SECRET";
pub const REFRESH_SECRET_ENV: &str = "REFRESH_TOKEN_SECRET";

#[derive(clap::ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "storefront", about = "Storefront REST backend")]
pub struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "7291")]
    pub port: u16,

    /// Path to SQLite database file
    #[arg(short, long, default_value = "storefront.db")]
    pub database: String,

    /// Access token lifetime (e.g. "30m", "1h", "900")
    #[arg(long, env = "ACCESS_TOKEN_EXPIRES_IN", default_value = "30m", value_parser = parse_expiry)]
    pub access_token_expires_in: Duration,

    /// Refresh token lifetime (e.g. "7d", "2w")
    #[arg(long, env = "REFRESH_TOKEN_EXPIRES_IN", default_value = "7d", value_parser = parse_expiry)]
    pub refresh_token_expires_in: Duration,

    /// Path to file containing the access token secret. Prefer ACCESS_TOKEN_SECRET instead
    #[arg(long)]
    pub access_secret_file: Option<String>,

    /// Path to file containing the refresh token secret. Prefer REFRESH_TOKEN_SECRET instead
    #[arg(long)]
    pub refresh_secret_file: Option<String>,

    /// Create (or reuse) an admin user with this name on startup and print a fresh token pair
    #[arg(long, value_name = "USERNAME")]
    pub create_admin: Option<String>,

    /// Log output format
    #[arg(short, long, default_value = "pretty")]
    pub log_format: LogFormat,
}

/// Parse a token lifetime such as "30m" or "7d". A bare number means seconds.
pub fn parse_expiry(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    let split = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    let (digits, unit) = s.split_at(split);

    let value: u64 = digits
        .parse()
        .map_err(|_| format!("Invalid duration: {:?}", s))?;

    let multiplier = match unit {
        "" | "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        "d" => 24 * 60 * 60,
        "w" => 7 * 24 * 60 * 60,
        _ => return Err(format!("Unknown duration unit {:?} in {:?}", unit, s)),
    };

    if value == 0 {
        return Err(format!("Duration must be greater than zero: {:?}", s));
    }

    value
        .checked_mul(multiplier)
        .map(Duration::from_secs)
        .filter(|d| *d <= MAX_EXPIRY)
        .ok_or_else(|| format!("Duration is too large: {:?}", s))
}

/// Initialize logging based on the specified format.
pub fn init_logging(format: &LogFormat) {
    match format {
        LogFormat::Pretty => tracing_subscriber::fmt::init(),
        LogFormat::Json => tracing_subscriber::fmt().json().init(),
        LogFormat::Compact => tracing_subscriber::fmt().compact().init(),
    }
}

/// Load a signing secret from an environment variable or file.
/// Returns None and logs an error if the secret cannot be loaded.
pub fn load_secret(env_var: &str, secret_file: Option<&str>) -> Option<String> {
    let secret = if let Ok(secret) = std::env::var(env_var) {
        // Clear the environment variable to prevent leaking
        // SAFETY: Called during startup before the server accepts connections.
        // No other thread reads or writes the environment concurrently.
        unsafe { std::env::remove_var(env_var) };
        secret
    } else if let Some(path) = secret_file {
        match std::fs::read_to_string(path) {
            Ok(content) => content.trim().to_string(),
            Err(e) => {
                error!(path = %path, error = %e, "Failed to read secret file");
                return None;
            }
        }
    } else {
        error!(
            "{} is required. Set the environment variable (recommended) or use the matching --*-secret-file flag",
            env_var
        );
        return None;
    };

    if secret.len() < MIN_SECRET_LENGTH {
        error!(
            "{} is shorter than {} characters. Use a longer secret",
            env_var, MIN_SECRET_LENGTH
        );
        return None;
    }

    Some(secret)
}

/// Build the token configuration from loaded secrets and parsed lifetimes.
/// Returns None and logs an error if the secrets are identical.
pub fn build_token_config(
    access_secret: String,
    refresh_secret: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
) -> Option<TokenConfig> {
    if access_secret == refresh_secret {
        error!(
            "{} and {} must be different",
            ACCESS_SECRET_ENV, REFRESH_SECRET_ENV
        );
        return None;
    }

    Some(
        TokenConfig::new(access_secret, refresh_secret)
            .with_access_ttl(access_ttl)
            .with_refresh_ttl(refresh_ttl),
    )
}

/// Handle the --create-admin flag: create the admin if needed and print a new token pair.
pub async fn handle_create_admin(db: &Database, tokens: &TokenConfig, username: &str) {
    let users = db.users();

    let user = match users.get_by_username(username).await {
        Ok(Some(existing)) if existing.role == UserRole::Admin => existing,
        Ok(Some(_)) => {
            error!(username = %username, "User exists and is not an admin");
            std::process::exit(1);
        }
        Ok(None) => {
            let created = match users.create_admin(username).await {
                Ok(id) => users.get_by_id(id).await,
                Err(e) => Err(e),
            };
            match created {
                Ok(Some(user)) => {
                    info!(username = %username, "Admin user created");
                    user
                }
                Ok(None) => {
                    error!(username = %username, "Admin user disappeared after creation");
                    std::process::exit(1);
                }
                Err(e) => {
                    error!(error = %e, "Failed to create admin user");
                    std::process::exit(1);
                }
            }
        }
        Err(e) => {
            error!(error = %e, "Failed to check for existing admin");
            std::process::exit(1);
        }
    };

    match start_session(&users, &TokenService::new(tokens), &user).await {
        Ok(pair) => {
            println!();
            println!("Admin: {} (id {})", user.user_name, user.id);
            println!("Access token: {}", pair.access_token);
            println!("Refresh token: {}", pair.refresh_token);
            println!();
        }
        Err(e) => {
            error!(error = %e, "Failed to start admin session");
            std::process::exit(1);
        }
    }
}

/// Open the database, logging errors if it fails.
pub async fn open_database(path: &str) -> Option<Database> {
    match Database::open(path).await {
        Ok(db) => {
            info!(path = %path, "Database opened");
            Some(db)
        }
        Err(e) => {
            error!(path = %path, error = %e, "Failed to open database");
            None
        }
    }
}
