//! CLI argument parsing, validation, and startup helpers.

use crate::ServerConfig;
use crate::db::Database;
use clap::Parser;
use thiserror::Error;
use tracing::info;
use url::Url;

const MIN_JWT_SECRET_LENGTH: usize = 32;

#[derive(clap::ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "snippetbox", about = "Share short text snippets")]
pub struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "8000")]
    pub port: u16,

    /// Path to SQLite database file
    #[arg(short, long, default_value = "snippetbox.db")]
    pub database: String,

    /// Public origin of the site (e.g., "https://snippets.example.com").
    /// Cookies are marked Secure when this is HTTPS
    #[arg(long, default_value = "http://localhost:8000")]
    pub origin: String,

    /// Path to file containing JWT secret. Prefer using JWT_SECRET env var instead
    #[arg(long)]
    pub jwt_secret_file: Option<String>,

    /// Log output format
    #[arg(short, long, default_value = "pretty")]
    pub log_format: LogFormat,
}

/// Startup configuration that cannot be used.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("JWT_SECRET is required. Set the environment variable or pass --jwt-secret-file")]
    MissingSecret,
    #[error("failed to read JWT secret file {path}: {source}")]
    SecretFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("JWT secret is shorter than {} bytes", MIN_JWT_SECRET_LENGTH)]
    SecretTooShort,
    #[error("invalid origin URL: {0}")]
    InvalidOrigin(#[from] url::ParseError),
    #[error("origin {0} must use HTTPS unless it is localhost")]
    InsecureOrigin(String),
}

/// Install the global tracing subscriber.
pub fn init_logging(format: &LogFormat) {
    let builder = tracing_subscriber::fmt();
    match format {
        LogFormat::Pretty => builder.init(),
        LogFormat::Json => builder.json().init(),
        LogFormat::Compact => builder.compact().init(),
    }
}

/// Read the signing secret from `JWT_SECRET`, falling back to a file.
///
/// The environment variable is removed once read so it does not leak into
/// child processes or crash dumps.
pub fn load_jwt_secret(jwt_secret_file: Option<&str>) -> Result<String, ConfigError> {
    let secret = match std::env::var("JWT_SECRET") {
        Ok(secret) => {
            // SAFETY: called from main before the runtime spawns any task
            // that could read the environment.
            unsafe { std::env::remove_var("JWT_SECRET") };
            secret
        }
        Err(_) => match jwt_secret_file {
            Some(path) => read_secret_file(path)?,
            None => return Err(ConfigError::MissingSecret),
        },
    };

    check_secret(secret)
}

fn read_secret_file(path: &str) -> Result<String, ConfigError> {
    std::fs::read_to_string(path)
        .map(|content| content.trim().to_string())
        .map_err(|source| ConfigError::SecretFile {
            path: path.to_string(),
            source,
        })
}

fn check_secret(secret: String) -> Result<String, ConfigError> {
    if secret.len() < MIN_JWT_SECRET_LENGTH {
        return Err(ConfigError::SecretTooShort);
    }
    Ok(secret)
}

/// Parse the public origin. Plain http is only accepted for localhost.
pub fn validate_origin(origin: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(origin)?;

    if url.scheme() != "https" && url.host_str() != Some("localhost") {
        return Err(ConfigError::InsecureOrigin(origin.to_string()));
    }

    Ok(url)
}

/// Assemble the server configuration. Cookies are `Secure` exactly when the
/// origin is https.
pub fn build_config(db: Database, origin: &Url, jwt_secret: String) -> ServerConfig {
    ServerConfig {
        db,
        jwt_secret: jwt_secret.into_bytes(),
        secure_cookies: origin.scheme() == "https",
    }
}

/// Open the database, logging where it lives.
pub async fn open_database(path: &str) -> Result<Database, sqlx::Error> {
    let db = Database::open(path).await?;
    info!(path = %path, "Database opened");
    Ok(db)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_origin() {
        assert!(validate_origin("http://localhost:8000").is_ok());
        assert!(validate_origin("https://snippets.example.com").is_ok());
        assert!(matches!(
            validate_origin("http://snippets.example.com"),
            Err(ConfigError::InsecureOrigin(_))
        ));
        assert!(matches!(
            validate_origin("not a url"),
            Err(ConfigError::InvalidOrigin(_))
        ));
    }

    #[test]
    fn test_secret_length() {
        assert!(matches!(
            check_secret("short".to_string()),
            Err(ConfigError::SecretTooShort)
        ));
        let long = "s".repeat(MIN_JWT_SECRET_LENGTH);
        assert_eq!(check_secret(long.clone()).unwrap(), long);
    }

    #[test]
    fn test_secret_file_is_trimmed() {
        let path = std::env::temp_dir().join(format!("snippetbox-cli-{}", std::process::id()));
        std::fs::write(&path, "  file-secret\n").unwrap();

        let secret = read_secret_file(path.to_str().unwrap()).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(secret, "file-secret");

        assert!(matches!(
            read_secret_file("/nonexistent/snippetbox-secret"),
            Err(ConfigError::SecretFile { .. })
        ));
    }

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["snippetbox"]);
        assert_eq!(args.port, 8000);
        assert_eq!(args.database, "snippetbox.db");
        assert_eq!(args.origin, "http://localhost:8000");
        assert!(args.jwt_secret_file.is_none());
    }

    #[tokio::test]
    async fn test_build_config_secure_cookies_follow_origin() {
        let db = Database::open(":memory:").await.unwrap();
        let secret = "x".repeat(MIN_JWT_SECRET_LENGTH);

        let https = Url::parse("https://snippets.example.com").unwrap();
        assert!(build_config(db.clone(), &https, secret.clone()).secure_cookies);

        let http = Url::parse("http://localhost:8000").unwrap();
        assert!(!build_config(db, &http, secret).secure_cookies);
    }
}
