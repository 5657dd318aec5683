use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub openai_api_key: String,
    pub openai_model: String,
    pub openai_base_url: String,
    pub jwt_secret: String,
    pub jwt_audience: String,
    pub cron_secret: String,
    pub resend_api_key: Option<String>,
    pub email_from: String,
    pub app_base_url: String,
    pub app_env: String,
    pub run_migrations: bool,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            s3_bucket: require_env("S3_BUCKET")?,
            s3_endpoint: require_env("S3_ENDPOINT")?,
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            openai_api_key: require_env("OPENAI_API_KEY")?,
            openai_model: optional_env("OPENAI_MODEL", crate::llm_client::DEFAULT_MODEL),
            openai_base_url: optional_env("OPENAI_BASE_URL", crate::llm_client::DEFAULT_BASE_URL),
            jwt_secret: require_env("SUPABASE_JWT_SECRET")?,
            jwt_audience: optional_env("JWT_AUDIENCE", "authenticated"),
            cron_secret: require_env("CRON_SECRET")?,
            resend_api_key: std::env::var("RESEND_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
            email_from: optional_env("EMAIL_FROM", "Pourtrait <alerts@pourtrait.app>"),
            app_base_url: optional_env("APP_BASE_URL", "http://localhost:3000"),
            app_env: optional_env("APP_ENV", "production"),
            run_migrations: std::env::var("RUN_MIGRATIONS")
                .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: optional_env("RUST_LOG", "info"),
        })
    }

    pub fn is_development(&self) -> bool {
        self.app_env == "development"
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
