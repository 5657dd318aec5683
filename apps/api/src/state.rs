use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;
use axum::extract::FromRef;
use sqlx::PgPool;

use crate::config::Config;
use crate::extractors::{CronSecret, JwtKeys};
use crate::llm_client::LlmClient;
use crate::notifications::email::EmailSender;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub s3: S3Client,
    pub llm: LlmClient,
    /// Digest delivery. Resend when an API key is configured, otherwise a no-op.
    pub email: Arc<dyn EmailSender>,
    pub jwt: JwtKeys,
    pub cron_secret: CronSecret,
    pub config: Config,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        state.jwt.clone()
    }
}

impl FromRef<AppState> for CronSecret {
    fn from_ref(state: &AppState) -> Self {
        state.cron_secret.clone()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::extractors::auth::tests::TEST_SECRET;
    use crate::notifications::email::NoopEmailSender;
    use aws_sdk_s3::config::{BehaviorVersion, Region};
    use sqlx::postgres::PgPoolOptions;

    pub(crate) const TEST_CRON_SECRET: &str = "cron-test-secret";

    pub(crate) fn test_config() -> Config {
        Config {
            database_url: "postgres://localhost/pourtrait_test".to_string(),
            s3_bucket: "test-bucket".to_string(),
            s3_endpoint: "http://localhost:9000".to_string(),
            aws_access_key_id: "test".to_string(),
            aws_secret_access_key: "test".to_string(),
            openai_api_key: "sk-test".to_string(),
            openai_model: "gpt-4o-mini".to_string(),
            openai_base_url: "http://localhost:9".to_string(),
            jwt_secret: TEST_SECRET.to_string(),
            jwt_audience: "authenticated".to_string(),
            cron_secret: TEST_CRON_SECRET.to_string(),
            resend_api_key: None,
            email_from: "test@example.com".to_string(),
            app_base_url: "http://localhost:3000".to_string(),
            app_env: "development".to_string(),
            run_migrations: false,
            port: 0,
            rust_log: "debug".to_string(),
        }
    }

    /// State whose pool never connects; only routes that fail before touching
    /// the database may be exercised with it.
    pub(crate) fn test_state() -> AppState {
        let config = test_config();
        let db = PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .unwrap();
        let s3_config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .build();
        AppState {
            db,
            s3: S3Client::from_conf(s3_config),
            llm: LlmClient::new(
                config.openai_api_key.clone(),
                config.openai_model.clone(),
                &config.openai_base_url,
            )
            .unwrap(),
            email: Arc::new(NoopEmailSender),
            jwt: JwtKeys::new(&config.jwt_secret, &config.jwt_audience),
            cron_secret: CronSecret(Arc::from(config.cron_secret.as_str())),
            config,
        }
    }
}
