use anyhow::{bail, Context, Result};
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    pub host: String,
    pub port: u16,

    // Student directory (identity source)
    pub student_directory_url: String,
    pub lookup_timeout: Duration,

    // Circuit breaker for the directory dependency
    pub breaker_failure_threshold: u32,
    pub breaker_failure_window: Duration,
    pub breaker_open_cooldown: Duration,
    pub breaker_half_open_successes: u32,

    // Rate Limiting
    pub rate_limit_per_second: u64,
    pub rate_limit_burst: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let environment = Self::parse_environment()?;

        let config = Self {
            environment: environment.clone(),
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("Invalid PORT")?,

            student_directory_url: std::env::var("STUDENT_DIRECTORY_URL")
                .context("STUDENT_DIRECTORY_URL required")?,
            lookup_timeout: Duration::from_millis(Self::parse_u64("LOOKUP_TIMEOUT_MS", 3000)?),

            breaker_failure_threshold: Self::parse_u64("BREAKER_FAILURE_THRESHOLD", 5)? as u32,
            breaker_failure_window: Duration::from_secs(Self::parse_u64(
                "BREAKER_FAILURE_WINDOW_SECS",
                60,
            )?),
            breaker_open_cooldown: Duration::from_secs(Self::parse_u64(
                "BREAKER_OPEN_COOLDOWN_SECS",
                30,
            )?),
            breaker_half_open_successes: Self::parse_u64("BREAKER_HALF_OPEN_SUCCESSES", 2)? as u32,

            rate_limit_per_second: Self::parse_u64("RATE_LIMIT_PER_SECOND", 10)?,
            rate_limit_burst: Self::parse_u64("RATE_LIMIT_BURST", 30)? as u32,
        };

        config.validate()?;
        Ok(config)
    }

    fn parse_environment() -> Result<Environment> {
        let env = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        match env.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "staging" | "stage" => Ok(Environment::Staging),
            "production" | "prod" => Ok(Environment::Production),
            _ => bail!("Unknown environment: {}", env),
        }
    }

    fn parse_u64(var: &str, default: u64) -> Result<u64> {
        std::env::var(var)
            .unwrap_or_else(|_| default.to_string())
            .parse()
            .with_context(|| format!("Invalid {}", var))
    }

    fn validate(&self) -> Result<()> {
        if !self.student_directory_url.starts_with("http") {
            bail!("STUDENT_DIRECTORY_URL must be HTTP(S) URL");
        }
        if self.breaker_failure_threshold == 0 {
            bail!("BREAKER_FAILURE_THRESHOLD must be at least 1");
        }
        if self.breaker_half_open_successes == 0 {
            bail!("BREAKER_HALF_OPEN_SUCCESSES must be at least 1");
        }

        tracing::info!(
            "Configuration validated for {:?} environment",
            self.environment
        );

        Ok(())
    }
}
