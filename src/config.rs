use anyhow::{bail, Context};
use jsonwebtoken::Algorithm;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub algorithm: Algorithm,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
}

impl AppConfig {
    /// Read configuration from the environment once at startup. A missing
    /// secret or a malformed algorithm/TTL value is fatal.
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;

        let secret = std::env::var("JWT_SECRET").context("JWT_SECRET is not set")?;
        let algorithm = match std::env::var("JWT_ALGORITHM") {
            Ok(v) => v
                .parse::<Algorithm>()
                .with_context(|| format!("JWT_ALGORITHM '{v}' is not a valid algorithm name"))?,
            Err(_) => Algorithm::HS256,
        };
        // Tokens are signed with a shared secret, so only HMAC variants work.
        if !matches!(
            algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            bail!("JWT_ALGORITHM must be one of HS256, HS384, HS512");
        }
        let ttl_minutes = match std::env::var("JWT_TTL_MINUTES") {
            Ok(v) => v
                .parse::<i64>()
                .context("JWT_TTL_MINUTES is not an integer")?,
            Err(_) => 30,
        };

        Ok(Self {
            database_url,
            jwt: JwtConfig {
                secret,
                algorithm,
                ttl_minutes,
            },
        })
    }
}
