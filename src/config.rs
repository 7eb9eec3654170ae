use std::env;

const DEFAULT_JWT_EXPIRES_IN_HOURS: i64 = 24;
const MAX_JWT_EXPIRES_IN_HOURS: i64 = 24 * 365;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_expires_in_hours: i64,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET is not set"))?;
        if jwt_secret.trim().is_empty() {
            anyhow::bail!("JWT_SECRET is empty");
        }
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let jwt_expires_in_hours =
            parse_expiry_hours(env::var("JWT_EXPIRES_IN_HOURS").ok().as_deref())?;
        let database_max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|n| n.parse::<u32>().ok())
            .unwrap_or(10);
        Ok(Self {
            port,
            database_url,
            database_max_connections,
            host,
            jwt_secret,
            jwt_expires_in_hours,
        })
    }
}

/// Missing or non-numeric values fall back to the default; out-of-range values are rejected.
fn parse_expiry_hours(raw: Option<&str>) -> anyhow::Result<i64> {
    let Some(hours) = raw.and_then(|h| h.trim().parse::<i64>().ok()) else {
        return Ok(DEFAULT_JWT_EXPIRES_IN_HOURS);
    };
    if !(1..=MAX_JWT_EXPIRES_IN_HOURS).contains(&hours) {
        anyhow::bail!(
            "JWT_EXPIRES_IN_HOURS must be between 1 and {MAX_JWT_EXPIRES_IN_HOURS}, got {hours}"
        );
    }
    Ok(hours)
}
