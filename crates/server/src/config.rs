use std::env;

use anyhow::Context;

#[derive(Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    pub production: bool,
    pub trust_proxy: bool,
    pub rate_limit_max: u32,
    pub rate_limit_window_secs: u64,
    pub piston_url: String,
    pub execute_timeout_secs: u64,
}

impl Config {
    /// Loads configuration from the process environment once at startup.
    /// A missing JWT_SECRET is fatal: without it every issued token would
    /// be forgeable, so the process refuses to start.
    pub fn from_env() -> anyhow::Result<Self> {
        let jwt_secret = env::var("JWT_SECRET")
            .context("JWT_SECRET environment variable is required but not set")?;

        Ok(Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5001),
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:./data/codecell.db?mode=rwc".to_string()),
            jwt_secret,
            production: env::var("APP_ENV").map(|v| v == "production").unwrap_or(false),
            // Forwarded-for headers are client-controlled unless a proxy we
            // run strips and rewrites them; only honor them when told so.
            trust_proxy: env::var("TRUST_PROXY")
                .map(|v| v == "1" || v == "true")
                .unwrap_or(false),
            rate_limit_max: env::var("RATE_LIMIT_MAX")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(20),
            rate_limit_window_secs: env::var("RATE_LIMIT_WINDOW_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
            piston_url: env::var("PISTON_URL")
                .unwrap_or_else(|_| "https://emkc.org/api/v2/piston".to_string()),
            execute_timeout_secs: env::var("EXECUTE_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
        })
    }
}
