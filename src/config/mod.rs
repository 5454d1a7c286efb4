use std::{
    env,
    fmt::Display,
    io::{self, ErrorKind},
    net::SocketAddr,
    str::FromStr,
};

use tracing::warn;

pub mod cors;
pub mod security;

pub use cors::create_cors_layer;
pub use security::create_security_headers_layer;

const DEFAULT_DATABASE_URL: &str = "postgres://localhost/ticketing";

pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 365;
pub const MAX_TICKETS_PER_BOOKING: i32 = 100;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub max_connections: u32,
    pub session_ttl_hours: i64,
    pub max_tickets_per_booking: i32,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_or("PORT", env::var("PORT").ok(), 3001),
            max_connections: parse_or(
                "DATABASE_MAX_CONNECTIONS",
                env::var("DATABASE_MAX_CONNECTIONS").ok(),
                5,
            ),
            session_ttl_hours: parse_clamped(
                "SESSION_TTL_HOURS",
                env::var("SESSION_TTL_HOURS").ok(),
                24,
                1,
                MAX_SESSION_TTL_HOURS,
            ),
            max_tickets_per_booking: parse_clamped(
                "MAX_TICKETS_PER_BOOKING",
                env::var("MAX_TICKETS_PER_BOOKING").ok(),
                10,
                1,
                MAX_TICKETS_PER_BOOKING,
            ),
        }
    }

    /// Resolves `HOST:PORT`, so hostnames such as `localhost` work as well as
    /// literal addresses.
    pub async fn socket_addr(&self) -> io::Result<SocketAddr> {
        tokio::net::lookup_host((self.host.as_str(), self.port))
            .await?
            .next()
            .ok_or_else(|| {
                io::Error::new(
                    ErrorKind::NotFound,
                    format!("{} did not resolve to any address", self.host),
                )
            })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            host: "0.0.0.0".to_string(),
            port: 3001,
            max_connections: 5,
            session_ttl_hours: 24,
            max_tickets_per_booking: 10,
        }
    }
}

fn parse_clamped<T>(key: &str, raw: Option<String>, default: T, min: T, max: T) -> T
where
    T: FromStr + Display + Ord + Copy,
    T::Err: Display,
{
    let value = parse_or(key, raw, default);
    let clamped = value.clamp(min, max);
    if clamped != value {
        warn!("{key} value {value} is out of range, using {clamped}");
    }
    clamped
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    match raw {
        Some(value) => value.trim().parse().unwrap_or_else(|e| {
            warn!("Invalid {key} value '{value}': {e}, using default {default}");
            default
        }),
        None => default,
    }
}
