use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: String,
    pub max_conns: u32,
    pub min_conns: u32,
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db: DbConfig,
    pub server_host: String,
    pub server_port: u16,
    pub request_timeout_secs: u64,
}

impl AppConfig {
    /// Reads settings from the process environment. Never fails: every
    /// setting has a default and unparsable numbers fall back to it.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| -> String {
            lookup(key)
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let db = DbConfig {
            host: var("DB_HOST", "localhost"),
            port: parse_or(&lookup, "DB_PORT", 5432),
            name: var("DB_NAME", "benchdb"),
            user: var("DB_USER", "benchuser"),
            password: var("DB_PASSWORD", "benchpass"),
            max_conns: parse_or(&lookup, "DB_MAX_CONNS", 100),
            min_conns: parse_or(&lookup, "DB_MIN_CONNS", 10),
            acquire_timeout_secs: parse_or(&lookup, "DB_ACQUIRE_TIMEOUT_SECS", 5),
        };

        Self {
            db,
            server_host: var("SERVER_HOST", "0.0.0.0"),
            server_port: parse_or(&lookup, "SERVER_PORT", 8080),
            // a zero deadline would expire every request
            request_timeout_secs: Some(parse_or(&lookup, "REQUEST_TIMEOUT_SECS", 30u64))
                .filter(|secs| *secs > 0)
                .unwrap_or(30),
        }
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    lookup(key)
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}
