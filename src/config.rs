use std::str::FromStr;

/// How the `password` column is written and compared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PasswordStorage {
    /// Stored verbatim, compared by exact equality.
    #[default]
    Plain,
    /// Argon2id PHC string.
    Argon2,
}

impl FromStr for PasswordStorage {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plain" => Ok(Self::Plain),
            "argon2" => Ok(Self::Argon2),
            other => anyhow::bail!("unknown PASSWORD_STORAGE value: {other}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub password_storage: PasswordStorage,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let password_storage = match std::env::var("PASSWORD_STORAGE") {
            Ok(v) => v.parse()?,
            Err(_) => PasswordStorage::default(),
        };
        Ok(Self {
            database_url,
            max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(10),
            password_storage,
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: std::env::var("APP_PORT")
                .ok()
                .and_then(|v| v.parse::<u16>().ok())
                .unwrap_or(8080),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
