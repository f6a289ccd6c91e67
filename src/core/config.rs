use dotenv::dotenv;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    /// Page size used when a ListMessages call does not ask for one.
    pub default_page_size: i64,
    /// Hard ceiling for ListMessages page sizes.
    pub max_page_size: i64,
    /// Typing indicators older than this are treated as expired.
    pub typing_ttl_secs: i64,
    pub app_env: String,
}

impl Config {
    /// Load configuration from environment variables, reading `.env`
    /// automatically. Everything has a default so embedding the core in
    /// tests needs no environment at all.
    pub fn from_env() -> Result<Self, String> {
        dotenv().ok();

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://chatcore.db".to_string());

        let max_connections = env::var("MAX_DB_CONNECTIONS")
            .unwrap_or_else(|_| "5".to_string())
            .parse::<u32>()
            .map_err(|_| "Invalid MAX_DB_CONNECTIONS: must be a positive number".to_string())?;

        let default_page_size = env::var("DEFAULT_PAGE_SIZE")
            .unwrap_or_else(|_| "20".to_string())
            .parse::<i64>()
            .map_err(|_| "Invalid DEFAULT_PAGE_SIZE: must be a positive number".to_string())?;

        let max_page_size = env::var("MAX_PAGE_SIZE")
            .unwrap_or_else(|_| "100".to_string())
            .parse::<i64>()
            .map_err(|_| "Invalid MAX_PAGE_SIZE: must be a positive number".to_string())?;

        if default_page_size < 1 || max_page_size < default_page_size {
            return Err(
                "Page size bounds must satisfy 1 <= DEFAULT_PAGE_SIZE <= MAX_PAGE_SIZE".to_string(),
            );
        }

        let typing_ttl_secs = env::var("TYPING_TTL_SECS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<i64>()
            .map_err(|_| "Invalid TYPING_TTL_SECS: must be a positive number".to_string())?;

        let app_env = env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        Ok(Config {
            database_url,
            max_connections,
            default_page_size,
            max_page_size,
            typing_ttl_secs,
            app_env,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite://chatcore.db".to_string(),
            max_connections: 5,
            default_page_size: 20,
            max_page_size: 100,
            typing_ttl_secs: 10,
            app_env: "development".to_string(),
        }
    }
}
