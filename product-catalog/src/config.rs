use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::path::Path;

use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Clone)]
pub struct DatabaseConfig {
    /// 完整连接串，设置后优先于下面的分项
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub max_connections: u32,
}

#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_expiry_hours: u64,
    pub admin_username: String,
    pub admin_password: String,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

/// 环境变量的扁平形式，`SERVER_PORT` -> `server_port`
#[derive(Debug, Deserialize)]
struct RawSettings {
    server_host: String,
    server_port: u16,
    database_url: Option<String>,
    db_host: String,
    db_port: u16,
    db_user: String,
    db_password: String,
    db_name: String,
    db_max_connections: u32,
    jwt_secret: Option<String>,
    jwt_expiry_hours: u64,
    admin_username: Option<String>,
    admin_password: Option<String>,
    log_level: String,
    log_format: String,
}

impl Config {
    pub fn load() -> Result<Self, AppError> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config".to_string());
        Self::build(&config_path, config::Environment::default())
    }

    fn build(config_path: &str, environment: config::Environment) -> Result<Self, AppError> {
        let builder = config::Config::builder()
            .set_default("server_host", "0.0.0.0")?
            .set_default("server_port", 8080)?
            .set_default("db_host", "postgres")?
            .set_default("db_port", 5432)?
            .set_default("db_user", "postgres")?
            .set_default("db_password", "")?
            .set_default("db_name", "product_catalog")?
            .set_default("db_max_connections", 10)?
            .set_default("jwt_expiry_hours", 24)?
            .set_default("log_level", "info")?
            .set_default("log_format", "pretty")?
            .add_source(config::File::from(Path::new(config_path).join("default")).required(false))
            .add_source(environment);

        let raw: RawSettings = builder.build()?.try_deserialize()?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawSettings) -> Result<Self, AppError> {
        let jwt_secret = required(raw.jwt_secret, "JWT_SECRET")?;
        let admin_username = required(raw.admin_username, "ADMIN_USERNAME")?;
        let admin_password = required(raw.admin_password, "ADMIN_PASSWORD")?;

        Ok(Self {
            server: ServerConfig {
                host: raw.server_host,
                port: raw.server_port,
            },
            database: DatabaseConfig {
                url: raw.database_url.filter(|url| !url.is_empty()),
                host: raw.db_host,
                port: raw.db_port,
                user: raw.db_user,
                password: raw.db_password,
                name: raw.db_name,
                max_connections: raw.db_max_connections,
            },
            auth: AuthConfig {
                jwt_secret,
                token_expiry_hours: raw.jwt_expiry_hours,
                admin_username,
                admin_password,
            },
            logging: LoggingConfig {
                level: raw.log_level,
                format: raw.log_format,
            },
        })
    }

    /// 测试用：不读取进程环境，只使用给定的变量
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, AppError> {
        Self::build("config", config::Environment::default().source(Some(vars)))
    }
}

fn required(value: Option<String>, name: &str) -> Result<String, AppError> {
    match value {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(AppError::Config(config::ConfigError::Message(format!(
            "{name} is required"
        )))),
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &self.url.as_ref().map(|_| "<redacted>"))
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("name", &self.name)
            .field("max_connections", &self.max_connections)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token_expiry_hours", &self.token_expiry_hours)
            .field("admin_username", &self.admin_username)
            .finish_non_exhaustive()
    }
}
