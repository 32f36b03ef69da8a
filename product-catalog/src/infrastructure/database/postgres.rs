use sqlx::migrate::MigrateDatabase;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres};
use url::Url;

use crate::config::DatabaseConfig;
use crate::error::AppError;

/// `DATABASE_URL` 优先，否则由分项拼出连接串
pub fn connection_url(config: &DatabaseConfig) -> Result<String, AppError> {
    if let Some(url) = &config.url {
        return Ok(url.clone());
    }

    let mut url = Url::parse(&format!("postgres://{}:{}", config.host, config.port))
        .map_err(|e| AppError::Internal(format!("Invalid database host: {}", e)))?;
    url.set_username(&config.user)
        .map_err(|_| AppError::Internal("Invalid database user".to_string()))?;
    if !config.password.is_empty() {
        url.set_password(Some(&config.password))
            .map_err(|_| AppError::Internal("Invalid database password".to_string()))?;
    }
    url.set_path(&config.name);
    url.query_pairs_mut().append_pair("sslmode", "disable");

    Ok(url.to_string())
}

pub async fn init_postgres(config: &DatabaseConfig) -> Result<PgPool, AppError> {
    tracing::info!(host = %config.host, database = %config.name, "Initializing PostgreSQL connection pool");

    let url = connection_url(config)?;

    // 目标库不存在时先创建
    if !Postgres::database_exists(&url).await? {
        Postgres::create_database(&url).await?;
        tracing::info!(database = %config.name, "Database created");
    }

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&url)
        .await?;

    // 运行迁移
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await?;

    Ok(pool)
}
