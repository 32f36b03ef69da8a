use crate::config::LoggingConfig;
use crate::error::AppError;
use tracing_subscriber::{
    fmt, prelude::*, registry, EnvFilter, Layer, Registry,
};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// 初始化全局日志；`RUST_LOG` 存在时覆盖配置中的级别
pub fn init_logging(config: &LoggingConfig) -> Result<(), AppError> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| AppError::Internal(format!("Invalid log level '{}': {}", config.level, e)))?;

    registry()
        .with(formatting_layer(&config.format).with_filter(env_filter))
        .try_init()
        .map_err(|e| AppError::Internal(format!("Failed to initialize logging: {}", e)))?;

    Ok(())
}

fn formatting_layer(format: &str) -> BoxedLayer {
    match format {
        "json" => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .boxed(),
        "compact" => fmt::layer().compact().with_target(false).boxed(),
        _ => fmt::layer().pretty().boxed(),
    }
}
