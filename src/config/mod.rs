use serde::Deserialize;
use std::env;
use std::time::Duration;

// Главная структура конфигурации клиента
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub app: AppConfig,
}

// Настройки удалённого API кинотеатра
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
}

// Настройки приложения
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub environment: String,
    pub rust_log: String,
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Config {
    /// Читает переменные с префиксом `CINEMA_` (`CINEMA_API__BASE_URL`,
    /// `CINEMA_API__TIMEOUT_SECONDS`, `CINEMA_APP__ENVIRONMENT`) поверх значений
    /// по умолчанию. Обычный `RUST_LOG` важнее `CINEMA_APP__RUST_LOG`.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .set_default("api.base_url", "http://localhost:8000")?
            .set_default("api.timeout_seconds", 30)?
            .set_default("app.environment", "development")?
            .set_default("app.rust_log", "cinema_client=info")?
            .add_source(
                config::Environment::with_prefix("CINEMA")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("app.rust_log", env::var("RUST_LOG").ok())?
            .build()?
            .try_deserialize()
    }

    /// Конфигурация с явным адресом API, остальное по умолчанию.
    pub fn for_base_url(base_url: impl Into<String>) -> Self {
        Config {
            api: ApiConfig {
                base_url: base_url.into(),
                timeout_seconds: 30,
            },
            app: AppConfig {
                environment: "development".to_string(),
                rust_log: "cinema_client=info".to_string(),
            },
        }
    }
}
