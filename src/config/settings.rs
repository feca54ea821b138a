// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

use crate::infrastructure::cache::cache_strategy::{CacheStrategyConfig, CacheType};

/// 环境变量前缀，例如 `SYNCHOOK__SERVER__PORT=8080`
pub const ENV_PREFIX: &str = "SYNCHOOK";

/// 应用程序配置设置
///
/// 包含服务器、数据库、响应缓存、Webhook、指标和日志等所有配置项
#[derive(Debug, Deserialize)]
pub struct Settings {
    /// 服务器配置
    pub server: ServerSettings,
    /// 数据库配置
    pub database: DatabaseSettings,
    /// 响应缓存配置
    pub cache: CacheSettings,
    /// Webhook 配置
    pub webhook: WebhookSettings,
    /// 指标配置
    pub metrics: MetricsSettings,
    /// 日志配置
    pub logging: LoggingSettings,
}

/// 数据库配置设置
#[derive(Debug, Deserialize)]
pub struct DatabaseSettings {
    /// 数据库连接URL
    pub url: String,
    /// 最大连接数
    pub max_connections: Option<u32>,
    /// 最小连接数
    pub min_connections: Option<u32>,
    /// 连接超时时间（秒）
    pub connect_timeout: Option<u64>,
    /// 是否输出SQL日志
    pub sqlx_logging: bool,
    /// 启动时是否执行迁移
    pub run_migrations: bool,
}

/// 服务器配置设置
#[derive(Debug, Deserialize)]
pub struct ServerSettings {
    /// 服务器监听主机地址
    pub host: String,
    /// 服务器监听端口
    pub port: u16,
}

/// 响应缓存配置设置
#[derive(Debug, Deserialize)]
pub struct CacheSettings {
    /// 缓存后端 (memory, redis)
    pub backend: CacheType,
    /// Redis连接URL (当 backend=redis 时使用)
    pub redis_url: Option<String>,
    /// 内存缓存最大条目数
    pub max_entries: usize,
    /// 列表响应的缓存时间（秒）
    pub default_ttl_secs: u64,
}

impl CacheSettings {
    pub fn strategy_config(&self) -> CacheStrategyConfig {
        CacheStrategyConfig {
            cache_type: self.backend,
            ttl_seconds: self.default_ttl_secs,
            max_entries: self.max_entries,
        }
    }

    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl_secs)
    }
}

/// Webhook配置设置
#[derive(Debug, Deserialize)]
pub struct WebhookSettings {
    /// Webhook签名密钥
    pub secret: String,
    /// 同步请求超时时间（秒）
    pub sync_timeout_secs: u64,
    /// 投递尝试中保存的响应体上限（字节）
    pub max_response_body_bytes: usize,
    /// 接受的响应体上限（字节）
    pub max_response_bytes: usize,
}

impl WebhookSettings {
    pub fn sync_timeout(&self) -> Duration {
        Duration::from_secs(self.sync_timeout_secs)
    }
}

/// 指标配置设置
#[derive(Debug, Deserialize)]
pub struct MetricsSettings {
    /// 是否启用Prometheus导出器
    pub enabled: bool,
    /// 导出器监听地址
    pub listen_addr: String,
}

/// 日志配置设置
#[derive(Debug, Deserialize)]
pub struct LoggingSettings {
    /// 是否输出JSON格式日志
    pub json: bool,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 依次叠加内置默认值、`config/default`、`config/{APP_ENVIRONMENT}` 和环境变量
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let builder = Self::builder()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Self::environment());

        builder.build()?.try_deserialize()
    }

    /// 只包含内置默认值的配置构建器
    pub fn builder() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            // Server
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            // Database
            .set_default("database.url", "sqlite://synchook.db?mode=rwc")?
            .set_default("database.max_connections", 20)?
            .set_default("database.min_connections", 1)?
            .set_default("database.connect_timeout", 10)?
            .set_default("database.sqlx_logging", false)?
            .set_default("database.run_migrations", true)?
            // Response cache
            .set_default("cache.backend", "memory")?
            .set_default("cache.max_entries", 10000)?
            .set_default("cache.default_ttl_secs", 300)?
            // Webhook
            .set_default("webhook.secret", "your-secret-key")?
            .set_default("webhook.sync_timeout_secs", 20)?
            .set_default("webhook.max_response_body_bytes", 4096)?
            .set_default("webhook.max_response_bytes", 1_048_576)?
            // Metrics
            .set_default("metrics.enabled", false)?
            .set_default("metrics.listen_addr", "0.0.0.0:9000")?
            // Logging
            .set_default("logging.json", false)
    }

    /// 环境变量来源
    pub fn environment() -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true)
    }
}
