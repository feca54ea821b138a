// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use anyhow::Result;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::infrastructure::cache::cache_strategy::{
    CacheStats, CacheStrategy, CacheStrategyConfig, CacheStrategyFactory, CacheType,
};
use crate::infrastructure::cache::redis_client::RedisClient;

/// 缓存管理器
///
/// 同步Webhook响应缓存的统一入口。后端错误在这里被记录并当作未命中处理，
/// 调用方因此不需要区分"没有缓存"和"缓存不可用"。
pub struct CacheManager {
    strategy: Box<dyn CacheStrategy>,
    config: CacheStrategyConfig,
}

impl CacheManager {
    /// 创建新的缓存管理器
    pub async fn new(config: CacheStrategyConfig, redis_url: Option<&str>) -> Result<Self> {
        let redis_client = match (config.cache_type, redis_url) {
            (CacheType::Redis, Some(url)) => {
                let client = RedisClient::new(url).await?;
                if let Err(e) = client.ping().await {
                    warn!("Redis at {} is not reachable yet: {}", url, e);
                }
                Some(Arc::new(client))
            }
            _ => None,
        };

        let strategy = CacheStrategyFactory::create_strategy(config.clone(), redis_client)?;
        info!("Response cache initialized with {:?} backend", config.cache_type);

        Ok(Self { strategy, config })
    }

    /// 使用指定策略创建缓存管理器
    pub fn with_strategy(strategy: Box<dyn CacheStrategy>, config: CacheStrategyConfig) -> Self {
        Self { strategy, config }
    }

    /// 进程内缓存
    pub fn in_memory() -> Self {
        let config = CacheStrategyConfig::default();
        Self::with_strategy(CacheStrategyFactory::memory(config.clone()), config)
    }

    /// 获取缓存值
    pub async fn get(&self, key: &str) -> Option<Value> {
        match self.strategy.get(key).await {
            Ok(Some(value)) => {
                metrics::counter!("sync_webhook_cache_hits_total").increment(1);
                Some(value)
            }
            Ok(None) => {
                metrics::counter!("sync_webhook_cache_misses_total").increment(1);
                None
            }
            Err(e) => {
                warn!("Cache lookup failed for key {}, treating as miss: {}", key, e);
                metrics::counter!("sync_webhook_cache_errors_total", "op" => "get").increment(1);
                None
            }
        }
    }

    /// 设置缓存值，覆盖已有的值
    pub async fn set(&self, key: &str, value: &Value, ttl: Option<Duration>) {
        if let Err(e) = self.strategy.set(key, value, ttl).await {
            warn!("Failed to store response in cache for key {}: {}", key, e);
            metrics::counter!("sync_webhook_cache_errors_total", "op" => "set").increment(1);
        }
    }

    /// 删除缓存值
    pub async fn delete(&self, key: &str) {
        if let Err(e) = self.strategy.delete(key).await {
            warn!("Failed to delete cache entry {}: {}", key, e);
            metrics::counter!("sync_webhook_cache_errors_total", "op" => "delete").increment(1);
        }
    }

    /// 清空缓存
    pub async fn clear(&self) -> Result<()> {
        self.strategy.clear().await
    }

    /// 获取缓存统计信息
    pub fn get_stats(&self) -> CacheStats {
        self.strategy.get_stats()
    }

    /// 未指定TTL时使用的TTL
    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.config.ttl_seconds)
    }
}
