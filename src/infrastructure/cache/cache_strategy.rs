// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::domain::models::webhook::WEBHOOK_CACHE_DEFAULT_TIMEOUT;
use crate::infrastructure::cache::redis_client::RedisClient;

/// Redis中响应缓存键的命名空间
const REDIS_KEY_PREFIX: &str = "sync_webhook:";

/// 缓存策略配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStrategyConfig {
    /// 缓存类型
    pub cache_type: CacheType,
    /// 未指定TTL时使用的TTL（秒）
    pub ttl_seconds: u64,
    /// 内存缓存最大条目数
    pub max_entries: usize,
}

impl Default for CacheStrategyConfig {
    fn default() -> Self {
        Self {
            cache_type: CacheType::Memory,
            ttl_seconds: WEBHOOK_CACHE_DEFAULT_TIMEOUT.as_secs(),
            max_entries: 10000,
        }
    }
}

/// 缓存类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheType {
    /// 进程内缓存
    Memory,
    /// Redis缓存，多个实例共享
    Redis,
}

/// 缓存统计信息
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub stores: u64,
    pub deletes: u64,
    pub evictions: u64,
}

/// 缓存条目
#[derive(Clone)]
struct CacheEntry {
    data: Value,
    created_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn new(data: Value, ttl: Duration) -> Self {
        Self {
            data,
            created_at: Instant::now(),
            ttl,
        }
    }

    fn is_expired(&self) -> bool {
        self.created_at.elapsed() >= self.ttl
    }
}

/// 缓存策略接口
///
/// 保存应用返回的原始JSON响应，键由调用方生成。
#[async_trait]
pub trait CacheStrategy: Send + Sync {
    /// 获取缓存值，过期或不存在时返回None
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// 设置缓存值，`ttl` 为空时使用配置的默认TTL
    async fn set(&self, key: &str, value: &Value, ttl: Option<Duration>) -> Result<()>;

    /// 删除缓存值，键不存在时不报错
    async fn delete(&self, key: &str) -> Result<()>;

    /// 清空缓存
    async fn clear(&self) -> Result<()>;

    /// 获取缓存统计信息
    fn get_stats(&self) -> CacheStats;
}

/// 内存缓存策略
pub struct MemoryCacheStrategy {
    cache: DashMap<String, CacheEntry>,
    config: CacheStrategyConfig,
    stats: Mutex<CacheStats>,
}

impl MemoryCacheStrategy {
    pub fn new(config: CacheStrategyConfig) -> Self {
        Self {
            cache: DashMap::new(),
            config,
            stats: Mutex::new(CacheStats::default()),
        }
    }

    /// 超出容量时先清理过期条目，仍然超出则淘汰最早写入的条目，
    /// 一次淘汰到容量的90%，之后的写入不必每次都扫描全部条目
    fn evict_if_needed(&self) {
        if self.cache.len() <= self.config.max_entries {
            return;
        }

        let before = self.cache.len();
        self.cache.retain(|_, entry| !entry.is_expired());

        let low_watermark = self.config.max_entries - self.config.max_entries / 10;
        let overflow = self.cache.len().saturating_sub(low_watermark);
        if overflow > 0 {
            let mut entries: Vec<(String, Instant)> = self
                .cache
                .iter()
                .map(|entry| (entry.key().clone(), entry.value().created_at))
                .collect();
            if overflow < entries.len() {
                entries.select_nth_unstable_by_key(overflow - 1, |(_, created_at)| *created_at);
            }

            for (key, _) in entries.into_iter().take(overflow) {
                self.cache.remove(&key);
            }
        }

        let evicted = before - self.cache.len();
        self.stats.lock().evictions += evicted as u64;
        debug!("Evicted {} entries from memory cache", evicted);
    }
}

#[async_trait]
impl CacheStrategy for MemoryCacheStrategy {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let data = match self.cache.get(key) {
            Some(entry) if !entry.is_expired() => Some(entry.data.clone()),
            Some(entry) => {
                drop(entry);
                self.cache.remove_if(key, |_, entry| entry.is_expired());
                None
            }
            None => None,
        };

        let mut stats = self.stats.lock();
        if data.is_some() {
            stats.hits += 1;
        } else {
            stats.misses += 1;
        }
        Ok(data)
    }

    async fn set(&self, key: &str, value: &Value, ttl: Option<Duration>) -> Result<()> {
        let ttl = ttl.unwrap_or(Duration::from_secs(self.config.ttl_seconds));
        self.cache
            .insert(key.to_string(), CacheEntry::new(value.clone(), ttl));
        self.evict_if_needed();

        self.stats.lock().stores += 1;
        debug!("Stored response in memory cache for key: {}", key);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.cache.remove(key);
        self.stats.lock().deletes += 1;
        debug!("Deleted cache entry for key: {}", key);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.cache.clear();
        info!("Cleared all memory cache entries");
        Ok(())
    }

    fn get_stats(&self) -> CacheStats {
        self.stats.lock().clone()
    }
}

/// Redis缓存策略
pub struct RedisCacheStrategy {
    redis_client: Arc<RedisClient>,
    config: CacheStrategyConfig,
    stats: Mutex<CacheStats>,
}

impl RedisCacheStrategy {
    pub fn new(redis_client: Arc<RedisClient>, config: CacheStrategyConfig) -> Self {
        Self {
            redis_client,
            config,
            stats: Mutex::new(CacheStats::default()),
        }
    }

    fn generate_cache_key(&self, key: &str) -> String {
        format!("{}{}", REDIS_KEY_PREFIX, key)
    }
}

#[async_trait]
impl CacheStrategy for RedisCacheStrategy {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let cache_key = self.generate_cache_key(key);

        match self.redis_client.get(&cache_key).await? {
            Some(json_str) => {
                let value: Value = serde_json::from_str(&json_str)?;
                self.stats.lock().hits += 1;
                debug!("Cache hit for key: {}", key);
                Ok(Some(value))
            }
            None => {
                self.stats.lock().misses += 1;
                debug!("Cache miss for key: {}", key);
                Ok(None)
            }
        }
    }

    async fn set(&self, key: &str, value: &Value, ttl: Option<Duration>) -> Result<()> {
        let cache_key = self.generate_cache_key(key);
        let ttl = ttl.unwrap_or(Duration::from_secs(self.config.ttl_seconds));
        // SETEX rejects a zero expiry.
        let ttl_seconds = ttl.as_secs().max(1);

        let json_str = serde_json::to_string(value)?;
        self.redis_client
            .set(&cache_key, &json_str, ttl_seconds)
            .await?;

        self.stats.lock().stores += 1;
        debug!("Stored response in Redis cache for key: {}", key);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let cache_key = self.generate_cache_key(key);
        self.redis_client.delete(&cache_key).await?;

        self.stats.lock().deletes += 1;
        debug!("Deleted cache entry for key: {}", key);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let removed = self
            .redis_client
            .delete_by_prefix(REDIS_KEY_PREFIX)
            .await?;
        info!("Cleared {} Redis cache entries", removed);
        Ok(())
    }

    fn get_stats(&self) -> CacheStats {
        self.stats.lock().clone()
    }
}

/// 缓存策略工厂
pub struct CacheStrategyFactory;

impl CacheStrategyFactory {
    /// 进程内缓存策略
    pub fn memory(config: CacheStrategyConfig) -> Box<dyn CacheStrategy> {
        Box::new(MemoryCacheStrategy::new(config))
    }

    pub fn create_strategy(
        config: CacheStrategyConfig,
        redis_client: Option<Arc<RedisClient>>,
    ) -> Result<Box<dyn CacheStrategy>> {
        match config.cache_type {
            CacheType::Memory => Ok(Self::memory(config)),
            CacheType::Redis => {
                let redis_client = redis_client
                    .ok_or_else(|| anyhow!("Redis client required for Redis cache type"))?;
                Ok(Box::new(RedisCacheStrategy::new(redis_client, config)))
            }
        }
    }
}
