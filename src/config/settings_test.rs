#[cfg(test)]
mod tests {
    use crate::config::settings::Settings;
    use crate::infrastructure::cache::cache_strategy::CacheType;
    use std::collections::HashMap;
    use std::time::Duration;

    fn load(env: &[(&str, &str)]) -> Settings {
        let vars: HashMap<String, String> = env
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::builder()
            .unwrap()
            .add_source(Settings::environment().source(Some(vars)))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let settings = load(&[]);

        assert_eq!(settings.server.port, 3000);
        assert_eq!(settings.cache.backend, CacheType::Memory);
        assert_eq!(settings.cache.default_ttl(), Duration::from_secs(300));
        assert_eq!(settings.webhook.sync_timeout(), Duration::from_secs(20));
        assert_eq!(settings.webhook.max_response_body_bytes, 4096);
        assert_eq!(settings.webhook.max_response_bytes, 1_048_576);
        assert!(settings.cache.redis_url.is_none());
        assert!(!settings.metrics.enabled);
        assert!(settings.database.run_migrations);
    }

    #[test]
    fn test_environment_overrides() {
        let settings = load(&[
            ("SYNCHOOK__SERVER__PORT", "8080"),
            ("SYNCHOOK__CACHE__BACKEND", "redis"),
            ("SYNCHOOK__CACHE__REDIS_URL", "redis://localhost:6379"),
            ("SYNCHOOK__WEBHOOK__SYNC_TIMEOUT_SECS", "5"),
            ("SYNCHOOK__METRICS__ENABLED", "true"),
        ]);

        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.cache.backend, CacheType::Redis);
        assert_eq!(
            settings.cache.redis_url.as_deref(),
            Some("redis://localhost:6379")
        );
        assert_eq!(settings.webhook.sync_timeout(), Duration::from_secs(5));
        assert!(settings.metrics.enabled);

        let strategy = settings.cache.strategy_config();
        assert_eq!(strategy.cache_type, CacheType::Redis);
        assert_eq!(strategy.ttl_seconds, 300);
    }

    #[test]
    fn test_config_loading_from_default_toml() {
        let settings = Settings::new().expect("configuration should load");
        assert!(!settings.webhook.secret.is_empty());
    }
}
