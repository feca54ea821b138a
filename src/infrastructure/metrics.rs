// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use anyhow::{Context, Result};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::info;

use crate::config::settings::MetricsSettings;

/// 安装Prometheus导出器
///
/// 未启用时直接返回，`metrics` 宏在没有记录器时不产生任何开销。
pub fn init_metrics(settings: &MetricsSettings) -> Result<()> {
    if !settings.enabled {
        info!("Metrics exporter disabled");
        return Ok(());
    }

    let addr: SocketAddr = settings
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid metrics address '{}'", settings.listen_addr))?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .context("Failed to install Prometheus recorder")?;

    describe_metrics();
    info!("Metrics exporter listening on {}", addr);
    Ok(())
}

fn describe_metrics() {
    metrics::describe_counter!(
        "sync_webhook_dispatch_total",
        "Sync webhook requests sent, labelled by event and status"
    );
    metrics::describe_histogram!(
        "sync_webhook_dispatch_duration_seconds",
        metrics::Unit::Seconds,
        "Time spent waiting for sync webhook responses"
    );
    metrics::describe_counter!("sync_webhook_cache_hits_total", "Response cache hits");
    metrics::describe_counter!("sync_webhook_cache_misses_total", "Response cache misses");
    metrics::describe_counter!(
        "sync_webhook_cache_errors_total",
        "Response cache backend failures"
    );
    metrics::describe_counter!(
        "sync_webhook_cache_invalidations_total",
        "List responses removed after a delete request"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_metrics_is_noop() {
        let settings = MetricsSettings {
            enabled: false,
            listen_addr: "not an address".to_string(),
        };
        assert!(init_metrics(&settings).is_ok());
    }

    #[test]
    fn test_invalid_address_is_an_error() {
        let settings = MetricsSettings {
            enabled: true,
            listen_addr: "not an address".to_string(),
        };
        assert!(init_metrics(&settings).is_err());
    }
}
