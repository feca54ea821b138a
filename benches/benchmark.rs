// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 性能基准测试套件
//!
//! 同步Webhook热路径上的纯计算部分：负载构建、订阅文档投影、缓存键生成和内存缓存。

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::json;
use std::hint::black_box;
use synchook::domain::models::payment::{
    Channel, ListStoredPaymentMethodsRequestData, StoredPaymentMethodRequestDeleteData, User,
};
use synchook::domain::models::webhook::WebhookEventSyncType;
use synchook::domain::services::cache_key::generate_cache_key_for_webhook;
use synchook::domain::services::payload_builder::{build_payload, SyncEvent};
use synchook::infrastructure::cache::cache_manager::CacheManager;
use tokio::runtime::Runtime;
use uuid::Uuid;

const DELETE_SUBSCRIPTION: &str = "subscription { event { ... on StoredPaymentMethodDeleteRequested { \
     user { id } paymentMethodId channel { id } } } }";

fn user() -> User {
    User {
        id: 1,
        email: "test@example.com".to_string(),
    }
}

fn channel() -> Channel {
    Channel {
        id: 1,
        slug: "main".to_string(),
        name: "Main".to_string(),
        currency_code: "USD".to_string(),
    }
}

/// 基准测试：静态负载与订阅文档负载
fn benchmark_payload_building(c: &mut Criterion) {
    let list_data = ListStoredPaymentMethodsRequestData {
        user: user(),
        channel: channel(),
    };
    let delete_data = StoredPaymentMethodRequestDeleteData {
        user: user(),
        payment_method_id: "app:saleor.app.payment:123".to_string(),
        channel: channel(),
    };

    let mut group = c.benchmark_group("payload_building");
    group.bench_function("list_static", |b| {
        let event = SyncEvent::ListStoredPaymentMethods(&list_data);
        b.iter(|| build_payload(black_box(&event), None))
    });
    group.bench_function("delete_subscription", |b| {
        let event = SyncEvent::StoredPaymentMethodDeleteRequested {
            data: &delete_data,
            external_id: "123",
        };
        b.iter(|| build_payload(black_box(&event), Some(DELETE_SUBSCRIPTION)))
    });
    group.finish();
}

/// 基准测试：不同负载大小下的缓存键生成
fn benchmark_cache_key(c: &mut Criterion) {
    let app_id = Uuid::new_v4();
    let mut group = c.benchmark_group("cache_key");

    for size in [64usize, 1024, 16 * 1024] {
        let payload = "x".repeat(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &payload, |b, payload| {
            b.iter(|| {
                generate_cache_key_for_webhook(
                    black_box(payload),
                    "http://localhost:8000/list/",
                    WebhookEventSyncType::ListStoredPaymentMethods,
                    app_id,
                )
            })
        });
    }
    group.finish();
}

/// 基准测试：内存缓存读写
fn benchmark_memory_cache(c: &mut Criterion) {
    let rt = Runtime::new().expect("Failed to create runtime");
    let cache = CacheManager::in_memory();
    let value = json!({"paymentMethods": [{"id": "pm_1", "type": "Credit Card"}]});
    rt.block_on(cache.set("warm", &value, None));

    let mut group = c.benchmark_group("memory_cache");
    group.bench_function("hit", |b| {
        b.iter(|| rt.block_on(cache.get(black_box("warm"))))
    });
    group.bench_function("set", |b| {
        b.iter(|| rt.block_on(cache.set(black_box("key"), &value, None)))
    });
    group.finish();
}

criterion_group!(
    benches,
    benchmark_payload_building,
    benchmark_cache_key,
    benchmark_memory_cache
);
criterion_main!(benches);
