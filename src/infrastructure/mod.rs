// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 基础设施层模块
///
/// 领域层抽象的技术实现：
/// - 缓存（cache）：同步Webhook响应缓存，内存或Redis后端
/// - 数据库（database）：连接池和SeaORM实体
/// - 指标（metrics）：Prometheus导出器
/// - 仓库实现（repositories）：Webhook配置和投递记录的持久化
/// - 服务实现（services）：同步Webhook的HTTP发送
pub mod cache;
pub mod database;
pub mod metrics;
pub mod repositories;
pub mod services;
