// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 该模块包含同步Webhook交换中与基础设施无关的部分：
/// - 缓存键（cache_key）：由负载、目标URL、事件类型和应用ID生成确定的缓存键
/// - 负载构建（payload_builder）：静态负载或订阅文档投影
/// - 同步Webhook服务（sync_webhook_service）：发送请求的抽象接口
pub mod cache_key;
pub mod payload_builder;
pub mod sync_webhook_service;
