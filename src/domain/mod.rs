// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域层模块
///
/// 该模块包含系统的核心业务逻辑，包括：
/// - 领域模型（models）：应用、Webhook、投递记录和支付数据
/// - 仓库接口（repositories）：数据持久化抽象接口
/// - 服务（services）：负载构建、缓存键和同步请求接口
/// - 订阅文档（subscription）：订阅文档的解析与投影
///
/// 领域层不依赖于任何外部实现。
pub mod models;
pub mod repositories;
pub mod services;
pub mod subscription;
