// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 该模块定义了同步Webhook交换的核心实体，包括：
/// - 投递记录（event_delivery）：每次对外请求的不可变审计记录
/// - 支付（payment）：存储的支付方式相关的请求与响应数据
/// - 网络钩子（webhook）：应用、Webhook配置与同步事件类型
pub mod event_delivery;
pub mod payment;
pub mod webhook;
