// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 基础设施服务模块
///
/// 提供同步Webhook请求的HTTP实现
pub mod sync_webhook_service_impl;
