// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 用例模块
///
/// 存储的支付方式操作与同步Webhook之间的编排
pub mod register_app;
pub mod webhook_plugin;
