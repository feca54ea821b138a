// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 测试主模块
///
/// 集成测试：通过HTTP接口驱动完整的同步Webhook流程
mod integration;
