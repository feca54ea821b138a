// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// HTTP处理器模块
pub mod app_handler;
pub mod stored_payment_method_handler;
