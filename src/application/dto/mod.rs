// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 数据传输对象模块
///
/// HTTP请求和响应的数据结构
pub mod app_registration;
pub mod stored_payment_method_request;
