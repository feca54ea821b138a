// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// 生成全局ID
///
/// 格式为 `base64("<类型名>:<主键>")`，与GraphQL层对外暴露的ID一致。
pub fn to_global_id(type_name: &str, id: impl std::fmt::Display) -> String {
    STANDARD.encode(format!("{}:{}", type_name, id))
}

/// 解析全局ID，返回类型名和主键字符串
pub fn from_global_id(global_id: &str) -> Option<(String, String)> {
    let decoded = STANDARD.decode(global_id).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (type_name, id) = decoded.split_once(':')?;
    Some((type_name.to_string(), id.to_string()))
}
