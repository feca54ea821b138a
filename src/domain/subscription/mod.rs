// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 订阅文档模块
///
/// Webhook可以声明一个订阅文档来决定请求负载的形状。
/// 本模块把文档解析为语法树（parser），再投影到事件对象上得到负载（evaluator）。
/// 只支持负载投影需要的子集：字段、别名、内联片段和具名片段。
pub mod evaluator;
pub mod parser;

use thiserror::Error;

pub use evaluator::{evaluate, PayloadNode, SourceObject, SourceValue};
pub use parser::{parse_document, Document, Field, FragmentDefinition, Selection};

/// 选择集的最大嵌套层数，片段展开也计入层数
pub const MAX_SELECTION_DEPTH: usize = 32;

/// 一次求值最多展开的片段次数
pub const MAX_FRAGMENT_SPREADS: usize = 256;

/// 订阅文档错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    #[error("unexpected character '{ch}' at offset {position}")]
    UnexpectedCharacter { ch: char, position: usize },

    #[error("expected {expected}, found {found}")]
    UnexpectedToken {
        expected: &'static str,
        found: String,
    },

    #[error("unexpected end of document, expected {0}")]
    UnexpectedEof(&'static str),

    #[error("only subscription operations are supported, found '{0}'")]
    UnsupportedOperation(String),

    #[error("document contains more than one operation")]
    MultipleOperations,

    #[error("document does not contain an operation")]
    MissingOperation,

    #[error("arguments are not supported (field '{0}')")]
    ArgumentsNotSupported(String),

    #[error("variables are not supported")]
    VariablesNotSupported,

    #[error("directives are not supported")]
    DirectivesNotSupported,

    #[error("selection set cannot be empty")]
    EmptySelectionSet,

    #[error("fragment '{0}' is defined more than once")]
    DuplicateFragment(String),

    #[error("unknown fragment '{0}'")]
    UnknownFragment(String),

    #[error("fragment '{0}' spreads itself")]
    FragmentCycle(String),

    #[error("document nests selections deeper than {0} levels")]
    TooDeep(usize),

    #[error("document expands more than {0} fragment spreads")]
    TooManyFragmentSpreads(usize),

    #[error("subscription must select the 'event' field")]
    MissingEventField,

    #[error("cannot query field '{field}' on type '{type_name}'")]
    UnknownField { type_name: String, field: String },

    #[error("field '{0}' is a scalar and cannot have a selection set")]
    SelectionOnScalar(String),

    #[error("field '{0}' is an object and must have a selection set")]
    MissingSelectionOnObject(String),
}
