// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

use super::parser::{Document, Selection};
use super::{SubscriptionError, MAX_FRAGMENT_SPREADS, MAX_SELECTION_DEPTH};

const ROOT_TYPE_NAME: &str = "Subscription";
const EVENT_FIELD: &str = "event";
const TYPENAME_FIELD: &str = "__typename";

/// 事件对象上的值
#[derive(Debug, Clone, PartialEq)]
pub enum SourceValue {
    Null,
    Scalar(Value),
    Object(SourceObject),
}

impl From<SourceObject> for SourceValue {
    fn from(object: SourceObject) -> Self {
        SourceValue::Object(object)
    }
}

impl From<&str> for SourceValue {
    fn from(value: &str) -> Self {
        SourceValue::Scalar(Value::String(value.to_string()))
    }
}

impl From<String> for SourceValue {
    fn from(value: String) -> Self {
        SourceValue::Scalar(Value::String(value))
    }
}

impl<T: Into<SourceValue>> From<Option<T>> for SourceValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(SourceValue::Null)
    }
}

/// 可被订阅文档查询的类型化对象
#[derive(Debug, Clone, PartialEq)]
pub struct SourceObject {
    typename: &'static str,
    fields: Vec<(&'static str, SourceValue)>,
}

impl SourceObject {
    pub fn new(typename: &'static str) -> Self {
        Self {
            typename,
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, name: &'static str, value: impl Into<SourceValue>) -> Self {
        self.fields.push((name, value.into()));
        self
    }

    pub fn typename(&self) -> &'static str {
        self.typename
    }

    fn get(&self, name: &str) -> Option<&SourceValue> {
        self.fields
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| value)
    }
}

/// 投影结果
///
/// 对象的键保持文档中的选择顺序，序列化结果因此是确定的。
#[derive(Debug, Clone, PartialEq)]
pub enum PayloadNode {
    Value(Value),
    Object(Vec<(String, PayloadNode)>),
}

impl Serialize for PayloadNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PayloadNode::Value(value) => value.serialize(serializer),
            PayloadNode::Object(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

/// 在事件对象上执行订阅文档，返回 `event` 字段的投影
pub fn evaluate(document: &Document, event: &SourceObject) -> Result<PayloadNode, SubscriptionError> {
    let mut evaluation = Evaluation {
        document,
        active: Vec::new(),
        expansions: 0,
    };
    let mut output = Vec::new();
    let mut found_event = false;

    for selection in &document.operation {
        match selection {
            Selection::Field(field) if field.name == EVENT_FIELD => {
                if field.selections.is_empty() {
                    return Err(SubscriptionError::MissingSelectionOnObject(
                        EVENT_FIELD.to_string(),
                    ));
                }
                found_event = true;
                // subscription { event { ... } } puts the event selections on level 2.
                evaluation.collect(&field.selections, event, &mut output, 2)?;
            }
            Selection::Field(field) => {
                return Err(SubscriptionError::UnknownField {
                    type_name: ROOT_TYPE_NAME.to_string(),
                    field: field.name.clone(),
                });
            }
            Selection::InlineFragment { .. } | Selection::FragmentSpread(_) => {
                return Err(SubscriptionError::MissingEventField);
            }
        }
    }

    if !found_event {
        return Err(SubscriptionError::MissingEventField);
    }
    Ok(PayloadNode::Object(output))
}

/// 一次求值的状态
struct Evaluation<'a> {
    document: &'a Document,
    /// 正在展开的片段
    active: Vec<&'a str>,
    /// 已展开的片段次数
    expansions: usize,
}

impl<'a> Evaluation<'a> {
    fn collect(
        &mut self,
        selections: &'a [Selection],
        object: &SourceObject,
        output: &mut Vec<(String, PayloadNode)>,
        depth: usize,
    ) -> Result<(), SubscriptionError> {
        if depth > MAX_SELECTION_DEPTH {
            return Err(SubscriptionError::TooDeep(MAX_SELECTION_DEPTH));
        }

        for selection in selections {
            match selection {
                Selection::Field(field) => {
                    let value = if field.name == TYPENAME_FIELD {
                        PayloadNode::Value(Value::String(object.typename().to_string()))
                    } else {
                        match object.get(&field.name) {
                            None => {
                                return Err(SubscriptionError::UnknownField {
                                    type_name: object.typename().to_string(),
                                    field: field.name.clone(),
                                })
                            }
                            Some(SourceValue::Null) => PayloadNode::Value(Value::Null),
                            Some(SourceValue::Scalar(value)) => {
                                if !field.selections.is_empty() {
                                    return Err(SubscriptionError::SelectionOnScalar(
                                        field.name.clone(),
                                    ));
                                }
                                PayloadNode::Value(value.clone())
                            }
                            Some(SourceValue::Object(nested)) => {
                                if field.selections.is_empty() {
                                    return Err(SubscriptionError::MissingSelectionOnObject(
                                        field.name.clone(),
                                    ));
                                }
                                let mut entries = Vec::new();
                                self.collect(&field.selections, nested, &mut entries, depth + 1)?;
                                PayloadNode::Object(entries)
                            }
                        }
                    };
                    insert_merged(output, field.response_key(), value);
                }
                Selection::InlineFragment {
                    type_condition,
                    selections,
                } => {
                    let applies = type_condition
                        .as_deref()
                        .map_or(true, |condition| condition == object.typename());
                    if applies {
                        self.collect(selections, object, output, depth + 1)?;
                    }
                }
                Selection::FragmentSpread(name) => {
                    let document = self.document;
                    let fragment = document
                        .fragments
                        .get(name)
                        .ok_or_else(|| SubscriptionError::UnknownFragment(name.clone()))?;
                    if self.active.contains(&name.as_str()) {
                        return Err(SubscriptionError::FragmentCycle(name.clone()));
                    }
                    self.expansions += 1;
                    if self.expansions > MAX_FRAGMENT_SPREADS {
                        return Err(SubscriptionError::TooManyFragmentSpreads(
                            MAX_FRAGMENT_SPREADS,
                        ));
                    }
                    if fragment.type_condition == object.typename() {
                        self.active.push(name.as_str());
                        self.collect(&fragment.selections, object, output, depth + 1)?;
                        self.active.pop();
                    }
                }
            }
        }
        Ok(())
    }
}

/// 相同输出键的对象选择合并，其余保留第一次出现的值
fn insert_merged(output: &mut Vec<(String, PayloadNode)>, key: &str, value: PayloadNode) {
    match output.iter_mut().find(|(existing, _)| existing == key) {
        Some((_, PayloadNode::Object(existing))) => {
            if let PayloadNode::Object(entries) = value {
                for (nested_key, nested_value) in entries {
                    insert_merged(existing, &nested_key, nested_value);
                }
            }
        }
        Some(_) => {}
        None => output.push((key.to_string(), value)),
    }
}
