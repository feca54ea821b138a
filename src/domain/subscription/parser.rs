// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::collections::HashMap;
use std::iter::Peekable;
use std::str::CharIndices;

use super::{SubscriptionError, MAX_FRAGMENT_SPREADS, MAX_SELECTION_DEPTH};

/// 解析后的订阅文档
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// 订阅操作的根选择集
    pub operation: Vec<Selection>,
    /// 具名片段
    pub fragments: HashMap<String, FragmentDefinition>,
}

/// 选择项
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Field(Field),
    InlineFragment {
        type_condition: Option<String>,
        selections: Vec<Selection>,
    },
    FragmentSpread(String),
}

/// 字段选择
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub alias: Option<String>,
    pub name: String,
    pub selections: Vec<Selection>,
}

impl Field {
    /// 输出中使用的键：别名优先
    pub fn response_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

/// 具名片段定义
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentDefinition {
    pub name: String,
    pub type_condition: String,
    pub selections: Vec<Selection>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Name(String),
    LBrace,
    RBrace,
    Colon,
    Spread,
    LParen,
    RParen,
    At,
    Dollar,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Name(name) => format!("'{}'", name),
            Token::LBrace => "'{'".to_string(),
            Token::RBrace => "'}'".to_string(),
            Token::Colon => "':'".to_string(),
            Token::Spread => "'...'".to_string(),
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
            Token::At => "'@'".to_string(),
            Token::Dollar => "'$'".to_string(),
        }
    }
}

fn tokenize(source: &str) -> Result<Vec<Token>, SubscriptionError> {
    let mut tokens = Vec::new();
    let mut chars: Peekable<CharIndices> = source.char_indices().peekable();

    while let Some((position, ch)) = chars.next() {
        match ch {
            // Commas are insignificant in GraphQL documents.
            c if c.is_whitespace() || c == ',' || c == '\u{feff}' => {}
            '#' => {
                for (_, c) in chars.by_ref() {
                    if c == '\n' || c == '\r' {
                        break;
                    }
                }
            }
            '{' => tokens.push(Token::LBrace),
            '}' => tokens.push(Token::RBrace),
            ':' => tokens.push(Token::Colon),
            '(' => tokens.push(Token::LParen),
            ')' => tokens.push(Token::RParen),
            '@' => tokens.push(Token::At),
            '$' => tokens.push(Token::Dollar),
            '.' => {
                let second = chars.next_if(|(_, c)| *c == '.');
                let third = chars.next_if(|(_, c)| *c == '.');
                if second.is_none() || third.is_none() {
                    return Err(SubscriptionError::UnexpectedCharacter { ch, position });
                }
                tokens.push(Token::Spread);
            }
            c if c == '_' || c.is_ascii_alphabetic() => {
                let mut name = String::from(c);
                while let Some((_, c)) = chars.next_if(|(_, c)| *c == '_' || c.is_ascii_alphanumeric())
                {
                    name.push(c);
                }
                tokens.push(Token::Name(name));
            }
            _ => return Err(SubscriptionError::UnexpectedCharacter { ch, position }),
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    position: usize,
    /// 当前所在的选择集层数
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    fn expect(&mut self, expected_token: Token, expected: &'static str) -> Result<(), SubscriptionError> {
        match self.advance() {
            Some(token) if token == expected_token => Ok(()),
            Some(token) => Err(SubscriptionError::UnexpectedToken {
                expected,
                found: token.describe(),
            }),
            None => Err(SubscriptionError::UnexpectedEof(expected)),
        }
    }

    fn expect_name(&mut self, expected: &'static str) -> Result<String, SubscriptionError> {
        match self.advance() {
            Some(Token::Name(name)) => Ok(name),
            Some(token) => Err(SubscriptionError::UnexpectedToken {
                expected,
                found: token.describe(),
            }),
            None => Err(SubscriptionError::UnexpectedEof(expected)),
        }
    }

    fn reject_unsupported(&self) -> Result<(), SubscriptionError> {
        match self.peek() {
            Some(Token::At) => Err(SubscriptionError::DirectivesNotSupported),
            Some(Token::LParen) | Some(Token::Dollar) => Err(SubscriptionError::VariablesNotSupported),
            _ => Ok(()),
        }
    }

    fn parse_document(&mut self) -> Result<Document, SubscriptionError> {
        let mut operation = None;
        let mut fragments = HashMap::new();

        while let Some(token) = self.peek().cloned() {
            match token {
                Token::Name(keyword) if keyword == "fragment" => {
                    self.advance();
                    let fragment = self.parse_fragment_definition()?;
                    if fragments.contains_key(&fragment.name) {
                        return Err(SubscriptionError::DuplicateFragment(fragment.name));
                    }
                    fragments.insert(fragment.name.clone(), fragment);
                }
                Token::Name(keyword) if keyword == "subscription" => {
                    self.advance();
                    if let Some(Token::Name(_)) = self.peek() {
                        self.advance();
                    }
                    self.reject_unsupported()?;
                    let selections = self.parse_selection_set()?;
                    if operation.replace(selections).is_some() {
                        return Err(SubscriptionError::MultipleOperations);
                    }
                }
                Token::Name(keyword) => {
                    return Err(SubscriptionError::UnsupportedOperation(keyword));
                }
                Token::LBrace => {
                    let selections = self.parse_selection_set()?;
                    if operation.replace(selections).is_some() {
                        return Err(SubscriptionError::MultipleOperations);
                    }
                }
                other => {
                    return Err(SubscriptionError::UnexpectedToken {
                        expected: "an operation or fragment definition",
                        found: other.describe(),
                    });
                }
            }
        }

        let operation = operation.ok_or(SubscriptionError::MissingOperation)?;
        Ok(Document {
            operation,
            fragments,
        })
    }

    fn parse_fragment_definition(&mut self) -> Result<FragmentDefinition, SubscriptionError> {
        let name = self.expect_name("a fragment name")?;
        match self.advance() {
            Some(Token::Name(keyword)) if keyword == "on" => {}
            Some(token) => {
                return Err(SubscriptionError::UnexpectedToken {
                    expected: "'on'",
                    found: token.describe(),
                })
            }
            None => return Err(SubscriptionError::UnexpectedEof("'on'")),
        }
        let type_condition = self.expect_name("a type condition")?;
        self.reject_unsupported()?;
        let selections = self.parse_selection_set()?;
        Ok(FragmentDefinition {
            name,
            type_condition,
            selections,
        })
    }

    fn parse_selection_set(&mut self) -> Result<Vec<Selection>, SubscriptionError> {
        self.expect(Token::LBrace, "'{'")?;
        self.depth += 1;
        if self.depth > MAX_SELECTION_DEPTH {
            return Err(SubscriptionError::TooDeep(MAX_SELECTION_DEPTH));
        }
        let mut selections = Vec::new();
        loop {
            match self.peek() {
                Some(Token::RBrace) => {
                    self.advance();
                    break;
                }
                Some(_) => selections.push(self.parse_selection()?),
                None => return Err(SubscriptionError::UnexpectedEof("'}'")),
            }
        }
        if selections.is_empty() {
            return Err(SubscriptionError::EmptySelectionSet);
        }
        self.depth -= 1;
        Ok(selections)
    }

    fn parse_selection(&mut self) -> Result<Selection, SubscriptionError> {
        match self.advance() {
            Some(Token::Spread) => self.parse_fragment_selection(),
            Some(Token::Name(first)) => {
                let (alias, name) = if let Some(Token::Colon) = self.peek() {
                    self.advance();
                    (Some(first), self.expect_name("a field name")?)
                } else {
                    (None, first)
                };
                match self.peek() {
                    Some(Token::LParen) => return Err(SubscriptionError::ArgumentsNotSupported(name)),
                    Some(Token::At) => return Err(SubscriptionError::DirectivesNotSupported),
                    _ => {}
                }
                let selections = if let Some(Token::LBrace) = self.peek() {
                    self.parse_selection_set()?
                } else {
                    Vec::new()
                };
                Ok(Selection::Field(Field {
                    alias,
                    name,
                    selections,
                }))
            }
            Some(token) => Err(SubscriptionError::UnexpectedToken {
                expected: "a field or fragment",
                found: token.describe(),
            }),
            None => Err(SubscriptionError::UnexpectedEof("a field or fragment")),
        }
    }

    fn parse_fragment_selection(&mut self) -> Result<Selection, SubscriptionError> {
        match self.peek().cloned() {
            Some(Token::Name(keyword)) if keyword == "on" => {
                self.advance();
                let type_condition = self.expect_name("a type condition")?;
                self.reject_unsupported()?;
                Ok(Selection::InlineFragment {
                    type_condition: Some(type_condition),
                    selections: self.parse_selection_set()?,
                })
            }
            Some(Token::Name(name)) => {
                self.advance();
                self.reject_unsupported()?;
                Ok(Selection::FragmentSpread(name))
            }
            Some(Token::LBrace) => Ok(Selection::InlineFragment {
                type_condition: None,
                selections: self.parse_selection_set()?,
            }),
            Some(Token::At) => Err(SubscriptionError::DirectivesNotSupported),
            Some(token) => Err(SubscriptionError::UnexpectedToken {
                expected: "a fragment",
                found: token.describe(),
            }),
            None => Err(SubscriptionError::UnexpectedEof("a fragment")),
        }
    }
}

/// 片段展开的静态度量
#[derive(Debug, Clone, Copy)]
struct Measure {
    /// 展开的片段次数（含所有分支）
    spreads: usize,
    /// 选择集高度
    height: usize,
}

/// 检查片段引用：未知片段、循环、展开后的嵌套层数和展开次数
///
/// 每个片段只度量一次，重复引用直接复用结果，所以检查本身是线性的。
struct FragmentCheck<'a> {
    document: &'a Document,
    measured: HashMap<&'a str, Measure>,
    visiting: Vec<&'a str>,
}

impl<'a> FragmentCheck<'a> {
    fn measure(
        &mut self,
        selections: &'a [Selection],
        depth: usize,
    ) -> Result<Measure, SubscriptionError> {
        if depth > MAX_SELECTION_DEPTH {
            return Err(SubscriptionError::TooDeep(MAX_SELECTION_DEPTH));
        }

        let mut total = Measure {
            spreads: 0,
            height: 1,
        };
        for selection in selections {
            let nested = match selection {
                Selection::Field(field) if field.selections.is_empty() => continue,
                Selection::Field(field) => self.measure(&field.selections, depth + 1)?,
                Selection::InlineFragment { selections, .. } => {
                    self.measure(selections, depth + 1)?
                }
                Selection::FragmentSpread(name) => {
                    let fragment = self.fragment(name, depth + 1)?;
                    Measure {
                        spreads: fragment.spreads.saturating_add(1),
                        height: fragment.height,
                    }
                }
            };
            total.spreads = total.spreads.saturating_add(nested.spreads);
            total.height = total.height.max(nested.height + 1);
            if total.spreads > MAX_FRAGMENT_SPREADS {
                return Err(SubscriptionError::TooManyFragmentSpreads(
                    MAX_FRAGMENT_SPREADS,
                ));
            }
        }
        Ok(total)
    }

    fn fragment(&mut self, name: &'a str, depth: usize) -> Result<Measure, SubscriptionError> {
        let definition = self
            .document
            .fragments
            .get(name)
            .ok_or_else(|| SubscriptionError::UnknownFragment(name.to_string()))?;

        if let Some(measure) = self.measured.get(name) {
            if depth + measure.height - 1 > MAX_SELECTION_DEPTH {
                return Err(SubscriptionError::TooDeep(MAX_SELECTION_DEPTH));
            }
            return Ok(*measure);
        }
        if self.visiting.contains(&name) {
            return Err(SubscriptionError::FragmentCycle(name.to_string()));
        }

        self.visiting.push(name);
        let measure = self.measure(&definition.selections, depth)?;
        self.visiting.pop();
        self.measured.insert(name, measure);
        Ok(measure)
    }
}

/// 解析订阅文档
///
/// 除语法外还检查操作引用的片段：未知片段、循环引用、
/// 超过 [`MAX_SELECTION_DEPTH`] 的嵌套和超过 [`MAX_FRAGMENT_SPREADS`] 的展开都会被拒绝。
pub fn parse_document(source: &str) -> Result<Document, SubscriptionError> {
    let tokens = tokenize(source)?;
    let document = Parser {
        tokens,
        position: 0,
        depth: 0,
    }
    .parse_document()?;

    FragmentCheck {
        document: &document,
        measured: HashMap::new(),
        visiting: Vec::new(),
    }
    .measure(&document.operation, 1)?;

    Ok(document)
}
