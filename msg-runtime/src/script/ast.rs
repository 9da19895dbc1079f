//! # AST 模块
//!
//! 定义脚本的抽象语法树（Abstract Syntax Tree）。
//!
//! ## 设计说明
//!
//! AST 是解析器的输出，构建完成后只读。
//! 表达式只有两种：正文字面量与命令字面量，均为封闭的枚举变体，
//! 求值器通过穷尽的 `match` 处理它们。

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::token::Position;

/// 命令参数表（参数名 → 字符串值），按参数名有序
pub type Params = BTreeMap<String, String>;

/// 表达式
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Expression {
    /// 一段正文
    ///
    /// 对应 `[` `]` 之外的连续文本，换行原样保留
    TextLiteral { value: String },

    /// 命令
    ///
    /// 对应 `[name key="value" ...]` 语法
    CommandLiteral { name: String, params: Params },
}

impl Expression {
    /// 创建正文表达式
    pub fn text(value: impl Into<String>) -> Self {
        Self::TextLiteral {
            value: value.into(),
        }
    }

    /// 创建无参数命令表达式
    pub fn command(name: impl Into<String>) -> Self {
        Self::CommandLiteral {
            name: name.into(),
            params: Params::new(),
        }
    }

    /// 创建带参数命令表达式
    pub fn command_with<K, V>(name: impl Into<String>, params: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self::CommandLiteral {
            name: name.into(),
            params: params
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl fmt::Display for Expression {
    /// 还原为脚本语法（字符串值不做转义）
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TextLiteral { value } => f.write_str(value),
            Self::CommandLiteral { name, params } => {
                write!(f, "[{}", name)?;
                for (key, value) in params {
                    write!(f, " {}=\"{}\"", key, value)?;
                }
                f.write_str("]")
            }
        }
    }
}

/// 语句
///
/// 每个顶层正文段或命令对应一条语句。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    pub expression: Expression,
    /// 语句在源码中的起始位置
    pub position: Position,
}

impl Statement {
    pub fn new(expression: Expression, position: Position) -> Self {
        Self {
            expression,
            position,
        }
    }
}

/// 解析后的程序
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub statements: Vec<Statement>,
}

impl Program {
    pub fn new(statements: Vec<Statement>) -> Self {
        Self { statements }
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// 按顺序遍历表达式
    pub fn expressions(&self) -> impl Iterator<Item = &Expression> {
        self.statements.iter().map(|s| &s.expression)
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for expression in self.expressions() {
            write!(f, "{}", expression)?;
        }
        Ok(())
    }
}
