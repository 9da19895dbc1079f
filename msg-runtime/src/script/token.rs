//! # Token 模块
//!
//! 词法单元定义。

use std::fmt;

use serde::{Deserialize, Serialize};

/// 源码位置（行列均从 1 开始，列按 Unicode 字符计数）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// 源码起点
    pub fn start() -> Self {
        Self::new(1, 1)
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::start()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Token 类型（封闭集合）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    /// `[`
    BracketOpen,
    /// `]`
    BracketClose,
    /// `=`
    Equal,
    /// `"..."`，字面量为引号之间的原始内容
    String,
    /// 命令内的命令名或参数名
    Ident,
    /// 命令外的一段正文
    Text,
    /// 输入结束
    Eof,
    /// 非法内容（命令内的未知字符、未闭合的字符串）
    Illegal,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::BracketOpen => "'['",
            Self::BracketClose => "']'",
            Self::Equal => "'='",
            Self::String => "string",
            Self::Ident => "identifier",
            Self::Text => "text",
            Self::Eof => "end-of-input",
            Self::Illegal => "illegal",
        };
        f.write_str(name)
    }
}

/// 词法单元
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub literal: String,
    /// 第一个字符所在位置
    pub position: Position,
}

impl Token {
    pub fn new(kind: TokenKind, literal: impl Into<String>, position: Position) -> Self {
        Self {
            kind,
            literal: literal.into(),
            position,
        }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}
