//! # Error 模块
//!
//! 定义 msg-runtime 中使用的错误类型。
//!
//! 词法分析、求值、事件队列与打字机都是全函数，不会失败；
//! 唯一的失败来源是脚本语法错误和配置错误。

use std::fmt;

use thiserror::Error;

use crate::script::token::{Position, TokenKind};

/// 解析错误
///
/// 每个变体都带有出错位置，解析器把它们累积到错误列表中而不是中断解析。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// 当前 token 没有对应的前缀解析函数（例如正文中多余的 `]`）
    #[error("{position}: no prefix parse function for {kind} token '{literal}'")]
    NoPrefixHandler {
        kind: TokenKind,
        literal: String,
        position: Position,
    },

    /// `[` 之后缺少命令名
    #[error("{position}: missing command name after `[`")]
    MissingCommandName { position: Position },

    /// 命令内的参数名后缺少 `=`
    #[error("{position}: missing `=` after identifier '{param}' inside command '{command}'")]
    MissingEquals {
        command: String,
        param: String,
        position: Position,
    },

    /// `=` 之后缺少字符串值
    #[error("{position}: missing string value after `=` for '{param}' inside command '{command}'")]
    MissingValue {
        command: String,
        param: String,
        position: Position,
    },

    /// 命令没有以 `]` 结束
    #[error("{position}: unterminated command '{command}', expected `]`")]
    UnterminatedCommand { command: String, position: Position },

    /// 字符串没有闭合引号
    #[error("{position}: unterminated string literal")]
    UnterminatedString { position: Position },

    /// 命令内出现了不应出现的 token
    #[error("{position}: expected {expected} inside command, found {found}")]
    UnexpectedToken {
        expected: &'static str,
        found: TokenKind,
        position: Position,
    },

    /// 命令内出现无法识别的字符
    #[error("{position}: illegal character '{literal}' inside command")]
    IllegalCharacter { literal: String, position: Position },
}

impl ParseError {
    /// 出错位置
    pub fn position(&self) -> Position {
        match self {
            Self::NoPrefixHandler { position, .. }
            | Self::MissingCommandName { position }
            | Self::MissingEquals { position, .. }
            | Self::MissingValue { position, .. }
            | Self::UnterminatedCommand { position, .. }
            | Self::UnterminatedString { position }
            | Self::UnexpectedToken { position, .. }
            | Self::IllegalCharacter { position, .. } => *position,
        }
    }
}

/// 编译错误
///
/// 一次编译中收集到的全部解析错误，按出现顺序排列，至少包含一项。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileError {
    pub errors: Vec<ParseError>,
}

impl CompileError {
    pub fn new(errors: Vec<ParseError>) -> Self {
        Self { errors }
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} parse error(s)", self.errors.len())?;
        for error in &self.errors {
            write!(f, "\n  {}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for CompileError {}

/// 配置错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// 未知的预设名称
    #[error("unknown typewriter preset '{name}'")]
    UnknownPreset { name: String },

    /// 配置内容无法解析
    #[error("invalid typewriter config: {message}")]
    Invalid { message: String },
}

/// msg-runtime 统一错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MsgError {
    /// 编译错误
    #[error("compile error: {0}")]
    Compile(#[from] CompileError),

    /// 配置错误
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result 类型别名
pub type MsgResult<T> = Result<T, MsgError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display_has_position() {
        let err = ParseError::MissingEquals {
            command: "se".to_string(),
            param: "file".to_string(),
            position: Position::new(3, 7),
        };
        let text = err.to_string();
        assert!(text.starts_with("3:7"), "got: {text}");
        assert!(text.contains("missing `=` after identifier"));
        assert_eq!(err.position(), Position::new(3, 7));
    }

    #[test]
    fn test_compile_error_lists_all() {
        let err = CompileError::new(vec![
            ParseError::MissingCommandName {
                position: Position::new(1, 1),
            },
            ParseError::UnterminatedString {
                position: Position::new(2, 4),
            },
        ]);
        let text = err.to_string();
        assert!(text.starts_with("2 parse error(s)"));
        assert!(text.contains("1:1"));
        assert!(text.contains("2:4"));
    }

    #[test]
    fn test_msg_error_from() {
        let err: MsgError = ConfigError::UnknownPreset {
            name: "warp".to_string(),
        }
        .into();
        assert!(matches!(err, MsgError::Config(_)));
    }
}
