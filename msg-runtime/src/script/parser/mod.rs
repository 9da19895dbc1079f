//! # Parser 模块
//!
//! 基于前缀解析函数表的递归下降解析器（Pratt 风格）。
//!
//! ## 架构
//!
//! ```text
//! 原始文本 → Lexer → Token 流 → Parser → Program（有序语句列表）
//! ```
//!
//! ## 设计原则
//!
//! - 每个 token 类型最多对应一个前缀解析函数：`Text` → 正文，`[` → 命令
//! - 容错解析：语法错误追加到错误列表，跳到下一个 `]` 后继续，
//!   不会把构造到一半的节点放进 `Program`
//! - 非致命问题（重复参数名）记录为警告

#[cfg(test)]
mod tests;

use std::fmt;
use std::mem;

use tracing::debug;

use crate::error::{CompileError, ParseError};
use crate::script::ast::{Expression, Params, Program, Statement};
use crate::script::lexer::Lexer;
use crate::script::token::{Position, Token, TokenKind};

/// 前缀解析函数
type PrefixParseFn<'a> = fn(&mut Parser<'a>) -> Option<Expression>;

/// 解析警告（不阻止编译）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseWarning {
    pub position: Position,
    pub message: String,
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.position, self.message)
    }
}

/// 脚本解析器
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    cur_token: Token,
    peek_token: Token,
    errors: Vec<ParseError>,
    warnings: Vec<ParseWarning>,
}

impl<'a> Parser<'a> {
    /// 创建新的解析器并预读两个 token
    pub fn new(input: &'a str) -> Self {
        let mut lexer = Lexer::new(input);
        let cur_token = lexer.next_token();
        let peek_token = lexer.next_token();
        Self {
            lexer,
            cur_token,
            peek_token,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// 解析过程中累积的错误
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    /// 获取解析过程中的警告
    pub fn warnings(&self) -> &[ParseWarning] {
        &self.warnings
    }

    /// 解析整个输入
    ///
    /// 总是返回一个 `Program`，其中只包含完整解析的语句；
    /// 出错的部分被跳过并记录在 [`Parser::errors`] 中。
    pub fn parse_program(&mut self) -> Program {
        let mut statements = Vec::new();

        while !self.cur_token.is(TokenKind::Eof) {
            if let Some(statement) = self.parse_statement() {
                statements.push(statement);
            }
            self.next_token();
        }

        Program::new(statements)
    }

    fn next_token(&mut self) {
        let next = self.lexer.next_token();
        self.cur_token = mem::replace(&mut self.peek_token, next);
    }

    fn parse_statement(&mut self) -> Option<Statement> {
        let position = self.cur_token.position;
        let expression = self.parse_expression()?;
        Some(Statement::new(expression, position))
    }

    fn prefix_parse_fn(kind: TokenKind) -> Option<PrefixParseFn<'a>> {
        match kind {
            TokenKind::Text => Some(Self::parse_text_literal),
            TokenKind::BracketOpen => Some(Self::parse_command_literal),
            _ => None,
        }
    }

    /// 解析一个表达式
    ///
    /// 语法中没有中缀形式：命令的 `[` 总是开始一条新语句，
    /// 因此表达式在前缀解析函数返回后即结束。
    fn parse_expression(&mut self) -> Option<Expression> {
        let Some(prefix) = Self::prefix_parse_fn(self.cur_token.kind) else {
            self.no_prefix_parse_fn_error();
            return None;
        };
        prefix(self)
    }

    fn parse_text_literal(&mut self) -> Option<Expression> {
        Some(Expression::text(self.cur_token.literal.as_str()))
    }

    /// 解析 `[name key="value" ...]`
    ///
    /// 进入时 `cur_token` 为 `[`，成功返回时 `cur_token` 为 `]`。
    fn parse_command_literal(&mut self) -> Option<Expression> {
        let open_position = self.cur_token.position;

        match self.peek_token.kind {
            TokenKind::Ident => self.next_token(),
            TokenKind::Eof => {
                self.push_error(ParseError::MissingCommandName {
                    position: open_position,
                });
                return None;
            }
            _ => {
                self.push_error(ParseError::MissingCommandName {
                    position: self.peek_token.position,
                });
                self.synchronize();
                return None;
            }
        }
        let name = self.cur_token.literal.clone();
        let mut params = Params::new();

        loop {
            match self.peek_token.kind {
                TokenKind::BracketClose => {
                    self.next_token();
                    return Some(Expression::CommandLiteral { name, params });
                }
                TokenKind::Eof => {
                    self.push_error(ParseError::UnterminatedCommand {
                        command: name,
                        position: open_position,
                    });
                    return None;
                }
                TokenKind::Ident => {
                    self.next_token();
                    let (key, value) = self.parse_param(&name)?;
                    if params.contains_key(&key) {
                        self.warnings.push(ParseWarning {
                            position: self.cur_token.position,
                            message: format!(
                                "duplicate parameter '{key}' in command '{name}', last value wins"
                            ),
                        });
                    }
                    params.insert(key, value);
                }
                TokenKind::Illegal => {
                    self.next_token();
                    let error = self.illegal_token_error();
                    self.push_error(error);
                    self.synchronize();
                    return None;
                }
                found => {
                    self.push_error(ParseError::UnexpectedToken {
                        expected: "parameter name or `]`",
                        found,
                        position: self.peek_token.position,
                    });
                    self.synchronize();
                    return None;
                }
            }
        }
    }

    /// 解析 `key="value"`，进入时 `cur_token` 为参数名
    fn parse_param(&mut self, command: &str) -> Option<(String, String)> {
        let key = self.cur_token.literal.clone();

        if !self.peek_token.is(TokenKind::Equal) {
            self.push_error(ParseError::MissingEquals {
                command: command.to_string(),
                param: key,
                position: self.peek_token.position,
            });
            self.synchronize();
            return None;
        }
        self.next_token();

        match self.peek_token.kind {
            TokenKind::String => {
                self.next_token();
                Some((key, self.cur_token.literal.clone()))
            }
            TokenKind::Illegal if self.peek_token.literal.starts_with('"') => {
                self.next_token();
                let error = self.illegal_token_error();
                self.push_error(error);
                None
            }
            _ => {
                self.push_error(ParseError::MissingValue {
                    command: command.to_string(),
                    param: key,
                    position: self.peek_token.position,
                });
                self.synchronize();
                None
            }
        }
    }

    /// `cur_token` 为 Illegal 时对应的错误
    fn illegal_token_error(&self) -> ParseError {
        let token = &self.cur_token;
        if token.literal.starts_with('"') {
            ParseError::UnterminatedString {
                position: token.position,
            }
        } else {
            ParseError::IllegalCharacter {
                literal: token.literal.clone(),
                position: token.position,
            }
        }
    }

    /// 错误恢复：跳到当前命令的 `]`（含）为止；
    /// 遇到新的 `[` 或输入结束则停在它之前，交给下一条语句处理
    fn synchronize(&mut self) {
        loop {
            match self.peek_token.kind {
                TokenKind::BracketClose => {
                    self.next_token();
                    return;
                }
                TokenKind::BracketOpen | TokenKind::Eof => return,
                _ => self.next_token(),
            }
        }
    }

    fn no_prefix_parse_fn_error(&mut self) {
        let token = &self.cur_token;
        let error = ParseError::NoPrefixHandler {
            kind: token.kind,
            literal: token.literal.clone(),
            position: token.position,
        };
        self.push_error(error);
    }

    fn push_error(&mut self, error: ParseError) {
        debug!(%error, "脚本解析错误");
        self.errors.push(error);
    }
}

/// 解析脚本文本
///
/// 存在任何解析错误时返回包含全部错误的 [`CompileError`]。
pub fn parse(source: &str) -> Result<Program, CompileError> {
    let mut parser = Parser::new(source);
    let program = parser.parse_program();
    if parser.errors.is_empty() {
        Ok(program)
    } else {
        Err(CompileError::new(parser.errors))
    }
}
