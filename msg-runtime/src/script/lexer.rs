//! # Lexer 模块
//!
//! 把原始脚本文本切分为扁平的 token 流。
//!
//! ## 两种词法模式
//!
//! - 命令外：`[`、`]` 之间以外的内容整段作为一个 `Text` token，
//!   其中的空白与换行原样保留（下游据此区分作者手写的换行与自动折行）
//! - 命令内（`[` 之后、`]` 之前）：跳过空白，识别标识符、`=` 与字符串
//!
//! 词法分析是全函数：每个字符都恰好被一条规则消费，不存在失败路径。

use super::token::{Position, Token, TokenKind};

/// 词法分析器
pub struct Lexer<'a> {
    input: &'a str,
    /// 当前字节偏移
    pos: usize,
    line: usize,
    column: usize,
    /// 是否位于 `[...]` 内部
    in_command: bool,
    /// 是否已经产出过 Eof（用于迭代器终止）
    emitted_eof: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            line: 1,
            column: 1,
            in_command: false,
            emitted_eof: false,
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn consume_char(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn current_position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek_char() {
            if matches!(c, ' ' | '\t' | '\r' | '\n') {
                self.consume_char();
            } else {
                break;
            }
        }
    }

    /// 读取下一个 token
    ///
    /// 到达输入末尾后会一直返回 `Eof`。
    pub fn next_token(&mut self) -> Token {
        if self.in_command {
            self.skip_whitespace();
        }

        let position = self.current_position();
        let Some(c) = self.peek_char() else {
            return Token::new(TokenKind::Eof, "", position);
        };

        match c {
            '[' => {
                self.consume_char();
                self.in_command = true;
                Token::new(TokenKind::BracketOpen, "[", position)
            }
            ']' => {
                self.consume_char();
                self.in_command = false;
                Token::new(TokenKind::BracketClose, "]", position)
            }
            '=' if self.in_command => {
                self.consume_char();
                Token::new(TokenKind::Equal, "=", position)
            }
            '"' if self.in_command => self.read_string(position),
            c if self.in_command && is_ident_char(c) => {
                let literal = self.read_while(is_ident_char);
                Token::new(TokenKind::Ident, literal, position)
            }
            c if self.in_command => {
                self.consume_char();
                Token::new(TokenKind::Illegal, c.to_string(), position)
            }
            _ => {
                let literal = self.read_while(|c| c != '[' && c != ']');
                Token::new(TokenKind::Text, literal, position)
            }
        }
    }

    fn read_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek_char() {
            if !pred(c) {
                break;
            }
            self.consume_char();
        }
        let input = self.input;
        &input[start..self.pos]
    }

    /// 读取字符串；缺少闭合引号时返回以 `"` 开头的 Illegal token
    fn read_string(&mut self, position: Position) -> Token {
        let open = self.pos;
        self.consume_char();
        let content = self.read_while(|c| c != '"');
        if self.consume_char().is_some() {
            Token::new(TokenKind::String, content, position)
        } else {
            Token::new(TokenKind::Illegal, &self.input[open..self.pos], position)
        }
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    /// 依次产出 token，`Eof` 作为最后一项产出一次
    fn next(&mut self) -> Option<Token> {
        if self.emitted_eof {
            return None;
        }
        let token = self.next_token();
        if token.is(TokenKind::Eof) {
            self.emitted_eof = true;
        }
        Some(token)
    }
}
