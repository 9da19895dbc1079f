//! # Script 模块
//!
//! 脚本编译前端：词法分析、语法分析与 AST 定义。
//!
//! ## 模块结构
//!
//! - [`token`]：Token 与源码位置
//! - [`lexer`]：双模式词法分析器
//! - [`ast`]：脚本抽象语法树定义
//! - [`parser`]：容错的前缀解析器

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod token;

pub use ast::{Expression, Params, Program, Statement};
pub use lexer::Lexer;
pub use parser::{ParseWarning, Parser, parse};
pub use token::{Position, Token, TokenKind};
