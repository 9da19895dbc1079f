//! # Evaluator 模块
//!
//! 将 AST 转换为 Event 列表。
//!
//! ## 职责
//!
//! - 按顺序遍历 `Program` 的语句，恰好一次
//! - 正文 → `TextReveal`，翻页命令 → `PageBreak`，其它命令 → 不透明命令
//! - 不会失败：未知命令原样保留
//!
//! 输出只取决于 AST，对同一 `Program` 重复求值得到相同结果。

use crate::error::CompileError;
use crate::runtime::event::Event;
use crate::script::{Expression, Program, parse};

/// 默认的翻页命令名，对应 `[p]`
pub const PAGE_BREAK_MARKER: &str = "p";

/// 求值器
#[derive(Debug, Clone)]
pub struct Evaluator {
    page_break_marker: String,
}

impl Evaluator {
    /// 使用默认翻页命令 `p` 创建求值器
    pub fn new() -> Self {
        Self {
            page_break_marker: PAGE_BREAK_MARKER.to_string(),
        }
    }

    /// 使用自定义翻页命令名创建求值器
    pub fn with_page_break_marker(marker: impl Into<String>) -> Self {
        Self {
            page_break_marker: marker.into(),
        }
    }

    pub fn page_break_marker(&self) -> &str {
        &self.page_break_marker
    }

    /// 求值整个程序
    pub fn evaluate(&self, program: &Program) -> Vec<Event> {
        let mut events = Vec::with_capacity(program.len());
        for expression in program.expressions() {
            self.evaluate_expression(expression, &mut events);
        }
        events
    }

    fn evaluate_expression(&self, expression: &Expression, events: &mut Vec<Event>) {
        match expression {
            Expression::TextLiteral { value } => {
                if !value.is_empty() {
                    events.push(Event::text(value));
                }
            }
            Expression::CommandLiteral { name, .. } if *name == self.page_break_marker => {
                events.push(Event::PageBreak);
            }
            Expression::CommandLiteral { name, params } => {
                events.push(Event::command(name.as_str(), params.clone()));
            }
        }
    }

    /// 解析并求值脚本文本
    pub fn compile(&self, source: &str) -> Result<Vec<Event>, CompileError> {
        let program = parse(source)?;
        Ok(self.evaluate(&program))
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

/// 使用默认设置编译脚本文本
pub fn compile(source: &str) -> Result<Vec<Event>, CompileError> {
    Evaluator::new().compile(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::{Params, Position, Statement};

    #[test]
    fn test_evaluate_mixed_program() {
        let events = compile(r#"こんにちは[r]世界[se file="a.ogg"][p]"#).unwrap();
        let mut params = Params::new();
        params.insert("file".to_string(), "a.ogg".to_string());
        assert_eq!(
            events,
            vec![
                Event::text("こんにちは"),
                Event::command("r", Params::new()),
                Event::text("世界"),
                Event::command("se", params),
                Event::PageBreak,
            ]
        );
    }

    #[test]
    fn test_evaluate_is_deterministic() {
        let program = parse("東京[p]京都[wait time=\"1\"]").unwrap();
        let evaluator = Evaluator::new();
        assert_eq!(evaluator.evaluate(&program), evaluator.evaluate(&program));
    }

    #[test]
    fn test_custom_page_break_marker() {
        let evaluator = Evaluator::with_page_break_marker("flush");
        let events = evaluator.compile("a[flush]b[p]").unwrap();
        assert_eq!(events[1], Event::PageBreak);
        assert_eq!(events[3], Event::command("p", Params::new()));
        assert_eq!(evaluator.page_break_marker(), "flush");
    }

    #[test]
    fn test_empty_text_produces_no_event() {
        let program = Program::new(vec![Statement::new(
            Expression::text(""),
            Position::start(),
        )]);
        assert!(Evaluator::new().evaluate(&program).is_empty());
    }

    #[test]
    fn test_compile_surfaces_parse_errors() {
        let err = compile("[se file]").unwrap_err();
        assert_eq!(err.len(), 1);
    }
}
