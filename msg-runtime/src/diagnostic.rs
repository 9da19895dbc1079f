//! # 诊断模块
//!
//! 提供脚本静态检查和诊断 API，不依赖 IO。
//!
//! ## 设计原则
//!
//! - 纯函数 API，可在无 IO 环境下运行
//! - 诊断分级：Error（必须修复）、Warn（建议修复）、Info（信息提示）
//! - 复用 parser/AST，不重复解析逻辑
//!
//! ## 检查项
//!
//! | 级别 | 内容 |
//! |------|------|
//! | Error | 语法错误 |
//! | Warn | 重复参数名、未登记的命令名 |
//! | Info | 最后一个翻页之后还有正文 |

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::runtime::{NEWLINE_COMMAND, PAGE_BREAK_MARKER};
use crate::script::{Expression, Parser, Position, Program};

/// 诊断级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticLevel {
    /// 信息提示
    Info,
    /// 警告（建议修复）
    Warn,
    /// 错误（必须修复）
    Error,
}

impl fmt::Display for DiagnosticLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warn => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

/// 诊断条目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// 诊断级别
    pub level: DiagnosticLevel,
    /// 脚本 ID / 文件路径
    pub script_id: String,
    /// 源码位置（如果可定位）
    pub position: Option<Position>,
    /// 诊断消息
    pub message: String,
    /// 诊断详情（可选，如原始行内容）
    pub detail: Option<String>,
}

impl Diagnostic {
    fn new(level: DiagnosticLevel, script_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            script_id: script_id.into(),
            position: None,
            message: message.into(),
            detail: None,
        }
    }

    /// 创建错误诊断
    pub fn error(script_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(DiagnosticLevel::Error, script_id, message)
    }

    /// 创建警告诊断
    pub fn warn(script_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(DiagnosticLevel::Warn, script_id, message)
    }

    /// 创建信息诊断
    pub fn info(script_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(DiagnosticLevel::Info, script_id, message)
    }

    /// 设置位置
    pub fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    /// 设置详情
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.level, self.script_id)?;
        if let Some(position) = self.position {
            write!(f, ":{}", position)?;
        }
        write!(f, ": {}", self.message)?;
        if let Some(detail) = &self.detail {
            write!(f, "\n  | {}", detail)?;
        }
        Ok(())
    }
}

/// 诊断结果
#[derive(Debug, Clone, Default)]
pub struct DiagnosticResult {
    /// 诊断条目列表
    pub diagnostics: Vec<Diagnostic>,
}

impl DiagnosticResult {
    /// 创建空结果
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加诊断
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// 合并另一个结果
    pub fn merge(&mut self, other: DiagnosticResult) {
        self.diagnostics.extend(other.diagnostics);
    }

    fn count(&self, level: DiagnosticLevel) -> usize {
        self.diagnostics.iter().filter(|d| d.level == level).count()
    }

    /// 获取错误数量
    pub fn error_count(&self) -> usize {
        self.count(DiagnosticLevel::Error)
    }

    /// 获取警告数量
    pub fn warn_count(&self) -> usize {
        self.count(DiagnosticLevel::Warn)
    }

    /// 获取信息数量
    pub fn info_count(&self) -> usize {
        self.count(DiagnosticLevel::Info)
    }

    /// 是否有错误
    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// 按级别过滤
    pub fn filter_by_level(&self, min_level: DiagnosticLevel) -> Vec<&Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.level >= min_level)
            .collect()
    }

    /// 按源码位置排序（无位置的条目排在最后）
    fn sort(&mut self) {
        self.diagnostics
            .sort_by_key(|d| (d.position.is_none(), d.position));
    }
}

//=============================================================================
// 脚本分析 API
//=============================================================================

/// 宿主默认登记的命令名
pub const DEFAULT_KNOWN_COMMANDS: [&str; 1] = [NEWLINE_COMMAND];

/// 检查器配置
///
/// 字段与宿主配置文件 (config.json) 中的同名字段一致，其它字段被忽略。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckerConfig {
    /// 翻页命令名
    #[serde(default = "default_page_break_marker")]
    pub page_break_marker: String,

    /// 宿主认识的命令名，其它命令给出警告
    #[serde(default = "default_known_commands")]
    pub known_commands: Vec<String>,
}

fn default_page_break_marker() -> String {
    PAGE_BREAK_MARKER.to_string()
}

fn default_known_commands() -> Vec<String> {
    DEFAULT_KNOWN_COMMANDS.iter().map(|s| s.to_string()).collect()
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            page_break_marker: default_page_break_marker(),
            known_commands: default_known_commands(),
        }
    }
}

/// 脚本检查器
///
/// 保存检查所需的上下文：翻页命令名和宿主已登记的命令名。
#[derive(Debug, Clone)]
pub struct Checker {
    page_break_marker: String,
    known_commands: HashSet<String>,
}

impl Checker {
    /// 创建检查器，使用默认翻页命令名
    pub fn new<I, S>(known_commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            page_break_marker: PAGE_BREAK_MARKER.to_string(),
            known_commands: known_commands.into_iter().map(Into::into).collect(),
        }
    }

    /// 按配置创建检查器
    pub fn from_config(config: &CheckerConfig) -> Self {
        Self::new(config.known_commands.iter().cloned())
            .with_page_break_marker(config.page_break_marker.as_str())
    }

    /// 设置翻页命令名
    pub fn with_page_break_marker(mut self, marker: impl Into<String>) -> Self {
        self.page_break_marker = marker.into();
        self
    }

    /// 检查一段脚本源码
    ///
    /// # 参数
    ///
    /// - `script_id`: 诊断中显示的脚本 ID（通常是文件路径）
    /// - `source`: 脚本源码
    ///
    /// # 返回
    ///
    /// 按源码位置排序的诊断结果
    pub fn check(&self, script_id: &str, source: &str) -> DiagnosticResult {
        let mut result = DiagnosticResult::new();
        let mut parser = Parser::new(source);
        let program = parser.parse_program();

        for error in parser.errors() {
            let position = error.position();
            let text = error.to_string();
            let prefix = format!("{position}: ");
            let message = text.strip_prefix(&prefix).unwrap_or(&text);
            let mut diag = Diagnostic::error(script_id, message).with_position(position);
            if let Some(line) = source_line(source, position) {
                diag = diag.with_detail(line);
            }
            result.push(diag);
        }

        for warning in parser.warnings() {
            result.push(
                Diagnostic::warn(script_id, warning.message.as_str())
                    .with_position(warning.position),
            );
        }

        result.merge(self.analyze_program(script_id, &program));
        result.sort();
        result
    }

    /// 检查已解析的程序（命令名与翻页）
    pub fn analyze_program(&self, script_id: &str, program: &Program) -> DiagnosticResult {
        let mut result = DiagnosticResult::new();
        // 最后一个翻页之后第一段非空白正文的位置
        let mut open_text: Option<Position> = None;

        for statement in &program.statements {
            match &statement.expression {
                Expression::CommandLiteral { name, .. } if *name == self.page_break_marker => {
                    open_text = None;
                }
                Expression::CommandLiteral { name, .. } => {
                    if !self.known_commands.contains(name) {
                        result.push(
                            Diagnostic::warn(script_id, format!("unknown command '{name}'"))
                                .with_position(statement.position)
                                .with_detail(format!(
                                    "no handler is registered for '{name}', it will be skipped"
                                )),
                        );
                    }
                }
                Expression::TextLiteral { value } => {
                    if open_text.is_none() && !value.trim().is_empty() {
                        open_text = Some(statement.position);
                    }
                }
            }
        }

        if let Some(position) = open_text {
            result.push(
                Diagnostic::info(
                    script_id,
                    format!(
                        "text after the last page break is not followed by [{}]",
                        self.page_break_marker
                    ),
                )
                .with_position(position),
            );
        }

        result
    }
}

impl Default for Checker {
    fn default() -> Self {
        Self::new(std::iter::empty::<String>())
    }
}

/// 使用默认翻页命令名检查一段脚本
pub fn check_source<S: AsRef<str>>(
    script_id: &str,
    source: &str,
    known_commands: &[S],
) -> DiagnosticResult {
    Checker::new(known_commands.iter().map(|name| name.as_ref().to_string()))
        .check(script_id, source)
}

fn source_line(source: &str, position: Position) -> Option<&str> {
    source
        .lines()
        .nth(position.line.checked_sub(1)?)
        .map(str::trim_end)
}
