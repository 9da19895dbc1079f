//! # Msg Runtime
//!
//! RPG 对话脚本与逐字显示的核心运行时库。
//!
//! ## 架构概述
//!
//! `msg-runtime` 是纯逻辑核心，不依赖任何 IO 或渲染引擎。
//! 宿主每帧调用一次，只传入一个边沿触发的确认信号：
//!
//! ```text
//! Host                              Runtime
//!   │                                  │
//!   │──── confirm: bool ─────────────►│
//!   │                                  │ tick()
//!   │◄─── display buffer + 状态 ───────│
//!   │                                  │
//! ```
//!
//! 脚本从源码到显示缓冲区的路径：
//!
//! ```text
//! 源码 → Lexer → Parser → Program → Evaluator → Vec<Event> → EventQueue → display
//! ```
//!
//! ## 脚本语法
//!
//! ```text
//! 勇者は剣を抜いた。[r]スライムが現れた！[p]
//! [se file="slash.ogg"]一撃で倒した。[p]
//! ```
//!
//! - 方括号之外是正文
//! - `[name key="value" ...]` 是命令；`[p]` 是翻页
//! - 没有转义语法，正文中不能出现 `[` 或 `]`
//!
//! ## 使用示例
//!
//! ```ignore
//! use msg_runtime::{ConfirmEdge, EventQueue, PageAction, PageHandler};
//!
//! let queue = EventQueue::from_source(source)?;
//! let mut pages = PageHandler::new(queue);
//! let mut edge = ConfirmEdge::new();
//!
//! loop {
//!     let confirm = edge.poll(key_down(), now());
//!     if pages.tick(confirm) == PageAction::Finished {
//!         break;
//!     }
//!     render(pages.display());
//! }
//! ```
//!
//! ## 模块结构
//!
//! - [`script`]：词法分析、语法分析与 AST
//! - [`runtime`]：求值器与事件队列
//! - [`typewriter`]：按时间逐字显示的引擎与预设
//! - [`message`]：一次按键一个动作的消息与页面处理器
//! - [`input`]：确认键边沿检测
//! - [`diagnostic`]：脚本静态检查
//! - [`error`]：错误类型定义

pub mod diagnostic;
pub mod error;
pub mod input;
pub mod message;
pub mod runtime;
pub mod script;
pub mod typewriter;

// 重导出核心类型
pub use diagnostic::{
    Checker, CheckerConfig, DEFAULT_KNOWN_COMMANDS, Diagnostic, DiagnosticLevel, DiagnosticResult,
    check_source,
};
pub use error::{CompileError, ConfigError, MsgError, MsgResult, ParseError};
pub use input::{CONFIRM_DEBOUNCE, ConfirmEdge};
pub use message::{MessageAction, MessageHandler, PageAction, PageHandler};
pub use runtime::{
    CommandContext, CommandFlow, CommandHandler, CommandTable, Evaluator, Event, EventQueue,
    HaltQueue, InsertText, NEWLINE_COMMAND, OpaqueCommand, PAGE_BREAK_MARKER, QueueStatus,
    TextReveal, compile,
};
pub use script::{
    Expression, Lexer, Params, ParseWarning, Parser, Position, Program, Statement, Token,
    TokenKind, parse,
};
pub use typewriter::{
    Clock, ManualClock, PauseClass, SystemClock, Typewriter, TypewriterConfig, TypewriterPreset,
    TypewriterState,
};
