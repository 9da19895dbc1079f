//! # Runtime 模块
//!
//! 事件求值与逐步执行。
//!
//! ## 模块结构
//!
//! - [`event`]：运行时事件定义
//! - [`evaluator`]：AST 到 Event 列表的转换
//! - [`queue`]：逐步消费事件的事件队列

pub mod evaluator;
pub mod event;
pub mod queue;

pub use evaluator::{Evaluator, PAGE_BREAK_MARKER, compile};
pub use event::{Event, OpaqueCommand, TextReveal};
pub use queue::{
    CommandContext, CommandFlow, CommandHandler, CommandTable, EventQueue, HaltQueue, InsertText,
    NEWLINE_COMMAND, QueueStatus,
};
