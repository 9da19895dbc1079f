//! # Queue 模块
//!
//! 逐步消费 Event 列表的事件队列。
//!
//! ## 执行模型
//!
//! ```text
//! run_head() -> QueueStatus
//! ```
//!
//! 每次调用只做一个单位的工作：显示一个字符、停在翻页处，或运行一条命令。
//! 调用频率由宿主决定（例如每隔一帧调用一次），队列本身不关心时间。
//!
//! - 正文耗尽后，下一次调用自动丢弃它并继续处理后面的事件
//! - 遇到翻页时队列变为非活动状态，只有 `pop()` 能解除
//! - `pop()` 越过翻页时清空显示缓冲区（翻页即清屏）

use std::collections::{HashMap, VecDeque};
use std::fmt;

use tracing::debug;

use crate::error::CompileError;
use crate::runtime::evaluator::compile;
use crate::runtime::event::{Event, OpaqueCommand};

/// 队列运行结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueStatus {
    /// 正常：还有事件，或本次调用没有做任何事
    None,
    /// 没有剩余事件
    Finish,
}

/// 命令运行后的流程控制
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandFlow {
    /// 命令完成，从队列中移除
    Continue,
    /// 暂停队列，命令留在队首直到 `pop()`
    Halt,
}

/// 命令处理器可访问的队列上下文
pub struct CommandContext<'q> {
    display: &'q mut String,
}

impl<'q> CommandContext<'q> {
    fn new(display: &'q mut String) -> Self {
        Self { display }
    }

    /// 当前显示内容
    pub fn display(&self) -> &str {
        self.display
    }

    /// 向显示缓冲区追加文本
    pub fn push_str(&mut self, text: &str) {
        self.display.push_str(text);
    }

    /// 清空显示缓冲区
    pub fn clear(&mut self) {
        self.display.clear();
    }
}

/// 不透明命令的处理器
///
/// 宿主为每个命令名注册一个处理器，例如播放音效、插入换行。
pub trait CommandHandler {
    /// 运行前钩子
    fn pre_hook(&mut self, _command: &OpaqueCommand) {}

    /// 运行命令
    fn run(&mut self, command: &OpaqueCommand, ctx: &mut CommandContext<'_>) -> CommandFlow;
}

impl<F> CommandHandler for F
where
    F: FnMut(&OpaqueCommand, &mut CommandContext<'_>) -> CommandFlow,
{
    fn run(&mut self, command: &OpaqueCommand, ctx: &mut CommandContext<'_>) -> CommandFlow {
        self(command, ctx)
    }
}

/// 宿主通常登记为换行的命令名
pub const NEWLINE_COMMAND: &str = "r";

/// 插入固定文本的命令处理器
///
/// 常用于把 `[r]` 解释为换行。
#[derive(Debug, Clone)]
pub struct InsertText(pub String);

impl CommandHandler for InsertText {
    fn run(&mut self, _command: &OpaqueCommand, ctx: &mut CommandContext<'_>) -> CommandFlow {
        ctx.push_str(&self.0);
        CommandFlow::Continue
    }
}

/// 暂停队列的命令处理器（等待确认后继续，不清屏）
#[derive(Debug, Clone, Copy, Default)]
pub struct HaltQueue;

impl CommandHandler for HaltQueue {
    fn run(&mut self, _command: &OpaqueCommand, _ctx: &mut CommandContext<'_>) -> CommandFlow {
        CommandFlow::Halt
    }
}

/// 命令名到处理器的映射
#[derive(Default)]
pub struct CommandTable {
    handlers: HashMap<String, Box<dyn CommandHandler>>,
}

impl CommandTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册处理器，同名处理器会被替换
    pub fn register(&mut self, name: impl Into<String>, handler: impl CommandHandler + 'static) {
        self.handlers.insert(name.into(), Box::new(handler));
    }

    /// 链式注册
    pub fn with(mut self, name: impl Into<String>, handler: impl CommandHandler + 'static) -> Self {
        self.register(name, handler);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    fn get_mut(&mut self, name: &str) -> Option<&mut Box<dyn CommandHandler>> {
        self.handlers.get_mut(name)
    }
}

impl fmt::Debug for CommandTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.handlers.keys().collect();
        names.sort();
        f.debug_struct("CommandTable").field("handlers", &names).finish()
    }
}

/// 事件队列
#[derive(Debug)]
pub struct EventQueue {
    events: VecDeque<Event>,
    active: bool,
    display: String,
    commands: CommandTable,
}

impl EventQueue {
    /// 创建事件队列
    pub fn new(events: Vec<Event>) -> Self {
        Self {
            events: events.into(),
            active: true,
            display: String::new(),
            commands: CommandTable::new(),
        }
    }

    /// 编译脚本文本并创建事件队列
    pub fn from_source(source: &str) -> Result<Self, CompileError> {
        Ok(Self::new(compile(source)?))
    }

    /// 设置命令处理器表
    pub fn with_commands(mut self, commands: CommandTable) -> Self {
        self.commands = commands;
        self
    }

    /// 当前显示内容
    pub fn display(&self) -> &str {
        &self.display
    }

    /// 当前队首事件
    pub fn head(&self) -> Option<&Event> {
        self.events.front()
    }

    /// 是否处于活动状态（`false` 表示等待 `pop()`）
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// 剩余事件数（包括已耗尽但尚未丢弃的正文）
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// 是否已经没有需要处理的工作
    pub fn is_finished(&self) -> bool {
        self.events.iter().all(Event::is_exhausted)
    }

    /// 运行队首事件的一个单位
    pub fn run_head(&mut self) -> QueueStatus {
        if !self.active {
            return QueueStatus::None;
        }

        while self.events.front().is_some_and(Event::is_exhausted) {
            self.events.pop_front();
        }

        let Some(head) = self.events.front_mut() else {
            return QueueStatus::Finish;
        };
        head.pre_hook();

        match head {
            Event::TextReveal(text) => {
                if let Some(rune) = text.next_rune() {
                    self.display.push(rune);
                }
            }
            Event::PageBreak => {
                debug!("翻页，等待确认");
                self.active = false;
            }
            Event::Command(command) => {
                let flow = match self.commands.get_mut(&command.name) {
                    Some(handler) => {
                        handler.pre_hook(command);
                        handler.run(command, &mut CommandContext::new(&mut self.display))
                    }
                    None => {
                        debug!(name = %command.name, "没有注册处理器的命令，已跳过");
                        CommandFlow::Continue
                    }
                };
                match flow {
                    CommandFlow::Continue => {
                        self.events.pop_front();
                    }
                    CommandFlow::Halt => {
                        debug!("命令暂停了队列");
                        self.active = false;
                    }
                }
            }
        }

        QueueStatus::None
    }

    /// 丢弃队首事件并恢复活动状态
    ///
    /// 被丢弃的是翻页时，同时清空显示缓冲区。
    pub fn pop(&mut self) -> QueueStatus {
        if let Some(Event::PageBreak) = self.events.pop_front() {
            self.display.clear();
        }
        self.active = true;

        if self.events.is_empty() {
            QueueStatus::Finish
        } else {
            QueueStatus::None
        }
    }

    /// 一直运行到队列暂停或结束，用于跳过当前页的逐字显示
    pub fn flush_page(&mut self) -> QueueStatus {
        while self.active {
            if self.run_head() == QueueStatus::Finish {
                return QueueStatus::Finish;
            }
        }
        QueueStatus::None
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    fn run_n(queue: &mut EventQueue, n: usize) {
        for _ in 0..n {
            queue.run_head();
        }
    }

    #[test]
    fn test_incremental_reveal() {
        let mut queue = EventQueue::from_source("こんにちは").unwrap();
        run_n(&mut queue, 2);
        assert_eq!(queue.display(), "こん");
        run_n(&mut queue, 3);
        assert_eq!(queue.display(), "こんにちは");

        assert_eq!(queue.run_head(), QueueStatus::Finish);
        assert_eq!(queue.run_head(), QueueStatus::Finish);
        assert_eq!(queue.display(), "こんにちは");
    }

    #[test]
    fn test_page_break_gating() {
        let mut queue = EventQueue::new(vec![
            Event::text("東京"),
            Event::PageBreak,
            Event::text("京都"),
        ]);
        run_n(&mut queue, 2);
        assert_eq!(queue.display(), "東京");

        for _ in 0..5 {
            assert_eq!(queue.run_head(), QueueStatus::None);
            assert_eq!(queue.display(), "東京");
        }
        assert!(!queue.is_active());
        assert_eq!(queue.head(), Some(&Event::PageBreak));

        assert_eq!(queue.pop(), QueueStatus::None);
        assert_eq!(queue.display(), "");
        assert!(queue.is_active());

        queue.run_head();
        assert_eq!(queue.display(), "京");
        queue.run_head();
        assert_eq!(queue.display(), "京都");
        assert_eq!(queue.run_head(), QueueStatus::Finish);
    }

    #[test]
    fn test_pop_empty_queue_is_finish() {
        let mut queue = EventQueue::new(Vec::new());
        assert_eq!(queue.pop(), QueueStatus::Finish);
        assert_eq!(queue.run_head(), QueueStatus::Finish);
    }

    #[test]
    fn test_pop_last_event_reports_finish() {
        let mut queue = EventQueue::new(vec![Event::text("a"), Event::PageBreak]);
        queue.run_head();
        queue.run_head();
        assert!(!queue.is_active());
        assert_eq!(queue.pop(), QueueStatus::Finish);
        assert_eq!(queue.display(), "");
    }

    #[test]
    fn test_unhandled_command_is_skipped() {
        let mut queue = EventQueue::from_source("a[wait]b").unwrap();
        run_n(&mut queue, 2);
        assert_eq!(queue.display(), "a");
        assert!(queue.is_active());
        queue.run_head();
        assert_eq!(queue.display(), "ab");
    }

    #[test]
    fn test_registered_command_inserts_text() {
        let mut queue = EventQueue::from_source("a[r]b")
            .unwrap()
            .with_commands(CommandTable::new().with("r", InsertText("\n".to_string())));
        run_n(&mut queue, 4);
        assert_eq!(queue.display(), "a\nb");
    }

    #[test]
    fn test_halting_command_keeps_display() {
        let mut queue = EventQueue::from_source("a[l]b")
            .unwrap()
            .with_commands(CommandTable::new().with("l", HaltQueue));
        run_n(&mut queue, 5);
        assert_eq!(queue.display(), "a");
        assert!(!queue.is_active());

        queue.pop();
        queue.run_head();
        assert_eq!(queue.display(), "ab");
    }

    #[test]
    fn test_closure_handler_sees_params() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut queue = EventQueue::from_source(r#"[se file="door.ogg"]"#)
            .unwrap()
            .with_commands(CommandTable::new().with(
                "se",
                move |command: &OpaqueCommand, _ctx: &mut CommandContext<'_>| {
                    sink.borrow_mut().push(command.param("file").map(str::to_string));
                    CommandFlow::Continue
                },
            ));
        assert_eq!(queue.run_head(), QueueStatus::None);
        assert_eq!(queue.run_head(), QueueStatus::Finish);
        assert_eq!(*seen.borrow(), vec![Some("door.ogg".to_string())]);
    }

    #[test]
    fn test_flush_page_stops_at_page_break() {
        let mut queue = EventQueue::new(vec![
            Event::text("東京"),
            Event::PageBreak,
            Event::text("京都"),
        ]);
        queue.run_head();
        assert_eq!(queue.flush_page(), QueueStatus::None);
        assert_eq!(queue.display(), "東京");
        assert!(!queue.is_active());

        queue.pop();
        assert_eq!(queue.flush_page(), QueueStatus::Finish);
        assert_eq!(queue.display(), "京都");
    }

    #[test]
    fn test_is_finished_before_exhausted_head_is_dropped() {
        let mut queue = EventQueue::new(vec![Event::text("a")]);
        assert!(!queue.is_finished());
        queue.run_head();
        assert!(queue.is_finished());
        assert_eq!(queue.len(), 1);
    }
}
