//! # Play 模块
//!
//! 在终端里播放脚本：每帧运行一次队列，翻页处等待回车。
//!
//! 终端无法读取按键的按下/松开，一次回车视为一次按下加松开，
//! 仍然经过 [`ConfirmEdge`] 防抖。

use std::io::{self, BufRead, Write};
use std::time::Duration;

use msg_runtime::{
    Clock, CommandTable, CompileError, ConfirmEdge, EventQueue, Evaluator, InsertText,
    MessageHandler, NEWLINE_COMMAND, PageAction, PageHandler, SystemClock, TypewriterConfig,
};
use tracing::debug;

use crate::config::AppConfig;

/// 编译脚本并登记宿主命令
pub fn build_queue(source: &str, config: &AppConfig) -> Result<EventQueue, CompileError> {
    let evaluator = Evaluator::with_page_break_marker(config.checker.page_break_marker.as_str());
    let events = evaluator.compile(source)?;
    let commands = CommandTable::new().with(NEWLINE_COMMAND, InsertText("\n".to_string()));
    Ok(EventQueue::new(events).with_commands(commands))
}

/// 播放选项
#[derive(Debug, Clone)]
pub struct PlayOptions {
    /// 字符间隔与标点停顿
    pub typewriter: TypewriterConfig,
    /// 没有显示新字符的帧之间的间隔
    pub frame_interval: Duration,
    pub debounce: Duration,
    /// 翻页处不等待输入，停顿 `auto_complete_delay` 后自动继续
    pub auto: bool,
}

impl PlayOptions {
    pub fn from_config(config: &AppConfig, auto: bool) -> Self {
        Self {
            typewriter: config.typewriter.clone(),
            frame_interval: config.frame_interval(),
            debounce: config.debounce(),
            auto,
        }
    }
}

/// 播放统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayReport {
    /// 翻过的页数
    pub pages: usize,
    /// 显示过的字符数
    pub chars: usize,
}

/// 终端播放器
pub struct Player<R, W, S> {
    pages: PageHandler,
    options: PlayOptions,
    input: R,
    out: W,
    sleep: S,
    edge: ConfirmEdge,
    clock: SystemClock,
    input_closed: bool,
    /// 已经输出的显示缓冲区字节数
    printed: usize,
}

impl<R, W, S> Player<R, W, S>
where
    R: BufRead,
    W: Write,
    S: FnMut(Duration),
{
    pub fn new(queue: EventQueue, options: PlayOptions, input: R, out: W, sleep: S) -> Self {
        let edge = ConfirmEdge::with_debounce(options.debounce);
        Self {
            pages: PageHandler::new(queue),
            options,
            input,
            out,
            sleep,
            edge,
            clock: SystemClock::new(),
            input_closed: false,
            printed: 0,
        }
    }

    /// 播放到脚本结束
    pub fn run(mut self) -> io::Result<PlayReport> {
        let mut report = PlayReport::default();

        loop {
            let waiting = self.pages.is_waiting() || self.pages.queue().is_finished();
            let confirm = if waiting {
                self.wait_for_confirm()?
            } else {
                self.edge.poll(false, self.clock.now());
                false
            };

            let action = self.pages.tick(confirm);
            let revealed = self.render()?;
            report.chars += revealed.len();

            match action {
                PageAction::Finished => {
                    writeln!(self.out)?;
                    report.pages += 1;
                    break;
                }
                PageAction::Advance => {
                    writeln!(self.out)?;
                    report.pages += 1;
                    continue;
                }
                PageAction::Skipped | PageAction::None => {}
            }

            let typewriter = &self.options.typewriter;
            let delay = match revealed.last() {
                Some(&c) => typewriter.char_delay + typewriter.extra_delay_after(c),
                None => Duration::ZERO,
            };
            let delay = delay.max(self.options.frame_interval);
            if !delay.is_zero() {
                (self.sleep)(delay);
            }
        }

        debug!(pages = report.pages, chars = report.chars, "播放结束");
        Ok(report)
    }

    fn wait_for_confirm(&mut self) -> io::Result<bool> {
        if self.options.auto || self.input_closed {
            let delay = self.options.typewriter.auto_complete_delay;
            if !delay.is_zero() {
                (self.sleep)(delay);
            }
            return Ok(true);
        }

        write!(self.out, " ▼")?;
        self.out.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            debug!("输入已结束，之后自动翻页");
            self.input_closed = true;
        }

        let now = self.clock.now();
        let confirm = self.edge.poll(true, now);
        self.edge.poll(false, now);
        Ok(confirm)
    }

    /// 输出显示缓冲区新增的部分，返回新增的字符
    fn render(&mut self) -> io::Result<Vec<char>> {
        let display = self.pages.display();
        if display.len() < self.printed {
            // 翻页清屏
            self.printed = 0;
        }
        let fresh = &display[self.printed..];
        self.out.write_all(fresh.as_bytes())?;
        self.out.flush()?;
        self.printed = display.len();
        Ok(fresh.chars().collect())
    }
}

/// 用打字机逐字输出一段正文，返回显示所用的时间
///
/// `wait` 在两帧之间调用；正式运行时为 `thread::sleep`，测试时推进手动时钟。
pub fn type_text<C, W>(
    handler: &mut MessageHandler<C>,
    text: &str,
    out: &mut W,
    mut wait: impl FnMut(),
) -> io::Result<Duration>
where
    C: Clock,
    W: Write,
{
    handler.show(text);
    let auto = handler.typewriter().config().auto_complete;
    let mut printed = 0;

    loop {
        handler.tick(false);
        let display = handler.display_text();
        out.write_all(display[printed..].as_bytes())?;
        out.flush()?;
        printed = display.len();

        let done = if auto {
            handler.is_dismissed()
        } else {
            handler.typewriter().is_complete()
        };
        if done {
            break;
        }
        wait();
    }

    writeln!(out)?;
    Ok(handler.typewriter().elapsed())
}
