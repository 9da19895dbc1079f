//! # Message 模块
//!
//! 把显示引擎与确认输入组合成“显示 → 等待确认 → 跳过或推进”的流程。
//!
//! ## 一次按键只做一件事
//!
//! 每个 tick 最多消费一次确认：
//!
//! ```text
//! 正在显示 + 确认 → 跳过（立即显示全部）
//! 显示完成 + 确认 → 推进（通知宿主关闭或切换消息）
//! ```
//!
//! 同一次按键不会既跳过又推进。确认信号必须已经过边沿检测
//! （见 [`ConfirmEdge`](crate::input::ConfirmEdge)），由宿主每帧传入。

use tracing::debug;

use crate::runtime::{EventQueue, QueueStatus};
use crate::typewriter::{Clock, SystemClock, Typewriter, TypewriterConfig};

/// 消息处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageAction {
    /// 本次没有语义动作
    None,
    /// 确认键跳过了逐字显示
    Skipped,
    /// 宿主应当推进或关闭消息
    Advance,
}

/// 单段消息的处理器
pub struct MessageHandler<C: Clock = SystemClock> {
    typewriter: Typewriter<C>,
    on_advance: Option<Box<dyn FnMut()>>,
    dismissed: bool,
}

impl MessageHandler<SystemClock> {
    pub fn new(config: TypewriterConfig) -> Self {
        Self::from_typewriter(Typewriter::new(config))
    }
}

impl<C: Clock> MessageHandler<C> {
    pub fn with_clock(config: TypewriterConfig, clock: C) -> Self {
        Self::from_typewriter(Typewriter::with_clock(config, clock))
    }

    pub fn from_typewriter(typewriter: Typewriter<C>) -> Self {
        Self {
            typewriter,
            on_advance: None,
            dismissed: false,
        }
    }

    /// 推进时调用
    pub fn on_advance(&mut self, f: impl FnMut() + 'static) {
        self.on_advance = Some(Box::new(f));
    }

    /// 开始显示一段消息
    pub fn show(&mut self, text: &str) {
        self.typewriter.start(text);
        self.dismissed = false;
    }

    /// 每帧调用一次
    ///
    /// `confirm` 为边沿触发的确认信号。
    pub fn tick(&mut self, confirm: bool) -> MessageAction {
        if self.dismissed || self.typewriter.is_idle() {
            return MessageAction::None;
        }

        // 只有在本帧开始前就已完成时才允许推进，避免同一次按键先跳过再推进
        let was_complete = self.typewriter.is_complete();

        if confirm && self.typewriter.is_typing() && self.typewriter.skip() {
            debug!("确认键跳过了逐字显示");
            return MessageAction::Skipped;
        }

        self.typewriter.update();

        if was_complete && (confirm || self.auto_advance_due()) {
            return self.advance();
        }
        MessageAction::None
    }

    fn auto_advance_due(&self) -> bool {
        let config = self.typewriter.config();
        config.auto_complete
            && self
                .typewriter
                .time_since_complete()
                .is_some_and(|t| t >= config.auto_complete_delay)
    }

    fn advance(&mut self) -> MessageAction {
        self.dismissed = true;
        debug!("消息推进");
        if let Some(on_advance) = self.on_advance.as_mut() {
            on_advance();
        }
        MessageAction::Advance
    }

    pub fn display_text(&self) -> &str {
        self.typewriter.display_text()
    }

    /// 是否已经推进（之后的 tick 不再产生动作，直到下一次 `show`）
    pub fn is_dismissed(&self) -> bool {
        self.dismissed
    }

    pub fn typewriter(&self) -> &Typewriter<C> {
        &self.typewriter
    }
}

/// 页面处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageAction {
    None,
    /// 确认键让当前页立即显示完毕
    Skipped,
    /// 确认键翻过了一页
    Advance,
    /// 确认键关闭了已经全部显示完的脚本
    Finished,
}

/// 脚本事件队列的处理器
///
/// 与 [`MessageHandler`] 遵循同样的“一次按键一个动作”规则，
/// 每个 tick 至多运行一次 `run_head()`。
#[derive(Debug)]
pub struct PageHandler {
    queue: EventQueue,
    closed: bool,
}

impl PageHandler {
    pub fn new(queue: EventQueue) -> Self {
        Self {
            queue,
            closed: false,
        }
    }

    /// 每帧调用一次
    pub fn tick(&mut self, confirm: bool) -> PageAction {
        if self.closed {
            return PageAction::None;
        }

        if !self.queue.is_active() {
            if !confirm {
                return PageAction::None;
            }
            return self.turn_page();
        }

        if self.queue.is_finished() {
            return if confirm {
                self.close()
            } else {
                PageAction::None
            };
        }

        if confirm {
            let shown = self.queue.display().len();
            let status = self.queue.flush_page();
            if self.queue.display().len() != shown {
                return PageAction::Skipped;
            }
            // 整页早已显示完，只差走到翻页处：这次按键直接翻页
            return match status {
                QueueStatus::Finish => self.close(),
                QueueStatus::None => self.turn_page(),
            };
        }

        self.queue.run_head();
        PageAction::None
    }

    fn turn_page(&mut self) -> PageAction {
        match self.queue.pop() {
            QueueStatus::Finish => self.close(),
            QueueStatus::None => PageAction::Advance,
        }
    }

    fn close(&mut self) -> PageAction {
        debug!("脚本显示结束");
        self.closed = true;
        PageAction::Finished
    }

    pub fn display(&self) -> &str {
        self.queue.display()
    }

    /// 是否停在翻页处等待确认
    pub fn is_waiting(&self) -> bool {
        !self.closed && !self.queue.is_active()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn queue(&self) -> &EventQueue {
        &self.queue
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;
    use std::time::Duration;

    use super::*;
    use crate::runtime::Event;
    use crate::typewriter::ManualClock;

    fn handler(config: TypewriterConfig) -> (MessageHandler<ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        (MessageHandler::with_clock(config, clock.clone()), clock)
    }

    fn slow_config() -> TypewriterConfig {
        TypewriterConfig {
            char_delay: Duration::from_millis(10),
            ..TypewriterConfig::default()
        }
    }

    #[test]
    fn test_press_while_typing_skips_only() {
        let (mut handler, clock) = handler(slow_config());
        let advanced = Rc::new(Cell::new(0));
        let inner = Rc::clone(&advanced);
        handler.on_advance(move || inner.set(inner.get() + 1));

        handler.show("勇者は剣を抜いた");
        clock.advance_millis(10);
        assert_eq!(handler.tick(false), MessageAction::None);
        assert_eq!(handler.display_text(), "勇");

        assert_eq!(handler.tick(true), MessageAction::Skipped);
        assert_eq!(handler.display_text(), "勇者は剣を抜いた");
        assert_eq!(advanced.get(), 0);

        assert_eq!(handler.tick(false), MessageAction::None);
        assert_eq!(advanced.get(), 0);
    }

    #[test]
    fn test_press_when_complete_advances_once() {
        let (mut handler, _) = handler(TypewriterConfig {
            char_delay: Duration::ZERO,
            ..TypewriterConfig::default()
        });
        handler.show("a");
        assert_eq!(handler.tick(false), MessageAction::None);
        assert!(handler.typewriter().is_complete());

        assert_eq!(handler.tick(true), MessageAction::Advance);
        assert!(handler.is_dismissed());
        assert_eq!(handler.tick(true), MessageAction::None);
    }

    #[test]
    fn test_completion_and_press_in_same_tick_do_not_advance() {
        let config = TypewriterConfig {
            skip_enabled: false,
            char_delay: Duration::ZERO,
            ..TypewriterConfig::default()
        };
        let (mut handler, _) = handler(config);
        handler.show("a");
        // 本帧显示完最后一个字符，按键不能同时算作推进
        assert_eq!(handler.tick(true), MessageAction::None);
        assert!(handler.typewriter().is_complete());
        assert_eq!(handler.tick(true), MessageAction::Advance);
    }

    #[test]
    fn test_auto_complete_advances_after_delay() {
        let config = TypewriterConfig {
            char_delay: Duration::ZERO,
            auto_complete: true,
            auto_complete_delay: Duration::from_millis(500),
            ..TypewriterConfig::default()
        };
        let (mut handler, clock) = handler(config);
        handler.show("a");
        handler.tick(false);
        clock.advance_millis(499);
        assert_eq!(handler.tick(false), MessageAction::None);
        clock.advance_millis(1);
        assert_eq!(handler.tick(false), MessageAction::Advance);
        assert_eq!(handler.tick(false), MessageAction::None);
    }

    #[test]
    fn test_idle_handler_ignores_input() {
        let (mut handler, _) = handler(slow_config());
        assert_eq!(handler.tick(true), MessageAction::None);
    }

    #[test]
    fn test_show_rearms_after_dismiss() {
        let (mut handler, _) = handler(TypewriterConfig {
            char_delay: Duration::ZERO,
            ..TypewriterConfig::default()
        });
        handler.show("a");
        handler.tick(false);
        assert_eq!(handler.tick(true), MessageAction::Advance);

        handler.show("b");
        assert!(!handler.is_dismissed());
        handler.tick(false);
        assert_eq!(handler.display_text(), "b");
    }

    fn page_handler() -> PageHandler {
        PageHandler::new(EventQueue::new(vec![
            Event::text("東京"),
            Event::PageBreak,
            Event::text("京都"),
        ]))
    }

    #[test]
    fn test_page_handler_skip_then_advance() {
        let mut pages = page_handler();
        assert_eq!(pages.tick(false), PageAction::None);
        assert_eq!(pages.display(), "東");

        assert_eq!(pages.tick(true), PageAction::Skipped);
        assert_eq!(pages.display(), "東京");
        assert!(pages.is_waiting());

        assert_eq!(pages.tick(false), PageAction::None);
        assert_eq!(pages.tick(true), PageAction::Advance);
        assert_eq!(pages.display(), "");

        pages.tick(false);
        pages.tick(false);
        assert_eq!(pages.display(), "京都");
        assert_eq!(pages.tick(true), PageAction::Finished);
        assert!(pages.is_closed());
        assert_eq!(pages.tick(true), PageAction::None);
    }

    #[test]
    fn test_page_handler_press_on_full_page_advances() {
        let mut pages = PageHandler::new(EventQueue::new(vec![
            Event::text("a"),
            Event::PageBreak,
            Event::text("b"),
        ]));
        assert_eq!(pages.tick(false), PageAction::None);
        assert_eq!(pages.display(), "a");
        assert!(!pages.is_waiting());

        assert_eq!(pages.tick(true), PageAction::Advance);
        assert_eq!(pages.display(), "");
        assert!(!pages.is_waiting());

        pages.tick(false);
        assert_eq!(pages.display(), "b");
    }

    #[test]
    fn test_page_handler_press_on_full_last_page_finishes() {
        let mut pages = PageHandler::new(EventQueue::new(vec![Event::text("a"), Event::PageBreak]));
        pages.tick(false);
        assert_eq!(pages.tick(true), PageAction::Finished);
        assert!(pages.is_closed());
    }

    #[test]
    fn test_page_handler_final_page_break_closes() {
        let mut pages = PageHandler::new(EventQueue::new(vec![Event::text("a"), Event::PageBreak]));
        pages.tick(false);
        pages.tick(false);
        assert!(pages.is_waiting());
        assert_eq!(pages.tick(true), PageAction::Finished);
    }
}
