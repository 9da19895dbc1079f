//! # Typewriter 模块
//!
//! 单段正文的逐字显示引擎，不了解命令与翻页。
//!
//! ## 状态转换
//!
//! ```text
//! Idle ──start──► Typing ──耗尽/skip──► Complete
//!                   │  ▲
//!              pause│  │resume
//!                   ▼  │
//!                  Paused
//! ```
//!
//! ## 节奏
//!
//! 每次 `update()` 最多显示一个字符，条件是距上一次显示的时间
//! 不少于 `char_delay` 加上上一个字符带来的额外停顿（标点、换行）。
//! 只比较“距上一次显示”的时间差，暂停或掉帧不会在之后集中补显。

mod clock;
mod config;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{PauseClass, TypewriterConfig, TypewriterPreset};

use std::fmt;
use std::time::Duration;

use tracing::trace;

/// 打字机状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypewriterState {
    #[default]
    Idle,
    Typing,
    Complete,
    Paused,
}

/// 打字机回调
#[derive(Default)]
struct Callbacks {
    on_char: Option<Box<dyn FnMut(char)>>,
    on_complete: Option<Box<dyn FnMut()>>,
    on_skip: Option<Box<dyn FnMut()>>,
}

/// 打字机
pub struct Typewriter<C: Clock = SystemClock> {
    config: TypewriterConfig,
    clock: C,
    callbacks: Callbacks,
    current_text: String,
    chars: Vec<char>,
    display_text: String,
    char_index: usize,
    state: TypewriterState,
    start_time: Duration,
    last_reveal: Duration,
    /// 上一个字符带来的额外停顿
    extra_delay: Duration,
    complete_time: Option<Duration>,
}

impl Typewriter<SystemClock> {
    /// 使用系统时钟创建打字机
    pub fn new(config: TypewriterConfig) -> Self {
        Self::with_clock(config, SystemClock::new())
    }
}

impl<C: Clock> Typewriter<C> {
    /// 使用指定时钟创建打字机
    pub fn with_clock(config: TypewriterConfig, clock: C) -> Self {
        Self {
            config,
            clock,
            callbacks: Callbacks::default(),
            current_text: String::new(),
            chars: Vec::new(),
            display_text: String::new(),
            char_index: 0,
            state: TypewriterState::Idle,
            start_time: Duration::ZERO,
            last_reveal: Duration::ZERO,
            extra_delay: Duration::ZERO,
            complete_time: None,
        }
    }

    /// 每显示一个字符时调用
    pub fn on_char(&mut self, f: impl FnMut(char) + 'static) {
        self.callbacks.on_char = Some(Box::new(f));
    }

    /// 显示完成时调用（包括跳过）
    pub fn on_complete(&mut self, f: impl FnMut() + 'static) {
        self.callbacks.on_complete = Some(Box::new(f));
    }

    /// 跳过时调用，先于完成回调
    pub fn on_skip(&mut self, f: impl FnMut() + 'static) {
        self.callbacks.on_skip = Some(Box::new(f));
    }

    /// 开始显示一段正文
    pub fn start(&mut self, text: &str) {
        let now = self.clock.now();
        self.current_text = text.to_string();
        self.chars = text.chars().collect();
        self.display_text.clear();
        self.char_index = 0;
        self.start_time = now;
        self.last_reveal = now;
        self.extra_delay = Duration::ZERO;
        self.complete_time = None;
        self.state = TypewriterState::Typing;
        trace!(chars = self.chars.len(), "打字机开始");
    }

    /// 推进一次，返回是否显示了新字符
    pub fn update(&mut self) -> bool {
        if self.state != TypewriterState::Typing {
            return false;
        }
        if self.char_index >= self.chars.len() {
            self.finish();
            return false;
        }

        let now = self.clock.now();
        if now.saturating_sub(self.last_reveal) < self.config.char_delay + self.extra_delay {
            return false;
        }

        let c = self.chars[self.char_index];
        self.char_index += 1;
        self.display_text.push(c);
        self.last_reveal = now;
        self.extra_delay = self.config.extra_delay_after(c);

        if let Some(on_char) = self.callbacks.on_char.as_mut() {
            on_char(c);
        }
        if self.char_index >= self.chars.len() {
            self.finish();
        }
        true
    }

    fn finish(&mut self) {
        self.state = TypewriterState::Complete;
        self.complete_time = Some(self.clock.now());
        trace!("打字机完成");
        if let Some(on_complete) = self.callbacks.on_complete.as_mut() {
            on_complete();
        }
    }

    /// 立即显示全文
    ///
    /// 仅在 `Typing` 且允许跳过时生效，返回是否生效。
    pub fn skip(&mut self) -> bool {
        if self.state != TypewriterState::Typing || !self.config.skip_enabled {
            return false;
        }
        self.display_text.clone_from(&self.current_text);
        self.char_index = self.chars.len();
        trace!("打字机跳过");
        if let Some(on_skip) = self.callbacks.on_skip.as_mut() {
            on_skip();
        }
        self.finish();
        true
    }

    /// 暂停，保留已显示的内容
    pub fn pause(&mut self) -> bool {
        if !self.config.pause_enabled || self.state != TypewriterState::Typing {
            return false;
        }
        self.state = TypewriterState::Paused;
        true
    }

    /// 恢复，重新从现在开始计时
    pub fn resume(&mut self) -> bool {
        if !self.config.pause_enabled || self.state != TypewriterState::Paused {
            return false;
        }
        self.last_reveal = self.clock.now();
        self.state = TypewriterState::Typing;
        true
    }

    /// 回到 `Idle`，清空全部内容
    pub fn reset(&mut self) {
        self.current_text.clear();
        self.chars.clear();
        self.display_text.clear();
        self.char_index = 0;
        self.start_time = Duration::ZERO;
        self.last_reveal = Duration::ZERO;
        self.extra_delay = Duration::ZERO;
        self.complete_time = None;
        self.state = TypewriterState::Idle;
    }

    pub fn display_text(&self) -> &str {
        &self.display_text
    }

    pub fn current_text(&self) -> &str {
        &self.current_text
    }

    pub fn state(&self) -> TypewriterState {
        self.state
    }

    pub fn config(&self) -> &TypewriterConfig {
        &self.config
    }

    pub fn is_idle(&self) -> bool {
        self.state == TypewriterState::Idle
    }

    pub fn is_typing(&self) -> bool {
        self.state == TypewriterState::Typing
    }

    pub fn is_complete(&self) -> bool {
        self.state == TypewriterState::Complete
    }

    pub fn is_paused(&self) -> bool {
        self.state == TypewriterState::Paused
    }

    /// 已显示字符数
    pub fn char_index(&self) -> usize {
        self.char_index
    }

    /// 总字符数
    pub fn total_chars(&self) -> usize {
        self.chars.len()
    }

    /// 显示进度，范围 `[0, 1]`；没有正文时为 `0.0`
    pub fn progress(&self) -> f32 {
        if self.chars.is_empty() {
            return 0.0;
        }
        self.char_index as f32 / self.chars.len() as f32
    }

    /// 从 `start` 起经过的时间；完成后停在完成时刻
    pub fn elapsed(&self) -> Duration {
        match self.state {
            TypewriterState::Idle => Duration::ZERO,
            TypewriterState::Complete => self
                .complete_time
                .unwrap_or(self.start_time)
                .saturating_sub(self.start_time),
            TypewriterState::Typing | TypewriterState::Paused => {
                self.clock.now().saturating_sub(self.start_time)
            }
        }
    }

    /// 完成之后经过的时间
    pub fn time_since_complete(&self) -> Option<Duration> {
        self.complete_time
            .map(|t| self.clock.now().saturating_sub(t))
    }
}

impl<C: Clock + fmt::Debug> fmt::Debug for Typewriter<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Typewriter")
            .field("state", &self.state)
            .field("display_text", &self.display_text)
            .field("char_index", &self.char_index)
            .field("total_chars", &self.chars.len())
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}
