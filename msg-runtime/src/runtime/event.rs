//! # Event 模块
//!
//! 求值器产出、事件队列消费的运行时指令。
//!
//! ## 设计原则
//!
//! - **封闭变体**：正文显示、翻页、不透明命令三种
//! - **不解释命令**：页面中断以外的命令原样转交宿主注册的处理器

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::script::Params;

/// 正文显示事件
///
/// 持有一段正文的全部字符和一个游标，每次运行显示一个字符。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextReveal {
    runes: Vec<char>,
    cursor: usize,
}

impl TextReveal {
    pub fn new(text: &str) -> Self {
        Self {
            runes: text.chars().collect(),
            cursor: 0,
        }
    }

    /// 取出下一个字符并前移游标
    pub fn next_rune(&mut self) -> Option<char> {
        let rune = self.runes.get(self.cursor).copied()?;
        self.cursor += 1;
        Some(rune)
    }

    /// 尚未显示的字符数
    pub fn remaining(&self) -> usize {
        self.runes.len() - self.cursor
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.runes.len()
    }

    /// 是否还没有显示过任何字符
    pub fn is_fresh(&self) -> bool {
        self.cursor == 0
    }
}

/// 不透明命令
///
/// 运行时含义由宿主通过 [`CommandTable`](super::queue::CommandTable) 决定。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpaqueCommand {
    pub name: String,
    pub params: Params,
}

impl OpaqueCommand {
    pub fn new(name: impl Into<String>, params: Params) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }

    /// 读取参数
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}

/// 运行时事件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// 逐字显示一段正文
    TextReveal(TextReveal),

    /// 翻页：暂停队列，直到宿主调用 `pop()`
    PageBreak,

    /// 交给宿主解释的命令
    Command(OpaqueCommand),
}

impl Event {
    /// 创建正文事件
    pub fn text(text: &str) -> Self {
        Self::TextReveal(TextReveal::new(text))
    }

    /// 创建命令事件
    pub fn command(name: impl Into<String>, params: Params) -> Self {
        Self::Command(OpaqueCommand::new(name, params))
    }

    /// 正文是否已经全部显示
    ///
    /// 只有正文事件会被耗尽，其它事件总是返回 `false`。
    pub fn is_exhausted(&self) -> bool {
        match self {
            Self::TextReveal(text) => text.is_exhausted(),
            Self::PageBreak | Self::Command(_) => false,
        }
    }

    /// 运行前钩子
    pub(crate) fn pre_hook(&self) {
        match self {
            Self::TextReveal(text) if text.is_fresh() => {
                trace!(chars = text.remaining(), "开始显示正文");
            }
            Self::TextReveal(_) => {}
            Self::PageBreak => trace!("到达翻页"),
            Self::Command(command) => trace!(name = %command.name, "运行命令"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_reveal_is_rune_granular() {
        let mut text = TextReveal::new("こんにちは");
        assert_eq!(text.remaining(), 5);
        assert_eq!(text.next_rune(), Some('こ'));
        assert_eq!(text.next_rune(), Some('ん'));
        assert_eq!(text.remaining(), 3);
        assert!(!text.is_fresh());
    }

    #[test]
    fn test_text_reveal_exhaustion() {
        let mut text = TextReveal::new("a");
        assert!(!text.is_exhausted());
        assert_eq!(text.next_rune(), Some('a'));
        assert!(text.is_exhausted());
        assert_eq!(text.next_rune(), None);
        assert_eq!(text.remaining(), 0);
    }

    #[test]
    fn test_only_text_events_exhaust() {
        assert!(Event::text("").is_exhausted());
        assert!(!Event::PageBreak.is_exhausted());
        assert!(!Event::command("wait", Params::new()).is_exhausted());
    }

    #[test]
    fn test_opaque_command_param() {
        let mut params = Params::new();
        params.insert("file".to_string(), "door.ogg".to_string());
        let command = OpaqueCommand::new("se", params);
        assert_eq!(command.param("file"), Some("door.ogg"));
        assert_eq!(command.param("volume"), None);
    }
}
