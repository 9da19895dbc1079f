//! # Typewriter 配置
//!
//! 打字机的节奏配置与命名预设。
//!
//! 配置在一次显示开始后不再修改。JSON 中的时长以毫秒表示：
//!
//! ```json
//! { "char_delay": 50, "punctuation_delay": 400, "skip_enabled": true }
//! ```
//!
//! 缺省字段取 `normal` 预设的值。

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// 打字机配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypewriterConfig {
    /// 相邻两个字符之间的基础间隔
    #[serde(with = "millis", default = "default_char_delay")]
    pub char_delay: Duration,

    /// 句末标点（。！？.!? 等）之后额外等待的时间
    #[serde(with = "millis", default = "default_punctuation_delay")]
    pub punctuation_delay: Duration,

    /// 逗号类标点（、，,;: 等）之后额外等待的时间
    #[serde(with = "millis", default = "default_comma_delay")]
    pub comma_delay: Duration,

    /// 换行之后额外等待的时间
    #[serde(with = "millis", default = "default_newline_delay")]
    pub newline_delay: Duration,

    /// 是否允许跳过（立即显示全文）
    #[serde(default = "default_true")]
    pub skip_enabled: bool,

    /// 是否允许暂停
    #[serde(default = "default_true")]
    pub pause_enabled: bool,

    /// 显示完成后是否自动推进
    #[serde(default)]
    pub auto_complete: bool,

    /// 自动推进前的等待时间
    #[serde(with = "millis", default = "default_auto_complete_delay")]
    pub auto_complete_delay: Duration,
}

// 默认值函数
fn default_char_delay() -> Duration {
    Duration::from_millis(50)
}

fn default_punctuation_delay() -> Duration {
    Duration::from_millis(400)
}

fn default_comma_delay() -> Duration {
    Duration::from_millis(200)
}

fn default_newline_delay() -> Duration {
    Duration::from_millis(250)
}

fn default_auto_complete_delay() -> Duration {
    Duration::from_millis(1500)
}

fn default_true() -> bool {
    true
}

impl Default for TypewriterConfig {
    fn default() -> Self {
        TypewriterPreset::Normal.config()
    }
}

impl TypewriterConfig {
    /// 从 JSON 文本解析配置
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Invalid {
            message: e.to_string(),
        })
    }

    /// 显示字符 `c` 之后，下一个字符需要额外等待的时间
    pub fn extra_delay_after(&self, c: char) -> Duration {
        match PauseClass::of(c) {
            PauseClass::SentenceEnd => self.punctuation_delay,
            PauseClass::Comma => self.comma_delay,
            PauseClass::Newline => self.newline_delay,
            PauseClass::None => Duration::ZERO,
        }
    }
}

/// 字符对节奏的影响
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseClass {
    SentenceEnd,
    Comma,
    Newline,
    None,
}

impl PauseClass {
    pub fn of(c: char) -> Self {
        match c {
            '.' | '!' | '?' | '。' | '！' | '？' | '…' | '‥' => Self::SentenceEnd,
            ',' | ';' | ':' | '、' | '，' | '；' | '：' => Self::Comma,
            '\n' => Self::Newline,
            _ => Self::None,
        }
    }
}

/// 命名预设
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypewriterPreset {
    /// 无延迟，每次更新显示一个字符
    Instant,
    Fast,
    Normal,
    Slow,
    /// 慢速，并在标点处长时间停顿
    Dramatic,
}

impl TypewriterPreset {
    pub const ALL: [TypewriterPreset; 5] = [
        Self::Instant,
        Self::Fast,
        Self::Normal,
        Self::Slow,
        Self::Dramatic,
    ];

    /// 预设对应的配置
    pub fn config(self) -> TypewriterConfig {
        let (char_ms, punctuation_ms, comma_ms, newline_ms) = match self {
            Self::Instant => (0, 0, 0, 0),
            Self::Fast => (20, 200, 100, 100),
            Self::Normal => (50, 400, 200, 250),
            Self::Slow => (100, 600, 300, 400),
            Self::Dramatic => (150, 1000, 500, 700),
        };
        TypewriterConfig {
            char_delay: Duration::from_millis(char_ms),
            punctuation_delay: Duration::from_millis(punctuation_ms),
            comma_delay: Duration::from_millis(comma_ms),
            newline_delay: Duration::from_millis(newline_ms),
            skip_enabled: true,
            pause_enabled: true,
            auto_complete: false,
            auto_complete_delay: default_auto_complete_delay(),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Instant => "instant",
            Self::Fast => "fast",
            Self::Normal => "normal",
            Self::Slow => "slow",
            Self::Dramatic => "dramatic",
        }
    }
}

impl fmt::Display for TypewriterPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TypewriterPreset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|preset| preset.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigError::UnknownPreset {
                name: s.to_string(),
            })
    }
}

impl From<TypewriterPreset> for TypewriterConfig {
    fn from(preset: TypewriterPreset) -> Self {
        preset.config()
    }
}

/// 以毫秒整数序列化 `Duration`
mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
