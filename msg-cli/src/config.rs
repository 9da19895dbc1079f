//! # Config 模块
//!
//! 命令行宿主的配置管理。
//!
//! ## 配置优先级
//!
//! 1. 命令行参数（最高）
//! 2. 配置文件 (config.json)
//! 3. 默认值（最低）

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, bail};
use msg_runtime::{
    CONFIRM_DEBOUNCE, CheckerConfig, MsgResult, TypewriterConfig, TypewriterPreset,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// 应用配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// 播放时每帧的最短间隔（毫秒）
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,

    /// 确认键防抖间隔（毫秒）
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// 翻页命令名与宿主认识的命令名（`page_break_marker`、`known_commands`）
    #[serde(flatten)]
    pub checker: CheckerConfig,

    /// 打字机节奏
    #[serde(default)]
    pub typewriter: TypewriterConfig,
}

// 默认值函数
fn default_frame_interval_ms() -> u64 {
    16
}

fn default_debounce_ms() -> u64 {
    CONFIRM_DEBOUNCE.as_millis() as u64
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: default_frame_interval_ms(),
            debounce_ms: default_debounce_ms(),
            checker: CheckerConfig::default(),
            typewriter: TypewriterConfig::default(),
        }
    }
}

impl AppConfig {
    /// 加载配置文件
    ///
    /// 如果文件不存在或解析失败，返回默认配置并输出警告。
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            warn!(path = %path.display(), "配置文件不存在，使用默认配置");
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(config) => {
                    info!(path = %path.display(), "配置文件加载成功");
                    config
                }
                Err(e) => {
                    warn!(error = %e, "配置文件解析失败，使用默认配置");
                    Self::default()
                }
            },
            Err(e) => {
                warn!(error = %e, "配置文件读取失败，使用默认配置");
                Self::default()
            }
        }
    }

    /// 保存配置到文件
    pub fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self).context("配置序列化失败")?;
        fs::write(path, json).with_context(|| format!("写入配置失败: {}", path.display()))?;
        Ok(())
    }

    /// 验证配置有效性
    pub fn validate(&self) -> anyhow::Result<()> {
        if !is_command_name(&self.checker.page_break_marker) {
            bail!("翻页命令名无效: {:?}", self.checker.page_break_marker);
        }

        let known = &self.checker.known_commands;
        if let Some(name) = known.iter().find(|name| !is_command_name(name)) {
            bail!("命令名无效: {:?}", name);
        }

        if self.frame_interval_ms > 1000 {
            bail!("frame_interval_ms 不能超过 1000");
        }

        Ok(())
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// 选择打字机节奏
    ///
    /// 优先级：`--typewriter` 指定的 JSON > `--preset` > 配置文件
    pub fn resolve_typewriter(
        &self,
        preset: Option<TypewriterPreset>,
        json: Option<&str>,
    ) -> MsgResult<TypewriterConfig> {
        if let Some(json) = json {
            return Ok(TypewriterConfig::from_json(json)?);
        }
        Ok(preset.map_or_else(|| self.typewriter.clone(), TypewriterPreset::config))
    }
}

/// 与词法分析器的标识符规则一致：非空，只含字母和 `_`
fn is_command_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_alphabetic() || c == '_')
}
