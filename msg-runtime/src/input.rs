//! # Input 模块
//!
//! 确认键的边沿检测与防抖。
//!
//! ## 设计说明
//!
//! - 宿主每帧把“确认键当前是否按下”交给 [`ConfirmEdge::poll`]
//! - 只在按下的那一刻（上升沿）返回 `true`，按住不放不会重复触发
//! - 两次触发之间至少间隔防抖时间，避免一次按键被读到两次
//! - `ConfirmEdge` 由宿主持有，并显式传给当前唯一的消费者，不使用全局状态

use std::time::Duration;

/// 输入防抖间隔
pub const CONFIRM_DEBOUNCE: Duration = Duration::from_millis(150);

/// 确认键边沿检测器
#[derive(Debug, Clone)]
pub struct ConfirmEdge {
    debounce: Duration,
    was_pressed: bool,
    last_fired: Option<Duration>,
}

impl ConfirmEdge {
    /// 使用默认防抖间隔创建
    pub fn new() -> Self {
        Self::with_debounce(CONFIRM_DEBOUNCE)
    }

    /// 使用自定义防抖间隔创建
    pub fn with_debounce(debounce: Duration) -> Self {
        Self {
            debounce,
            was_pressed: false,
            last_fired: None,
        }
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    /// 读取一次输入
    ///
    /// # 参数
    ///
    /// - `pressed`: 确认键此刻是否按下
    /// - `now`: 宿主时钟的当前时间
    ///
    /// # 返回
    ///
    /// 本次是否构成一次新的确认
    pub fn poll(&mut self, pressed: bool, now: Duration) -> bool {
        let rising = pressed && !self.was_pressed;
        self.was_pressed = pressed;
        if !rising {
            return false;
        }

        if let Some(last) = self.last_fired
            && now.saturating_sub(last) < self.debounce
        {
            return false;
        }
        self.last_fired = Some(now);
        true
    }

    /// 清除按键状态（切换消费者时调用）
    pub fn reset(&mut self) {
        self.was_pressed = false;
        self.last_fired = None;
    }
}

impl Default for ConfirmEdge {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_fires_once_per_press() {
        let mut edge = ConfirmEdge::new();
        assert!(edge.poll(true, ms(0)));
        // 按住不放
        assert!(!edge.poll(true, ms(16)));
        assert!(!edge.poll(true, ms(500)));
        // 松开
        assert!(!edge.poll(false, ms(516)));
        assert!(edge.poll(true, ms(532)));
    }

    #[test]
    fn test_debounce_swallows_fast_repress() {
        let mut edge = ConfirmEdge::new();
        assert!(edge.poll(true, ms(0)));
        assert!(!edge.poll(false, ms(16)));
        assert!(!edge.poll(true, ms(32)));
        assert!(!edge.poll(false, ms(48)));
        assert!(edge.poll(true, ms(200)));
    }

    #[test]
    fn test_no_fire_without_press() {
        let mut edge = ConfirmEdge::with_debounce(Duration::ZERO);
        assert!(!edge.poll(false, ms(0)));
        assert!(!edge.poll(false, ms(100)));
    }

    #[test]
    fn test_reset_forgets_held_key() {
        let mut edge = ConfirmEdge::with_debounce(Duration::ZERO);
        assert!(edge.poll(true, ms(0)));
        edge.reset();
        assert!(edge.poll(true, ms(1)));
    }
}
