//! # Clock
//!
//! 打字机读取时间的来源。核心逻辑只比较时间差，从不读取墙上时间。

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// 单调时钟
pub trait Clock {
    /// 从某个固定起点开始经过的时间
    fn now(&self) -> Duration;
}

/// 基于 [`Instant`] 的系统时钟
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// 手动推进的时钟
///
/// 克隆体共享同一时间，宿主可以在帧循环里用 `dt` 推进，测试也依赖它得到确定的结果。
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, dt: Duration) {
        self.now.set(self.now.get() + dt);
    }

    pub fn advance_millis(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }

    pub fn set(&self, now: Duration) {
        self.now.set(now);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}
