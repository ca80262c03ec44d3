// ==========================================
// 维修门店分析驾驶舱 - 参考时钟
// ==========================================
// 职责: 提供"今天"的参考日期（按日截断）
// 约束: 时钟模式在启动时确定一次，以能力对象注入，不使用全局可变状态
// ==========================================

use chrono::NaiveDate;
use std::sync::Arc;

use crate::config::ClockMode;

/// 参考时钟
pub trait Clock: Send + Sync {
    /// 当前参考日期
    fn today(&self) -> NaiveDate;
}

// ==========================================
// FixedClock - 固定日期（模拟模式/测试）
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    date: NaiveDate,
}

impl FixedClock {
    pub fn new(date: NaiveDate) -> Self {
        Self { date }
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.date
    }
}

// ==========================================
// SystemClock - 本地当前日期
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}

/// 按配置的时钟模式构造时钟
pub fn clock_from_mode(mode: ClockMode) -> Arc<dyn Clock> {
    match mode {
        ClockMode::Simulated(date) => Arc::new(FixedClock::new(date)),
        ClockMode::Real => Arc::new(SystemClock),
    }
}
