// ==========================================
// 维修门店分析驾驶舱 - KPI 聚合引擎
// ==========================================
// 职责: 由当前/上一窗口的原始指标生成 KPI 卡片
// 输入: KpiRawValues（数据访问层并发取得）
// 输出: KpiSummary
// 红线: 引擎不拼 SQL，不做 IO
// ==========================================

use crate::domain::analytics::{AmountMetric, CountMetric, KpiSummary, RatingMetric};

/// 单个窗口对的原始取值
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct KpiRawValues {
    pub current_repairs: i64,
    pub previous_repairs: i64,
    pub current_rating: f64,
    pub previous_rating: f64,
    pub current_critical: i64,
    pub previous_critical: i64,
    /// 仅当前窗口
    pub current_avg_cost: f64,
}

// ==========================================
// KpiAggregator
// ==========================================
pub struct KpiAggregator {
    // 无状态引擎
}

impl KpiAggregator {
    pub fn new() -> Self {
        Self {}
    }

    /// 生成 KPI 汇总
    ///
    /// - 计数型: 带符号百分比变化（上期为 0 时变化记为 0）
    /// - 评分型: 当前值与绝对差值均保留 2 位小数
    /// - 金额型: 仅当前值，四舍五入取整
    pub fn summarize(&self, raw: &KpiRawValues) -> KpiSummary {
        KpiSummary {
            total_repairs: CountMetric {
                value: raw.current_repairs,
                change: calculate_change(raw.previous_repairs as f64, raw.current_repairs as f64),
            },
            customer_satisfaction: RatingMetric {
                value: round_to(raw.current_rating, 2),
                change: round_to(raw.current_rating - raw.previous_rating, 2),
            },
            critical_anomalies: CountMetric {
                value: raw.current_critical,
                change: calculate_change(
                    raw.previous_critical as f64,
                    raw.current_critical as f64,
                ),
            },
            avg_cost: AmountMetric {
                value: raw.current_avg_cost.round() as i64,
            },
        }
    }
}

impl Default for KpiAggregator {
    fn default() -> Self {
        Self::new()
    }
}

/// 环比百分比变化，保留 1 位小数
///
/// 上期为 0 时返回 0（策略取值，而非"无变化"的含义），保证结果不会是 NaN/Infinity。
pub fn calculate_change(previous: f64, current: f64) -> f64 {
    if previous == 0.0 {
        return 0.0;
    }
    round_to((current - previous) / previous * 100.0, 1)
}

/// 按小数位四舍五入（远离零）
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
