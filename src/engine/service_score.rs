// ==========================================
// 维修门店分析驾驶舱 - 服务网点绩效评分引擎
// ==========================================
// 职责: 归一化 + 加权三项子指标，输出综合评分排行
// 公式:
//   score = avg_rating × 20 × 0.40
//         + success_rate × 0.40
//         + (repair_count / max_volume) × 100 × 0.20
// 规则:
// - max_volume 取所有网点最大维修量，下限为 1（无数据时避免除零）
// - 评分保留 1 位小数
// - 按评分降序稳定排序（同分保持查询原始顺序）
// - 仅保留前 5 名，其余静默丢弃
// ==========================================

use crate::config::constants::{limits, performance_weights};
use crate::domain::analytics::{ServicePerformance, ServiceStat};
use crate::engine::kpi::round_to;

// ==========================================
// ServicePerformanceScorer
// ==========================================
pub struct ServicePerformanceScorer {
    top_n: usize,
}

impl ServicePerformanceScorer {
    pub fn new() -> Self {
        Self {
            top_n: limits::TOP_SERVICES,
        }
    }

    /// 计算评分并返回排行
    ///
    /// # 参数
    /// - `stats`: 网点原始统计（按数据层返回顺序）
    ///
    /// # 返回
    /// 按评分降序的前 N 名；输入为空时返回空列表
    pub fn rank(&self, stats: Vec<ServiceStat>) -> Vec<ServicePerformance> {
        let max_volume = stats
            .iter()
            .map(|s| s.repair_count)
            .max()
            .unwrap_or(0)
            .max(1);

        let mut scored: Vec<ServicePerformance> = stats
            .into_iter()
            .map(|stat| {
                let performance_score = score(&stat, max_volume);
                ServicePerformance {
                    service_name: stat.service_name,
                    city: stat.city,
                    repair_count: stat.repair_count,
                    success_rate: stat.success_rate,
                    avg_rating: stat.avg_rating,
                    performance_score,
                }
            })
            .collect();

        // sort_by 为稳定排序
        scored.sort_by(|a, b| b.performance_score.total_cmp(&a.performance_score));
        scored.truncate(self.top_n);

        tracing::debug!(
            max_volume,
            returned = scored.len(),
            "服务网点评分完成"
        );

        scored
    }
}

impl Default for ServicePerformanceScorer {
    fn default() -> Self {
        Self::new()
    }
}

/// 单个网点的综合评分（1 位小数）
pub fn score(stat: &ServiceStat, max_volume: i64) -> f64 {
    let max_volume = max_volume.max(1) as f64;

    let weighted_rating = stat.avg_rating
        * performance_weights::RATING_TO_PERCENT
        * performance_weights::CUSTOMER_RATING;
    let weighted_success = stat.success_rate * performance_weights::SUCCESS_RATE;
    let volume_score = (stat.repair_count as f64 / max_volume) * 100.0;
    let weighted_volume = volume_score * performance_weights::VOLUME;

    round_to(weighted_rating + weighted_success + weighted_volume, 1)
}
