// ==========================================
// 维修门店分析驾驶舱 - 领域模型层
// ==========================================
// 职责: 定义领域实体、查询行类型、派生读模型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod analytics;
pub mod repair;
pub mod types;

// 重导出核心类型
pub use analytics::{
    AmountMetric, AnomalyReport, AnomalyRow, CountMetric, KpiSummary, ModelMonthlyCount,
    MonthlyCount, MonthlyTrend, PredictionBase, PredictionReport, PredictionRow, RatingMetric,
    RepairList, ServicePerformance, ServiceStat,
};
pub use repair::{
    MutationGuard, NewRepair, RepairDetail, RepairDraft, RepairPatch, RepairSummary,
};
pub use types::{ParseSeverityError, Severity};
