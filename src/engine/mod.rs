// ==========================================
// 维修门店分析驾驶舱 - 引擎层
// ==========================================
// 职责: 派生指标计算与业务规则判定
// 红线: Engine 不拼 SQL, 所有规则必须输出 reason
// ==========================================

pub mod clock;
pub mod kpi;
pub mod period;
pub mod prediction;
pub mod repair_rules;
pub mod service_score;

// 重导出核心引擎
pub use clock::{clock_from_mode, Clock, FixedClock, SystemClock};
pub use kpi::{calculate_change, KpiAggregator, KpiRawValues};
pub use period::{comparison_windows, previous_window, InvalidWindow, Period};
pub use prediction::PredictionProjector;
pub use repair_rules::RuleViolation;
pub use service_score::ServicePerformanceScorer;
