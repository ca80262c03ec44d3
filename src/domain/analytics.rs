// ==========================================
// 维修门店分析驾驶舱 - 分析读模型
// ==========================================
// 职责: 数据访问层返回的查询行 + 引擎输出的派生对象
// 约束: 全部按请求实时计算，不落库、不缓存
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::types::Severity;

// ==========================================
// 查询行（仓储层输出）
// ==========================================

/// 月度维修量（月份格式 YYYY-MM）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyCount {
    pub month: String,
    pub count: i64,
}

/// 单机型月度维修量
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelMonthlyCount {
    pub month: String,
    pub model_name: String,
    pub count: i64,
}

/// 异常明细行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyRow {
    pub anomaly_id: i64,
    pub anomaly_type: String,
    pub anomaly_date: NaiveDate,
    pub severity: Severity,
    pub service_name: String,
    pub model_name: String,
}

/// 服务网点原始统计（评分输入）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceStat {
    pub service_name: String,
    pub city: String,
    pub repair_count: i64,
    /// 成功率（0-100，一位小数）
    pub success_rate: f64,
    /// 平均评分（0-5，无评价时为 0）
    pub avg_rating: f64,
}

/// 预测基数行：机型 × 配件的月均维修量
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionBase {
    pub model_name: String,
    pub part_name: String,
    pub avg_monthly_repairs: f64,
}

// ==========================================
// 派生对象（引擎输出）
// ==========================================

/// 计数型指标（当前值 + 环比百分比）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CountMetric {
    pub value: i64,
    /// 带符号百分比变化，保留 1 位小数
    pub change: f64,
}

/// 评分型指标（当前值 + 绝对差值）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingMetric {
    pub value: f64,
    pub change: f64,
}

/// 仅含当前值的金额指标（取整）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmountMetric {
    pub value: i64,
}

/// KPI 卡片汇总
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiSummary {
    pub total_repairs: CountMetric,
    pub customer_satisfaction: RatingMetric,
    pub critical_anomalies: CountMetric,
    pub avg_cost: AmountMetric,
}

/// 服务网点绩效（含综合评分）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServicePerformance {
    pub service_name: String,
    pub city: String,
    pub repair_count: i64,
    pub success_rate: f64,
    pub avg_rating: f64,
    pub performance_score: f64,
}

/// 单个机型×配件的季度预测
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRow {
    pub model_name: String,
    pub part_name: String,
    pub avg_monthly_repairs: f64,
    pub quarter1: i64,
    pub quarter2: i64,
    pub quarter3: i64,
    pub quarter4: i64,
    pub annual_total: i64,
}

/// 预测报告
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionReport {
    pub method: String,
    pub base_period: String,
    pub predictions: Vec<PredictionRow>,
}

/// 月度趋势（总量 + Top3 机型分解）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTrend {
    pub total: Vec<MonthlyCount>,
    pub by_model: Vec<ModelMonthlyCount>,
}

/// 异常列表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyReport {
    pub anomalies: Vec<AnomalyRow>,
    pub total_count: usize,
    /// 过滤条件（无过滤时为 "all"）
    pub severity_filter: String,
}

/// 维修记录列表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepairList {
    pub total: usize,
    pub data: Vec<crate::domain::repair::RepairSummary>,
}
