// ==========================================
// 维修门店分析驾驶舱 - 业务常量
// ==========================================
// 说明: 评分权重、增长系数、默认周期/条数均为固定常量，不支持按请求调整
// ==========================================

use chrono::NaiveDate;

/// 模拟时钟的默认"今天"
pub const DEFAULT_SIMULATION_DATE: &str = "2025-01-18";

/// 返回默认模拟日期
pub fn default_simulation_date() -> NaiveDate {
    // 常量字面量，格式固定
    NaiveDate::from_ymd_opt(2025, 1, 18).unwrap_or_default()
}

// ==========================================
// 默认分析周期（天）
// ==========================================
pub mod periods {
    /// KPI / 服务评分默认周期
    pub const KPI_DAYS: i64 = 30;
    /// 预测基数窗口
    pub const PREDICTION_DAYS: i64 = 90;
    /// 周期参数上限
    pub const MAX_PERIOD_DAYS: i64 = 3650;
    /// 趋势默认月数
    pub const TREND_MONTHS: i64 = 12;
    /// 趋势月数上限
    pub const MAX_TREND_MONTHS: i64 = 60;
    /// 趋势窗口按每月 30 天折算
    pub const DAYS_PER_MONTH: i64 = 30;
}

// ==========================================
// 服务网点绩效评分权重
// ==========================================
pub mod performance_weights {
    /// 客户评分权重 40%
    pub const CUSTOMER_RATING: f64 = 0.40;
    /// 维修成功率权重 40%
    pub const SUCCESS_RATE: f64 = 0.40;
    /// 归一化业务量权重 20%
    pub const VOLUME: f64 = 0.20;
    /// 5 分制评分换算为百分制的系数
    pub const RATING_TO_PERCENT: f64 = 20.0;
}

// ==========================================
// 季度预测增长系数
// ==========================================
pub mod growth_rates {
    pub const Q1: f64 = 1.05;
    pub const Q2: f64 = 1.10;
    pub const Q3: f64 = 1.15;
    pub const Q4: f64 = 1.20;

    pub const QUARTERS: [f64; 4] = [Q1, Q2, Q3, Q4];
}

// ==========================================
// 默认条数限制
// ==========================================
pub mod limits {
    /// 异常列表默认条数
    pub const ANOMALIES: i64 = 20;
    /// 服务网点排行保留条数
    pub const TOP_SERVICES: usize = 5;
    /// 预测行数上限
    pub const TOP_PREDICTIONS: i64 = 15;
    /// 预测入选门槛（月均维修量）
    pub const PREDICTION_MIN_MONTHLY: f64 = 5.0;
    /// 趋势分解的机型数
    pub const TREND_TOP_MODELS: i64 = 3;
    /// 维修记录列表默认条数
    pub const REPAIRS: i64 = 50;
    /// 列表类接口的条数上限
    pub const MAX_LIST: i64 = 500;
}

// ==========================================
// 预测报告元信息
// ==========================================
pub const PREDICTION_METHOD: &str = "quarterly_trend_projection";
pub const PREDICTION_BASE_PERIOD: &str = "90_days";
