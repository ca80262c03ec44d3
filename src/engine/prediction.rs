// ==========================================
// 维修门店分析驾驶舱 - 季度预测引擎
// ==========================================
// 职责: 以近 90 天月均维修量外推未来四个季度的配件需求
// 方法: 固定线性增长系数（非拟合模型）
//   base_quarterly = avg_monthly × 3
//   Qn = round(base_quarterly × {1.05, 1.10, 1.15, 1.20})
//   annual_total = Q1 + Q2 + Q3 + Q4（取整后求和，不用 base × 4.5）
// ==========================================

use crate::config::constants::{growth_rates, PREDICTION_BASE_PERIOD, PREDICTION_METHOD};
use crate::domain::analytics::{PredictionBase, PredictionReport, PredictionRow};

const MONTHS_PER_QUARTER: f64 = 3.0;

// ==========================================
// PredictionProjector
// ==========================================
pub struct PredictionProjector {
    // 无状态引擎
}

impl PredictionProjector {
    pub fn new() -> Self {
        Self {}
    }

    /// 生成预测报告（保持输入行顺序）
    pub fn project(&self, rows: Vec<PredictionBase>) -> PredictionReport {
        let predictions = rows.into_iter().map(project_row).collect();

        PredictionReport {
            method: PREDICTION_METHOD.to_string(),
            base_period: PREDICTION_BASE_PERIOD.to_string(),
            predictions,
        }
    }
}

impl Default for PredictionProjector {
    fn default() -> Self {
        Self::new()
    }
}

/// 四个季度的预测值（各自独立取整）
pub fn quarterly_projection(avg_monthly_repairs: f64) -> [i64; 4] {
    let base_quarterly = avg_monthly_repairs * MONTHS_PER_QUARTER;
    growth_rates::QUARTERS.map(|rate| (base_quarterly * rate).round() as i64)
}

fn project_row(base: PredictionBase) -> PredictionRow {
    let [quarter1, quarter2, quarter3, quarter4] = quarterly_projection(base.avg_monthly_repairs);

    PredictionRow {
        model_name: base.model_name,
        part_name: base.part_name,
        avg_monthly_repairs: base.avg_monthly_repairs,
        quarter1,
        quarter2,
        quarter3,
        quarter4,
        annual_total: quarter1 + quarter2 + quarter3 + quarter4,
    }
}
