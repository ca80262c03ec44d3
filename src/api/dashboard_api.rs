// ==========================================
// 维修门店分析驾驶舱 - 驾驶舱 API
// ==========================================
// 职责: KPI / 月度趋势 / 异常列表 / 网点绩效 / 季度预测
// 架构: API 层 → AnalyticsRepository（取数）→ Engine（派生计算）
// 约束: 全部按请求实时计算; 多查询聚合任一失败则整体失败
// ==========================================

use std::sync::Arc;

use crate::api::error::ApiResult;
use crate::api::validator::{resolve_positive, resolve_severity};
use crate::config::constants::{limits, periods};
use crate::domain::analytics::{
    AnomalyReport, KpiSummary, MonthlyTrend, PredictionReport, ServicePerformance,
};
use crate::engine::clock::Clock;
use crate::engine::kpi::{KpiAggregator, KpiRawValues};
use crate::engine::period::{comparison_windows, since, Period};
use crate::engine::prediction::PredictionProjector;
use crate::engine::service_score::ServicePerformanceScorer;
use crate::perf::PerfGuard;
use crate::repository::analytics_repo::AnalyticsRepository;

// ==========================================
// DashboardApi - 驾驶舱 API
// ==========================================
pub struct DashboardApi {
    repo: Arc<dyn AnalyticsRepository>,
    clock: Arc<dyn Clock>,
    kpi_aggregator: KpiAggregator,
    scorer: ServicePerformanceScorer,
    projector: PredictionProjector,
}

impl DashboardApi {
    /// 创建新的DashboardApi实例
    ///
    /// # 参数
    /// - repo: 分析查询仓储
    /// - clock: 参考时钟（决定"今天"）
    pub fn new(repo: Arc<dyn AnalyticsRepository>, clock: Arc<dyn Clock>) -> Self {
        Self {
            repo,
            clock,
            kpi_aggregator: KpiAggregator::new(),
            scorer: ServicePerformanceScorer::new(),
            projector: PredictionProjector::new(),
        }
    }

    /// KPI 卡片
    ///
    /// # 参数
    /// - period: 统计天数（缺省 30，范围 1..=3650）
    ///
    /// # 返回
    /// - Ok(KpiSummary): 当前窗口与紧邻上一窗口对比
    /// - Err(ApiError): 参数无效，或任一查询失败（无部分结果）
    pub async fn get_kpi(&self, period: Option<i64>) -> ApiResult<KpiSummary> {
        let _perf = PerfGuard::new("get_kpi");
        let days = resolve_positive("period", period, periods::KPI_DAYS, periods::MAX_PERIOD_DAYS)?;
        let (current, previous) = comparison_windows(self.clock.today(), days)?;

        let repo = &self.repo;
        let (
            current_repairs,
            previous_repairs,
            current_rating,
            previous_rating,
            current_critical,
            previous_critical,
            current_avg_cost,
        ) = futures::try_join!(
            repo.repair_count(current),
            repo.repair_count(previous),
            repo.avg_rating(current),
            repo.avg_rating(previous),
            repo.critical_anomaly_count(current),
            repo.critical_anomaly_count(previous),
            repo.avg_cost(current),
        )?;

        let raw = KpiRawValues {
            current_repairs,
            previous_repairs,
            current_rating,
            previous_rating,
            current_critical,
            previous_critical,
            current_avg_cost,
        };

        tracing::debug!(
            days,
            current_start = %current.start,
            previous_start = %previous.start,
            "KPI 原始指标已获取"
        );

        Ok(self.kpi_aggregator.summarize(&raw))
    }

    /// 月度趋势（总量 + Top3 机型分解）
    ///
    /// # 参数
    /// - months: 回看月数（缺省 12，范围 1..=60，按每月 30 天折算）
    pub async fn get_monthly_trend(&self, months: Option<i64>) -> ApiResult<MonthlyTrend> {
        let _perf = PerfGuard::new("get_monthly_trend");
        let months = resolve_positive(
            "months",
            months,
            periods::TREND_MONTHS,
            periods::MAX_TREND_MONTHS,
        )?;
        let start = since(self.clock.today(), months * periods::DAYS_PER_MONTH);

        let (total, top_models) = futures::try_join!(
            self.repo.monthly_trend_total(start),
            self.repo.top_models(start, limits::TREND_TOP_MODELS),
        )?;
        let by_model = self.repo.model_breakdown(start, top_models).await?;

        Ok(MonthlyTrend { total, by_model })
    }

    /// 异常列表
    ///
    /// # 参数
    /// - severity: 可选严重度过滤（大小写不敏感）
    /// - limit: 返回条数（缺省 20，范围 1..=500）
    pub async fn get_anomalies(
        &self,
        severity: Option<&str>,
        limit: Option<i64>,
    ) -> ApiResult<AnomalyReport> {
        let severity = resolve_severity(severity)?;
        let limit = resolve_positive("limit", limit, limits::ANOMALIES, limits::MAX_LIST)?;

        let anomalies = self.repo.anomalies(severity, limit).await?;

        Ok(AnomalyReport {
            total_count: anomalies.len(),
            severity_filter: severity
                .map(|s| s.as_str().to_string())
                .unwrap_or_else(|| "all".to_string()),
            anomalies,
        })
    }

    /// 服务网点绩效排行（前 5 名）
    ///
    /// # 参数
    /// - period: 统计天数（缺省 30，范围 1..=3650）
    pub async fn get_service_performance(
        &self,
        period: Option<i64>,
    ) -> ApiResult<Vec<ServicePerformance>> {
        let _perf = PerfGuard::new("get_service_performance");
        let days = resolve_positive("period", period, periods::KPI_DAYS, periods::MAX_PERIOD_DAYS)?;
        let window = Period::window(self.clock.today(), days)?;

        let stats = self.repo.service_stats(window).await?;
        Ok(self.scorer.rank(stats))
    }

    /// 未来四个季度的配件需求预测（基于近 90 天）
    pub async fn get_predictions(&self) -> ApiResult<PredictionReport> {
        let _perf = PerfGuard::new("get_predictions");
        let start = since(self.clock.today(), periods::PREDICTION_DAYS);

        let base = self
            .repo
            .prediction_base(start, limits::PREDICTION_MIN_MONTHLY, limits::TOP_PREDICTIONS)
            .await?;
        Ok(self.projector.project(base))
    }
}
