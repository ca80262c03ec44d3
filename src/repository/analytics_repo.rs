// ==========================================
// 维修门店分析驾驶舱 - 分析查询仓储
// ==========================================
// 职责: KPI/趋势/异常/网点/预测 的只读聚合查询
// 红线: Repository 不含业务逻辑（评分/环比/外推在 engine 层）
// 约束: 所有查询使用参数化; 日期以 YYYY-MM-DD 文本比较
// ==========================================

use async_trait::async_trait;
use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{params, params_from_iter, Connection};
use std::sync::Arc;

use crate::db::DbPool;
use crate::domain::analytics::{
    AnomalyRow, ModelMonthlyCount, MonthlyCount, PredictionBase, ServiceStat,
};
use crate::domain::types::Severity;
use crate::engine::period::{format_sql_date, Period};
use crate::repository::error::RepositoryResult;
use crate::repository::sql_builder::{critical_severity_list, severity_rank_case};

// ==========================================
// AnalyticsRepository Trait
// ==========================================
// 实现者: SqliteAnalyticsRepository（使用 rusqlite + DbPool）
#[async_trait]
pub trait AnalyticsRepository: Send + Sync {
    // ===== KPI =====

    /// 窗口内维修次数
    async fn repair_count(&self, period: Period) -> RepositoryResult<i64>;

    /// 窗口内平均评分（无评价时为 0）
    async fn avg_rating(&self, period: Period) -> RepositoryResult<f64>;

    /// 窗口内 CRITICAL/HIGH 异常数
    async fn critical_anomaly_count(&self, period: Period) -> RepositoryResult<i64>;

    /// 窗口内平均维修费用（无记录时为 0）
    async fn avg_cost(&self, period: Period) -> RepositoryResult<f64>;

    // ===== 趋势 =====

    /// since 起按月汇总的维修量（月份升序）
    async fn monthly_trend_total(&self, since: NaiveDate) -> RepositoryResult<Vec<MonthlyCount>>;

    /// since 起维修量最多的机型名称
    async fn top_models(&self, since: NaiveDate, limit: i64) -> RepositoryResult<Vec<String>>;

    /// 指定机型的月度分解（机型列表为空时返回空）
    async fn model_breakdown(
        &self,
        since: NaiveDate,
        model_names: Vec<String>,
    ) -> RepositoryResult<Vec<ModelMonthlyCount>>;

    // ===== 异常 / 网点 / 预测 =====

    /// 异常明细（日期降序，同日按严重度降序）
    async fn anomalies(
        &self,
        severity: Option<Severity>,
        limit: i64,
    ) -> RepositoryResult<Vec<AnomalyRow>>;

    /// 窗口内各网点原始统计（按网点主键顺序）
    async fn service_stats(&self, period: Period) -> RepositoryResult<Vec<ServiceStat>>;

    /// since 起 机型×配件 月均维修量（>= min_avg，降序，最多 limit 条）
    async fn prediction_base(
        &self,
        since: NaiveDate,
        min_avg: f64,
        limit: i64,
    ) -> RepositoryResult<Vec<PredictionBase>>;
}

// ==========================================
// SqliteAnalyticsRepository
// ==========================================
pub struct SqliteAnalyticsRepository {
    pool: Arc<DbPool>,
}

impl SqliteAnalyticsRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AnalyticsRepository for SqliteAnalyticsRepository {
    async fn repair_count(&self, period: Period) -> RepositoryResult<i64> {
        let (start, end) = period.to_sql_bounds();
        self.pool
            .run(move |conn| {
                let count = conn.query_row(
                    "SELECT COUNT(*) FROM repair_operations WHERE operation_date BETWEEN ?1 AND ?2",
                    params![start, end],
                    |row| row.get(0),
                )?;
                Ok(count)
            })
            .await
    }

    async fn avg_rating(&self, period: Period) -> RepositoryResult<f64> {
        let (start, end) = period.to_sql_bounds();
        self.pool
            .run(move |conn| {
                let avg: Option<f64> = conn.query_row(
                    "SELECT AVG(rating) FROM customer_feedback WHERE feedback_date BETWEEN ?1 AND ?2",
                    params![start, end],
                    |row| row.get(0),
                )?;
                Ok(avg.unwrap_or(0.0))
            })
            .await
    }

    async fn critical_anomaly_count(&self, period: Period) -> RepositoryResult<i64> {
        let (start, end) = period.to_sql_bounds();
        self.pool
            .run(move |conn| {
                let sql = format!(
                    r#"
                    SELECT COUNT(*)
                    FROM anomaly_log
                    WHERE severity IN {}
                      AND anomaly_date BETWEEN ?1 AND ?2
                    "#,
                    critical_severity_list()
                );
                let count = conn.query_row(
                    &sql,
                    params![start, end],
                    |row| row.get(0),
                )?;
                Ok(count)
            })
            .await
    }

    async fn avg_cost(&self, period: Period) -> RepositoryResult<f64> {
        let (start, end) = period.to_sql_bounds();
        self.pool
            .run(move |conn| {
                let avg: Option<f64> = conn.query_row(
                    "SELECT AVG(service_cost) FROM repair_operations WHERE operation_date BETWEEN ?1 AND ?2",
                    params![start, end],
                    |row| row.get(0),
                )?;
                Ok(avg.unwrap_or(0.0))
            })
            .await
    }

    async fn monthly_trend_total(&self, since: NaiveDate) -> RepositoryResult<Vec<MonthlyCount>> {
        let since = format_sql_date(since);
        self.pool
            .run(move |conn| {
                let mut stmt = conn.prepare(
                    r#"
                    SELECT strftime('%Y-%m', operation_date) AS month, COUNT(*) AS count
                    FROM repair_operations
                    WHERE operation_date >= ?1
                    GROUP BY month
                    ORDER BY month
                    "#,
                )?;
                let rows = stmt
                    .query_map(params![since], |row| {
                        Ok(MonthlyCount {
                            month: row.get(0)?,
                            count: row.get(1)?,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
    }

    async fn top_models(&self, since: NaiveDate, limit: i64) -> RepositoryResult<Vec<String>> {
        let since = format_sql_date(since);
        self.pool
            .run(move |conn| {
                let mut stmt = conn.prepare(
                    r#"
                    SELECT dm.model_name
                    FROM repair_operations ro
                    JOIN device_models dm ON ro.model_id = dm.model_id
                    WHERE ro.operation_date >= ?1
                    GROUP BY dm.model_id, dm.model_name
                    ORDER BY COUNT(ro.operation_id) DESC, dm.model_name
                    LIMIT ?2
                    "#,
                )?;
                let names = stmt
                    .query_map(params![since, limit], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(names)
            })
            .await
    }

    async fn model_breakdown(
        &self,
        since: NaiveDate,
        model_names: Vec<String>,
    ) -> RepositoryResult<Vec<ModelMonthlyCount>> {
        if model_names.is_empty() {
            return Ok(Vec::new());
        }

        let since = format_sql_date(since);
        self.pool
            .run(move |conn| {
                let placeholders = (0..model_names.len())
                    .map(|i| format!("?{}", i + 2))
                    .collect::<Vec<_>>()
                    .join(", ");
                let sql = format!(
                    r#"
                    SELECT strftime('%Y-%m', ro.operation_date) AS month,
                           dm.model_name,
                           COUNT(*) AS count
                    FROM repair_operations ro
                    JOIN device_models dm ON ro.model_id = dm.model_id
                    WHERE ro.operation_date >= ?1
                      AND dm.model_name IN ({})
                    GROUP BY month, dm.model_name
                    ORDER BY month, dm.model_name
                    "#,
                    placeholders
                );

                let mut bind: Vec<String> = Vec::with_capacity(model_names.len() + 1);
                bind.push(since);
                bind.extend(model_names);

                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt
                    .query_map(params_from_iter(bind.iter()), |row| {
                        Ok(ModelMonthlyCount {
                            month: row.get(0)?,
                            model_name: row.get(1)?,
                            count: row.get(2)?,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
    }

    async fn anomalies(
        &self,
        severity: Option<Severity>,
        limit: i64,
    ) -> RepositoryResult<Vec<AnomalyRow>> {
        self.pool
            .run(move |conn| query_anomalies(conn, severity, limit))
            .await
    }

    async fn service_stats(&self, period: Period) -> RepositoryResult<Vec<ServiceStat>> {
        let (start, end) = period.to_sql_bounds();
        self.pool
            .run(move |conn| {
                // 评价按反馈日期限定在窗口内，窗口内无评价的网点评分为 0
                let mut stmt = conn.prepare(
                    r#"
                    SELECT sc.service_name,
                           sc.city,
                           COUNT(DISTINCT ro.operation_id) AS repair_count,
                           ROUND(
                               COUNT(DISTINCT CASE WHEN ro.if_repair_successful = 1 THEN ro.operation_id END)
                                   * 100.0 / COUNT(DISTINCT ro.operation_id),
                               1
                           ) AS success_rate,
                           COALESCE(ROUND(AVG(cf.rating), 2), 0) AS avg_rating
                    FROM repair_operations ro
                    JOIN service_centers sc ON ro.service_id = sc.service_id
                    LEFT JOIN customer_feedback cf
                           ON ro.operation_id = cf.operation_id
                          AND cf.feedback_date BETWEEN ?1 AND ?2
                    WHERE ro.operation_date BETWEEN ?1 AND ?2
                    GROUP BY sc.service_id, sc.service_name, sc.city
                    ORDER BY sc.service_id
                    "#,
                )?;
                let rows = stmt
                    .query_map(params![start, end], |row| {
                        Ok(ServiceStat {
                            service_name: row.get(0)?,
                            city: row.get(1)?,
                            repair_count: row.get(2)?,
                            success_rate: row.get(3)?,
                            avg_rating: row.get(4)?,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
    }

    async fn prediction_base(
        &self,
        since: NaiveDate,
        min_avg: f64,
        limit: i64,
    ) -> RepositoryResult<Vec<PredictionBase>> {
        let since = format_sql_date(since);
        self.pool
            .run(move |conn| {
                let mut stmt = conn.prepare(
                    r#"
                    SELECT dm.model_name,
                           pt.part_name,
                           ROUND(COUNT(*) / 3.0, 0) AS avg_monthly_repairs
                    FROM repair_operations ro
                    JOIN device_models dm ON ro.model_id = dm.model_id
                    JOIN part_types pt ON ro.part_id = pt.part_id
                    WHERE ro.operation_date >= ?1
                    GROUP BY dm.model_name, pt.part_name
                    HAVING avg_monthly_repairs >= ?2
                    ORDER BY avg_monthly_repairs DESC, dm.model_name, pt.part_name
                    LIMIT ?3
                    "#,
                )?;
                let rows = stmt
                    .query_map(params![since, min_avg, limit], |row| {
                        Ok(PredictionBase {
                            model_name: row.get(0)?,
                            part_name: row.get(1)?,
                            avg_monthly_repairs: row.get(2)?,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
    }
}

fn query_anomalies(
    conn: &mut Connection,
    severity: Option<Severity>,
    limit: i64,
) -> RepositoryResult<Vec<AnomalyRow>> {
    let mut sql = String::from(
        r#"
        SELECT al.anomaly_id, al.anomaly_type, al.anomaly_date, al.severity,
               sc.service_name, dm.model_name
        FROM anomaly_log al
        JOIN repair_operations ro ON al.operation_id = ro.operation_id
        JOIN service_centers sc ON ro.service_id = sc.service_id
        JOIN device_models dm ON ro.model_id = dm.model_id
        "#,
    );
    let mut bind: Vec<rusqlite::types::Value> = Vec::new();

    if let Some(severity) = severity {
        sql.push_str(" WHERE al.severity = ?");
        bind.push(severity.as_str().to_string().into());
    }

    sql.push_str(&format!(
        r#"
        ORDER BY al.anomaly_date DESC,
                 {},
                 al.anomaly_id DESC
        LIMIT ?
        "#,
        severity_rank_case("al.severity")
    ));
    bind.push(limit.into());

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params_from_iter(bind.iter()), |row| {
            let raw_severity: String = row.get(3)?;
            let severity = raw_severity
                .parse::<Severity>()
                .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e)))?;
            Ok(AnomalyRow {
                anomaly_id: row.get(0)?,
                anomaly_type: row.get(1)?,
                anomaly_date: row.get(2)?,
                severity,
                service_name: row.get(4)?,
                model_name: row.get(5)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}
