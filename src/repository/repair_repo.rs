// ==========================================
// 维修门店分析驾驶舱 - 维修记录仓储
// ==========================================
// 职责: repair_operations 表的 CRUD
// 红线: Repository 不含业务逻辑
// 并发: 修改/删除的守卫条件写在同一条语句的 WHERE 中，
//       影响行数为 0 时由调用方重读守卫状态判定原因
// ==========================================

use async_trait::async_trait;
use rusqlite::{params, OptionalExtension, Row};
use std::sync::Arc;

use crate::db::DbPool;
use crate::domain::repair::{MutationGuard, NewRepair, RepairDetail, RepairPatch, RepairSummary};
use crate::engine::period::format_sql_date;
use crate::repository::error::RepositoryResult;
use crate::repository::sql_builder::critical_severity_list;

// ==========================================
// RepairRepository Trait
// ==========================================
#[async_trait]
pub trait RepairRepository: Send + Sync {
    /// 新建记录，返回 operation_id
    async fn insert(&self, repair: NewRepair) -> RepositoryResult<i64>;

    /// 按主键查询（含机型/网点/配件名称）
    async fn find_by_id(&self, operation_id: i64) -> RepositoryResult<Option<RepairDetail>>;

    /// 最近记录（operation_date 降序，同日按 id 降序）
    async fn list_recent(&self, limit: i64) -> RepositoryResult<Vec<RepairSummary>>;

    /// 修改/删除守卫状态（一次查询）
    async fn mutation_guard(&self, operation_id: i64) -> RepositoryResult<MutationGuard>;

    /// 仅当记录未挂 CRITICAL/HIGH 异常时更新，返回影响行数
    ///
    /// patch 中为 None 的字段保持原值
    async fn update_unfrozen(&self, operation_id: i64, patch: RepairPatch) -> RepositoryResult<usize>;

    /// 仅当记录未标记维修成功时删除，返回影响行数
    async fn delete_unsuccessful(&self, operation_id: i64) -> RepositoryResult<usize>;
}

// ==========================================
// SqliteRepairRepository
// ==========================================
pub struct SqliteRepairRepository {
    pool: Arc<DbPool>,
}

impl SqliteRepairRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

const DETAIL_SELECT: &str = r#"
    SELECT ro.operation_id, ro.model_id, ro.service_id, ro.part_id,
           ro.operation_date, ro.service_cost, ro.service_time, ro.if_repair_successful,
           dm.model_name, sc.service_name, pt.part_name
    FROM repair_operations ro
    JOIN device_models dm ON ro.model_id = dm.model_id
    JOIN service_centers sc ON ro.service_id = sc.service_id
    JOIN part_types pt ON ro.part_id = pt.part_id
"#;

fn map_detail(row: &Row<'_>) -> rusqlite::Result<RepairDetail> {
    Ok(RepairDetail {
        operation_id: row.get(0)?,
        model_id: row.get(1)?,
        service_id: row.get(2)?,
        part_id: row.get(3)?,
        operation_date: row.get(4)?,
        service_cost: row.get(5)?,
        service_time: row.get(6)?,
        if_repair_successful: row.get(7)?,
        model_name: row.get(8)?,
        service_name: row.get(9)?,
        part_name: row.get(10)?,
    })
}

#[async_trait]
impl RepairRepository for SqliteRepairRepository {
    async fn insert(&self, repair: NewRepair) -> RepositoryResult<i64> {
        self.pool
            .run(move |conn| {
                conn.execute(
                    r#"
                    INSERT INTO repair_operations (
                        model_id, service_id, part_id, operation_date,
                        service_cost, if_repair_successful
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                    "#,
                    params![
                        repair.model_id,
                        repair.service_id,
                        repair.part_id,
                        format_sql_date(repair.operation_date),
                        repair.service_cost,
                        repair.if_repair_successful,
                    ],
                )?;
                Ok(conn.last_insert_rowid())
            })
            .await
    }

    async fn find_by_id(&self, operation_id: i64) -> RepositoryResult<Option<RepairDetail>> {
        self.pool
            .run(move |conn| {
                let sql = format!("{} WHERE ro.operation_id = ?1", DETAIL_SELECT);
                let detail = conn
                    .query_row(&sql, params![operation_id], map_detail)
                    .optional()?;
                Ok(detail)
            })
            .await
    }

    async fn list_recent(&self, limit: i64) -> RepositoryResult<Vec<RepairSummary>> {
        self.pool
            .run(move |conn| {
                let mut stmt = conn.prepare(
                    r#"
                    SELECT ro.operation_id, ro.operation_date, ro.service_cost,
                           ro.if_repair_successful,
                           dm.model_name, sc.service_name, pt.part_name
                    FROM repair_operations ro
                    JOIN device_models dm ON ro.model_id = dm.model_id
                    JOIN service_centers sc ON ro.service_id = sc.service_id
                    JOIN part_types pt ON ro.part_id = pt.part_id
                    ORDER BY ro.operation_date DESC, ro.operation_id DESC
                    LIMIT ?1
                    "#,
                )?;
                let rows = stmt
                    .query_map(params![limit], |row| {
                        Ok(RepairSummary {
                            operation_id: row.get(0)?,
                            operation_date: row.get(1)?,
                            service_cost: row.get(2)?,
                            if_repair_successful: row.get(3)?,
                            model_name: row.get(4)?,
                            service_name: row.get(5)?,
                            part_name: row.get(6)?,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
    }

    async fn mutation_guard(&self, operation_id: i64) -> RepositoryResult<MutationGuard> {
        self.pool
            .run(move |conn| {
                let sql = format!(
                    r#"
                    SELECT ro.if_repair_successful,
                           EXISTS (
                               SELECT 1 FROM anomaly_log al
                               WHERE al.operation_id = ro.operation_id
                                 AND al.severity IN {}
                           )
                    FROM repair_operations ro
                    WHERE ro.operation_id = ?1
                    "#,
                    critical_severity_list()
                );
                let state: Option<(bool, bool)> = conn
                    .query_row(
                        &sql,
                        params![operation_id],
                        |row| Ok((row.get(0)?, row.get(1)?)),
                    )
                    .optional()?;

                Ok(match state {
                    None => MutationGuard::Missing,
                    Some((successful, frozen)) => MutationGuard::Present { successful, frozen },
                })
            })
            .await
    }

    async fn update_unfrozen(&self, operation_id: i64, patch: RepairPatch) -> RepositoryResult<usize> {
        self.pool
            .run(move |conn| {
                let sql = format!(
                    r#"
                    UPDATE repair_operations
                    SET if_repair_successful = COALESCE(?2, if_repair_successful),
                        service_cost = COALESCE(?3, service_cost),
                        service_time = COALESCE(?4, service_time)
                    WHERE operation_id = ?1
                      AND NOT EXISTS (
                          SELECT 1 FROM anomaly_log
                          WHERE operation_id = ?1
                            AND severity IN {}
                      )
                    "#,
                    critical_severity_list()
                );
                let affected = conn.execute(
                    &sql,
                    params![
                        operation_id,
                        patch.if_repair_successful,
                        patch.service_cost,
                        patch.service_time,
                    ],
                )?;
                Ok(affected)
            })
            .await
    }

    async fn delete_unsuccessful(&self, operation_id: i64) -> RepositoryResult<usize> {
        self.pool
            .run(move |conn| {
                let affected = conn.execute(
                    "DELETE FROM repair_operations WHERE operation_id = ?1 AND if_repair_successful = 0",
                    params![operation_id],
                )?;
                Ok(affected)
            })
            .await
    }
}
