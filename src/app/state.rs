// ==========================================
// 维修门店分析驾驶舱 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// 说明: 各 handler 通过 axum State 共享同一实例（Clone 仅复制 Arc）
// ==========================================

use std::sync::Arc;

use crate::api::{DashboardApi, RepairApi};
use crate::config::AppConfig;
use crate::db::DbPool;
use crate::engine::clock::{clock_from_mode, Clock};
use crate::repository::{RepositoryResult, SqliteAnalyticsRepository, SqliteRepairRepository};

/// 应用状态
#[derive(Clone)]
pub struct AppState {
    /// 驾驶舱API
    pub dashboard_api: Arc<DashboardApi>,

    /// 维修记录API
    pub repair_api: Arc<RepairApi>,

    /// 数据库连接池
    pub pool: Arc<DbPool>,
}

impl AppState {
    /// 按配置初始化（打开连接池、建表、组装 API）
    ///
    /// # 返回
    /// - Ok(AppState): 初始化成功
    /// - Err(RepositoryError): 数据库无法打开或建表失败
    pub async fn new(config: &AppConfig) -> RepositoryResult<Self> {
        tracing::info!(
            db_path = %config.db_path,
            pool_size = config.pool_size,
            clock = ?config.clock_mode,
            "初始化AppState"
        );

        let pool = Arc::new(DbPool::new(&config.db_path, config.pool_size)?);
        pool.ensure_schema().await?;

        Ok(Self::from_parts(pool, clock_from_mode(config.clock_mode)))
    }

    /// 由已建好的连接池与时钟组装（测试/嵌入使用）
    pub fn from_parts(pool: Arc<DbPool>, clock: Arc<dyn Clock>) -> Self {
        let analytics_repo = Arc::new(SqliteAnalyticsRepository::new(pool.clone()));
        let repair_repo = Arc::new(SqliteRepairRepository::new(pool.clone()));

        Self {
            dashboard_api: Arc::new(DashboardApi::new(analytics_repo, clock.clone())),
            repair_api: Arc::new(RepairApi::new(repair_repo, clock)),
            pool,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClockMode;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_app_state_new_建表() {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("state.db").to_string_lossy().to_string();
        let config = AppConfig {
            db_path: db_path.clone(),
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            pool_size: 2,
            clock_mode: ClockMode::Simulated(NaiveDate::from_ymd_opt(2025, 1, 18).unwrap()),
            locale: "zh-CN".to_string(),
        };

        let state = AppState::new(&config).await.unwrap();
        assert_eq!(state.pool.size(), 2);
        assert_eq!(state.pool.db_path(), db_path);

        let list = state.repair_api.list(None).await.unwrap();
        assert_eq!(list.total, 0);
    }
}
