// ==========================================
// 维修门店分析驾驶舱 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod analytics_repo;
pub mod error;
pub mod repair_repo;
pub mod sql_builder;

// 重导出核心仓储
pub use analytics_repo::{AnalyticsRepository, SqliteAnalyticsRepository};
pub use error::{RepositoryError, RepositoryResult};
pub use repair_repo::{RepairRepository, SqliteRepairRepository};
