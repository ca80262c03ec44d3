// ==========================================
// 维修门店分析驾驶舱 - API 层
// ==========================================
// 职责: 提供业务 API 接口,供 HTTP 路由调用
// ==========================================

pub mod dashboard_api;
pub mod error;
pub mod repair_api;
pub mod validator;

// 重导出核心类型
pub use dashboard_api::DashboardApi;
pub use error::{ApiError, ApiResult};
pub use repair_api::RepairApi;
