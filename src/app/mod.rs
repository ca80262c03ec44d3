// ==========================================
// 维修门店分析驾驶舱 - 应用层
// ==========================================
// 职责: HTTP 接入（axum），连接前端与 API 层
// ==========================================

pub mod request_id;
pub mod response;
pub mod routes;
pub mod state;

// 重导出
pub use routes::build_router;
pub use state::AppState;
