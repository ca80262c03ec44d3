// ==========================================
// 维修门店分析驾驶舱 - 配置层
// ==========================================
// 职责: 进程级配置（环境变量）+ 业务常量
// ==========================================

pub mod app_config;
pub mod constants;

// 重导出
pub use app_config::{default_db_path, AppConfig, ClockMode, ConfigError};
