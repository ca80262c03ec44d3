// ==========================================
// 维修门店分析驾驶舱 - 核心库
// ==========================================
// 技术栈: axum + Rust + SQLite
// 系统定位: 维修运营分析（KPI/趋势/异常/网点绩效/配件预测）+ 维修记录维护
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "zh-CN");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 派生指标与业务规则
pub mod engine;

// 配置层 - 环境配置与业务常量
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA/建表/连接池）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// SQL 性能追踪
pub mod perf;

// 演示数据
pub mod seed;

// API 层 - 业务接口
pub mod api;

// 应用层 - HTTP 接入
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

pub use domain::types::Severity;

pub use api::{ApiError, ApiResult, DashboardApi, RepairApi};

pub use app::{build_router, AppState};

pub use config::AppConfig;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称（健康检查 module 字段）
pub const APP_NAME: &str = "repair-dashboard";
