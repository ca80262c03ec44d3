// ==========================================
// 维修门店分析驾驶舱 - 进程级配置
// ==========================================
// 来源: 环境变量（启动时读取一次，运行期不再变更）
// 测试: from_lookup 接受任意取值函数，避免依赖真实环境
// ==========================================

use chrono::NaiveDate;
use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

use crate::config::constants::default_simulation_date;

pub mod env_keys {
    pub const DB_PATH: &str = "REPAIR_DASHBOARD_DB_PATH";
    pub const BIND: &str = "REPAIR_DASHBOARD_BIND";
    pub const PORT: &str = "PORT";
    pub const POOL_SIZE: &str = "REPAIR_DASHBOARD_POOL_SIZE";
    pub const CLOCK: &str = "REPAIR_DASHBOARD_CLOCK";
    pub const SIMULATION_DATE: &str = "REPAIR_DASHBOARD_SIMULATION_DATE";
    pub const LOCALE: &str = "REPAIR_DASHBOARD_LOCALE";
}

/// 默认连接池大小
pub const DEFAULT_POOL_SIZE: usize = 10;
/// 默认监听地址
pub const DEFAULT_BIND: &str = "127.0.0.1:3000";
/// 默认语言
pub const DEFAULT_LOCALE: &str = "zh-CN";
/// 支持的语言
pub const SUPPORTED_LOCALES: [&str; 2] = ["zh-CN", "en"];

/// 配置错误
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("配置项 {key} 取值无效: {value} ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

// ==========================================
// ClockMode - 时钟模式
// ==========================================
// 进程级单一取值：模拟固定日期 / 真实当前日期
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockMode {
    Simulated(NaiveDate),
    Real,
}

// ==========================================
// AppConfig
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub db_path: String,
    pub bind_addr: SocketAddr,
    pub pool_size: usize,
    pub clock_mode: ClockMode,
    pub locale: String,
}

impl AppConfig {
    /// 从进程环境变量加载
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意取值函数加载（空白值视同未设置）
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let db_path = get(env_keys::DB_PATH).unwrap_or_else(default_db_path);

        let bind_addr = match (get(env_keys::BIND), get(env_keys::PORT)) {
            (Some(bind), _) => parse_socket_addr(env_keys::BIND, &bind)?,
            (None, Some(port)) => {
                let port: u16 = port.parse().map_err(|_| ConfigError::InvalidValue {
                    key: env_keys::PORT,
                    value: port.clone(),
                    reason: "端口必须是 0-65535 的整数".to_string(),
                })?;
                SocketAddr::from(([127, 0, 0, 1], port))
            }
            (None, None) => parse_socket_addr(env_keys::BIND, DEFAULT_BIND)?,
        };

        let pool_size = match get(env_keys::POOL_SIZE) {
            Some(raw) => match raw.parse::<usize>() {
                Ok(n) if n >= 1 => n,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: env_keys::POOL_SIZE,
                        value: raw,
                        reason: "连接池大小必须是 >= 1 的整数".to_string(),
                    })
                }
            },
            None => DEFAULT_POOL_SIZE,
        };

        let simulation_date = match get(env_keys::SIMULATION_DATE) {
            Some(raw) => NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|e| {
                ConfigError::InvalidValue {
                    key: env_keys::SIMULATION_DATE,
                    value: raw.clone(),
                    reason: e.to_string(),
                }
            })?,
            None => default_simulation_date(),
        };

        let clock_mode = match get(env_keys::CLOCK).map(|v| v.to_lowercase()) {
            None => ClockMode::Simulated(simulation_date),
            Some(mode) if mode == "simulated" => ClockMode::Simulated(simulation_date),
            Some(mode) if mode == "real" => ClockMode::Real,
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    key: env_keys::CLOCK,
                    value: other,
                    reason: "可选值: simulated / real".to_string(),
                })
            }
        };

        let locale = get(env_keys::LOCALE).unwrap_or_else(|| DEFAULT_LOCALE.to_string());
        if !SUPPORTED_LOCALES.contains(&locale.as_str()) {
            return Err(ConfigError::InvalidValue {
                key: env_keys::LOCALE,
                value: locale,
                reason: format!("可选值: {}", SUPPORTED_LOCALES.join(" / ")),
            });
        }

        Ok(Self {
            db_path,
            bind_addr,
            pool_size,
            clock_mode,
            locale,
        })
    }
}

fn parse_socket_addr(key: &'static str, raw: &str) -> Result<SocketAddr, ConfigError> {
    raw.parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: raw.to_string(),
        reason: "格式应为 host:port".to_string(),
    })
}

// ==========================================
// 默认数据库路径
// ==========================================

/// 获取默认数据库路径
///
/// # 返回
/// - 用户数据目录/repair-dashboard/repair_dashboard.db
/// - 无法获取数据目录时回退到 ./repair_dashboard.db
pub fn default_db_path() -> String {
    let mut path = PathBuf::from("./repair_dashboard.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("repair-dashboard");
        // best-effort: 目录创建失败时仍使用当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("repair_dashboard.db");
        }
    }

    path.to_string_lossy().to_string()
}
