// ==========================================
// 维修门店分析驾驶舱 - SQLite 连接与连接池
// ==========================================
// 目标:
// - 统一所有连接的 PRAGMA 行为（外键、busy_timeout）
// - 有界连接池：并发取用数受信号量限制，空闲连接复用
// - 查询在 blocking 线程池执行，不阻塞异步运行时
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::Semaphore;

use crate::repository::error::{RepositoryError, RepositoryResult};

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 建库脚本（幂等）
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS device_models (
    model_id INTEGER PRIMARY KEY AUTOINCREMENT,
    model_name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS service_centers (
    service_id INTEGER PRIMARY KEY AUTOINCREMENT,
    service_name TEXT NOT NULL,
    city TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS part_types (
    part_id INTEGER PRIMARY KEY AUTOINCREMENT,
    part_name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS repair_operations (
    operation_id INTEGER PRIMARY KEY AUTOINCREMENT,
    model_id INTEGER NOT NULL REFERENCES device_models(model_id),
    service_id INTEGER NOT NULL REFERENCES service_centers(service_id),
    part_id INTEGER NOT NULL REFERENCES part_types(part_id),
    operation_date TEXT NOT NULL,
    service_cost REAL,
    service_time INTEGER,
    if_repair_successful INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS customer_feedback (
    feedback_id INTEGER PRIMARY KEY AUTOINCREMENT,
    operation_id INTEGER NOT NULL REFERENCES repair_operations(operation_id) ON DELETE CASCADE,
    rating REAL NOT NULL CHECK (rating >= 0 AND rating <= 5),
    feedback_date TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS anomaly_log (
    anomaly_id INTEGER PRIMARY KEY AUTOINCREMENT,
    operation_id INTEGER NOT NULL REFERENCES repair_operations(operation_id) ON DELETE CASCADE,
    anomaly_type TEXT NOT NULL,
    anomaly_date TEXT NOT NULL,
    severity TEXT NOT NULL CHECK (severity IN ('CRITICAL', 'HIGH', 'MEDIUM', 'LOW'))
);

CREATE INDEX IF NOT EXISTS idx_repair_operation_date ON repair_operations(operation_date);
CREATE INDEX IF NOT EXISTS idx_feedback_date ON customer_feedback(feedback_date);
CREATE INDEX IF NOT EXISTS idx_feedback_operation ON customer_feedback(operation_id);
CREATE INDEX IF NOT EXISTS idx_anomaly_operation_severity ON anomaly_log(operation_id, severity);
CREATE INDEX IF NOT EXISTS idx_anomaly_date ON anomaly_log(anomaly_date);
"#;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要"每个连接"单独开启
/// - busy_timeout 需要"每个连接"单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let mut conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    crate::perf::install_sqlite_tracing(&mut conn);
    Ok(conn)
}

/// 建表并记录 schema_version（幂等）
pub fn ensure_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;
    Ok(())
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

// ==========================================
// DbPool - 有界连接池
// ==========================================
pub struct DbPool {
    db_path: String,
    size: usize,
    idle: Mutex<Vec<Connection>>,
    permits: Semaphore,
}

impl DbPool {
    /// 创建连接池（预先打开一条连接以尽早暴露路径/权限问题）
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    /// - size: 最大并发连接数（>= 1）
    pub fn new(db_path: &str, size: usize) -> RepositoryResult<Self> {
        let size = size.max(1);
        let first = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;

        tracing::info!(db_path, size, "数据库连接池已创建");

        Ok(Self {
            db_path: db_path.to_string(),
            size,
            idle: Mutex::new(vec![first]),
            permits: Semaphore::new(size),
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn db_path(&self) -> &str {
        &self.db_path
    }

    /// 取用一条连接在 blocking 线程池中执行操作
    ///
    /// 并发取用数不超过 size；操作完成后连接归还空闲队列
    pub async fn run<F, T>(&self, op: F) -> RepositoryResult<T>
    where
        F: FnOnce(&mut Connection) -> RepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;

        let conn = self.checkout()?;

        let (conn, result) = tokio::task::spawn_blocking(move || {
            let mut conn = conn;
            let result = op(&mut conn);
            (conn, result)
        })
        .await
        .map_err(|e| RepositoryError::InternalError(format!("数据库任务异常终止: {}", e)))?;

        self.checkin(conn);
        result
    }

    /// 建表（启动时调用）
    pub async fn ensure_schema(&self) -> RepositoryResult<()> {
        self.run(|conn| {
            ensure_schema(conn)?;
            Ok(())
        })
        .await
    }

    fn checkout(&self) -> RepositoryResult<Connection> {
        let reused = self
            .idle
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?
            .pop();

        match reused {
            Some(conn) => Ok(conn),
            None => open_sqlite_connection(&self.db_path)
                .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string())),
        }
    }

    fn checkin(&self, conn: Connection) {
        match self.idle.lock() {
            Ok(mut idle) if idle.len() < self.size => idle.push(conn),
            Ok(_) => {}
            Err(e) => tracing::warn!("连接归还失败，连接将被丢弃: {}", e),
        }
    }
}
