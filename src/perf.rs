// ==========================================
// 性能观测: 慢 SQL 日志 + 操作耗时
// ==========================================
// 开关:
// - Debug 默认开启；Release 默认关闭
// - `REPAIR_DASHBOARD_PERF_SQL=1` 强制开启
// - `REPAIR_DASHBOARD_SLOW_SQL_MS=50` 配置慢 SQL 阈值（毫秒）
// 说明: 查询在 blocking 线程池执行，计数器为进程级原子量
// ==========================================

use rusqlite::Connection;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

pub const PERF_SQL_ENV: &str = "REPAIR_DASHBOARD_PERF_SQL";
pub const SLOW_SQL_MS_ENV: &str = "REPAIR_DASHBOARD_SLOW_SQL_MS";

static PERF_SQL_ENABLED: AtomicBool = AtomicBool::new(false);
static SLOW_SQL_THRESHOLD_MS: AtomicU64 = AtomicU64::new(0);
static SQL_COUNT: AtomicU64 = AtomicU64::new(0);
static SLOW_SQL_COUNT: AtomicU64 = AtomicU64::new(0);

fn is_true(v: &str) -> bool {
    matches!(
        v.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "y" | "on"
    )
}

fn truncate_sql(sql: &str, max_len: usize) -> String {
    let s = sql.split_whitespace().collect::<Vec<_>>().join(" ");
    if s.chars().count() <= max_len {
        return s;
    }
    let head: String = s.chars().take(max_len).collect();
    format!("{}…", head)
}

/// 慢 SQL 阈值（毫秒）
pub fn slow_sql_threshold_ms(raw: Option<&str>) -> u64 {
    raw.and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(if cfg!(debug_assertions) { 50 } else { 200 })
}

/// 安装 SQLite 语句 profile（SQL 计数 + 慢查询日志）
pub fn install_sqlite_tracing(conn: &mut Connection) {
    let enabled = match std::env::var(PERF_SQL_ENV) {
        Ok(v) => is_true(&v),
        Err(_) => cfg!(debug_assertions),
    };

    PERF_SQL_ENABLED.store(enabled, Ordering::Relaxed);

    if !enabled {
        conn.profile(None);
        return;
    }

    let slow_ms = slow_sql_threshold_ms(std::env::var(SLOW_SQL_MS_ENV).ok().as_deref());
    SLOW_SQL_THRESHOLD_MS.store(slow_ms, Ordering::Relaxed);

    conn.profile(Some(sql_profile_callback));
}

fn sql_profile_callback(sql: &str, duration: Duration) {
    if !PERF_SQL_ENABLED.load(Ordering::Relaxed) {
        return;
    }
    SQL_COUNT.fetch_add(1, Ordering::Relaxed);

    let ms = duration.as_millis() as u64;
    let threshold = SLOW_SQL_THRESHOLD_MS.load(Ordering::Relaxed);
    if threshold > 0 && ms >= threshold {
        SLOW_SQL_COUNT.fetch_add(1, Ordering::Relaxed);
        tracing::warn!(
            target: "slow_sql",
            duration_ms = ms,
            sql = %truncate_sql(sql, 420),
            "slow sql"
        );
    }
}

/// 操作耗时 Guard：drop 时记录 elapsed_ms 与期间的 SQL 语句数
///
/// 并发请求下 SQL 计数为近似值
pub struct PerfGuard {
    op: &'static str,
    start: Instant,
    sql_start: u64,
    slow_sql_start: u64,
}

impl PerfGuard {
    pub fn new(op: &'static str) -> Self {
        Self {
            op,
            start: Instant::now(),
            sql_start: SQL_COUNT.load(Ordering::Relaxed),
            slow_sql_start: SLOW_SQL_COUNT.load(Ordering::Relaxed),
        }
    }
}

impl Drop for PerfGuard {
    fn drop(&mut self) {
        let elapsed_ms = self.start.elapsed().as_millis() as u64;
        let sql_count = SQL_COUNT
            .load(Ordering::Relaxed)
            .saturating_sub(self.sql_start);
        let slow_sql_count = SLOW_SQL_COUNT
            .load(Ordering::Relaxed)
            .saturating_sub(self.slow_sql_start);

        tracing::debug!(
            target: "perf",
            op = self.op,
            elapsed_ms,
            sql_count,
            slow_sql_count,
            "done"
        );
    }
}
