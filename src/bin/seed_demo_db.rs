// ==========================================
// 演示库重建工具
// ==========================================
// 用法: seed_demo_db [db_path] [days]
// - db_path 缺省取 REPAIR_DASHBOARD_DB_PATH / 默认数据目录
// - days 缺省 400（覆盖一年以上，趋势图有完整 12 个月）
// 已存在的库文件先备份为 <db_path>.bak.<时间戳> 再删除
// ==========================================

use chrono::Local;
use std::error::Error;
use std::fs;
use std::path::Path;

use repair_dashboard::config::AppConfig;
use repair_dashboard::db::{ensure_schema, open_sqlite_connection};
use repair_dashboard::engine::clock_from_mode;
use repair_dashboard::seed::seed_demo_data;

const DEFAULT_DAYS: i64 = 400;

fn main() -> Result<(), Box<dyn Error>> {
    repair_dashboard::logging::init();

    let config = AppConfig::from_env()?;
    let db_path = std::env::args().nth(1).unwrap_or_else(|| config.db_path.clone());
    let days = std::env::args()
        .nth(2)
        .and_then(|s| s.parse::<i64>().ok())
        .unwrap_or(DEFAULT_DAYS)
        .max(1);

    if let Some(parent) = Path::new(&db_path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    backup_and_reset_db(&db_path)?;

    let mut conn = open_sqlite_connection(&db_path)?;
    ensure_schema(&conn)?;

    let today = clock_from_mode(config.clock_mode).today();
    let summary = seed_demo_data(&mut conn, today, days)?;

    println!("Seeded {} (through {}, {} days)", db_path, today, days);
    println!("  device_models:     {}", summary.models);
    println!("  service_centers:   {}", summary.services);
    println!("  part_types:        {}", summary.parts);
    println!("  repair_operations: {}", summary.repairs);
    println!("  customer_feedback: {}", summary.feedback);
    println!("  anomaly_log:       {}", summary.anomalies);

    Ok(())
}

fn backup_and_reset_db(db_path: &str) -> Result<(), Box<dyn Error>> {
    let path = Path::new(db_path);
    if !path.exists() {
        return Ok(());
    }

    let ts = Local::now().format("%Y%m%d_%H%M%S").to_string();
    let backup_path = format!("{}.bak.{}", db_path, ts);
    fs::copy(path, &backup_path)?;
    fs::remove_file(path)?;

    eprintln!("Backed up {} -> {}", db_path, backup_path);
    Ok(())
}
