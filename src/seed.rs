// ==========================================
// 维修门店分析驾驶舱 - 演示/测试数据写入
// ==========================================
// 职责: 主数据与业务数据的底层写入 + 确定性演示数据集
// 用途: seed_demo_db 二进制、仓储/接口测试
// 约束: 不依赖随机数，同一 today 生成的数据完全一致
// ==========================================

use chrono::{Duration, NaiveDate};
use rusqlite::{params, Connection};

use crate::domain::types::Severity;
use crate::engine::period::format_sql_date;

pub const DEMO_MODELS: [&str; 6] = [
    "iPhone 11",
    "iPhone 12",
    "iPhone 13",
    "iPhone 14",
    "iPhone 14 Pro",
    "iPhone 15",
];

pub const DEMO_SERVICES: [(&str, &str); 6] = [
    ("Kadikoy Teknik", "Istanbul"),
    ("Besiktas Servis", "Istanbul"),
    ("Cankaya Onarim", "Ankara"),
    ("Alsancak Teknik", "Izmir"),
    ("Nilufer Servis", "Bursa"),
    ("Muratpasa Onarim", "Antalya"),
];

pub const DEMO_PARTS: [&str; 6] = [
    "Screen",
    "Battery",
    "Camera",
    "Charging Port",
    "Back Glass",
    "Speaker",
];

const ANOMALY_TYPES: [&str; 4] = [
    "HIGH_COST",
    "REPEAT_REPAIR",
    "LONG_DURATION",
    "PART_SHORTAGE",
];

// 新机型与屏幕/电池维修占比更高
const MODEL_CYCLE: [usize; 9] = [5, 4, 3, 2, 5, 1, 3, 0, 4];
const PART_CYCLE: [usize; 8] = [0, 1, 0, 2, 1, 3, 4, 5];

const RATING_CYCLE: [f64; 10] = [5.0, 4.0, 5.0, 3.0, 4.0, 2.0, 5.0, 4.0, 1.0, 4.0];

/// 维修记录写入参数
#[derive(Debug, Clone)]
pub struct RepairSeed {
    pub model_id: i64,
    pub service_id: i64,
    pub part_id: i64,
    pub operation_date: NaiveDate,
    pub service_cost: Option<f64>,
    pub service_time: Option<i64>,
    pub successful: bool,
}

/// 演示数据写入统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub models: usize,
    pub services: usize,
    pub parts: usize,
    pub repairs: usize,
    pub feedback: usize,
    pub anomalies: usize,
}

pub fn insert_model(conn: &Connection, model_name: &str) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO device_models (model_name) VALUES (?1)",
        params![model_name],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn insert_service(conn: &Connection, service_name: &str, city: &str) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO service_centers (service_name, city) VALUES (?1, ?2)",
        params![service_name, city],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn insert_part(conn: &Connection, part_name: &str) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO part_types (part_name) VALUES (?1)",
        params![part_name],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn insert_repair(conn: &Connection, repair: &RepairSeed) -> rusqlite::Result<i64> {
    conn.execute(
        r#"
        INSERT INTO repair_operations (
            model_id, service_id, part_id, operation_date,
            service_cost, service_time, if_repair_successful
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
        params![
            repair.model_id,
            repair.service_id,
            repair.part_id,
            format_sql_date(repair.operation_date),
            repair.service_cost,
            repair.service_time,
            repair.successful,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn insert_feedback(
    conn: &Connection,
    operation_id: i64,
    rating: f64,
    feedback_date: NaiveDate,
) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO customer_feedback (operation_id, rating, feedback_date) VALUES (?1, ?2, ?3)",
        params![operation_id, rating, format_sql_date(feedback_date)],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn insert_anomaly(
    conn: &Connection,
    operation_id: i64,
    anomaly_type: &str,
    anomaly_date: NaiveDate,
    severity: Severity,
) -> rusqlite::Result<i64> {
    conn.execute(
        r#"
        INSERT INTO anomaly_log (operation_id, anomaly_type, anomaly_date, severity)
        VALUES (?1, ?2, ?3, ?4)
        "#,
        params![
            operation_id,
            anomaly_type,
            format_sql_date(anomaly_date),
            severity.as_str()
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// 写入确定性演示数据集（单事务）
///
/// # 参数
/// - today: 数据截止日期
/// - days: 向前覆盖的天数
pub fn seed_demo_data(conn: &mut Connection, today: NaiveDate, days: i64) -> rusqlite::Result<SeedSummary> {
    let tx = conn.transaction()?;
    let mut summary = SeedSummary::default();

    let mut model_ids = Vec::with_capacity(DEMO_MODELS.len());
    for name in DEMO_MODELS {
        model_ids.push(insert_model(&tx, name)?);
    }
    let mut service_ids = Vec::with_capacity(DEMO_SERVICES.len());
    for (name, city) in DEMO_SERVICES {
        service_ids.push(insert_service(&tx, name, city)?);
    }
    let mut part_ids = Vec::with_capacity(DEMO_PARTS.len());
    for name in DEMO_PARTS {
        part_ids.push(insert_part(&tx, name)?);
    }
    summary.models = model_ids.len();
    summary.services = service_ids.len();
    summary.parts = part_ids.len();

    for d in 0..days.max(0) as usize {
        let operation_date = today - Duration::days(d as i64);
        let per_day = 4 + (d * 7) % 5;

        for i in 0..per_day {
            let model_idx = MODEL_CYCLE[(d + i * 3) % MODEL_CYCLE.len()];
            let part_idx = PART_CYCLE[(d * 2 + i) % PART_CYCLE.len()];
            let service_idx = (d * 5 + i) % service_ids.len();

            let repair = RepairSeed {
                model_id: model_ids[model_idx],
                service_id: service_ids[service_idx],
                part_id: part_ids[part_idx],
                operation_date,
                service_cost: Some(1500.0 + ((d * 37 + i * 101) % 40) as f64 * 100.0),
                service_time: Some(30 + ((d + i) % 6) as i64 * 15),
                successful: (d + i + service_idx) % 7 != 0,
            };
            let operation_id = insert_repair(&tx, &repair)?;
            summary.repairs += 1;

            if (d + i) % 10 < 7 {
                let feedback_date = (operation_date + Duration::days(1)).min(today);
                let rating = RATING_CYCLE[(d + i * 7 + service_idx) % RATING_CYCLE.len()];
                insert_feedback(&tx, operation_id, rating, feedback_date)?;
                summary.feedback += 1;
            }

            if (d * 11 + i * 13) % 23 == 0 {
                let severity = Severity::ALL[(d + i) % Severity::ALL.len()];
                let anomaly_type = ANOMALY_TYPES[(d + i * 2) % ANOMALY_TYPES.len()];
                insert_anomaly(&tx, operation_id, anomaly_type, operation_date, severity)?;
                summary.anomalies += 1;
            }
        }
    }

    tx.commit()?;
    Ok(summary)
}
