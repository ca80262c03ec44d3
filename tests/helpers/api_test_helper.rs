// ==========================================
// API集成测试辅助工具
// ==========================================
// 职责: 临时数据库 + 固定时钟 + 小型确定性数据集
// 参考日期: 2025-01-18
// - 当前窗口(30天): 2024-12-19 ~ 2025-01-18
// - 上一窗口:       2024-11-18 ~ 2024-12-18
// ==========================================
#![allow(dead_code)]

use chrono::NaiveDate;
use std::sync::Arc;
use tempfile::NamedTempFile;

use repair_dashboard::db::{open_sqlite_connection, DbPool};
use repair_dashboard::domain::types::Severity;
use repair_dashboard::engine::clock::FixedClock;
use repair_dashboard::seed::{
    insert_anomaly, insert_feedback, insert_model, insert_part, insert_repair, insert_service,
    RepairSeed,
};
use repair_dashboard::AppState;

pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

pub fn today() -> NaiveDate {
    d(2025, 1, 18)
}

/// 主数据 ID
#[derive(Debug, Clone, Copy)]
pub struct FixtureIds {
    pub iphone13: i64,
    pub iphone15: i64,
    pub kadikoy: i64,
    pub cankaya: i64,
    pub screen: i64,
    pub battery: i64,
}

/// 维修记录 ID
///
/// - r1: iPhone 13 / Kadikoy / Screen,  2025-01-10, 2000, 成功, 评分 5
/// - r2: iPhone 15 / Kadikoy / Battery, 2025-01-15, 1000, 未成功, 评分 4, CRITICAL 异常
/// - r3: iPhone 13 / Cankaya / Screen,  2025-01-18, 3000, 成功, 无评价
/// - r4: iPhone 13 / Cankaya / Screen,  2024-12-01, 1500, 成功, 评分 3, LOW 异常
/// - r5: iPhone 15 / Kadikoy / Battery, 2024-12-10, 500,  未成功
#[derive(Debug, Clone, Copy)]
pub struct FixtureRepairs {
    pub r1: i64,
    pub r2: i64,
    pub r3: i64,
    pub r4: i64,
    pub r5: i64,
}

/// API测试环境
pub struct ApiTestEnv {
    pub db_path: String,
    pub state: AppState,
    pub ids: FixtureIds,

    // 临时文件（确保生命周期）
    _temp_file: NamedTempFile,
}

impl ApiTestEnv {
    /// 空库（仅主数据）
    pub async fn new() -> Self {
        let temp_file = NamedTempFile::new().unwrap();
        let db_path = temp_file.path().to_str().unwrap().to_string();

        let pool = Arc::new(DbPool::new(&db_path, 4).unwrap());
        pool.ensure_schema().await.unwrap();

        let conn = open_sqlite_connection(&db_path).unwrap();
        let ids = FixtureIds {
            iphone13: insert_model(&conn, "iPhone 13").unwrap(),
            iphone15: insert_model(&conn, "iPhone 15").unwrap(),
            kadikoy: insert_service(&conn, "Kadikoy Teknik", "Istanbul").unwrap(),
            cankaya: insert_service(&conn, "Cankaya Onarim", "Ankara").unwrap(),
            screen: insert_part(&conn, "Screen").unwrap(),
            battery: insert_part(&conn, "Battery").unwrap(),
        };

        let state = AppState::from_parts(pool, Arc::new(FixedClock::new(today())));

        Self {
            db_path,
            state,
            ids,
            _temp_file: temp_file,
        }
    }

    /// 带标准数据集
    pub async fn with_fixture() -> (Self, FixtureRepairs) {
        let env = Self::new().await;
        let repairs = env.insert_fixture();
        (env, repairs)
    }

    pub fn conn(&self) -> rusqlite::Connection {
        open_sqlite_connection(&self.db_path).unwrap()
    }

    pub fn repair(
        &self,
        model_id: i64,
        service_id: i64,
        part_id: i64,
        date: NaiveDate,
        cost: f64,
        successful: bool,
    ) -> i64 {
        insert_repair(
            &self.conn(),
            &RepairSeed {
                model_id,
                service_id,
                part_id,
                operation_date: date,
                service_cost: Some(cost),
                service_time: Some(60),
                successful,
            },
        )
        .unwrap()
    }

    fn insert_fixture(&self) -> FixtureRepairs {
        let ids = self.ids;
        let r1 = self.repair(ids.iphone13, ids.kadikoy, ids.screen, d(2025, 1, 10), 2000.0, true);
        let r2 = self.repair(ids.iphone15, ids.kadikoy, ids.battery, d(2025, 1, 15), 1000.0, false);
        let r3 = self.repair(ids.iphone13, ids.cankaya, ids.screen, d(2025, 1, 18), 3000.0, true);
        let r4 = self.repair(ids.iphone13, ids.cankaya, ids.screen, d(2024, 12, 1), 1500.0, true);
        let r5 = self.repair(ids.iphone15, ids.kadikoy, ids.battery, d(2024, 12, 10), 500.0, false);

        let conn = self.conn();
        insert_feedback(&conn, r1, 5.0, d(2025, 1, 11)).unwrap();
        insert_feedback(&conn, r2, 4.0, d(2025, 1, 16)).unwrap();
        insert_feedback(&conn, r4, 3.0, d(2024, 12, 2)).unwrap();

        insert_anomaly(&conn, r2, "HIGH_COST", d(2025, 1, 15), Severity::Critical).unwrap();
        insert_anomaly(&conn, r4, "REPEAT_REPAIR", d(2024, 12, 1), Severity::Low).unwrap();

        FixtureRepairs { r1, r2, r3, r4, r5 }
    }
}
