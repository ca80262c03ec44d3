// ==========================================
// 维修门店分析驾驶舱 - 统计周期解析
// ==========================================
// 职责: 由参考日期 + 天数推导统计窗口及上一对比窗口
// 规则:
// - 当前窗口: [end - days, end]（闭区间）
// - 上一窗口: [start - days - 1, start - 1]，与当前窗口等长、不重叠、紧邻
// - 对存储层统一输出 YYYY-MM-DD
// ==========================================

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 日期序列化格式
pub const SQL_DATE_FORMAT: &str = "%Y-%m-%d";

/// 周期参数错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("统计天数必须为正整数: {0}")]
pub struct InvalidWindow(pub i64);

// ==========================================
// Period - 闭区间日期窗口
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Period {
    /// 以 end 为终点、向前 days 天的窗口
    pub fn window(end: NaiveDate, days: i64) -> Result<Self, InvalidWindow> {
        if days <= 0 {
            return Err(InvalidWindow(days));
        }
        Ok(Self {
            start: end - Duration::days(days),
            end,
        })
    }

    /// 紧邻当前窗口之前的等长窗口
    pub fn previous(&self) -> Self {
        let days = self.span_days();
        let prev_end = self.start - Duration::days(1);
        Self {
            start: prev_end - Duration::days(days),
            end: prev_end,
        }
    }

    /// 窗口跨度（end - start，单位天）
    pub fn span_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// 闭区间包含的日历天数
    pub fn len_days(&self) -> i64 {
        self.span_days() + 1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    pub fn overlaps(&self, other: &Period) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// 存储层查询参数 (start, end)
    pub fn to_sql_bounds(&self) -> (String, String) {
        (format_sql_date(self.start), format_sql_date(self.end))
    }
}

/// 由窗口起点推导上一对比窗口
pub fn previous_window(start: NaiveDate, days: i64) -> Result<Period, InvalidWindow> {
    if days <= 0 {
        return Err(InvalidWindow(days));
    }
    let prev_end = start - Duration::days(1);
    Ok(Period {
        start: prev_end - Duration::days(days),
        end: prev_end,
    })
}

/// 由参考日期推导"当前 + 上一"窗口对
pub fn comparison_windows(today: NaiveDate, days: i64) -> Result<(Period, Period), InvalidWindow> {
    let current = Period::window(today, days)?;
    let previous = previous_window(current.start, days)?;
    Ok((current, previous))
}

/// 从某日往前推 days 天的起点（趋势/预测窗口使用）
pub fn since(today: NaiveDate, days: i64) -> NaiveDate {
    today - Duration::days(days)
}

pub fn format_sql_date(date: NaiveDate) -> String {
    date.format(SQL_DATE_FORMAT).to_string()
}
