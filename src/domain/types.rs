// ==========================================
// 维修门店分析驾驶舱 - 领域类型定义
// ==========================================
// 职责: 异常严重度分级等枚举类型
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// 异常严重度 (Anomaly Severity)
// ==========================================
// 红线: CRITICAL/HIGH 级异常冻结所属维修记录，禁止修改
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Critical, // 致命
    High,     // 严重
    Medium,   // 一般
    Low,      // 轻微
}

impl Severity {
    /// 全部严重度（按等级从高到低）
    pub const ALL: [Severity; 4] = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
    ];

    /// 数据库存储值
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "CRITICAL",
            Severity::High => "HIGH",
            Severity::Medium => "MEDIUM",
            Severity::Low => "LOW",
        }
    }

    /// 是否属于"关键异常"（计入 KPI 且冻结维修记录）
    pub fn is_critical(&self) -> bool {
        matches!(self, Severity::Critical | Severity::High)
    }

    /// 排序用等级（数值越小越严重）
    pub fn rank(&self) -> u8 {
        match self {
            Severity::Critical => 0,
            Severity::High => 1,
            Severity::Medium => 2,
            Severity::Low => 3,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 严重度解析错误
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("未知的异常严重度: {0}（可选值: CRITICAL/HIGH/MEDIUM/LOW）")]
pub struct ParseSeverityError(pub String);

impl FromStr for Severity {
    type Err = ParseSeverityError;

    // 大小写不敏感，两端空白忽略
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "CRITICAL" => Ok(Severity::Critical),
            "HIGH" => Ok(Severity::High),
            "MEDIUM" => Ok(Severity::Medium),
            "LOW" => Ok(Severity::Low),
            _ => Err(ParseSeverityError(s.to_string())),
        }
    }
}
