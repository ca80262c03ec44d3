// ==========================================
// 维修门店分析驾驶舱 - SQL 片段
// ==========================================
// 职责: 由 Severity 的等级定义生成 SQL 片段，SQL 中不再硬编码严重度取值
// 约束: 片段只含枚举常量，不拼接外部输入
// ==========================================

use crate::domain::types::Severity;

/// 关键异常严重度集合，形如 `('CRITICAL', 'HIGH')`
pub fn critical_severity_list() -> String {
    let values: Vec<String> = Severity::ALL
        .iter()
        .filter(|s| s.is_critical())
        .map(|s| format!("'{}'", s.as_str()))
        .collect();
    format!("({})", values.join(", "))
}

/// 严重度排序表达式（数值越小越严重），未知取值排在最后
pub fn severity_rank_case(column: &str) -> String {
    let arms: String = Severity::ALL
        .iter()
        .map(|s| format!(" WHEN '{}' THEN {}", s.as_str(), s.rank()))
        .collect();
    format!("CASE {}{} ELSE {} END", column, arms, Severity::ALL.len())
}
