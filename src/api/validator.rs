// ==========================================
// 维修门店分析驾驶舱 - 查询参数校验
// ==========================================
// 职责: 统一的数值参数默认值/范围校验
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::types::Severity;

/// 取值并校验范围 [1, max]；缺省时使用 default
///
/// # 参数
/// - field: 参数名（用于错误原因）
/// - value: 请求值
/// - default: 缺省值
/// - max: 上限（含）
pub fn resolve_positive(field: &str, value: Option<i64>, default: i64, max: i64) -> ApiResult<i64> {
    let value = value.unwrap_or(default);
    if value < 1 || value > max {
        return Err(ApiError::ValidationError(format!(
            "{} 必须在 1..={} 之间，实际为 {}",
            field, max, value
        )));
    }
    Ok(value)
}

/// 解析可选的严重度过滤条件（空串视为不过滤）
pub fn resolve_severity(raw: Option<&str>) -> ApiResult<Option<Severity>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => Ok(Some(s.parse::<Severity>()?)),
    }
}
