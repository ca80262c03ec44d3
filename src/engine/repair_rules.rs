// ==========================================
// 维修门店分析驾驶舱 - 维修记录业务规则
// ==========================================
// 职责: 新建/修改/删除前的规则判定（纯函数，不做 IO）
// 规则:
// - 新建: 机型/网点/配件/日期必填；日期不得早于今天（禁止补录历史）
// - 修改: 挂有 CRITICAL/HIGH 异常的记录冻结，禁止修改
// - 删除: 已标记维修成功的记录禁止删除（保留审计历史）
// 红线: 所有规则必须输出 reason
// ==========================================

use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::repair::{MutationGuard, NewRepair, RepairDraft, RepairPatch};

/// 规则违反
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuleViolation {
    // ===== 输入校验 =====
    #[error("缺少必填字段: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("维修日期格式无效（应为 YYYY-MM-DD）: {0}")]
    InvalidDate(String),

    #[error("字段 {field} 不能为负数: {value}")]
    NegativeValue { field: &'static str, value: f64 },

    // ===== 业务规则 =====
    #[error("不能补录历史日期的维修记录: operation_date={operation_date}, today={today}")]
    BackdatedOperation {
        operation_date: NaiveDate,
        today: NaiveDate,
    },

    #[error("维修记录(id={0})挂有严重异常（CRITICAL/HIGH），禁止修改")]
    FrozenByAnomaly(i64),

    #[error("维修记录(id={0})已标记维修成功，禁止删除")]
    CompletedRepair(i64),
}

impl RuleViolation {
    /// 是否为输入校验类（其余为业务冲突类）
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            RuleViolation::MissingFields(_)
                | RuleViolation::InvalidDate(_)
                | RuleViolation::NegativeValue { .. }
        )
    }
}

// ==========================================
// 新建校验
// ==========================================

/// 校验新建请求
///
/// # 参数
/// - `draft`: 原始请求
/// - `today`: 参考"今天"（按日截断）
///
/// # 返回
/// - Ok(NewRepair): 通过校验的记录
/// - Err(RuleViolation): 第一条违反的规则（先校验必填，再校验日期）
pub fn validate_new_repair(draft: &RepairDraft, today: NaiveDate) -> Result<NewRepair, RuleViolation> {
    let mut missing = Vec::new();
    if draft.model_id.is_none() {
        missing.push("model_id");
    }
    if draft.service_id.is_none() {
        missing.push("service_id");
    }
    if draft.part_id.is_none() {
        missing.push("part_id");
    }
    let raw_date = draft
        .operation_date
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    if raw_date.is_none() {
        missing.push("operation_date");
    }

    let (Some(model_id), Some(service_id), Some(part_id), Some(raw_date)) =
        (draft.model_id, draft.service_id, draft.part_id, raw_date)
    else {
        return Err(RuleViolation::MissingFields(missing));
    };

    let operation_date = parse_operation_date(raw_date)?;

    if let Some(cost) = draft.service_cost {
        ensure_non_negative("service_cost", cost)?;
    }

    if operation_date < today {
        return Err(RuleViolation::BackdatedOperation {
            operation_date,
            today,
        });
    }

    Ok(NewRepair {
        model_id,
        service_id,
        part_id,
        operation_date,
        service_cost: draft.service_cost,
        if_repair_successful: draft.if_repair_successful.unwrap_or(false),
    })
}

/// 解析维修日期（接受 YYYY-MM-DD，或带时间部分的 ISO 格式并按日截断）
pub fn parse_operation_date(raw: &str) -> Result<NaiveDate, RuleViolation> {
    let raw = raw.trim();
    let date_part = raw
        .split(|c: char| c == 'T' || c == ' ')
        .next()
        .unwrap_or(raw);

    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|_| RuleViolation::InvalidDate(raw.to_string()))
}

// ==========================================
// 修改/删除判定
// ==========================================

/// 校验部分更新内容
pub fn validate_patch(patch: &RepairPatch) -> Result<(), RuleViolation> {
    if let Some(cost) = patch.service_cost {
        ensure_non_negative("service_cost", cost)?;
    }
    if let Some(minutes) = patch.service_time {
        ensure_non_negative("service_time", minutes as f64)?;
    }
    Ok(())
}

/// 修改前判定（记录存在时）
///
/// 返回 None 表示记录不存在，由调用方转换为 NotFound
pub fn check_update_allowed(id: i64, guard: MutationGuard) -> Option<Result<(), RuleViolation>> {
    match guard {
        MutationGuard::Missing => None,
        MutationGuard::Present { frozen: true, .. } => Some(Err(RuleViolation::FrozenByAnomaly(id))),
        MutationGuard::Present { .. } => Some(Ok(())),
    }
}

/// 删除前判定（记录存在时）
///
/// 返回 None 表示记录不存在，由调用方转换为 NotFound
pub fn check_delete_allowed(id: i64, guard: MutationGuard) -> Option<Result<(), RuleViolation>> {
    match guard {
        MutationGuard::Missing => None,
        MutationGuard::Present {
            successful: true, ..
        } => Some(Err(RuleViolation::CompletedRepair(id))),
        MutationGuard::Present { .. } => Some(Ok(())),
    }
}

fn ensure_non_negative(field: &'static str, value: f64) -> Result<(), RuleViolation> {
    if value < 0.0 || value.is_nan() {
        return Err(RuleViolation::NegativeValue { field, value });
    }
    Ok(())
}
