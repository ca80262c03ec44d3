// ==========================================
// 维修门店分析驾驶舱 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换Repository/规则错误为用户可读的错误消息
// 约束: 所有规则类错误必须包含显式原因
// ==========================================

use crate::domain::types::ParseSeverityError;
use crate::engine::period::InvalidWindow;
use crate::engine::repair_rules::RuleViolation;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 输入与业务规则错误
    // ==========================================
    #[error("数据验证失败: {0}")]
    ValidationError(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("业务规则违反: {0}")]
    BusinessRuleViolation(String),

    /// 记录存在且未被守卫拦截，但写入影响行数为 0
    #[error("修改未生效: {0}")]
    ModificationFailed(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),
}

impl ApiError {
    /// 依赖故障（数据库/内部），对外只暴露通用消息
    pub fn is_dependency_failure(&self) -> bool {
        matches!(
            self,
            ApiError::DatabaseError(_)
                | ApiError::DatabaseConnectionError(_)
                | ApiError::InternalError(_)
        )
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::DatabaseConnectionError(msg) => ApiError::DatabaseConnectionError(msg),
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::ValidationError(format!("引用的机型/网点/配件不存在: {}", msg))
            }
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
        }
    }
}

// ==========================================
// 从规则层错误转换
// ==========================================
impl From<RuleViolation> for ApiError {
    fn from(err: RuleViolation) -> Self {
        if err.is_validation() {
            ApiError::ValidationError(err.to_string())
        } else {
            ApiError::BusinessRuleViolation(err.to_string())
        }
    }
}

impl From<InvalidWindow> for ApiError {
    fn from(err: InvalidWindow) -> Self {
        ApiError::ValidationError(err.to_string())
    }
}

impl From<ParseSeverityError> for ApiError {
    fn from(err: ParseSeverityError) -> Self {
        ApiError::ValidationError(err.to_string())
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_repository_error_conversion() {
        let api_err: ApiError = RepositoryError::not_found("RepairOperation", 42).into();
        match api_err {
            ApiError::NotFound(msg) => {
                assert!(msg.contains("RepairOperation"));
                assert!(msg.contains("42"));
            }
            other => panic!("Expected NotFound, got {:?}", other),
        }

        let api_err: ApiError = RepositoryError::DatabaseQueryError("disk I/O".to_string()).into();
        assert!(matches!(api_err, ApiError::DatabaseError(_)));
        assert!(api_err.is_dependency_failure());

        let api_err: ApiError = RepositoryError::LockError("poisoned".to_string()).into();
        assert!(matches!(api_err, ApiError::DatabaseConnectionError(_)));

        let api_err: ApiError =
            RepositoryError::ForeignKeyViolation("FOREIGN KEY constraint failed".to_string()).into();
        assert!(matches!(api_err, ApiError::ValidationError(_)));
        assert!(!api_err.is_dependency_failure());
    }

    #[test]
    fn test_rule_violation_conversion() {
        let api_err: ApiError = RuleViolation::MissingFields(vec!["model_id"]).into();
        assert!(matches!(api_err, ApiError::ValidationError(_)));

        let api_err: ApiError = RuleViolation::BackdatedOperation {
            operation_date: NaiveDate::from_ymd_opt(2025, 1, 17).unwrap(),
            today: NaiveDate::from_ymd_opt(2025, 1, 18).unwrap(),
        }
        .into();
        match api_err {
            ApiError::BusinessRuleViolation(msg) => assert!(msg.contains("2025-01-17")),
            other => panic!("Expected BusinessRuleViolation, got {:?}", other),
        }

        let api_err: ApiError = RuleViolation::FrozenByAnomaly(7).into();
        assert!(matches!(api_err, ApiError::BusinessRuleViolation(_)));
    }

    #[test]
    fn test_invalid_window_conversion() {
        let api_err: ApiError = InvalidWindow(0).into();
        assert!(matches!(api_err, ApiError::ValidationError(_)));
    }
}
