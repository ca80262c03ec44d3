// ==========================================
// 维修门店分析驾驶舱 - HTTP 错误响应
// ==========================================
// 职责: ApiError -> HTTP 状态码 + {status:"error", message}
// 规则:
// - 输入/规则类错误原样透出原因（400）
// - NotFound: 直接查询 404，修改/删除 400
// - 依赖故障: 记录 error 日志，对外返回端点对应的本地化通用消息（500）
// ==========================================

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::api::ApiError;
use crate::i18n::{t, t_with_args};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpError {
    pub status: StatusCode,
    pub message: String,
}

impl HttpError {
    /// 查询类端点的错误映射
    ///
    /// # 参数
    /// - err: API 层错误
    /// - fallback_key: 依赖故障时使用的 i18n 消息 key
    pub fn from_api(err: ApiError, fallback_key: &str) -> Self {
        Self::map(err, fallback_key, StatusCode::NOT_FOUND)
    }

    /// 修改/删除端点的错误映射（记录不存在按 400 处理）
    pub fn from_mutation(err: ApiError, fallback_key: &str) -> Self {
        Self::map(err, fallback_key, StatusCode::BAD_REQUEST)
    }

    /// 请求体/查询串/路径参数解析失败
    pub fn bad_request(reason: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: t_with_args("errors.invalid_request", &[("reason", reason)]),
        }
    }

    fn map(err: ApiError, fallback_key: &str, not_found_status: StatusCode) -> Self {
        if err.is_dependency_failure() {
            error!(error = %err, fallback = fallback_key, "依赖故障");
            return Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: t(fallback_key),
            };
        }

        match err {
            ApiError::NotFound(msg) => Self {
                status: not_found_status,
                message: msg,
            },
            ApiError::ValidationError(msg)
            | ApiError::BusinessRuleViolation(msg)
            | ApiError::ModificationFailed(msg) => Self {
                status: StatusCode::BAD_REQUEST,
                message: msg,
            },
            // 依赖故障已在上方处理
            other => Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: other.to_string(),
            },
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(json!({
                "status": "error",
                "message": self.message,
            })),
        )
            .into_response()
    }
}
