// ==========================================
// 维修门店分析驾驶舱 - HTTP 路由
// ==========================================
// 职责: 路由注册 + handler（参数提取 -> 调用 API -> 响应信封）
// 信封: 成功 {status:"success", ...}，失败 {status:"error", message}
// 说明: 请求体/查询串/路径参数解析失败统一按 400 返回同一信封
// ==========================================

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::app::request_id::{request_id_middleware, RequestIdExt};
use crate::app::response::HttpError;
use crate::app::state::AppState;
use crate::domain::repair::{RepairDraft, RepairPatch};
use crate::i18n::t;

type HttpResult = Result<Response, HttpError>;

// ==========================================
// 查询参数
// ==========================================

#[derive(Debug, Default, Deserialize)]
pub struct PeriodQuery {
    pub period: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TrendQuery {
    pub months: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AnomalyQuery {
    pub severity: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<i64>,
}

// ==========================================
// 路由
// ==========================================

/// 构建完整路由（含 CORS、请求追踪、请求 ID）
pub fn build_router(state: AppState) -> Router {
    let trace = TraceLayer::new_for_http().make_span_with(|request: &axum::extract::Request| {
        tracing::info_span!(
            "http_request",
            method = %request.method(),
            uri = %request.uri(),
            request_id = %request.extensions().request_id(),
        )
    });

    Router::new()
        .route("/health", get(health))
        .route("/api/kpi", get(get_kpi))
        .route("/api/monthly-trend", get(get_monthly_trend))
        .route("/api/anomalies", get(get_anomalies))
        .route("/api/services", get(get_services))
        .route("/api/predictions", get(get_predictions))
        .route("/api/repairs", get(list_repairs).post(create_repair))
        .route(
            "/api/repairs/:id",
            get(get_repair).put(update_repair).delete(delete_repair),
        )
        .with_state(state)
        .layer(trace)
        // 请求 ID 位于 TraceLayer 外层
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
}

// ==========================================
// 提取辅助
// ==========================================

fn query_or_400<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, HttpError> {
    query
        .map(|Query(q)| q)
        .map_err(|rejection| HttpError::bad_request(&rejection.body_text()))
}

fn path_or_400(path: Result<Path<i64>, PathRejection>) -> Result<i64, HttpError> {
    path.map(|Path(id)| id)
        .map_err(|rejection| HttpError::bad_request(&rejection.body_text()))
}

fn json_or_400<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, HttpError> {
    body.map(|Json(b)| b)
        .map_err(|rejection| HttpError::bad_request(&rejection.body_text()))
}

fn success<T: serde::Serialize>(data: T) -> Response {
    Json(json!({ "status": "success", "data": data })).into_response()
}

// ==========================================
// Handlers - 健康检查
// ==========================================

async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "module": crate::APP_NAME,
        "version": crate::VERSION,
    }))
}

// ==========================================
// Handlers - 驾驶舱
// ==========================================

async fn get_kpi(
    State(state): State<AppState>,
    query: Result<Query<PeriodQuery>, QueryRejection>,
) -> HttpResult {
    let query = query_or_400(query)?;
    let kpi = state
        .dashboard_api
        .get_kpi(query.period)
        .await
        .map_err(|e| HttpError::from_api(e, "errors.kpi_unavailable"))?;
    Ok(success(kpi))
}

async fn get_monthly_trend(
    State(state): State<AppState>,
    query: Result<Query<TrendQuery>, QueryRejection>,
) -> HttpResult {
    let query = query_or_400(query)?;
    let trend = state
        .dashboard_api
        .get_monthly_trend(query.months)
        .await
        .map_err(|e| HttpError::from_api(e, "errors.trend_unavailable"))?;
    Ok(success(trend))
}

async fn get_anomalies(
    State(state): State<AppState>,
    query: Result<Query<AnomalyQuery>, QueryRejection>,
) -> HttpResult {
    let query = query_or_400(query)?;
    let report = state
        .dashboard_api
        .get_anomalies(query.severity.as_deref(), query.limit)
        .await
        .map_err(|e| HttpError::from_api(e, "errors.anomalies_unavailable"))?;
    Ok(success(report))
}

async fn get_services(
    State(state): State<AppState>,
    query: Result<Query<PeriodQuery>, QueryRejection>,
) -> HttpResult {
    let query = query_or_400(query)?;
    let services = state
        .dashboard_api
        .get_service_performance(query.period)
        .await
        .map_err(|e| HttpError::from_api(e, "errors.services_unavailable"))?;
    Ok(success(services))
}

async fn get_predictions(State(state): State<AppState>) -> HttpResult {
    let report = state
        .dashboard_api
        .get_predictions()
        .await
        .map_err(|e| HttpError::from_api(e, "errors.predictions_unavailable"))?;

    Ok(Json(json!({
        "status": "success",
        "method": report.method,
        "base_period": report.base_period,
        "data": report.predictions,
    }))
    .into_response())
}

// ==========================================
// Handlers - 维修记录
// ==========================================

async fn list_repairs(
    State(state): State<AppState>,
    query: Result<Query<LimitQuery>, QueryRejection>,
) -> HttpResult {
    let query = query_or_400(query)?;
    let list = state
        .repair_api
        .list(query.limit)
        .await
        .map_err(|e| HttpError::from_api(e, "errors.repairs_unavailable"))?;

    Ok(Json(json!({
        "status": "success",
        "total": list.total,
        "data": list.data,
    }))
    .into_response())
}

async fn get_repair(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> HttpResult {
    let id = path_or_400(id)?;
    let detail = state
        .repair_api
        .get(id)
        .await
        .map_err(|e| HttpError::from_api(e, "errors.repairs_unavailable"))?;
    Ok(success(detail))
}

async fn create_repair(
    State(state): State<AppState>,
    body: Result<Json<RepairDraft>, JsonRejection>,
) -> HttpResult {
    let draft = json_or_400(body)?;
    let operation_id = state
        .repair_api
        .create(draft)
        .await
        .map_err(|e| HttpError::from_mutation(e, "errors.repair_write_failed"))?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": "success",
            "operation_id": operation_id,
            "message": t("repair.created"),
        })),
    )
        .into_response())
}

async fn update_repair(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<RepairPatch>, JsonRejection>,
) -> HttpResult {
    let id = path_or_400(id)?;
    let patch = json_or_400(body)?;
    state
        .repair_api
        .update(id, patch)
        .await
        .map_err(|e| HttpError::from_mutation(e, "errors.repair_write_failed"))?;

    Ok(mutation_ok(id, "repair.updated"))
}

async fn delete_repair(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> HttpResult {
    let id = path_or_400(id)?;
    state
        .repair_api
        .delete(id)
        .await
        .map_err(|e| HttpError::from_mutation(e, "errors.repair_write_failed"))?;

    Ok(mutation_ok(id, "repair.deleted"))
}

fn mutation_ok(operation_id: i64, message_key: &str) -> Response {
    Json(json!({
        "status": "success",
        "operation_id": operation_id,
        "message": t(message_key),
    }))
    .into_response()
}
