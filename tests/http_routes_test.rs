// ==========================================
// HTTP 路由集成测试
// ==========================================
// 测试范围:
// 1. 响应信封 {status, data/...}
// 2. 状态码: 201 / 400 / 404
// 3. 请求体/查询串/路径参数解析失败
// 4. 健康检查、请求 ID 响应头
// ==========================================

mod helpers;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use helpers::api_test_helper::*;
use repair_dashboard::{build_router, i18n};

fn router(env: &ApiTestEnv) -> Router {
    i18n::set_locale("zh-CN");
    build_router(env.state.clone())
}

async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

// ==========================================
// 健康检查 / 请求 ID
// ==========================================

#[tokio::test]
async fn test_health() {
    let env = ApiTestEnv::new().await;
    let (status, body) = get(router(&env), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "repair-dashboard");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_响应携带请求id() {
    let env = ApiTestEnv::new().await;
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = router(&env).oneshot(request).await.unwrap();
    assert!(response.headers().contains_key("x-request-id"));
}

// ==========================================
// 驾驶舱
// ==========================================

#[tokio::test]
async fn test_kpi_信封() {
    let (env, _) = ApiTestEnv::with_fixture().await;
    let (status, body) = get(router(&env), "/api/kpi?period=30").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["total_repairs"], json!({"value": 3, "change": 50.0}));
    assert_eq!(body["data"]["customer_satisfaction"]["value"], 4.5);
    assert_eq!(body["data"]["critical_anomalies"]["value"], 1);
    assert_eq!(body["data"]["avg_cost"], json!({"value": 2000}));
}

#[tokio::test]
async fn test_kpi_非法参数() {
    let env = ApiTestEnv::new().await;

    let (status, body) = get(router(&env), "/api/kpi?period=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
    assert!(body["message"].as_str().unwrap().contains("period"));

    let (status, body) = get(router(&env), "/api/kpi?period=abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn test_monthly_trend_与异常() {
    let (env, _) = ApiTestEnv::with_fixture().await;

    let (status, body) = get(router(&env), "/api/monthly-trend?months=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"].as_array().unwrap().len(), 2);
    assert_eq!(body["data"]["by_model"].as_array().unwrap().len(), 4);

    let (status, body) = get(router(&env), "/api/anomalies?severity=CRITICAL&limit=10").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_count"], 1);
    assert_eq!(body["data"]["severity_filter"], "CRITICAL");
    assert_eq!(body["data"]["anomalies"][0]["severity"], "CRITICAL");
    assert_eq!(body["data"]["anomalies"][0]["anomaly_date"], "2025-01-15");

    let (status, body) = get(router(&env), "/api/anomalies?severity=SEVERE").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn test_services_与预测() {
    let (env, _) = ApiTestEnv::with_fixture().await;

    let (status, body) = get(router(&env), "/api/services").await;
    assert_eq!(status, StatusCode::OK);
    let services = body["data"].as_array().unwrap();
    assert_eq!(services.len(), 2);
    assert_eq!(services[0]["service_name"], "Kadikoy Teknik");
    assert_eq!(services[0]["performance_score"], 76.0);

    let (status, body) = get(router(&env), "/api/predictions").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["method"], "quarterly_trend_projection");
    assert_eq!(body["base_period"], "90_days");
    assert_eq!(body["data"], json!([]));
}

// ==========================================
// 维修记录
// ==========================================

#[tokio::test]
async fn test_create_repair_201() {
    let env = ApiTestEnv::new().await;
    let payload = json!({
        "model_id": env.ids.iphone13,
        "service_id": env.ids.kadikoy,
        "part_id": env.ids.battery,
        "operation_date": "2025-01-18",
        "service_cost": 1250.0
    });

    let (status, body) = send(router(&env), Method::POST, "/api/repairs", Some(payload)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "success");
    assert_eq!(body["message"], "维修记录创建成功");

    let id = body["operation_id"].as_i64().unwrap();
    let (status, body) = get(router(&env), &format!("/api/repairs/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["operation_id"], id);
    assert_eq!(body["data"]["part_name"], "Battery");
}

#[tokio::test]
async fn test_create_repair_400() {
    let env = ApiTestEnv::new().await;

    // 历史日期
    let payload = json!({
        "model_id": env.ids.iphone13,
        "service_id": env.ids.kadikoy,
        "part_id": env.ids.battery,
        "operation_date": "2025-01-01",
        "service_cost": 1250.0
    });
    let (status, body) = send(router(&env), Method::POST, "/api/repairs", Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
    assert!(body["message"].as_str().unwrap().contains("2025-01-01"));

    // 请求体不是合法 JSON
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/repairs")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = router(&env).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "error");
    assert!(body["message"].as_str().unwrap().starts_with("请求参数无效"));
}

#[tokio::test]
async fn test_成功标记_接受整数0与1() {
    let env = ApiTestEnv::new().await;
    let payload = json!({
        "model_id": env.ids.iphone13,
        "service_id": env.ids.kadikoy,
        "part_id": env.ids.battery,
        "operation_date": "2025-01-18",
        "service_cost": 900.0,
        "if_repair_successful": 1
    });

    let (status, body) = send(router(&env), Method::POST, "/api/repairs", Some(payload)).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["operation_id"].as_i64().unwrap();
    let uri = format!("/api/repairs/{}", id);

    let (_, body) = get(router(&env), &uri).await;
    assert_eq!(body["data"]["if_repair_successful"], true);

    let (status, body) = send(
        router(&env),
        Method::PUT,
        &uri,
        Some(json!({"if_repair_successful": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "维修记录更新成功");

    let (_, body) = get(router(&env), &uri).await;
    assert_eq!(body["data"]["if_repair_successful"], false);

    // 0/1 以外的整数拒绝
    let (status, body) = send(
        router(&env),
        Method::PUT,
        &uri,
        Some(json!({"if_repair_successful": 2})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn test_get_repair_404_与非法id() {
    let env = ApiTestEnv::new().await;

    let (status, body) = get(router(&env), "/api/repairs/9999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "error");

    let (status, body) = get(router(&env), "/api/repairs/abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn test_list_repairs() {
    let (env, repairs) = ApiTestEnv::with_fixture().await;

    let (status, body) = get(router(&env), "/api/repairs?limit=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["total"], 2);
    assert_eq!(body["data"][0]["operation_id"], repairs.r3);

    let (status, _) = get(router(&env), "/api/repairs?limit=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_repair() {
    let (env, repairs) = ApiTestEnv::with_fixture().await;

    let (status, body) = send(
        router(&env),
        Method::PUT,
        &format!("/api/repairs/{}", repairs.r3),
        Some(json!({"service_time": 45})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["operation_id"], repairs.r3);
    assert_eq!(body["message"], "维修记录更新成功");

    // 冻结记录
    let (status, body) = send(
        router(&env),
        Method::PUT,
        &format!("/api/repairs/{}", repairs.r2),
        Some(json!({"if_repair_successful": true})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");

    // 修改不存在的记录按 400 返回
    let (status, _) = send(
        router(&env),
        Method::PUT,
        "/api/repairs/9999",
        Some(json!({"service_cost": 10.0})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_repair() {
    let (env, repairs) = ApiTestEnv::with_fixture().await;

    let (status, body) = send(
        router(&env),
        Method::DELETE,
        &format!("/api/repairs/{}", repairs.r5),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "维修记录删除成功");

    // 已成功记录
    let (status, _) = send(
        router(&env),
        Method::DELETE,
        &format!("/api/repairs/{}", repairs.r1),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // 已删除
    let (status, _) = send(
        router(&env),
        Method::DELETE,
        &format!("/api/repairs/{}", repairs.r5),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
