use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use chrono::NaiveDate;
use serde_json::{json, Value};
use tower::ServiceExt;

use repair_shop::config::{DiscountPolicy, EnvironmentConfig};
use repair_shop::{create_router, AppState};

fn create_test_app() -> Router {
    let config = EnvironmentConfig {
        discounts: DiscountPolicy::parse("Cash=10").unwrap(),
        ..EnvironmentConfig::default()
    };
    let today = NaiveDate::from_ymd_opt(2025, 6, 5).unwrap();
    create_router(AppState::in_memory(config).with_today(today))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn create(app: &Router, uri: &str, body: Value) -> Value {
    let (status, response) = send(app, "POST", uri, Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "POST {} -> {}", uri, response);
    assert_eq!(response["success"], true);
    response["data"].clone()
}

/// Catálogos mínimos para abrir una orden
async fn seed(app: &Router) -> (Value, Value, Value, Value, Value, Value) {
    let customer = create(
        app,
        "/api/customers",
        json!({ "name": "Maria Silva", "tax_id": "12345678901" }),
    )
    .await;
    let vehicle = create(
        app,
        "/api/vehicles",
        json!({
            "customer_id": customer["id"],
            "brand": "Fiat",
            "model": "Uno",
            "license_plate": "ABC1D23"
        }),
    )
    .await;
    let service = create(
        app,
        "/api/services",
        json!({ "description": "Troca de óleo", "labor_price": "200.00" }),
    )
    .await;
    let employee = create(
        app,
        "/api/employees",
        json!({ "name": "Carlos", "role": "Mecânico", "tax_id": "98765432100" }),
    )
    .await;
    let part = create(
        app,
        "/api/parts",
        json!({ "name": "Filtro", "price": "50.00" }),
    )
    .await;
    let cash = create(app, "/api/payment-methods", json!({ "description": "Cash" })).await;
    (customer, vehicle, service, employee, part, cash)
}

#[tokio::test]
async fn test_health_check() {
    let app = create_test_app();
    let (status, body) = send(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["storage"], "memory");
    assert_eq!(body["today"], "2025-06-05");
}

#[tokio::test]
async fn test_catalog_crud() {
    let app = create_test_app();
    let part = create(
        &app,
        "/api/parts",
        json!({ "name": "Pastilha de freio", "price": "89.9", "stock": 4 }),
    )
    .await;
    assert_eq!(part["price"], "89.90");
    let uri = format!("/api/parts/{}", part["id"].as_str().unwrap());

    let (status, body) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Pastilha de freio");

    let (status, body) = send(&app, "PUT", &uri, Some(json!({ "stock": 10 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["stock"], 10);
    assert_eq!(body["data"]["name"], "Pastilha de freio");

    let (status, body) = send(&app, "GET", "/api/parts", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(1));

    let (status, _) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_catalog_validation_error() {
    let app = create_test_app();
    let (status, body) = send(
        &app,
        "POST",
        "/api/customers",
        Some(json!({ "name": "Ana", "tax_id": "123" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_customer_vehicles() {
    let app = create_test_app();
    let (customer, vehicle, ..) = seed(&app).await;

    let uri = format!("/api/customers/{}/vehicles", customer["id"].as_str().unwrap());
    let (status, body) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["id"], vehicle["id"]);

    let customer_uri = format!("/api/customers/{}", customer["id"].as_str().unwrap());
    let (status, body) = send(&app, "DELETE", &customer_uri, None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");
}

#[tokio::test]
async fn test_order_flow_over_http() {
    let app = create_test_app();
    let (_, vehicle, service, employee, part, cash) = seed(&app).await;

    let order = create(
        &app,
        "/api/service-orders",
        json!({
            "opened_on": "2025-06-01",
            "vehicle_id": vehicle["id"],
            "service_id": service["id"],
            "employee_id": employee["id"]
        }),
    )
    .await;
    assert_eq!(order["vehicle"]["license_plate"], "ABC1D23");
    let order_id = order["id"].as_str().unwrap().to_string();
    let parts_uri = format!("/api/service-orders/{}/parts", order_id);

    let (status, body) = send(
        &app,
        "POST",
        &parts_uri,
        Some(json!({ "part_id": part["id"], "quantity": 2, "unit_price": "50.00", "used_on": "2025-05-31" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "DATE_ORDERING_VIOLATION");

    let usage = create(
        &app,
        &parts_uri,
        json!({ "part_id": part["id"], "quantity": 2, "unit_price": "50.00", "used_on": "2025-06-01" }),
    )
    .await;
    assert_eq!(usage["line_total"], "100.00");

    let (status, body) = send(&app, "GET", "/api/service-orders/open", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(1));

    let execution = create(
        &app,
        "/api/executions",
        json!({
            "service_order_id": order_id,
            "value": "200.00",
            "finalized_on": "2025-06-10",
            "payment_method_id": cash["id"]
        }),
    )
    .await;
    assert_eq!(execution["discounted_value"], "180.00");
    assert_eq!(execution["status"], "InProgress");

    let (status, body) = send(
        &app,
        "POST",
        "/api/executions",
        Some(json!({
            "service_order_id": order_id,
            "value": "200.00",
            "finalized_on": "2025-06-10",
            "payment_method_id": cash["id"]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "ALREADY_FINALIZED");

    let (_, body) = send(&app, "GET", "/api/service-orders/open", None).await;
    assert_eq!(body.as_array().map(Vec::len), Some(0));

    let order_uri = format!("/api/service-orders/{}", order_id);
    let (status, body) = send(&app, "GET", &order_uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["parts_total"], "100.00");
    assert_eq!(body["execution"]["effective_value"], "180.00");

    let (status, body) = send(&app, "DELETE", &order_uri, None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "ORDER_HAS_EXECUTION");
}

#[tokio::test]
async fn test_reports() {
    let app = create_test_app();
    let (_, vehicle, service, employee, _, cash) = seed(&app).await;
    let order = create(
        &app,
        "/api/service-orders",
        json!({
            "opened_on": "2025-06-01",
            "vehicle_id": vehicle["id"],
            "service_id": service["id"],
            "employee_id": employee["id"]
        }),
    )
    .await;
    create(
        &app,
        "/api/executions",
        json!({
            "service_order_id": order["id"],
            "value": "200.00",
            "finalized_on": "2025-06-03",
            "payment_method_id": cash["id"]
        }),
    )
    .await;

    let window = "start_date=2025-06-01&end_date=2025-06-30";

    let (status, body) = send(&app, "GET", &format!("/api/reports/orders-by-employee?{}", window), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["employee_name"], "Carlos");
    assert_eq!(body[0]["total_orders"], 1);

    let (_, body) = send(&app, "GET", &format!("/api/reports/parts/total?{}", window), None).await;
    assert_eq!(body["total"], "0.00");

    let (_, body) = send(&app, "GET", &format!("/api/reports/executions?{}", window), None).await;
    assert_eq!(body[0]["customer_name"], "Maria Silva");
    assert_eq!(body[0]["status"], "Completed");

    let (_, body) = send(
        &app,
        "GET",
        &format!("/api/reports/employee-performance?{}", window),
        None,
    )
    .await;
    assert_eq!(body[0]["completion_rate"], "100.00");
    assert_eq!(body[0]["efficiency"], "2.00");

    let (status, body) = send(
        &app,
        "GET",
        "/api/reports/services?start_date=2025-06-30&end_date=2025-06-01",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
}

async fn send_raw(app: &Router, method: &str, uri: &str, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn test_malformed_input_gets_json_bad_request() {
    let app = create_test_app();
    let (_, vehicle, service, employee, ..) = seed(&app).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/service-orders",
        Some(json!({
            "opened_on": "2025/06/01",
            "vehicle_id": vehicle["id"],
            "service_id": service["id"],
            "employee_id": employee["id"]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
    assert!(body["message"].as_str().unwrap().contains("opened_on"));

    let (status, body) = send_raw(&app, "POST", "/api/service-orders", "{not json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");

    let (status, body) = send(&app, "GET", "/api/service-orders/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");

    let (status, body) = send(&app, "DELETE", "/api/parts/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");

    let (status, body) = send(
        &app,
        "GET",
        "/api/reports/services?start_date=2025-13-01&end_date=2025-06-30",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");

    let (status, body) = send(&app, "GET", "/api/reports/services", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");

    // Nada quedó guardado
    let (_, body) = send(&app, "GET", "/api/service-orders", None).await;
    assert_eq!(body.as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn test_oversized_part_price_is_rejected_over_http() {
    let app = create_test_app();
    let (_, vehicle, service, employee, part, _) = seed(&app).await;
    let order = create(
        &app,
        "/api/service-orders",
        json!({
            "opened_on": "2025-06-01",
            "vehicle_id": vehicle["id"],
            "service_id": service["id"],
            "employee_id": employee["id"]
        }),
    )
    .await;
    let parts_uri = format!("/api/service-orders/{}/parts", order["id"].as_str().unwrap());

    let (status, body) = send(
        &app,
        "POST",
        &parts_uri,
        Some(json!({
            "part_id": part["id"],
            "quantity": 2000000000,
            "unit_price": "70000000000000000000000000000",
            "used_on": "2025-06-02"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");

    let (status, body) = send(&app, "GET", &parts_uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(0));
}
