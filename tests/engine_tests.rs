use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::json;
use uuid::Uuid;

use repair_shop::config::{DiscountPolicy, EnvironmentConfig};
use repair_shop::models::execution::{FinalizeOrderRequest, UpdateExecutionRequest};
use repair_shop::models::part_usage::AttachPartRequest;
use repair_shop::models::report::DateRange;
use repair_shop::models::service_order::{CreateServiceOrderRequest, UpdateServiceOrderRequest};
use repair_shop::models::{
    Customer, Employee, ExecutionStatus, Part, PaymentMethod, Service, Vehicle,
};
use repair_shop::AppState;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

struct Shop {
    state: AppState,
    vehicle: Vehicle,
    service: Service,
    employee: Employee,
    part: Part,
    cash: PaymentMethod,
    card: PaymentMethod,
}

async fn shop() -> Shop {
    let config = EnvironmentConfig {
        discounts: DiscountPolicy::parse("Cash=10").unwrap(),
        ..EnvironmentConfig::default()
    };
    let state = AppState::in_memory(config);
    let catalog = &state.catalog;

    let customer: Customer = catalog
        .create::<Customer>(
            serde_json::from_value(json!({ "name": "Maria Silva", "tax_id": "123.456.789-01" }))
                .unwrap(),
        )
        .await
        .unwrap();
    let vehicle: Vehicle = catalog
        .create::<Vehicle>(
            serde_json::from_value(json!({
                "customer_id": customer.id,
                "brand": "Fiat",
                "model": "Uno",
                "year": 2012,
                "license_plate": "abc-1d23"
            }))
            .unwrap(),
        )
        .await
        .unwrap();
    let service: Service = catalog
        .create::<Service>(
            serde_json::from_value(json!({ "description": "Revisão", "labor_price": "200.00" }))
                .unwrap(),
        )
        .await
        .unwrap();
    let employee: Employee = catalog
        .create::<Employee>(
            serde_json::from_value(json!({
                "name": "Carlos",
                "role": "Mecânico",
                "tax_id": "98765432100"
            }))
            .unwrap(),
        )
        .await
        .unwrap();
    let part: Part = catalog
        .create::<Part>(
            serde_json::from_value(json!({ "name": "Filtro de óleo", "price": "45.90", "stock": 5 }))
                .unwrap(),
        )
        .await
        .unwrap();
    let cash: PaymentMethod = catalog
        .create::<PaymentMethod>(serde_json::from_value(json!({ "description": "Cash" })).unwrap())
        .await
        .unwrap();
    let card: PaymentMethod = catalog
        .create::<PaymentMethod>(
            serde_json::from_value(json!({ "description": "Credit card" })).unwrap(),
        )
        .await
        .unwrap();

    Shop {
        state,
        vehicle,
        service,
        employee,
        part,
        cash,
        card,
    }
}

fn open_request(shop: &Shop, opened_on: NaiveDate) -> CreateServiceOrderRequest {
    CreateServiceOrderRequest {
        opened_on: Some(opened_on),
        vehicle_id: shop.vehicle.id,
        service_id: shop.service.id,
        employee_id: shop.employee.id,
    }
}

fn attach_request(shop: &Shop, quantity: i32, price: &str, used_on: NaiveDate) -> AttachPartRequest {
    AttachPartRequest {
        part_id: shop.part.id,
        quantity,
        unit_price: Some(dec(price)),
        used_on,
    }
}

fn finalize_request(order_id: Uuid, value: &str, finalized_on: NaiveDate, method: Uuid) -> FinalizeOrderRequest {
    FinalizeOrderRequest {
        service_order_id: order_id,
        value: Some(dec(value)),
        finalized_on,
        payment_method_id: method,
    }
}

#[tokio::test]
async fn test_order_lifecycle_scenario() {
    let shop = shop().await;
    let today = date(2025, 6, 5);

    let order = shop
        .state
        .service_orders
        .create(open_request(&shop, date(2025, 6, 1)), today)
        .await
        .unwrap();
    assert_eq!(order.order.opened_on, date(2025, 6, 1));
    assert_eq!(order.vehicle.as_ref().map(|v| v.license_plate.as_str()), Some("ABC-1D23"));
    assert_eq!(order.customer.as_ref().map(|c| c.name.as_str()), Some("Maria Silva"));
    let order_id = order.order.id;

    let usage = shop
        .state
        .part_usages
        .attach(order_id, attach_request(&shop, 2, "50.00", date(2025, 6, 1)))
        .await
        .unwrap();
    assert_eq!(usage.line_total.to_string(), "100.00");
    assert_eq!(usage.part_name.as_deref(), Some("Filtro de óleo"));

    let err = shop
        .state
        .part_usages
        .attach(order_id, attach_request(&shop, 1, "50.00", date(2025, 5, 31)))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "DATE_ORDERING_VIOLATION");
    assert_eq!(
        shop.state.part_usages.list_for_order(order_id).await.unwrap().len(),
        1
    );

    let execution = shop
        .state
        .executions
        .finalize(
            finalize_request(order_id, "200.00", date(2025, 6, 10), shop.cash.id),
            today,
        )
        .await
        .unwrap();
    assert_eq!(execution.discounted_value.map(|v| v.to_string()), Some("180.00".to_string()));
    assert_eq!(execution.status, ExecutionStatus::InProgress);

    let later = shop
        .state
        .executions
        .get(execution.execution.id, date(2025, 6, 10))
        .await
        .unwrap();
    assert_eq!(later.status, ExecutionStatus::Completed);

    let err = shop
        .state
        .executions
        .finalize(
            finalize_request(order_id, "150.00", date(2025, 6, 11), shop.card.id),
            today,
        )
        .await
        .unwrap_err();
    assert_eq!(err.code(), "ALREADY_FINALIZED");
    assert_eq!(shop.state.executions.list(today).await.unwrap().len(), 1);

    let detail = shop.state.service_orders.get(order_id, today).await.unwrap();
    assert_eq!(detail.parts.len(), 1);
    assert_eq!(detail.parts_total, dec("100.00"));
    assert_eq!(
        detail.execution.map(|e| e.effective_value),
        Some(dec("180.00"))
    );
}

#[tokio::test]
async fn test_create_rejects_unknown_references() {
    let shop = shop().await;
    let mut request = open_request(&shop, date(2025, 6, 1));
    request.employee_id = Uuid::new_v4();

    let err = shop
        .state
        .service_orders
        .create(request, date(2025, 6, 1))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "REFERENCE_NOT_FOUND");
    assert!(shop.state.service_orders.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_create_without_date_opens_today() {
    let shop = shop().await;
    let mut request = open_request(&shop, date(2025, 1, 1));
    request.opened_on = None;

    let order = shop
        .state
        .service_orders
        .create(request, date(2025, 7, 4))
        .await
        .unwrap();
    assert_eq!(order.order.opened_on, date(2025, 7, 4));
}

#[tokio::test]
async fn test_attach_validates_quantity_and_references() {
    let shop = shop().await;
    let order = shop
        .state
        .service_orders
        .create(open_request(&shop, date(2025, 6, 1)), date(2025, 6, 1))
        .await
        .unwrap();

    let err = shop
        .state
        .part_usages
        .attach(order.order.id, attach_request(&shop, 0, "10.00", date(2025, 6, 2)))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "INVALID_QUANTITY");

    let mut unknown_part = attach_request(&shop, 1, "10.00", date(2025, 6, 2));
    unknown_part.part_id = Uuid::new_v4();
    let err = shop
        .state
        .part_usages
        .attach(order.order.id, unknown_part)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "NOT_FOUND");

    let err = shop
        .state
        .part_usages
        .attach(Uuid::new_v4(), attach_request(&shop, 1, "10.00", date(2025, 6, 2)))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "NOT_FOUND");

    // sin precio se usa el del catálogo
    let mut catalog_price = attach_request(&shop, 3, "0", date(2025, 6, 2));
    catalog_price.unit_price = None;
    let usage = shop
        .state
        .part_usages
        .attach(order.order.id, catalog_price)
        .await
        .unwrap();
    assert_eq!(usage.usage.unit_price, dec("45.90"));
    assert_eq!(usage.line_total, dec("137.70"));

    shop.state.part_usages.detach(usage.usage.id).await.unwrap();
    let err = shop.state.part_usages.detach(usage.usage.id).await.unwrap_err();
    assert_eq!(err.code(), "NOT_FOUND");
}

#[tokio::test]
async fn test_update_cannot_move_opening_after_parts() {
    let shop = shop().await;
    let order = shop
        .state
        .service_orders
        .create(open_request(&shop, date(2025, 6, 1)), date(2025, 6, 1))
        .await
        .unwrap();
    let order_id = order.order.id;
    shop.state
        .part_usages
        .attach(order_id, attach_request(&shop, 1, "10.00", date(2025, 6, 3)))
        .await
        .unwrap();

    let err = shop
        .state
        .service_orders
        .update(
            order_id,
            UpdateServiceOrderRequest {
                opened_on: Some(date(2025, 6, 4)),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code(), "DATE_ORDERING_VIOLATION");

    let updated = shop
        .state
        .service_orders
        .update(
            order_id,
            UpdateServiceOrderRequest {
                opened_on: Some(date(2025, 6, 3)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.order.opened_on, date(2025, 6, 3));

    let err = shop
        .state
        .service_orders
        .update(
            order_id,
            UpdateServiceOrderRequest {
                vehicle_id: Some(Uuid::new_v4()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code(), "REFERENCE_NOT_FOUND");

    let err = shop
        .state
        .service_orders
        .update(Uuid::new_v4(), UpdateServiceOrderRequest::default())
        .await
        .unwrap_err();
    assert_eq!(err.code(), "NOT_FOUND");
}

#[tokio::test]
async fn test_open_orders_follow_execution_lifecycle() {
    let shop = shop().await;
    let today = date(2025, 6, 20);
    let first = shop
        .state
        .service_orders
        .create(open_request(&shop, date(2025, 6, 1)), today)
        .await
        .unwrap();
    let second = shop
        .state
        .service_orders
        .create(open_request(&shop, date(2025, 6, 2)), today)
        .await
        .unwrap();

    let open_ids = |views: Vec<repair_shop::dto::ServiceOrderView>| -> Vec<Uuid> {
        views.into_iter().map(|v| v.order.id).collect()
    };
    assert_eq!(open_ids(shop.state.service_orders.list_open().await.unwrap()).len(), 2);

    let execution = shop
        .state
        .executions
        .finalize(
            finalize_request(first.order.id, "120.00", date(2025, 6, 5), shop.card.id),
            today,
        )
        .await
        .unwrap();
    assert_eq!(
        open_ids(shop.state.service_orders.list_open().await.unwrap()),
        vec![second.order.id]
    );

    shop.state
        .executions
        .remove(execution.execution.id)
        .await
        .unwrap();
    let open = open_ids(shop.state.service_orders.list_open().await.unwrap());
    assert_eq!(open.len(), 2);
    assert!(open.contains(&first.order.id));
}

#[tokio::test]
async fn test_delete_policy_and_cascade() {
    let shop = shop().await;
    let today = date(2025, 6, 20);
    let order = shop
        .state
        .service_orders
        .create(open_request(&shop, date(2025, 6, 1)), today)
        .await
        .unwrap();
    let order_id = order.order.id;
    let usage = shop
        .state
        .part_usages
        .attach(order_id, attach_request(&shop, 1, "10.00", date(2025, 6, 1)))
        .await
        .unwrap();
    let execution = shop
        .state
        .executions
        .finalize(
            finalize_request(order_id, "80.00", date(2025, 6, 2), shop.cash.id),
            today,
        )
        .await
        .unwrap();

    let err = shop.state.service_orders.delete(order_id).await.unwrap_err();
    assert_eq!(err.code(), "ORDER_HAS_EXECUTION");

    shop.state
        .executions
        .remove(execution.execution.id)
        .await
        .unwrap();
    shop.state.service_orders.delete(order_id).await.unwrap();

    let err = shop.state.part_usages.get(usage.usage.id).await.unwrap_err();
    assert_eq!(err.code(), "NOT_FOUND");
    let err = shop.state.service_orders.delete(order_id).await.unwrap_err();
    assert_eq!(err.code(), "NOT_FOUND");
}

#[tokio::test]
async fn test_finalize_defaults_and_updates() {
    let shop = shop().await;
    let today = date(2025, 6, 20);
    let order = shop
        .state
        .service_orders
        .create(open_request(&shop, date(2025, 6, 1)), today)
        .await
        .unwrap();

    let err = shop
        .state
        .executions
        .finalize(
            finalize_request(order.order.id, "10.00", date(2025, 6, 2), Uuid::new_v4()),
            today,
        )
        .await
        .unwrap_err();
    assert_eq!(err.code(), "NOT_FOUND");

    let err = shop
        .state
        .executions
        .finalize(
            finalize_request(order.order.id, "-1.00", date(2025, 6, 2), shop.card.id),
            today,
        )
        .await
        .unwrap_err();
    assert_eq!(err.code(), "BAD_REQUEST");

    let mut request = finalize_request(order.order.id, "0", date(2025, 6, 2), shop.card.id);
    request.value = None;
    let execution = shop.state.executions.finalize(request, today).await.unwrap();
    assert_eq!(execution.execution.value, dec("200.00"));
    assert_eq!(execution.discounted_value, None);
    assert_eq!(execution.status, ExecutionStatus::Completed);

    let updated = shop
        .state
        .executions
        .update(
            execution.execution.id,
            UpdateExecutionRequest {
                payment_method_id: Some(shop.cash.id),
                finalized_on: Some(date(2025, 6, 30)),
                ..Default::default()
            },
            today,
        )
        .await
        .unwrap();
    assert_eq!(updated.discounted_value, Some(dec("180.00")));
    assert_eq!(updated.status, ExecutionStatus::InProgress);
}

#[tokio::test]
async fn test_catalog_rules() {
    let shop = shop().await;

    let vehicles = shop
        .state
        .catalog
        .vehicles_by_customer(shop.vehicle.customer_id)
        .await
        .unwrap();
    assert_eq!(vehicles, vec![shop.vehicle.clone()]);

    let err = shop
        .state
        .catalog
        .vehicles_by_customer(Uuid::new_v4())
        .await
        .unwrap_err();
    assert_eq!(err.code(), "NOT_FOUND");

    let err = shop
        .state
        .catalog
        .create::<Vehicle>(
            serde_json::from_value(json!({
                "customer_id": Uuid::new_v4(),
                "brand": "Ford",
                "model": "Ka",
                "license_plate": "XYZ9A87"
            }))
            .unwrap(),
        )
        .await
        .unwrap_err();
    assert_eq!(err.code(), "REFERENCE_NOT_FOUND");

    let err = shop
        .state
        .catalog
        .delete::<Customer>(shop.vehicle.customer_id)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "CONFLICT");

    let err = shop
        .state
        .catalog
        .create::<Part>(serde_json::from_value(json!({ "name": "Vela", "price": "-3" })).unwrap())
        .await
        .unwrap_err();
    assert_eq!(err.code(), "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_reports_over_window() {
    let shop = shop().await;
    let today = date(2025, 6, 20);
    let order = shop
        .state
        .service_orders
        .create(open_request(&shop, date(2025, 6, 1)), today)
        .await
        .unwrap();
    shop.state
        .part_usages
        .attach(order.order.id, attach_request(&shop, 2, "50.00", date(2025, 6, 1)))
        .await
        .unwrap();
    shop.state
        .executions
        .finalize(
            finalize_request(order.order.id, "200.00", date(2025, 6, 10), shop.cash.id),
            today,
        )
        .await
        .unwrap();

    let june = DateRange::new(date(2025, 6, 1), date(2025, 6, 30));
    let reports = &shop.state.reports;

    let by_employee = reports.orders_by_employee(june).await.unwrap();
    assert_eq!(by_employee.len(), 1);
    assert_eq!(by_employee[0].total_orders, 1);

    let services = reports.services(june).await.unwrap();
    assert_eq!(services[0].total_revenue, dec("200.00"));

    assert_eq!(reports.parts_total(june).await.unwrap().total, dec("100.00"));
    assert_eq!(reports.parts_usage(june).await.unwrap()[0].total_quantity, 2);

    let rows = reports.executions(june, today).await.unwrap();
    assert_eq!(rows[0].discounted_value, Some(dec("180.00")));
    assert_eq!(rows[0].status, ExecutionStatus::Completed);

    let performance = reports.employee_performance(june, today).await.unwrap();
    assert_eq!(performance[0].completed_services, 1);
    assert_eq!(performance[0].efficiency, dec("9.00"));
    assert_eq!(performance[0].total_revenue, dec("180.00"));

    let may = DateRange::new(date(2025, 5, 1), date(2025, 5, 31));
    assert!(reports.orders_by_employee(may).await.unwrap().is_empty());
    assert_eq!(reports.parts_total(may).await.unwrap().total, Decimal::ZERO);

    let backwards = DateRange::new(date(2025, 6, 30), date(2025, 6, 1));
    let err = reports.services(backwards).await.unwrap_err();
    assert_eq!(err.code(), "BAD_REQUEST");
}

#[tokio::test]
async fn test_money_beyond_column_range_is_rejected_before_saving() {
    let shop = shop().await;
    let today = date(2025, 6, 20);
    let order = shop
        .state
        .service_orders
        .create(open_request(&shop, date(2025, 6, 1)), today)
        .await
        .unwrap();
    let order_id = order.order.id;

    let err = shop
        .state
        .part_usages
        .attach(
            order_id,
            attach_request(&shop, 2_000_000_000, "70000000000000000000000000000", date(2025, 6, 2)),
        )
        .await
        .unwrap_err();
    assert_eq!(err.code(), "BAD_REQUEST");
    assert!(shop.state.part_usages.list_for_order(order_id).await.unwrap().is_empty());

    // el mayor precio admitido con la mayor cantidad sigue siendo representable
    let usage = shop
        .state
        .part_usages
        .attach(
            order_id,
            attach_request(&shop, i32::MAX, "9999999999.99", date(2025, 6, 2)),
        )
        .await
        .unwrap();
    assert_eq!(
        usage.line_total,
        Decimal::from(i32::MAX) * dec("9999999999.99")
    );

    let june = DateRange::new(date(2025, 6, 1), date(2025, 6, 30));
    assert_eq!(
        shop.state.reports.parts_total(june).await.unwrap().total,
        usage.line_total
    );
    assert_eq!(shop.state.reports.parts_usage(june).await.unwrap().len(), 1);
    let detail = shop.state.service_orders.get(order_id, today).await.unwrap();
    assert_eq!(detail.parts_total, usage.line_total);

    let err = shop
        .state
        .executions
        .finalize(
            finalize_request(order_id, "10000000000.00", date(2025, 6, 3), shop.cash.id),
            today,
        )
        .await
        .unwrap_err();
    assert_eq!(err.code(), "BAD_REQUEST");
    assert!(shop.state.executions.list(today).await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_finalize_creates_a_single_execution() {
    let shop = shop().await;
    let today = date(2025, 6, 20);
    let order = shop
        .state
        .service_orders
        .create(open_request(&shop, date(2025, 6, 1)), today)
        .await
        .unwrap();
    let order_id = order.order.id;

    let attempts = 16;
    let handles: Vec<_> = (0..attempts)
        .map(|_| {
            let executions = shop.state.executions.clone();
            let request = finalize_request(order_id, "200.00", date(2025, 6, 10), shop.cash.id);
            tokio::spawn(async move { executions.finalize(request, today).await })
        })
        .collect();

    let mut created = 0;
    let mut already_finalized = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => created += 1,
            Err(err) => {
                assert_eq!(err.code(), "ALREADY_FINALIZED");
                already_finalized += 1;
            }
        }
    }

    assert_eq!(created, 1);
    assert_eq!(already_finalized, attempts - 1);
    assert_eq!(shop.state.executions.list(today).await.unwrap().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_attach_and_reopen_keep_date_ordering() {
    let shop = shop().await;
    let today = date(2025, 6, 20);

    for _ in 0..20 {
        let order = shop
            .state
            .service_orders
            .create(open_request(&shop, date(2025, 6, 1)), today)
            .await
            .unwrap();
        let order_id = order.order.id;

        let part_usages = shop.state.part_usages.clone();
        let attach = attach_request(&shop, 1, "10.00", date(2025, 6, 2));
        let attach_task = tokio::spawn(async move { part_usages.attach(order_id, attach).await });

        let service_orders = shop.state.service_orders.clone();
        let update_task = tokio::spawn(async move {
            service_orders
                .update(
                    order_id,
                    UpdateServiceOrderRequest {
                        opened_on: Some(date(2025, 6, 5)),
                        ..Default::default()
                    },
                )
                .await
        });

        let attached = attach_task.await.unwrap();
        let updated = update_task.await.unwrap();
        // a lo sumo una de las dos escrituras puede ganar
        assert!(attached.is_err() || updated.is_err());

        let detail = shop.state.service_orders.get(order_id, today).await.unwrap();
        for line in &detail.parts {
            assert!(line.usage.used_on >= detail.view.order.opened_on);
        }
    }
}
