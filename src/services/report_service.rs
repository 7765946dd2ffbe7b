//! Reportes por ventana de fechas
//!
//! Lecturas puras sobre órdenes, piezas usadas y ejecuciones. Las funciones
//! de agregación no tocan el store y toleran ventanas vacías.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::debug;
use uuid::Uuid;

use crate::config::DiscountPolicy;
use crate::dto::ExecutionView;
use crate::models::part_usage::parts_total;
use crate::models::report::{
    DateRange, EmployeeOrderCount, EmployeePerformance, ExecutionReportRow, PartUsageSummary,
    PartsTotal, ServiceSummary,
};
use crate::models::{Execution, PartUsage, ServiceOrder};
use crate::repositories::OrderRepository;
use crate::services::catalog_service::{CatalogService, CatalogSnapshot};
use crate::utils::errors::AppResult;
use crate::utils::money::{add_money, percentage, round_money, MONEY_SCALE};
use crate::utils::validation::validate_date_range;

fn cents(value: Decimal) -> Decimal {
    let mut value = round_money(value);
    value.rescale(MONEY_SCALE);
    value
}

fn employee_name(snapshot: &CatalogSnapshot, employee_id: Uuid) -> String {
    snapshot
        .employees
        .get(&employee_id)
        .map(|e| e.name.clone())
        .unwrap_or_else(|| employee_id.to_string())
}

/// Órdenes abiertas por funcionario
pub fn orders_by_employee(
    orders: &[ServiceOrder],
    snapshot: &CatalogSnapshot,
) -> Vec<EmployeeOrderCount> {
    let mut counts: HashMap<Uuid, u64> = HashMap::new();
    for order in orders {
        *counts.entry(order.employee_id).or_default() += 1;
    }

    let mut rows: Vec<EmployeeOrderCount> = counts
        .into_iter()
        .map(|(employee_id, total_orders)| EmployeeOrderCount {
            employee_id,
            employee_name: employee_name(snapshot, employee_id),
            total_orders,
        })
        .collect();
    rows.sort_by(|a, b| {
        b.total_orders
            .cmp(&a.total_orders)
            .then_with(|| a.employee_name.cmp(&b.employee_name))
    });
    rows
}

/// Servicios agrupados por descripción con la suma de mano de obra
pub fn services_summary(
    orders: &[ServiceOrder],
    snapshot: &CatalogSnapshot,
) -> AppResult<Vec<ServiceSummary>> {
    let mut groups: HashMap<String, (u64, Decimal)> = HashMap::new();
    for order in orders {
        let Some(service) = snapshot.services.get(&order.service_id) else {
            continue;
        };
        let entry = groups
            .entry(service.description.clone())
            .or_insert((0, Decimal::ZERO));
        entry.0 += 1;
        add_money(&mut entry.1, service.labor_price)?;
    }

    let mut rows: Vec<ServiceSummary> = groups
        .into_iter()
        .map(|(description, (times_performed, revenue))| ServiceSummary {
            description,
            times_performed,
            total_revenue: cents(revenue),
        })
        .collect();
    rows.sort_by(|a, b| {
        b.times_performed
            .cmp(&a.times_performed)
            .then_with(|| a.description.cmp(&b.description))
    });
    Ok(rows)
}

/// Valor total de las piezas usadas en la ventana
pub fn parts_total_in(usages: &[PartUsage], range: DateRange) -> AppResult<PartsTotal> {
    Ok(PartsTotal {
        start_date: range.start_date,
        end_date: range.end_date,
        total: cents(parts_total(usages)?),
    })
}

/// Piezas agrupadas por nombre
pub fn parts_usage(
    usages: &[PartUsage],
    snapshot: &CatalogSnapshot,
) -> AppResult<Vec<PartUsageSummary>> {
    let mut groups: HashMap<String, (i64, Decimal)> = HashMap::new();
    for usage in usages {
        let name = snapshot
            .parts
            .get(&usage.part_id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| usage.part_id.to_string());
        let entry = groups.entry(name).or_insert((0, Decimal::ZERO));
        entry.0 += i64::from(usage.quantity);
        add_money(&mut entry.1, usage.line_total()?)?;
    }

    let mut rows: Vec<PartUsageSummary> = groups
        .into_iter()
        .map(|(part_name, (total_quantity, value))| PartUsageSummary {
            part_name,
            total_quantity,
            total_value: cents(value),
        })
        .collect();
    rows.sort_by(|a, b| {
        b.total_quantity
            .cmp(&a.total_quantity)
            .then_with(|| a.part_name.cmp(&b.part_name))
    });
    Ok(rows)
}

/// Ejecuciones con el contexto de su orden
pub fn execution_rows(
    executions: &[Execution],
    orders: &HashMap<Uuid, ServiceOrder>,
    snapshot: &CatalogSnapshot,
    discounts: &DiscountPolicy,
    today: NaiveDate,
) -> Vec<ExecutionReportRow> {
    executions
        .iter()
        .filter_map(|execution| {
            let order = orders.get(&execution.service_order_id)?;
            let vehicle = snapshot.vehicles.get(&order.vehicle_id);
            let customer = vehicle.and_then(|v| snapshot.customer_of(v));
            let service = snapshot.services.get(&order.service_id);
            let method = snapshot.payment_methods.get(&execution.payment_method_id);
            let view = ExecutionView::new(execution.clone(), method, discounts, today);

            Some(ExecutionReportRow {
                execution_id: execution.id,
                service_order_id: order.id,
                opened_on: order.opened_on,
                finalized_on: execution.finalized_on,
                customer_name: customer.map(|c| c.name.clone()),
                vehicle_model: vehicle.map(|v| v.model.clone()),
                license_plate: vehicle.map(|v| v.license_plate.clone()),
                service_description: service.map(|s| s.description.clone()),
                payment_method: view.payment_method,
                value: execution.value,
                discounted_value: view.discounted_value,
                status: view.status,
            })
        })
        .collect()
}

#[derive(Default)]
struct PerformanceTally {
    total_orders: u64,
    completed: u64,
    days: i64,
    revenue: Decimal,
}

/// Indicadores por funcionario sobre las órdenes abiertas en la ventana
pub fn employee_performance(
    orders: &[ServiceOrder],
    executions: &[Execution],
    snapshot: &CatalogSnapshot,
    discounts: &DiscountPolicy,
    today: NaiveDate,
) -> AppResult<Vec<EmployeePerformance>> {
    let by_order: HashMap<Uuid, &Execution> = executions
        .iter()
        .map(|e| (e.service_order_id, e))
        .collect();

    let mut tallies: HashMap<Uuid, PerformanceTally> = HashMap::new();
    for order in orders {
        let tally = tallies.entry(order.employee_id).or_default();
        tally.total_orders += 1;

        let Some(execution) = by_order.get(&order.id) else {
            continue;
        };
        let method = snapshot.payment_methods.get(&execution.payment_method_id);
        let view = ExecutionView::new((*execution).clone(), method, discounts, today);
        if view.status.is_completed() {
            tally.completed += 1;
            tally.days += (execution.finalized_on - order.opened_on).num_days();
            add_money(&mut tally.revenue, view.effective_value)?;
        }
    }

    let mut rows: Vec<EmployeePerformance> = tallies
        .into_iter()
        .map(|(employee_id, tally)| {
            let employee = snapshot.employees.get(&employee_id);
            let efficiency = if tally.completed == 0 {
                Decimal::ZERO
            } else {
                Decimal::from(tally.days) / Decimal::from(tally.completed)
            };
            EmployeePerformance {
                employee_id,
                employee_name: employee_name(snapshot, employee_id),
                role: employee.map(|e| e.role.clone()).unwrap_or_default(),
                total_orders: tally.total_orders,
                completed_services: tally.completed,
                completion_rate: cents(percentage(tally.completed, tally.total_orders)),
                efficiency: cents(efficiency),
                total_revenue: cents(tally.revenue),
            }
        })
        .collect();
    rows.sort_by(|a, b| {
        b.total_orders
            .cmp(&a.total_orders)
            .then_with(|| a.employee_name.cmp(&b.employee_name))
    });
    Ok(rows)
}

#[derive(Clone)]
pub struct ReportService {
    catalog: CatalogService,
    orders: Arc<dyn OrderRepository>,
    discounts: Arc<DiscountPolicy>,
}

impl ReportService {
    pub fn new(
        catalog: CatalogService,
        orders: Arc<dyn OrderRepository>,
        discounts: Arc<DiscountPolicy>,
    ) -> Self {
        Self {
            catalog,
            orders,
            discounts,
        }
    }

    pub async fn orders_by_employee(&self, range: DateRange) -> AppResult<Vec<EmployeeOrderCount>> {
        validate_date_range(range.start_date, range.end_date)?;
        let (snapshot, orders) = tokio::try_join!(
            self.catalog.snapshot(),
            self.orders.orders_opened_between(range),
        )?;
        debug!("📊 {} órdenes en la ventana", orders.len());
        Ok(orders_by_employee(&orders, &snapshot))
    }

    pub async fn services(&self, range: DateRange) -> AppResult<Vec<ServiceSummary>> {
        validate_date_range(range.start_date, range.end_date)?;
        let (snapshot, orders) = tokio::try_join!(
            self.catalog.snapshot(),
            self.orders.orders_opened_between(range),
        )?;
        services_summary(&orders, &snapshot)
    }

    pub async fn parts_total(&self, range: DateRange) -> AppResult<PartsTotal> {
        validate_date_range(range.start_date, range.end_date)?;
        let usages = self.orders.part_usages_between(range).await?;
        parts_total_in(&usages, range)
    }

    pub async fn parts_usage(&self, range: DateRange) -> AppResult<Vec<PartUsageSummary>> {
        validate_date_range(range.start_date, range.end_date)?;
        let (snapshot, usages) = tokio::try_join!(
            self.catalog.snapshot(),
            self.orders.part_usages_between(range),
        )?;
        parts_usage(&usages, &snapshot)
    }

    pub async fn executions(
        &self,
        range: DateRange,
        today: NaiveDate,
    ) -> AppResult<Vec<ExecutionReportRow>> {
        validate_date_range(range.start_date, range.end_date)?;
        let (snapshot, executions, orders) = tokio::try_join!(
            self.catalog.snapshot(),
            self.orders.executions_finalized_between(range),
            self.orders.list_orders(),
        )?;
        let orders: HashMap<Uuid, ServiceOrder> = orders.into_iter().map(|o| (o.id, o)).collect();
        Ok(execution_rows(&executions, &orders, &snapshot, &self.discounts, today))
    }

    pub async fn employee_performance(
        &self,
        range: DateRange,
        today: NaiveDate,
    ) -> AppResult<Vec<EmployeePerformance>> {
        validate_date_range(range.start_date, range.end_date)?;
        let (snapshot, orders) = tokio::try_join!(
            self.catalog.snapshot(),
            self.orders.orders_opened_between(range),
        )?;
        let order_ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
        let executions = self.orders.executions_for_orders(&order_ids).await?;
        employee_performance(&orders, &executions, &snapshot, &self.discounts, today)
    }
}
