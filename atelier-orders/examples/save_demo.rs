// atelier-orders/examples/save_demo.rs
// Walks an order through create, edit, and a rejected stale save
// against the in-memory provider. Run with:
//   cargo run -p atelier-orders --example save_demo

use atelier_client::{MemoryProvider, OrderApi, TracingInvalidator, TracingNotifier};
use atelier_orders::{OrderAggregate, OrderSaveService, money};
use chrono::NaiveDate;
use shared::models::{DetailFields, OrderDraft, PaymentFields};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn cut_piece(width_mm: f64, height_mm: f64, quantity: i32, rate_per_m2: f64) -> DetailFields {
    let area = money::area_m2(width_mm, height_mm, quantity);
    DetailFields {
        material_id: 21,
        finish_id: Some(3),
        width_mm,
        height_mm,
        quantity,
        area_m2: area,
        line_cost: money::line_cost(area, rate_per_m2),
        note: None,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .init();

    let provider = Arc::new(MemoryProvider::new());
    let api = OrderApi::new(provider.clone());
    let service = OrderSaveService::new(
        api.clone(),
        Arc::new(TracingInvalidator),
        Arc::new(TracingNotifier),
    );

    // 1. Create an order with two cut pieces and a deposit
    let mut aggregate = OrderAggregate::new(OrderDraft {
        client_id: 11,
        manager_id: Some(2),
        status_id: 1,
        payment_status_id: 1,
        ordered_on: NaiveDate::from_ymd_opt(2026, 8, 1),
        due_on: NaiveDate::from_ymd_opt(2026, 9, 15),
        fitted_on: None,
        drawing_file: Some("plans/order-drawing.pdf".to_string()),
        measure_sheet: None,
    });
    aggregate.details.push(cut_piece(600.0, 400.0, 2, 120.0));
    aggregate.details.push(cut_piece(1200.0, 800.0, 1, 95.0));
    aggregate.payments.push(PaymentFields {
        amount: 50.0,
        method_id: 1,
        paid_on: NaiveDate::from_ymd_opt(2026, 8, 1),
        reference: Some("TRF-0042".to_string()),
        note: None,
    });

    let report = service.save(&mut aggregate).await?;
    tracing::info!(
        order_id = report.order_id,
        total = report.total_amount,
        "Order created"
    );

    // 2. Edit: a third copy of the first piece, same rate
    let key = aggregate.details.entries()[0].key;
    if let Some(fields) = aggregate.details.get_mut(key) {
        fields.quantity = 3;
        fields.area_m2 = money::area_m2(fields.width_mm, fields.height_mm, 3);
        fields.line_cost = money::line_cost(fields.area_m2, 120.0);
    }
    let report = service.save(&mut aggregate).await?;
    tracing::info!(total = report.total_amount, "Order updated");

    // 3. A stale copy loses to a concurrent edit
    let mut stale = OrderAggregate::load(&api, report.order_id).await?;
    let mut other = OrderAggregate::load(&api, report.order_id).await?;
    other.draft.status_id = 2;
    service.save(&mut other).await?;

    if let Err(e) = service.save(&mut stale).await {
        tracing::warn!(error = %e, "Stale save rejected");
    }

    Ok(())
}
