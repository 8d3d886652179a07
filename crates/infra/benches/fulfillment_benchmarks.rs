use criterion::{BatchSize, BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use materialtrace_auth::{InvocationContext, Role};
use materialtrace_core::PoId;
use materialtrace_events::{EventEnvelope, InMemoryEventBus};
use materialtrace_fulfillment::model::{Company, LineItem, PurchaseOrder};
use materialtrace_fulfillment::view::compose;
use materialtrace_fulfillment::{FulfillmentEvent, ItemStatus, ManufacturerDiscount, Status};
use materialtrace_infra::lifecycle::AcceptanceInput;
use materialtrace_infra::{FulfillmentConfig, InMemoryKvStore, OrderLifecycle};

type Lifecycle = OrderLifecycle<Arc<InMemoryKvStore>, Arc<InMemoryEventBus<EventEnvelope<FulfillmentEvent>>>>;

static NEXT_PO: AtomicU64 = AtomicU64::new(1);

fn lifecycle() -> Lifecycle {
    OrderLifecycle::new(
        Arc::new(InMemoryKvStore::new()),
        Arc::new(InMemoryEventBus::new()),
        FulfillmentConfig::default(),
    )
}

fn customer() -> InvocationContext {
    InvocationContext::new(Role::Customer, "bench-customer")
}

fn distributor() -> InvocationContext {
    InvocationContext::new(Role::Distributor, "bench-distributor")
}

fn order(lines: u32) -> PurchaseOrder {
    let id = NEXT_PO.fetch_add(1, Ordering::Relaxed);
    PurchaseOrder {
        po_id: PoId::new(format!("bench-po-{id}")).unwrap(),
        po_number: 10_000 + (id % 50_000) as u32,
        line_items: (1..=lines)
            .map(|n| LineItem {
                line_number: n,
                material_id: format!("m{n}"),
                quantity: 4,
                unit_price: 125.0,
                ship_to_location: Company { latitude: 41.8781, longitude: -87.6298, ..Company::default() },
                ..LineItem::default()
            })
            .collect(),
        ..PurchaseOrder::default()
    }
}

/// Every third line to each manufacturer with half the quantity, the rest
/// from stock.
fn decisions(po: &PurchaseOrder) -> PurchaseOrder {
    let mut update = po.clone();
    for line in &mut update.line_items {
        let (assigned_to, assigned_qty) = match line.line_number % 3 {
            0 => ("Manufacturer 1", 2),
            1 => ("Manufacturer 2", 2),
            _ => ("", 0),
        };
        line.assigned_to = assigned_to.to_string();
        line.assigned_qty = assigned_qty;
    }
    update
}

fn acceptance(update: PurchaseOrder) -> AcceptanceInput {
    AcceptanceInput {
        order: update,
        accepted: true,
        timestamp: 200,
        rejection_reason: String::new(),
        discounts: vec![
            ManufacturerDiscount { name: "Manufacturer 1".to_string(), discount: 10 },
            ManufacturerDiscount { name: "Manufacturer 2".to_string(), discount: 15 },
        ],
        status: ItemStatus::new("Distributor", Status::Accepted, 200),
    }
}

fn bench_acceptance(c: &mut Criterion) {
    let mut group = c.benchmark_group("acceptance");

    for lines in [1u32, 10, 100].iter() {
        group.throughput(Throughput::Elements(u64::from(*lines)));
        group.bench_with_input(BenchmarkId::new("accept_and_split", lines), lines, |b, &lines| {
            let lifecycle = lifecycle();
            let initial = ItemStatus::new("Utility", Status::Open, 100);
            b.iter_batched(
                || {
                    let po = order(lines);
                    let update = decisions(&po);
                    lifecycle.create_order(&customer(), po, &initial).unwrap();
                    acceptance(update)
                },
                |input| black_box(lifecycle.accept_or_reject(&distributor(), input).unwrap()),
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn bench_view_composition(c: &mut Criterion) {
    let mut group = c.benchmark_group("view_composition");

    for lines in [10u32, 100].iter() {
        let lifecycle = lifecycle();
        let initial = ItemStatus::new("Utility", Status::Open, 100);
        let po = order(*lines);
        let update = decisions(&po);
        let po_id = po.po_id.clone();
        lifecycle.create_order(&customer(), po, &initial).unwrap();
        lifecycle.accept_or_reject(&distributor(), acceptance(update)).unwrap();

        let store = lifecycle.store();
        let primary = store.require_purchase_order(&po_id).unwrap();
        let parts = store.partition_set(Role::Distributor, &po_id).unwrap();

        group.throughput(Throughput::Elements(u64::from(*lines)));
        group.bench_with_input(BenchmarkId::new("compose", lines), lines, |b, _| {
            b.iter(|| black_box(compose(primary.clone(), &parts)));
        });
        group.bench_with_input(BenchmarkId::new("load_and_compose", lines), lines, |b, _| {
            b.iter(|| {
                let parts = store.partition_set(Role::Distributor, &po_id).unwrap();
                black_box(compose(primary.clone(), &parts))
            });
        });
    }

    group.bench_function("all_orders_50", |b| {
        let lifecycle = lifecycle();
        let initial = ItemStatus::new("Utility", Status::Open, 100);
        for _ in 0..50 {
            let po = order(5);
            let update = decisions(&po);
            lifecycle.create_order(&customer(), po, &initial).unwrap();
            lifecycle.accept_or_reject(&distributor(), acceptance(update)).unwrap();
        }
        b.iter(|| black_box(lifecycle.queries().all_orders(&distributor()).unwrap()));
    });

    group.finish();
}

criterion_group!(benches, bench_acceptance, bench_view_composition);
criterion_main!(benches);
