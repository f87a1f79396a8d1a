use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use chrono::Utc;
use rust_decimal::Decimal;

use tradepost_core::{CustomerId, OrderId, OrderLineId, ProductId};
use tradepost_inventory::Product;
use tradepost_orders::{Order, OrderLine, OrderStatus, merge_line};

fn bench_order(status: OrderStatus) -> Order {
    Order {
        id: OrderId::new(1),
        customer_id: CustomerId::new(7),
        status,
        created_at: Utc::now(),
    }
}

fn bench_product(stock_quantity: i64) -> Product {
    Product {
        id: ProductId::new(7),
        name: "Bench Product".to_string(),
        price: Decimal::new(1999, 2),
        stock_quantity,
    }
}

fn bench_line(quantity: i64) -> OrderLine {
    OrderLine {
        id: OrderLineId::new(11),
        order_id: OrderId::new(1),
        product_id: ProductId::new(7),
        quantity,
        unit_price: Decimal::new(1999, 2),
    }
}

fn bench_line_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("line_merge");
    group.sample_size(1000);

    group.bench_function("first_add", |b| {
        b.iter(|| merge_line(None, black_box(3), black_box(Decimal::new(1999, 2))));
    });

    group.bench_function("repeat_add", |b| {
        let existing = bench_line(5);
        b.iter(|| {
            merge_line(
                Some(black_box(&existing)),
                black_box(2),
                black_box(Decimal::new(2499, 2)),
            )
        });
    });

    group.finish();
}

/// The full pure decision an add makes between its queries: status gate,
/// availability check, merge, checked decrement.
fn bench_mutation_decision_path(c: &mut Criterion) {
    let mut group = c.benchmark_group("mutation_decision_path");
    group.sample_size(1000);

    group.bench_function("create_path", |b| {
        let order = bench_order(OrderStatus::New);
        let product = bench_product(1_000);

        b.iter(|| {
            order.ensure_mutable().unwrap();
            product.ensure_available(black_box(3)).unwrap();
            let merge = merge_line(None, 3, product.price);
            let remaining = product.decremented(3).unwrap();
            black_box((merge, remaining));
        });
    });

    group.bench_function("merge_path", |b| {
        let order = bench_order(OrderStatus::Processing);
        let product = bench_product(1_000);
        let existing = bench_line(4);

        b.iter(|| {
            order.ensure_mutable().unwrap();
            product.ensure_available(black_box(2)).unwrap();
            let merge = merge_line(Some(&existing), 2, product.price);
            let remaining = product.decremented(2).unwrap();
            black_box((merge, remaining));
        });
    });

    group.finish();
}

/// Sequential single-unit adds draining a product to zero, merging into one
/// line the whole way down.
fn bench_sequential_drain(c: &mut Criterion) {
    let mut group = c.benchmark_group("sequential_drain");

    for adds in [10i64, 100, 1_000].iter() {
        group.throughput(Throughput::Elements(*adds as u64));
        group.bench_with_input(BenchmarkId::new("adds", adds), adds, |b, &count| {
            b.iter(|| {
                let mut product = bench_product(count);
                let mut line: Option<OrderLine> = None;

                for _ in 0..count {
                    product.ensure_available(1).unwrap();
                    let merge = merge_line(line.as_ref(), 1, product.price);
                    line = Some(OrderLine {
                        id: OrderLineId::new(11),
                        order_id: OrderId::new(1),
                        product_id: product.id,
                        quantity: merge.quantity,
                        unit_price: merge.unit_price,
                    });
                    product.stock_quantity = product.decremented(1).unwrap();
                }

                black_box((line, product));
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_line_merge,
    bench_mutation_decision_path,
    bench_sequential_drain
);
criterion_main!(benches);
