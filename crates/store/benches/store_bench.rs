use chrono::Utc;
use criterion::{Criterion, criterion_group, criterion_main};
use domain::{LineItem, Money, Order, Product, ProductId, UserId};
use store::{CatalogStore, InMemoryCatalog, InMemoryOrders, OrderStore};

fn make_product(id: &str, stock: u32) -> Product {
    Product::new(id, "Widget", Money::from_cents(1000), stock, "tools")
}

fn make_order(user_id: UserId) -> Order {
    let items = vec![
        LineItem::new("P1", "Widget", 2, Money::from_cents(100)),
        LineItem::new("P2", "Gadget", 1, Money::from_cents(50)),
    ];
    Order::new(user_id, items, None, None, Utc::now())
}

fn bench_decrease_stock(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("store/decrease_stock", |b| {
        b.iter(|| {
            rt.block_on(async {
                let catalog = InMemoryCatalog::new();
                catalog
                    .upsert_product(&make_product("SKU-001", 1_000_000))
                    .await
                    .unwrap();
                catalog
                    .decrease_stock(&ProductId::new("SKU-001"), 3)
                    .await
                    .unwrap();
            });
        });
    });
}

fn bench_get_products_batch_10(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let catalog = InMemoryCatalog::new();

    let ids: Vec<ProductId> = (0..10).map(|i| ProductId::new(format!("SKU-{i:03}"))).collect();
    rt.block_on(async {
        for id in &ids {
            catalog
                .upsert_product(&make_product(id.as_str(), 100))
                .await
                .unwrap();
        }
    });

    c.bench_function("store/get_products_batch_10", |b| {
        b.iter(|| {
            rt.block_on(async {
                let products = catalog.get_products(&ids).await.unwrap();
                assert_eq!(products.len(), 10);
            });
        });
    });
}

fn bench_insert_order(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("store/insert_order", |b| {
        b.iter(|| {
            rt.block_on(async {
                let orders = InMemoryOrders::new();
                orders.insert(&make_order(UserId::new())).await.unwrap();
            });
        });
    });
}

fn bench_versioned_update(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("store/versioned_update", |b| {
        b.iter(|| {
            rt.block_on(async {
                let orders = InMemoryOrders::new();
                let order = make_order(UserId::new());
                orders.insert(&order).await.unwrap();
                orders.update(&order).await.unwrap();
            });
        });
    });
}

fn bench_list_by_user_100(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let orders = InMemoryOrders::new();
    let user_id = UserId::new();

    // Pre-populate with 100 orders for one user
    rt.block_on(async {
        for _ in 0..100 {
            orders.insert(&make_order(user_id)).await.unwrap();
        }
    });

    c.bench_function("store/list_by_user_100", |b| {
        b.iter(|| {
            rt.block_on(async {
                let listed = orders.list_by_user(user_id).await.unwrap();
                assert_eq!(listed.len(), 100);
            });
        });
    });
}

criterion_group!(
    benches,
    bench_decrease_stock,
    bench_get_products_batch_10,
    bench_insert_order,
    bench_versioned_update,
    bench_list_by_user_100,
);
criterion_main!(benches);
