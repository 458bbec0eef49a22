//! API server entry point.

use domain::{Money, Product};
use sqlx::postgres::PgPoolOptions;
use store::{CatalogStore, InMemoryCatalog, InMemoryOrders, PostgresStore};
use tokio::signal;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use api::config::Config;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }
}

/// Seeds the demo catalog used when no database is configured.
async fn seed_demo_catalog(catalog: &InMemoryCatalog) {
    let products = [
        Product::new(
            "espresso-beans",
            "Espresso Beans 1kg",
            Money::from_cents(1850),
            40,
            "coffee",
        ),
        Product::new(
            "pour-over-kettle",
            "Pour Over Kettle",
            Money::from_cents(4900),
            12,
            "gear",
        ),
        Product::new(
            "ceramic-mug",
            "Ceramic Mug",
            Money::from_cents(1200),
            60,
            "gear",
        ),
        Product::new(
            "filter-papers",
            "Filter Papers x100",
            Money::from_cents(650),
            200,
            "supplies",
        ),
    ];

    for product in &products {
        catalog
            .upsert_product(product)
            .await
            .expect("failed to seed demo catalog");
    }
    tracing::info!(count = products.len(), "seeded demo catalog");
}

#[tokio::main]
async fn main() {
    let config = Config::from_env();

    // 1. Initialize tracing
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 2. Install Prometheus metrics recorder
    let metrics_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    // 3. Wire stores: PostgreSQL when configured, in-memory otherwise
    let app = match &config.database_url {
        Some(database_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(database_url)
                .await
                .expect("failed to connect to PostgreSQL");
            let store = PostgresStore::new(pool);
            store
                .run_migrations()
                .await
                .expect("failed to run migrations");
            tracing::info!("using PostgreSQL stores");
            api::create_app(api::create_state(store.clone(), store), metrics_handle)
        }
        None => {
            let catalog = InMemoryCatalog::new();
            seed_demo_catalog(&catalog).await;
            tracing::info!("DATABASE_URL not set, using in-memory stores");
            api::create_app(
                api::create_state(catalog, InMemoryOrders::new()),
                metrics_handle,
            )
        }
    };

    // 4. Start server
    let addr = config.addr();
    tracing::info!(%addr, "starting API server");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind address");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    tracing::info!("server shut down gracefully");
}
