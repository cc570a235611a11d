use axum::{
    Router,
    extract::Extension,
    routing::{get, post},
};
use workday_search::config::ServiceConfig;
use workday_search::employees::types::Employee;
use workday_search::executor::handlers::{handle_clear_tasks, handle_queue_stats};
use workday_search::executor::queue::IndexQueue;
use workday_search::index::hooks::Indexer;
use workday_search::index::mutator::IndexMutator;
use workday_search::search::engine::SearchEngine;
use workday_search::search::handlers::{handle_exact_search, handle_ranked_search, handle_suggest};
use workday_search::storage::memory::{MemoryEmployees, MemoryReverseIndex};
use workday_search::storage::{EmployeeStore, ReverseIndexStore};

use anyhow::Context;
use std::path::Path;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let config = match ServiceConfig::from_args(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("{}", ServiceConfig::USAGE);
            eprintln!("Example: {} --bind 127.0.0.1:8080 --seed staff.json", args[0]);
            std::process::exit(1);
        }
    };

    // 1. Stores:
    let (index, employees, memory_employees) = open_stores(&config).await?;

    // 2. Indexing pipeline:
    let mutator = Arc::new(IndexMutator::new(index.clone(), employees.clone()));
    let queue = Arc::new(IndexQueue::on_current_runtime(mutator));
    let indexer = Indexer::new(queue.clone(), employees.clone());

    // 3. Seed data:
    if let Some(path) = &config.seed_path {
        match &memory_employees {
            Some(store) => seed(path, store, &indexer)?,
            None => tracing::warn!("--seed is only supported with the in-memory store, ignoring"),
        }
    }

    // 4. Search:
    let engine = Arc::new(SearchEngine::new(index, employees, config.search.clone()));

    // 5. HTTP Router:
    let app = Router::new()
        .route("/v1/search/basic", post(handle_exact_search))
        .route("/v1/search/full", post(handle_ranked_search))
        .route("/v1/search/suggest", post(handle_suggest))
        .route("/v1/clear-tasks", post(handle_clear_tasks))
        .route("/v1/index/stats", get(handle_queue_stats))
        .layer(Extension(engine))
        .layer(Extension(queue));

    // 6. Start HTTP server:
    tracing::info!("HTTP server listening on {}", config.bind_addr);
    tracing::info!("Press Ctrl+C to shutdown");

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

type Stores = (
    Arc<dyn ReverseIndexStore>,
    Arc<dyn EmployeeStore>,
    Option<Arc<MemoryEmployees>>,
);

#[cfg(feature = "postgres")]
async fn open_stores(config: &ServiceConfig) -> anyhow::Result<Stores> {
    use workday_search::storage::postgres::{self, PgEmployees, PgReverseIndex};

    if let Some(url) = &config.database_url {
        let pool = postgres::connect(url).await?;
        postgres::migrate(&pool).await?;
        let index: Arc<dyn ReverseIndexStore> = Arc::new(PgReverseIndex::new(pool.clone()));
        let employees: Arc<dyn EmployeeStore> = Arc::new(PgEmployees::new(pool));
        return Ok((index, employees, None));
    }

    Ok(memory_stores())
}

#[cfg(not(feature = "postgres"))]
async fn open_stores(config: &ServiceConfig) -> anyhow::Result<Stores> {
    if config.database_url.is_some() {
        tracing::warn!("Built without the `postgres` feature; using in-memory stores");
    }
    Ok(memory_stores())
}

fn memory_stores() -> Stores {
    tracing::info!("Using in-memory stores");
    let memory = Arc::new(MemoryEmployees::new());
    let index: Arc<dyn ReverseIndexStore> = Arc::new(MemoryReverseIndex::new());
    let employees: Arc<dyn EmployeeStore> = memory.clone();
    (index, employees, Some(memory))
}

/// Loads a JSON array of employees and queues each for indexing.
fn seed(path: &Path, store: &MemoryEmployees, indexer: &Indexer) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read seed file {}", path.display()))?;
    let records: Vec<Employee> = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse seed file {}", path.display()))?;

    let count = records.len();
    for employee in records {
        store.insert(employee.clone());
        if let Err(e) = indexer.on_entity_created(&employee) {
            tracing::warn!("Skipping employee {:?} from seed: {}", employee.id, e);
        }
    }

    tracing::info!("Seeded {} employees from {}", count, path.display());
    Ok(())
}
