include!("../../lib.rs");
use std::sync::Arc;
use lambda_http::{run, Error};
use crate::core::controller::AppState;
use crate::core::domain::Configuration;
use crate::core::repository::RepositoryStore;
use crate::library::controller::build_router;
use crate::library::factory::create_library_service;
use crate::utils::logs::setup_tracing;

const DEV_MODE: bool = true;

#[tokio::main]
async fn main() -> Result<(), Error> {
    setup_tracing();

    let (branch, default_store) = if DEV_MODE {
        std::env::set_var("AWS_LAMBDA_FUNCTION_NAME", "_");
        std::env::set_var("AWS_LAMBDA_FUNCTION_MEMORY_SIZE", "4096");
        std::env::set_var("AWS_LAMBDA_FUNCTION_VERSION", "1");
        std::env::set_var("AWS_LAMBDA_RUNTIME_API", "http://[::]:9000/.rt");
        ("dev", RepositoryStore::LocalDynamoDB)
    } else {
        ("prod", RepositoryStore::DynamoDB)
    };
    let store = std::env::var("LIBRARY_STORE")
        .map(RepositoryStore::from)
        .unwrap_or(default_store);
    tracing::info!(branch, store = store.to_string().as_str(), "starting library service");

    let config = Configuration::new(branch);
    let service = create_library_service(&config, store).await;
    let app = build_router::<lambda_http::Body>(AppState::new(Arc::from(service)));

    run(app).await
}
