use std::sync::Arc;

use pipecrm_api::app::AppServices;

#[tokio::main]
async fn main() {
    pipecrm_observability::init();

    // Token signing depends on this; there is no safe default.
    let Ok(secret) = std::env::var("SECRET_KEY") else {
        tracing::error!("SECRET_KEY not set; refusing to start");
        std::process::exit(1);
    };

    let services = match std::env::var("DATABASE_URL") {
        Ok(url) => {
            let pool = match sqlx::PgPool::connect(&url).await {
                Ok(pool) => pool,
                Err(e) => {
                    tracing::error!(error = %e, "failed to connect to database");
                    std::process::exit(1);
                }
            };
            tracing::info!("using postgres stores");
            AppServices::postgres(pool, &secret)
        }
        Err(_) => {
            tracing::warn!("DATABASE_URL not set; using in-memory stores");
            AppServices::in_memory(&secret)
        }
    };

    let app = pipecrm_api::app::build_app(Arc::new(services));

    let listener = tokio::net::TcpListener::bind("0.0.0.0:8080")
        .await
        .expect("failed to bind 0.0.0.0:8080");

    tracing::info!("listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
