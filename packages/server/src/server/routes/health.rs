use std::time::{Duration, Instant};

use axum::{extract::Extension, http::StatusCode, Json};
use serde::Serialize;
use sqlx::PgPool;

use crate::server::app::AppState;

const DB_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Serialize)]
pub struct HealthResponse {
    healthy: bool,
    version: &'static str,
    database: DatabaseHealth,
    pool: PoolHealth,
}

#[derive(Serialize)]
pub struct DatabaseHealth {
    reachable: bool,
    latency_ms: Option<u128>,
    /// Newest applied migration version
    schema_version: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize)]
pub struct PoolHealth {
    size: u32,
    idle: usize,
    max: u32,
}

async fn probe_database(pool: &PgPool) -> DatabaseHealth {
    let started = Instant::now();
    let probe = sqlx::query_scalar::<_, Option<i64>>(
        "SELECT MAX(version) FROM _sqlx_migrations WHERE success",
    )
    .fetch_one(pool);

    match tokio::time::timeout(DB_TIMEOUT, probe).await {
        Ok(Ok(schema_version)) => DatabaseHealth {
            reachable: true,
            latency_ms: Some(started.elapsed().as_millis()),
            schema_version,
            error: None,
        },
        Ok(Err(e)) => DatabaseHealth {
            reachable: false,
            latency_ms: None,
            schema_version: None,
            error: Some(format!("Query failed: {}", e)),
        },
        Err(_) => DatabaseHealth {
            reachable: false,
            latency_ms: None,
            schema_version: None,
            error: Some(format!("No answer within {}s", DB_TIMEOUT.as_secs())),
        },
    }
}

/// Liveness plus database reachability. 503 when the database does not answer.
pub async fn health_handler(
    Extension(state): Extension<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let database = probe_database(&state.db_pool).await;
    let pool = PoolHealth {
        size: state.db_pool.size(),
        idle: state.db_pool.num_idle(),
        max: state.db_pool.options().get_max_connections(),
    };

    let status = if database.reachable {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(HealthResponse {
            healthy: database.reachable,
            version: env!("CARGO_PKG_VERSION"),
            database,
            pool,
        }),
    )
}
