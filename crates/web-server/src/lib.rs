use axum::{
    routing::{get, post},
    Router,
};
use configuration::Settings;
use database::DbRepository;
use std::sync::Arc;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use treatments::TreatmentService;

pub mod envelope;
pub mod error;
pub mod handlers;

pub use envelope::Envelope;

/// The shared application state that all handlers can access.
///
/// Only the pool is shared; each request opens its own unit of work.
#[derive(Clone)]
pub struct AppState {
    pub service: TreatmentService,
}

/// Builds the application router over an already-migrated repository.
pub fn build_router(db_repo: DbRepository) -> Router {
    let app_state = Arc::new(AppState { service: TreatmentService::new(db_repo) });
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(Any)
        .allow_headers(AllowHeaders::any());

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/Create", post(handlers::create))
        .route("/api/Read", get(handlers::read))
        .route("/api/Update", post(handlers::update))
        .route("/api/Delete", post(handlers::delete))
        .route("/api/VerifyFinalTreatments", get(handlers::verify_final_treatments))
        .with_state(app_state)
        .layer(cors)
        // This middleware will automatically log information about every incoming request.
        .layer(TraceLayer::new_for_http())
}

/// The main function to configure and run the web server.
///
/// Tracing must already be initialized by the caller.
pub async fn run_server(settings: &Settings) -> anyhow::Result<()> {
    let addr = settings.server.socket_addr()?;

    let db_pool = database::connect(&settings.database).await?;
    database::run_migrations(&db_pool).await?;
    let app = build_router(DbRepository::new(db_pool));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Web server started and listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Web server stopped.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Method, Request, StatusCode},
    };
    use database::{connect_in_memory, run_migrations};
    use tower::ServiceExt;

    async fn app() -> (Router, DbRepository) {
        let pool = connect_in_memory().await.unwrap();
        run_migrations(&pool).await.unwrap();
        let repo = DbRepository::new(pool);
        (build_router(repo.clone()), repo)
    }

    async fn call(app: &Router, method: Method, uri: &str) -> (StatusCode, serde_json::Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn success() -> serde_json::Value {
        serde_json::json!({ "responseCode": "0", "responseDesc": "SUCCESS" })
    }

    fn failure() -> serde_json::Value {
        serde_json::json!({ "responseCode": "1", "responseDesc": "ERROR" })
    }

    #[tokio::test]
    async fn full_sequence_returns_success_envelopes() {
        let (app, _) = app().await;
        let steps = [
            (Method::POST, "/api/Create"),
            (Method::GET, "/api/Read"),
            (Method::POST, "/api/Update"),
            (Method::POST, "/api/Delete"),
            (Method::GET, "/api/VerifyFinalTreatments"),
        ];
        for (method, uri) in steps {
            let (status, body) = call(&app, method, uri).await;
            assert_eq!(status, StatusCode::OK, "{uri}");
            assert_eq!(body, success(), "{uri}");
        }
    }

    #[tokio::test]
    async fn repeated_create_multiplies_rows() {
        let (app, repo) = app().await;
        call(&app, Method::POST, "/api/Create").await;
        call(&app, Method::POST, "/api/Create").await;
        assert_eq!(repo.counts().await.unwrap().total(), 18);
    }

    #[tokio::test]
    async fn second_delete_is_an_error() {
        let (app, repo) = app().await;
        call(&app, Method::POST, "/api/Create").await;

        let (status, _) = call(&app, Method::POST, "/api/Delete").await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = call(&app, Method::POST, "/api/Delete").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, failure());
        assert_eq!(repo.counts().await.unwrap().treatments, 3);
    }

    #[tokio::test]
    async fn update_on_empty_store_succeeds_without_changes() {
        let (app, repo) = app().await;
        let (status, body) = call(&app, Method::POST, "/api/Update").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, success());
        assert_eq!(repo.counts().await.unwrap().total(), 0);
    }

    #[tokio::test]
    async fn reads_return_only_the_envelope() {
        let (app, _) = app().await;
        for uri in ["/api/Read", "/api/VerifyFinalTreatments"] {
            assert_eq!(call(&app, Method::GET, uri).await.1, success());
        }

        call(&app, Method::POST, "/api/Create").await;
        for uri in ["/api/Read", "/api/VerifyFinalTreatments"] {
            assert_eq!(call(&app, Method::GET, uri).await.1, success());
        }
    }

    #[tokio::test]
    async fn request_bodies_are_ignored() {
        let (app, repo) = app().await;
        call(&app, Method::POST, "/api/Create").await;

        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/Update")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"doctor_id": 99, "patient_id": 99}"#))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(repo.counts().await.unwrap().treatments, 5);
    }

    #[tokio::test]
    async fn store_failures_become_error_envelopes() {
        let (app, repo) = app().await;
        repo.pool().close().await;

        for (method, uri) in [(Method::POST, "/api/Create"), (Method::GET, "/api/Read")] {
            let (status, body) = call(&app, method, uri).await;
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(body, failure());
        }
    }
}
