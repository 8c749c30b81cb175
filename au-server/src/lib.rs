//! # au-server: backend for the document-query frontend
//!
//! `au-server` is the HTTP service behind the document-query web app. It exposes two endpoints:
//!
//! - `POST /upload` takes a multipart upload with a `file` part, logs its name, content type and
//!   size, and discards the bytes.
//! - `POST /query` takes `{"query": "..."}` and answers with a mock response that echoes the
//!   query and carries a static example payload.
//!
//! Neither endpoint keeps any state. The mock answers live in [`facade`] so a real
//! retrieval backend can replace them without touching the HTTP layer.
//!
//! ## Architecture
//!
//! The HTTP layer is [Axum](https://github.com/tokio-rs/axum). [`build_router`] puts together
//! the routes, the per-route body limit, the CORS policy for browser clients (by default only
//! `http://localhost:3000`, with credentials), the optional OpenAPI docs and request tracing.
//! [`Application`] binds the listener and serves until the shutdown future resolves.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use au_server::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = au_server::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     au_server::telemetry::init_telemetry(config.enable_otel_export)?;
//!
//!     Application::new(config)?
//!         .serve(async {
//!             tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!         })
//!         .await
//! }
//! ```
//!
//! ## Configuration
//!
//! See the [`config`] module for configuration options.
pub mod api;
pub mod config;
pub mod errors;
pub mod facade;
mod openapi;
pub mod telemetry;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

use crate::config::CorsConfig;
use crate::openapi::ApiDoc;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderName, HeaderValue};
use axum::{
    Json, Router,
    routing::{get, post},
};
pub use config::Config;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info, instrument};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

/// Create CORS layer from configuration.
///
/// Methods and headers are mirrored from the preflight request, so an allowed origin may use any
/// of them. Origins outside the list get no `Access-Control-Allow-Origin` header and the browser
/// blocks the response.
fn create_cors_layer(config: &CorsConfig) -> anyhow::Result<CorsLayer> {
    let allow_origin = if config.has_wildcard() {
        AllowOrigin::any()
    } else {
        let mut origins = Vec::new();
        for origin in &config.allowed_origins {
            origins.push(origin.header_value().parse::<HeaderValue>()?);
        }
        AllowOrigin::list(origins)
    };

    let mut cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(config.allow_credentials);

    if !config.exposed_headers.is_empty() {
        let mut exposed = Vec::new();
        for header in &config.exposed_headers {
            exposed.push(header.parse::<HeaderName>()?);
        }
        cors = cors.expose_headers(exposed);
    }

    if let Some(max_age) = config.max_age {
        cors = cors.max_age(Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Build the application router with all endpoints and middleware.
///
/// # Errors
///
/// Returns an error if the CORS settings cannot be turned into header values. Callers are
/// expected to have run [`Config::validate`] first.
#[instrument(skip_all)]
pub fn build_router(config: &Config) -> anyhow::Result<Router> {
    // Unlimited unless configured; axum would otherwise cap multipart bodies at 2MB
    let upload_limit = match config.limits.max_upload_size {
        Some(max) => DefaultBodyLimit::max(max),
        None => DefaultBodyLimit::disable(),
    };

    let mut router = Router::new()
        .route("/upload", post(api::handlers::upload::upload_file).layer(upload_limit))
        .route("/query", post(api::handlers::query::submit_query));

    if config.enable_docs {
        router = router
            .route("/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
            .merge(Scalar::with_url("/docs", ApiDoc::openapi()));
    }

    let router = router.layer(create_cors_layer(&config.cors)?).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

/// Main application struct that owns the router and configuration.
///
/// 1. **Create**: [`Application::new`] validates the configuration and builds the router
/// 2. **Serve**: [`Application::serve`] binds to a TCP port and handles requests until the
///    shutdown future resolves, then lets in-flight requests finish
pub struct Application {
    router: Router,
    config: Config,
}

impl Application {
    /// Create a new application instance
    pub fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting server with configuration: {:#?}", config);

        // tower-http panics on some CORS combinations, so reject them before building the layer
        config.validate()?;
        let router = build_router(&config)?;

        Ok(Self { router, config })
    }

    /// Convert application into a test server (for tests)
    #[cfg(any(test, feature = "test-utils"))]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!("Listening on http://{}", listener.local_addr()?);

        axum::serve(listener, self.router).with_graceful_shutdown(shutdown).await?;

        info!("Shutting down telemetry...");
        telemetry::shutdown_telemetry();

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use crate::config::{Config, CorsOrigin};
    use crate::test_utils::{create_test_app, create_test_app_with_config, create_test_config};
    use axum::http::{Method, StatusCode, header};
    use serde_json::{Value, json};
    use url::Url;

    const FRONTEND: &str = "http://localhost:3000";

    fn header_value(response: &axum_test::TestResponse, name: header::HeaderName) -> Option<&str> {
        response.headers().get(name).map(|v| v.to_str().unwrap())
    }

    #[test_log::test(tokio::test)]
    async fn test_cors_preflight_from_frontend_is_allowed() {
        let app = create_test_app();

        let response = app
            .method(Method::OPTIONS, "/query")
            .add_header(header::ORIGIN, FRONTEND)
            .add_header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .add_header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type,x-custom-header")
            .await;

        response.assert_status(StatusCode::OK);
        assert_eq!(
            header_value(&response, header::ACCESS_CONTROL_ALLOW_ORIGIN),
            Some(FRONTEND)
        );
        assert_eq!(
            header_value(&response, header::ACCESS_CONTROL_ALLOW_CREDENTIALS),
            Some("true")
        );
        assert_eq!(
            header_value(&response, header::ACCESS_CONTROL_ALLOW_METHODS),
            Some("POST")
        );
        assert_eq!(
            header_value(&response, header::ACCESS_CONTROL_ALLOW_HEADERS),
            Some("content-type,x-custom-header")
        );
        assert_eq!(
            header_value(&response, header::ACCESS_CONTROL_MAX_AGE),
            Some("600")
        );
    }

    #[test_log::test(tokio::test)]
    async fn test_cors_request_from_frontend_gets_allow_origin() {
        let app = create_test_app();

        let response = app
            .post("/query")
            .add_header(header::ORIGIN, FRONTEND)
            .json(&json!({"query": "hello"}))
            .await;

        response.assert_status(StatusCode::OK);
        assert_eq!(
            header_value(&response, header::ACCESS_CONTROL_ALLOW_ORIGIN),
            Some(FRONTEND)
        );
        assert_eq!(
            header_value(&response, header::ACCESS_CONTROL_ALLOW_CREDENTIALS),
            Some("true")
        );
    }

    #[test_log::test(tokio::test)]
    async fn test_cors_unlisted_origin_is_not_allowed() {
        let app = create_test_app();

        let preflight = app
            .method(Method::OPTIONS, "/upload")
            .add_header(header::ORIGIN, "http://evil.example.com")
            .add_header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .await;
        assert_eq!(header_value(&preflight, header::ACCESS_CONTROL_ALLOW_ORIGIN), None);

        let response = app
            .post("/query")
            .add_header(header::ORIGIN, "http://evil.example.com")
            .json(&json!({"query": "hello"}))
            .await;
        assert_eq!(header_value(&response, header::ACCESS_CONTROL_ALLOW_ORIGIN), None);
    }

    #[test_log::test(tokio::test)]
    async fn test_cors_configured_origins() {
        let mut config = create_test_config();
        config.cors.allowed_origins = vec![CorsOrigin::Url(Url::parse("https://app.example.com").unwrap())];
        let app = create_test_app_with_config(config);

        let response = app
            .post("/query")
            .add_header(header::ORIGIN, "https://app.example.com")
            .json(&json!({"query": "hello"}))
            .await;
        assert_eq!(
            header_value(&response, header::ACCESS_CONTROL_ALLOW_ORIGIN),
            Some("https://app.example.com")
        );

        // The default frontend origin is no longer on the list
        let response = app
            .post("/query")
            .add_header(header::ORIGIN, FRONTEND)
            .json(&json!({"query": "hello"}))
            .await;
        assert_eq!(header_value(&response, header::ACCESS_CONTROL_ALLOW_ORIGIN), None);
    }

    #[test_log::test(tokio::test)]
    async fn test_cors_wildcard_without_credentials() {
        let mut config = create_test_config();
        config.cors.allowed_origins = vec![CorsOrigin::Wildcard];
        config.cors.allow_credentials = false;
        let app = create_test_app_with_config(config);

        let response = app
            .post("/query")
            .add_header(header::ORIGIN, "http://anywhere.example.com")
            .json(&json!({"query": "hello"}))
            .await;
        assert_eq!(
            header_value(&response, header::ACCESS_CONTROL_ALLOW_ORIGIN),
            Some("*")
        );
    }

    #[test]
    fn test_invalid_config_is_rejected_before_building_router() {
        let mut config = Config::default();
        config.cors.allowed_origins = vec![CorsOrigin::Wildcard];
        config.cors.allow_credentials = true;

        assert!(crate::Application::new(config).is_err());
    }

    #[test_log::test(tokio::test)]
    async fn test_openapi_document_served() {
        let app = create_test_app();

        let response = app.get("/openapi.json").await;

        response.assert_status(StatusCode::OK);
        let doc: Value = response.json();
        assert!(doc["paths"]["/upload"].is_object());
        assert!(doc["paths"]["/query"].is_object());

        app.get("/docs").await.assert_status(StatusCode::OK);
    }

    #[test_log::test(tokio::test)]
    async fn test_docs_can_be_disabled() {
        let mut config = create_test_config();
        config.enable_docs = false;
        let app = create_test_app_with_config(config);

        app.get("/openapi.json").await.assert_status(StatusCode::NOT_FOUND);
        app.get("/docs").await.assert_status(StatusCode::NOT_FOUND);
    }

    #[test_log::test(tokio::test)]
    async fn test_unknown_route_is_not_found() {
        let app = create_test_app();

        app.post("/ingest").await.assert_status(StatusCode::NOT_FOUND);
    }

    #[test_log::test(tokio::test)]
    async fn test_wrong_method_is_rejected() {
        let app = create_test_app();

        app.get("/query").await.assert_status(StatusCode::METHOD_NOT_ALLOWED);
    }
}
