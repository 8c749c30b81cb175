//! Test utilities for integration testing (available with `test-utils` feature).

use axum_test::TestServer;

use crate::config::Config;

/// Config used by the HTTP tests: loopback, ephemeral port, docs on, no OTLP.
pub fn create_test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        enable_otel_export: false,
        ..Default::default()
    }
}

pub fn create_test_app() -> TestServer {
    create_test_app_with_config(create_test_config())
}

pub fn create_test_app_with_config(config: Config) -> TestServer {
    crate::Application::new(config)
        .expect("Failed to create application")
        .into_test_server()
}
