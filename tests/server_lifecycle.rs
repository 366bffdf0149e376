//! End-to-end tests against a real listener and database file.

use std::time::Duration;

use todo_service::config::ServiceConfig;
use todo_service::lifecycle::{DatabaseTeardown, Service, Shutdown};
use todo_service::observability::LogFiles;
use todo_service::storage::{SqliteStore, TodoRepository};

mod common;

fn test_config() -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.database.path = common::temp_path("todo", "db").display().to_string();
    config.logging.access_log = common::temp_path("access", "log").display().to_string();
    config.logging.error_log = common::temp_path("error", "log").display().to_string();
    config
}

fn cleanup(config: &ServiceConfig) {
    let _ = std::fs::remove_file(&config.database.path);
    let _ = std::fs::remove_file(&config.logging.access_log);
    let _ = std::fs::remove_file(&config.logging.error_log);
}

#[tokio::test]
async fn test_serves_survives_fault_and_persists() {
    let config = test_config();
    let log_files = LogFiles::open(&config.logging).unwrap();

    let service = Service::bootstrap(config.clone(), &log_files).await.unwrap();
    let addr = service.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = tokio::spawn(service.run(shutdown.subscribe()));

    let client = reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap();
    let base = format!("http://{}", addr);

    let payload = r#"{"title":"ship it","body":"before friday","status":false}"#;
    let res = client
        .post(format!("{base}/todos"))
        .body(payload)
        .send()
        .await
        .expect("service unreachable");
    assert_eq!(res.status(), 201);
    let created: serde_json::Value = res.json().await.unwrap();

    let res = client.get(format!("{base}/todos/error")).send().await.unwrap();
    assert_eq!(res.status(), 500);

    let res = client.get(format!("{base}/todos")).send().await.unwrap();
    assert_eq!(res.status(), 200);
    let listed: Vec<serde_json::Value> = res.json().await.unwrap();
    assert_eq!(listed, vec![created.clone()]);

    shutdown.trigger();
    let teardown = server.await.unwrap().unwrap();
    assert_eq!(teardown, DatabaseTeardown::Closed);

    let access_log = std::fs::read_to_string(&config.logging.access_log).unwrap();
    assert!(access_log.contains(payload));

    // the row survives a reopen
    let store = SqliteStore::open(&config.database.path).unwrap();
    let todos = store.find_all().unwrap();
    assert_eq!(todos.len(), 1);
    assert_eq!(serde_json::to_value(&todos[0]).unwrap(), created);
    store.close().unwrap();

    cleanup(&config);
}

#[tokio::test]
async fn test_bind_failure_is_reported() {
    let mut config = test_config();
    let occupied = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    config.listener.bind_address = occupied.local_addr().unwrap().to_string();
    let log_files = LogFiles::open(&config.logging).unwrap();

    let err = Service::bootstrap(config.clone(), &log_files).await.err().unwrap();
    assert!(err.to_string().starts_with("failed to bind"));

    cleanup(&config);
}
