use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::routing::get;
use axum::{Json, Router};
use tokio::task::JoinHandle;

use relay_api::{ErrorKind, Record, RecordStore};
use store_http::HttpStore;

#[derive(Clone, Default)]
struct Backend {
    records: Arc<Mutex<Vec<serde_json::Value>>>,
    accept: Arc<Mutex<Vec<String>>>,
}

async fn list(State(backend): State<Backend>, headers: HeaderMap) -> Json<Vec<serde_json::Value>> {
    if let Some(accept) = headers.get(header::ACCEPT).and_then(|v| v.to_str().ok()) {
        backend.accept.lock().unwrap().push(accept.to_string());
    }
    Json(backend.records.lock().unwrap().clone())
}

async fn create(State(backend): State<Backend>, Json(body): Json<serde_json::Value>) -> StatusCode {
    backend.records.lock().unwrap().push(body);
    StatusCode::CREATED
}

async fn spawn_backend(backend: Backend) -> (SocketAddr, JoinHandle<()>) {
    let router = Router::new()
        .route("/api/notificatons", get(list).post(create))
        .route("/api/broken", get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "maintenance") }))
        .route("/api/garbled", get(|| async { "not json" }))
        .with_state(backend);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    (addr, handle)
}

fn store(addr: SocketAddr, path: &str) -> HttpStore {
    HttpStore::new(&format!("http://{addr}/api/"), path, Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn lists_records_in_store_order() {
    let backend = Backend::default();
    backend.records.lock().unwrap().extend([
        serde_json::json!({"Id": 1, "Location": "Location:Lab", "MachineName": "Machine:pi", "MovementDetected": "08:00"}),
        serde_json::json!({"Id": 2, "Location": "Location:Lab", "MachineName": "Machine:pi", "MovementDetected": "08:05"}),
    ]);
    let (addr, handle) = spawn_backend(backend.clone()).await;

    let store = store(addr, "notificatons");
    let records = store.list().await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(
        store.latest().await.unwrap(),
        Some(Record::new("Location:Lab", "Machine:pi", "08:05"))
    );
    assert_eq!(backend.accept.lock().unwrap()[0], "application/json");

    handle.abort();
}

#[tokio::test]
async fn null_fields_in_history_do_not_block_latest() {
    let backend = Backend::default();
    backend.records.lock().unwrap().extend([
        serde_json::json!({"Id": 1, "Location": "Unit-Test", "MachineName": null, "MovementDetected": "#UNIT-TEST"}),
        serde_json::json!({"Id": 2, "Location": null}),
        serde_json::json!({"Id": 3, "Location": "Location:Lab", "MachineName": "Machine:pi", "MovementDetected": "08:05"}),
    ]);
    let (addr, handle) = spawn_backend(backend).await;

    let store = store(addr, "notificatons");
    let records = store.list().await.unwrap();
    assert_eq!(records[0], Record::new("Unit-Test", "", "#UNIT-TEST"));
    assert_eq!(records[1], Record::new("", "", ""));
    assert_eq!(
        store.latest().await.unwrap(),
        Some(Record::new("Location:Lab", "Machine:pi", "08:05"))
    );

    handle.abort();
}

#[tokio::test]
async fn empty_store_has_no_latest() {
    let (addr, handle) = spawn_backend(Backend::default()).await;
    assert_eq!(store(addr, "notificatons").latest().await.unwrap(), None);
    handle.abort();
}

#[tokio::test]
async fn save_posts_store_shape() {
    let backend = Backend::default();
    let (addr, handle) = spawn_backend(backend.clone()).await;

    let record = Record::new("Location:Teachers room", "Machine:armv6l", "2015-11-26 08:05:56.060697");
    store(addr, "notificatons").save(&record).await.unwrap();

    let saved = backend.records.lock().unwrap().clone();
    assert_eq!(
        saved,
        vec![serde_json::json!({
            "Location": "Location:Teachers room",
            "MachineName": "Machine:armv6l",
            "MovementDetected": "2015-11-26 08:05:56.060697",
        })]
    );

    handle.abort();
}

#[tokio::test]
async fn error_status_is_io() {
    let (addr, handle) = spawn_backend(Backend::default()).await;

    let err = store(addr, "broken").list().await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Io);
    assert!(err.message.contains("503"), "{err}");

    let err = store(addr, "broken")
        .save(&Record::new("L", "M", "T"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Io);

    handle.abort();
}

#[tokio::test]
async fn garbled_body_is_format() {
    let (addr, handle) = spawn_backend(Backend::default()).await;
    let err = store(addr, "garbled").list().await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Format);
    handle.abort();
}

#[tokio::test]
async fn unreachable_store_is_io() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = store(addr, "notificatons").list().await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Io);
}
