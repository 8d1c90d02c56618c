use std::sync::Arc;
use std::time::Duration;

use lockbox_kv::KvBackend;
use lockbox_logical::{Backend, Error, InmemStorage, Operation, Request, Storage};
use lockbox_router::{
    setup_mounts, system_view_for, BackendFactory, MountConfig, MountEntry, MountTable, Router,
    RouterError, BACKEND_BARRIER_PREFIX,
};
use serde_json::{json, Map, Value};

struct KvFactory;

impl BackendFactory for KvFactory {
    fn create(&self, entry: &MountEntry) -> Result<Arc<dyn Backend>, Error> {
        match entry.kind.as_str() {
            "kv" => Ok(Arc::new(
                KvBackend::new().with_system_view(system_view_for(entry)),
            )),
            other => Err(Error::invalid_request(format!("unknown type {other}"))),
        }
    }
}

fn body(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => panic!("expected object"),
    }
}

async fn write(router: &Router, path: &str, value: Value) {
    let mut req = Request::new(Operation::Update, path).with_data(body(value));
    router.route(&mut req).await.unwrap();
}

async fn read(router: &Router, path: &str) -> Option<Value> {
    let mut req = Request::new(Operation::Read, path);
    router
        .route(&mut req)
        .await
        .unwrap()
        .map(|resp| Value::Object(resp.data))
}

fn table(paths: &[&str]) -> MountTable {
    let mut table = MountTable::new();
    for path in paths {
        table.add(MountEntry::new(path, "kv"));
    }
    table
}

#[tokio::test]
async fn test_setup_mounts_from_table() {
    let router = Router::new();
    let barrier: Arc<dyn Storage> = Arc::new(InmemStorage::new());
    let table = table(&["secret/", "team/"]);

    setup_mounts(&router, &table, &KvFactory, barrier)
        .await
        .unwrap();

    let mounts = router.list_mounts().await;
    assert_eq!(mounts.len(), 2);
    assert_eq!(mounts[0].uuid, table.entries[0].uuid);
}

#[tokio::test]
async fn test_mount_config_reaches_system_view() {
    let mut table = MountTable::new();
    table.add(MountEntry::new("short/", "kv").with_config(MountConfig {
        default_lease_ttl: 300,
        max_lease_ttl: 3600,
    }));

    let router = Router::new();
    let barrier: Arc<dyn Storage> = Arc::new(InmemStorage::new());
    setup_mounts(&router, &table, &KvFactory, barrier)
        .await
        .unwrap();

    let system = router.matching_system_view("short/foo").await.unwrap();
    assert_eq!(system.default_lease_ttl(), Duration::from_secs(300));
    assert_eq!(system.max_lease_ttl(), Duration::from_secs(3600));
}

#[tokio::test]
async fn test_mounts_are_isolated() {
    let router = Router::new();
    let barrier = Arc::new(InmemStorage::new());
    let table = table(&["secret/", "team/"]);
    setup_mounts(&router, &table, &KvFactory, barrier.clone())
        .await
        .unwrap();

    write(&router, "secret/db", json!({"password": "one"})).await;
    write(&router, "team/db", json!({"password": "two"})).await;

    assert_eq!(
        read(&router, "secret/db").await,
        Some(json!({"password": "one"}))
    );
    assert_eq!(
        read(&router, "team/db").await,
        Some(json!({"password": "two"}))
    );

    // Both values sit in the shared barrier under per-mount namespaces
    let namespaces = barrier.list(BACKEND_BARRIER_PREFIX).await.unwrap();
    let mut expected: Vec<String> = table
        .entries
        .iter()
        .map(|e| format!("{}/", e.uuid))
        .collect();
    expected.sort();
    assert_eq!(namespaces, expected);
}

#[tokio::test]
async fn test_data_follows_remount() {
    let router = Router::new();
    let barrier: Arc<dyn Storage> = Arc::new(InmemStorage::new());
    setup_mounts(&router, &table(&["secret/"]), &KvFactory, barrier)
        .await
        .unwrap();

    write(&router, "secret/db", json!({"password": "hunter2"})).await;
    router.remount("secret/", "archive/").await.unwrap();

    assert_eq!(
        read(&router, "archive/db").await,
        Some(json!({"password": "hunter2"}))
    );
}

#[tokio::test]
async fn test_setup_mounts_keeps_taint() {
    let json = r#"{"entries": [
        {"uuid": "a1", "path": "secret", "type": "kv"},
        {"uuid": "b2", "path": "old/", "type": "kv", "tainted": true}
    ]}"#;
    let table = MountTable::from_json(json).unwrap();

    let router = Router::new();
    let barrier: Arc<dyn Storage> = Arc::new(InmemStorage::new());
    setup_mounts(&router, &table, &KvFactory, barrier)
        .await
        .unwrap();

    let mut req = Request::new(Operation::Read, "old/foo");
    assert!(matches!(
        router.route(&mut req).await.unwrap_err(),
        RouterError::UnsupportedPath
    ));

    let mut req = Request::new(Operation::Revoke, "old/foo");
    assert!(router.route(&mut req).await.unwrap().is_none());

    assert_eq!(read(&router, "secret/nothing").await, None);
}

#[tokio::test]
async fn test_setup_mounts_reports_factory_errors() {
    let mut table = table(&["secret/"]);
    table.add(MountEntry::new("db/", "postgres"));

    let router = Router::new();
    let barrier: Arc<dyn Storage> = Arc::new(InmemStorage::new());
    let err = setup_mounts(&router, &table, &KvFactory, barrier)
        .await
        .unwrap_err();

    assert!(matches!(err, RouterError::Factory { ref path, .. } if path == "db/"));
}

#[tokio::test]
async fn test_kv_errors_pass_through_router() {
    let router = Router::new();
    let barrier: Arc<dyn Storage> = Arc::new(InmemStorage::new());
    setup_mounts(&router, &table(&["secret/"]), &KvFactory, barrier)
        .await
        .unwrap();

    let mut req = Request::new(Operation::Update, "secret/empty");
    let err = router.route(&mut req).await.unwrap_err();
    assert!(matches!(
        err,
        RouterError::Backend(Error::InvalidRequest { .. })
    ));
}
