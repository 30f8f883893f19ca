use logaggr::codec::read_collection;
use logaggr::collection::CollectionError;
use logaggr::config::CollectionConfig;
use logaggr::lifecycle::CollectionSystem;
use logaggr::model::LogLine;
use serde_json::json;
use std::time::Duration;
use tempfile::TempDir;

/// End-to-end: several collections served side by side, then shut down together.
#[tokio::test]
async fn test_full_collection_system() {
    let dir = TempDir::new().unwrap();
    let config = CollectionConfig::from_json_str(
        r#"{"serviceTimeout": 2000, "createIfMissing": true, "syncOnAppend": false}"#,
    )
    .unwrap();
    let system = CollectionSystem::with_config(config);

    let access = system.collection(dir.path().join("access.txt"));
    let errors = system.collection(dir.path().join("errors.txt"));
    assert_eq!(access.service_timeout(), Duration::from_millis(2000));

    access
        .append(LogLine::try_from(json!({"method": "GET", "url": "/test/url", "status": 200})).unwrap())
        .await
        .unwrap();
    errors
        .append(LogLine::try_from(json!({"level": "error", "msg": "boom"})).unwrap())
        .await
        .unwrap();
    access
        .append(LogLine::try_from(json!({"method": "POST", "url": "/login", "status": 302})).unwrap())
        .await
        .unwrap();

    // Looking the collection up again reaches the same actor.
    let again = system.collection(dir.path().join("access.txt"));
    let lines = again.read_all().await.unwrap();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[1].get("status"), Some(&json!(302.0)));
    assert_eq!(system.len(), 2);

    system.shutdown().await.unwrap();
    assert!(!access.is_running());
    assert!(!errors.is_running());
    assert!(matches!(
        errors.append(LogLine::new()).await,
        Err(CollectionError::Stopped)
    ));

    // Files stay readable without any actor.
    let on_disk = read_collection(dir.path().join("errors.txt")).unwrap();
    assert_eq!(on_disk, vec![LogLine::try_from(json!({"level": "error", "msg": "boom"})).unwrap()]);
}
