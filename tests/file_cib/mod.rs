use std::sync::Arc;
use std::sync::Mutex;

use cib_client::transport::file::MULTI_MATCH_TAG;
use cib_client::CibClient;
use cib_client::CibEvent;
use cib_client::CibVersion;
use cib_client::ErrorKind;

use crate::common::command_client;
use crate::common::doc;
use crate::common::enable_logger;
use crate::common::write_cib;

#[tokio::test]
async fn test_changes_survive_reconnect() {
    let _logger = enable_logger();
    let (_dir, path) = write_cib("cib.xml");

    let mut client = command_client(&path).await;
    client
        .create_obj_in_section("resources", &doc(r#"<primitive id="db" class="ocf" provider="heartbeat" type="pgsql"/>"#))
        .await
        .unwrap();
    client.close().await.unwrap();

    let mut reader = CibClient::builder().from_file(&path).build().unwrap();
    reader.connect().await.unwrap();
    assert_eq!(
        reader.version().await.unwrap(),
        CibVersion {
            admin_epoch: 0,
            epoch: 6,
            num_updates: 0
        }
    );
    let found = reader.query_xpath("//primitive[@id='db']").await.unwrap();
    assert_eq!(found.root().attr("type"), Some("pgsql"));
    reader.close().await.unwrap();
}

#[tokio::test]
async fn test_read_only_client_leaves_file_untouched() {
    let (_dir, path) = write_cib("cib.xml");
    let before = std::fs::read(&path).unwrap();

    let mut client = CibClient::builder().from_file(&path).build().unwrap();
    client.connect().await.unwrap();
    let err = client
        .delete_obj_in_section("resources", &doc(r#"<primitive id="web"/>"#))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::NotSupported));
    client.close().await.unwrap();

    assert_eq!(std::fs::read(&path).unwrap(), before);
}

#[tokio::test]
async fn test_missing_file_is_a_connection_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut client = CibClient::builder().from_file(dir.path().join("absent.xml")).build().unwrap();

    let err = client.connect().await.unwrap_err();
    assert!(err.is_connection());
    assert!(!client.is_connected());
}

#[tokio::test]
async fn test_daemon_targets_need_a_transport() {
    let mut client = CibClient::builder().build().unwrap();
    let err = client.connect().await.unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::Connection));
}

#[tokio::test]
async fn test_multiple_matches_are_wrapped() {
    let (_dir, path) = write_cib("cib.xml");
    let mut client = command_client(&path).await;

    client
        .create_obj_in_section("nodes", &doc(r#"<node id="n2" uname="beta" type="normal"/>"#))
        .await
        .unwrap();
    let nodes = client.query_xpath("//node").await.unwrap();
    assert_eq!(nodes.root().name, MULTI_MATCH_TAG);
    assert_eq!(nodes.root().children.len(), 2);

    let root = client.query_no_children().await.unwrap();
    assert!(root.root().children.is_empty());
    client.close().await.unwrap();
}

#[tokio::test]
async fn test_subscribers_see_updates_then_one_destroy() {
    let (_dir, path) = write_cib("cib.xml");
    let mut client = command_client(&path).await;

    let events = Arc::new(Mutex::new(Vec::new()));
    let seen = events.clone();
    let id = client
        .subscribe(move |event, document| {
            let epoch = document.and_then(|d| d.root().attr("epoch").map(str::to_string));
            seen.lock().unwrap().push((event, epoch));
        })
        .await
        .unwrap();
    assert_eq!(id, 0);

    client
        .update_obj_in_section("nodes", &doc(r#"<node id="n1" type="member"/>"#))
        .await
        .unwrap();
    client
        .update_obj_in_section("status", &doc(r#"<status/>"#))
        .await
        .unwrap();
    client.close().await.unwrap();

    assert_eq!(
        *events.lock().unwrap(),
        vec![
            (CibEvent::Update, Some("6".to_string())),
            (CibEvent::Update, Some("6".to_string())),
            (CibEvent::Destroy, None)
        ]
    );
    assert_eq!(client.dispatch_next().await, None);
}
