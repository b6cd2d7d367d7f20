use std::path::PathBuf;

use serial_test::serial;
use temp_env::with_vars;

use super::*;
use crate::config::RemoteTarget;
use crate::config::SHADOW_DIR_ENV;

#[test]
fn test_query_options() {
    let whole = CallOptions::for_query("", false);
    assert!(whole.contains(CallOptions::SYNC_CALL | CallOptions::SCOPE_LOCAL));
    assert!(!whole.contains(CallOptions::XPATH));
    assert!(!whole.contains(CallOptions::NO_CHILDREN));

    let scoped = CallOptions::for_query("//nodes", true);
    assert!(scoped.contains(CallOptions::XPATH));
    assert!(scoped.contains(CallOptions::NO_CHILDREN));
}

#[test]
fn test_only_create_asks_for_implicit_creation() {
    for op in [MutationOp::Update, MutationOp::Replace, MutationOp::Delete] {
        let options = op.call_options();
        assert!(options.contains(CallOptions::SYNC_CALL | CallOptions::SCOPE_LOCAL));
        assert!(!options.contains(CallOptions::CAN_CREATE), "{op}");
    }
    assert!(MutationOp::Create.call_options().contains(CallOptions::CAN_CREATE));
}

#[test]
fn test_mutation_names() {
    let names: Vec<_> = [
        MutationOp::Create,
        MutationOp::Update,
        MutationOp::Replace,
        MutationOp::Delete,
    ]
    .iter()
    .map(|op| op.to_string())
    .collect();
    assert_eq!(names, vec!["create", "update", "replace", "delete"]);
}

#[test]
fn test_local_factory_refuses_daemon_targets() {
    let factory = LocalSessionFactory;

    let config = ClientConfig::default();
    assert_eq!(factory.primary(&config).err(), Some(StatusCode::ECONNREFUSED));

    let config = ClientConfig {
        target: CibTarget::Remote(RemoteTarget {
            server: "node1".into(),
            user: "hacluster".into(),
            password: "pw".into(),
            port: 3121,
            encrypted: false,
        }),
        ..Default::default()
    };
    assert_eq!(factory.primary(&config).err(), Some(StatusCode::ECONNREFUSED));
    assert!(factory.membership().is_none());
    assert!(factory.address_resolver().is_none());
}

#[tokio::test]
#[serial]
async fn test_local_factory_opens_shadow_from_configured_dir() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("shadow.staging"), crate::test_utils::SIMPLE_CIB).unwrap();

    let config = ClientConfig {
        target: CibTarget::Shadow {
            name: "staging".into(),
        },
        shadow_dir: Some(dir.path().to_path_buf()),
        ..Default::default()
    };

    let mut session = with_vars(vec![(SHADOW_DIR_ENV, None::<&str>)], || LocalSessionFactory.primary(&config))
        .ok()
        .unwrap();
    session.sign_on("t", ConnectionMode::Query).await.unwrap();
    assert!(session.query("", CallOptions::for_query("", true)).await.is_ok());
}

#[tokio::test]
async fn test_local_factory_opens_file_target() {
    let (_dir, path) = crate::test_utils::temp_cib_file();
    let config = ClientConfig {
        target: CibTarget::File { path: PathBuf::from(&path) },
        ..Default::default()
    };

    let mut session = LocalSessionFactory.primary(&config).ok().unwrap();
    session.sign_on("t", ConnectionMode::Command).await.unwrap();
    session.sign_off().await.unwrap();
}
