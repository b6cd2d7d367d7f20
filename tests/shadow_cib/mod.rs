use cib_client::config::SHADOW_DIR_ENV;
use cib_client::CibClient;
use serial_test::serial;

use crate::common::doc;
use crate::common::write_cib;

#[tokio::test]
#[serial]
async fn test_shadow_dir_setting_locates_the_shadow() {
    let (dir, path) = write_cib("shadow.staging");
    std::env::remove_var(SHADOW_DIR_ENV);

    let mut client = CibClient::builder()
        .from_shadow("staging")
        .shadow_dir(dir.path())
        .for_command()
        .build()
        .unwrap();
    assert_eq!(client.shadow_file("staging"), path);

    client.connect().await.unwrap();
    client
        .update_obj_in_section("crm_config", &doc(r#"<crm_config><cluster_property_set id="opts"/></crm_config>"#))
        .await
        .unwrap();
    client.close().await.unwrap();

    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.contains(r#"cluster_property_set id="opts""#));
}

#[tokio::test]
#[serial]
async fn test_shadow_dir_environment_wins() {
    let (env_dir, env_path) = write_cib("shadow.test");
    let other = tempfile::tempdir().unwrap();

    let client = CibClient::builder()
        .from_shadow("test")
        .shadow_dir(other.path())
        .build()
        .unwrap();

    let resolved = temp_env::with_var(SHADOW_DIR_ENV, Some(env_dir.path()), || client.shadow_file("test"));
    assert_eq!(resolved, env_path);
}
