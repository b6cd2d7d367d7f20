use std::path::Path;
use std::path::PathBuf;

use cib_client::CibClient;
use cib_client::CibDocument;
use tempfile::TempDir;

pub const TEST_CIB: &str = r#"<cib admin_epoch="0" epoch="5" num_updates="2" validate-with="pacemaker-1.2">
  <configuration>
    <crm_config/>
    <nodes>
      <node id="n1" uname="alpha" type="normal"/>
    </nodes>
    <resources>
      <primitive id="web" class="ocf" provider="heartbeat" type="apache"/>
    </resources>
    <constraints/>
  </configuration>
  <status/>
</cib>
"#;

/// Route this test's logs to the test writer while the guard lives.
///
/// Thread-local only: the global subscriber stays free for `#[traced_test]`.
pub fn enable_logger() -> tracing::subscriber::DefaultGuard {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .finish();
    tracing::subscriber::set_default(subscriber)
}

/// Writes [`TEST_CIB`] as `file_name` inside a fresh temporary directory
pub fn write_cib(file_name: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join(file_name);
    std::fs::write(&path, TEST_CIB).expect("write test CIB");
    (dir, path)
}

pub async fn command_client(path: &Path) -> CibClient {
    let mut client = CibClient::builder()
        .client_name("integration")
        .from_file(path)
        .for_command()
        .build()
        .expect("build client");
    client.connect().await.expect("connect");
    client
}

pub fn doc(xml: &str) -> CibDocument {
    xml.parse().expect("valid test document")
}
