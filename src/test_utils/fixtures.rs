use std::path::PathBuf;

use tempfile::TempDir;

/// Minimal CIB with one node and one primitive resource
pub(crate) const SIMPLE_CIB: &str = r#"<cib admin_epoch="1" epoch="0" num_updates="0" validate-with="pacemaker-1.2" have-quorum="1">
  <configuration>
    <crm_config>
      <cluster_property_set id="cib-bootstrap-options">
        <nvpair id="cib-bootstrap-options-stonith-enabled" name="stonith-enabled" value="false"/>
      </cluster_property_set>
    </crm_config>
    <nodes>
      <node id="xxx" uname="c001n01" type="normal"/>
      <node id="yyy" uname="c001n02" type="normal"/>
    </nodes>
    <resources>
      <primitive id="myAddr" class="ocf" provider="heartbeat" type="IPaddr">
        <operations>
          <op id="myAddr-monitor" name="monitor" interval="300s"/>
        </operations>
        <instance_attributes id="myAddr-params">
          <nvpair id="myAddr-ip" name="ip" value="192.168.1.10"/>
        </instance_attributes>
      </primitive>
    </resources>
    <constraints/>
  </configuration>
  <status/>
</cib>
"#;

/// Route this test's logs to the test writer while the guard lives.
///
/// Thread-local only: the global subscriber stays free for `#[traced_test]`.
pub(crate) fn enable_logger() -> tracing::subscriber::DefaultGuard {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .finish();
    tracing::subscriber::set_default(subscriber)
}

/// Writes [`SIMPLE_CIB`] to a fresh temporary directory.
///
/// The directory is removed when the returned guard is dropped.
pub(crate) fn temp_cib_file() -> (TempDir, PathBuf) {
    write_temp_cib(SIMPLE_CIB)
}

pub(crate) fn write_temp_cib(content: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("cib.xml");
    std::fs::write(&path, content).expect("write temp CIB");
    (dir, path)
}
