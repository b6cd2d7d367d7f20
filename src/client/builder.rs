use std::path::PathBuf;
use std::sync::Arc;

use super::CibClient;
use crate::config::CibTarget;
use crate::config::ClientConfig;
use crate::config::ConnectionMode;
use crate::config::RemoteTarget;
use crate::transport::SessionFactory;
use crate::Result;

/// Configurable builder for [`CibClient`] instances
///
/// # Typical Usage Flow
/// 1. Create with `CibClient::builder()`
/// 2. Pick a target and a mode
/// 3. Finalize with `.build()`
///
/// # Default Configuration
/// - Target: local daemon
/// - Mode: query (read-only)
/// - Sessions: [`LocalSessionFactory`](crate::transport::LocalSessionFactory)
#[derive(Default)]
pub struct ClientBuilder {
    config: ClientConfig,
    factory: Option<Arc<dyn SessionFactory>>,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name announced on sign-on (default: `cib-client`)
    pub fn client_name(
        mut self,
        name: impl Into<String>,
    ) -> Self {
        self.config.client_name = name.into();
        self
    }

    pub fn mode(
        mut self,
        mode: ConnectionMode,
    ) -> Self {
        self.config.mode = mode;
        self
    }

    /// Read-write access
    pub fn for_command(self) -> Self {
        self.mode(ConnectionMode::Command)
    }

    /// Use the CIB stored in `path`
    pub fn from_file(
        mut self,
        path: impl Into<PathBuf>,
    ) -> Self {
        self.config.target = CibTarget::File { path: path.into() };
        self
    }

    /// Use the shadow CIB called `name`
    pub fn from_shadow(
        mut self,
        name: impl Into<String>,
    ) -> Self {
        self.config.target = CibTarget::Shadow { name: name.into() };
        self
    }

    pub fn from_remote(
        mut self,
        remote: RemoteTarget,
    ) -> Self {
        self.config.target = CibTarget::Remote(remote);
        self
    }

    /// Directory holding shadow CIBs, unless `CIB_shadow_dir` is set
    pub fn shadow_dir(
        mut self,
        dir: impl Into<PathBuf>,
    ) -> Self {
        self.config.shadow_dir = Some(dir.into());
        self
    }

    /// Completely replaces the configuration set so far
    pub fn set_config(
        mut self,
        config: ClientConfig,
    ) -> Self {
        self.config = config;
        self
    }

    /// Transport used to open sessions, for daemon targets
    pub fn session_factory(
        mut self,
        factory: Arc<dyn SessionFactory>,
    ) -> Self {
        self.factory = Some(factory);
        self
    }

    /// Validate the configuration and build a disconnected client
    pub fn build(mut self) -> Result<CibClient> {
        self.config.validate()?;
        self.config.mode = self.config.mode.normalize();
        Ok(CibClient::from_parts(self.config, self.factory))
    }
}
