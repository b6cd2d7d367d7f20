use std::fmt;
use std::path::PathBuf;

use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Access level requested when signing on to the CIB
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionMode {
    /// Read-only access
    #[default]
    Query,
    /// Read-write access
    Command,
    /// Read-write access without waiting for the daemon's reply
    CommandNonBlocking,
    /// Placeholder used by callers that never connect; treated as `Query`
    NoConnection,
}

impl ConnectionMode {
    /// Mode actually sent to the daemon
    pub fn normalize(self) -> Self {
        match self {
            ConnectionMode::NoConnection => ConnectionMode::Query,
            other => other,
        }
    }

    pub fn is_read_only(self) -> bool {
        matches!(self.normalize(), ConnectionMode::Query)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ConnectionMode::Query => "query",
            ConnectionMode::Command => "command",
            ConnectionMode::CommandNonBlocking => "command_non_blocking",
            ConnectionMode::NoConnection => "no_connection",
        }
    }
}

impl fmt::Display for ConnectionMode {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the CIB lives
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CibTarget {
    /// Local daemon over IPC
    #[default]
    Local,
    /// A CIB document kept in a plain file
    File { path: PathBuf },
    /// A named shadow copy, see [`shadow_file_path`](super::shadow_file_path)
    Shadow { name: String },
    /// Remote daemon over TCP
    Remote(RemoteTarget),
}

impl fmt::Display for CibTarget {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            CibTarget::Local => f.write_str("local"),
            CibTarget::File { path } => write!(f, "file:{}", path.display()),
            CibTarget::Shadow { name } => write!(f, "shadow:{name}"),
            CibTarget::Remote(remote) => write!(f, "remote:{}@{}:{}", remote.user, remote.server, remote.port),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct RemoteTarget {
    pub server: String,

    #[serde(default)]
    pub user: String,

    #[serde(default)]
    pub password: String,

    #[serde(default = "default_remote_port")]
    pub port: u16,

    #[serde(default)]
    pub encrypted: bool,
}

impl fmt::Debug for RemoteTarget {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("RemoteTarget")
            .field("server", &self.server)
            .field("user", &self.user)
            .field("password", &"<hidden>")
            .field("port", &self.port)
            .field("encrypted", &self.encrypted)
            .finish()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Name announced on sign-on
    #[serde(default = "default_client_name")]
    pub client_name: String,

    #[serde(default)]
    pub mode: ConnectionMode,

    #[serde(default)]
    pub target: CibTarget,

    /// Overrides the directory holding shadow CIBs
    #[serde(default)]
    pub shadow_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            client_name: default_client_name(),
            mode: ConnectionMode::default(),
            target: CibTarget::default(),
            shadow_dir: None,
        }
    }
}

impl ClientConfig {
    /// Validates the client settings
    /// # Errors
    /// Returns `Error::Config` when a name, path or address is empty, or the
    /// remote port is 0
    pub fn validate(&self) -> Result<()> {
        if self.client_name.trim().is_empty() {
            return Err(invalid("client_name cannot be empty"));
        }

        match &self.target {
            CibTarget::Local => {}
            CibTarget::File { path } => {
                if path.as_os_str().is_empty() {
                    return Err(invalid("file target path cannot be empty"));
                }
            }
            CibTarget::Shadow { name } => {
                if name.trim().is_empty() {
                    return Err(invalid("shadow target name cannot be empty"));
                }
            }
            CibTarget::Remote(remote) => {
                if remote.server.trim().is_empty() {
                    return Err(invalid("remote target server cannot be empty"));
                }
                if remote.port == 0 {
                    return Err(invalid("remote target port cannot be 0"));
                }
            }
        }

        Ok(())
    }
}

fn invalid(msg: &str) -> Error {
    Error::Config(ConfigError::Message(msg.to_string()))
}

fn default_client_name() -> String {
    "cib-client".to_string()
}

pub(super) fn default_remote_port() -> u16 {
    3121
}
