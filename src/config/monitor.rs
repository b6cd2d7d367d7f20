use serde::Deserialize;
use serde::Serialize;

/// Settings of the `cibmon` binary
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    /// Print the whole CIB on every update instead of the version only
    #[serde(default)]
    pub verbose: bool,

    /// Pause before reconnecting after the daemon drops the session
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            reconnect_delay_ms: default_reconnect_delay_ms(),
        }
    }
}

fn default_reconnect_delay_ms() -> u64 {
    1000
}
