use std::path::Path;

use tracing::debug;

/// Where the kernel host name can be read, in order of preference
pub(crate) const HOSTNAME_SOURCES: [&str; 2] = ["/proc/sys/kernel/hostname", "/etc/hostname"];

pub(crate) async fn kernel_hostname() -> Option<String> {
    first_nonempty_line(&HOSTNAME_SOURCES).await
}

/// Trimmed content of the first readable, non-blank file
pub(crate) async fn first_nonempty_line<P: AsRef<Path>>(paths: &[P]) -> Option<String> {
    for path in paths {
        let path = path.as_ref();
        match tokio::fs::read_to_string(path).await {
            Ok(content) => {
                let name = content.lines().next().unwrap_or("").trim();
                if !name.is_empty() {
                    return Some(name.to_string());
                }
            }
            Err(e) => debug!(path = %path.display(), error = %e, "host name source unavailable"),
        }
    }
    None
}
