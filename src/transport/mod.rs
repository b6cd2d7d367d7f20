//! Session boundary between the client and a CIB daemon.
//!
//! A client holds up to three sessions per connection:
//! - [`CibSession`]: the configuration channel. Queries, the four mutation
//!   verbs, and push notifications. The only hard dependency of `connect()`.
//! - [`MembershipSession`]: cluster membership / IPC (node list, local name).
//! - [`AddressResolver`]: node id to address lookup.
//!
//! Every call reports failures as a raw [`StatusCode`]; translation into
//! [`CibError`](crate::CibError) happens in the client.
//!
//! Sessions are produced by a [`SessionFactory`]. [`LocalSessionFactory`]
//! serves the `file` and `shadow` targets with a [`FileSession`]; daemon
//! transports are plugged in through
//! [`ClientBuilder::session_factory`](crate::ClientBuilder::session_factory).

pub mod file;
pub use file::FileSession;

#[cfg(test)]
mod transport_test;

use std::fmt;
use std::ops::BitOr;
use std::ops::BitOrAssign;

#[cfg(test)]
use mockall::automock;
use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::config::shadow_file_path;
use crate::config::CibTarget;
use crate::config::ClientConfig;
use crate::config::ConnectionMode;
use crate::StatusCode;

/// Options attached to a single session call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CallOptions(u32);

impl CallOptions {
    pub const NONE: CallOptions = CallOptions(0);
    /// Wait for the daemon's acknowledgement
    pub const SYNC_CALL: CallOptions = CallOptions(0x1);
    /// Apply to the local node only, no cluster-wide broadcast
    pub const SCOPE_LOCAL: CallOptions = CallOptions(0x2);
    /// The selector argument is a path expression
    pub const XPATH: CallOptions = CallOptions(0x4);
    /// Strip the children of every selected element
    pub const NO_CHILDREN: CallOptions = CallOptions(0x8);
    /// Create missing targets and ancestors instead of failing
    pub const CAN_CREATE: CallOptions = CallOptions(0x10);

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(
        self,
        other: CallOptions,
    ) -> bool {
        self.0 & other.0 == other.0
    }

    /// Options of a read request
    pub fn for_query(
        selector: &str,
        no_children: bool,
    ) -> Self {
        let mut options = Self::SYNC_CALL | Self::SCOPE_LOCAL;
        if !selector.is_empty() {
            options |= Self::XPATH;
        }
        if no_children {
            options |= Self::NO_CHILDREN;
        }
        options
    }
}

impl BitOr for CallOptions {
    type Output = CallOptions;

    fn bitor(
        self,
        rhs: CallOptions,
    ) -> CallOptions {
        CallOptions(self.0 | rhs.0)
    }
}

impl BitOrAssign for CallOptions {
    fn bitor_assign(
        &mut self,
        rhs: CallOptions,
    ) {
        self.0 |= rhs.0;
    }
}

/// The four write verbs of the configuration channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationOp {
    Create,
    Update,
    Replace,
    Delete,
}

impl MutationOp {
    pub fn call_options(self) -> CallOptions {
        let options = CallOptions::SYNC_CALL | CallOptions::SCOPE_LOCAL;
        match self {
            MutationOp::Create => options | CallOptions::CAN_CREATE,
            _ => options,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MutationOp::Create => "create",
            MutationOp::Update => "update",
            MutationOp::Replace => "replace",
            MutationOp::Delete => "delete",
        }
    }
}

impl fmt::Display for MutationOp {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Message pushed by the daemon
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// The document changed; carries the serialized document
    Updated(Vec<u8>),
    /// The session is gone; always the last message
    Destroyed,
}

/// Notification classes granted by a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NotifyFlags(u32);

impl NotifyFlags {
    pub const NONE: NotifyFlags = NotifyFlags(0);
    pub const DESTROY: NotifyFlags = NotifyFlags(0x1);
    pub const DIFF: NotifyFlags = NotifyFlags(0x2);

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(
        self,
        other: NotifyFlags,
    ) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for NotifyFlags {
    type Output = NotifyFlags;

    fn bitor(
        self,
        rhs: NotifyFlags,
    ) -> NotifyFlags {
        NotifyFlags(self.0 | rhs.0)
    }
}

/// Result of registering for push notifications
#[derive(Debug)]
pub struct NotifyRegistration {
    pub flags: NotifyFlags,
    pub events: mpsc::UnboundedReceiver<Notification>,
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait CibSession: Send + Sync + 'static {
    async fn sign_on(
        &mut self,
        name: &str,
        mode: ConnectionMode,
    ) -> Result<(), StatusCode>;

    async fn sign_off(&mut self) -> Result<(), StatusCode>;

    /// Raw serialized result of a read; an empty selector reads the whole
    /// document
    async fn query(
        &mut self,
        selector: &str,
        options: CallOptions,
    ) -> Result<Vec<u8>, StatusCode>;

    /// Apply one write; an empty section means the whole document
    async fn mutate(
        &mut self,
        op: MutationOp,
        section: &str,
        payload: &[u8],
        options: CallOptions,
    ) -> Result<(), StatusCode>;

    /// Register for push notifications; called at most once per session
    async fn register_notifications(&mut self) -> Result<NotifyRegistration, StatusCode>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait MembershipSession: Send + Sync + 'static {
    async fn connect(&mut self) -> Result<(), StatusCode>;

    /// Serialized node list
    async fn nodes_info(&mut self) -> Result<Vec<u8>, StatusCode>;

    async fn local_node_name(&mut self) -> Result<String, StatusCode>;

    async fn close(&mut self) -> Result<(), StatusCode>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait AddressResolver: Send + Sync + 'static {
    async fn initialize(&mut self) -> Result<(), StatusCode>;

    async fn node_address(
        &mut self,
        node_id: u32,
    ) -> Result<String, StatusCode>;

    async fn finalize(&mut self) -> Result<(), StatusCode>;
}

/// Opens the sessions of one connection
pub trait SessionFactory: Send + Sync + 'static {
    /// Configuration-channel session for the configured target, not yet
    /// signed on
    fn primary(
        &self,
        config: &ClientConfig,
    ) -> Result<Box<dyn CibSession>, StatusCode>;

    /// Membership session, if this transport offers one
    fn membership(&self) -> Option<Box<dyn MembershipSession>>;

    /// Address resolver, if this transport offers one
    fn address_resolver(&self) -> Option<Box<dyn AddressResolver>>;
}

/// Serves `file` and `shadow` targets from the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalSessionFactory;

impl SessionFactory for LocalSessionFactory {
    fn primary(
        &self,
        config: &ClientConfig,
    ) -> Result<Box<dyn CibSession>, StatusCode> {
        match &config.target {
            CibTarget::File { path } => Ok(Box::new(FileSession::new(path))),
            CibTarget::Shadow { name } => Ok(Box::new(FileSession::new(shadow_file_path(
                name,
                config.shadow_dir.as_deref(),
            )))),
            CibTarget::Local | CibTarget::Remote(_) => Err(StatusCode::ECONNREFUSED),
        }
    }

    fn membership(&self) -> Option<Box<dyn MembershipSession>> {
        None
    }

    fn address_resolver(&self) -> Option<Box<dyn AddressResolver>> {
        None
    }
}
