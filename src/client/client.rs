use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;
use tracing::info;
use tracing::warn;

use super::ClientBuilder;
use super::CibEvent;
use super::CibEventFn;
use super::DispatchContext;
use super::DispatchOutcome;
use crate::config::shadow_file_path;
use crate::config::ClientConfig;
use crate::document::CibDocument;
use crate::transport::AddressResolver;
use crate::transport::CibSession;
use crate::transport::LocalSessionFactory;
use crate::transport::MembershipSession;
use crate::transport::Notification;
use crate::transport::NotifyFlags;
use crate::transport::SessionFactory;
use crate::utils::kernel_hostname;
use crate::CibError;
use crate::Error;
use crate::ErrorKind;
use crate::Result;
use crate::StatusCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    Disconnected,
    Connected,
}

/// Sessions held while connected
struct Sessions {
    primary: Box<dyn CibSession>,
    membership: Option<Box<dyn MembershipSession>>,
    resolver: Option<Box<dyn AddressResolver>>,
}

/// Client of one CIB.
///
/// Every operation takes `&mut self`, so a connection never has more than
/// one call in flight. Dispatch of pushed notifications runs on whichever
/// task calls [`dispatch_pending`](Self::dispatch_pending) or
/// [`dispatch_next`](Self::dispatch_next).
///
/// # Example
/// ```no_run
/// # async fn run() -> cib_client::Result<()> {
/// use cib_client::CibClient;
///
/// let mut client = CibClient::builder().from_file("/tmp/cib.xml").build()?;
/// client.connect().await?;
/// println!("{}", client.version().await?);
/// client.close().await?;
/// # Ok(())
/// # }
/// ```
pub struct CibClient {
    config: ClientConfig,
    factory: Arc<dyn SessionFactory>,
    sessions: Option<Sessions>,
    dispatch: DispatchContext,
}

impl std::fmt::Debug for CibClient {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("CibClient")
            .field("config", &self.config)
            .field("state", &self.state())
            .field("dispatch", &self.dispatch)
            .finish()
    }
}

impl CibClient {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Client for `config` using the built-in local session factory
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::builder().set_config(config).build()
    }

    pub(super) fn from_parts(
        config: ClientConfig,
        factory: Option<Arc<dyn SessionFactory>>,
    ) -> Self {
        Self {
            config,
            factory: factory.unwrap_or_else(|| Arc::new(LocalSessionFactory)),
            sessions: None,
            dispatch: DispatchContext::default(),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn state(&self) -> ConnectionState {
        if self.sessions.is_some() {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        }
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Open the sessions of a new connection.
    ///
    /// The primary session is mandatory: any failure to open or sign on to it
    /// is a Connection error. Membership and address-resolution sessions are
    /// best effort. Calling this while connected releases the previous
    /// sessions first.
    pub async fn connect(&mut self) -> Result<()> {
        if self.sessions.is_some() {
            debug!("reconnecting, releasing previous sessions");
            if let Err(e) = self.release().await {
                warn!(error = %e, "releasing previous sessions failed");
            }
        }

        let mut primary = self.factory.primary(&self.config).map_err(|status| {
            debug!(%status, cib = %self.config.target, "cannot open primary session");
            CibError::connection_failure(status)
        })?;

        let mode = self.config.mode.normalize();
        if let Err(status) = primary.sign_on(&self.config.client_name, mode).await {
            debug!(%status, cib = %self.config.target, "sign-on failed");
            return Err(CibError::connection_failure(status).into());
        }

        let membership = match self.factory.membership() {
            Some(mut session) => match session.connect().await {
                Ok(()) => Some(session),
                Err(status) => {
                    warn!(%status, "membership session unavailable");
                    None
                }
            },
            None => None,
        };

        let resolver = match self.factory.address_resolver() {
            Some(mut resolver) => match resolver.initialize().await {
                Ok(()) => Some(resolver),
                Err(status) => {
                    warn!(%status, "address resolver unavailable");
                    None
                }
            },
            None => None,
        };

        info!(
            cib = %self.config.target,
            %mode,
            membership = membership.is_some(),
            resolver = resolver.is_some(),
            "connected to CIB"
        );
        self.sessions = Some(Sessions {
            primary,
            membership,
            resolver,
        });
        self.dispatch = DispatchContext::default();
        Ok(())
    }

    /// Sign off and release every session.
    ///
    /// Queued notifications are delivered first, then each subscriber gets
    /// exactly one [`CibEvent::Destroy`]. Closing a disconnected client is a
    /// no-op.
    pub async fn close(&mut self) -> Result<()> {
        self.release().await
    }

    async fn release(&mut self) -> Result<()> {
        let Some(mut sessions) = self.sessions.take() else {
            return Ok(());
        };

        let signed_off = sessions.primary.sign_off().await;

        if let Some(membership) = sessions.membership.as_mut() {
            if let Err(status) = membership.close().await {
                warn!(%status, "closing membership session failed");
            }
        }
        if let Some(resolver) = sessions.resolver.as_mut() {
            if let Err(status) = resolver.finalize().await {
                warn!(%status, "finalizing address resolver failed");
            }
        }
        drop(sessions);

        let outcomes = self.dispatch.finish();
        debug!(delivered = outcomes.len(), "released CIB sessions");

        signed_off.map_err(|status| {
            debug!(%status, "sign-off failed");
            Error::from(CibError::from(status))
        })
    }

    pub(super) fn primary(&mut self) -> Result<&mut Box<dyn CibSession>> {
        match self.sessions.as_mut() {
            Some(sessions) => Ok(&mut sessions.primary),
            None => Err(not_connected("client is not connected")),
        }
    }

    /// Translate a failed primary-session call.
    ///
    /// A Connection error ends the connection: sessions are dropped without
    /// sign-off and subscribers receive their destroy event.
    pub(super) fn primary_failure(
        &mut self,
        status: StatusCode,
        detail: &str,
    ) -> Error {
        let err = CibError::from_status(status, (!detail.is_empty()).then_some(detail));
        debug!(error = %err, "primary session call failed");
        if err.kind() == ErrorKind::Connection && self.sessions.take().is_some() {
            warn!(error = %err, "connection lost, client is now disconnected");
            self.dispatch.finish();
        }
        err.into()
    }

    /// Name of the local cluster node.
    ///
    /// Asks the membership session when there is one, otherwise falls back to
    /// the kernel host name.
    pub async fn get_local_node_name(&mut self) -> Result<String> {
        if let Some(membership) = self.sessions.as_mut().and_then(|s| s.membership.as_mut()) {
            match membership.local_node_name().await {
                Ok(name) if !name.is_empty() => return Ok(name),
                Ok(_) => debug!("membership session returned an empty node name"),
                Err(status) => debug!(%status, "membership session cannot name the local node"),
            }
        }

        kernel_hostname().await.ok_or_else(|| {
            CibError::from_status(StatusCode::ENXIO, Some("cannot determine the local node name")).into()
        })
    }

    /// Node list reported by the membership session
    pub async fn get_nodes_info(&mut self) -> Result<CibDocument> {
        let membership = self
            .sessions
            .as_mut()
            .and_then(|s| s.membership.as_mut())
            .ok_or_else(|| not_connected("no membership session"))?;

        let bytes = membership
            .nodes_info()
            .await
            .map_err(|status| CibError::from_status(status, Some("nodes info")))?;
        Ok(CibDocument::decode(&bytes)?)
    }

    /// Address of the node with id `node_id`
    pub async fn get_node_ip(
        &mut self,
        node_id: u32,
    ) -> Result<String> {
        let resolver = self
            .sessions
            .as_mut()
            .and_then(|s| s.resolver.as_mut())
            .ok_or_else(|| not_connected("no address resolver"))?;

        resolver.node_address(node_id).await.map_err(|status| {
            Error::from(CibError::from_status(status, Some(&format!("node {node_id}"))))
        })
    }

    /// Register `callback` for pushed events.
    ///
    /// The first subscription on a connection registers with the transport;
    /// later ones share that registration. Returns the subscription id, or a
    /// Connection error when the client is not connected.
    pub async fn subscribe<F>(
        &mut self,
        callback: F,
    ) -> Result<u32>
    where
        F: Fn(CibEvent, Option<&CibDocument>) + Send + Sync + 'static,
    {
        self.primary()?;
        if !self.dispatch.is_attached() && !self.dispatch.is_terminated() {
            let registered = self.primary()?.register_notifications().await;
            let registration = registered.map_err(|status| self.primary_failure(status, "notification registration"))?;
            self.dispatch.attach(registration);
        }

        let id = self.dispatch.subscribe(Arc::new(callback) as CibEventFn);
        debug!(id, "subscribed to CIB events");
        Ok(id)
    }

    /// Snapshot of the registered callbacks
    pub fn subscribers(&self) -> BTreeMap<u32, CibEventFn> {
        self.dispatch.registry().snapshot()
    }

    /// Notification classes the transport granted
    pub fn notifications(&self) -> NotifyFlags {
        self.dispatch.flags()
    }

    /// Hand one notification to the subscribers of this connection
    pub fn dispatch(
        &mut self,
        notification: Notification,
    ) -> DispatchOutcome {
        self.dispatch.dispatch(notification)
    }

    /// Deliver every notification that is ready, without waiting
    pub fn dispatch_pending(&mut self) -> Vec<DispatchOutcome> {
        self.dispatch.dispatch_pending()
    }

    /// Wait for the next notification and deliver it, then yield to the
    /// scheduler. `None` once the connection delivered its destroy event or
    /// when nothing is subscribed.
    pub async fn dispatch_next(&mut self) -> Option<DispatchOutcome> {
        self.dispatch.dispatch_next().await
    }

    /// Path of the shadow CIB called `name`
    pub fn shadow_file(
        &self,
        name: &str,
    ) -> PathBuf {
        shadow_file_path(name, self.config.shadow_dir.as_deref())
    }
}

fn not_connected(detail: &str) -> Error {
    CibError::from_status(StatusCode::ENOTCONN, Some(detail)).into()
}
