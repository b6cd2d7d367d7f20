//! Subscriber registry and notification dispatch.
//!
//! Each connection owns one [`DispatchContext`]. The transport pushes
//! [`Notification`]s into an unbounded channel; the context decodes them and
//! invokes every registered callback in registration order, on the task that
//! drives dispatch. Nothing here is shared between connections.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;
use tracing::debug;
use tracing::trace;
use tracing::warn;

use crate::document::CibDocument;
use crate::transport::Notification;
use crate::transport::NotifyFlags;
use crate::transport::NotifyRegistration;
use crate::DocumentError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CibEvent {
    /// The document changed; the callback receives the new document
    Update,
    /// The connection is gone; the last event a callback ever receives
    Destroy,
}

impl fmt::Display for CibEvent {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            CibEvent::Update => f.write_str("UpdateEvent"),
            CibEvent::Destroy => f.write_str("DestroyEvent"),
        }
    }
}

/// Subscriber callback. The document is present for [`CibEvent::Update`] only.
pub type CibEventFn = Arc<dyn Fn(CibEvent, Option<&CibDocument>) + Send + Sync>;

/// Turns a pushed payload into a document
pub type DecodeFn = fn(&[u8]) -> Result<CibDocument, DocumentError>;

/// Callbacks keyed by subscription id, ids ascending from 0
#[derive(Clone, Default)]
pub struct SubscriberRegistry {
    entries: BTreeMap<u32, CibEventFn>,
    next_id: u32,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        callback: CibEventFn,
    ) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.insert(id, callback);
        id
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ids(&self) -> Vec<u32> {
        self.entries.keys().copied().collect()
    }

    /// Read-only copy of the current entries
    pub fn snapshot(&self) -> BTreeMap<u32, CibEventFn> {
        self.entries.clone()
    }

    fn notify(
        &self,
        event: CibEvent,
        document: Option<&CibDocument>,
    ) {
        for (id, callback) in &self.entries {
            trace!(subscriber = id, %event, "invoking subscriber");
            callback(event, document);
        }
    }
}

impl fmt::Debug for SubscriberRegistry {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("SubscriberRegistry")
            .field("ids", &self.ids())
            .field("next_id", &self.next_id)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Every subscriber received the event
    Delivered(CibEvent),
    /// The payload could not be decoded; nobody was called
    Dropped,
    /// The connection already delivered its destroy event
    Terminated,
}

/// Per-connection dispatch state
pub struct DispatchContext {
    registry: SubscriberRegistry,
    decode: DecodeFn,
    events: Option<mpsc::UnboundedReceiver<Notification>>,
    flags: NotifyFlags,
    terminated: bool,
}

impl Default for DispatchContext {
    fn default() -> Self {
        Self::new(CibDocument::decode)
    }
}

impl fmt::Debug for DispatchContext {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("DispatchContext")
            .field("registry", &self.registry)
            .field("attached", &self.events.is_some())
            .field("flags", &self.flags)
            .field("terminated", &self.terminated)
            .finish()
    }
}

impl DispatchContext {
    pub fn new(decode: DecodeFn) -> Self {
        Self {
            registry: SubscriberRegistry::new(),
            decode,
            events: None,
            flags: NotifyFlags::NONE,
            terminated: false,
        }
    }

    pub fn registry(&self) -> &SubscriberRegistry {
        &self.registry
    }

    pub fn subscribe(
        &mut self,
        callback: CibEventFn,
    ) -> u32 {
        self.registry.insert(callback)
    }

    /// Start consuming the notifications of a registration
    pub fn attach(
        &mut self,
        registration: NotifyRegistration,
    ) {
        debug!(flags = registration.flags.bits(), "attached notification feed");
        self.flags = registration.flags;
        self.events = Some(registration.events);
    }

    pub fn is_attached(&self) -> bool {
        self.events.is_some()
    }

    /// Notification classes granted by the transport
    pub fn flags(&self) -> NotifyFlags {
        self.flags
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// Handle one notification
    pub fn dispatch(
        &mut self,
        notification: Notification,
    ) -> DispatchOutcome {
        if self.terminated {
            trace!("ignoring notification after destroy");
            return DispatchOutcome::Terminated;
        }

        match notification {
            Notification::Updated(payload) => match (self.decode)(&payload) {
                Ok(document) => {
                    self.registry.notify(CibEvent::Update, Some(&document));
                    DispatchOutcome::Delivered(CibEvent::Update)
                }
                Err(e) => {
                    warn!(error = %e, bytes = payload.len(), "dropping undecodable CIB update");
                    DispatchOutcome::Dropped
                }
            },
            Notification::Destroyed => self.destroy(),
        }
    }

    /// Handle every notification that is ready, without waiting
    pub fn dispatch_pending(&mut self) -> Vec<DispatchOutcome> {
        let mut outcomes = Vec::new();
        while !self.terminated {
            let next = match self.events.as_mut() {
                Some(events) => events.try_recv(),
                None => break,
            };
            match next {
                Ok(notification) => outcomes.push(self.dispatch(notification)),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => outcomes.push(self.destroy()),
            }
        }
        outcomes
    }

    /// Wait for the next notification and handle it.
    ///
    /// Returns `None` when no feed is attached or destroy was already
    /// delivered. A feed closed without a destroy message counts as destroy.
    pub async fn dispatch_next(&mut self) -> Option<DispatchOutcome> {
        if self.terminated {
            return None;
        }
        let next = self.events.as_mut()?.recv().await;
        let outcome = match next {
            Some(notification) => self.dispatch(notification),
            None => self.destroy(),
        };
        tokio::task::yield_now().await;
        Some(outcome)
    }

    /// Deliver what is queued, then make sure every subscriber has seen
    /// exactly one destroy, then drop the registry and the feed
    pub fn finish(&mut self) -> Vec<DispatchOutcome> {
        let mut outcomes = self.dispatch_pending();
        if !self.terminated {
            outcomes.push(self.destroy());
        }
        self.events = None;
        self.registry = SubscriberRegistry::new();
        outcomes
    }

    fn destroy(&mut self) -> DispatchOutcome {
        self.terminated = true;
        self.events = None;
        self.registry.notify(CibEvent::Destroy, None);
        DispatchOutcome::Delivered(CibEvent::Destroy)
    }
}
