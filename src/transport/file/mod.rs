//! CIB kept in a local file.
//!
//! The document is read on sign-on, mutated in memory, and written back on
//! sign-off when it changed.

mod apply;


use std::path::Path;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::debug;
use tracing::trace;
use tracing::warn;

use crate::config::ConnectionMode;
use crate::document::CibDocument;
use crate::document::Element;
use crate::document::Selector;
use crate::transport::CallOptions;
use crate::transport::CibSession;
use crate::transport::MutationOp;
use crate::transport::Notification;
use crate::transport::NotifyFlags;
use crate::transport::NotifyRegistration;
use crate::StatusCode;

/// Wrapper element of a read that selected several elements
pub const MULTI_MATCH_TAG: &str = "xpath-query";

#[derive(Debug)]
pub struct FileSession {
    path: PathBuf,
    mode: ConnectionMode,
    document: Option<Element>,
    dirty: bool,
    listener: Option<mpsc::UnboundedSender<Notification>>,
}

impl FileSession {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            mode: ConnectionMode::Query,
            document: None,
            dirty: false,
            listener: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn document(&self) -> Result<&Element, StatusCode> {
        self.document.as_ref().ok_or(StatusCode::ENOTCONN)
    }

    fn notify(
        &mut self,
        notification: Notification,
    ) {
        if let Some(listener) = &self.listener {
            if listener.send(notification).is_err() {
                debug!(path = %self.path.display(), "notification receiver dropped");
                self.listener = None;
            }
        }
    }

    async fn persist(&self) -> Result<(), StatusCode> {
        let root = self.document()?;
        let bytes = CibDocument::from_element(root.clone()).encode_xml();

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        if let Err(e) = tokio::fs::write(&tmp, &bytes).await {
            warn!(path = %tmp.display(), error = %e, "failed to write CIB file");
            return Err(StatusCode::EACCES);
        }
        if let Err(e) = tokio::fs::rename(&tmp, &self.path).await {
            warn!(path = %self.path.display(), error = %e, "failed to replace CIB file");
            return Err(StatusCode::EACCES);
        }
        Ok(())
    }
}

#[async_trait]
impl CibSession for FileSession {
    async fn sign_on(
        &mut self,
        name: &str,
        mode: ConnectionMode,
    ) -> Result<(), StatusCode> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            debug!(path = %self.path.display(), error = %e, "cannot read CIB file");
            StatusCode::ENXIO
        })?;
        let document = CibDocument::decode(&bytes).map_err(|e| {
            debug!(path = %self.path.display(), error = %e, "cannot parse CIB file");
            StatusCode::ENXIO
        })?;

        debug!(path = %self.path.display(), client = name, %mode, "signed on to file CIB");
        self.mode = mode.normalize();
        self.document = Some(document.into_root());
        self.dirty = false;
        Ok(())
    }

    async fn sign_off(&mut self) -> Result<(), StatusCode> {
        if self.document.is_none() {
            return Ok(());
        }

        let result = if self.dirty { self.persist().await } else { Ok(()) };

        self.notify(Notification::Destroyed);
        self.listener = None;
        self.document = None;
        self.dirty = false;
        debug!(path = %self.path.display(), "signed off from file CIB");
        result
    }

    async fn query(
        &mut self,
        selector: &str,
        options: CallOptions,
    ) -> Result<Vec<u8>, StatusCode> {
        let root = self.document()?;
        let strip = |e: &Element| {
            if options.contains(CallOptions::NO_CHILDREN) {
                e.shallow_clone()
            } else {
                e.clone()
            }
        };

        let result = if selector.is_empty() {
            strip(root)
        } else {
            let selector = Selector::parse(selector).map_err(|e| {
                debug!(error = %e, "rejecting selector");
                StatusCode::EINVAL
            })?;
            let matches = selector.select(root);
            match matches.as_slice() {
                [] => return Err(StatusCode::ENXIO),
                [only] => strip(*only),
                many => many
                    .iter()
                    .fold(Element::new(MULTI_MATCH_TAG), |wrapper, e| wrapper.with_child(strip(*e))),
            }
        };

        Ok(CibDocument::from_element(result).encode_xml_compact())
    }

    async fn mutate(
        &mut self,
        op: MutationOp,
        section: &str,
        payload: &[u8],
        options: CallOptions,
    ) -> Result<(), StatusCode> {
        let current = self.document()?;
        if self.mode.is_read_only() {
            return Err(StatusCode::EOPNOTSUPP);
        }

        let payload = CibDocument::decode(payload).map_err(|e| {
            debug!(error = %e, "rejecting malformed payload");
            StatusCode::EINVAL
        })?;

        let mut next = current.clone();
        apply::apply(&mut next, op, section, payload.into_root(), options)?;
        trace!(%op, section, "applied mutation to file CIB");

        let snapshot = CibDocument::from_element(next.clone()).encode_xml_compact();
        self.document = Some(next);
        self.dirty = true;
        self.notify(Notification::Updated(snapshot));
        Ok(())
    }

    async fn register_notifications(&mut self) -> Result<NotifyRegistration, StatusCode> {
        self.document()?;
        let (tx, rx) = mpsc::unbounded_channel();
        self.listener = Some(tx);
        Ok(NotifyRegistration {
            flags: NotifyFlags::DESTROY | NotifyFlags::DIFF,
            events: rx,
        })
    }
}
