use std::collections::VecDeque;

use parking_lot::Mutex;

use crate::config::ClientConfig;
use crate::transport::AddressResolver;
use crate::transport::CibSession;
use crate::transport::MembershipSession;
use crate::transport::SessionFactory;
use crate::StatusCode;

/// Hands out pre-built sessions in the order they were queued.
///
/// Each `connect()` consumes one queued primary session (or error); an empty
/// queue answers `ECONNREFUSED`.
#[derive(Default)]
pub(crate) struct MockSessionFactory {
    primaries: Mutex<VecDeque<Result<Box<dyn CibSession>, StatusCode>>>,
    memberships: Mutex<VecDeque<Box<dyn MembershipSession>>>,
    resolvers: Mutex<VecDeque<Box<dyn AddressResolver>>>,
}

impl MockSessionFactory {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_primary(
        self,
        session: impl CibSession,
    ) -> Self {
        self.primaries.lock().push_back(Ok(Box::new(session)));
        self
    }

    pub(crate) fn with_primary_error(
        self,
        status: StatusCode,
    ) -> Self {
        self.primaries.lock().push_back(Err(status));
        self
    }

    pub(crate) fn with_membership(
        self,
        session: impl MembershipSession,
    ) -> Self {
        self.memberships.lock().push_back(Box::new(session));
        self
    }

    pub(crate) fn with_resolver(
        self,
        resolver: impl AddressResolver,
    ) -> Self {
        self.resolvers.lock().push_back(Box::new(resolver));
        self
    }
}

impl SessionFactory for MockSessionFactory {
    fn primary(
        &self,
        _config: &ClientConfig,
    ) -> Result<Box<dyn CibSession>, StatusCode> {
        self.primaries.lock().pop_front().unwrap_or(Err(StatusCode::ECONNREFUSED))
    }

    fn membership(&self) -> Option<Box<dyn MembershipSession>> {
        self.memberships.lock().pop_front()
    }

    fn address_resolver(&self) -> Option<Box<dyn AddressResolver>> {
        self.resolvers.lock().pop_front()
    }
}
