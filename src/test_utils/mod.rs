//! Shared fixtures and mocks for unit tests.
mod fixtures;
mod mock_factory;

pub(crate) use fixtures::*;
pub(crate) use mock_factory::*;
