//! CIB client: connection lifecycle, reads and writes, and subscriptions.

mod builder;
#[allow(clippy::module_inception)]
mod client;
mod ops;
mod subscription;

pub use builder::*;
pub use client::*;
pub use subscription::*;
