//! # cib-client
//!
//! Client for the Cluster Information Base (CIB), the versioned configuration
//! store of high-availability cluster managers.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cib_client::CibClient;
//! use cib_client::CibDocument;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> cib_client::Result<()> {
//!     let mut client = CibClient::builder()
//!         .from_file("/var/lib/pacemaker/cib/cib.xml")
//!         .for_command()
//!         .build()?;
//!     client.connect().await?;
//!
//!     let node: CibDocument = r#"<node id="3" uname="node3" type="normal"/>"#.parse()?;
//!     client.create_obj_in_section("nodes", &node).await?;
//!     println!("now at {}", client.version().await?);
//!
//!     client.close().await
//! }
//! ```
//!
//! ## Features
//!
//! - [`CibClient`] - connection lifecycle, queries, the four section-scoped
//!   writes, subscriptions
//! - [`CibDocument`] - XML/JSON document model with path selection
//! - [`CibError`] - typed failures translated from daemon status codes
//! - [`transport`] - session traits for plugging in a daemon transport, and a
//!   file-backed session for `file`/`shadow` targets

mod client;
pub mod config;
pub mod document;
mod errors;
mod status;
pub mod transport;
mod utils;
mod version;

pub use client::*;
pub use document::CibDocument;
pub use document::Element;
pub use errors::*;
pub use status::*;
pub use version::*;

#[cfg(test)]
mod version_test;

//-----------------------------------------------------------
// Test utils

#[cfg(test)]
pub(crate) mod test_utils;
