//! Reads and writes against the primary session.

use tracing::trace;

use super::CibClient;
use crate::document::CibDocument;
use crate::transport::CallOptions;
use crate::transport::MutationOp;
use crate::utils::ScopedTimer;
use crate::CibVersion;
use crate::Result;

/// Selector of the version-carrying root element
const ROOT_SELECTOR: &str = "/cib";

impl CibClient {
    /// Whole document
    pub async fn query(&mut self) -> Result<CibDocument> {
        self.query_with("", false).await
    }

    /// Root element only
    pub async fn query_no_children(&mut self) -> Result<CibDocument> {
        self.query_with("", true).await
    }

    /// Elements selected by `xpath`; several matches come back wrapped in one
    /// `<xpath-query>` element
    pub async fn query_xpath(
        &mut self,
        xpath: &str,
    ) -> Result<CibDocument> {
        self.query_with(xpath, false).await
    }

    pub async fn query_xpath_no_children(
        &mut self,
        xpath: &str,
    ) -> Result<CibDocument> {
        self.query_with(xpath, true).await
    }

    /// Current version of the document
    ///
    /// # Errors
    /// Generic when the root lacks a version attribute or one is malformed.
    pub async fn version(&mut self) -> Result<CibVersion> {
        let document = self.query_with(ROOT_SELECTOR, true).await?;
        Ok(CibVersion::from_root(document.root())?)
    }

    async fn query_with(
        &mut self,
        xpath: &str,
        no_children: bool,
    ) -> Result<CibDocument> {
        let _timer = ScopedTimer::new("cib::query");
        let options = CallOptions::for_query(xpath, no_children);

        let result = self.primary()?.query(xpath, options).await;
        let bytes = result.map_err(|status| self.primary_failure(status, xpath))?;
        trace!(xpath, bytes = bytes.len(), "query answered");
        Ok(CibDocument::decode(&bytes)?)
    }

    /// Add `document` to `section` (empty: the whole document), creating
    /// missing ancestors
    pub async fn create_obj_in_section(
        &mut self,
        section: &str,
        document: &CibDocument,
    ) -> Result<()> {
        self.mutate(MutationOp::Create, section, document).await
    }

    /// Merge `document` into the existing object it names
    pub async fn update_obj_in_section(
        &mut self,
        section: &str,
        document: &CibDocument,
    ) -> Result<()> {
        self.mutate(MutationOp::Update, section, document).await
    }

    /// Supplant the existing object `document` names
    pub async fn replace_obj_in_section(
        &mut self,
        section: &str,
        document: &CibDocument,
    ) -> Result<()> {
        self.mutate(MutationOp::Replace, section, document).await
    }

    /// Remove the existing object `document` names
    pub async fn delete_obj_in_section(
        &mut self,
        section: &str,
        document: &CibDocument,
    ) -> Result<()> {
        self.mutate(MutationOp::Delete, section, document).await
    }

    /// Apply one write and wait for the acknowledgement
    pub async fn mutate(
        &mut self,
        op: MutationOp,
        section: &str,
        document: &CibDocument,
    ) -> Result<()> {
        let _timer = ScopedTimer::new(timer_name(op));
        let payload = document.encode_xml_compact();

        let result = self.primary()?.mutate(op, section, &payload, op.call_options()).await;
        result.map_err(|status| {
            let detail = if section.is_empty() {
                format!("{op} <{}>", document.root().name)
            } else {
                format!("{op} <{}> in section {section}", document.root().name)
            };
            self.primary_failure(status, &detail)
        })
    }
}

fn timer_name(op: MutationOp) -> &'static str {
    match op {
        MutationOp::Create => "cib::create",
        MutationOp::Update => "cib::update",
        MutationOp::Replace => "cib::replace",
        MutationOp::Delete => "cib::delete",
    }
}
