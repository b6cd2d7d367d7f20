use std::fmt;

use crate::document::Element;
use crate::CibError;
use crate::StatusCode;

pub(crate) const ADMIN_EPOCH: &str = "admin_epoch";
pub(crate) const EPOCH: &str = "epoch";
pub(crate) const NUM_UPDATES: &str = "num_updates";

/// Version token of the configuration store.
///
/// Ordered lexicographically by `(admin_epoch, epoch, num_updates)`; the
/// derived `Ord` relies on the field order below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct CibVersion {
    pub admin_epoch: i32,
    pub epoch: i32,
    pub num_updates: i32,
}

impl CibVersion {
    /// Read the version attributes of a `<cib>` root element
    pub(crate) fn from_root(root: &Element) -> Result<Self, CibError> {
        let field = |name: &str| -> Result<i32, CibError> {
            let raw = root.attr(name).ok_or_else(|| {
                CibError::from_status(
                    StatusCode::PCMK_ERR_GENERIC,
                    Some(&format!("failed to get CIB version details: <{}> has no {name}", root.name)),
                )
            })?;
            raw.trim().parse::<i32>().map_err(|e| {
                CibError::from_status(
                    StatusCode::PCMK_ERR_GENERIC,
                    Some(&format!("failed to get CIB version details: {name}={raw:?}: {e}")),
                )
            })
        };

        Ok(Self {
            admin_epoch: field(ADMIN_EPOCH)?,
            epoch: field(EPOCH)?,
            num_updates: field(NUM_UPDATES)?,
        })
    }
}

impl fmt::Display for CibVersion {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}:{}:{}", self.admin_epoch, self.epoch, self.num_updates)
    }
}
