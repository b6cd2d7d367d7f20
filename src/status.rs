//! Status codes reported by the CIB daemon and the cluster membership layer,
//! and the table that turns them into [`CibError`]s.
//!
//! Two status domains exist:
//! - [`StatusDomain::Cib`]: configuration-daemon return codes. Success is `0`,
//!   failures are negated errno values or negated daemon-specific codes.
//! - [`StatusDomain::Cluster`]: membership/IPC library codes. Success is `1`,
//!   failures are small positive integers.
//!
//! The translation is total: a code that is not listed maps to
//! [`CibError::Generic`] carrying the numeric code and message.

use std::fmt;

use crate::errors::CibError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusDomain {
    Cib,
    Cluster,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusCode {
    pub domain: StatusDomain,
    pub code: i32,
}

// errno values as seen on Linux
const ENXIO: i32 = 6;
const EACCES: i32 = 13;
const EINVAL: i32 = 22;
const ETIME: i32 = 62;
const ECOMM: i32 = 70;
const ENOTUNIQ: i32 = 76;
const EOPNOTSUPP: i32 = 95;
const ECONNABORTED: i32 = 103;
const ECONNRESET: i32 = 104;
const ENOTCONN: i32 = 107;
const ECONNREFUSED: i32 = 111;

impl StatusCode {
    pub const OK: StatusCode = StatusCode::cib(0);

    pub const ENXIO: StatusCode = StatusCode::cib(-ENXIO);
    pub const EACCES: StatusCode = StatusCode::cib(-EACCES);
    pub const EINVAL: StatusCode = StatusCode::cib(-EINVAL);
    pub const ETIME: StatusCode = StatusCode::cib(-ETIME);
    pub const ECOMM: StatusCode = StatusCode::cib(-ECOMM);
    pub const ENOTUNIQ: StatusCode = StatusCode::cib(-ENOTUNIQ);
    pub const EOPNOTSUPP: StatusCode = StatusCode::cib(-EOPNOTSUPP);
    pub const ECONNABORTED: StatusCode = StatusCode::cib(-ECONNABORTED);
    pub const ECONNRESET: StatusCode = StatusCode::cib(-ECONNRESET);
    pub const ENOTCONN: StatusCode = StatusCode::cib(-ENOTCONN);
    pub const ECONNREFUSED: StatusCode = StatusCode::cib(-ECONNREFUSED);

    pub const PCMK_ERR_GENERIC: StatusCode = StatusCode::cib(-201);
    pub const PCMK_ERR_SCHEMA_VALIDATION: StatusCode = StatusCode::cib(-203);
    pub const PCMK_ERR_OLD_DATA: StatusCode = StatusCode::cib(-205);

    pub const CS_OK: StatusCode = StatusCode::cluster(1);
    pub const CS_ERR_LIBRARY: StatusCode = StatusCode::cluster(2);
    pub const CS_ERR_TRY_AGAIN: StatusCode = StatusCode::cluster(6);
    pub const CS_ERR_NOT_EXIST: StatusCode = StatusCode::cluster(12);
    pub const CS_ERR_EXIST: StatusCode = StatusCode::cluster(18);
    pub const CS_ERR_NOT_SUPPORTED: StatusCode = StatusCode::cluster(20);

    pub const fn cib(code: i32) -> Self {
        Self {
            domain: StatusDomain::Cib,
            code,
        }
    }

    pub const fn cluster(code: i32) -> Self {
        Self {
            domain: StatusDomain::Cluster,
            code,
        }
    }

    pub fn is_ok(&self) -> bool {
        match self.domain {
            StatusDomain::Cib => self.code == 0,
            StatusDomain::Cluster => self.code == 1,
        }
    }

    /// Symbolic name, empty for codes outside the table
    pub fn name(&self) -> &'static str {
        match self.domain {
            StatusDomain::Cib => match self.code.wrapping_neg() {
                0 => "pcmk_ok",
                ENXIO => "ENXIO",
                EACCES => "EACCES",
                EINVAL => "EINVAL",
                ETIME => "ETIME",
                ECOMM => "ECOMM",
                ENOTUNIQ => "ENOTUNIQ",
                EOPNOTSUPP => "EOPNOTSUPP",
                ECONNABORTED => "ECONNABORTED",
                ECONNRESET => "ECONNRESET",
                ENOTCONN => "ENOTCONN",
                ECONNREFUSED => "ECONNREFUSED",
                201 => "pcmk_err_generic",
                203 => "pcmk_err_schema_validation",
                205 => "pcmk_err_old_data",
                _ => "",
            },
            StatusDomain::Cluster => match self.code {
                1 => "CS_OK",
                2 => "CS_ERR_LIBRARY",
                6 => "CS_ERR_TRY_AGAIN",
                12 => "CS_ERR_NOT_EXIST",
                18 => "CS_ERR_EXIST",
                20 => "CS_ERR_NOT_SUPPORTED",
                _ => "",
            },
        }
    }

    pub fn description(&self) -> &'static str {
        match self.domain {
            StatusDomain::Cib => match self.code.wrapping_neg() {
                0 => "OK",
                ENXIO => "No such device or address",
                EACCES => "Permission denied",
                EINVAL => "Invalid argument",
                ETIME => "Timer expired",
                ECOMM => "Communication error on send",
                ENOTUNIQ => "Name not unique on network",
                EOPNOTSUPP => "Operation not supported",
                ECONNABORTED => "Software caused connection abort",
                ECONNRESET => "Connection reset by peer",
                ENOTCONN => "Transport endpoint is not connected",
                ECONNREFUSED => "Connection refused",
                201 => "Error",
                203 => "Update does not conform to the configured schema",
                205 => "Update was older than existing configuration",
                _ => "Unknown error",
            },
            StatusDomain::Cluster => match self.code {
                1 => "success",
                2 => "error in library",
                6 => "try again",
                12 => "doesn't exist",
                18 => "already exists",
                20 => "not supported",
                _ => "unknown error",
            },
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}: {} {}", self.code, self.name(), self.description())
    }
}

impl CibError {
    /// Translate a status code into its error kind.
    ///
    /// `detail` is appended to the status text when the caller has more
    /// context (the selector, section or node that was addressed).
    pub fn from_status(
        status: StatusCode,
        detail: Option<&str>,
    ) -> Self {
        let message = match detail {
            Some(detail) => format!("{status} ({detail})"),
            None => status.to_string(),
        };

        match status.domain {
            StatusDomain::Cib => match status.code.wrapping_neg() {
                ENXIO => CibError::NotFound(message),
                ENOTCONN | ECONNABORTED | ECONNREFUSED | ECONNRESET | ECOMM => CibError::Connection(message),
                ENOTUNIQ => CibError::AlreadyExists(message),
                EOPNOTSUPP => CibError::NotSupported(message),
                _ => CibError::Generic {
                    code: status.code,
                    message,
                },
            },
            StatusDomain::Cluster => match status.code {
                12 => CibError::NotFound(message),
                2 => CibError::Connection(message),
                18 => CibError::AlreadyExists(message),
                20 => CibError::NotSupported(message),
                _ => CibError::Generic {
                    code: status.code,
                    message,
                },
            },
        }
    }

    /// Failure to open or sign on to the primary session.
    ///
    /// Whatever the underlying status, the caller sees a Connection error;
    /// the status text is kept in the message.
    pub fn connection_failure(status: StatusCode) -> Self {
        CibError::Connection(format!("unable to open CIB session: {status}"))
    }
}

impl From<StatusCode> for CibError {
    fn from(status: StatusCode) -> Self {
        CibError::from_status(status, None)
    }
}
