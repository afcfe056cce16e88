use std::process::ExitCode;

use common::output::OutputError;
use common::resolver::ResolveError;
use common::stream::StreamError;

use crate::cli::op::ConflictingOperations;
use crate::cli::OpError;
use crate::state::StateError;

/// Process exit statuses; scripts depend on these numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitStatus {
    Success = 0,
    Usage = 1,
    IdentityNotFound = 2,
    IdentityRequestTimeout = 3,
    InvalidReference = 4,
    IdentityFileNotFound = 5,
    IdentityFileUnreadable = 6,
    InputNotFound = 7,
    InputUnreadable = 8,
    OutputUnavailable = 9,
    InputMissing = 10,
    OutputMissing = 11,
    Io = 12,
    NoPrivateKey = 13,
    DecryptionFailed = 14,
    SignatureInvalid = 15,
}

impl ExitStatus {
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        ExitCode::from(status.code())
    }
}

/// Errors that know which exit status they end the process with
pub trait ToExitStatus {
    fn exit_status(&self) -> ExitStatus;
}

impl ToExitStatus for ResolveError {
    fn exit_status(&self) -> ExitStatus {
        match self {
            ResolveError::IdentityNotFound(_) => ExitStatus::IdentityNotFound,
            ResolveError::RequestTimeout { .. } => ExitStatus::IdentityRequestTimeout,
            ResolveError::InvalidReference(_) => ExitStatus::InvalidReference,
            ResolveError::FileNotFound(_) => ExitStatus::IdentityFileNotFound,
            ResolveError::FileRead { .. } => ExitStatus::IdentityFileUnreadable,
        }
    }
}

impl ToExitStatus for StreamError {
    fn exit_status(&self) -> ExitStatus {
        match self {
            StreamError::NoPrivateKey => ExitStatus::NoPrivateKey,
            StreamError::DecryptionFailed { .. } => ExitStatus::DecryptionFailed,
            StreamError::EncryptionFailed { .. } | StreamError::Io(_) => ExitStatus::Io,
        }
    }
}

impl ToExitStatus for OutputError {
    fn exit_status(&self) -> ExitStatus {
        match self {
            OutputError::Exists(_) | OutputError::Open { .. } => ExitStatus::OutputUnavailable,
            OutputError::Commit { .. } => ExitStatus::Io,
        }
    }
}

impl ToExitStatus for std::convert::Infallible {
    fn exit_status(&self) -> ExitStatus {
        match *self {}
    }
}

/// Everything that can end a run early
#[derive(Debug, thiserror::Error)]
pub enum RnidError {
    #[error(transparent)]
    Conflicting(#[from] ConflictingOperations),

    #[error(transparent)]
    State(#[from] StateError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Op(#[from] OpError),
}

impl ToExitStatus for RnidError {
    fn exit_status(&self) -> ExitStatus {
        match self {
            RnidError::Conflicting(_) => ExitStatus::Usage,
            RnidError::State(_) => ExitStatus::Io,
            RnidError::Resolve(e) => e.exit_status(),
            RnidError::Op(e) => e.exit_status(),
        }
    }
}
