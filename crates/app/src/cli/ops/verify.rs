use std::io::Read;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use common::crypto::{Signature, SIGNATURE_LENGTH};
use common::output::default_signature_path;
use common::stream::{verify_stream, Encoding, StreamError};

use super::io::{input_name, open_file, open_input, InputError};
use crate::error::{ExitStatus, ToExitStatus};

/// Check a detached signature over the input
#[derive(Debug, Clone)]
pub struct Verify;

#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error("verification requested, but no signature file specified")]
    SignatureMissing,

    #[error("signature file {0} not found")]
    SignatureNotFound(PathBuf),

    #[error("could not read signature {path}: {source}")]
    SignatureUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0} does not contain a valid signature")]
    Malformed(PathBuf),

    #[error("signature {path} is not valid for {input} and identity {identity}")]
    Invalid {
        path: PathBuf,
        input: String,
        identity: String,
    },

    #[error("an error occurred while verifying data: {0}")]
    Stream(#[from] StreamError),
}

impl ToExitStatus for VerifyError {
    fn exit_status(&self) -> ExitStatus {
        match self {
            VerifyError::Input(e) => e.exit_status(),
            VerifyError::SignatureMissing | VerifyError::SignatureNotFound(_) => {
                ExitStatus::InputMissing
            }
            VerifyError::SignatureUnreadable { .. } => ExitStatus::InputUnreadable,
            VerifyError::Malformed(_) | VerifyError::Invalid { .. } => {
                ExitStatus::SignatureInvalid
            }
            VerifyError::Stream(e) => e.exit_status(),
        }
    }
}

fn read_signature(path: &Path, encoding: Encoding) -> Result<Signature, VerifyError> {
    let file = open_file(path).map_err(|e| match e {
        InputError::Open { path, source } => VerifyError::SignatureUnreadable { path, source },
        _ => VerifyError::SignatureNotFound(path.to_path_buf()),
    })?;

    let mut contents = Vec::with_capacity(SIGNATURE_LENGTH * 2);
    file.take((SIGNATURE_LENGTH * 2) as u64)
        .read_to_end(&mut contents)
        .map_err(|source| VerifyError::SignatureUnreadable {
            path: path.to_path_buf(),
            source,
        })?;

    let bytes = match encoding {
        Encoding::Binary => contents,
        Encoding::Base64 => std::str::from_utf8(&contents)
            .ok()
            .and_then(|text| STANDARD.decode(text.trim()).ok())
            .ok_or_else(|| VerifyError::Malformed(path.to_path_buf()))?,
    };
    Signature::from_slice(&bytes).map_err(|_| VerifyError::Malformed(path.to_path_buf()))
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Verify {
    type Error = VerifyError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let input = open_input(&ctx.io, "verification")?;
        let signature_path = ctx
            .io
            .signature
            .clone()
            .or_else(|| ctx.io.read.as_deref().map(default_signature_path))
            .ok_or(VerifyError::SignatureMissing)?;
        let signature = read_signature(&signature_path, ctx.io.encoding)?;

        tracing::info!(
            "verifying {} against {}",
            input_name(&ctx.io),
            signature_path.display()
        );
        if !verify_stream(&ctx.identity, input, &signature)? {
            return Err(VerifyError::Invalid {
                path: signature_path,
                input: input_name(&ctx.io),
                identity: ctx.identity.to_string(),
            });
        }

        Ok(format!(
            "Signature {} for file {} made by {} is valid",
            signature_path.display(),
            input_name(&ctx.io),
            ctx.identity
        ))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_missing_signature_file_is_missing_input() {
        let temp = tempfile::tempdir().unwrap();
        let err = read_signature(&temp.path().join("absent.rsg"), Encoding::Binary).unwrap_err();

        assert!(matches!(err, VerifyError::SignatureNotFound(_)));
        assert_eq!(err.exit_status(), ExitStatus::InputMissing);
    }

    #[test]
    fn test_short_signature_is_malformed() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("short.rsg");
        std::fs::write(&path, [0u8; 10]).unwrap();

        let err = read_signature(&path, Encoding::Binary).unwrap_err();
        assert_eq!(err.exit_status(), ExitStatus::SignatureInvalid);
    }
}
