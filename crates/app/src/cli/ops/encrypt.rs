use common::output::default_encrypt_output;
use common::stream::{CipherStream, StreamError};

use super::io::{input_name, open_input, open_output, InputError, OutputTargetError};
use crate::error::{ExitStatus, ToExitStatus};

/// Encrypt the input for the resolved identity
#[derive(Debug, Clone)]
pub struct Encrypt;

#[derive(Debug, thiserror::Error)]
pub enum EncryptError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Output(#[from] OutputTargetError),

    #[error("an error occurred while encrypting data: {0}")]
    Stream(#[from] StreamError),
}

impl ToExitStatus for EncryptError {
    fn exit_status(&self) -> ExitStatus {
        match self {
            EncryptError::Input(e) => e.exit_status(),
            EncryptError::Output(e) => e.exit_status(),
            EncryptError::Stream(e) => e.exit_status(),
        }
    }
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Encrypt {
    type Error = EncryptError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let mut input = open_input(&ctx.io, "encryption")?;
        let derived = ctx.io.read.as_deref().map(default_encrypt_output);
        let mut output = open_output(&ctx.io, derived, "encryption")?;

        tracing::info!("encrypting {}", input_name(&ctx.io));
        let written = CipherStream::new(&ctx.identity)
            .with_encoding(ctx.io.encoding)
            .encrypt(&mut input, output.writer())?;

        let Some(path) = output.commit()? else {
            return Ok(String::new());
        };
        tracing::debug!(bytes = written, "wrote {}", path.display());

        Ok(format!(
            "File {} encrypted for {} to {}",
            input_name(&ctx.io),
            ctx.identity,
            path.display()
        ))
    }
}
