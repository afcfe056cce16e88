use common::output::default_decrypt_output;
use common::stream::{CipherStream, StreamError};

use super::io::{input_name, open_input, open_output, InputError, OutputTargetError};
use crate::error::{ExitStatus, ToExitStatus};

/// Decrypt the input with the resolved identity's private key
#[derive(Debug, Clone)]
pub struct Decrypt;

#[derive(Debug, thiserror::Error)]
pub enum DecryptError {
    #[error("identity {0} does not hold a private key, cannot decrypt")]
    NoPrivateKey(String),

    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Output(#[from] OutputTargetError),

    #[error("data could not be decrypted with the specified identity: {0}")]
    Stream(#[from] StreamError),
}

impl ToExitStatus for DecryptError {
    fn exit_status(&self) -> ExitStatus {
        match self {
            DecryptError::NoPrivateKey(_) => ExitStatus::NoPrivateKey,
            DecryptError::Input(e) => e.exit_status(),
            DecryptError::Output(e) => e.exit_status(),
            DecryptError::Stream(e) => e.exit_status(),
        }
    }
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Decrypt {
    type Error = DecryptError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        if !ctx.identity.has_private_key() {
            return Err(DecryptError::NoPrivateKey(ctx.identity.to_string()));
        }

        let mut input = open_input(&ctx.io, "decryption")?;
        let derived = ctx.io.read.as_deref().and_then(default_decrypt_output);
        let mut output = open_output(&ctx.io, derived, "decryption")?;

        tracing::info!("decrypting {}", input_name(&ctx.io));
        let written = CipherStream::new(&ctx.identity)
            .with_encoding(ctx.io.encoding)
            .decrypt(&mut input, output.writer())?;

        let Some(path) = output.commit()? else {
            return Ok(String::new());
        };
        tracing::debug!(bytes = written, "wrote {}", path.display());

        Ok(format!(
            "File {} decrypted with {} to {}",
            input_name(&ctx.io),
            ctx.identity,
            path.display()
        ))
    }
}
