use std::io::Write;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use common::output::default_signature_path;
use common::stream::{sign_stream, Encoding, StreamError};

use super::io::{input_name, open_input, open_output, InputError, OutputTargetError};
use crate::error::{ExitStatus, ToExitStatus};

/// Write a detached signature over the input
#[derive(Debug, Clone)]
pub struct Sign;

#[derive(Debug, thiserror::Error)]
pub enum SignError {
    #[error("identity {0} does not hold a private key, cannot sign")]
    NoPrivateKey(String),

    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Output(#[from] OutputTargetError),

    #[error("an error occurred while signing data: {0}")]
    Stream(#[from] StreamError),
}

impl ToExitStatus for SignError {
    fn exit_status(&self) -> ExitStatus {
        match self {
            SignError::NoPrivateKey(_) => ExitStatus::NoPrivateKey,
            SignError::Input(e) => e.exit_status(),
            SignError::Output(e) => e.exit_status(),
            SignError::Stream(e) => e.exit_status(),
        }
    }
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Sign {
    type Error = SignError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        if !ctx.identity.has_private_key() {
            return Err(SignError::NoPrivateKey(ctx.identity.to_string()));
        }

        let input = open_input(&ctx.io, "signing")?;
        let derived = ctx.io.read.as_deref().map(default_signature_path);
        let mut output = open_output(&ctx.io, derived, "signing")?;

        tracing::info!("signing {}", input_name(&ctx.io));
        let signature = sign_stream(&ctx.identity, input)?;

        let writer = output.writer();
        let written = match ctx.io.encoding {
            Encoding::Binary => writer.write_all(&signature.to_bytes()),
            Encoding::Base64 => writeln!(writer, "{}", STANDARD.encode(signature.to_bytes())),
        };
        written.map_err(OutputTargetError::from)?;

        let Some(path) = output.commit()? else {
            return Ok(String::new());
        };

        Ok(format!(
            "File {} signed with {} to {}",
            input_name(&ctx.io),
            ctx.identity,
            path.display()
        ))
    }
}
