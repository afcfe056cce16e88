use std::error::Error;
use std::path::PathBuf;

use common::identity::Identity;
use common::stream::Encoding;

use super::args::Args;
use crate::error::ToExitStatus;

/// Where an operation reads from and writes to
#[derive(Debug, Clone, Default)]
pub struct IoOptions {
    pub read: Option<PathBuf>,
    pub write: Option<PathBuf>,
    pub stdin: bool,
    pub stdout: bool,
    pub force: bool,
    pub encoding: Encoding,
    pub signature: Option<PathBuf>,
}

impl From<&Args> for IoOptions {
    fn from(args: &Args) -> Self {
        Self {
            read: args.read.clone(),
            write: args.write.clone(),
            stdin: args.stdin,
            stdout: args.stdout,
            force: args.force,
            encoding: if args.base64 {
                Encoding::Base64
            } else {
                Encoding::Binary
            },
            signature: args.signature.clone(),
        }
    }
}

pub struct OpContext {
    /// The resolved identity every operation works against
    pub identity: Identity,
    pub io: IoOptions,
}

impl OpContext {
    pub fn new(identity: Identity, io: IoOptions) -> Self {
        Self { identity, io }
    }
}

#[async_trait::async_trait]
pub trait Op: Send + Sync {
    type Error: Error + ToExitStatus + Send + Sync + 'static;
    type Output;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error>;
}

/// More than one operation flag was given
#[derive(Debug, thiserror::Error)]
#[error(
    "only one of the encrypt, decrypt, sign, verify or print-identity operations \
     is supported per invocation (got {})",
    .0.join(", ")
)]
pub struct ConflictingOperations(pub Vec<&'static str>);

#[macro_export]
macro_rules! operation_enum {
    ($(($variant:ident, $type:ty)),* $(,)?) => {
        #[derive(Debug, Clone)]
        pub enum Operation {
            $($variant($type),)*
        }

        #[derive(Debug)]
        pub enum OpOutput {
            $($variant(<$type as $crate::cli::op::Op>::Output),)*
        }

        #[derive(Debug, thiserror::Error)]
        pub enum OpError {
            $(
                #[error(transparent)]
                $variant(<$type as $crate::cli::op::Op>::Error),
            )*
        }

        #[async_trait::async_trait]
        impl $crate::cli::op::Op for Operation {
            type Output = OpOutput;
            type Error = OpError;

            async fn execute(&self, ctx: &$crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
                match self {
                    $(
                        Operation::$variant(op) => {
                            $crate::cli::op::Op::execute(op, ctx).await
                                .map(OpOutput::$variant)
                                .map_err(OpError::$variant)
                        },
                    )*
                }
            }
        }

        impl $crate::error::ToExitStatus for OpError {
            fn exit_status(&self) -> $crate::error::ExitStatus {
                match self {
                    $(
                        OpError::$variant(e) => $crate::error::ToExitStatus::exit_status(e),
                    )*
                }
            }
        }

        impl std::fmt::Display for OpOutput {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(
                        OpOutput::$variant(output) => write!(f, "{}", output),
                    )*
                }
            }
        }
    };
}
