use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use common::output::{GuardedOutput, OutputError};

use crate::cli::op::IoOptions;
use crate::error::{ExitStatus, ToExitStatus};

#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("input file {0} not found")]
    NotFound(PathBuf),

    #[error("could not open input file {path} for reading: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{0} requested, but no input data specified")]
    Missing(&'static str),
}

impl ToExitStatus for InputError {
    fn exit_status(&self) -> ExitStatus {
        match self {
            InputError::NotFound(_) => ExitStatus::InputNotFound,
            InputError::Open { .. } => ExitStatus::InputUnreadable,
            InputError::Missing(_) => ExitStatus::InputMissing,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OutputTargetError {
    #[error("{0} requested, but no output specified")]
    Missing(&'static str),

    #[error(transparent)]
    Unavailable(#[from] OutputError),

    #[error("could not write output: {0}")]
    Io(#[from] io::Error),
}

impl ToExitStatus for OutputTargetError {
    fn exit_status(&self) -> ExitStatus {
        match self {
            OutputTargetError::Missing(_) => ExitStatus::OutputMissing,
            OutputTargetError::Unavailable(e) => e.exit_status(),
            OutputTargetError::Io(_) => ExitStatus::Io,
        }
    }
}

pub enum Input {
    File(File),
    Stdin(io::StdinLock<'static>),
}

impl Read for Input {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Input::File(file) => file.read(buf),
            Input::Stdin(stdin) => stdin.read(buf),
        }
    }
}

/// Open the input an operation reads: `-r <path>`, else stdin with `-I`
pub fn open_input(io: &IoOptions, operation: &'static str) -> Result<Input, InputError> {
    if let Some(path) = &io.read {
        return open_file(path).map(Input::File);
    }
    if io.stdin {
        return Ok(Input::Stdin(io::stdin().lock()));
    }
    Err(InputError::Missing(operation))
}

/// Open a file read as input, telling "missing" apart from "unreadable"
pub fn open_file(path: &Path) -> Result<File, InputError> {
    if !path.is_file() {
        return Err(InputError::NotFound(path.to_path_buf()));
    }
    File::open(path).map_err(|source| InputError::Open {
        path: path.to_path_buf(),
        source,
    })
}

/// Human-readable name of the input
pub fn input_name(io: &IoOptions) -> String {
    match &io.read {
        Some(path) => path.display().to_string(),
        None => "stdin".to_string(),
    }
}

pub enum Output {
    File(GuardedOutput),
    Stdout(io::StdoutLock<'static>),
}

impl Output {
    pub fn writer(&mut self) -> &mut dyn Write {
        match self {
            Output::File(file) => file.writer(),
            Output::Stdout(stdout) => stdout,
        }
    }

    /// Finish writing; returns where the output landed, if it is a file
    pub fn commit(self) -> Result<Option<PathBuf>, OutputTargetError> {
        match self {
            Output::File(file) => Ok(Some(file.commit()?)),
            Output::Stdout(mut stdout) => {
                stdout.flush()?;
                Ok(None)
            }
        }
    }
}

/// Open where an operation writes to
///
/// An explicit `-w` wins, then stdout with `-O`, then the name derived from
/// the input. Existing files are only replaced with `-f`.
pub fn open_output(
    io: &IoOptions,
    derived: Option<PathBuf>,
    operation: &'static str,
) -> Result<Output, OutputTargetError> {
    if io.write.is_none() && io.stdout {
        return Ok(Output::Stdout(io::stdout().lock()));
    }
    GuardedOutput::open(io.write.as_deref(), derived, io.force)?
        .map(Output::File)
        .ok_or(OutputTargetError::Missing(operation))
}
