//! Output naming and overwrite protection
//!
//! Outputs are written to a temporary file next to the destination and only
//! renamed into place on [`GuardedOutput::commit`]. An output that is dropped
//! without being committed leaves nothing behind.

use std::ffi::OsString;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

/// Extension appended to encrypted files
pub const ENCRYPTED_EXTENSION: &str = "rfe";
/// Extension appended to detached signatures
pub const SIGNATURE_EXTENSION: &str = "rsg";

#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("output file {0} already exists, not overwriting")]
    Exists(PathBuf),

    #[error("could not open output {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not move output into place at {path}: {source}")]
    Commit {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

fn with_appended_extension(path: &Path, extension: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".");
    name.push(extension);
    PathBuf::from(name)
}

/// `foo.txt` becomes `foo.txt.rfe`
pub fn default_encrypt_output(input: &Path) -> PathBuf {
    with_appended_extension(input, ENCRYPTED_EXTENSION)
}

/// `foo.txt.rfe` (any case) becomes `foo.txt`; other names have no default
pub fn default_decrypt_output(input: &Path) -> Option<PathBuf> {
    let extension = input.extension()?;
    if !extension.eq_ignore_ascii_case(ENCRYPTED_EXTENSION) {
        return None;
    }
    let stem = input.file_stem()?;
    Some(input.with_file_name(stem))
}

/// `foo.txt` becomes `foo.txt.rsg`
pub fn default_signature_path(input: &Path) -> PathBuf {
    with_appended_extension(input, SIGNATURE_EXTENSION)
}

/// Pick the explicit output or the derived default and check it may be written
///
/// Returns `Ok(None)` when neither is available.
pub fn resolve_output_path(
    requested: Option<&Path>,
    derived: Option<PathBuf>,
    force: bool,
) -> Result<Option<PathBuf>, OutputError> {
    let Some(path) = requested.map(Path::to_path_buf).or(derived) else {
        return Ok(None);
    };
    if path.exists() && !force {
        return Err(OutputError::Exists(path));
    }
    Ok(Some(path))
}

/// An output file that only appears at its destination once complete
#[derive(Debug)]
pub struct GuardedOutput {
    path: PathBuf,
    force: bool,
    file: NamedTempFile,
}

impl GuardedOutput {
    /// Check `path` may be written and open a temporary file beside it
    pub fn create(path: impl Into<PathBuf>, force: bool) -> Result<Self, OutputError> {
        let path = path.into();
        resolve_output_path(Some(&path), None, force)?;
        Self::open_beside(path, force)
    }

    /// Guard the explicit output, or else the derived one
    ///
    /// `Ok(None)` means there is nowhere to write.
    pub fn open(
        requested: Option<&Path>,
        derived: Option<PathBuf>,
        force: bool,
    ) -> Result<Option<Self>, OutputError> {
        resolve_output_path(requested, derived, force)?
            .map(|path| Self::open_beside(path, force))
            .transpose()
    }

    fn open_beside(path: PathBuf, force: bool) -> Result<Self, OutputError> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let file = tempfile::Builder::new()
            .prefix(".rnid-")
            .suffix(".part")
            .tempfile_in(&dir)
            .map_err(|source| OutputError::Open {
                path: path.clone(),
                source,
            })?;

        tracing::debug!(
            "writing {} through {}",
            path.display(),
            file.path().display()
        );
        Ok(Self { path, force, file })
    }

    pub fn writer(&mut self) -> &mut File {
        self.file.as_file_mut()
    }

    /// Flush and rename the temporary file to the destination
    pub fn commit(mut self) -> Result<PathBuf, OutputError> {
        let path = self.path;
        let commit_error = |source: io::Error| OutputError::Commit {
            path: path.clone(),
            source,
        };

        self.file.as_file_mut().flush().map_err(commit_error)?;
        self.file.as_file().sync_all().map_err(commit_error)?;

        let persisted = if self.force {
            self.file.persist(&path)
        } else {
            self.file.persist_noclobber(&path)
        };
        match persisted {
            Ok(_) => Ok(path),
            Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => {
                Err(OutputError::Exists(path))
            }
            Err(e) => Err(commit_error(e.error)),
        }
    }
}
