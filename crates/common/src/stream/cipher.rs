use std::io::{self, Read, Write};

use crate::identity::{Identity, IdentityError};

use super::frame::{FrameError, UnitReader, UnitWriter};
use super::{Encoding, DEFAULT_CHUNK_SIZE};

#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error("identity does not hold a private key")]
    NoPrivateKey,

    #[error("ciphertext unit {index} could not be decrypted: {reason}")]
    DecryptionFailed { index: u64, reason: String },

    #[error("chunk {index} could not be encrypted: {source}")]
    EncryptionFailed {
        index: u64,
        #[source]
        source: IdentityError,
    },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl StreamError {
    fn unit(index: u64, reason: impl ToString) -> Self {
        StreamError::DecryptionFailed {
            index,
            reason: reason.to_string(),
        }
    }
}

/// Encrypts or decrypts a stream against one identity
///
/// Holds at most one plaintext chunk and one ciphertext unit in memory.
///
/// # Examples
///
/// ```ignore
/// let mut ciphertext = Vec::new();
/// CipherStream::new(&identity).encrypt(&plaintext[..], &mut ciphertext)?;
///
/// let mut recovered = Vec::new();
/// CipherStream::new(&identity).decrypt(&ciphertext[..], &mut recovered)?;
/// ```
#[derive(Debug, Clone, Copy)]
pub struct CipherStream<'a> {
    identity: &'a Identity,
    chunk_size: usize,
    encoding: Encoding,
}

impl<'a> CipherStream<'a> {
    pub fn new(identity: &'a Identity) -> Self {
        Self {
            identity,
            chunk_size: DEFAULT_CHUNK_SIZE,
            encoding: Encoding::Binary,
        }
    }

    /// Use smaller chunks; clamped to `1..=DEFAULT_CHUNK_SIZE`
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.clamp(1, DEFAULT_CHUNK_SIZE);
        self
    }

    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Encrypt everything `reader` yields into framed units on `writer`
    ///
    /// Returns the number of bytes written, framing included.
    pub fn encrypt<R: Read, W: Write>(&self, mut reader: R, writer: W) -> Result<u64, StreamError> {
        let mut units = UnitWriter::new(writer, self.encoding);
        let mut chunk = Vec::with_capacity(self.chunk_size);
        let mut written = 0u64;
        let mut index = 0u64;

        loop {
            chunk.clear();
            let read = (&mut reader)
                .take(self.chunk_size as u64)
                .read_to_end(&mut chunk)?;
            if read == 0 {
                break;
            }

            let unit = self
                .identity
                .encrypt(&chunk)
                .map_err(|source| StreamError::EncryptionFailed { index, source })?;
            written += units.write_unit(&unit)?;
            index += 1;
        }

        units.flush()?;
        tracing::debug!(units = index, bytes = written, "encrypted stream");
        Ok(written)
    }

    /// Decrypt framed units from `reader` into plaintext on `writer`
    ///
    /// Fails with [`StreamError::NoPrivateKey`] before reading anything if the
    /// identity cannot decrypt. A unit's plaintext is only written once the
    /// whole unit has been opened; units before a failing one stay written.
    ///
    /// Returns the number of plaintext bytes written.
    pub fn decrypt<R: Read, W: Write>(&self, reader: R, mut writer: W) -> Result<u64, StreamError> {
        if !self.identity.has_private_key() {
            return Err(StreamError::NoPrivateKey);
        }

        let mut units = UnitReader::new(reader, self.encoding);
        let mut written = 0u64;
        let mut index = 0u64;

        loop {
            let unit = match units.next_unit() {
                Ok(Some(unit)) => unit,
                Ok(None) => break,
                Err(FrameError::Io(e)) => return Err(e.into()),
                Err(e) => return Err(StreamError::unit(index, e)),
            };

            let plaintext = self
                .identity
                .decrypt(&unit)
                .map_err(|e| StreamError::unit(index, e))?;
            writer.write_all(&plaintext)?;
            written += plaintext.len() as u64;
            index += 1;
        }

        writer.flush()?;
        tracing::debug!(units = index, bytes = written, "decrypted stream");
        Ok(written)
    }
}
