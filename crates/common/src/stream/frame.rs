use std::io::{self, BufRead, BufReader, Read, Write};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use super::{Encoding, MAX_UNIT_SIZE};

const LENGTH_PREFIX_SIZE: usize = 4;

/// Why a unit could not be read back out of the stream
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("stream ends in the middle of a unit")]
    Truncated,
    #[error("unit claims {0} bytes, more than any unit can hold")]
    Oversized(usize),
    #[error("unit is not valid base64")]
    Base64,
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Writes ciphertext units so their boundaries survive on disk
pub(crate) struct UnitWriter<W: Write> {
    inner: W,
    encoding: Encoding,
}

impl<W: Write> UnitWriter<W> {
    pub fn new(inner: W, encoding: Encoding) -> Self {
        Self { inner, encoding }
    }

    /// Write one unit, returning the number of bytes it took on the wire
    pub fn write_unit(&mut self, unit: &[u8]) -> io::Result<u64> {
        match self.encoding {
            Encoding::Binary => {
                let len = u32::try_from(unit.len()).map_err(|_| {
                    io::Error::new(io::ErrorKind::InvalidInput, "unit too large to frame")
                })?;
                self.inner.write_all(&len.to_be_bytes())?;
                self.inner.write_all(unit)?;
                Ok((LENGTH_PREFIX_SIZE + unit.len()) as u64)
            }
            Encoding::Base64 => {
                let mut line = STANDARD.encode(unit);
                line.push('\n');
                self.inner.write_all(line.as_bytes())?;
                Ok(line.len() as u64)
            }
        }
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Reads back the units written by [`UnitWriter`]
pub(crate) struct UnitReader<R: Read> {
    inner: BufReader<R>,
    encoding: Encoding,
}

impl<R: Read> UnitReader<R> {
    pub fn new(inner: R, encoding: Encoding) -> Self {
        Self {
            inner: BufReader::new(inner),
            encoding,
        }
    }

    /// The next unit, or `None` at a clean end of stream
    pub fn next_unit(&mut self) -> Result<Option<Vec<u8>>, FrameError> {
        match self.encoding {
            Encoding::Binary => self.next_binary(),
            Encoding::Base64 => self.next_base64(),
        }
    }

    fn next_binary(&mut self) -> Result<Option<Vec<u8>>, FrameError> {
        let mut prefix = [0u8; LENGTH_PREFIX_SIZE];
        let mut filled = 0;
        while filled < LENGTH_PREFIX_SIZE {
            match self.inner.read(&mut prefix[filled..]) {
                Ok(0) if filled == 0 => return Ok(None),
                Ok(0) => return Err(FrameError::Truncated),
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        let len = u32::from_be_bytes(prefix) as usize;
        if len > MAX_UNIT_SIZE {
            return Err(FrameError::Oversized(len));
        }

        let mut unit = vec![0u8; len];
        self.inner.read_exact(&mut unit).map_err(|e| match e.kind() {
            io::ErrorKind::UnexpectedEof => FrameError::Truncated,
            _ => FrameError::Io(e),
        })?;
        Ok(Some(unit))
    }

    fn next_base64(&mut self) -> Result<Option<Vec<u8>>, FrameError> {
        // 4 output characters per 3 input bytes, plus padding and line ending
        let max_line = (MAX_UNIT_SIZE / 3 + 1) * 4 + 2;

        loop {
            let mut line = Vec::new();
            let read = (&mut self.inner)
                .take(max_line as u64)
                .read_until(b'\n', &mut line)?;
            if read == 0 {
                return Ok(None);
            }
            if read == max_line && line.last() != Some(&b'\n') {
                return Err(FrameError::Oversized(read));
            }

            let text = std::str::from_utf8(&line)
                .map_err(|_| FrameError::Base64)?
                .trim();
            if text.is_empty() {
                continue;
            }
            return STANDARD
                .decode(text)
                .map(Some)
                .map_err(|_| FrameError::Base64);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn write_units(units: &[&[u8]], encoding: Encoding) -> Vec<u8> {
        let mut out = Vec::new();
        let mut writer = UnitWriter::new(&mut out, encoding);
        for unit in units {
            writer.write_unit(unit).unwrap();
        }
        writer.flush().unwrap();
        out
    }

    #[test]
    fn test_binary_units_keep_boundaries() {
        let encoded = write_units(&[b"a", b"", b"longer unit"], Encoding::Binary);
        assert_eq!(&encoded[..4], &1u32.to_be_bytes());

        let mut reader = UnitReader::new(encoded.as_slice(), Encoding::Binary);
        assert_eq!(reader.next_unit().unwrap().unwrap(), b"a");
        assert_eq!(reader.next_unit().unwrap().unwrap(), b"");
        assert_eq!(reader.next_unit().unwrap().unwrap(), b"longer unit");
        assert!(reader.next_unit().unwrap().is_none());
    }

    #[test]
    fn test_base64_units_are_lines() {
        let encoded = write_units(&[b"first", b"second"], Encoding::Base64);
        let text = String::from_utf8(encoded.clone()).unwrap();
        assert_eq!(text.lines().count(), 2);

        let mut reader = UnitReader::new(encoded.as_slice(), Encoding::Base64);
        assert_eq!(reader.next_unit().unwrap().unwrap(), b"first");
        assert_eq!(reader.next_unit().unwrap().unwrap(), b"second");
        assert!(reader.next_unit().unwrap().is_none());
    }

    #[test]
    fn test_base64_tolerates_blank_lines_and_crlf() {
        let input = format!("\r\n{}\r\n\n", STANDARD.encode(b"unit"));
        let mut reader = UnitReader::new(input.as_bytes(), Encoding::Base64);
        assert_eq!(reader.next_unit().unwrap().unwrap(), b"unit");
        assert!(reader.next_unit().unwrap().is_none());
    }

    #[test]
    fn test_truncation_detected() {
        let encoded = write_units(&[b"0123456789"], Encoding::Binary);

        let mut short_prefix = UnitReader::new(&encoded[..2], Encoding::Binary);
        assert!(matches!(short_prefix.next_unit(), Err(FrameError::Truncated)));

        let mut short_body = UnitReader::new(&encoded[..8], Encoding::Binary);
        assert!(matches!(short_body.next_unit(), Err(FrameError::Truncated)));
    }

    #[test]
    fn test_oversized_prefix_rejected() {
        let bogus = u32::MAX.to_be_bytes();
        let mut reader = UnitReader::new(&bogus[..], Encoding::Binary);
        assert!(matches!(reader.next_unit(), Err(FrameError::Oversized(_))));
    }

    #[test]
    fn test_bad_base64_rejected() {
        let mut reader = UnitReader::new(&b"***not base64***\n"[..], Encoding::Base64);
        assert!(matches!(reader.next_unit(), Err(FrameError::Base64)));
    }
}
