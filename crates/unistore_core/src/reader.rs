//! Streaming reads.

use crate::error::{Error, ErrorKind, Result};
use crate::operator::Operator;
use bytes::{Buf, Bytes};
use std::io;
use unistore_storage::OpRead;

/// A cursor over the contents of one object.
///
/// The object length is captured when the reader is opened. Data is fetched
/// in ranged reads of the operator's chunk size and handed out as the caller
/// asks for it. Every call to [`Reader::read`] fills the buffer completely
/// unless the end of the object is reached first.
///
/// Each fetch is one ranged backend read. Over an `EncryptionLayer` every
/// fetch decrypts the whole object, so reading it through costs about `len * len / chunk_size` bytes
/// of work. Use [`Operator::read`] or a chunk size of at least the object
/// length there.
pub struct Reader {
    op: Operator,
    path: String,
    abs: String,
    len: u64,
    pos: u64,
    buffered: Bytes,
}

impl Reader {
    pub(crate) fn new(op: Operator, path: String, abs: String, len: u64) -> Self {
        Self {
            op,
            path,
            abs,
            len,
            pos: 0,
            buffered: Bytes::new(),
        }
    }

    /// Returns the object path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the object length seen when the reader was opened.
    #[must_use]
    pub fn content_length(&self) -> u64 {
        self.len
    }

    /// Returns the position of the next byte to be read.
    #[must_use]
    pub fn position(&self) -> u64 {
        self.pos
    }

    /// Reads into `buf`, returning the number of bytes copied.
    ///
    /// Returns `0` only at the end of the object (or for an empty `buf`).
    ///
    /// # Errors
    ///
    /// Returns the backend error of a failed fetch. Bytes copied before the
    /// failure stay consumed.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            if self.buffered.is_empty() && !self.fetch()? {
                break;
            }
            let n = self.buffered.len().min(buf.len() - filled);
            buf[filled..filled + n].copy_from_slice(&self.buffered[..n]);
            self.buffered.advance(n);
            self.pos += n as u64;
            filled += n;
        }
        Ok(filled)
    }

    /// Reads everything from the current position to the end.
    ///
    /// # Errors
    ///
    /// Returns the backend error of a failed fetch.
    pub fn read_all(&mut self) -> Result<Bytes> {
        let remaining = self.len.saturating_sub(self.pos) as usize;
        let mut out = Vec::with_capacity(remaining);
        out.extend_from_slice(&self.buffered);
        self.pos += self.buffered.len() as u64;
        self.buffered.clear();
        while self.fetch()? {
            out.extend_from_slice(&self.buffered);
            self.pos += self.buffered.len() as u64;
            self.buffered.clear();
        }
        Ok(Bytes::from(out))
    }

    /// Fetches the next chunk. Returns false at the end of the object.
    fn fetch(&mut self) -> Result<bool> {
        if self.pos >= self.len {
            return Ok(false);
        }
        let end = self
            .pos
            .saturating_add(self.op.chunk_size() as u64)
            .min(self.len);
        let args = OpRead::new().with_range(self.pos..end);
        let chunk = self
            .op
            .backend()
            .read(&self.abs, &args)
            .map_err(|e| Error::from_storage("read", self.path.clone(), e))?;
        if chunk.is_empty() {
            // The object shrank after the reader was opened.
            self.len = self.pos;
            return Ok(false);
        }
        self.buffered = chunk;
        Ok(true)
    }

    fn seek_to(&mut self, target: u64) {
        let ahead = target.checked_sub(self.pos);
        match ahead {
            Some(skip) if skip < self.buffered.len() as u64 => self.buffered.advance(skip as usize),
            _ => self.buffered.clear(),
        }
        self.pos = target;
    }
}

impl io::Read for Reader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Reader::read(self, buf).map_err(io::Error::from)
    }
}

impl io::Seek for Reader {
    fn seek(&mut self, pos: io::SeekFrom) -> io::Result<u64> {
        let target = match pos {
            io::SeekFrom::Start(n) => Some(n),
            io::SeekFrom::End(delta) => self.len.checked_add_signed(delta),
            io::SeekFrom::Current(delta) => self.pos.checked_add_signed(delta),
        };
        let target = target.ok_or_else(|| {
            io::Error::from(Error::new(
                ErrorKind::ConfigInvalid,
                "seek to a negative or overflowing position",
            ))
        })?;
        self.seek_to(target);
        Ok(target)
    }
}

impl std::fmt::Debug for Reader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reader")
            .field("path", &self.path)
            .field("len", &self.len)
            .field("pos", &self.pos)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use crate::Operator;
    use proptest::prelude::*;
    use std::io::{Read, Seek, SeekFrom};

    fn operator(chunk: usize) -> Operator {
        Operator::new("memory", [("chunk_size", chunk.to_string())]).unwrap()
    }

    #[test]
    fn chunked_reads_fill_the_buffer() {
        let op = operator(7);
        let data: Vec<u8> = (0..100u8).collect();
        op.write("obj", data.clone()).unwrap();

        let mut reader = op.reader("obj").unwrap();
        let mut buf = [0u8; 30];
        let mut calls = Vec::new();
        let mut out = Vec::new();
        loop {
            let n = reader.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            calls.push(n);
            out.extend_from_slice(&buf[..n]);
        }
        assert_eq!(calls, vec![30, 30, 30, 10]);
        assert_eq!(out, data);
    }

    #[test]
    fn eof_returns_zero_repeatedly() {
        let op = operator(4);
        op.write("obj", "abc").unwrap();
        let mut reader = op.reader("obj").unwrap();
        assert_eq!(&reader.read_all().unwrap()[..], b"abc");
        let mut buf = [0u8; 8];
        assert_eq!(reader.read(&mut buf).unwrap(), 0);
        assert_eq!(reader.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn empty_buffer_reads_nothing() {
        let op = operator(4);
        op.write("obj", "abc").unwrap();
        let mut reader = op.reader("obj").unwrap();
        assert_eq!(reader.read(&mut []).unwrap(), 0);
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn io_read_and_seek() {
        let op = operator(3);
        op.write("obj", "hello world").unwrap();
        let mut reader = op.reader("obj").unwrap();

        reader.seek(SeekFrom::Start(6)).unwrap();
        let mut s = String::new();
        reader.read_to_string(&mut s).unwrap();
        assert_eq!(s, "world");

        reader.seek(SeekFrom::End(-5)).unwrap();
        let mut buf = [0u8; 2];
        Read::read_exact(&mut reader, &mut buf).unwrap();
        assert_eq!(&buf, b"wo");

        reader.seek(SeekFrom::Current(-4)).unwrap();
        Read::read_exact(&mut reader, &mut buf).unwrap();
        assert_eq!(&buf, b"o ");

        assert!(reader.seek(SeekFrom::Current(-100)).is_err());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn seek_then_read_matches_the_slice(
            data in proptest::collection::vec(any::<u8>(), 0..512),
            chunk in 1usize..64,
            first in 0usize..600,
            target in 0usize..600,
        ) {
            let op = operator(chunk);
            op.write("obj", data.clone()).unwrap();
            let mut reader = op.reader("obj").unwrap();

            // Leave something buffered before seeking.
            let mut head = vec![0u8; first.min(data.len())];
            reader.read(&mut head).unwrap();

            reader.seek(SeekFrom::Start(target as u64)).unwrap();
            let rest = reader.read_all().unwrap();
            let expected = data.get(target..).unwrap_or_default();
            prop_assert_eq!(&rest[..], expected);
            prop_assert_eq!(reader.position(), data.len().max(target) as u64);
        }
    }
}
