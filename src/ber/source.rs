//! Byte sources
//!
//! All decoding goes through the [`DataSource`] trait: the decoder never
//! assumes random access to the underlying data, it only peeks at the next
//! byte, reads bounded chunks and asks whether the end was reached.

use crate::ber::BerTag;
use crate::error::BerError;
use std::io::{self, Read};

//------------ DataSource ----------------------------------------------------

pub trait DataSource {
    /// Returns the next byte without consuming it, or `None` at the end of data.
    fn peek_byte(&mut self) -> io::Result<Option<u8>>;

    /// Reads at most `buf.len()` bytes, returning how many were copied.
    ///
    /// Returns 0 only at the end of data.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Returns true if no more bytes can be read.
    fn end_of_data(&mut self) -> io::Result<bool> {
        Ok(self.peek_byte()?.is_none())
    }

    /// Takes a single byte from the source.
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut b = [0u8; 1];
        match self.read(&mut b)? {
            0 => Ok(None),
            _ => Ok(Some(b[0])),
        }
    }
}

impl<S: DataSource + ?Sized> DataSource for &mut S {
    fn peek_byte(&mut self) -> io::Result<Option<u8>> {
        (**self).peek_byte()
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        (**self).read(buf)
    }

    fn end_of_data(&mut self) -> io::Result<bool> {
        (**self).end_of_data()
    }
}

/// Heuristic test for BER data.
///
/// Peeks at the first byte without consuming it and returns true only if it
/// is the identifier of a constructed SEQUENCE. Every other value, including
/// other valid top-level tags, yields false. An empty source is a stream error.
pub fn looks_like_ber<S: DataSource + ?Sized>(source: &mut S) -> Result<bool, BerError> {
    match source.peek_byte()? {
        None => Err(BerError::StreamEmpty),
        Some(b) => Ok(b == (0x20 | BerTag::Sequence.0 as u8)),
    }
}

//------------ SliceSource ---------------------------------------------------

/// A source over borrowed bytes
#[derive(Clone, Copy, Debug)]
pub struct SliceSource<'s> {
    data: &'s [u8],
    pos: usize,
}

impl<'s> SliceSource<'s> {
    pub fn new(data: &'s [u8]) -> Self {
        SliceSource { data, pos: 0 }
    }

    pub fn remaining(&self) -> &'s [u8] {
        &self.data[self.pos..]
    }

    pub fn pos(&self) -> usize {
        self.pos
    }
}

impl<'s> DataSource for SliceSource<'s> {
    fn peek_byte(&mut self) -> io::Result<Option<u8>> {
        Ok(self.data.get(self.pos).copied())
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let rem = self.remaining();
        let n = rem.len().min(buf.len());
        buf[..n].copy_from_slice(&rem[..n]);
        self.pos += n;
        Ok(n)
    }
}

//------------ VecSource -----------------------------------------------------

/// A source owning its bytes
///
/// This is what sub-decoders run over: the payload of a constructed object
/// is moved into it.
#[derive(Clone, Debug, Default)]
pub struct VecSource {
    data: Vec<u8>,
    pos: usize,
}

impl VecSource {
    pub fn new(data: Vec<u8>) -> Self {
        VecSource { data, pos: 0 }
    }

    pub fn remaining(&self) -> &[u8] {
        &self.data[self.pos..]
    }
}

impl DataSource for VecSource {
    fn peek_byte(&mut self) -> io::Result<Option<u8>> {
        Ok(self.data.get(self.pos).copied())
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let rem = &self.data[self.pos..];
        let n = rem.len().min(buf.len());
        buf[..n].copy_from_slice(&rem[..n]);
        self.pos += n;
        Ok(n)
    }
}

//------------ ReaderSource --------------------------------------------------

/// A source over anything implementing `io::Read`
///
/// One byte of lookahead is kept for `peek_byte`. Timeouts and cancellation
/// are the reader's business; a reader that gives up should report end of
/// data or an error.
#[derive(Debug)]
pub struct ReaderSource<R> {
    reader: R,
    peeked: Option<u8>,
}

impl<R: Read> ReaderSource<R> {
    pub fn new(reader: R) -> Self {
        ReaderSource {
            reader,
            peeked: None,
        }
    }

    pub fn into_inner(self) -> R {
        self.reader
    }

    fn fill(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            match self.reader.read(buf) {
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
                r => return r,
            }
        }
    }
}

impl<R: Read> DataSource for ReaderSource<R> {
    fn peek_byte(&mut self) -> io::Result<Option<u8>> {
        if self.peeked.is_none() {
            let mut b = [0u8; 1];
            if self.fill(&mut b)? == 1 {
                self.peeked = Some(b[0]);
            }
        }
        Ok(self.peeked)
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        match self.peeked.take() {
            Some(b) => {
                buf[0] = b;
                let n = if buf.len() > 1 { self.fill(&mut buf[1..])? } else { 0 };
                Ok(n + 1)
            }
            None => self.fill(buf),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_source() {
        let mut src = SliceSource::new(&[1, 2, 3]);
        assert_eq!(src.peek_byte().unwrap(), Some(1));
        let mut buf = [0u8; 2];
        assert_eq!(src.read(&mut buf).unwrap(), 2);
        assert_eq!(buf, [1, 2]);
        assert!(!src.end_of_data().unwrap());
        assert_eq!(src.read(&mut buf).unwrap(), 1);
        assert!(src.end_of_data().unwrap());
        assert_eq!(src.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_reader_source_peek_does_not_consume() {
        let data: &[u8] = &[0x30, 0x00, 0x05];
        let mut src = ReaderSource::new(data);
        assert_eq!(src.peek_byte().unwrap(), Some(0x30));
        assert_eq!(src.peek_byte().unwrap(), Some(0x30));
        let mut buf = [0u8; 8];
        assert_eq!(src.read(&mut buf).unwrap(), 3);
        assert_eq!(&buf[..3], data);
        assert!(src.end_of_data().unwrap());
    }

    #[test]
    fn test_looks_like_ber() {
        let mut src = SliceSource::new(&[0x30, 0x00]);
        assert_eq!(looks_like_ber(&mut src), Ok(true));
        // the probe must not consume anything
        assert_eq!(src.pos(), 0);

        let mut src = SliceSource::new(b"-----BEGIN X509 CRL-----");
        assert_eq!(looks_like_ber(&mut src), Ok(false));

        // a valid top-level SET is still not accepted
        let mut src = SliceSource::new(&[0x31, 0x00]);
        assert_eq!(looks_like_ber(&mut src), Ok(false));

        let mut src = SliceSource::new(&[]);
        assert_eq!(looks_like_ber(&mut src), Err(BerError::StreamEmpty));
    }
}
