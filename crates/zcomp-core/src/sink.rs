//! Bounded output writer for compressors.

use crate::{Error, Result};

/// Appends to a caller-supplied buffer, failing instead of overrunning it.
pub(crate) struct Sink<'a> {
    dst: &'a mut [u8],
    pos: usize,
}

impl<'a> Sink<'a> {
    pub(crate) fn new(dst: &'a mut [u8]) -> Self {
        Self { dst, pos: 0 }
    }

    /// Bytes written so far.
    pub(crate) fn len(&self) -> usize {
        self.pos
    }

    fn overflow(&self, extra: usize) -> Error {
        Error::BufferTooSmall {
            needed: self.pos + extra,
            available: self.dst.len(),
        }
    }

    pub(crate) fn push(&mut self, byte: u8) -> Result<()> {
        if self.pos >= self.dst.len() {
            return Err(self.overflow(1));
        }
        self.dst[self.pos] = byte;
        self.pos += 1;
        Ok(())
    }

    pub(crate) fn extend(&mut self, bytes: &[u8]) -> Result<()> {
        let end = self.pos + bytes.len();
        if end > self.dst.len() {
            return Err(self.overflow(bytes.len()));
        }
        self.dst[self.pos..end].copy_from_slice(bytes);
        self.pos = end;
        Ok(())
    }

    /// OR `bits` into the byte written `back` positions ago.
    pub(crate) fn or_back(&mut self, back: usize, bits: u8) {
        self.dst[self.pos - back] |= bits;
    }
}

/// Bounds-checked reader over compressed input.
pub(crate) struct Source<'a> {
    src: &'a [u8],
    pos: usize,
}

impl<'a> Source<'a> {
    pub(crate) fn new(src: &'a [u8]) -> Self {
        Self { src, pos: 0 }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.pos >= self.src.len()
    }

    pub(crate) fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    pub(crate) fn byte(&mut self, what: &str) -> Result<u8> {
        let byte = self
            .peek()
            .ok_or_else(|| Error::CorruptedData(format!("unexpected end of input in {what}")))?;
        self.pos += 1;
        Ok(byte)
    }

    pub(crate) fn le16(&mut self, what: &str) -> Result<u16> {
        let lo = self.byte(what)?;
        let hi = self.byte(what)?;
        Ok(u16::from_le_bytes([lo, hi]))
    }

    pub(crate) fn take(&mut self, n: usize, what: &str) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.src.len())
            .ok_or_else(|| Error::CorruptedData(format!("{what} extends past input")))?;
        let bytes = &self.src[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }
}

/// Copy `src` to `dst[op..]`, returning the new output position.
pub(crate) fn copy_literals(dst: &mut [u8], op: usize, src: &[u8]) -> Result<usize> {
    let end = op + src.len();
    if end > dst.len() {
        return Err(Error::BufferTooSmall {
            needed: end,
            available: dst.len(),
        });
    }
    dst[op..end].copy_from_slice(src);
    Ok(end)
}

/// Copy `len` bytes starting `distance` bytes behind `op`, allowing overlap.
pub(crate) fn copy_match(dst: &mut [u8], op: usize, distance: usize, len: usize) -> Result<usize> {
    if distance == 0 || distance > op {
        return Err(Error::CorruptedData(format!(
            "match distance {distance} exceeds output position {op}"
        )));
    }
    let end = op + len;
    if end > dst.len() {
        return Err(Error::BufferTooSmall {
            needed: end,
            available: dst.len(),
        });
    }

    let from = op - distance;
    if distance >= len {
        dst.copy_within(from..from + len, op);
    } else {
        for i in 0..len {
            dst[op + i] = dst[from + i];
        }
    }
    Ok(end)
}
