//! LZ4 block decompression.

use super::constants::{MIN_MATCH, RUN_MASK};
use crate::sink::{copy_literals, copy_match, Source};
use crate::{Error, Result};

/// Read a length continuation: bytes are added until one is not 255.
fn read_length(src: &mut Source<'_>, what: &str) -> Result<usize> {
    let mut len = 0usize;
    loop {
        let byte = src.byte(what)?;
        len = len
            .checked_add(usize::from(byte))
            .ok_or_else(|| Error::CorruptedData(format!("{what} overflows")))?;
        if byte != 255 {
            return Ok(len);
        }
    }
}

/// Decompress LZ4 block format data.
///
/// # Returns
///
/// The number of bytes written to output.
///
/// # Errors
///
/// Returns an error if the compressed data is corrupted or `output` is too
/// small.
pub fn decompress(input: &[u8], output: &mut [u8]) -> Result<usize> {
    if input.is_empty() {
        return Ok(0);
    }

    let mut src = Source::new(input);
    let mut op = 0;

    loop {
        let token = src.byte("token")?;

        let mut literal_len = usize::from(token >> 4);
        if literal_len == usize::from(RUN_MASK) {
            literal_len += read_length(&mut src, "literal length")?;
        }
        let literals = src.take(literal_len, "literal")?;
        op = copy_literals(output, op, literals)?;

        // The last sequence carries only literals.
        if src.is_empty() {
            return Ok(op);
        }

        let offset = usize::from(src.le16("offset")?);
        if offset == 0 {
            return Err(Error::CorruptedData("zero match offset".to_string()));
        }

        let mut match_len = usize::from(token & RUN_MASK);
        if match_len == usize::from(RUN_MASK) {
            match_len += read_length(&mut src, "match length")?;
        }
        op = copy_match(output, op, offset, match_len + MIN_MATCH)?;
    }
}
