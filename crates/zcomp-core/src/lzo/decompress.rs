//! LZO1X decompression.
//!
//! Every read from the input and every write to the output is bounds
//! checked, so malformed streams fail with an error instead of overrunning.

use super::constants::{EOS_MARKER, M2_MAX_OFFSET, M3_MAX_OFFSET};
use crate::sink::{copy_literals, copy_match, Source};
use crate::{Error, Result};

/// Read a run extension: each zero byte adds 255, the first non-zero byte
/// ends it.
fn read_extension(src: &mut Source<'_>, what: &str) -> Result<usize> {
    let mut len = 0usize;
    loop {
        match src.byte(what)? {
            0 => {
                len = len
                    .checked_add(255)
                    .ok_or_else(|| Error::CorruptedData(format!("{what} overflows")))?;
            }
            byte => return Ok(len + usize::from(byte)),
        }
    }
}

/// Decompress an LZO1X stream into `output`.
///
/// # Returns
///
/// The number of bytes written to output.
///
/// # Errors
///
/// Returns [`Error::CorruptedData`] if the stream is malformed, truncated,
/// or has bytes after its end marker, and [`Error::BufferTooSmall`] if
/// `output` cannot hold the result.
pub fn decompress(input: &[u8], output: &mut [u8]) -> Result<usize> {
    if input.len() < EOS_MARKER.len() {
        return Err(Error::CorruptedData(format!(
            "stream of {} bytes is shorter than the end marker",
            input.len()
        )));
    }

    let mut src = Source::new(input);
    let mut op = 0;
    // Literals copied after the previous instruction: 0, 1-3, or 4 for a
    // longer run.
    let mut state = 0usize;

    if let Some(first) = src.peek().filter(|&byte| byte > 17) {
        src.byte("literal length")?;
        let run = usize::from(first - 17);
        op = copy_literals(output, op, src.take(run, "literal")?)?;
        state = run.min(4);
    }

    loop {
        let t = usize::from(src.byte("instruction")?);

        let (distance, len, next) = if t < 16 {
            match state {
                0 => {
                    let mut run = t;
                    if run == 0 {
                        run = 15 + read_extension(&mut src, "literal length")?;
                    }
                    op = copy_literals(output, op, src.take(run + 3, "literal")?)?;
                    state = 4;
                    continue;
                }
                4 => {
                    let high = usize::from(src.byte("match offset")?);
                    (1 + M2_MAX_OFFSET + (t >> 2) + (high << 2), 3, t & 3)
                }
                _ => {
                    let high = usize::from(src.byte("match offset")?);
                    (1 + (t >> 2) + (high << 2), 2, t & 3)
                }
            }
        } else if t >= 64 {
            let high = usize::from(src.byte("match offset")?);
            (1 + ((t >> 2) & 7) + (high << 3), (t >> 5) + 1, t & 3)
        } else if t >= 32 {
            let mut len = t & 31;
            if len == 0 {
                len = 31 + read_extension(&mut src, "match length")?;
            }
            let offset = usize::from(src.le16("match offset")?);
            (1 + (offset >> 2), len + 2, offset & 3)
        } else {
            let mut len = t & 7;
            if len == 0 {
                len = 7 + read_extension(&mut src, "match length")?;
            }
            let offset = usize::from(src.le16("match offset")?);
            let distance = ((t & 8) << 11) + (offset >> 2);
            if distance == 0 {
                return finish(&src, op, len + 2);
            }
            (distance + M3_MAX_OFFSET, len + 2, offset & 3)
        };

        op = copy_match(output, op, distance, len)?;
        state = next;
        if next > 0 {
            op = copy_literals(output, op, src.take(next, "literal")?)?;
        }
    }
}

/// Validate the end marker and report the output length.
fn finish(src: &Source<'_>, op: usize, marker_len: usize) -> Result<usize> {
    if marker_len != 3 {
        return Err(Error::CorruptedData("malformed end marker".to_string()));
    }
    if !src.is_empty() {
        return Err(Error::CorruptedData(
            "trailing bytes after end marker".to_string(),
        ));
    }
    Ok(op)
}
