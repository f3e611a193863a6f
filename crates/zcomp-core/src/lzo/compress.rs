//! LZO1X compression.

use super::constants::{
    EOS_MARKER, M2_MAX_LEN, M2_MAX_OFFSET, M3_MARKER, M3_MAX_LEN, M3_MAX_OFFSET, MIN_INPUT,
    MIN_MATCH,
};
use super::DICT_ENTRIES;
use crate::match_table::{read_u32, MatchTable};
use crate::sink::Sink;
use crate::Result;

const D_BITS: u32 = DICT_ENTRIES.trailing_zeros();

/// Step grows by one for every 32 bytes without a match.
const SKIP_TRIGGER: usize = 5;

#[inline]
fn hash(sequence: u32) -> usize {
    (sequence.wrapping_mul(0x1824_429d) >> (32 - D_BITS)) as usize
}

/// Compress `input` into `output` as an LZO1X stream.
///
/// # Errors
///
/// Returns [`crate::Error::BufferTooSmall`] if `output` or `scratch` is too
/// small.
pub fn compress(input: &[u8], output: &mut [u8], scratch: &mut [u8]) -> Result<usize> {
    let mut dict = MatchTable::new(scratch, DICT_ENTRIES)?;
    let mut out = Sink::new(output);
    let len = input.len();
    let mut anchor = 0;

    if len > MIN_INPUT {
        let limit = len - MIN_INPUT;
        let mut ip = 0;

        while ip < limit {
            let sequence = read_u32(input, ip);
            let candidate = dict.replace(hash(sequence), ip);

            let found = candidate < ip
                && ip - candidate <= M3_MAX_OFFSET
                && read_u32(input, candidate) == sequence;
            if !found {
                // Skipped positions still enter the dictionary so later
                // repeats of this stretch can find them.
                let next = ip + 1 + ((ip - anchor) >> SKIP_TRIGGER);
                for p in ip + 1..next.min(limit) {
                    dict.replace(hash(read_u32(input, p)), p);
                }
                ip = next;
                continue;
            }

            let distance = ip - candidate;
            let mut end = ip + MIN_MATCH;
            while end < len && input[end] == input[end - distance] {
                end += 1;
            }

            emit_literals(&mut out, &input[anchor..ip])?;
            emit_match(&mut out, distance, end - ip)?;
            anchor = end;
            ip = end;
        }
    }

    emit_literals(&mut out, &input[anchor..])?;
    out.extend(&EOS_MARKER)?;
    Ok(out.len())
}

/// Zero bytes for each full 255, then the remainder (never zero).
fn emit_extension(out: &mut Sink<'_>, mut n: usize) -> Result<()> {
    while n > 255 {
        out.push(0)?;
        n -= 255;
    }
    out.push(n as u8)
}

fn emit_literals(out: &mut Sink<'_>, literals: &[u8]) -> Result<()> {
    let t = literals.len();
    if t == 0 {
        return Ok(());
    }

    if out.len() == 0 && t <= 238 {
        out.push((17 + t) as u8)?;
    } else if t <= 3 {
        // Short runs ride in the low bits of the preceding match.
        out.or_back(2, t as u8);
    } else if t <= 18 {
        out.push((t - 3) as u8)?;
    } else {
        out.push(0)?;
        emit_extension(out, t - 18)?;
    }
    out.extend(literals)
}

fn emit_match(out: &mut Sink<'_>, distance: usize, len: usize) -> Result<()> {
    let off = distance - 1;
    if len <= M2_MAX_LEN && distance <= M2_MAX_OFFSET {
        out.push((((len - 1) << 5) | ((off & 7) << 2)) as u8)?;
        return out.push((off >> 3) as u8);
    }

    if len <= M3_MAX_LEN {
        out.push(M3_MARKER | (len - 2) as u8)?;
    } else {
        out.push(M3_MARKER)?;
        emit_extension(out, len - M3_MAX_LEN)?;
    }
    out.push((off << 2) as u8)?;
    out.push((off >> 6) as u8)
}
