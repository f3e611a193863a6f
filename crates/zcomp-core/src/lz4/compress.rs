//! LZ4 block compression.
//!
//! Greedy single-probe match finder. The hash table lives in the caller's
//! work buffer, so compression itself allocates nothing.

use super::constants::{LAST_LITERALS, MAX_DISTANCE, MF_LIMIT, MIN_MATCH, RUN_MASK};
use super::HASH_ENTRIES;
use crate::match_table::{read_u32, MatchTable};
use crate::sink::Sink;
use crate::Result;

const HASH_LOG: u32 = HASH_ENTRIES.trailing_zeros();

/// Acceleration factor for faster skipping over incompressible runs.
const SKIP_TRIGGER: usize = 6;

/// Knuth multiplicative hash of a 4-byte sequence.
#[inline]
fn hash(sequence: u32) -> usize {
    (sequence.wrapping_mul(2_654_435_761) >> (32 - HASH_LOG)) as usize
}

/// Compress `input` into `output` in LZ4 block format.
///
/// # Errors
///
/// Returns [`crate::Error::BufferTooSmall`] if `output` or `scratch` is too
/// small.
pub fn compress(input: &[u8], output: &mut [u8], scratch: &mut [u8]) -> Result<usize> {
    let mut table = MatchTable::new(scratch, HASH_ENTRIES)?;
    let mut out = Sink::new(output);
    let len = input.len();
    let mut anchor = 0;

    if len > MF_LIMIT {
        let match_limit = len - LAST_LITERALS;
        let mf_limit = len - MF_LIMIT;
        table.replace(hash(read_u32(input, 0)), 0);
        let mut ip = 1;

        while ip < mf_limit {
            let sequence = read_u32(input, ip);
            let candidate = table.replace(hash(sequence), ip);

            let found = candidate < ip
                && ip - candidate <= MAX_DISTANCE
                && read_u32(input, candidate) == sequence;
            if !found {
                ip += 1 + ((ip - anchor) >> SKIP_TRIGGER);
                continue;
            }

            // Extend backwards over literals that also match.
            let mut start = ip;
            let mut from = candidate;
            while start > anchor && from > 0 && input[start - 1] == input[from - 1] {
                start -= 1;
                from -= 1;
            }

            let mut end = start + MIN_MATCH;
            while end < match_limit && input[end] == input[end - (start - from)] {
                end += 1;
            }

            emit_sequence(&mut out, &input[anchor..start], start - from, end - start - MIN_MATCH)?;
            anchor = end;
            ip = end;

            if ip < mf_limit {
                let pos = ip - 2;
                table.replace(hash(read_u32(input, pos)), pos);
            }
        }
    }

    emit_last_literals(&mut out, &input[anchor..])?;
    Ok(out.len())
}

/// Emit a length continuation: runs of 255 then the remainder.
fn emit_length(out: &mut Sink<'_>, mut len: usize) -> Result<()> {
    while len >= 255 {
        out.push(255)?;
        len -= 255;
    }
    out.push(len as u8)
}

fn emit_sequence(out: &mut Sink<'_>, literals: &[u8], offset: usize, match_extra: usize) -> Result<()> {
    let lit_len = literals.len();
    let run = usize::from(RUN_MASK);
    let token = ((lit_len.min(run) as u8) << 4) | match_extra.min(run) as u8;
    out.push(token)?;
    if lit_len >= run {
        emit_length(out, lit_len - run)?;
    }
    out.extend(literals)?;
    out.extend(&(offset as u16).to_le_bytes())?;
    if match_extra >= run {
        emit_length(out, match_extra - run)?;
    }
    Ok(())
}

fn emit_last_literals(out: &mut Sink<'_>, literals: &[u8]) -> Result<()> {
    let run = usize::from(RUN_MASK);
    out.push((literals.len().min(run) as u8) << 4)?;
    if literals.len() >= run {
        emit_length(out, literals.len() - run)?;
    }
    out.extend(literals)
}
