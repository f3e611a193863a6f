//! Hash-indexed position table stored in a work buffer's scratch area.

use crate::{Error, Result};

const SLOT: usize = std::mem::size_of::<u32>();

/// Last seen input position per hash bucket.
pub(crate) struct MatchTable<'a> {
    slots: &'a mut [u8],
}

impl<'a> MatchTable<'a> {
    /// Bytes of scratch needed for `entries` buckets.
    pub(crate) const fn bytes_for(entries: usize) -> usize {
        entries * SLOT
    }

    /// Claim and clear the first `entries` buckets of `scratch`.
    pub(crate) fn new(scratch: &'a mut [u8], entries: usize) -> Result<Self> {
        let needed = Self::bytes_for(entries);
        let available = scratch.len();
        let slots = scratch
            .get_mut(..needed)
            .ok_or(Error::BufferTooSmall { needed, available })?;
        slots.fill(0);
        Ok(Self { slots })
    }

    /// Position stored for `bucket`, or 0 if none was stored.
    #[inline]
    pub(crate) fn get(&self, bucket: usize) -> usize {
        let at = bucket * SLOT;
        let mut raw = [0u8; SLOT];
        raw.copy_from_slice(&self.slots[at..at + SLOT]);
        u32::from_le_bytes(raw) as usize
    }

    /// Record `pos` for `bucket` and return the previous position.
    #[inline]
    pub(crate) fn replace(&mut self, bucket: usize, pos: usize) -> usize {
        let prev = self.get(bucket);
        let at = bucket * SLOT;
        self.slots[at..at + SLOT].copy_from_slice(&(pos as u32).to_le_bytes());
        prev
    }
}

/// Read four input bytes as a little-endian word.
#[inline]
pub(crate) fn read_u32(input: &[u8], pos: usize) -> u32 {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&input[pos..pos + 4]);
    u32::from_le_bytes(raw)
}
