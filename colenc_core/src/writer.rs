use bitvec::field::BitField;
use bitvec::order::Lsb0;
use bitvec::slice::BitSlice;
use bitvec::view::BitView;

use crate::error::{Error, Result};
use crate::format::DEFAULT_BUFFER_CAPACITY;

/// Longest varint: 128 bits in 7-bit groups.
const MAX_VARINT_LEN: usize = 19;

/// Growable write buffer shared by every encoder.
///
/// # Growth contract
/// The logical length (bytes written so far) is tracked separately from the
/// physical capacity. When a write does not fit, capacity doubles until it
/// does; it is never shrunk. [`reset`](ByteWriter::reset) drops the logical
/// content and keeps the allocation for reuse.
///
/// # Bit order
/// - Fixed-width integers and floats: little-endian.
/// - Varints: little-endian base-128 groups, MSB of each byte = continuation.
/// - Packed integers: LSB-first, values straddle byte boundaries.
/// - Packed booleans: 8 per byte, MSB-first.
#[derive(Debug, Clone)]
pub struct ByteWriter {
    buf: Vec<u8>,
}

impl Default for ByteWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ByteWriter {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_BUFFER_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Bytes written so far.
    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// The written bytes.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }

    /// Forget everything written, keeping capacity.
    pub fn reset(&mut self) {
        self.buf.clear();
    }

    /// Make room for `additional` more bytes by doubling capacity, surfacing
    /// allocation failure instead of aborting.
    pub fn ensure_remaining_capacity(&mut self, additional: usize) -> Result<()> {
        let needed = self
            .buf
            .len()
            .checked_add(additional)
            .ok_or(Error::Malformed("buffer length overflows usize"))?;
        if needed <= self.buf.capacity() {
            return Ok(());
        }
        let mut target = self.buf.capacity().max(DEFAULT_BUFFER_CAPACITY);
        while target < needed {
            target = target.saturating_mul(2);
        }
        self.buf.try_reserve_exact(target - self.buf.len())?;
        Ok(())
    }

    #[inline]
    pub fn write_u8(&mut self, b: u8) -> Result<()> {
        self.ensure_remaining_capacity(1)?;
        self.buf.push(b);
        Ok(())
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.ensure_remaining_capacity(bytes.len())?;
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    /// Append everything written to `other`.
    pub fn write_buffer(&mut self, other: &ByteWriter) -> Result<()> {
        self.write_bytes(other.as_slice())
    }

    /// Overwrite previously written bytes starting at `offset`.
    pub fn overwrite(&mut self, offset: usize, bytes: &[u8]) -> Result<()> {
        let end = offset
            .checked_add(bytes.len())
            .filter(|&end| end <= self.buf.len())
            .ok_or(Error::UnexpectedEof {
                needed: bytes.len(),
                remaining: self.buf.len().saturating_sub(offset),
            })?;
        self.buf[offset..end].copy_from_slice(bytes);
        Ok(())
    }

    // ── Fixed width ────────────────────────────────────────────────────────

    pub fn write_fixed_u32(&mut self, v: u32) -> Result<()> {
        self.write_bytes(&v.to_le_bytes())
    }

    pub fn write_fixed_u64(&mut self, v: u64) -> Result<()> {
        self.write_bytes(&v.to_le_bytes())
    }

    pub fn write_f32(&mut self, f: f32) -> Result<()> {
        self.write_fixed_u32(f.to_bits())
    }

    pub fn write_f64(&mut self, d: f64) -> Result<()> {
        self.write_fixed_u64(d.to_bits())
    }

    // ── Varints ────────────────────────────────────────────────────────────

    pub fn write_varint32(&mut self, v: u32) -> Result<()> {
        self.write_varint128(v as u128)
    }

    pub fn write_varint64(&mut self, v: u64) -> Result<()> {
        self.write_varint128(v as u128)
    }

    pub fn write_varint128(&mut self, mut v: u128) -> Result<()> {
        let mut group = [0u8; MAX_VARINT_LEN];
        let mut len = 0;
        while v & !0x7f != 0 {
            group[len] = (v as u8 & 0x7f) | 0x80;
            v >>= 7;
            len += 1;
        }
        group[len] = v as u8;
        self.write_bytes(&group[..=len])
    }

    pub fn write_zigzag32(&mut self, v: i32) -> Result<()> {
        self.write_varint32(((v << 1) ^ (v >> 31)) as u32)
    }

    pub fn write_zigzag64(&mut self, v: i64) -> Result<()> {
        self.write_varint64(((v << 1) ^ (v >> 63)) as u64)
    }

    /// Zigzag varint of a value needing more than 64 bits, e.g. the minimum
    /// delta between two `i64`s.
    pub fn write_zigzag128(&mut self, v: i128) -> Result<()> {
        self.write_varint128(((v << 1) ^ (v >> 127)) as u128)
    }

    // ── Bit packing ────────────────────────────────────────────────────────

    /// Pack `values` using exactly `width` bits each, LSB-first.
    ///
    /// Bits above `width` are dropped: the caller guarantees `v < 2^width`.
    pub fn write_packed_u32(&mut self, values: &[u32], width: u8) -> Result<()> {
        if width > 32 {
            return Err(Error::Malformed("packed width above 32 bits"));
        }
        let Some(bits) = self.packed_bits(values.len(), width)? else {
            return Ok(());
        };
        let width = width as usize;
        for (i, &v) in values.iter().enumerate() {
            bits[i * width..(i + 1) * width].store_le(v);
        }
        Ok(())
    }

    /// 64-bit counterpart of [`write_packed_u32`](ByteWriter::write_packed_u32).
    pub fn write_packed_u64(&mut self, values: &[u64], width: u8) -> Result<()> {
        if width > 64 {
            return Err(Error::Malformed("packed width above 64 bits"));
        }
        let Some(bits) = self.packed_bits(values.len(), width)? else {
            return Ok(());
        };
        let width = width as usize;
        for (i, &v) in values.iter().enumerate() {
            bits[i * width..(i + 1) * width].store_le(v);
        }
        Ok(())
    }

    /// Append zeroed room for `count` packed values and view it as bits;
    /// `None` at width 0.
    fn packed_bits(&mut self, count: usize, width: u8) -> Result<Option<&mut BitSlice<u8, Lsb0>>> {
        if width == 0 {
            return Ok(None);
        }
        let num_bits = count
            .checked_mul(width as usize)
            .ok_or(Error::Malformed("packed run length overflows usize"))?;
        let num_bytes = num_bits.div_ceil(8);
        self.ensure_remaining_capacity(num_bytes)?;
        let start = self.buf.len();
        self.buf.resize(start + num_bytes, 0);
        Ok(Some(&mut self.buf[start..].view_bits_mut::<Lsb0>()[..num_bits]))
    }

    /// A single value in `ceil(width/8)` little-endian bytes.
    pub fn write_packed_int(&mut self, v: u32, width: u8) -> Result<()> {
        let v = v as u64 & mask_for(width);
        let num_bytes = (width as usize).div_ceil(8);
        self.write_bytes(&v.to_le_bytes()[..num_bytes])
    }

    /// Eight booleans in one byte, first boolean in the most significant bit.
    pub fn write_packed_booleans(&mut self, octuplet: &[bool; 8]) -> Result<()> {
        let b = octuplet
            .iter()
            .fold(0u8, |acc, &bit| (acc << 1) | bit as u8);
        self.write_u8(b)
    }
}

#[inline]
pub(crate) fn mask_for(width: u8) -> u64 {
    if width >= 64 {
        u64::MAX
    } else {
        (1u64 << width) - 1
    }
}

/// Position of the highest set bit plus one; 0 for 0.
#[inline]
pub fn bit_width32(v: u32) -> u8 {
    (u32::BITS - v.leading_zeros()) as u8
}

/// Position of the highest set bit plus one; 0 for 0.
#[inline]
pub fn bit_width64(v: u64) -> u8 {
    (u64::BITS - v.leading_zeros()) as u8
}

/// Bytes needed by the varint form of `v`.
pub fn varint_len32(v: u32) -> usize {
    varint_len64(v as u64)
}

/// Bytes needed by the varint form of `v`.
pub fn varint_len64(v: u64) -> usize {
    (bit_width64(v) as usize).div_ceil(7).max(1)
}
