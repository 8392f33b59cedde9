use bitvec::field::BitField;
use bitvec::order::Lsb0;
use bitvec::slice::BitSlice;
use bitvec::view::BitView;

use crate::error::{Error, Result};

/// Forward-only read cursor over borrowed bytes.
///
/// Mirrors every [`ByteWriter`](crate::ByteWriter) operation with the same bit
/// order. Reads never run past the end of the view: they fail with
/// [`Error::UnexpectedEof`] and leave the position where it was.
///
/// # Sub-streams
/// Encodings that nest one stream inside another (delta-length, incremental)
/// delimit the inner stream without copying:
/// - [`take`](ByteReader::take) returns a view of the next `n` bytes and
///   advances past them.
/// - [`slice_ahead`](ByteReader::slice_ahead) returns a view starting `n`
///   bytes ahead and running to the end, leaving this cursor untouched.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn check(&self, needed: usize) -> Result<()> {
        if needed > self.remaining() {
            return Err(Error::UnexpectedEof {
                needed,
                remaining: self.remaining(),
            });
        }
        Ok(())
    }

    /// Borrow the next `n` bytes and advance past them.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.check(n)?;
        let bytes = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    /// Bounded view of the next `n` bytes; this cursor advances past them.
    pub fn take(&mut self, n: usize) -> Result<ByteReader<'a>> {
        self.read_bytes(n).map(ByteReader::new)
    }

    /// View starting `n` bytes past the current position.
    pub fn slice_ahead(&self, n: usize) -> Result<ByteReader<'a>> {
        self.check(n)?;
        Ok(ByteReader::new(&self.data[self.pos + n..]))
    }

    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.read_bytes(n).map(|_| ())
    }

    #[inline]
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    // ── Fixed width ────────────────────────────────────────────────────────

    pub fn read_fixed_u32(&mut self) -> Result<u32> {
        self.read_array().map(u32::from_le_bytes)
    }

    pub fn read_fixed_u64(&mut self) -> Result<u64> {
        self.read_array().map(u64::from_le_bytes)
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        self.read_fixed_u32().map(f32::from_bits)
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        self.read_fixed_u64().map(f64::from_bits)
    }

    // ── Varints ────────────────────────────────────────────────────────────

    fn read_varint(&mut self, bits: u32) -> Result<u128> {
        let mut value: u128 = 0;
        let mut shift = 0u32;
        let start = self.pos;
        loop {
            let b = match self.read_u8() {
                Ok(b) => b,
                Err(e) => {
                    self.pos = start;
                    return Err(e);
                }
            };
            let payload = (b & 0x7f) as u128;
            if shift + 7 > bits && payload >> (bits - shift) != 0 {
                self.pos = start;
                return Err(Error::VarintOverflow { bits });
            }
            value |= payload << shift;
            if b & 0x80 == 0 {
                return Ok(value);
            }
            shift += 7;
            if shift >= bits {
                self.pos = start;
                return Err(Error::VarintOverflow { bits });
            }
        }
    }

    pub fn read_varint32(&mut self) -> Result<u32> {
        self.read_varint(32).map(|v| v as u32)
    }

    pub fn read_varint64(&mut self) -> Result<u64> {
        self.read_varint(64).map(|v| v as u64)
    }

    pub fn read_varint128(&mut self) -> Result<u128> {
        self.read_varint(128)
    }

    pub fn read_zigzag32(&mut self) -> Result<i32> {
        let v = self.read_varint32()?;
        Ok((v >> 1) as i32 ^ -((v & 1) as i32))
    }

    pub fn read_zigzag64(&mut self) -> Result<i64> {
        let v = self.read_varint64()?;
        Ok((v >> 1) as i64 ^ -((v & 1) as i64))
    }

    pub fn read_zigzag128(&mut self) -> Result<i128> {
        let v = self.read_varint128()?;
        Ok((v >> 1) as i128 ^ -((v & 1) as i128))
    }

    // ── Bit packing ────────────────────────────────────────────────────────

    /// Unpack `out.len()` values of `width` bits each.
    ///
    /// Consumes `ceil(out.len() * width / 8)` bytes.
    pub fn read_packed_u32(&mut self, out: &mut [u32], width: u8) -> Result<()> {
        if width > 32 {
            return Err(Error::Malformed("packed width above 32 bits"));
        }
        let Some(bits) = self.packed_bits(out.len(), width)? else {
            out.fill(0);
            return Ok(());
        };
        for (v, slot) in out.iter_mut().zip(bits.chunks_exact(width as usize)) {
            *v = slot.load_le::<u32>();
        }
        Ok(())
    }

    /// 64-bit counterpart of [`read_packed_u32`](ByteReader::read_packed_u32).
    pub fn read_packed_u64(&mut self, out: &mut [u64], width: u8) -> Result<()> {
        if width > 64 {
            return Err(Error::Malformed("packed width above 64 bits"));
        }
        let Some(bits) = self.packed_bits(out.len(), width)? else {
            out.fill(0);
            return Ok(());
        };
        for (v, slot) in out.iter_mut().zip(bits.chunks_exact(width as usize)) {
            *v = slot.load_le::<u64>();
        }
        Ok(())
    }

    /// Consume the bytes holding `count` packed values; `None` at width 0.
    fn packed_bits(&mut self, count: usize, width: u8) -> Result<Option<&'a BitSlice<u8, Lsb0>>> {
        if width == 0 {
            return Ok(None);
        }
        let num_bits = count
            .checked_mul(width as usize)
            .ok_or(Error::Malformed("packed run length overflows usize"))?;
        let bytes = self.read_bytes(num_bits.div_ceil(8))?;
        Ok(Some(&bytes.view_bits::<Lsb0>()[..num_bits]))
    }

    /// A single value stored in `ceil(width/8)` little-endian bytes.
    pub fn read_packed_int(&mut self, width: u8) -> Result<u32> {
        if width > 32 {
            return Err(Error::Malformed("packed width above 32 bits"));
        }
        let bytes = self.read_bytes((width as usize).div_ceil(8))?;
        let v = bytes
            .iter()
            .rev()
            .fold(0u32, |acc, &b| (acc << 8) | b as u32);
        Ok(v)
    }

    /// Eight booleans from one byte, most significant bit first.
    pub fn read_packed_booleans(&mut self) -> Result<[bool; 8]> {
        let b = self.read_u8()?;
        let mut out = [false; 8];
        for (i, bit) in out.iter_mut().enumerate() {
            *bit = b & (0x80 >> i) != 0;
        }
        Ok(out)
    }
}
