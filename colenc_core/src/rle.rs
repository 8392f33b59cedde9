//! Hybrid run-length / bit-packing codec for small non-negative integers.
//!
//! # Wire format
//! A stream is a sequence of runs, each introduced by a varint header:
//! - `header & 1 == 1`: bit-packed run of `header >> 1` octuplets, each
//!   octuplet being 8 values packed LSB-first at the stream's bit width.
//! - `header & 1 == 0`: RLE run of `header >> 1` repeats, followed by the
//!   repeated value in `ceil(width / 8)` little-endian bytes.
//!
//! The bit width is not part of the run stream. [`FixedWidthRunLengthEncoder`]
//! takes it from the caller, [`RunLengthEncoder`] derives it from the values
//! and reports it through [`RunLengthEncoder::bit_width`], and
//! [`WidthPrefixedRunLengthEncoder`] stores it as a leading byte.

use crate::codec::{Decoder, Encoder};
use crate::error::{Error, Result};
use crate::format::{rle_threshold, OCTUPLET};
use crate::reader::ByteReader;
use crate::writer::{bit_width32, varint_len64, ByteWriter};

/// Widest value supported by the run codec.
pub const MAX_RLE_WIDTH: u8 = 32;

fn check_width(width: u8) -> Result<u8> {
    if width > MAX_RLE_WIDTH {
        return Err(Error::Malformed("run-length bit width above 32"));
    }
    Ok(width)
}

/// Run codec at a bit width chosen by the caller.
///
/// Values must fit in `width` bits; wider values are silently truncated.
#[derive(Debug)]
pub struct FixedWidthRunLengthEncoder {
    out: ByteWriter,
    width: u8,
    threshold: usize,
    rle_value: u32,
    rle_count: usize,
    octuplet: [u32; OCTUPLET],
    octuplet_pos: usize,
    packed: ByteWriter,
    packed_octuplets: usize,
    finished: bool,
}

impl FixedWidthRunLengthEncoder {
    pub fn new(width: u8) -> Result<Self> {
        check_width(width).map(Self::with_width)
    }

    fn with_width(width: u8) -> Self {
        Self {
            out: ByteWriter::new(),
            width,
            threshold: rle_threshold(width),
            rle_value: 0,
            rle_count: 0,
            octuplet: [0; OCTUPLET],
            octuplet_pos: 0,
            packed: ByteWriter::new(),
            packed_octuplets: 0,
            finished: false,
        }
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    /// Change the bit width of an encoder that holds no values.
    fn set_width(&mut self, width: u8) -> Result<()> {
        self.width = check_width(width)?;
        self.threshold = rle_threshold(width);
        Ok(())
    }

    pub fn encode(&mut self, v: u32) -> Result<()> {
        if self.finished {
            return Err(Error::EncodeAfterFinish);
        }
        self.push(v)
    }

    fn push(&mut self, v: u32) -> Result<()> {
        loop {
            if self.octuplet_pos > 0 {
                return self.buffer_packed(v);
            }
            if self.rle_count == 0 {
                self.rle_value = v;
                self.rle_count = 1;
                return Ok(());
            }
            if self.rle_value == v {
                self.rle_count += 1;
                return Ok(());
            }
            if self.rle_count >= self.threshold {
                self.flush_rle()?;
            } else {
                self.absorb_rle_run()?;
            }
        }
    }

    /// Move a run too short for its own header into the bit-packed path.
    fn absorb_rle_run(&mut self) -> Result<()> {
        while self.rle_count > 0 {
            self.buffer_packed(self.rle_value)?;
            self.rle_count -= 1;
        }
        Ok(())
    }

    fn buffer_packed(&mut self, v: u32) -> Result<()> {
        self.octuplet[self.octuplet_pos] = v;
        if self.octuplet_pos + 1 == OCTUPLET {
            self.pack_octuplet()
        } else {
            self.octuplet_pos += 1;
            Ok(())
        }
    }

    fn pack_octuplet(&mut self) -> Result<()> {
        self.packed.write_packed_u32(&self.octuplet, self.width)?;
        self.octuplet_pos = 0;
        self.packed_octuplets += 1;
        Ok(())
    }

    fn flush_bit_packed(&mut self) -> Result<()> {
        self.out.write_varint64(((self.packed_octuplets as u64) << 1) | 1)?;
        self.out.write_buffer(&self.packed)?;
        self.packed.reset();
        self.packed_octuplets = 0;
        Ok(())
    }

    fn flush_rle(&mut self) -> Result<()> {
        if self.packed_octuplets > 0 {
            self.flush_bit_packed()?;
        }
        self.out.write_varint64((self.rle_count as u64) << 1)?;
        self.out.write_packed_int(self.rle_value, self.width)?;
        self.rle_count = 0;
        Ok(())
    }
}

impl Encoder for FixedWidthRunLengthEncoder {
    fn finish(&mut self) -> Result<()> {
        if self.finished {
            return Ok(());
        }
        if self.octuplet_pos > 0 {
            self.octuplet[self.octuplet_pos..].fill(0);
            self.pack_octuplet()?;
            self.flush_bit_packed()?;
        } else if self.rle_count > 0 {
            self.flush_rle()?;
        } else if self.packed_octuplets > 0 {
            self.flush_bit_packed()?;
        }
        self.finished = true;
        Ok(())
    }

    fn encoded_len(&self) -> usize {
        self.out.len()
    }

    fn estimated_len(&self) -> usize {
        // a partial octuplet is padded to a full one at finish
        let octuplets = self.packed_octuplets + usize::from(self.octuplet_pos > 0);
        let pending_packed = if octuplets > 0 {
            varint_len64(((octuplets as u64) << 1) | 1) + octuplets * self.width as usize
        } else {
            0
        };
        let pending_rle = if self.rle_count > 0 {
            varint_len64((self.rle_count as u64) << 1) + (self.width as usize).div_ceil(8)
        } else {
            0
        };
        self.out.len() + pending_packed + pending_rle
    }

    fn reset(&mut self) {
        self.out.reset();
        self.packed.reset();
        self.rle_value = 0;
        self.rle_count = 0;
        self.octuplet_pos = 0;
        self.packed_octuplets = 0;
        self.finished = false;
    }

    fn write_to(&mut self, out: &mut ByteWriter) -> Result<()> {
        self.finish()?;
        out.write_buffer(&self.out)
    }
}

/// Reads a run stream at a known bit width.
#[derive(Debug)]
pub struct FixedWidthRunLengthDecoder<'a> {
    reader: ByteReader<'a>,
    width: u8,
    octuplet: [u32; OCTUPLET],
    octuplet_pos: usize,
    octuplets_left: u64,
    rle_value: u32,
    rle_left: u64,
}

impl<'a> FixedWidthRunLengthDecoder<'a> {
    pub fn new(reader: ByteReader<'a>, width: u8) -> Result<Self> {
        Ok(Self {
            reader,
            width: check_width(width)?,
            octuplet: [0; OCTUPLET],
            octuplet_pos: OCTUPLET,
            octuplets_left: 0,
            rle_value: 0,
            rle_left: 0,
        })
    }

    fn next_run(&mut self) -> Result<()> {
        let header = self.reader.read_varint64()?;
        let count = header >> 1;
        if count == 0 {
            return Err(Error::Malformed("empty run"));
        }
        if header & 1 == 1 {
            self.octuplets_left = count;
            self.next_octuplet()
        } else {
            self.rle_value = self.reader.read_packed_int(self.width)?;
            self.rle_left = count;
            Ok(())
        }
    }

    fn next_octuplet(&mut self) -> Result<()> {
        self.reader.read_packed_u32(&mut self.octuplet, self.width)?;
        self.octuplets_left -= 1;
        self.octuplet_pos = 0;
        Ok(())
    }
}

impl Decoder for FixedWidthRunLengthDecoder<'_> {
    type Item = u32;

    fn decode(&mut self) -> Result<u32> {
        if self.rle_left == 0 && self.octuplet_pos == OCTUPLET {
            if self.octuplets_left > 0 {
                self.next_octuplet()?;
            } else {
                self.next_run()?;
            }
        }
        if self.rle_left > 0 {
            self.rle_left -= 1;
            return Ok(self.rle_value);
        }
        let v = self.octuplet[self.octuplet_pos];
        self.octuplet_pos += 1;
        Ok(v)
    }
}

/// Run codec that picks the narrowest bit width covering every value.
///
/// Values are buffered until [`finish`](Encoder::finish), which computes the
/// width and replays them through a [`FixedWidthRunLengthEncoder`]. The width
/// is not written: read it from [`bit_width`](RunLengthEncoder::bit_width)
/// and decode with [`FixedWidthRunLengthDecoder`].
#[derive(Debug)]
pub struct RunLengthEncoder {
    values: Vec<u32>,
    max_width: u8,
    inner: FixedWidthRunLengthEncoder,
    finished: bool,
}

impl Default for RunLengthEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl RunLengthEncoder {
    pub fn new() -> Self {
        Self {
            values: Vec::new(),
            max_width: 0,
            inner: FixedWidthRunLengthEncoder::with_width(0),
            finished: false,
        }
    }

    pub fn encode(&mut self, v: u32) -> Result<()> {
        if self.finished {
            return Err(Error::EncodeAfterFinish);
        }
        self.values.try_reserve(1)?;
        self.values.push(v);
        self.max_width = self.max_width.max(bit_width32(v));
        Ok(())
    }

    /// Bit width of the widest value encoded so far.
    pub fn bit_width(&self) -> u8 {
        self.max_width
    }

    pub fn num_values(&self) -> usize {
        self.values.len()
    }
}

impl Encoder for RunLengthEncoder {
    fn finish(&mut self) -> Result<()> {
        if self.finished {
            return Ok(());
        }
        self.inner.set_width(self.max_width)?;
        for &v in &self.values {
            self.inner.push(v)?;
        }
        self.inner.finish()?;
        self.finished = true;
        Ok(())
    }

    fn encoded_len(&self) -> usize {
        self.inner.encoded_len()
    }

    fn estimated_len(&self) -> usize {
        if self.finished {
            return self.inner.encoded_len();
        }
        // worst case: one bit-packed run covering everything
        let octuplets = self.values.len().div_ceil(OCTUPLET);
        varint_len64(((octuplets as u64) << 1) | 1) + octuplets * self.max_width as usize
    }

    fn reset(&mut self) {
        self.values.clear();
        self.max_width = 0;
        self.inner.reset();
        self.finished = false;
    }

    fn write_to(&mut self, out: &mut ByteWriter) -> Result<()> {
        self.finish()?;
        self.inner.write_to(out)
    }
}

/// [`RunLengthEncoder`] whose output starts with the bit width as one byte.
#[derive(Debug, Default)]
pub struct WidthPrefixedRunLengthEncoder {
    inner: RunLengthEncoder,
}

impl WidthPrefixedRunLengthEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn encode(&mut self, v: u32) -> Result<()> {
        self.inner.encode(v)
    }

    pub fn bit_width(&self) -> u8 {
        self.inner.bit_width()
    }
}

impl Encoder for WidthPrefixedRunLengthEncoder {
    fn finish(&mut self) -> Result<()> {
        self.inner.finish()
    }

    fn encoded_len(&self) -> usize {
        1 + self.inner.encoded_len()
    }

    fn estimated_len(&self) -> usize {
        1 + self.inner.estimated_len()
    }

    fn reset(&mut self) {
        self.inner.reset();
    }

    fn write_to(&mut self, out: &mut ByteWriter) -> Result<()> {
        self.inner.finish()?;
        out.write_u8(self.inner.bit_width())?;
        self.inner.write_to(out)
    }
}

/// Reads the width byte, then the runs.
#[derive(Debug)]
pub struct WidthPrefixedRunLengthDecoder<'a> {
    inner: FixedWidthRunLengthDecoder<'a>,
}

impl<'a> WidthPrefixedRunLengthDecoder<'a> {
    pub fn new(mut reader: ByteReader<'a>) -> Result<Self> {
        let width = reader.read_u8()?;
        Ok(Self {
            inner: FixedWidthRunLengthDecoder::new(reader, width)?,
        })
    }

    pub fn bit_width(&self) -> u8 {
        self.inner.width
    }
}

impl Decoder for WidthPrefixedRunLengthDecoder<'_> {
    type Item = u32;

    fn decode(&mut self) -> Result<u32> {
        self.inner.decode()
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use test_case::test_case;

    use super::*;

    fn encode_fixed(values: &[u32], width: u8) -> Vec<u8> {
        let mut enc = FixedWidthRunLengthEncoder::new(width).unwrap();
        for &v in values {
            enc.encode(v).unwrap();
        }
        let mut out = ByteWriter::new();
        enc.write_to(&mut out).unwrap();
        out.into_inner()
    }

    fn decode_fixed(bytes: &[u8], width: u8, n: usize) -> Vec<u32> {
        let mut dec = FixedWidthRunLengthDecoder::new(ByteReader::new(bytes), width).unwrap();
        dec.decode_n(n).unwrap()
    }

    #[test]
    fn test_single_rle_run() {
        let bytes = encode_fixed(&[5; 10], 3);
        // header 10 << 1, then the value in one byte
        assert_eq!(bytes, vec![20, 5]);
        assert_eq!(decode_fixed(&bytes, 3, 10), vec![5; 10]);
    }

    #[test]
    fn test_partial_octuplet_is_zero_padded() {
        let bytes = encode_fixed(&[1, 2, 3], 2);
        // RLE candidate of 1 absorbed, then one padded octuplet
        assert_eq!(bytes, vec![0b11, 0b0011_1001, 0]);
        assert_eq!(decode_fixed(&bytes, 2, 3), vec![1, 2, 3]);
    }

    #[test]
    fn test_rle_after_bit_packed_flushes_octuplets_first() {
        let mut values: Vec<u32> = (0..8).collect();
        values.extend([7; 20]);
        values.push(1);
        let bytes = encode_fixed(&values, 3);
        // bit-packed header for one octuplet comes before the RLE header
        assert_eq!(bytes[0], 0b11);
        assert_eq!(bytes[4], 20 << 1);
        assert_eq!(decode_fixed(&bytes, 3, values.len()), values);
    }

    #[test_case(1)]
    #[test_case(2)]
    #[test_case(3)]
    #[test_case(4)]
    #[test_case(5)]
    #[test_case(6)]
    #[test_case(7)]
    #[test_case(8)]
    #[test_case(9)]
    #[test_case(12)]
    #[test_case(15)]
    #[test_case(16)]
    #[test_case(17)]
    #[test_case(20)]
    #[test_case(24)]
    #[test_case(25)]
    #[test_case(31)]
    #[test_case(32)]
    fn test_rle_threshold_boundary(width: u8) {
        let threshold = rle_threshold(width);
        let value = 1u32;

        let mut at_threshold = vec![value; threshold];
        at_threshold.push(0);
        let bytes = encode_fixed(&at_threshold, width);
        assert_eq!(bytes[0] & 1, 0, "run of {threshold} should be RLE at width {width}");
        assert_eq!(decode_fixed(&bytes, width, at_threshold.len()), at_threshold);

        let mut below = vec![value; threshold - 1];
        below.push(0);
        let bytes = encode_fixed(&below, width);
        assert_eq!(bytes[0] & 1, 1, "run of {} should be bit-packed at width {width}", threshold - 1);
        assert_eq!(decode_fixed(&bytes, width, below.len()), below);
    }

    #[test]
    fn test_rle_threshold_boundary_all_widths() {
        for width in 1..=32u8 {
            let threshold = rle_threshold(width);
            let mut values = vec![1u32; threshold - 1];
            values.push(0);
            assert_eq!(encode_fixed(&values, width)[0] & 1, 1, "width {width}");
            values.insert(0, 1);
            assert_eq!(encode_fixed(&values, width)[0] & 1, 0, "width {width}");
        }
    }

    #[test]
    fn test_width_zero() {
        let bytes = encode_fixed(&[0; 100], 0);
        assert_eq!(bytes, vec![200, 1]);
        assert_eq!(decode_fixed(&bytes, 0, 100), vec![0; 100]);
    }

    #[test]
    fn test_self_width_is_minimal() {
        let mut rng = StdRng::seed_from_u64(11);
        for max in [0u32, 1, 2, 255, 256, 70_000, u32::MAX] {
            let mut values: Vec<u32> = (0..200).map(|_| rng.gen_range(0..=max)).collect();
            values.push(max);
            let mut enc = RunLengthEncoder::new();
            for &v in &values {
                enc.encode(v).unwrap();
            }
            assert_eq!(enc.bit_width(), bit_width32(max));
            let mut out = ByteWriter::new();
            enc.write_to(&mut out).unwrap();
            let decoded = decode_fixed(out.as_slice(), enc.bit_width(), values.len());
            assert_eq!(decoded, values);
        }
    }

    #[test]
    fn test_width_prefixed_roundtrip() {
        let values: Vec<u32> = (0..500).map(|i| if i % 50 < 30 { 9 } else { i % 7 }).collect();
        let mut enc = WidthPrefixedRunLengthEncoder::new();
        for &v in &values {
            enc.encode(v).unwrap();
        }
        let mut out = ByteWriter::new();
        enc.write_to(&mut out).unwrap();
        assert_eq!(out.as_slice()[0], 4);
        assert_eq!(out.len(), enc.encoded_len());
        let mut dec = WidthPrefixedRunLengthDecoder::new(ByteReader::new(out.as_slice())).unwrap();
        assert_eq!(dec.bit_width(), 4);
        assert_eq!(dec.decode_n(values.len()).unwrap(), values);
    }

    #[test_case(&[]; "empty")]
    #[test_case(&[6]; "single value")]
    fn test_short_streams_roundtrip(values: &[u32]) {
        let bytes = encode_fixed(values, 3);
        assert_eq!(bytes.is_empty(), values.is_empty());
        let mut dec = FixedWidthRunLengthDecoder::new(ByteReader::new(&bytes), 3).unwrap();
        assert_eq!(dec.decode_n(values.len()).unwrap(), values);
        if values.is_empty() {
            assert!(matches!(dec.decode(), Err(Error::UnexpectedEof { .. })));
        }

        let mut enc = RunLengthEncoder::new();
        for &v in values {
            enc.encode(v).unwrap();
        }
        let mut out = ByteWriter::new();
        enc.write_to(&mut out).unwrap();
        let decoded = decode_fixed(out.as_slice(), enc.bit_width(), values.len());
        assert_eq!(decoded, values);

        let mut enc = WidthPrefixedRunLengthEncoder::new();
        for &v in values {
            enc.encode(v).unwrap();
        }
        let mut out = ByteWriter::new();
        enc.write_to(&mut out).unwrap();
        assert_eq!(out.len(), enc.encoded_len());
        let mut dec = WidthPrefixedRunLengthDecoder::new(ByteReader::new(out.as_slice())).unwrap();
        assert_eq!(dec.decode_n(values.len()).unwrap(), values);
    }

    #[test]
    fn test_empty_width_prefixed_is_one_byte() {
        let mut enc = WidthPrefixedRunLengthEncoder::new();
        let mut out = ByteWriter::new();
        enc.write_to(&mut out).unwrap();
        assert_eq!(out.as_slice(), &[0]);
        assert_eq!(enc.encoded_len(), 1);
    }

    #[test]
    fn test_width_prefixed_finish_idempotent() {
        let mut enc = WidthPrefixedRunLengthEncoder::new();
        for v in [9, 9, 9, 9, 9, 9, 9, 9, 9, 1, 2] {
            enc.encode(v).unwrap();
        }
        enc.finish().unwrap();
        let len = enc.encoded_len();
        enc.finish().unwrap();
        assert_eq!(enc.encoded_len(), len);
        let mut a = ByteWriter::new();
        enc.write_to(&mut a).unwrap();
        let mut b = ByteWriter::new();
        enc.write_to(&mut b).unwrap();
        assert_eq!(a.as_slice(), b.as_slice());
        assert_eq!(a.len(), len);
        assert!(matches!(enc.encode(1), Err(Error::EncodeAfterFinish)));
    }

    #[test]
    fn test_finish_idempotent() {
        let mut enc = RunLengthEncoder::new();
        for v in [3, 3, 3, 1, 2] {
            enc.encode(v).unwrap();
        }
        enc.finish().unwrap();
        let len = enc.encoded_len();
        enc.finish().unwrap();
        assert_eq!(enc.encoded_len(), len);
        let mut a = ByteWriter::new();
        enc.write_to(&mut a).unwrap();
        let mut b = ByteWriter::new();
        enc.write_to(&mut b).unwrap();
        assert_eq!(a.as_slice(), b.as_slice());
        assert!(matches!(enc.encode(1), Err(Error::EncodeAfterFinish)));
    }

    #[test]
    fn test_reset_reuses_encoder() {
        let mut enc = FixedWidthRunLengthEncoder::new(4).unwrap();
        for v in [1, 2, 3] {
            enc.encode(v).unwrap();
        }
        enc.finish().unwrap();
        enc.reset();
        for v in [5; 12] {
            enc.encode(v).unwrap();
        }
        let mut out = ByteWriter::new();
        enc.write_to(&mut out).unwrap();
        assert_eq!(out.as_slice(), &[24, 5]);
    }

    #[test]
    fn test_malformed_streams() {
        assert!(FixedWidthRunLengthEncoder::new(33).is_err());
        assert!(FixedWidthRunLengthDecoder::new(ByteReader::new(&[]), 40).is_err());

        let mut dec = FixedWidthRunLengthDecoder::new(ByteReader::new(&[0, 0]), 8).unwrap();
        assert!(matches!(dec.decode(), Err(Error::Malformed(_))));

        // bit-packed run of two octuplets at width 8 with only one present
        let mut truncated = vec![0b101];
        truncated.extend([1u8; 8]);
        let mut dec = FixedWidthRunLengthDecoder::new(ByteReader::new(&truncated), 8).unwrap();
        assert_eq!(dec.decode_n(8).unwrap(), vec![1; 8]);
        assert!(matches!(dec.decode(), Err(Error::UnexpectedEof { .. })));
    }

    #[test]
    fn test_estimate_tracks_pending_values() {
        let mut enc = FixedWidthRunLengthEncoder::new(8).unwrap();
        assert_eq!(enc.estimated_len(), 0);
        for v in 0..20u32 {
            enc.encode(v).unwrap();
        }
        let estimate = enc.estimated_len();
        enc.finish().unwrap();
        assert!(estimate >= enc.encoded_len());
    }
}
