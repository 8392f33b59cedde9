//! Adaptive delta / frame-of-reference block codec for 32 and 64-bit integers.
//!
//! # Block layout
//! ```text
//! varint   block_size          0, 8, 16, 32, 64, 128, then multiples of 128
//! varint   mini_block_count    divides block_size
//! varint   value_count         first value included
//! zigzag   first_value
//! ── present only when mini_block_count > 0 ──
//! zigzag   min_delta           varint64 for i32, varint128 for i64
//! u8 × mini_block_count        bit width of each mini-block
//! packed relative deltas       per mini-block, only for values present
//! ```
//! Every delta in a block is stored relative to the block's smallest delta, so
//! stored values are never negative. Deltas are computed in `i128` so that
//! `i64::MAX - i64::MIN` does not overflow; the decoder rebuilds values with
//! wrapping arithmetic in the value's width.

use std::fmt::Debug;
use std::mem;

use crate::codec::{Decoder, Encoder};
use crate::error::{Error, Result};
use crate::format::{
    block_size_for, BLOCK_SIZE_UNIT, MAX_BUFFERED_VALUES, MAX_DECODED_BLOCK_SIZE,
    MAX_VALUES_PER_BLOCK_32, MIN_MINIBLOCK_SIZE,
};
use crate::reader::ByteReader;
use crate::writer::{bit_width64, ByteWriter};

/// Integer type carried by the delta codec.
pub trait DeltaValue: Copy + Debug {
    /// Width of the raw value, used by size estimates.
    const BYTES: usize;

    /// Whether the encoder grows blocks past 128 values and decides splits by
    /// comparing encoded sizes.
    const SPLIT_LOOKAHEAD: bool;

    fn widen(self) -> i128;

    /// Keep the low bits of a value rebuilt with wrapping arithmetic.
    fn truncate(v: i64) -> Self;

    fn write_first(self, out: &mut ByteWriter) -> Result<()>;

    fn read_first(reader: &mut ByteReader<'_>) -> Result<i64>;

    fn write_min_delta(min_delta: i128, out: &mut ByteWriter) -> Result<()>;

    /// Minimum delta reduced to the decoder's wrapping 64-bit domain.
    fn read_min_delta(reader: &mut ByteReader<'_>) -> Result<i64>;
}

impl DeltaValue for i32 {
    const BYTES: usize = 4;
    const SPLIT_LOOKAHEAD: bool = false;

    fn widen(self) -> i128 {
        self as i128
    }

    fn truncate(v: i64) -> Self {
        v as i32
    }

    fn write_first(self, out: &mut ByteWriter) -> Result<()> {
        out.write_zigzag32(self)
    }

    fn read_first(reader: &mut ByteReader<'_>) -> Result<i64> {
        reader.read_zigzag32().map(i64::from)
    }

    fn write_min_delta(min_delta: i128, out: &mut ByteWriter) -> Result<()> {
        // two i32s are never more than 2^32 apart
        out.write_zigzag64(min_delta as i64)
    }

    fn read_min_delta(reader: &mut ByteReader<'_>) -> Result<i64> {
        reader.read_zigzag64()
    }
}

impl DeltaValue for i64 {
    const BYTES: usize = 8;
    const SPLIT_LOOKAHEAD: bool = true;

    fn widen(self) -> i128 {
        self as i128
    }

    fn truncate(v: i64) -> Self {
        v
    }

    fn write_first(self, out: &mut ByteWriter) -> Result<()> {
        out.write_zigzag64(self)
    }

    fn read_first(reader: &mut ByteReader<'_>) -> Result<i64> {
        reader.read_zigzag64()
    }

    fn write_min_delta(min_delta: i128, out: &mut ByteWriter) -> Result<()> {
        out.write_zigzag128(min_delta)
    }

    fn read_min_delta(reader: &mut ByteReader<'_>) -> Result<i64> {
        reader.read_zigzag128().map(|d| d as i64)
    }
}

/// Scratch state for serializing one block at its best mini-block size.
///
/// Candidates are written alternately into `best` and `trial`; the smaller
/// one is kept in `best` by swapping the two buffers.
#[derive(Debug, Default)]
struct BlockSearch {
    relative: Vec<u64>,
    widths: Vec<u8>,
    best: ByteWriter,
    trial: ByteWriter,
}

impl BlockSearch {
    /// Serialize `values` as one block into `self.best`, returning its length.
    fn encode_best<T: DeltaValue>(&mut self, values: &[T]) -> Result<usize> {
        let Some(&first) = values.first() else {
            return Err(Error::Malformed("empty delta block"));
        };
        let num_values = values.len();
        let block_size = block_size_for(num_values);

        let mut min_delta = i128::MAX;
        self.relative.clear();
        self.relative.try_reserve(num_values - 1)?;
        for pair in values.windows(2) {
            let delta = pair[1].widen() - pair[0].widen();
            min_delta = min_delta.min(delta);
        }
        for pair in values.windows(2) {
            let delta = pair[1].widen() - pair[0].widen();
            // below 2^65; only the low 64 bits are needed to rebuild an i64
            self.relative.push((delta - min_delta) as u64);
        }

        let block = Block {
            block_size,
            num_values,
            first,
            min_delta,
            relative: &self.relative,
        };

        self.best.reset();
        if block_size == 0 {
            block.write(&mut self.best, 0, &mut self.widths)?;
            return Ok(self.best.len());
        }

        let mut mini_block_size = MIN_MINIBLOCK_SIZE;
        block.write(&mut self.best, mini_block_size, &mut self.widths)?;
        let mut best_mini_block_size = mini_block_size;

        let mut candidates = Vec::new();
        mini_block_size <<= 1;
        while mini_block_size <= block_size.min(BLOCK_SIZE_UNIT) {
            candidates.push(mini_block_size);
            mini_block_size <<= 1;
        }
        if block_size > BLOCK_SIZE_UNIT {
            candidates.push(block_size);
        }
        for candidate in candidates {
            self.trial.reset();
            block.write(&mut self.trial, candidate, &mut self.widths)?;
            if self.trial.len() < self.best.len() {
                mem::swap(&mut self.best, &mut self.trial);
                best_mini_block_size = candidate;
            }
        }

        tracing::trace!(
            num_values,
            block_size,
            mini_block_size = best_mini_block_size,
            len = self.best.len(),
            "delta block encoded"
        );
        Ok(self.best.len())
    }
}

struct Block<'a, T> {
    block_size: usize,
    num_values: usize,
    first: T,
    min_delta: i128,
    relative: &'a [u64],
}

impl<T: DeltaValue> Block<'_, T> {
    fn write(&self, out: &mut ByteWriter, mini_block_size: usize, widths: &mut Vec<u8>) -> Result<()> {
        let num_mini_blocks = if mini_block_size == 0 {
            0
        } else {
            self.block_size / mini_block_size
        };
        out.write_varint64(self.block_size as u64)?;
        out.write_varint64(num_mini_blocks as u64)?;
        out.write_varint64(self.num_values as u64)?;
        self.first.write_first(out)?;
        if num_mini_blocks == 0 {
            return Ok(());
        }
        T::write_min_delta(self.min_delta, out)?;

        widths.clear();
        widths.extend(
            self.relative
                .chunks(mini_block_size)
                .map(|chunk| chunk.iter().map(|&r| bit_width64(r)).max().unwrap_or(0)),
        );
        // trailing mini-blocks with no values are declared at width 0
        widths.resize(num_mini_blocks, 0);
        out.write_bytes(widths)?;

        for (chunk, &width) in self.relative.chunks(mini_block_size).zip(widths.iter()) {
            out.write_packed_u64(chunk, width)?;
        }
        Ok(())
    }
}

/// Streaming delta encoder.
///
/// `DeltaEncoder<i32>` closes a block every 128 values. `DeltaEncoder<i64>`
/// keeps buffering in steps of 128 and, each time the buffer reaches
/// `k * 128 + 1` values (k ≥ 2), compares one block against a split at the last
/// full 128-value boundary; the head is flushed only if the split is strictly
/// smaller. At [`MAX_BUFFERED_VALUES`] the head is flushed unconditionally.
#[derive(Debug)]
pub struct DeltaEncoder<T> {
    out: ByteWriter,
    values: Vec<T>,
    flushed_values: usize,
    search: BlockSearch,
    finished: bool,
}

pub type Int32DeltaEncoder = DeltaEncoder<i32>;
pub type Int64DeltaEncoder = DeltaEncoder<i64>;

impl<T: DeltaValue> Default for DeltaEncoder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: DeltaValue> DeltaEncoder<T> {
    pub fn new() -> Self {
        Self {
            out: ByteWriter::new(),
            values: Vec::with_capacity(MAX_VALUES_PER_BLOCK_32),
            flushed_values: 0,
            search: BlockSearch::default(),
            finished: false,
        }
    }

    pub fn encode(&mut self, v: T) -> Result<()> {
        if self.finished {
            return Err(Error::EncodeAfterFinish);
        }
        let buffered = self.values.len();
        if T::SPLIT_LOOKAHEAD {
            if buffered % BLOCK_SIZE_UNIT == 1 && buffered > 2 * BLOCK_SIZE_UNIT {
                if buffered >= MAX_BUFFERED_VALUES {
                    self.flush_head(split_point(buffered))?;
                } else {
                    self.try_flush_head()?;
                }
            }
        } else if buffered == MAX_VALUES_PER_BLOCK_32 {
            self.flush_all()?;
        }
        self.values.try_reserve(1)?;
        self.values.push(v);
        Ok(())
    }

    /// Values encoded so far, flushed or not.
    pub fn num_values(&self) -> usize {
        self.flushed_values + self.values.len()
    }

    fn try_flush_head(&mut self) -> Result<()> {
        let buffered = self.values.len();
        let split = split_point(buffered);
        let as_one = self.search.encode_best(&self.values)?;
        // second block first, so `best` holds the head when we flush it
        let tail = self.search.encode_best(&self.values[split..])?;
        let head = self.search.encode_best(&self.values[..split])?;
        if head + tail < as_one {
            tracing::trace!(buffered, split, as_one, split_len = head + tail, "delta head flushed early");
            self.out.write_buffer(&self.search.best)?;
            self.drain_head(split);
        }
        Ok(())
    }

    fn flush_head(&mut self, split: usize) -> Result<()> {
        self.search.encode_best(&self.values[..split])?;
        self.out.write_buffer(&self.search.best)?;
        self.drain_head(split);
        Ok(())
    }

    fn drain_head(&mut self, split: usize) {
        self.values.drain(..split);
        self.flushed_values += split;
    }

    fn flush_all(&mut self) -> Result<()> {
        if self.values.is_empty() {
            return Ok(());
        }
        self.search.encode_best(&self.values)?;
        self.out.write_buffer(&self.search.best)?;
        self.flushed_values += self.values.len();
        self.values.clear();
        Ok(())
    }
}

/// Length of the head when splitting after the last full block of 128 deltas.
///
/// The head keeps a whole number of 128-delta blocks and the tail at least
/// one delta; needs `buffered > BLOCK_SIZE_UNIT + 1`.
fn split_point(buffered: usize) -> usize {
    (buffered - 2) / BLOCK_SIZE_UNIT * BLOCK_SIZE_UNIT + 1
}

impl<T: DeltaValue> Encoder for DeltaEncoder<T> {
    fn finish(&mut self) -> Result<()> {
        if self.finished {
            return Ok(());
        }
        if T::SPLIT_LOOKAHEAD && self.values.len() > BLOCK_SIZE_UNIT + 1 {
            self.try_flush_head()?;
        }
        self.flush_all()?;
        self.finished = true;
        Ok(())
    }

    fn encoded_len(&self) -> usize {
        self.out.len()
    }

    fn estimated_len(&self) -> usize {
        let pending = self.values.len();
        if self.flushed_values == 0 {
            return pending * T::BYTES;
        }
        self.out.len() + self.out.len() * pending / self.flushed_values
    }

    fn reset(&mut self) {
        self.out.reset();
        self.values.clear();
        self.flushed_values = 0;
        self.finished = false;
    }

    fn write_to(&mut self, out: &mut ByteWriter) -> Result<()> {
        self.finish()?;
        out.write_buffer(&self.out)
    }
}

/// Streaming delta decoder, one block header and one mini-block at a time.
#[derive(Debug)]
pub struct DeltaDecoder<'a, T> {
    reader: ByteReader<'a>,
    values_left: usize,
    first_pending: bool,
    current: i64,
    min_delta: i64,
    mini_block_size: usize,
    widths: Vec<u8>,
    mini_block_index: usize,
    deltas_left: usize,
    mini_block: Vec<u64>,
    mini_block_pos: usize,
    _marker: std::marker::PhantomData<T>,
}

pub type Int32DeltaDecoder<'a> = DeltaDecoder<'a, i32>;
pub type Int64DeltaDecoder<'a> = DeltaDecoder<'a, i64>;

impl<'a, T: DeltaValue> DeltaDecoder<'a, T> {
    pub fn new(reader: ByteReader<'a>) -> Self {
        Self {
            reader,
            values_left: 0,
            first_pending: false,
            current: 0,
            min_delta: 0,
            mini_block_size: 0,
            widths: Vec::new(),
            mini_block_index: 0,
            deltas_left: 0,
            mini_block: Vec::new(),
            mini_block_pos: 0,
            _marker: std::marker::PhantomData,
        }
    }

    fn read_block_header(&mut self) -> Result<()> {
        let block_size = read_len(&mut self.reader)?;
        let num_mini_blocks = read_len(&mut self.reader)?;
        let num_values = read_len(&mut self.reader)?;

        if num_values == 0 {
            return Err(Error::Malformed("delta block declares no values"));
        }
        if block_size > MAX_DECODED_BLOCK_SIZE {
            return Err(Error::Malformed("delta block size too large"));
        }
        if num_mini_blocks == 0 {
            if num_values != 1 {
                return Err(Error::Malformed("delta block without mini-blocks holds several values"));
            }
        } else if block_size == 0 || block_size % num_mini_blocks != 0 {
            return Err(Error::Malformed("mini-block count does not divide block size"));
        } else if num_values - 1 > block_size {
            return Err(Error::Malformed("delta block holds more values than its size"));
        }

        self.current = T::read_first(&mut self.reader)?;
        self.widths.clear();
        if num_mini_blocks > 0 {
            self.min_delta = T::read_min_delta(&mut self.reader)?;
            let widths = self.reader.read_bytes(num_mini_blocks)?;
            if widths.iter().any(|&w| w > 64) {
                return Err(Error::Malformed("mini-block bit width above 64"));
            }
            self.widths.extend_from_slice(widths);
            self.mini_block_size = block_size / num_mini_blocks;
        }
        self.values_left = num_values;
        self.deltas_left = num_values - 1;
        self.first_pending = true;
        self.mini_block_index = 0;
        self.mini_block.clear();
        self.mini_block_pos = 0;
        Ok(())
    }

    fn read_mini_block(&mut self) -> Result<()> {
        let width = self.widths[self.mini_block_index];
        let len = self.mini_block_size.min(self.deltas_left);
        self.mini_block.clear();
        self.mini_block.resize(len, 0);
        self.reader.read_packed_u64(&mut self.mini_block, width)?;
        self.mini_block_index += 1;
        self.deltas_left -= len;
        self.mini_block_pos = 0;
        Ok(())
    }
}

fn read_len(reader: &mut ByteReader<'_>) -> Result<usize> {
    usize::try_from(reader.read_varint64()?).map_err(|_| Error::Malformed("length exceeds usize"))
}

impl<T: DeltaValue> Decoder for DeltaDecoder<'_, T> {
    type Item = T;

    fn decode(&mut self) -> Result<T> {
        if self.values_left == 0 {
            self.read_block_header()?;
        }
        if self.first_pending {
            self.first_pending = false;
            self.values_left -= 1;
            return Ok(T::truncate(self.current));
        }
        if self.mini_block_pos == self.mini_block.len() {
            self.read_mini_block()?;
        }
        let relative = self.mini_block[self.mini_block_pos];
        self.mini_block_pos += 1;
        self.values_left -= 1;
        self.current = self
            .current
            .wrapping_add(relative as i64)
            .wrapping_add(self.min_delta);
        Ok(T::truncate(self.current))
    }
}
