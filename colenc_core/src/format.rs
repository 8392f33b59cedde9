use crate::error::{Error, Result};

/// Initial capacity of a freshly created [`ByteWriter`](crate::ByteWriter).
pub const DEFAULT_BUFFER_CAPACITY: usize = 1024;

// ── Delta blocks ───────────────────────────────────────────────────────────

/// Largest power-of-two block size, and the unit block sizes grow by beyond it.
pub const BLOCK_SIZE_UNIT: usize = 128;

/// Smallest mini-block size tried by the delta encoder.
pub const MIN_MINIBLOCK_SIZE: usize = 8;

/// Most values a 32-bit delta block holds (first value included).
pub const MAX_VALUES_PER_BLOCK_32: usize = BLOCK_SIZE_UNIT;

/// Hard cap on values buffered by the 64-bit delta encoder before it flushes
/// its head regardless of the size comparison.
pub const MAX_BUFFERED_VALUES: usize = 64 * BLOCK_SIZE_UNIT + 1;

/// Upper bound accepted by decoders for a declared block size.
pub const MAX_DECODED_BLOCK_SIZE: usize = MAX_BUFFERED_VALUES * 2;

/// Block size for a block of `num_values` values: 0 for a lone value, the
/// smallest power of two in `8..=128` covering the deltas, then multiples of 128.
///
/// ```rust
/// use colenc_core::format::block_size_for;
/// assert_eq!(block_size_for(1), 0);
/// assert_eq!(block_size_for(2), 8);
/// assert_eq!(block_size_for(129), 128);
/// assert_eq!(block_size_for(130), 256);
/// ```
pub fn block_size_for(num_values: usize) -> usize {
    let deltas = num_values.saturating_sub(1);
    if deltas == 0 {
        0
    } else if deltas <= BLOCK_SIZE_UNIT {
        deltas.next_power_of_two().max(MIN_MINIBLOCK_SIZE)
    } else {
        deltas.div_ceil(BLOCK_SIZE_UNIT) * BLOCK_SIZE_UNIT
    }
}

// ── RLE / bit-packing ──────────────────────────────────────────────────────

/// Values per bit-packed group.
pub const OCTUPLET: usize = 8;

/// Run length at which an RLE run becomes cheaper than bit-packing the same
/// values at `width` bits: `floor((2 + ceil(width/8)) * 8 / width) + 1`.
///
/// ```rust
/// use colenc_core::format::rle_threshold;
/// assert_eq!(rle_threshold(1), 25);
/// assert_eq!(rle_threshold(8), 4);
/// assert_eq!(rle_threshold(32), 2);
/// ```
pub fn rle_threshold(width: u8) -> usize {
    if width == 0 {
        return 1;
    }
    let width = width as usize;
    let rle_run_bytes = 2 + width.div_ceil(8);
    rle_run_bytes * 8 / width + 1
}

// ── Encoding ids ───────────────────────────────────────────────────────────

pub const ENCODING_PLAIN: u8 = 0;
pub const ENCODING_VARINT: u8 = 3;
pub const ENCODING_ZIGZAG: u8 = 4;
pub const ENCODING_PACKED_RUN_LENGTH: u8 = 5;
pub const ENCODING_DELTA: u8 = 6;
pub const ENCODING_INCREMENTAL: u8 = 7;
pub const ENCODING_DELTA_LENGTH: u8 = 8;
pub const ENCODING_FIXED_LENGTH: u8 = 9;

/// Stream encoding discriminant, stored by callers next to each stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    Plain,
    Varint,
    ZigZag,
    PackedRunLength,
    Delta,
    Incremental,
    DeltaLength,
    FixedLength,
}

impl Encoding {
    pub fn id(self) -> u8 {
        match self {
            Encoding::Plain => ENCODING_PLAIN,
            Encoding::Varint => ENCODING_VARINT,
            Encoding::ZigZag => ENCODING_ZIGZAG,
            Encoding::PackedRunLength => ENCODING_PACKED_RUN_LENGTH,
            Encoding::Delta => ENCODING_DELTA,
            Encoding::Incremental => ENCODING_INCREMENTAL,
            Encoding::DeltaLength => ENCODING_DELTA_LENGTH,
            Encoding::FixedLength => ENCODING_FIXED_LENGTH,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Encoding::Plain => "plain",
            Encoding::Varint => "varint",
            Encoding::ZigZag => "zigzag",
            Encoding::PackedRunLength => "packed-run-length",
            Encoding::Delta => "delta",
            Encoding::Incremental => "incremental",
            Encoding::DeltaLength => "delta-length",
            Encoding::FixedLength => "fixed-length",
        }
    }
}

impl TryFrom<u8> for Encoding {
    type Error = Error;

    fn try_from(id: u8) -> Result<Self> {
        Ok(match id {
            ENCODING_PLAIN => Encoding::Plain,
            ENCODING_VARINT => Encoding::Varint,
            ENCODING_ZIGZAG => Encoding::ZigZag,
            ENCODING_PACKED_RUN_LENGTH => Encoding::PackedRunLength,
            ENCODING_DELTA => Encoding::Delta,
            ENCODING_INCREMENTAL => Encoding::Incremental,
            ENCODING_DELTA_LENGTH => Encoding::DeltaLength,
            ENCODING_FIXED_LENGTH => Encoding::FixedLength,
            other => return Err(Error::UnknownEncoding(other)),
        })
    }
}

impl std::fmt::Display for Encoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ── Compressor ids ─────────────────────────────────────────────────────────

pub const COMPRESSOR_NONE: u16 = 0;
pub const COMPRESSOR_DEFLATE: u16 = 1;
pub const COMPRESSOR_LZ4: u16 = 2;
pub const COMPRESSOR_ZSTD: u16 = 3;
