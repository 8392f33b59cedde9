//! Closed encoder/decoder families per value type.
//!
//! A stream's [`Encoding`] is chosen by the caller (or read back from wherever
//! the caller stored it) and selects one variant. Encodings that do not apply
//! to a value type fail with [`Error::UnsupportedEncoding`].
//!
//! | value type  | encodings                                              |
//! |-------------|--------------------------------------------------------|
//! | `bool`      | plain (bit-packed)                                     |
//! | `i32`       | plain, varint, zigzag, packed-run-length, delta        |
//! | `i64`       | plain, varint, zigzag, delta                           |
//! | `f32`/`f64` | plain                                                  |
//! | byte string | plain, delta-length, incremental, fixed-length         |
//!
//! `i32` packed-run-length and varint streams carry the value's bit pattern
//! as an unsigned integer, so negative values cost the full width.

use crate::boolean::{BooleanPackedDecoder, BooleanPackedEncoder};
use crate::bytes::{
    DeltaLengthDecoder, DeltaLengthEncoder, FixedLengthDecoder, FixedLengthEncoder,
    IncrementalDecoder, IncrementalEncoder, PlainByteArrayDecoder, PlainByteArrayEncoder,
};
use crate::codec::{Decoder, Encoder};
use crate::delta::{DeltaDecoder, DeltaEncoder};
use crate::error::{Error, Result};
use crate::format::Encoding;
use crate::plain::{PlainDecoder, PlainEncoder};
use crate::reader::ByteReader;
use crate::rle::{WidthPrefixedRunLengthDecoder, WidthPrefixedRunLengthEncoder};
use crate::varint::{VarintDecoder, VarintEncoder};
use crate::writer::ByteWriter;

fn unsupported<T>(encoding: Encoding, value_type: &'static str) -> Result<T> {
    Err(Error::UnsupportedEncoding {
        encoding,
        value_type,
    })
}

/// Forward the [`Encoder`] lifecycle to whichever variant is active.
macro_rules! dispatch_encoder {
    ($ty:ident { $($variant:ident),+ $(,)? }) => {
        impl Encoder for $ty {
            fn finish(&mut self) -> Result<()> {
                match self {
                    $($ty::$variant(e) => e.finish(),)+
                }
            }

            fn encoded_len(&self) -> usize {
                match self {
                    $($ty::$variant(e) => e.encoded_len(),)+
                }
            }

            fn estimated_len(&self) -> usize {
                match self {
                    $($ty::$variant(e) => e.estimated_len(),)+
                }
            }

            fn reset(&mut self) {
                match self {
                    $($ty::$variant(e) => e.reset(),)+
                }
            }

            fn write_to(&mut self, out: &mut ByteWriter) -> Result<()> {
                match self {
                    $($ty::$variant(e) => e.write_to(out),)+
                }
            }
        }
    };
}

// ── Booleans ───────────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum BooleanEncoder {
    Plain(BooleanPackedEncoder),
}

impl BooleanEncoder {
    pub fn new(encoding: Encoding) -> Result<Self> {
        match encoding {
            Encoding::Plain => Ok(Self::Plain(BooleanPackedEncoder::new())),
            other => unsupported(other, "boolean"),
        }
    }

    pub fn encoding(&self) -> Encoding {
        Encoding::Plain
    }

    pub fn encode(&mut self, v: bool) -> Result<()> {
        match self {
            Self::Plain(e) => e.encode(v),
        }
    }
}

dispatch_encoder!(BooleanEncoder { Plain });

#[derive(Debug)]
pub enum BooleanDecoder<'a> {
    Plain(BooleanPackedDecoder<'a>),
}

impl<'a> BooleanDecoder<'a> {
    pub fn new(encoding: Encoding, reader: ByteReader<'a>) -> Result<Self> {
        match encoding {
            Encoding::Plain => Ok(Self::Plain(BooleanPackedDecoder::new(reader))),
            other => unsupported(other, "boolean"),
        }
    }
}

impl Decoder for BooleanDecoder<'_> {
    type Item = bool;

    fn decode(&mut self) -> Result<bool> {
        match self {
            Self::Plain(d) => d.decode(),
        }
    }
}

// ── 32-bit integers ────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum Int32Encoder {
    Plain(PlainEncoder<i32>),
    Varint(VarintEncoder<u32>),
    ZigZag(VarintEncoder<i32>),
    PackedRunLength(WidthPrefixedRunLengthEncoder),
    Delta(DeltaEncoder<i32>),
}

impl Int32Encoder {
    pub fn new(encoding: Encoding) -> Result<Self> {
        Ok(match encoding {
            Encoding::Plain => Self::Plain(PlainEncoder::new()),
            Encoding::Varint => Self::Varint(VarintEncoder::new()),
            Encoding::ZigZag => Self::ZigZag(VarintEncoder::new()),
            Encoding::PackedRunLength => Self::PackedRunLength(WidthPrefixedRunLengthEncoder::new()),
            Encoding::Delta => Self::Delta(DeltaEncoder::new()),
            other => return unsupported(other, "int32"),
        })
    }

    pub fn encoding(&self) -> Encoding {
        match self {
            Self::Plain(_) => Encoding::Plain,
            Self::Varint(_) => Encoding::Varint,
            Self::ZigZag(_) => Encoding::ZigZag,
            Self::PackedRunLength(_) => Encoding::PackedRunLength,
            Self::Delta(_) => Encoding::Delta,
        }
    }

    pub fn encode(&mut self, v: i32) -> Result<()> {
        match self {
            Self::Plain(e) => e.encode(v),
            Self::Varint(e) => e.encode(v as u32),
            Self::ZigZag(e) => e.encode(v),
            Self::PackedRunLength(e) => e.encode(v as u32),
            Self::Delta(e) => e.encode(v),
        }
    }
}

dispatch_encoder!(Int32Encoder {
    Plain,
    Varint,
    ZigZag,
    PackedRunLength,
    Delta,
});

#[derive(Debug)]
pub enum Int32Decoder<'a> {
    Plain(PlainDecoder<'a, i32>),
    Varint(VarintDecoder<'a, u32>),
    ZigZag(VarintDecoder<'a, i32>),
    PackedRunLength(WidthPrefixedRunLengthDecoder<'a>),
    Delta(DeltaDecoder<'a, i32>),
}

impl<'a> Int32Decoder<'a> {
    pub fn new(encoding: Encoding, reader: ByteReader<'a>) -> Result<Self> {
        Ok(match encoding {
            Encoding::Plain => Self::Plain(PlainDecoder::new(reader)),
            Encoding::Varint => Self::Varint(VarintDecoder::new(reader)),
            Encoding::ZigZag => Self::ZigZag(VarintDecoder::new(reader)),
            Encoding::PackedRunLength => {
                Self::PackedRunLength(WidthPrefixedRunLengthDecoder::new(reader)?)
            }
            Encoding::Delta => Self::Delta(DeltaDecoder::new(reader)),
            other => return unsupported(other, "int32"),
        })
    }
}

impl Decoder for Int32Decoder<'_> {
    type Item = i32;

    fn decode(&mut self) -> Result<i32> {
        match self {
            Self::Plain(d) => d.decode(),
            Self::Varint(d) => d.decode().map(|v| v as i32),
            Self::ZigZag(d) => d.decode(),
            Self::PackedRunLength(d) => d.decode().map(|v| v as i32),
            Self::Delta(d) => d.decode(),
        }
    }
}

// ── 64-bit integers ────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum Int64Encoder {
    Plain(PlainEncoder<i64>),
    Varint(VarintEncoder<u64>),
    ZigZag(VarintEncoder<i64>),
    Delta(DeltaEncoder<i64>),
}

impl Int64Encoder {
    pub fn new(encoding: Encoding) -> Result<Self> {
        Ok(match encoding {
            Encoding::Plain => Self::Plain(PlainEncoder::new()),
            Encoding::Varint => Self::Varint(VarintEncoder::new()),
            Encoding::ZigZag => Self::ZigZag(VarintEncoder::new()),
            Encoding::Delta => Self::Delta(DeltaEncoder::new()),
            other => return unsupported(other, "int64"),
        })
    }

    pub fn encoding(&self) -> Encoding {
        match self {
            Self::Plain(_) => Encoding::Plain,
            Self::Varint(_) => Encoding::Varint,
            Self::ZigZag(_) => Encoding::ZigZag,
            Self::Delta(_) => Encoding::Delta,
        }
    }

    pub fn encode(&mut self, v: i64) -> Result<()> {
        match self {
            Self::Plain(e) => e.encode(v),
            Self::Varint(e) => e.encode(v as u64),
            Self::ZigZag(e) => e.encode(v),
            Self::Delta(e) => e.encode(v),
        }
    }
}

dispatch_encoder!(Int64Encoder {
    Plain,
    Varint,
    ZigZag,
    Delta,
});

#[derive(Debug)]
pub enum Int64Decoder<'a> {
    Plain(PlainDecoder<'a, i64>),
    Varint(VarintDecoder<'a, u64>),
    ZigZag(VarintDecoder<'a, i64>),
    Delta(DeltaDecoder<'a, i64>),
}

impl<'a> Int64Decoder<'a> {
    pub fn new(encoding: Encoding, reader: ByteReader<'a>) -> Result<Self> {
        Ok(match encoding {
            Encoding::Plain => Self::Plain(PlainDecoder::new(reader)),
            Encoding::Varint => Self::Varint(VarintDecoder::new(reader)),
            Encoding::ZigZag => Self::ZigZag(VarintDecoder::new(reader)),
            Encoding::Delta => Self::Delta(DeltaDecoder::new(reader)),
            other => return unsupported(other, "int64"),
        })
    }
}

impl Decoder for Int64Decoder<'_> {
    type Item = i64;

    fn decode(&mut self) -> Result<i64> {
        match self {
            Self::Plain(d) => d.decode(),
            Self::Varint(d) => d.decode().map(|v| v as i64),
            Self::ZigZag(d) => d.decode(),
            Self::Delta(d) => d.decode(),
        }
    }
}

// ── Floating point ─────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum FloatEncoder {
    Plain(PlainEncoder<f32>),
}

impl FloatEncoder {
    pub fn new(encoding: Encoding) -> Result<Self> {
        match encoding {
            Encoding::Plain => Ok(Self::Plain(PlainEncoder::new())),
            other => unsupported(other, "float"),
        }
    }

    pub fn encoding(&self) -> Encoding {
        Encoding::Plain
    }

    pub fn encode(&mut self, v: f32) -> Result<()> {
        match self {
            Self::Plain(e) => e.encode(v),
        }
    }
}

dispatch_encoder!(FloatEncoder { Plain });

#[derive(Debug)]
pub enum FloatDecoder<'a> {
    Plain(PlainDecoder<'a, f32>),
}

impl<'a> FloatDecoder<'a> {
    pub fn new(encoding: Encoding, reader: ByteReader<'a>) -> Result<Self> {
        match encoding {
            Encoding::Plain => Ok(Self::Plain(PlainDecoder::new(reader))),
            other => unsupported(other, "float"),
        }
    }
}

impl Decoder for FloatDecoder<'_> {
    type Item = f32;

    fn decode(&mut self) -> Result<f32> {
        match self {
            Self::Plain(d) => d.decode(),
        }
    }
}

#[derive(Debug)]
pub enum DoubleEncoder {
    Plain(PlainEncoder<f64>),
}

impl DoubleEncoder {
    pub fn new(encoding: Encoding) -> Result<Self> {
        match encoding {
            Encoding::Plain => Ok(Self::Plain(PlainEncoder::new())),
            other => unsupported(other, "double"),
        }
    }

    pub fn encoding(&self) -> Encoding {
        Encoding::Plain
    }

    pub fn encode(&mut self, v: f64) -> Result<()> {
        match self {
            Self::Plain(e) => e.encode(v),
        }
    }
}

dispatch_encoder!(DoubleEncoder { Plain });

#[derive(Debug)]
pub enum DoubleDecoder<'a> {
    Plain(PlainDecoder<'a, f64>),
}

impl<'a> DoubleDecoder<'a> {
    pub fn new(encoding: Encoding, reader: ByteReader<'a>) -> Result<Self> {
        match encoding {
            Encoding::Plain => Ok(Self::Plain(PlainDecoder::new(reader))),
            other => unsupported(other, "double"),
        }
    }
}

impl Decoder for DoubleDecoder<'_> {
    type Item = f64;

    fn decode(&mut self) -> Result<f64> {
        match self {
            Self::Plain(d) => d.decode(),
        }
    }
}

// ── Byte strings ───────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum ByteArrayEncoder {
    Plain(PlainByteArrayEncoder),
    DeltaLength(DeltaLengthEncoder),
    Incremental(IncrementalEncoder),
    FixedLength(FixedLengthEncoder),
}

impl ByteArrayEncoder {
    pub fn new(encoding: Encoding) -> Result<Self> {
        Ok(match encoding {
            Encoding::Plain => Self::Plain(PlainByteArrayEncoder::new()),
            Encoding::DeltaLength => Self::DeltaLength(DeltaLengthEncoder::new()),
            Encoding::Incremental => Self::Incremental(IncrementalEncoder::new()),
            Encoding::FixedLength => Self::FixedLength(FixedLengthEncoder::new()),
            other => return unsupported(other, "byte array"),
        })
    }

    pub fn encoding(&self) -> Encoding {
        match self {
            Self::Plain(_) => Encoding::Plain,
            Self::DeltaLength(_) => Encoding::DeltaLength,
            Self::Incremental(_) => Encoding::Incremental,
            Self::FixedLength(_) => Encoding::FixedLength,
        }
    }

    pub fn encode(&mut self, bytes: &[u8]) -> Result<()> {
        match self {
            Self::Plain(e) => e.encode(bytes),
            Self::DeltaLength(e) => e.encode(bytes),
            Self::Incremental(e) => e.encode(bytes),
            Self::FixedLength(e) => e.encode(bytes),
        }
    }
}

dispatch_encoder!(ByteArrayEncoder {
    Plain,
    DeltaLength,
    Incremental,
    FixedLength,
});

#[derive(Debug)]
pub enum ByteArrayDecoder<'a> {
    Plain(PlainByteArrayDecoder<'a>),
    DeltaLength(DeltaLengthDecoder<'a>),
    Incremental(IncrementalDecoder<'a>),
    FixedLength(FixedLengthDecoder<'a>),
}

impl<'a> ByteArrayDecoder<'a> {
    pub fn new(encoding: Encoding, reader: ByteReader<'a>) -> Result<Self> {
        Ok(match encoding {
            Encoding::Plain => Self::Plain(PlainByteArrayDecoder::new(reader)),
            Encoding::DeltaLength => Self::DeltaLength(DeltaLengthDecoder::new(reader)?),
            Encoding::Incremental => Self::Incremental(IncrementalDecoder::new(reader)?),
            Encoding::FixedLength => Self::FixedLength(FixedLengthDecoder::new(reader)?),
            other => return unsupported(other, "byte array"),
        })
    }
}

impl Decoder for ByteArrayDecoder<'_> {
    type Item = Vec<u8>;

    fn decode(&mut self) -> Result<Vec<u8>> {
        match self {
            Self::Plain(d) => d.decode(),
            Self::DeltaLength(d) => d.decode(),
            Self::Incremental(d) => d.decode(),
            Self::FixedLength(d) => d.decode(),
        }
    }
}
