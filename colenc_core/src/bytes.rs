//! Byte-string codecs.
//!
//! | encoder                       | stream                                                   |
//! |-------------------------------|----------------------------------------------------------|
//! | [`PlainByteArrayEncoder`]     | per value: fixed 4-byte LE length, bytes                 |
//! | [`DeltaLengthEncoder`]        | varint(lengths size), lengths (delta i32), payload       |
//! | [`IncrementalEncoder`]        | varint(prefixes size), prefixes (delta i32), delta-length suffixes |
//! | [`FixedLengthEncoder`]        | varint(length) once, raw records                         |
//!
//! Incremental encoding shares each value's prefix with the value right
//! before it. Sorted or clustered input shrinks a lot; unsorted input still
//! round-trips but can be larger than delta-length.

use crate::codec::{Decoder, Encoder};
use crate::delta::{Int32DeltaDecoder, Int32DeltaEncoder};
use crate::error::{Error, Result};
use crate::reader::ByteReader;
use crate::writer::{varint_len64, ByteWriter};

fn length_to_i32(len: usize) -> Result<i32> {
    i32::try_from(len).map_err(|_| Error::Malformed("byte string longer than i32::MAX"))
}

fn length_from_i32(len: i32) -> Result<usize> {
    usize::try_from(len).map_err(|_| Error::Malformed("negative byte string length"))
}

// ── Plain ──────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct PlainByteArrayEncoder {
    out: ByteWriter,
    finished: bool,
}

impl PlainByteArrayEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn encode(&mut self, bytes: &[u8]) -> Result<()> {
        if self.finished {
            return Err(Error::EncodeAfterFinish);
        }
        let len = u32::try_from(bytes.len())
            .map_err(|_| Error::Malformed("byte string longer than u32::MAX"))?;
        self.out.ensure_remaining_capacity(4 + bytes.len())?;
        self.out.write_fixed_u32(len)?;
        self.out.write_bytes(bytes)
    }
}

impl Encoder for PlainByteArrayEncoder {
    fn finish(&mut self) -> Result<()> {
        self.finished = true;
        Ok(())
    }

    fn encoded_len(&self) -> usize {
        self.out.len()
    }

    fn estimated_len(&self) -> usize {
        self.out.len()
    }

    fn reset(&mut self) {
        self.out.reset();
        self.finished = false;
    }

    fn write_to(&mut self, out: &mut ByteWriter) -> Result<()> {
        self.finish()?;
        out.write_buffer(&self.out)
    }
}

#[derive(Debug)]
pub struct PlainByteArrayDecoder<'a> {
    reader: ByteReader<'a>,
}

impl<'a> PlainByteArrayDecoder<'a> {
    pub fn new(reader: ByteReader<'a>) -> Self {
        Self { reader }
    }
}

impl Decoder for PlainByteArrayDecoder<'_> {
    type Item = Vec<u8>;

    fn decode(&mut self) -> Result<Vec<u8>> {
        let len = self.reader.read_fixed_u32()? as usize;
        self.reader.read_bytes(len).map(<[u8]>::to_vec)
    }
}

// ── Delta-length ───────────────────────────────────────────────────────────

/// Lengths through the 32-bit delta codec, payloads concatenated after them.
#[derive(Debug, Default)]
pub struct DeltaLengthEncoder {
    lengths: Int32DeltaEncoder,
    payload: ByteWriter,
    finished: bool,
}

impl DeltaLengthEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn encode(&mut self, bytes: &[u8]) -> Result<()> {
        if self.finished {
            return Err(Error::EncodeAfterFinish);
        }
        let len = self.reserve(bytes.len())?;
        self.lengths.encode(len)?;
        self.payload.write_bytes(bytes)
    }

    /// Checks that a value of `len` bytes is encodable and reserves payload
    /// room for it. Nothing is pushed to either sub-stream.
    fn reserve(&mut self, len: usize) -> Result<i32> {
        let checked = length_to_i32(len)?;
        self.payload.ensure_remaining_capacity(len)?;
        Ok(checked)
    }

    pub fn num_values(&self) -> usize {
        self.lengths.num_values()
    }
}

impl Encoder for DeltaLengthEncoder {
    fn finish(&mut self) -> Result<()> {
        self.lengths.finish()?;
        self.finished = true;
        Ok(())
    }

    fn encoded_len(&self) -> usize {
        let lengths = self.lengths.encoded_len();
        varint_len64(lengths as u64) + lengths + self.payload.len()
    }

    fn estimated_len(&self) -> usize {
        let lengths = self.lengths.estimated_len();
        varint_len64(lengths as u64) + lengths + self.payload.len()
    }

    fn reset(&mut self) {
        self.lengths.reset();
        self.payload.reset();
        self.finished = false;
    }

    fn write_to(&mut self, out: &mut ByteWriter) -> Result<()> {
        self.finish()?;
        out.write_varint64(self.lengths.encoded_len() as u64)?;
        self.lengths.write_to(out)?;
        out.write_buffer(&self.payload)
    }
}

#[derive(Debug)]
pub struct DeltaLengthDecoder<'a> {
    lengths: Int32DeltaDecoder<'a>,
    payload: ByteReader<'a>,
}

impl<'a> DeltaLengthDecoder<'a> {
    pub fn new(mut reader: ByteReader<'a>) -> Result<Self> {
        let lengths_len = usize::try_from(reader.read_varint64()?)
            .map_err(|_| Error::Malformed("length exceeds usize"))?;
        let lengths = reader.take(lengths_len)?;
        Ok(Self {
            lengths: Int32DeltaDecoder::new(lengths),
            payload: reader,
        })
    }

    /// Append the next value to `out` instead of allocating.
    pub fn decode_into(&mut self, out: &mut Vec<u8>) -> Result<()> {
        let len = length_from_i32(self.lengths.decode()?)?;
        let bytes = self.payload.read_bytes(len)?;
        out.try_reserve(len)?;
        out.extend_from_slice(bytes);
        Ok(())
    }
}

impl Decoder for DeltaLengthDecoder<'_> {
    type Item = Vec<u8>;

    fn decode(&mut self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.decode_into(&mut out)?;
        Ok(out)
    }
}

// ── Incremental ────────────────────────────────────────────────────────────

/// Prefix-shared encoding against the immediately previous value.
#[derive(Debug, Default)]
pub struct IncrementalEncoder {
    prefixes: Int32DeltaEncoder,
    suffixes: DeltaLengthEncoder,
    previous: Vec<u8>,
    finished: bool,
}

impl IncrementalEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn encode(&mut self, bytes: &[u8]) -> Result<()> {
        if self.finished {
            return Err(Error::EncodeAfterFinish);
        }
        let prefix = common_prefix_len(&self.previous, bytes);
        let shared = length_to_i32(prefix)?;
        let suffix = &bytes[prefix..];
        self.suffixes.reserve(suffix.len())?;
        self.previous
            .try_reserve(bytes.len().saturating_sub(self.previous.len()))?;
        self.prefixes.encode(shared)?;
        self.suffixes.encode(suffix)?;
        self.previous.truncate(prefix);
        self.previous.extend_from_slice(suffix);
        Ok(())
    }
}

fn common_prefix_len(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

impl Encoder for IncrementalEncoder {
    fn finish(&mut self) -> Result<()> {
        self.prefixes.finish()?;
        self.suffixes.finish()?;
        self.finished = true;
        Ok(())
    }

    fn encoded_len(&self) -> usize {
        let prefixes = self.prefixes.encoded_len();
        varint_len64(prefixes as u64) + prefixes + self.suffixes.encoded_len()
    }

    fn estimated_len(&self) -> usize {
        let prefixes = self.prefixes.estimated_len();
        varint_len64(prefixes as u64) + prefixes + self.suffixes.estimated_len()
    }

    fn reset(&mut self) {
        self.prefixes.reset();
        self.suffixes.reset();
        self.previous.clear();
        self.finished = false;
    }

    fn write_to(&mut self, out: &mut ByteWriter) -> Result<()> {
        self.finish()?;
        out.write_varint64(self.prefixes.encoded_len() as u64)?;
        self.prefixes.write_to(out)?;
        self.suffixes.write_to(out)
    }
}

#[derive(Debug)]
pub struct IncrementalDecoder<'a> {
    prefixes: Int32DeltaDecoder<'a>,
    suffixes: DeltaLengthDecoder<'a>,
    previous: Vec<u8>,
}

impl<'a> IncrementalDecoder<'a> {
    pub fn new(mut reader: ByteReader<'a>) -> Result<Self> {
        let prefixes_len = usize::try_from(reader.read_varint64()?)
            .map_err(|_| Error::Malformed("length exceeds usize"))?;
        let prefixes = reader.take(prefixes_len)?;
        Ok(Self {
            prefixes: Int32DeltaDecoder::new(prefixes),
            suffixes: DeltaLengthDecoder::new(reader)?,
            previous: Vec::new(),
        })
    }
}

impl Decoder for IncrementalDecoder<'_> {
    type Item = Vec<u8>;

    fn decode(&mut self) -> Result<Vec<u8>> {
        let prefix = length_from_i32(self.prefixes.decode()?)?;
        if prefix > self.previous.len() {
            return Err(Error::Malformed("shared prefix longer than previous value"));
        }
        self.previous.truncate(prefix);
        self.suffixes.decode_into(&mut self.previous)?;
        Ok(self.previous.clone())
    }
}

// ── Fixed length ───────────────────────────────────────────────────────────

/// Raw records of one length, taken from the first value.
///
/// A value of any other length fails with [`Error::LengthMismatch`].
#[derive(Debug, Default)]
pub struct FixedLengthEncoder {
    out: ByteWriter,
    length: Option<usize>,
    finished: bool,
}

impl FixedLengthEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record length, once a value has been encoded.
    pub fn length(&self) -> Option<usize> {
        self.length
    }

    pub fn encode(&mut self, bytes: &[u8]) -> Result<()> {
        if self.finished {
            return Err(Error::EncodeAfterFinish);
        }
        match self.length {
            Some(expected) if expected != bytes.len() => {
                return Err(Error::LengthMismatch {
                    expected,
                    actual: bytes.len(),
                });
            }
            Some(_) => self.out.ensure_remaining_capacity(bytes.len())?,
            None => {
                let header = varint_len64(bytes.len() as u64);
                self.out.ensure_remaining_capacity(header + bytes.len())?;
                self.out.write_varint64(bytes.len() as u64)?;
                self.length = Some(bytes.len());
            }
        }
        self.out.write_bytes(bytes)
    }
}

impl Encoder for FixedLengthEncoder {
    fn finish(&mut self) -> Result<()> {
        if !self.finished && self.length.is_none() {
            self.out.write_varint64(0)?;
        }
        self.finished = true;
        Ok(())
    }

    fn encoded_len(&self) -> usize {
        self.out.len()
    }

    fn estimated_len(&self) -> usize {
        self.out.len() + usize::from(self.length.is_none() && !self.finished)
    }

    fn reset(&mut self) {
        self.out.reset();
        self.length = None;
        self.finished = false;
    }

    fn write_to(&mut self, out: &mut ByteWriter) -> Result<()> {
        self.finish()?;
        out.write_buffer(&self.out)
    }
}

#[derive(Debug)]
pub struct FixedLengthDecoder<'a> {
    reader: ByteReader<'a>,
    length: usize,
}

impl<'a> FixedLengthDecoder<'a> {
    pub fn new(mut reader: ByteReader<'a>) -> Result<Self> {
        let length = usize::try_from(reader.read_varint64()?)
            .map_err(|_| Error::Malformed("length exceeds usize"))?;
        Ok(Self { reader, length })
    }

    pub fn length(&self) -> usize {
        self.length
    }
}

impl Decoder for FixedLengthDecoder<'_> {
    type Item = Vec<u8>;

    fn decode(&mut self) -> Result<Vec<u8>> {
        self.reader.read_bytes(self.length).map(<[u8]>::to_vec)
    }
}
