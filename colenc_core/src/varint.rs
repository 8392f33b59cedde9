//! Variable-length integer codecs: LEB128 for unsigned, zigzag for signed.

use std::marker::PhantomData;

use crate::codec::{Decoder, Encoder};
use crate::error::{Error, Result};
use crate::reader::ByteReader;
use crate::writer::ByteWriter;

/// An integer with a variable-length encoding.
pub trait VarintValue: Copy {
    fn write_varint(self, out: &mut ByteWriter) -> Result<()>;

    fn read_varint(reader: &mut ByteReader<'_>) -> Result<Self>;
}

impl VarintValue for u32 {
    fn write_varint(self, out: &mut ByteWriter) -> Result<()> {
        out.write_varint32(self)
    }

    fn read_varint(reader: &mut ByteReader<'_>) -> Result<Self> {
        reader.read_varint32()
    }
}

impl VarintValue for u64 {
    fn write_varint(self, out: &mut ByteWriter) -> Result<()> {
        out.write_varint64(self)
    }

    fn read_varint(reader: &mut ByteReader<'_>) -> Result<Self> {
        reader.read_varint64()
    }
}

impl VarintValue for i32 {
    fn write_varint(self, out: &mut ByteWriter) -> Result<()> {
        out.write_zigzag32(self)
    }

    fn read_varint(reader: &mut ByteReader<'_>) -> Result<Self> {
        reader.read_zigzag32()
    }
}

impl VarintValue for i64 {
    fn write_varint(self, out: &mut ByteWriter) -> Result<()> {
        out.write_zigzag64(self)
    }

    fn read_varint(reader: &mut ByteReader<'_>) -> Result<Self> {
        reader.read_zigzag64()
    }
}

#[derive(Debug)]
pub struct VarintEncoder<T> {
    out: ByteWriter,
    finished: bool,
    _marker: PhantomData<T>,
}

impl<T: VarintValue> Default for VarintEncoder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: VarintValue> VarintEncoder<T> {
    pub fn new() -> Self {
        Self {
            out: ByteWriter::new(),
            finished: false,
            _marker: PhantomData,
        }
    }

    pub fn encode(&mut self, v: T) -> Result<()> {
        if self.finished {
            return Err(Error::EncodeAfterFinish);
        }
        v.write_varint(&mut self.out)
    }
}

impl<T: VarintValue> Encoder for VarintEncoder<T> {
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
pub struct VarintDecoder<'a, T> {
    reader: ByteReader<'a>,
    _marker: PhantomData<T>,
}

impl<'a, T: VarintValue> VarintDecoder<'a, T> {
    pub fn new(reader: ByteReader<'a>) -> Self {
        Self {
            reader,
            _marker: PhantomData,
        }
    }
}

impl<T: VarintValue> Decoder for VarintDecoder<'_, T> {
    type Item = T;

    fn decode(&mut self) -> Result<T> {
        T::read_varint(&mut self.reader)
    }
}
