//! Fixed-width little-endian codecs for numeric values.

use std::marker::PhantomData;

use crate::codec::{Decoder, Encoder};
use crate::error::{Error, Result};
use crate::reader::ByteReader;
use crate::writer::ByteWriter;

/// A numeric type with a fixed-width little-endian representation.
pub trait PlainValue: Copy {
    /// Encoded width in bytes.
    const WIDTH: usize;

    fn write_plain(self, out: &mut ByteWriter) -> Result<()>;

    fn read_plain(reader: &mut ByteReader<'_>) -> Result<Self>;
}

impl PlainValue for i32 {
    const WIDTH: usize = 4;

    fn write_plain(self, out: &mut ByteWriter) -> Result<()> {
        out.write_fixed_u32(self as u32)
    }

    fn read_plain(reader: &mut ByteReader<'_>) -> Result<Self> {
        reader.read_fixed_u32().map(|v| v as i32)
    }
}

impl PlainValue for i64 {
    const WIDTH: usize = 8;

    fn write_plain(self, out: &mut ByteWriter) -> Result<()> {
        out.write_fixed_u64(self as u64)
    }

    fn read_plain(reader: &mut ByteReader<'_>) -> Result<Self> {
        reader.read_fixed_u64().map(|v| v as i64)
    }
}

impl PlainValue for f32 {
    const WIDTH: usize = 4;

    fn write_plain(self, out: &mut ByteWriter) -> Result<()> {
        out.write_f32(self)
    }

    fn read_plain(reader: &mut ByteReader<'_>) -> Result<Self> {
        reader.read_f32()
    }
}

impl PlainValue for f64 {
    const WIDTH: usize = 8;

    fn write_plain(self, out: &mut ByteWriter) -> Result<()> {
        out.write_f64(self)
    }

    fn read_plain(reader: &mut ByteReader<'_>) -> Result<Self> {
        reader.read_f64()
    }
}

#[derive(Debug)]
pub struct PlainEncoder<T> {
    out: ByteWriter,
    finished: bool,
    _marker: PhantomData<T>,
}

impl<T: PlainValue> Default for PlainEncoder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: PlainValue> PlainEncoder<T> {
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
        v.write_plain(&mut self.out)
    }
}

impl<T: PlainValue> Encoder for PlainEncoder<T> {
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
pub struct PlainDecoder<'a, T> {
    reader: ByteReader<'a>,
    _marker: PhantomData<T>,
}

impl<'a, T: PlainValue> PlainDecoder<'a, T> {
    pub fn new(reader: ByteReader<'a>) -> Self {
        Self {
            reader,
            _marker: PhantomData,
        }
    }
}

impl<T: PlainValue> Decoder for PlainDecoder<'_, T> {
    type Item = T;

    fn decode(&mut self) -> Result<T> {
        T::read_plain(&mut self.reader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip<T: PlainValue + PartialEq + std::fmt::Debug>(values: &[T]) {
        let mut enc = PlainEncoder::<T>::new();
        for &v in values {
            enc.encode(v).unwrap();
        }
        let mut out = ByteWriter::new();
        enc.write_to(&mut out).unwrap();
        assert_eq!(out.len(), values.len() * T::WIDTH);
        let mut dec = PlainDecoder::<T>::new(ByteReader::new(out.as_slice()));
        assert_eq!(dec.decode_n(values.len()).unwrap(), values);
        assert!(dec.decode().is_err());
    }

    #[test]
    fn test_plain_roundtrips() {
        roundtrip(&[0i32, -1, i32::MIN, i32::MAX, 42]);
        roundtrip(&[0i64, -1, i64::MIN, i64::MAX]);
        roundtrip(&[0.0f32, -1.5, f32::MAX, f32::MIN_POSITIVE]);
        roundtrip(&[0.0f64, 1e300, -2.25, f64::NEG_INFINITY]);
    }

    #[test]
    fn test_float_bit_pattern_preserved() {
        let mut enc = PlainEncoder::<f64>::new();
        enc.encode(f64::NAN).unwrap();
        enc.encode(-0.0).unwrap();
        let mut out = ByteWriter::new();
        enc.write_to(&mut out).unwrap();
        let mut dec = PlainDecoder::<f64>::new(ByteReader::new(out.as_slice()));
        assert!(dec.decode().unwrap().is_nan());
        assert_eq!(dec.decode().unwrap().to_bits(), (-0.0f64).to_bits());
    }

    #[test]
    fn test_little_endian_layout() {
        let mut enc = PlainEncoder::<i32>::new();
        enc.encode(-2).unwrap();
        let mut out = ByteWriter::new();
        enc.write_to(&mut out).unwrap();
        assert_eq!(out.as_slice(), &[0xfe, 0xff, 0xff, 0xff]);
    }
}
