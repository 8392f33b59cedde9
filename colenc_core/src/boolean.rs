use crate::codec::{Decoder, Encoder};
use crate::error::{Error, Result};
use crate::format::OCTUPLET;
use crate::reader::ByteReader;
use crate::writer::ByteWriter;

/// Packs booleans eight to a byte, most significant bit first.
#[derive(Debug, Default)]
pub struct BooleanPackedEncoder {
    out: ByteWriter,
    octuplet: [bool; OCTUPLET],
    position: usize,
    finished: bool,
}

impl BooleanPackedEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn encode(&mut self, b: bool) -> Result<()> {
        if self.finished {
            return Err(Error::EncodeAfterFinish);
        }
        self.push(b)
    }

    fn push(&mut self, b: bool) -> Result<()> {
        self.octuplet[self.position] = b;
        if self.position + 1 == OCTUPLET {
            self.out.write_packed_booleans(&self.octuplet)?;
            self.position = 0;
        } else {
            self.position += 1;
        }
        Ok(())
    }
}

impl Encoder for BooleanPackedEncoder {
    fn finish(&mut self) -> Result<()> {
        if !self.finished {
            while self.position > 0 {
                self.push(false)?;
            }
            self.finished = true;
        }
        Ok(())
    }

    fn encoded_len(&self) -> usize {
        self.out.len()
    }

    fn estimated_len(&self) -> usize {
        self.out.len() + usize::from(self.position > 0)
    }

    fn reset(&mut self) {
        self.out.reset();
        self.position = 0;
        self.finished = false;
    }

    fn write_to(&mut self, out: &mut ByteWriter) -> Result<()> {
        self.finish()?;
        out.write_buffer(&self.out)
    }
}

#[derive(Debug)]
pub struct BooleanPackedDecoder<'a> {
    reader: ByteReader<'a>,
    octuplet: [bool; OCTUPLET],
    position: usize,
}

impl<'a> BooleanPackedDecoder<'a> {
    pub fn new(reader: ByteReader<'a>) -> Self {
        Self {
            reader,
            octuplet: [false; OCTUPLET],
            position: OCTUPLET,
        }
    }
}

impl Decoder for BooleanPackedDecoder<'_> {
    type Item = bool;

    fn decode(&mut self) -> Result<bool> {
        if self.position == OCTUPLET {
            self.octuplet = self.reader.read_packed_booleans()?;
            self.position = 0;
        }
        let b = self.octuplet[self.position];
        self.position += 1;
        Ok(b)
    }
}
