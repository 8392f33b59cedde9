use xxhash_rust::xxh3::xxh3_64;

use crate::codec::{Compressor, Encoder};
use crate::error::{Error, Result};
use crate::reader::ByteReader;
use crate::writer::ByteWriter;

/// Compresses finished encoder output into page bytes.
///
/// # Page sequence
/// 1. Feed it one finished encoder ([`compress`](PageCompressor::compress)) or
///    raw bytes ([`compress_bytes`](PageCompressor::compress_bytes)).
/// 2. Record [`uncompressed_len`](PageCompressor::uncompressed_len),
///    [`compressed_len`](PageCompressor::compressed_len) and optionally
///    [`checksum`](PageCompressor::checksum) wherever the page header lives.
/// 3. [`write_to`](PageCompressor::write_to) appends the compressed bytes.
/// 4. [`reset`](PageCompressor::reset) before the next page.
///
/// The checksum is xxh3-64 over the compressed bytes, so a reader can reject a
/// corrupted page before handing it to the decompressor.
pub struct PageCompressor {
    compressor: Box<dyn Compressor>,
    input: ByteWriter,
    output: ByteWriter,
    checksum: u64,
}

impl PageCompressor {
    pub fn new(compressor: Box<dyn Compressor>) -> Self {
        Self {
            compressor,
            input: ByteWriter::new(),
            output: ByteWriter::new(),
            checksum: xxh3_64(&[]),
        }
    }

    pub fn compressor_id(&self) -> u16 {
        self.compressor.id()
    }

    /// Finish `encoder` and compress its output.
    pub fn compress<E: Encoder + ?Sized>(&mut self, encoder: &mut E) -> Result<()> {
        self.input.reset();
        encoder.write_to(&mut self.input)?;
        self.compress_input()
    }

    pub fn compress_bytes(&mut self, raw: &[u8]) -> Result<()> {
        self.input.reset();
        self.input.write_bytes(raw)?;
        self.compress_input()
    }

    fn compress_input(&mut self) -> Result<()> {
        let compressed = self.compressor.compress(self.input.as_slice())?;
        self.output.reset();
        self.output.write_bytes(&compressed)?;
        self.checksum = xxh3_64(self.output.as_slice());
        tracing::debug!(
            compressor = self.compressor.name(),
            uncompressed = self.input.len(),
            compressed = self.output.len(),
            "page compressed"
        );
        Ok(())
    }

    pub fn uncompressed_len(&self) -> usize {
        self.input.len()
    }

    pub fn compressed_len(&self) -> usize {
        self.output.len()
    }

    pub fn checksum(&self) -> u64 {
        self.checksum
    }

    pub fn reset(&mut self) {
        self.input.reset();
        self.output.reset();
        self.checksum = xxh3_64(&[]);
    }

    pub fn write_to(&self, out: &mut ByteWriter) -> Result<()> {
        out.write_buffer(&self.output)
    }
}

impl std::fmt::Debug for PageCompressor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageCompressor")
            .field("compressor", &self.compressor.name())
            .field("uncompressed_len", &self.input.len())
            .field("compressed_len", &self.output.len())
            .finish()
    }
}

/// Inverse of [`PageCompressor`].
pub struct PageDecompressor {
    compressor: Box<dyn Compressor>,
}

impl PageDecompressor {
    pub fn new(compressor: Box<dyn Compressor>) -> Self {
        Self { compressor }
    }

    /// Consume `compressed_len` bytes from `reader` and decompress them.
    ///
    /// When `checksum` is given it is verified before decompressing. The
    /// output must be exactly `uncompressed_len` bytes long.
    pub fn decompress(
        &self,
        reader: &mut ByteReader<'_>,
        compressed_len: usize,
        uncompressed_len: usize,
        checksum: Option<u64>,
    ) -> Result<DecompressedPage> {
        let compressed = reader.read_bytes(compressed_len)?;
        if let Some(expected) = checksum {
            let actual = xxh3_64(compressed);
            if actual != expected {
                return Err(Error::ChecksumMismatch { expected, actual });
            }
        }
        let bytes = self.compressor.decompress(compressed, uncompressed_len)?;
        if bytes.len() != uncompressed_len {
            return Err(Error::SizeMismatch {
                expected: uncompressed_len,
                actual: bytes.len(),
            });
        }
        tracing::debug!(
            compressor = self.compressor.name(),
            compressed = compressed_len,
            uncompressed = uncompressed_len,
            "page decompressed"
        );
        Ok(DecompressedPage { bytes })
    }
}

impl std::fmt::Debug for PageDecompressor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageDecompressor")
            .field("compressor", &self.compressor.name())
            .finish()
    }
}

/// Owned decompressed bytes; decoders borrow them through [`reader`](Self::reader).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecompressedPage {
    bytes: Vec<u8>,
}

impl DecompressedPage {
    pub fn reader(&self) -> ByteReader<'_> {
        ByteReader::new(&self.bytes)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.bytes
    }
}
