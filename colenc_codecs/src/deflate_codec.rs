use std::io::{Read, Write};

use colenc_core::Compressor;
use colenc_core::format::COMPRESSOR_DEFLATE;
use flate2::Compression;
use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;

/// Raw DEFLATE compressor (no zlib or gzip framing).
///
/// Best for: interoperability with readers that only ship a deflate
/// implementation.
pub struct DeflateCodec {
    /// Compression level, 0 (store) to 9 (smallest).
    pub level: u32,
}

impl Default for DeflateCodec {
    fn default() -> Self {
        Self { level: 6 }
    }
}

impl DeflateCodec {
    pub fn new(level: u32) -> Self {
        Self { level: level.min(9) }
    }
}

impl Compressor for DeflateCodec {
    fn id(&self) -> u16 {
        COMPRESSOR_DEFLATE
    }

    fn name(&self) -> &'static str {
        "deflate"
    }

    fn compress(&self, raw: &[u8]) -> anyhow::Result<Vec<u8>> {
        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::new(self.level));
        encoder.write_all(raw)?;
        Ok(encoder.finish()?)
    }

    fn decompress(&self, compressed: &[u8], uncompressed_len: usize) -> anyhow::Result<Vec<u8>> {
        let mut raw = Vec::with_capacity(uncompressed_len);
        // one byte past the expected length is enough to detect an oversized page
        DeflateDecoder::new(compressed)
            .take(uncompressed_len as u64 + 1)
            .read_to_end(&mut raw)?;
        if raw.len() > uncompressed_len {
            tracing::debug!(expected = uncompressed_len, "deflate stream runs past the declared size");
        }
        Ok(raw)
    }
}
