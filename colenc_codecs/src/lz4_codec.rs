use colenc_core::Compressor;
use colenc_core::format::COMPRESSOR_LZ4;

/// LZ4 block compressor.
///
/// Pages are raw LZ4 blocks with no size prefix; the page header already
/// records the uncompressed length, which sizes the output buffer.
///
/// Best for: hot columns where decode speed matters more than page size.
pub struct Lz4Codec;

impl Compressor for Lz4Codec {
    fn id(&self) -> u16 {
        COMPRESSOR_LZ4
    }

    fn name(&self) -> &'static str {
        "lz4"
    }

    fn compress(&self, raw: &[u8]) -> anyhow::Result<Vec<u8>> {
        Ok(lz4_flex::block::compress(raw))
    }

    fn decompress(&self, compressed: &[u8], uncompressed_len: usize) -> anyhow::Result<Vec<u8>> {
        let raw = lz4_flex::block::decompress(compressed, uncompressed_len)
            .map_err(|e| anyhow::anyhow!("lz4 decompress error: {}", e))?;
        Ok(raw)
    }
}
