use colenc_core::Compressor;
use colenc_core::format::COMPRESSOR_NONE;

/// Identity compressor: pages are stored verbatim.
///
/// Useful for:
/// - Checking encoder output independently of any compressor.
/// - Pages whose encoded form is already dense (bit-packed booleans, RLE
///   streams) where a general compressor buys little.
pub struct PassThroughCodec;

impl Compressor for PassThroughCodec {
    fn id(&self) -> u16 {
        COMPRESSOR_NONE
    }

    fn name(&self) -> &'static str {
        "none"
    }

    fn compress(&self, raw: &[u8]) -> anyhow::Result<Vec<u8>> {
        Ok(raw.to_vec())
    }

    fn decompress(&self, compressed: &[u8], _uncompressed_len: usize) -> anyhow::Result<Vec<u8>> {
        Ok(compressed.to_vec())
    }
}
