use anyhow::Context;
use colenc_core::Compressor;
use colenc_core::format::COMPRESSOR_ZSTD;

/// One zstd frame per page.
///
/// The level only matters when compressing; any [`ZstdCodec`] decodes any
/// frame. Decoding is capped at the page's declared uncompressed length, so a
/// frame that inflates past it is rejected instead of allocated.
#[derive(Debug, Clone, Copy)]
pub struct ZstdCodec {
    level: i32,
}

impl Default for ZstdCodec {
    fn default() -> Self {
        Self {
            level: zstd::DEFAULT_COMPRESSION_LEVEL,
        }
    }
}

impl ZstdCodec {
    /// Levels outside what the linked libzstd accepts are clamped into range.
    pub fn new(level: i32) -> Self {
        let range = zstd::compression_level_range();
        Self {
            level: level.clamp(*range.start(), *range.end()),
        }
    }

    pub fn level(&self) -> i32 {
        self.level
    }
}

impl Compressor for ZstdCodec {
    fn id(&self) -> u16 {
        COMPRESSOR_ZSTD
    }

    fn name(&self) -> &'static str {
        "zstd"
    }

    fn compress(&self, raw: &[u8]) -> anyhow::Result<Vec<u8>> {
        zstd::bulk::compress(raw, self.level)
            .with_context(|| format!("zstd level {} on {} bytes", self.level, raw.len()))
    }

    fn decompress(&self, compressed: &[u8], uncompressed_len: usize) -> anyhow::Result<Vec<u8>> {
        zstd::bulk::decompress(compressed, uncompressed_len)
            .with_context(|| format!("zstd frame does not fit in {} bytes", uncompressed_len))
    }
}
