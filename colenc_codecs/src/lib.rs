mod deflate_codec;
mod lz4_codec;
mod passthrough;
mod zstd_codec;

pub use deflate_codec::DeflateCodec;
pub use lz4_codec::Lz4Codec;
pub use passthrough::PassThroughCodec;
pub use zstd_codec::ZstdCodec;

use colenc_core::Compressor;
use colenc_core::format::{COMPRESSOR_DEFLATE, COMPRESSOR_LZ4, COMPRESSOR_NONE, COMPRESSOR_ZSTD};
use std::sync::Arc;

/// Resolve a compressor from the id stored next to a compressed page.
///
/// Level-configurable compressors come back with their default level; the
/// level does not affect decompression.
pub fn compressor_by_id(id: u16) -> anyhow::Result<Arc<dyn Compressor>> {
    boxed_compressor_by_id(id).map(Arc::from)
}

/// Boxed variant of [`compressor_by_id`], for the page adapters.
pub fn boxed_compressor_by_id(id: u16) -> anyhow::Result<Box<dyn Compressor>> {
    let compressor: Box<dyn Compressor> = match id {
        COMPRESSOR_NONE => Box::new(PassThroughCodec),
        COMPRESSOR_DEFLATE => Box::new(DeflateCodec::default()),
        COMPRESSOR_LZ4 => Box::new(Lz4Codec),
        COMPRESSOR_ZSTD => Box::new(ZstdCodec::default()),
        _ => anyhow::bail!(
            "unknown compressor id {}; supported: 0 (none), 1 (deflate), 2 (lz4), 3 (zstd)",
            id
        ),
    };
    tracing::debug!(id, name = compressor.name(), "compressor resolved");
    Ok(compressor)
}
