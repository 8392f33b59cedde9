use crate::error::Result;
use crate::writer::ByteWriter;

/// Lifecycle shared by every value encoder.
///
/// An encoder starts empty, accepts values through its inherent `encode`
/// method, and is sealed by [`finish`](Encoder::finish). After that it can be
/// written out or [`reset`](Encoder::reset) for reuse. Calling `encode` on a
/// finished encoder fails with [`Error::EncodeAfterFinish`](crate::Error).
///
/// `encode` is not part of the trait: value types differ per encoder and
/// byte-string encoders borrow their input.
pub trait Encoder {
    /// Flush buffered values into their terminal byte form. Idempotent.
    fn finish(&mut self) -> Result<()>;

    /// Exact encoded length in bytes. Only meaningful after `finish`.
    fn encoded_len(&self) -> usize;

    /// Cheap size estimate usable at any point, for page-splitting decisions.
    fn estimated_len(&self) -> usize;

    /// Drop all state, keeping allocated buffers.
    fn reset(&mut self);

    /// Finish, then append the encoded bytes to `out`.
    fn write_to(&mut self, out: &mut ByteWriter) -> Result<()>;
}

/// Pulls values one at a time out of a single encoded stream.
///
/// Decoders are not resettable and have no random access: build a new one per
/// stream. Decoding past the last encoded value is an error, not a sentinel.
pub trait Decoder {
    type Item;

    fn decode(&mut self) -> Result<Self::Item>;

    /// Decode the next `n` values.
    fn decode_n(&mut self, n: usize) -> Result<Vec<Self::Item>> {
        let mut out = Vec::new();
        out.try_reserve(n)?;
        for _ in 0..n {
            out.push(self.decode()?);
        }
        Ok(out)
    }
}

/// Whole-buffer general-purpose compression, applied to finished pages.
///
/// Each implementation:
/// - Is identified by a stable numeric `id()` that callers store next to the
///   compressed page.
/// - Compresses each buffer independently, with no state carried between calls.
/// - Is shareable across threads; one instance may serve many page writers.
pub trait Compressor: Send + Sync {
    /// Stable compressor id (see `format::COMPRESSOR_*`).
    fn id(&self) -> u16;

    /// Human-readable name for logs.
    fn name(&self) -> &'static str;

    fn compress(&self, raw: &[u8]) -> anyhow::Result<Vec<u8>>;

    /// Decompress `compressed`, whose original length was `uncompressed_len`.
    ///
    /// Implementations may use the length as a capacity hint; the adapter
    /// checks the actual output length itself.
    fn decompress(&self, compressed: &[u8], uncompressed_len: usize) -> anyhow::Result<Vec<u8>>;
}
