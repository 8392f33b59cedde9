//! Columnar value encodings.
//!
//! Encoders turn a stream of same-typed values into compact bytes; decoders
//! read them back in order. Finished streams can be handed to a
//! [`PageCompressor`] together with any [`Compressor`] implementation
//! (see the `colenc_codecs` crate for the bundled ones).

pub mod boolean;
pub mod bytes;
pub mod codec;
pub mod column;
pub mod compression;
pub mod delta;
pub mod error;
pub mod format;
pub mod plain;
pub mod reader;
pub mod rle;
pub mod varint;
pub mod writer;

pub use boolean::{BooleanPackedDecoder, BooleanPackedEncoder};
pub use bytes::{
    DeltaLengthDecoder, DeltaLengthEncoder, FixedLengthDecoder, FixedLengthEncoder,
    IncrementalDecoder, IncrementalEncoder, PlainByteArrayDecoder, PlainByteArrayEncoder,
};
pub use codec::{Compressor, Decoder, Encoder};
pub use column::{
    BooleanDecoder, BooleanEncoder, ByteArrayDecoder, ByteArrayEncoder, DoubleDecoder,
    DoubleEncoder, FloatDecoder, FloatEncoder, Int32Decoder, Int32Encoder, Int64Decoder,
    Int64Encoder,
};
pub use compression::{DecompressedPage, PageCompressor, PageDecompressor};
pub use delta::{
    DeltaDecoder, DeltaEncoder, Int32DeltaDecoder, Int32DeltaEncoder, Int64DeltaDecoder,
    Int64DeltaEncoder,
};
pub use error::{Error, Result};
pub use format::Encoding;
pub use plain::{PlainDecoder, PlainEncoder};
pub use reader::ByteReader;
pub use rle::{
    FixedWidthRunLengthDecoder, FixedWidthRunLengthEncoder, RunLengthEncoder,
    WidthPrefixedRunLengthDecoder, WidthPrefixedRunLengthEncoder,
};
pub use varint::{VarintDecoder, VarintEncoder};
pub use writer::ByteWriter;
