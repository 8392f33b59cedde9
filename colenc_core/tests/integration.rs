/// Integration tests: every encoder family round-trips realistic columns, and
/// finished streams survive page compression through every bundled compressor.
///
/// Test sequence per column:
///  1. Generate deterministic values with a seeded RNG
///  2. Encode them through the per-type encoder enum
///  3. Optionally compress the stream as a page and decompress it again
///  4. Decode exactly as many values as were written and compare
use colenc_codecs::{boxed_compressor_by_id, compressor_by_id};
use colenc_core::format::{
    COMPRESSOR_DEFLATE, COMPRESSOR_LZ4, COMPRESSOR_NONE, COMPRESSOR_ZSTD,
};
use colenc_core::{
    BooleanDecoder, BooleanEncoder, ByteArrayDecoder, ByteArrayEncoder, ByteReader, ByteWriter,
    Decoder, DoubleDecoder, DoubleEncoder, Encoder, Encoding, Error, Int32Decoder, Int32Encoder,
    Int64Decoder, Int64Encoder, PageCompressor, PageDecompressor,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const ALL_COMPRESSORS: [u16; 4] = [
    COMPRESSOR_NONE,
    COMPRESSOR_DEFLATE,
    COMPRESSOR_LZ4,
    COMPRESSOR_ZSTD,
];

// ── helpers ───────────────────────────────────────────────────────────────

/// Monotonic timestamps with jitter, the typical delta-encoded column.
fn timestamps(rng: &mut StdRng, n: usize) -> Vec<i64> {
    let mut t = 1_700_000_000_000i64;
    (0..n)
        .map(|_| {
            t += rng.gen_range(900..1100);
            t
        })
        .collect()
}

/// Low-cardinality values in runs, the typical run-length column.
fn status_codes(rng: &mut StdRng, n: usize) -> Vec<i32> {
    let mut out = Vec::with_capacity(n);
    while out.len() < n {
        let code = [200, 201, 404, 500][rng.gen_range(0..4)];
        let run = rng.gen_range(1..40);
        out.extend(std::iter::repeat(code).take(run));
    }
    out.truncate(n);
    out
}

fn urls(rng: &mut StdRng, n: usize) -> Vec<Vec<u8>> {
    let hosts = ["https://example.com/", "https://example.org/api/"];
    (0..n)
        .map(|_| {
            let host = hosts[rng.gen_range(0..hosts.len())];
            format!("{}{}/{}", host, rng.gen_range(0..50), rng.gen_range(0..1000)).into_bytes()
        })
        .collect()
}

fn encode_i32(encoding: Encoding, values: &[i32]) -> Vec<u8> {
    let mut enc = Int32Encoder::new(encoding).unwrap();
    for &v in values {
        enc.encode(v).unwrap();
    }
    let mut out = ByteWriter::new();
    enc.write_to(&mut out).unwrap();
    out.into_inner()
}

fn encode_i64(encoding: Encoding, values: &[i64]) -> Vec<u8> {
    let mut enc = Int64Encoder::new(encoding).unwrap();
    for &v in values {
        enc.encode(v).unwrap();
    }
    let mut out = ByteWriter::new();
    enc.write_to(&mut out).unwrap();
    out.into_inner()
}

fn encode_bytes(encoding: Encoding, values: &[Vec<u8>]) -> Vec<u8> {
    let mut enc = ByteArrayEncoder::new(encoding).unwrap();
    for v in values {
        enc.encode(v).unwrap();
    }
    let mut out = ByteWriter::new();
    enc.write_to(&mut out).unwrap();
    out.into_inner()
}

// ── tests ──────────────────────────────────────────────────────────────────

#[test]
fn test_int32_columns_roundtrip() {
    let mut rng = StdRng::seed_from_u64(7);
    let runs = status_codes(&mut rng, 5000);
    let wide: Vec<i32> = (0..5000).map(|_| rng.gen()).collect();

    for encoding in [
        Encoding::Plain,
        Encoding::Varint,
        Encoding::ZigZag,
        Encoding::PackedRunLength,
        Encoding::Delta,
    ] {
        for values in [&runs, &wide] {
            let bytes = encode_i32(encoding, values);
            let mut dec = Int32Decoder::new(encoding, ByteReader::new(&bytes)).unwrap();
            assert_eq!(&dec.decode_n(values.len()).unwrap(), values, "{}", encoding);
        }
    }

    // runs of a handful of codes need far less than plain's 4 bytes a value
    let rle = encode_i32(Encoding::PackedRunLength, &runs);
    assert!(rle.len() < runs.len() * 2, "rle stream is {} bytes", rle.len());
}

#[test]
fn test_int64_columns_roundtrip() {
    let mut rng = StdRng::seed_from_u64(11);
    let ts = timestamps(&mut rng, 10_000);
    let wide: Vec<i64> = (0..3000).map(|_| rng.gen()).collect();

    for encoding in [Encoding::Plain, Encoding::Varint, Encoding::ZigZag, Encoding::Delta] {
        for values in [&ts, &wide] {
            let bytes = encode_i64(encoding, values);
            let mut dec = Int64Decoder::new(encoding, ByteReader::new(&bytes)).unwrap();
            assert_eq!(&dec.decode_n(values.len()).unwrap(), values, "{}", encoding);
        }
    }

    // jittered deltas fit in about a byte each
    let delta = encode_i64(Encoding::Delta, &ts);
    assert!(delta.len() < ts.len() * 2, "delta stream is {} bytes", delta.len());
}

#[test]
fn test_byte_array_columns_roundtrip() {
    let mut rng = StdRng::seed_from_u64(13);
    let mut values = urls(&mut rng, 2000);
    for encoding in [Encoding::Plain, Encoding::DeltaLength, Encoding::Incremental] {
        let bytes = encode_bytes(encoding, &values);
        let mut dec = ByteArrayDecoder::new(encoding, ByteReader::new(&bytes)).unwrap();
        assert_eq!(dec.decode_n(values.len()).unwrap(), values, "{}", encoding);
    }

    // sorted input shares long prefixes
    values.sort();
    let plain = encode_bytes(Encoding::Plain, &values);
    let incremental = encode_bytes(Encoding::Incremental, &values);
    assert!(incremental.len() < plain.len());

    let fixed: Vec<Vec<u8>> = (0..1000).map(|_| rng.gen::<[u8; 16]>().to_vec()).collect();
    let bytes = encode_bytes(Encoding::FixedLength, &fixed);
    assert_eq!(bytes.len(), 1 + 16 * fixed.len());
    let mut dec = ByteArrayDecoder::new(Encoding::FixedLength, ByteReader::new(&bytes)).unwrap();
    assert_eq!(dec.decode_n(fixed.len()).unwrap(), fixed);
}

#[test]
fn test_boolean_and_double_columns_roundtrip() {
    let mut rng = StdRng::seed_from_u64(17);
    let flags: Vec<bool> = (0..1001).map(|_| rng.gen_bool(0.3)).collect();
    let mut enc = BooleanEncoder::new(Encoding::Plain).unwrap();
    for &b in &flags {
        enc.encode(b).unwrap();
    }
    let mut out = ByteWriter::new();
    enc.write_to(&mut out).unwrap();
    assert_eq!(out.len(), 126);
    let mut dec = BooleanDecoder::new(Encoding::Plain, ByteReader::new(out.as_slice())).unwrap();
    assert_eq!(dec.decode_n(flags.len()).unwrap(), flags);

    let readings: Vec<f64> = (0..500).map(|_| rng.gen_range(-50.0..50.0)).collect();
    let mut enc = DoubleEncoder::new(Encoding::Plain).unwrap();
    for &v in &readings {
        enc.encode(v).unwrap();
    }
    let mut out = ByteWriter::new();
    enc.write_to(&mut out).unwrap();
    let mut dec = DoubleDecoder::new(Encoding::Plain, ByteReader::new(out.as_slice())).unwrap();
    assert_eq!(dec.decode_n(readings.len()).unwrap(), readings);
}

#[test]
fn test_pages_through_every_compressor() {
    let mut rng = StdRng::seed_from_u64(19);
    let ts = timestamps(&mut rng, 4000);
    let names = urls(&mut rng, 4000);

    for id in ALL_COMPRESSORS {
        let mut ts_enc = Int64Encoder::new(Encoding::Delta).unwrap();
        for &v in &ts {
            ts_enc.encode(v).unwrap();
        }
        let mut name_enc = ByteArrayEncoder::new(Encoding::DeltaLength).unwrap();
        for v in &names {
            name_enc.encode(v).unwrap();
        }

        // two pages back to back, headers kept on the side
        let mut file = ByteWriter::new();
        let mut headers = Vec::new();
        let mut pc = PageCompressor::new(boxed_compressor_by_id(id).unwrap());
        assert_eq!(pc.compressor_id(), id);
        let encoders: [&mut dyn Encoder; 2] = [&mut ts_enc, &mut name_enc];
        for enc in encoders {
            pc.reset();
            pc.compress(enc).unwrap();
            headers.push((pc.compressed_len(), pc.uncompressed_len(), pc.checksum()));
            pc.write_to(&mut file).unwrap();
        }

        let pd = PageDecompressor::new(boxed_compressor_by_id(id).unwrap());
        let mut r = ByteReader::new(file.as_slice());
        let pages: Vec<_> = headers
            .iter()
            .map(|&(compressed, uncompressed, checksum)| {
                pd.decompress(&mut r, compressed, uncompressed, Some(checksum)).unwrap()
            })
            .collect();
        assert!(r.is_empty());

        let mut dec = Int64Decoder::new(Encoding::Delta, pages[0].reader()).unwrap();
        assert_eq!(dec.decode_n(ts.len()).unwrap(), ts, "compressor {}", id);
        let mut dec = ByteArrayDecoder::new(Encoding::DeltaLength, pages[1].reader()).unwrap();
        assert_eq!(dec.decode_n(names.len()).unwrap(), names, "compressor {}", id);
    }
}

#[test]
fn test_corrupted_page_rejected_before_decompression() {
    let values: Vec<i32> = (0..2000).collect();
    let bytes = encode_i32(Encoding::Plain, &values);

    for id in ALL_COMPRESSORS {
        let mut pc = PageCompressor::new(boxed_compressor_by_id(id).unwrap());
        pc.compress_bytes(&bytes).unwrap();
        let mut page = ByteWriter::new();
        pc.write_to(&mut page).unwrap();
        let mut page = page.into_inner();
        let mid = page.len() / 2;
        page[mid] ^= 0x40;

        let pd = PageDecompressor::new(boxed_compressor_by_id(id).unwrap());
        let err = pd
            .decompress(
                &mut ByteReader::new(&page),
                pc.compressed_len(),
                pc.uncompressed_len(),
                Some(pc.checksum()),
            )
            .unwrap_err();
        assert!(matches!(err, Error::ChecksumMismatch { .. }), "compressor {}", id);
    }
}

#[test]
fn test_wrong_declared_size() {
    let raw = vec![3u8; 1000];
    for id in [COMPRESSOR_NONE, COMPRESSOR_DEFLATE] {
        let compressed = compressor_by_id(id).unwrap().compress(&raw).unwrap();
        let pd = PageDecompressor::new(boxed_compressor_by_id(id).unwrap());
        let err = pd
            .decompress(&mut ByteReader::new(&compressed), compressed.len(), 999, None)
            .unwrap_err();
        assert!(
            matches!(err, Error::SizeMismatch { expected: 999, .. }),
            "compressor {}: {}",
            id,
            err
        );
    }
}

#[test]
fn test_finish_is_idempotent_across_encoders() {
    let mut rng = StdRng::seed_from_u64(23);
    let values = status_codes(&mut rng, 777);

    for encoding in [
        Encoding::Plain,
        Encoding::Varint,
        Encoding::ZigZag,
        Encoding::PackedRunLength,
        Encoding::Delta,
    ] {
        let mut enc = Int32Encoder::new(encoding).unwrap();
        for &v in &values {
            enc.encode(v).unwrap();
        }
        enc.finish().unwrap();
        let len = enc.encoded_len();
        enc.finish().unwrap();
        assert_eq!(enc.encoded_len(), len, "{}", encoding);
        assert!(matches!(enc.encode(1), Err(Error::EncodeAfterFinish)));

        // reset makes the encoder reusable with identical output
        enc.reset();
        for &v in &values {
            enc.encode(v).unwrap();
        }
        let mut out = ByteWriter::new();
        enc.write_to(&mut out).unwrap();
        assert_eq!(out.into_inner(), encode_i32(encoding, &values), "{}", encoding);
    }
}

#[test]
fn test_empty_and_single_value_columns() {
    for values in [vec![], vec![-7]] {
        for encoding in [
            Encoding::Plain,
            Encoding::Varint,
            Encoding::ZigZag,
            Encoding::PackedRunLength,
            Encoding::Delta,
        ] {
            let bytes = encode_i32(encoding, &values);
            let mut dec = Int32Decoder::new(encoding, ByteReader::new(&bytes)).unwrap();
            assert_eq!(dec.decode_n(values.len()).unwrap(), values, "{}", encoding);
        }
    }

    for values in [vec![], vec![i64::MIN]] {
        for encoding in [Encoding::Plain, Encoding::Varint, Encoding::ZigZag, Encoding::Delta] {
            let bytes = encode_i64(encoding, &values);
            let mut dec = Int64Decoder::new(encoding, ByteReader::new(&bytes)).unwrap();
            assert_eq!(dec.decode_n(values.len()).unwrap(), values, "{}", encoding);
        }
    }

    for values in [vec![], vec![b"only".to_vec()]] {
        for encoding in [
            Encoding::Plain,
            Encoding::DeltaLength,
            Encoding::Incremental,
            Encoding::FixedLength,
        ] {
            let bytes = encode_bytes(encoding, &values);
            let mut dec = ByteArrayDecoder::new(encoding, ByteReader::new(&bytes)).unwrap();
            assert_eq!(dec.decode_n(values.len()).unwrap(), values, "{}", encoding);
        }
    }

    for flags in [vec![], vec![true]] {
        let mut enc = BooleanEncoder::new(Encoding::Plain).unwrap();
        for &b in &flags {
            enc.encode(b).unwrap();
        }
        let mut out = ByteWriter::new();
        enc.write_to(&mut out).unwrap();
        assert_eq!(out.len(), flags.len());
        let mut dec = BooleanDecoder::new(Encoding::Plain, ByteReader::new(out.as_slice())).unwrap();
        assert_eq!(dec.decode_n(flags.len()).unwrap(), flags);
    }
}

#[test]
fn test_byte_array_finish_is_idempotent() {
    let mut rng = StdRng::seed_from_u64(29);
    let values = urls(&mut rng, 300);

    for encoding in [
        Encoding::Plain,
        Encoding::DeltaLength,
        Encoding::Incremental,
        Encoding::FixedLength,
    ] {
        let values: Vec<Vec<u8>> = if encoding == Encoding::FixedLength {
            values.iter().map(|v| v[..8].to_vec()).collect()
        } else {
            values.clone()
        };
        let mut enc = ByteArrayEncoder::new(encoding).unwrap();
        for v in &values {
            enc.encode(v).unwrap();
        }
        enc.finish().unwrap();
        let len = enc.encoded_len();
        enc.finish().unwrap();
        assert_eq!(enc.encoded_len(), len, "{}", encoding);

        let mut a = ByteWriter::new();
        enc.write_to(&mut a).unwrap();
        let mut b = ByteWriter::new();
        enc.write_to(&mut b).unwrap();
        assert_eq!(a.as_slice(), b.as_slice(), "{}", encoding);
        assert_eq!(a.len(), len, "{}", encoding);
        assert!(matches!(enc.encode(b"late"), Err(Error::EncodeAfterFinish)));
    }
}
