//! compression/dispatch.rs
//! Single entry point routing a `CodecKind` to its adapter.
//!
//! Adapters are stateless statics; the dispatcher never allocates output.
//! Callers size `output` themselves or through `output_bound`.
use crate::compression::codecs::{
    oodle, zstd, BrotliCodec, CopyCodec, DensityCodec, FlateCodec, FlateFormat, Lz4Codec, LzmaCodec, LzmaVariant,
    LzoCodec, LzoVariant, LzxCodec, OodleCodec, ZstdDecoder,
};
use crate::compression::constants::DEFAULT_LZX_WINDOW_BITS;
use crate::compression::registry::is_supported;
use crate::compression::types::{CodecKind, CompressionError, Decompressor};

static COPY: CopyCodec = CopyCodec;
static OODLE: OodleCodec = OodleCodec;
static BROTLI: BrotliCodec = BrotliCodec;
static ZLIB: FlateCodec = FlateCodec::new(FlateFormat::Zlib);
static DEFLATE: FlateCodec = FlateCodec::new(FlateFormat::Deflate);
static GZIP: FlateCodec = FlateCodec::new(FlateFormat::Gzip);
static LZ4: Lz4Codec = Lz4Codec::new(CodecKind::Lz4);
static LZ4HC: Lz4Codec = Lz4Codec::new(CodecKind::Lz4Hc);
static LZO1: LzoCodec = LzoCodec::new(LzoVariant::Lzo1x);
static LZO2: LzoCodec = LzoCodec::new(LzoVariant::Lzo2a);
static LZX: LzxCodec = LzxCodec::with_window(DEFAULT_LZX_WINDOW_BITS);
static LZMA: LzmaCodec = LzmaCodec::new(LzmaVariant::Lzma);
static SAFE_LZMA: LzmaCodec = LzmaCodec::new(LzmaVariant::Safe);
static RAW_LZMA: LzmaCodec = LzmaCodec::new(LzmaVariant::Raw);
static ZSTD: ZstdDecoder = ZstdDecoder;
static DENSITY: DensityCodec = DensityCodec;

/// The shared adapter instance serving `kind`.
pub fn adapter(kind: CodecKind) -> &'static dyn Decompressor {
    match kind {
        CodecKind::None     => &COPY,
        CodecKind::Oodle    => &OODLE,
        CodecKind::Brotli   => &BROTLI,
        CodecKind::Zlib     => &ZLIB,
        CodecKind::Deflate  => &DEFLATE,
        CodecKind::Gzip     => &GZIP,
        CodecKind::Lz4      => &LZ4,
        CodecKind::Lz4Hc    => &LZ4HC,
        CodecKind::Lzo1     => &LZO1,
        CodecKind::Lzo2     => &LZO2,
        CodecKind::Lzx      => &LZX,
        CodecKind::Lzma     => &LZMA,
        CodecKind::SafeLzma => &SAFE_LZMA,
        CodecKind::RawLzma  => &RAW_LZMA,
        CodecKind::Zstd     => &ZSTD,
        CodecKind::Density  => &DENSITY,
    }
}

/// Decode `input` into `output` and return what the adapter reports as
/// written, without demanding that `output` be full.
///
/// # Errors
/// - `CompressionError::Unsupported` when the codec's native library is unavailable.
/// - Any adapter failure, unchanged.
pub fn decompress_into(kind: CodecKind, input: &[u8], output: &mut [u8]) -> Result<usize, CompressionError> {
    if !is_supported(kind) {
        return Err(CompressionError::unavailable(kind));
    }
    log::trace!("decompress {kind}: {} -> {} bytes", input.len(), output.len());
    adapter(kind).decompress(input, output)
}

/// Decode `input` so that it fills `output` exactly.
///
/// # Errors
/// - `CompressionError::Truncated` when the adapter wrote fewer bytes than `output` holds.
/// - Everything `decompress_into` reports.
pub fn decompress(kind: CodecKind, input: &[u8], output: &mut [u8]) -> Result<(), CompressionError> {
    let expected = output.len();
    let written = decompress_into(kind, input, output)?;
    if written != expected {
        return Err(CompressionError::Truncated { codec: kind, expected, actual: written });
    }
    Ok(())
}

/// `decompress` for callers holding the raw tag from an archive table.
///
/// # Errors
/// - `CompressionError::Unsupported` for unknown tags; `output` is left untouched.
pub fn decompress_tag(raw: u8, input: &[u8], output: &mut [u8]) -> Result<(), CompressionError> {
    decompress(CodecKind::from_raw(raw)?, input, output)
}

/// Output capacity to allocate before decoding `input`, for the codecs whose
/// streams describe it. `None` means the size travels out of band.
pub fn output_bound(kind: CodecKind, input: &[u8]) -> Result<Option<usize>, CompressionError> {
    match kind {
        CodecKind::Zstd => zstd::decompress_bound(input).map(Some),
        CodecKind::Oodle => oodle::get_decode_buffer_size(input, true).map(Some),
        _ => Ok(None),
    }
}
