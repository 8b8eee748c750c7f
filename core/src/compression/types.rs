//! compression/types.rs
//! Codec tags, the shared adapter contract and the failure taxonomy.
use std::fmt;

use num_enum::TryFromPrimitive;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::compression::constants::{codec_ids, library_names};
use crate::utils::enum_name_or_hex;

/// Every format the dispatcher knows how to route.
///
/// Used only as a dispatch key; the numeric values are the stable tags
/// found in archive tables (see [`codec_ids`]).
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, TryFromPrimitive, Serialize, Deserialize)]
pub enum CodecKind {
    None     = codec_ids::NONE,
    Oodle    = codec_ids::OODLE,
    Brotli   = codec_ids::BROTLI,
    Zlib     = codec_ids::ZLIB,
    Deflate  = codec_ids::DEFLATE,
    Gzip     = codec_ids::GZIP,
    Lz4      = codec_ids::LZ4,
    Lz4Hc    = codec_ids::LZ4HC,
    Lzo1     = codec_ids::LZO1,
    Lzo2     = codec_ids::LZO2,
    Lzx      = codec_ids::LZX,
    Lzma     = codec_ids::LZMA,
    SafeLzma = codec_ids::SAFE_LZMA,
    RawLzma  = codec_ids::RAW_LZMA,
    Zstd     = codec_ids::ZSTD,
    Density  = codec_ids::DENSITY,
}

impl CodecKind {
    pub const ALL: [CodecKind; 16] = [
        CodecKind::None,
        CodecKind::Oodle,
        CodecKind::Brotli,
        CodecKind::Zlib,
        CodecKind::Deflate,
        CodecKind::Gzip,
        CodecKind::Lz4,
        CodecKind::Lz4Hc,
        CodecKind::Lzo1,
        CodecKind::Lzo2,
        CodecKind::Lzx,
        CodecKind::Lzma,
        CodecKind::SafeLzma,
        CodecKind::RawLzma,
        CodecKind::Zstd,
        CodecKind::Density,
    ];

    /// Map a raw tag onto a kind.
    ///
    /// # Errors
    /// - `CompressionError::Unsupported` for tags outside the table.
    pub fn from_raw(raw: u8) -> Result<Self, CompressionError> {
        CodecKind::try_from_primitive(raw).map_err(|_| CompressionError::Unsupported {
            codec: enum_name_or_hex::<CodecKind>(raw),
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            CodecKind::None     => "none",
            CodecKind::Oodle    => "oodle",
            CodecKind::Brotli   => "brotli",
            CodecKind::Zlib     => "zlib",
            CodecKind::Deflate  => "deflate",
            CodecKind::Gzip     => "gzip",
            CodecKind::Lz4      => "lz4",
            CodecKind::Lz4Hc    => "lz4hc",
            CodecKind::Lzo1     => "lzo1",
            CodecKind::Lzo2     => "lzo2",
            CodecKind::Lzx      => "lzx",
            CodecKind::Lzma     => "lzma",
            CodecKind::SafeLzma => "safe-lzma",
            CodecKind::RawLzma  => "raw-lzma",
            CodecKind::Zstd     => "zstd",
            CodecKind::Density  => "density",
        }
    }

    /// Native library this kind is loaded from at runtime, if any.
    /// Kinds returning `None` are linked into the binary.
    pub fn native_library(self) -> Option<&'static str> {
        match self {
            CodecKind::Oodle                   => Some(library_names::OODLE),
            CodecKind::Lzo1 | CodecKind::Lzo2  => Some(library_names::LZO),
            CodecKind::Lzx                     => Some(library_names::LZX),
            CodecKind::Density                 => Some(library_names::DENSITY),
            _ => None,
        }
    }
}

impl fmt::Display for CodecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Failure taxonomy shared by every adapter and the dispatcher.
///
/// On any error the output buffer contents are unspecified and must be
/// discarded by the caller.
#[derive(Debug, Error)]
pub enum CompressionError {
    /// Tag not recognized, or the codec's native library is unavailable.
    #[error("unsupported compression codec: {codec}")]
    Unsupported { codec: String },

    /// The decoder rejected the input as malformed.
    #[error("codec {codec} rejected corrupt input: {msg}")]
    Corrupt { codec: CodecKind, msg: String },

    /// Fewer bytes were produced than the output capacity demanded.
    #[error("codec {codec} produced {actual} of {expected} bytes")]
    Truncated { codec: CodecKind, expected: usize, actual: usize },

    /// Pass-through copy with input and output of different lengths.
    #[error("size mismatch: input is {input} bytes, output is {output} bytes")]
    SizeMismatch { input: usize, output: usize },

    /// Generic decoder failure without a finer classification.
    #[error("codec {codec} decode failed: {msg}")]
    DecodeError {
        codec: CodecKind,
        msg: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Scratch memory or a native engine could not be obtained.
    #[error("codec {codec} could not obtain {resource}")]
    ResourceError { codec: CodecKind, resource: String },

    /// Library resolution only; reported to callers through `is_supported`.
    #[error("native library {library} not found")]
    NotFound { library: String },
}

impl CompressionError {
    pub(crate) fn corrupt(codec: CodecKind, msg: impl Into<String>) -> Self {
        CompressionError::Corrupt { codec, msg: msg.into() }
    }

    pub(crate) fn resource(codec: CodecKind, resource: impl Into<String>) -> Self {
        CompressionError::ResourceError { codec, resource: resource.into() }
    }

    pub(crate) fn decode<E>(codec: CodecKind, err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        CompressionError::DecodeError {
            codec,
            msg: err.to_string(),
            source: Some(Box::new(err)),
        }
    }

    pub(crate) fn unavailable(codec: CodecKind) -> Self {
        CompressionError::Unsupported { codec: format!("{codec} (native library unavailable)") }
    }
}

/// Shared adapter contract: decode `input` into the caller's fixed-capacity
/// `output` and report how many bytes were written.
///
/// Implementors hold no mutable state, so one instance may serve many
/// threads as long as each call brings its own buffers.
pub trait Decompressor: Send + Sync {
    fn kind(&self) -> CodecKind;

    fn decompress(&self, input: &[u8], output: &mut [u8]) -> Result<usize, CompressionError>;
}

/// Encoder side, offered by the codecs that can also compress.
pub trait Compressor {
    /// Upper bound on the compressed size of `input_len` bytes.
    fn compress_bound(&self, input_len: usize) -> Result<usize, CompressionError>;

    /// Compress `input` into `output`, returning the compressed length.
    fn compress(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize, CompressionError>;
}
