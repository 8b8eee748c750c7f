//! compression/codecs/zstd.rs
//! Zstd block compression and decompression with long-lived contexts.
//!
//! `ZstdCodec` keeps one compression and one decompression context for its
//! whole life and frees both on drop. Dictionaries are either copied into the
//! contexts (`load_dictionary`) or referenced from a prepared
//! `ZstdDictionary` that the borrow checker keeps alive for as long as the
//! codec may use it.
//!
//! Zstd frames may omit their content size, so callers sizing an output
//! buffer ask `decompress_bound` first.
use std::io;

use serde::{Deserialize, Serialize};
use ::zstd::bulk;
use ::zstd::dict::{DecoderDictionary, EncoderDictionary};

pub use zstd_safe::{CParameter, DParameter};

use crate::compression::constants::DEFAULT_LEVEL_ZSTD;
use crate::compression::types::{CodecKind, CompressionError, Compressor, Decompressor};

const KIND: CodecKind = CodecKind::Zstd;

/// Name zstd reports when the destination cannot hold the result.
const DST_TOO_SMALL: &str = "Destination buffer is too small";
const ALLOCATION: &str = "Allocation error : not enough memory";

/// Compression settings applied to a fresh `ZstdCodec`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZstdOptions {
    pub level: i32,
    /// Base-2 log of the match window; `None` lets the level decide.
    pub window_log: Option<u32>,
    pub checksum: bool,
    pub content_size: bool,
}

impl ZstdOptions {
    pub fn for_level(level: i32) -> Self {
        Self { level, ..Self::default() }
    }
}

impl Default for ZstdOptions {
    fn default() -> Self {
        Self {
            level: DEFAULT_LEVEL_ZSTD,
            window_log: None,
            checksum: false,
            content_size: true,
        }
    }
}

/// A dictionary digested once for both directions.
///
/// `copy` owns its bytes; `borrowed` keeps pointing at the caller's buffer,
/// which therefore outlives the dictionary and every codec referencing it.
pub struct ZstdDictionary<'a> {
    encoder: EncoderDictionary<'a>,
    decoder: DecoderDictionary<'a>,
}

impl ZstdDictionary<'static> {
    pub fn copy(bytes: &[u8], level: i32) -> Self {
        Self {
            encoder: EncoderDictionary::copy(bytes, level),
            decoder: DecoderDictionary::copy(bytes),
        }
    }
}

impl<'a> ZstdDictionary<'a> {
    pub fn borrowed(bytes: &'a [u8], level: i32) -> Self {
        Self {
            encoder: EncoderDictionary::new(bytes, level),
            decoder: DecoderDictionary::new(bytes),
        }
    }
}

/// Paired compression/decompression contexts.
pub struct ZstdCodec<'d> {
    compressor: bulk::Compressor<'d>,
    decompressor: bulk::Decompressor<'d>,
    options: ZstdOptions,
}

impl ZstdCodec<'static> {
    /// Contexts at `ZstdOptions::default()`.
    ///
    /// # Errors
    /// - `CompressionError::ResourceError` if zstd cannot allocate a context.
    pub fn new() -> Result<Self, CompressionError> {
        Self::with_options(ZstdOptions::default())
    }

    /// # Errors
    /// - `CompressionError::ResourceError` if zstd cannot allocate a context.
    /// - `CompressionError::DecodeError` if zstd rejects one of the options.
    pub fn with_options(options: ZstdOptions) -> Result<Self, CompressionError> {
        let compressor = bulk::Compressor::new(options.level).map_err(|e| context_error(e, "compression context"))?;
        let decompressor = bulk::Decompressor::new().map_err(|e| context_error(e, "decompression context"))?;

        let mut codec = ZstdCodec { compressor, decompressor, options };
        codec.apply_options()?;
        log::trace!("zstd: contexts ready at level {}", options.level);
        Ok(codec)
    }
}

impl<'d> ZstdCodec<'d> {
    pub fn options(&self) -> &ZstdOptions {
        &self.options
    }

    fn apply_options(&mut self) -> Result<(), CompressionError> {
        let options = self.options;
        self.set_compression_parameter(CParameter::CompressionLevel(options.level))?;
        if let Some(window_log) = options.window_log {
            self.set_compression_parameter(CParameter::WindowLog(window_log))?;
            self.set_decompression_parameter(DParameter::WindowLogMax(window_log))?;
        }
        self.set_compression_parameter(CParameter::ChecksumFlag(options.checksum))?;
        self.set_compression_parameter(CParameter::ContentSizeFlag(options.content_size))
    }

    /// A `CompressionLevel` change is recorded in `options()`, so a later
    /// `load_dictionary` keeps it.
    pub fn set_compression_parameter(&mut self, parameter: CParameter) -> Result<(), CompressionError> {
        let level = match parameter {
            CParameter::CompressionLevel(level) => Some(level),
            _ => None,
        };
        self.compressor.set_parameter(parameter).map_err(|e| CompressionError::decode(KIND, e))?;
        if let Some(level) = level {
            self.options.level = level;
        }
        Ok(())
    }

    pub fn set_decompression_parameter(&mut self, parameter: DParameter) -> Result<(), CompressionError> {
        self.decompressor.set_parameter(parameter).map_err(|e| CompressionError::decode(KIND, e))
    }

    /// Copy `dictionary` into both contexts, replacing any previous one.
    /// An empty slice removes the dictionary. The compression side is
    /// re-initialized at `options().level`.
    pub fn load_dictionary(&mut self, dictionary: &[u8]) -> Result<(), CompressionError> {
        self.compressor
            .set_dictionary(self.options.level, dictionary)
            .map_err(|e| CompressionError::decode(KIND, e))?;
        self.decompressor
            .set_dictionary(dictionary)
            .map_err(|e| CompressionError::decode(KIND, e))
    }

    /// Reference a prepared dictionary without copying it.
    pub fn ref_dictionary<'b: 'd>(&mut self, dictionary: &'d ZstdDictionary<'b>) -> Result<(), CompressionError> {
        self.compressor
            .set_prepared_dictionary(&dictionary.encoder)
            .map_err(|e| CompressionError::decode(KIND, e))?;
        self.decompressor
            .set_prepared_dictionary(&dictionary.decoder)
            .map_err(|e| CompressionError::decode(KIND, e))
    }

    /// Drop the dictionary from both contexts; the native side no longer
    /// touches referenced dictionary memory once this returns.
    pub fn unload_dictionary(&mut self) -> Result<(), CompressionError> {
        self.load_dictionary(&[])
    }

    /// Compress `input` as one frame into `output`.
    ///
    /// # Errors
    /// - `CompressionError::ResourceError` when `output` is smaller than the frame.
    pub fn compress(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize, CompressionError> {
        let capacity = output.len();
        self.compressor.compress_to_buffer(input, output).map_err(|e| {
            if e.to_string() == DST_TOO_SMALL {
                CompressionError::resource(KIND, format!("{capacity}-byte output for compressed frame"))
            } else {
                context_error(e, "compression")
            }
        })
    }

    /// Decompress one or more frames into `output`; returns bytes written.
    pub fn decompress(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize, CompressionError> {
        let capacity = output.len();
        self.decompressor
            .decompress_to_buffer(input, output)
            .map_err(|e| decompress_error(e, capacity))
    }
}

impl<'d> Compressor for ZstdCodec<'d> {
    fn compress_bound(&self, input_len: usize) -> Result<usize, CompressionError> {
        Ok(compress_bound(input_len))
    }

    fn compress(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize, CompressionError> {
        ZstdCodec::compress(self, input, output)
    }
}

/// Stateless dispatcher adapter; one decompression context per call.
pub struct ZstdDecoder;

impl Decompressor for ZstdDecoder {
    fn kind(&self) -> CodecKind {
        KIND
    }

    fn decompress(&self, input: &[u8], output: &mut [u8]) -> Result<usize, CompressionError> {
        let capacity = output.len();
        let mut decompressor = bulk::Decompressor::new().map_err(|e| context_error(e, "decompression context"))?;
        decompressor
            .decompress_to_buffer(input, output)
            .map_err(|e| decompress_error(e, capacity))
    }
}

/// Worst-case compressed size for `len` input bytes.
pub fn compress_bound(len: usize) -> usize {
    zstd_safe::compress_bound(len)
}

/// Upper bound of the decoded size of `input`, from the frame headers.
///
/// # Errors
/// - `CompressionError::Corrupt` if `input` is not a sequence of zstd frames.
pub fn decompress_bound(input: &[u8]) -> Result<usize, CompressionError> {
    let bound = zstd_safe::decompress_bound(input)
        .map_err(|code| CompressionError::corrupt(KIND, zstd_safe::get_error_name(code)))?;
    usize::try_from(bound).map_err(|_| CompressionError::resource(KIND, format!("{bound}-byte output buffer")))
}

fn context_error(e: io::Error, what: &str) -> CompressionError {
    if e.to_string() == ALLOCATION {
        CompressionError::resource(KIND, what)
    } else {
        CompressionError::decode(KIND, e)
    }
}

fn decompress_error(e: io::Error, capacity: usize) -> CompressionError {
    match e.to_string().as_str() {
        DST_TOO_SMALL => CompressionError::corrupt(
            KIND,
            format!("decoded stream exceeds output capacity of {capacity} bytes"),
        ),
        ALLOCATION => CompressionError::resource(KIND, "decompression workspace"),
        msg => CompressionError::corrupt(KIND, msg),
    }
}
