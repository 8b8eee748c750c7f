//! codecs/flate.rs
//! Zlib, raw deflate and prefixed gzip through flate2 read decoders.

use flate2::read::{DeflateDecoder, GzDecoder, ZlibDecoder};

use crate::compression::codecs::drain_exact;
use crate::compression::constants::GZIP_PREFIX_LEN;
use crate::compression::types::{CodecKind, CompressionError, Decompressor};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FlateFormat {
    /// RFC 1950 stream; the decoder consumes the 2-byte header itself.
    Zlib,
    /// RFC 1951 stream without any wrapper.
    Deflate,
    /// 2-byte container prefix followed by an RFC 1952 member.
    Gzip,
}

pub struct FlateCodec {
    format: FlateFormat,
}

impl FlateCodec {
    pub const fn new(format: FlateFormat) -> Self {
        Self { format }
    }
}

impl Decompressor for FlateCodec {
    fn kind(&self) -> CodecKind {
        match self.format {
            FlateFormat::Zlib => CodecKind::Zlib,
            FlateFormat::Deflate => CodecKind::Deflate,
            FlateFormat::Gzip => CodecKind::Gzip,
        }
    }

    fn decompress(&self, input: &[u8], output: &mut [u8]) -> Result<usize, CompressionError> {
        let kind = self.kind();
        match self.format {
            FlateFormat::Zlib => drain_exact(kind, ZlibDecoder::new(input), output),
            FlateFormat::Deflate => drain_exact(kind, DeflateDecoder::new(input), output),
            FlateFormat::Gzip => {
                let member = input.get(GZIP_PREFIX_LEN..).ok_or_else(|| {
                    CompressionError::corrupt(kind, "input shorter than container prefix")
                })?;
                drain_exact(kind, GzDecoder::new(member), output)
            }
        }
    }
}
