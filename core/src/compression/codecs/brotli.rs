//! codecs/brotli.rs
//! Brotli streams through the brotli crate's reader.

use ::brotli::Decompressor as BrotliReader;

use crate::compression::codecs::drain_exact;
use crate::compression::constants::BROTLI_BUFFER_SIZE;
use crate::compression::types::{CodecKind, CompressionError, Decompressor};

pub struct BrotliCodec;

impl Decompressor for BrotliCodec {
    fn kind(&self) -> CodecKind {
        CodecKind::Brotli
    }

    fn decompress(&self, input: &[u8], output: &mut [u8]) -> Result<usize, CompressionError> {
        drain_exact(CodecKind::Brotli, BrotliReader::new(input, BROTLI_BUFFER_SIZE), output)
    }
}
