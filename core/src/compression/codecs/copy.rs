//! codecs/copy.rs
//! Pass-through codec for stored entries.

use crate::compression::types::{CodecKind, CompressionError, Decompressor};

pub struct CopyCodec;

impl Decompressor for CopyCodec {
    fn kind(&self) -> CodecKind {
        CodecKind::None
    }

    /// Byte-exact copy; lengths must match, nothing is padded or cut.
    fn decompress(&self, input: &[u8], output: &mut [u8]) -> Result<usize, CompressionError> {
        if input.len() != output.len() {
            return Err(CompressionError::SizeMismatch { input: input.len(), output: output.len() });
        }
        output.copy_from_slice(input);
        Ok(output.len())
    }
}
