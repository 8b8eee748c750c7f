//! codecs/lz4.rs
//! LZ4 block decoding. LZ4HC emits the same block format, so both kinds
//! share this adapter.
use lz4_flex::block::decompress_into;

use crate::compression::types::{CodecKind, CompressionError, Decompressor};

pub struct Lz4Codec {
    kind: CodecKind,
}

impl Lz4Codec {
    pub const fn new(kind: CodecKind) -> Self {
        Self { kind }
    }
}

impl Decompressor for Lz4Codec {
    fn kind(&self) -> CodecKind {
        self.kind
    }

    fn decompress(&self, input: &[u8], output: &mut [u8]) -> Result<usize, CompressionError> {
        decompress_into(input, output)
            .map_err(|e| CompressionError::corrupt(self.kind, e.to_string()))
    }
}
