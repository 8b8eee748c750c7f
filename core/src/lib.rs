//! compression-core
//!
//! One decompression entry point for the codecs found in game and archive
//! formats. Built-in codecs are linked in; Oodle, LZO, LZX and Density are
//! loaded at runtime when their libraries are present.

// Shared and top level
pub mod utils;

pub mod compression;

// -----------------------------------------------------------------------------
// Prelude (Rust users)
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::compression::codecs::{
        OodleCompressor, OodleEncoder, OodleLevel, ZstdCodec, ZstdDictionary, ZstdOptions,
    };
    pub use crate::compression::types::{CodecKind, CompressionError, Compressor, Decompressor};
    pub use crate::compression::{decompress, decompress_into, decompress_tag, is_supported, output_bound};
}
