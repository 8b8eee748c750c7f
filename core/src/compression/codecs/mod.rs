//! compression/codecs/mod.rs
//! One adapter per codec family, all behind the `Decompressor` contract.
//!
//! Built-in families decode through linked crates; `oodle`, `lzo`, `lzx`
//! and `density` call into libraries found by `native::resolve`.

use std::io::{ErrorKind, Read};

use crate::compression::types::{CodecKind, CompressionError};

pub mod brotli;
pub mod copy;
pub mod density;
pub mod flate;
pub mod lz4;
pub mod lzma;
pub mod lzo;
pub mod lzx;
pub mod oodle;
pub mod zstd;

pub use self::brotli::*;
pub use copy::*;
pub use density::*;
pub use flate::*;
pub use lz4::*;
pub use lzma::*;
pub use lzo::*;
pub use lzx::*;
pub use oodle::*;
pub use self::zstd::*;

/// Fill `output` from a decoding reader, then make sure the stream is done.
///
/// - Stream ends before `output` is full: `Truncated`.
/// - Stream still has data once `output` is full: `Corrupt`.
pub(crate) fn drain_exact<R: Read>(
    codec: CodecKind,
    mut reader: R,
    output: &mut [u8],
) -> Result<usize, CompressionError> {
    let expected = output.len();
    let mut filled = 0;
    while filled < expected {
        match reader.read(&mut output[filled..]) {
            Ok(0) => return Err(CompressionError::Truncated { codec, expected, actual: filled }),
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                return Err(CompressionError::Truncated { codec, expected, actual: filled });
            }
            Err(e) => return Err(CompressionError::corrupt(codec, e.to_string())),
        }
    }

    let mut extra = [0u8; 1];
    loop {
        return match reader.read(&mut extra) {
            Ok(0) => Ok(filled),
            Ok(_) => Err(CompressionError::corrupt(
                codec,
                format!("decoded stream exceeds output capacity of {expected} bytes"),
            )),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => Err(CompressionError::corrupt(codec, e.to_string())),
        };
    }
}

/// Zeroed scratch memory for one native call; freed when dropped.
pub(crate) fn rent_scratch(codec: CodecKind, len: usize) -> Result<Vec<u8>, CompressionError> {
    let mut scratch = Vec::new();
    scratch
        .try_reserve_exact(len)
        .map_err(|_| CompressionError::resource(codec, format!("{len}-byte scratch buffer")))?;
    scratch.resize(len, 0);
    Ok(scratch)
}
