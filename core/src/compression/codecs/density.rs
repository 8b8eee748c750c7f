//! codecs/density.rs
//! Density decoding through the runtime-loaded library.
use std::ffi::c_int;

use libloading::Library;
use once_cell::sync::OnceCell;

use crate::compression::constants::library_names;
use crate::compression::native;
use crate::compression::types::{CodecKind, CompressionError, Decompressor};
use crate::utils::native_len;

const KIND: CodecKind = CodecKind::Density;

type DecompressFn = unsafe extern "C" fn(*const u8, c_int, *mut u8, c_int) -> c_int;

struct DensityLibrary {
    decompress: DecompressFn,
    _library: Library,
}

static LIBRARY: OnceCell<Option<DensityLibrary>> = OnceCell::new();

fn library() -> Result<&'static DensityLibrary, CompressionError> {
    LIBRARY
        .get_or_init(|| {
            let loaded = native::resolve(library_names::DENSITY).and_then(|library| {
                // SAFETY: matches the exported `density_decompress`.
                let decompress = unsafe { native::symbol(&library, b"density_decompress\0")? };
                Ok(DensityLibrary { decompress, _library: library })
            });
            loaded.map_err(|e| log::debug!("density: {e}")).ok()
        })
        .as_ref()
        .ok_or_else(|| CompressionError::unavailable(KIND))
}

pub struct DensityCodec;

impl Decompressor for DensityCodec {
    fn kind(&self) -> CodecKind {
        KIND
    }

    fn decompress(&self, input: &[u8], output: &mut [u8]) -> Result<usize, CompressionError> {
        let lib = library()?;
        let (Some(in_len), Some(out_len)) = (native_len(input.len()), native_len(output.len())) else {
            return Err(CompressionError::resource(KIND, "buffers within native length range"));
        };

        // SAFETY: both regions are live slices of the stated lengths.
        let status = unsafe { (lib.decompress)(input.as_ptr(), in_len, output.as_mut_ptr(), out_len) };
        decode_status(status, output.len())
    }
}

/// Density only distinguishes success (`0`) from failure.
fn decode_status(status: c_int, capacity: usize) -> Result<usize, CompressionError> {
    match status {
        0 => Ok(capacity),
        other => Err(CompressionError::corrupt(KIND, format!("density_decompress status {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_fills_output() {
        assert_eq!(decode_status(0, 128).unwrap(), 128);
    }

    #[test]
    fn any_other_status_is_corrupt() {
        for status in [-1, 1, 7] {
            assert!(matches!(decode_status(status, 128), Err(CompressionError::Corrupt { codec: KIND, .. })));
        }
    }
}
