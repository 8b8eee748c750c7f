//! codecs/lzo.rs
//! LZO1X and LZO2A safe decoders from the runtime-loaded lzo2 library.
//!
//! The native call reports a status and rewrites the output length in place.
//! Only the status decides success; a shorter reported length is returned
//! to the dispatcher as-is.
use std::ffi::{c_int, c_long, c_short, c_void};
use std::mem::size_of;
use std::ptr;

use libloading::Library;
use once_cell::sync::OnceCell;

use crate::compression::constants::library_names;
use crate::compression::native;
use crate::compression::types::{CodecKind, CompressionError, Decompressor};

const LZO_E_OK: c_int = 0;
const LZO_E_OUT_OF_MEMORY: c_int = -2;
const LZO_E_INPUT_OVERRUN: c_int = -4;
const LZO_E_OUTPUT_OVERRUN: c_int = -5;

type InitFn = unsafe extern "C" fn(
    u32, c_int, c_int, c_int, c_int, c_int, c_int, c_int, c_int, c_int,
) -> c_int;
type VersionFn = unsafe extern "C" fn() -> u32;
type DecompressSafeFn = unsafe extern "C" fn(*const u8, usize, *mut u8, *mut usize, *mut c_void) -> c_int;

struct LzoLibrary {
    lzo1x_decompress_safe: DecompressSafeFn,
    lzo2a_decompress_safe: DecompressSafeFn,
    /// Result of `__lzo_init_v2`; anything but `LZO_E_OK` disables decoding.
    init_status: c_int,
    _library: Library,
}

static LIBRARY: OnceCell<Option<LzoLibrary>> = OnceCell::new();

impl LzoLibrary {
    fn load() -> Result<Self, CompressionError> {
        let library = native::resolve(library_names::LZO)?;

        // SAFETY: symbol types match the lzo 2.x exports; the init call only
        // compares the type sizes it is handed.
        unsafe {
            let init: InitFn = native::symbol(&library, b"__lzo_init_v2\0")?;
            let version: VersionFn = native::symbol(&library, b"lzo_version\0")?;

            let pointer = size_of::<*const u8>() as c_int;
            let callback = (size_of::<*const u8>() * 4 + size_of::<usize>() * 2) as c_int;
            let init_status = init(
                version(),
                size_of::<c_short>() as c_int,
                size_of::<c_int>() as c_int,
                size_of::<c_long>() as c_int,
                size_of::<u32>() as c_int,
                size_of::<usize>() as c_int,
                pointer,
                pointer,
                pointer,
                callback,
            );
            if init_status != LZO_E_OK {
                log::warn!("lzo: library initialization failed with status {init_status}");
            }

            Ok(LzoLibrary {
                lzo1x_decompress_safe: native::symbol(&library, b"lzo1x_decompress_safe\0")?,
                lzo2a_decompress_safe: native::symbol(&library, b"lzo2a_decompress_safe\0")?,
                init_status,
                _library: library,
            })
        }
    }
}

fn library(kind: CodecKind) -> Result<&'static LzoLibrary, CompressionError> {
    LIBRARY
        .get_or_init(|| match LzoLibrary::load() {
            Ok(library) => Some(library),
            Err(e) => {
                log::debug!("lzo: {e}");
                None
            }
        })
        .as_ref()
        .ok_or_else(|| CompressionError::unavailable(kind))
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LzoVariant {
    /// `lzo1x_decompress_safe`
    Lzo1x,
    /// `lzo2a_decompress_safe`
    Lzo2a,
}

pub struct LzoCodec {
    variant: LzoVariant,
}

impl LzoCodec {
    pub const fn new(variant: LzoVariant) -> Self {
        Self { variant }
    }
}

impl Decompressor for LzoCodec {
    fn kind(&self) -> CodecKind {
        match self.variant {
            LzoVariant::Lzo1x => CodecKind::Lzo1,
            LzoVariant::Lzo2a => CodecKind::Lzo2,
        }
    }

    fn decompress(&self, input: &[u8], output: &mut [u8]) -> Result<usize, CompressionError> {
        let kind = self.kind();
        let lib = library(kind)?;
        if lib.init_status != LZO_E_OK {
            return Err(CompressionError::resource(kind, "initialized lzo library"));
        }

        let decompress_safe = match self.variant {
            LzoVariant::Lzo1x => lib.lzo1x_decompress_safe,
            LzoVariant::Lzo2a => lib.lzo2a_decompress_safe,
        };

        let mut len = output.len();
        // SAFETY: the safe decoders bound every write by `len`, which starts
        // at the output capacity; no work memory is needed for decoding.
        let status = unsafe {
            decompress_safe(input.as_ptr(), input.len(), output.as_mut_ptr(), &mut len, ptr::null_mut())
        };

        decode_status(kind, status, output.len(), len)
    }
}

/// Classify a safe-decoder status; `reported` is the length written back.
fn decode_status(kind: CodecKind, status: c_int, capacity: usize, reported: usize) -> Result<usize, CompressionError> {
    match status {
        LZO_E_OK => Ok(reported),
        LZO_E_OUT_OF_MEMORY => Err(CompressionError::resource(kind, "lzo work memory")),
        LZO_E_INPUT_OVERRUN => Err(CompressionError::Truncated {
            codec: kind,
            expected: capacity,
            actual: reported,
        }),
        LZO_E_OUTPUT_OVERRUN => Err(CompressionError::corrupt(
            kind,
            format!("decoded stream exceeds output capacity of {capacity} bytes"),
        )),
        other => Err(CompressionError::corrupt(kind, format!("lzo status {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_returns_reported_length() {
        assert_eq!(decode_status(CodecKind::Lzo1, LZO_E_OK, 64, 60).unwrap(), 60);
    }

    #[test]
    fn failure_statuses() {
        assert!(matches!(
            decode_status(CodecKind::Lzo1, LZO_E_OUT_OF_MEMORY, 64, 0),
            Err(CompressionError::ResourceError { .. })
        ));
        assert!(matches!(
            decode_status(CodecKind::Lzo2, LZO_E_INPUT_OVERRUN, 64, 12),
            Err(CompressionError::Truncated { codec: CodecKind::Lzo2, expected: 64, actual: 12 })
        ));
        assert!(matches!(
            decode_status(CodecKind::Lzo1, LZO_E_OUTPUT_OVERRUN, 64, 64),
            Err(CompressionError::Corrupt { .. })
        ));
        // LZO_E_ERROR, LZO_E_LOOKBEHIND_OVERRUN
        for status in [-1, -6] {
            assert!(matches!(
                decode_status(CodecKind::Lzo1, status, 64, 0),
                Err(CompressionError::Corrupt { .. })
            ));
        }
    }
}
