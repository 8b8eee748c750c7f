//! codecs/lzx.rs
//! LZX blocks through libchm's decoder.
//!
//! Each call instantiates a decoder for the requested window, decodes once
//! and tears the decoder down again. `LzxEngine` owns the native state so
//! teardown runs on every exit path, unwinding included.
use std::ffi::{c_int, c_void};
use std::ptr::NonNull;

use libloading::Library;
use once_cell::sync::OnceCell;

use crate::compression::constants::{library_names, DEFAULT_LZX_WINDOW_BITS};
use crate::compression::native;
use crate::compression::types::{CodecKind, CompressionError, Decompressor};
use crate::utils::native_len;

const KIND: CodecKind = CodecKind::Lzx;

const DECR_OK: c_int = 0;
const DECR_NOMEMORY: c_int = 3;

type InitFn = unsafe extern "C" fn(c_int) -> *mut c_void;
type TeardownFn = unsafe extern "C" fn(*mut c_void);
type DecompressFn = unsafe extern "C" fn(*mut c_void, *const u8, *mut u8, c_int, c_int) -> c_int;

/// The three decoder entry points.
struct LzxApi {
    init: InitFn,
    teardown: TeardownFn,
    decompress: DecompressFn,
}

struct LzxLibrary {
    api: LzxApi,
    _library: Library,
}

static LIBRARY: OnceCell<Option<LzxLibrary>> = OnceCell::new();

impl LzxLibrary {
    fn load() -> Result<Self, CompressionError> {
        let library = native::resolve(library_names::LZX)?;
        // SAFETY: symbol types match libchm's lzx.h.
        unsafe {
            let api = LzxApi {
                init: native::symbol(&library, b"LZXinit\0")?,
                teardown: native::symbol(&library, b"LZXteardown\0")?,
                decompress: native::symbol(&library, b"LZXdecompress\0")?,
            };
            Ok(LzxLibrary { api, _library: library })
        }
    }
}

fn library() -> Result<&'static LzxApi, CompressionError> {
    LIBRARY
        .get_or_init(|| match LzxLibrary::load() {
            Ok(library) => Some(library),
            Err(e) => {
                log::debug!("lzx: {e}");
                None
            }
        })
        .as_ref()
        .map(|library| &library.api)
        .ok_or_else(|| CompressionError::unavailable(KIND))
}

/// One native decoder instance; released on drop.
struct LzxEngine {
    lib: &'static LzxApi,
    state: NonNull<c_void>,
}

impl LzxEngine {
    fn acquire(lib: &'static LzxApi, window_bits: i32) -> Result<Self, CompressionError> {
        // SAFETY: LZXinit allocates fresh state or returns null.
        let state = unsafe { (lib.init)(window_bits) };
        NonNull::new(state)
            .map(|state| LzxEngine { lib, state })
            .ok_or_else(|| CompressionError::resource(KIND, format!("decoder for window {window_bits}")))
    }

    fn decompress(&mut self, input: &[u8], output: &mut [u8]) -> Result<(), CompressionError> {
        let in_len = native_len(input.len())
            .ok_or_else(|| CompressionError::resource(KIND, "input within native length range"))?;
        let out_len = native_len(output.len())
            .ok_or_else(|| CompressionError::resource(KIND, "output within native length range"))?;

        // SAFETY: the decoder reads `in_len` bytes and writes exactly
        // `out_len` bytes through the given pointers.
        let status = unsafe {
            (self.lib.decompress)(self.state.as_ptr(), input.as_ptr(), output.as_mut_ptr(), in_len, out_len)
        };

        decode_status(status)
    }
}

fn decode_status(status: c_int) -> Result<(), CompressionError> {
    match status {
        DECR_OK => Ok(()),
        DECR_NOMEMORY => Err(CompressionError::resource(KIND, "lzx decoder memory")),
        other => Err(CompressionError::corrupt(KIND, format!("LZXdecompress status {other}"))),
    }
}

/// Instantiate, decode once, tear down.
fn decode(lib: &'static LzxApi, window_bits: i32, input: &[u8], output: &mut [u8]) -> Result<usize, CompressionError> {
    let mut engine = LzxEngine::acquire(lib, window_bits)?;
    engine.decompress(input, output)?;
    Ok(output.len())
}

impl Drop for LzxEngine {
    fn drop(&mut self) {
        // SAFETY: `state` came from LZXinit and is torn down exactly once.
        unsafe { (self.lib.teardown)(self.state.as_ptr()) }
    }
}

pub struct LzxCodec {
    window_bits: i32,
}

impl LzxCodec {
    pub const fn with_window(window_bits: i32) -> Self {
        Self { window_bits }
    }

    pub fn window_bits(&self) -> i32 {
        self.window_bits
    }
}

impl Default for LzxCodec {
    fn default() -> Self {
        Self::with_window(DEFAULT_LZX_WINDOW_BITS)
    }
}

impl Decompressor for LzxCodec {
    fn kind(&self) -> CodecKind {
        KIND
    }

    fn decompress(&self, input: &[u8], output: &mut [u8]) -> Result<usize, CompressionError> {
        decode(library()?, self.window_bits, input, output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const DECR_DATAFORMAT: c_int = 1;

    static LIVE: AtomicUsize = AtomicUsize::new(0);
    static TEARDOWNS: AtomicUsize = AtomicUsize::new(0);

    // Window 0 fails to allocate; empty input is rejected as bad data.
    unsafe extern "C" fn stub_init(window_bits: c_int) -> *mut c_void {
        if window_bits == 0 {
            return std::ptr::null_mut();
        }
        LIVE.fetch_add(1, Ordering::SeqCst);
        Box::into_raw(Box::new(window_bits)).cast()
    }

    unsafe extern "C" fn stub_teardown(state: *mut c_void) {
        drop(Box::from_raw(state.cast::<c_int>()));
        LIVE.fetch_sub(1, Ordering::SeqCst);
        TEARDOWNS.fetch_add(1, Ordering::SeqCst);
    }

    unsafe extern "C" fn stub_decompress(_: *mut c_void, _: *const u8, output: *mut u8, in_len: c_int, out_len: c_int) -> c_int {
        if in_len == 0 {
            return DECR_DATAFORMAT;
        }
        std::ptr::write_bytes(output, 0x4C, out_len as usize);
        DECR_OK
    }

    static STUB: LzxApi = LzxApi {
        init: stub_init,
        teardown: stub_teardown,
        decompress: stub_decompress,
    };

    #[test]
    fn decode_status_mapping() {
        assert!(decode_status(DECR_OK).is_ok());
        assert!(matches!(decode_status(DECR_NOMEMORY), Err(CompressionError::ResourceError { .. })));
        assert!(matches!(decode_status(DECR_DATAFORMAT), Err(CompressionError::Corrupt { codec: KIND, .. })));
    }

    // Single test so the counters are not shared with concurrent callers.
    #[test]
    fn engine_is_torn_down_on_every_path() {
        let mut out = [0u8; 32];
        assert_eq!(decode(&STUB, 17, &[1, 2, 3], &mut out).unwrap(), 32);
        assert!(out.iter().all(|b| *b == 0x4C));
        assert_eq!(TEARDOWNS.load(Ordering::SeqCst), 1);

        let err = decode(&STUB, 17, &[], &mut out).unwrap_err();
        assert!(matches!(err, CompressionError::Corrupt { .. }));
        assert_eq!(TEARDOWNS.load(Ordering::SeqCst), 2);

        // No state, nothing to release.
        let err = decode(&STUB, 0, &[1], &mut out).unwrap_err();
        assert!(matches!(err, CompressionError::ResourceError { .. }));
        assert_eq!(TEARDOWNS.load(Ordering::SeqCst), 2);

        let result = std::panic::catch_unwind(|| {
            let _engine = LzxEngine::acquire(&STUB, 15).unwrap();
            panic!("decoder user unwound");
        });
        assert!(result.is_err());
        assert_eq!(TEARDOWNS.load(Ordering::SeqCst), 3);
        assert_eq!(LIVE.load(Ordering::SeqCst), 0);
    }
}
