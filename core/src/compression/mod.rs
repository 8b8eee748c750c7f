//! compression/mod.rs
//! Decompression façade over built-in and runtime-loaded codecs.
//!
//! - `dispatch` routes a `CodecKind` to its adapter.
//! - `registry` answers which kinds are usable in this process.
//! - `native` finds the optional codec libraries on disk.

pub mod constants;
pub mod types;
pub mod native;
pub mod registry;
pub mod dispatch;
pub mod codecs;

pub use constants::*;
pub use types::*;
pub use registry::*;
pub use dispatch::{decompress, decompress_into, decompress_tag, output_bound};
pub use native::ResolverConfig;
